mod cancel;
mod merge;
mod orchestrator;
mod progress;
mod task;

pub use cancel::{interrupt_token, CancelToken};
pub use merge::{concat_parts, merge_parts, remove_parts, staging_path};
pub use orchestrator::{convert_single_pass, ParallelConverter, SampleReport};
pub use progress::{NoProgress, ProgressObserver};
pub use task::{
    run_region_task, Compression, ConvertOptions, FastqSink, RegionTask, TaskReport,
};
