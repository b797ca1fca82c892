use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::unbounded;
use log::{debug, info, warn};

use super::merge::{merge_parts, remove_parts};
use super::task::{run_region_task, ConvertOptions, RegionTask, TaskReport, CANCEL_CHECK_INTERVAL};
use super::{CancelToken, NoProgress, ProgressObserver};
use crate::error::{Result, XsqError};
use crate::record::{write_region, RegionRecords};
use crate::xsq::{OpenSource, XsqSource};

/// Summary of a converted sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleReport {
    pub sample: String,
    pub regions: usize,
    pub reads: usize,
    pub records: usize,
}

/// Converts samples region by region on a fixed pool of workers.
///
/// Regions are dispatched in listing order and complete in any order; the
/// parts are merged in listing order once every region succeeded, so the
/// output matches a single-pass conversion. A failed or cancelled sample
/// produces no output and its parts are removed.
pub struct ParallelConverter<'a, O: OpenSource> {
    opener: &'a O,
    opts: &'a ConvertOptions,
    temp_dir: Option<PathBuf>,
    cancel: CancelToken,
    observer: &'a dyn ProgressObserver,
}
impl<'a, O: OpenSource> ParallelConverter<'a, O> {
    pub fn new(opener: &'a O, opts: &'a ConvertOptions) -> Self {
        Self {
            opener,
            opts,
            temp_dir: None,
            cancel: CancelToken::new(),
            observer: &NoProgress,
        }
    }

    /// Directory for part files (default: the destination's directory)
    #[must_use]
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Converts every region of `sample` and merges the parts into `dest`.
    pub fn convert_sample(&self, sample: &str, dest: &Path) -> Result<SampleReport> {
        self.cancel.check()?;
        let regions = self.opener.open()?.regions(sample)?;
        let temp_dir = self.temp_dir.clone().unwrap_or_else(|| {
            dest.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        });
        let tasks = RegionTask::for_regions(
            self.opener.stem(),
            sample,
            &regions,
            &temp_dir,
            self.opts.compression,
        );
        let parts: Vec<PathBuf> = tasks.iter().map(|t| t.part.clone()).collect();

        let reports = match self.run_tasks(&tasks) {
            Ok(reports) => reports,
            Err(err) => {
                remove_parts(&parts);
                self.observer.on_finish();
                return Err(err);
            }
        };
        self.observer.on_finish();

        // interrupted after the last region but before the merge
        if let Err(err) = self.cancel.check() {
            remove_parts(&parts);
            return Err(err);
        }

        let bytes = merge_parts(&parts, dest)?;
        info!(
            "Wrote {} ({} regions, {} bytes)",
            dest.display(),
            parts.len(),
            bytes
        );
        Ok(SampleReport {
            sample: sample.to_string(),
            regions: reports.len(),
            reads: reports.iter().map(|r| r.reads).sum(),
            records: reports.iter().map(|r| r.records).sum(),
        })
    }

    /// Runs the tasks on the worker pool and collects their reports in slice order.
    ///
    /// The first failure stops dispatch of the remaining tasks and is returned
    /// wrapped with its sample and region.
    pub fn run_tasks(&self, tasks: &[RegionTask]) -> Result<Vec<TaskReport>> {
        let total = tasks.len();
        let workers = self.opts.workers.clamp(1, total.max(1));
        debug!("Dispatching {total} regions to {workers} workers");

        let (job_tx, job_rx) = unbounded::<(usize, &RegionTask)>();
        for job in tasks.iter().enumerate() {
            // the receiver is alive for the scope of this function
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let (res_tx, res_rx) = unbounded::<(usize, Result<TaskReport>)>();
        let stop = self.cancel.child();
        let mut failure: Option<XsqError> = None;
        let mut reports: Vec<Option<TaskReport>> = vec![None; total];

        let (opener, opts) = (self.opener, self.opts);
        thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let res_tx = res_tx.clone();
                let stop = &stop;
                scope.spawn(move || {
                    while let Ok((position, task)) = job_rx.recv() {
                        if stop.is_cancelled() {
                            break;
                        }
                        let result = run_region_task(opener, task, opts, stop);
                        if res_tx.send((position, result)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(res_tx);

            let mut done = 0;
            for (position, result) in &res_rx {
                match result {
                    Ok(report) => {
                        done += 1;
                        reports[position] = Some(report);
                        self.observer.on_progress(done, total);
                    }
                    Err(err) => {
                        if failure.is_none() && !err.is_cancelled() {
                            let task = &tasks[position];
                            warn!(
                                "Region {}/{} failed: {}",
                                task.sample, task.region, err
                            );
                            failure = Some(XsqError::RegionFailed {
                                sample: task.sample.clone(),
                                region: task.region.clone(),
                                source: Box::new(err),
                            });
                            stop.cancel();
                        }
                    }
                }
            }
        });

        if self.cancel.is_cancelled() {
            warn!("Conversion interrupted, discarding partial output");
            return Err(XsqError::Cancelled);
        }
        if let Some(err) = failure {
            return Err(err);
        }
        reports
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(XsqError::Cancelled)
    }
}

/// Converts a sample in one pass, region after region, into `writer`.
///
/// Used when the destination cannot be assembled from parts (standard
/// output); produces the same bytes as the merged parallel conversion in
/// uncompressed mode.
pub fn convert_single_pass<S: XsqSource, W: Write>(
    source: &S,
    sample: &str,
    opts: &ConvertOptions,
    writer: &mut W,
    cancel: &CancelToken,
    observer: &dyn ProgressObserver,
) -> Result<SampleReport> {
    let tags = source.tags().select(&opts.tags)?;
    let regions = source.regions(sample)?;
    let mut reads = 0;
    let mut records = 0;
    for (idx, region) in regions.iter().enumerate() {
        cancel.check()?;
        let region_records = RegionRecords::load(source, sample, region, &tags)?;
        records += write_region(writer, &region_records, opts.suffix.as_deref(), |n| {
            if n % CANCEL_CHECK_INTERVAL == 0 {
                cancel.check()
            } else {
                Ok(())
            }
        })?;
        reads += region_records.num_reads();
        observer.on_progress(idx + 1, regions.len());
    }
    writer.flush()?;
    observer.on_finish();
    Ok(SampleReport {
        sample: sample.to_string(),
        regions: regions.len(),
        reads,
        records,
    })
}
