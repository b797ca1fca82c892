use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use gzp::{
    deflate::Gzip,
    par::compress::{ParCompress, ParCompressBuilder},
    ZWriter,
};
use log::debug;

use super::CancelToken;
use crate::error::Result;
use crate::record::{write_region, RegionRecords};
use crate::xsq::{OpenSource, XsqSource};

/// Records written between two cancellation checks
pub(crate) const CANCEL_CHECK_INTERVAL: usize = 4096;

/// Compression applied to converted FASTQ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    Gzip,
    Uncompressed,
}
impl Compression {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Gzip => ".fastq.gz",
            Self::Uncompressed => ".fastq",
        }
    }
}

/// Options shared by every region of a conversion
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Tags to convert, in output order (empty: all tags in file order)
    pub tags: Vec<String>,
    /// Appended verbatim to every read name
    pub suffix: Option<String>,
    pub compression: Compression,
    /// Number of region workers
    pub workers: usize,
}
impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            suffix: None,
            compression: Compression::default(),
            workers: 1,
        }
    }
}

/// A FASTQ output file, plain or gzip compressed.
///
/// Must be closed with [`FastqSink::finish`] to produce a complete file.
pub enum FastqSink {
    Plain(BufWriter<File>),
    Gzip(ParCompress<'static, Gzip, BufWriter<File>>),
}
impl FastqSink {
    pub fn create(path: &Path, compression: Compression) -> Result<Self> {
        let handle = BufWriter::new(File::create(path)?);
        match compression {
            Compression::Uncompressed => Ok(Self::Plain(handle)),
            Compression::Gzip => {
                let encoder: ParCompress<'static, Gzip, BufWriter<File>> =
                    ParCompressBuilder::new().num_threads(1)?.from_writer(handle);
                Ok(Self::Gzip(encoder))
            }
        }
    }

    /// Flushes and terminates the stream (writing the gzip footer).
    pub fn finish(self) -> Result<()> {
        let mut handle = match self {
            Self::Plain(w) => w,
            Self::Gzip(mut w) => w.finish()?,
        };
        handle.flush()?;
        handle.get_ref().sync_all()?;
        Ok(())
    }
}
impl Write for FastqSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(w) => w.write(buf),
            Self::Gzip(w) => w.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.write_all(buf),
            Self::Gzip(w) => w.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            Self::Gzip(w) => w.flush(),
        }
    }
}

/// One region of a sample to convert into its own part file
#[derive(Debug, Clone)]
pub struct RegionTask {
    /// Position of the region in the sample's listing
    pub index: usize,
    pub sample: String,
    pub region: String,
    /// Private output path of the task
    pub part: PathBuf,
}
impl RegionTask {
    /// Builds the task list of a sample, one part file per region.
    ///
    /// Part names carry a `.tmp.` prefix and are namespaced by source stem,
    /// sample and region so that concurrent conversions cannot collide.
    pub fn for_regions(
        stem: &str,
        sample: &str,
        regions: &[String],
        temp_dir: &Path,
        compression: Compression,
    ) -> Vec<Self> {
        regions
            .iter()
            .enumerate()
            .map(|(index, region)| Self {
                index,
                sample: sample.to_string(),
                region: region.clone(),
                part: temp_dir.join(format!(
                    ".tmp.{stem}.{sample}.{region}{}",
                    compression.extension()
                )),
            })
            .collect()
    }
}

/// Outcome of a finished region task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskReport {
    pub index: usize,
    pub reads: usize,
    pub records: usize,
}

/// Converts one region into its part file.
///
/// Opens a private handle onto the source. The part file is complete only
/// when this returns `Ok`; on error it must be discarded.
pub fn run_region_task<O: OpenSource>(
    opener: &O,
    task: &RegionTask,
    opts: &ConvertOptions,
    cancel: &CancelToken,
) -> Result<TaskReport> {
    cancel.check()?;
    let source = opener.open()?;
    let tags = source.tags().select(&opts.tags)?;
    let records = RegionRecords::load(&source, &task.sample, &task.region, &tags)?;

    let mut sink = FastqSink::create(&task.part, opts.compression)?;
    let written = write_region(&mut sink, &records, opts.suffix.as_deref(), |n| {
        if n % CANCEL_CHECK_INTERVAL == 0 {
            cancel.check()
        } else {
            Ok(())
        }
    })?;
    sink.finish()?;

    debug!(
        "Region {}/{} -> {} ({} records)",
        task.sample,
        task.region,
        task.part.display(),
        written
    );
    Ok(TaskReport {
        index: task.index,
        reads: records.num_reads(),
        records: written,
    })
}
