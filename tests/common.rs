#![allow(dead_code)]

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use bon::builder;
use flate2::read::MultiGzDecoder;
use xsqtools::xsq::{Location, MemoryXsq, OpenSource, PackedColumn, Tag, TagRegistry, XsqSource};
use xsqtools::{Result, XsqError};

pub const SAMPLE: &str = "S1";
pub const TAG_IDS: [&str; 3] = ["F3", "R3", "BC"];

/// Deterministic packed byte for a read position
fn packed_byte(region: usize, read: usize, pos: usize, tag: usize) -> u8 {
    ((region * 5 + read * 31 + pos * 7 + tag * 13) % 256) as u8
}

/// Builds a single-sample source with numbered regions (`0001`, `0002`, ...).
///
/// Tags are taken from `F3`, `R3`, `BC` in order; `F3` is in color space with
/// a `T` primer when `colorspace` is set.
#[builder]
pub fn sample_source(
    #[builder(default = 1)] num_tags: usize,
    #[builder(default = 3)] num_regions: usize,
    #[builder(default = 4)] reads_per_region: usize,
    #[builder(default = 6)] read_len: usize,
    #[builder(default)] colorspace: bool,
) -> MemoryXsq {
    let mut builder = MemoryXsq::builder("run");
    for (t, id) in TAG_IDS.iter().take(num_tags).enumerate() {
        let tag = if t == 0 && colorspace {
            Tag::new(*id, true, Some("T".to_string()))
        } else {
            Tag::new(*id, false, None)
        };
        builder = builder.tag(tag);
    }
    builder = builder.sample(SAMPLE, Some("test library"));
    for region in 0..num_regions {
        let locations: Vec<(u32, u32)> = (0..reads_per_region)
            .map(|r| (region as u32, r as u32 * 3))
            .collect();
        let columns: Vec<(&str, Vec<Vec<u8>>)> = TAG_IDS
            .iter()
            .take(num_tags)
            .enumerate()
            .map(|(t, id)| {
                let rows: Vec<Vec<u8>> = (0..reads_per_region)
                    .map(|r| {
                        (0..read_len)
                            .map(|p| packed_byte(region, r, p, t))
                            .collect()
                    })
                    .collect();
                (*id, rows)
            })
            .collect();
        builder = builder
            .region(format!("{:04}", region + 1), locations, columns)
            .unwrap();
    }
    builder.build()
}

/// Reads a whole file, decompressing every gzip member when `gzip` is set
pub fn read_fastq(path: &Path, gzip: bool) -> Vec<u8> {
    let mut buffer = Vec::new();
    if gzip {
        MultiGzDecoder::new(fs::File::open(path).unwrap())
            .read_to_end(&mut buffer)
            .unwrap();
    } else {
        buffer = fs::read(path).unwrap();
    }
    buffer
}

/// Names of the entries of a directory
pub fn dir_entries(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}

/// Opener whose handles fail to read any column of one region
#[derive(Debug, Clone)]
pub struct FailingOpener {
    pub inner: MemoryXsq,
    pub region: String,
}

pub struct FailingSource {
    inner: MemoryXsq,
    region: String,
}
impl XsqSource for FailingSource {
    fn tags(&self) -> &TagRegistry {
        self.inner.tags()
    }

    fn samples(&self) -> Result<Vec<String>> {
        self.inner.samples()
    }

    fn regions(&self, sample: &str) -> Result<Vec<String>> {
        self.inner.regions(sample)
    }

    fn locations(&self, sample: &str, region: &str) -> Result<Vec<Location>> {
        self.inner.locations(sample, region)
    }

    fn tag_column(&self, sample: &str, region: &str, tag: &Tag) -> Result<PackedColumn> {
        if region == self.region {
            return Err(XsqError::Io(io::Error::other("corrupted chunk")));
        }
        self.inner.tag_column(sample, region, tag)
    }

    fn sample_description(&self, sample: &str) -> Result<Option<String>> {
        self.inner.sample_description(sample)
    }
}
impl OpenSource for FailingOpener {
    type Source = FailingSource;

    fn open(&self) -> Result<Self::Source> {
        Ok(FailingSource {
            inner: self.inner.clone(),
            region: self.region.clone(),
        })
    }

    fn stem(&self) -> &str {
        self.inner.stem()
    }
}
