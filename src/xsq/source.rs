use super::{MetadataNode, Tag, TagRegistry};
use crate::error::Result;

/// 2-D sensor coordinate of a read within its region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub y: u32,
    pub x: u32,
}
impl Location {
    #[must_use]
    pub fn new(y: u32, x: u32) -> Self {
        Self { y, x }
    }
}
impl From<(u32, u32)> for Location {
    fn from((y, x): (u32, u32)) -> Self {
        Self { y, x }
    }
}

/// A tag's packed call/quality bytes for every read of a region.
///
/// Rows share a fixed width (the read length) and are stored contiguously.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedColumn {
    data: Vec<u8>,
    width: usize,
    rows: usize,
}
impl PackedColumn {
    /// Wraps a contiguous row-major buffer; a trailing partial row is ignored.
    #[must_use]
    pub fn new(data: Vec<u8>, width: usize) -> Self {
        let rows = data.len().checked_div(width).unwrap_or(0);
        Self { data, width, rows }
    }

    /// Builds a column from individual rows.
    ///
    /// Rows are expected to share a width; the first row decides it.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Self {
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(width * rows.len());
        for row in rows {
            data.extend_from_slice(row.as_ref());
        }
        Self {
            data,
            width,
            rows: rows.len(),
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows (reads) held in the column
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn row(&self, index: usize) -> &[u8] {
        let start = index * self.width;
        &self.data[start..start + self.width]
    }
}

/// Read-only, typed access to the contents of an XSQ container.
///
/// All operations are deterministic for a given file. Columns are read at
/// region granularity: one call returns the whole column.
pub trait XsqSource {
    /// The tags declared by the file, in file order
    fn tags(&self) -> &TagRegistry;

    /// Sample ids in file order
    fn samples(&self) -> Result<Vec<String>>;

    /// Region ids of a sample in listing order
    fn regions(&self, sample: &str) -> Result<Vec<String>>;

    /// The full location column of a region
    fn locations(&self, sample: &str, region: &str) -> Result<Vec<Location>>;

    /// The full packed column of one tag in a region
    fn tag_column(&self, sample: &str, region: &str, tag: &Tag) -> Result<PackedColumn>;

    /// Human-readable description of the sample's library, when recorded
    fn sample_description(&self, sample: &str) -> Result<Option<String>>;

    /// Number of reads held by a region
    fn region_len(&self, sample: &str, region: &str) -> Result<usize> {
        Ok(self.locations(sample, region)?.len())
    }

    /// The run metadata tree, when the container records one
    fn metadata(&self) -> Result<Option<MetadataNode>> {
        Ok(None)
    }

    /// Total number of reads of a sample (sum over its regions)
    fn read_count(&self, sample: &str) -> Result<usize> {
        let mut count = 0;
        for region in self.regions(sample)? {
            count += self.region_len(sample, &region)?;
        }
        Ok(count)
    }
}

/// Opens independent read-only handles onto the same source.
///
/// Every region task opens its own handle; handles are never shared across
/// threads.
pub trait OpenSource: Send + Sync {
    type Source: XsqSource;

    fn open(&self) -> Result<Self::Source>;

    /// Short name of the source used to namespace temporary files
    fn stem(&self) -> &str;
}
