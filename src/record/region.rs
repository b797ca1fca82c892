use log::trace;

use super::decode::decode_row;
use crate::error::{Result, XsqError};
use crate::xsq::{Location, PackedColumn, Tag, XsqSource};

/// One decoded read of one tag, ready to be written as FASTQ.
///
/// Qualities are raw values (not yet offset to Phred+33).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedRecord {
    pub name: String,
    pub sequence: Vec<u8>,
    pub qualities: Vec<u8>,
}
impl DecodedRecord {
    pub fn clear(&mut self) {
        self.name.clear();
        self.sequence.clear();
        self.qualities.clear();
    }
}

/// Renders a region id the way read names carry it.
///
/// Numeric ids lose their zero padding (`0001` becomes `1`); anything else
/// is kept verbatim.
#[must_use]
pub fn region_label(region: &str) -> String {
    match region.parse::<u64>() {
        Ok(num) => num.to_string(),
        Err(_) => region.to_string(),
    }
}

/// All columns of one region needed to emit its records.
///
/// Built with one read per column; records are then produced by read index,
/// cycling through the requested tags for every index.
#[derive(Debug)]
pub struct RegionRecords {
    label: String,
    locations: Vec<Location>,
    tags: Vec<Tag>,
    columns: Vec<PackedColumn>,
}
impl RegionRecords {
    /// Loads the location column and one packed column per tag.
    ///
    /// `tags` must be non-empty and already resolved against the source's
    /// registry; their order is the interleaving order.
    pub fn load<S: XsqSource>(
        source: &S,
        sample: &str,
        region: &str,
        tags: &[Tag],
    ) -> Result<Self> {
        let locations = source.locations(sample, region)?;
        let mut columns = Vec::with_capacity(tags.len());
        for tag in tags {
            let column = source.tag_column(sample, region, tag)?;
            if column.len() != locations.len() {
                return Err(XsqError::Malformed {
                    tag: tag.id().to_string(),
                    expected: locations.len(),
                    got: column.len(),
                });
            }
            columns.push(column);
        }
        trace!(
            "Loaded region {sample}/{region}: {} reads x {} tags",
            locations.len(),
            tags.len()
        );
        Ok(Self {
            label: region_label(region),
            locations,
            tags: tags.to_vec(),
            columns,
        })
    }

    /// Number of reads (locations) in the region
    #[must_use]
    pub fn num_reads(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn num_tags(&self) -> usize {
        self.tags.len()
    }

    /// Number of records emitted: one per read and tag
    #[must_use]
    pub fn num_records(&self) -> usize {
        self.locations.len() * self.tags.len()
    }

    /// Decodes the record for read `index` and tag slot `slot` into `record`.
    ///
    /// The record's buffers are reused; the name carries a ` {tag}` suffix only
    /// when more than one tag was requested.
    pub fn decode_into(&self, index: usize, slot: usize, record: &mut DecodedRecord) {
        use std::fmt::Write;

        record.clear();
        let tag = &self.tags[slot];
        let loc = self.locations[index];

        // writing into a String cannot fail
        let _ = write!(record.name, "{}_{}_{}", self.label, loc.y, loc.x);
        if self.tags.len() > 1 {
            let _ = write!(record.name, " {}", tag.id());
        }

        record.sequence.extend_from_slice(tag.sequence_prefix());
        decode_row(
            self.columns[slot].row(index),
            tag.space(),
            &mut record.sequence,
            &mut record.qualities,
        );
    }

    /// Iterates over the records in output order (read index, then tag).
    pub fn iter(&self) -> impl Iterator<Item = DecodedRecord> + '_ {
        let ntags = self.tags.len();
        (0..self.num_records()).map(move |pos| {
            let mut record = DecodedRecord::default();
            self.decode_into(pos / ntags, pos % ntags, &mut record);
            record
        })
    }
}

/// Reads and decodes every record of a region in output order.
///
/// An empty tag selection means all tags of the file.
pub fn read_region<S: XsqSource>(
    source: &S,
    sample: &str,
    region: &str,
    tags: &[String],
) -> Result<Vec<DecodedRecord>> {
    let tags = source.tags().select(tags)?;
    let records = RegionRecords::load(source, sample, region, &tags)?;
    Ok(records.iter().collect())
}
