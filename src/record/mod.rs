mod decode;
mod fastq;
mod region;

pub use decode::{decode_byte, decode_row, CallSpace, NO_CALL_QUALITY, PHRED_OFFSET};
pub use fastq::{write_fastq_record, write_region};
pub use region::{read_region, region_label, DecodedRecord, RegionRecords};
