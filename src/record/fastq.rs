use std::io::{self, Write};

use super::decode::PHRED_OFFSET;
use super::region::{DecodedRecord, RegionRecords};

/// Writes one record as four FASTQ lines.
///
/// `suffix` is appended verbatim to the read name; `qbuf` is a scratch buffer
/// for the Phred+33 quality line.
pub fn write_fastq_record<W: Write>(
    writer: &mut W,
    record: &DecodedRecord,
    suffix: Option<&str>,
    qbuf: &mut Vec<u8>,
) -> io::Result<()> {
    qbuf.clear();
    qbuf.extend(record.qualities.iter().map(|q| q + PHRED_OFFSET));

    writer.write_all(b"@")?;
    writer.write_all(record.name.as_bytes())?;
    if let Some(suffix) = suffix {
        writer.write_all(suffix.as_bytes())?;
    }
    writer.write_all(b"\n")?;
    writer.write_all(&record.sequence)?;
    writer.write_all(b"\n+\n")?;
    writer.write_all(qbuf)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Writes every record of a region in output order.
///
/// `on_record` is called after each record with the running record count and
/// may abort the write by returning an error.
pub fn write_region<W, F>(
    writer: &mut W,
    records: &RegionRecords,
    suffix: Option<&str>,
    mut on_record: F,
) -> crate::Result<usize>
where
    W: Write,
    F: FnMut(usize) -> crate::Result<()>,
{
    let mut record = DecodedRecord::default();
    let mut qbuf = Vec::new();
    let mut written = 0;
    for index in 0..records.num_reads() {
        for slot in 0..records.num_tags() {
            records.decode_into(index, slot, &mut record);
            write_fastq_record(writer, &record, suffix, &mut qbuf)?;
            written += 1;
            on_record(written)?;
        }
    }
    Ok(written)
}
