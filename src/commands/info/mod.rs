use std::io::Write;
use std::path::Path;

use anyhow::Result;
use xsqtools::xsq::{OpenSource, XsqSource};

use super::utils::{format_count, stdout_writer};
use crate::cli::InfoCommand;

/// Writes the run metadata of the file, then a summary of its tags and,
/// per sample, regions and reads.
pub fn write_info<S: XsqSource, W: Write>(source: &S, path: &Path, out: &mut W) -> Result<()> {
    if let Some(metadata) = source.metadata()? {
        metadata.write_dump(out)?;
        writeln!(out)?;
    }

    writeln!(out, "File              : {}", path.display())?;
    writeln!(out, "Number of tags    : {}", source.tags().len())?;
    for tag in source.tags().iter() {
        writeln!(out, "    {tag}")?;
    }

    let samples = source.samples()?;
    writeln!(out, "Number of samples : {}", samples.len())?;
    let mut total = 0;
    for sample in &samples {
        let num_regions = source.regions(sample)?.len();
        let num_reads = source.read_count(sample)?;
        total += num_reads;
        write!(
            out,
            "    {sample}: {num_regions} regions, {} reads",
            format_count(num_reads)
        )?;
        if let Some(desc) = source.sample_description(sample)? {
            write!(out, " [{desc}]")?;
        }
        writeln!(out)?;
    }
    writeln!(out, "Number of reads   : {}", format_count(total))?;
    out.flush()?;
    Ok(())
}

pub fn run(args: &InfoCommand) -> Result<()> {
    let source = args.input.opener()?.open()?;
    let mut out = stdout_writer();
    write_info(&source, args.input.path(), &mut out)
}
