use std::io::Write;

use anyhow::Result;
use xsqtools::xsq::{OpenSource, XsqSource};

use super::utils::{format_count, natural_cmp, stdout_writer};
use crate::cli::{ListCommand, ListOpts};

/// Writes the tag and sample listing of a source.
///
/// Samples are listed in natural order. With `count`, each sample shows its
/// description and read count and samples at or below `min` reads are hidden.
pub fn write_listing<S: XsqSource, W: Write>(
    source: &S,
    opts: &ListOpts,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Tags:")?;
    for tag in source.tags().iter() {
        writeln!(out, "    {tag}")?;
    }
    writeln!(out)?;

    let mut samples = source.samples()?;
    samples.sort_by(|a, b| natural_cmp(a, b));

    writeln!(out, "Samples:")?;
    for sample in samples {
        if !opts.count {
            writeln!(out, "    {sample}")?;
            continue;
        }
        let num_reads = source.read_count(&sample)?;
        if num_reads <= opts.min {
            continue;
        }
        match source.sample_description(&sample)? {
            Some(desc) if !desc.is_empty() => {
                writeln!(out, "    {sample} ({desc}) {}", format_count(num_reads))?;
            }
            _ => writeln!(out, "    {sample} {}", format_count(num_reads))?,
        }
    }
    out.flush()?;
    Ok(())
}

pub fn run(args: &ListCommand) -> Result<()> {
    let source = args.input.opener()?.open()?;
    let mut out = stdout_writer();
    write_listing(&source, &args.opts, &mut out)
}
