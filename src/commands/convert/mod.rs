mod progress;

use std::fs;
use std::path::Path;

use anyhow::Result;
use log::{info, warn};
use xsqtools::pipeline::{convert_single_pass, CancelToken, ParallelConverter, SampleReport};
use xsqtools::xsq::{OpenSource, XsqSource};

use super::utils::{format_count, stdout_writer};
use crate::cli::{ConvertArgs, ConvertCommand};
use progress::observer_for;

/// Outcome of converting every sample of a file
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub converted: Vec<SampleReport>,
    pub skipped: Vec<String>,
}

/// Converts one sample, uncompressed, to stdout in a single pass
fn convert_to_stdout<O: OpenSource>(
    opener: &O,
    sample: &str,
    args: &ConvertArgs,
    cancel: &CancelToken,
) -> Result<()> {
    if args.procs != 1 {
        warn!("Ignoring --procs: conversion to stdout runs on a single worker");
    }
    let opts = args.convert_options();
    let source = opener.open()?;
    let observer = observer_for(sample, false);
    let mut out = stdout_writer();
    let report = convert_single_pass(&source, sample, &opts, &mut out, cancel, observer.as_ref())?;
    info!(
        "{}: {} reads, {} records",
        report.sample,
        format_count(report.reads),
        format_count(report.records)
    );
    Ok(())
}

/// Converts every selected sample of the source into `outdir`.
///
/// Samples whose output already exists are skipped unless `force` is set.
/// The first failing sample aborts the batch.
pub fn convert_all<O: OpenSource>(
    opener: &O,
    args: &ConvertArgs,
    outdir: &Path,
    cancel: &CancelToken,
    quiet: bool,
) -> Result<BatchSummary> {
    fs::create_dir_all(outdir)?;
    let opts = args.convert_options();
    let source = opener.open()?;
    // fail on unknown tags before any sample is touched
    source.tags().select(&opts.tags)?;

    let mut summary = BatchSummary::default();
    for sample in source.samples()? {
        if !args.includes_sample(&sample) {
            info!("Skipping unclassified sample {sample} (use --unclassified)");
            summary.skipped.push(sample);
            continue;
        }
        let description = if args.desc {
            source.sample_description(&sample)?
        } else {
            None
        };
        let dest = args.output_path(outdir, &sample, description.as_deref());
        if dest.exists() && !args.force {
            warn!(
                "Output file {} exists, not overwriting without -f",
                dest.display()
            );
            summary.skipped.push(sample);
            continue;
        }

        info!("Converting sample {sample} -> {}", dest.display());
        let observer = observer_for(&sample, quiet);
        let report = ParallelConverter::new(opener, &opts)
            .with_temp_dir(outdir)
            .with_cancel(cancel.clone())
            .with_observer(observer.as_ref())
            .convert_sample(&sample, &dest)?;
        info!(
            "{}: {} regions, {} reads, {} records",
            report.sample,
            report.regions,
            format_count(report.reads),
            format_count(report.records)
        );
        summary.converted.push(report);
    }
    Ok(summary)
}

pub fn run(args: &ConvertCommand, cancel: &CancelToken) -> Result<()> {
    let opener = args.input.opener()?;
    match &args.selection.name {
        Some(sample) => convert_to_stdout(&opener, sample, &args.opts, cancel),
        None => {
            let summary = convert_all(&opener, &args.opts, &args.output_dir(), cancel, false)?;
            info!(
                "Converted {} samples ({} skipped)",
                summary.converted.len(),
                summary.skipped.len()
            );
            Ok(())
        }
    }
}
