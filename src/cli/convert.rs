use std::path::{Path, PathBuf};

use clap::{Args, Parser};
use xsqtools::pipeline::{Compression, ConvertOptions};

use super::InputXsq;

#[derive(Parser, Debug)]
/// Convert XSQ samples to FASTQ.
pub struct ConvertCommand {
    #[clap(flatten)]
    pub input: InputXsq,

    #[clap(flatten)]
    pub selection: SampleSelection,

    #[clap(flatten)]
    pub opts: ConvertArgs,
}
impl ConvertCommand {
    pub fn output_dir(&self) -> PathBuf {
        self.opts
            .outdir
            .as_ref()
            .map_or_else(|| self.input.parent_dir(), PathBuf::from)
    }
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SampleSelection {
    /// Convert all samples (each saved to <sample>.fastq.gz)
    #[clap(short = 'a', long)]
    pub all: bool,

    /// Convert only this sample, written uncompressed to stdout
    #[clap(short = 'n', long)]
    pub name: Option<String>,
}

#[derive(Parser, Debug, Clone)]
#[clap(next_help_heading = "CONVERT OPTIONS")]
pub struct ConvertArgs {
    /// Overwrite existing output files
    #[clap(short = 'f', long)]
    pub force: bool,

    /// Convert only this tag (repeatable).
    ///
    /// With more than one tag, the records of each read are written together,
    /// in the order given, and every name is suffixed with its tag.
    #[clap(short = 't', long = "tag")]
    pub tags: Vec<String>,

    /// Append a suffix to all read names
    #[clap(short = 's', long, allow_hyphen_values = true)]
    pub suffix: Option<String>,

    /// Don't compress the output FASTQ files with gzip
    #[clap(long)]
    pub noz: bool,

    /// Number of regions converted in parallel (0 for all cores)
    #[clap(short = 'p', long, default_value = "1")]
    pub procs: usize,

    /// Suffix added to output file names (before the extension)
    #[clap(long)]
    pub fsuf: Option<String>,

    /// Also convert unassigned/unclassified samples
    #[clap(long)]
    pub unclassified: bool,

    /// Add the sample description to output file names
    #[clap(long)]
    pub desc: bool,

    /// Output directory [default: directory of the input file]
    #[clap(short = 'O', long)]
    pub outdir: Option<String>,
}
impl ConvertArgs {
    /// Returns the number of region workers
    ///
    /// The number of workers is by default 1, 0 sets to maximum, and all other values are clamped to maximum.
    pub fn workers(&self) -> usize {
        match self.procs {
            0 => num_cpus::get(),
            n => n.min(num_cpus::get()),
        }
    }

    pub fn compression(&self) -> Compression {
        if self.noz {
            Compression::Uncompressed
        } else {
            Compression::Gzip
        }
    }

    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            tags: self.tags.clone(),
            suffix: self.suffix.clone(),
            compression: self.compression(),
            workers: self.workers(),
        }
    }

    /// Output path of a sample: `<dir>/<sample>[_<desc>][<fsuf>].fastq[.gz]`
    pub fn output_path(&self, dir: &Path, sample: &str, description: Option<&str>) -> PathBuf {
        let mut name = sample.to_string();
        if let Some(desc) = description.filter(|_| self.desc) {
            let desc = sanitize(desc);
            if !desc.is_empty() {
                name.push('_');
                name.push_str(&desc);
            }
        }
        if let Some(fsuf) = &self.fsuf {
            name.push_str(fsuf);
        }
        name.push_str(self.compression().extension());
        dir.join(name)
    }

    /// Returns true if the sample should be converted by `-a`
    pub fn includes_sample(&self, sample: &str) -> bool {
        self.unclassified || !is_unclassified(sample)
    }
}

fn is_unclassified(sample: &str) -> bool {
    let lower = sample.to_ascii_lowercase();
    lower.starts_with("unassigned") || lower.starts_with("unclassified")
}

/// Makes a description usable inside a file name
fn sanitize(desc: &str) -> String {
    desc.trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect()
}
