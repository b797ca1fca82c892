use clap::Parser;

use super::InputXsq;

#[derive(Parser, Debug)]
/// List the tags and samples present in an XSQ file.
pub struct ListCommand {
    #[clap(flatten)]
    pub input: InputXsq,

    #[clap(flatten)]
    pub opts: ListOpts,
}

#[derive(Parser, Debug, Clone, Default)]
#[clap(next_help_heading = "LIST OPTIONS")]
pub struct ListOpts {
    /// Show the number of reads present in each sample
    #[clap(short = 'c', long)]
    pub count: bool,

    /// Hide samples with this many reads or fewer (requires --count)
    #[clap(long, default_value = "0", requires = "count")]
    pub min: usize,
}
