use clap::Parser;

use super::InputXsq;

#[derive(Parser, Debug)]
/// Summarize the tags, samples and regions of an XSQ file.
pub struct InfoCommand {
    #[clap(flatten)]
    pub input: InputXsq,
}
