mod cli;
mod convert;
mod info;
mod input;
mod list;

pub use cli::{Cli, Commands};
pub use convert::{ConvertArgs, ConvertCommand, SampleSelection};
pub use info::InfoCommand;
pub use input::InputXsq;
pub use list::{ListCommand, ListOpts};
