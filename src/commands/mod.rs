pub mod convert;
pub mod info;
pub mod list;
mod utils;
