//! Conversion of XSQ sequencing containers to FASTQ.
//!
//! The crate is organized leaves first:
//!
//! * [`xsq`]: typed access to a container (tags, samples, regions, columns)
//! * [`record`]: decoding of packed call/quality bytes into FASTQ records
//! * [`pipeline`]: region-parallel conversion with ordered merge of the parts

pub mod error;
pub mod pipeline;
pub mod record;
pub mod xsq;

pub use error::{EntityKind, Result, XsqError};
