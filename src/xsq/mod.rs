#[cfg(feature = "hdf5")]
mod h5;
mod memory;
mod metadata;
mod source;
mod tag;

#[cfg(feature = "hdf5")]
pub use h5::{Hdf5Opener, Hdf5Xsq};
pub use memory::{MemoryXsq, MemoryXsqBuilder};
pub use metadata::{MetadataNode, MetadataTable};
pub use source::{Location, OpenSource, PackedColumn, XsqSource};
pub use tag::{ColumnKind, Tag, TagRegistry};
