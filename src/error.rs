/// Custom Result type for xsqtools operations, wrapping the custom [`XsqError`] type
pub type Result<T> = std::result::Result<T, XsqError>;

/// The kind of entity a lookup failed to find in the source container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Sample,
    Region,
    Tag,
}
impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sample => write!(f, "sample"),
            Self::Region => write!(f, "region"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

/// The main error type for reading XSQ containers and converting them to FASTQ.
#[derive(thiserror::Error, Debug)]
pub enum XsqError {
    /// A referenced sample, region, or tag does not exist in the source
    #[error("No {kind} named '{id}' in the source file")]
    NotFound { kind: EntityKind, id: String },

    /// A tag column disagrees with the location column of its region
    ///
    /// # Fields
    /// * `tag` - The tag whose column is inconsistent
    /// * `expected` - The number of locations in the region
    /// * `got` - The number of rows found in the tag column
    #[error("Column for tag '{tag}' holds {got} rows but the region has {expected} locations")]
    Malformed {
        tag: String,
        expected: usize,
        got: usize,
    },

    /// A region task failed; the sample conversion is abandoned
    #[error("Conversion of sample '{sample}' failed in region '{region}': {source}")]
    RegionFailed {
        sample: String,
        region: String,
        #[source]
        source: Box<XsqError>,
    },

    /// The conversion was interrupted before it could complete
    #[error("Conversion was cancelled")]
    Cancelled,

    /// The source container could not be opened or traversed
    #[error("Unable to read source container: {0}")]
    Source(String),

    /// Standard I/O errors from reading the source or writing the destination
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
impl XsqError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Returns true if this error (or the task failure it wraps) stems from a cancellation
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::RegionFailed { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}
impl From<gzp::GzpError> for XsqError {
    fn from(err: gzp::GzpError) -> Self {
        Self::Io(std::io::Error::other(err.to_string()))
    }
}
