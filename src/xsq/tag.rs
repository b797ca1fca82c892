use crate::error::{EntityKind, Result, XsqError};
use crate::record::CallSpace;

/// The packed call/quality column stored for a tag within a region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Nucleotide calls
    BaseCallQV,
    /// Color calls
    ColorCallQV,
}
impl ColumnKind {
    /// Name of the dataset holding this column in the container
    #[must_use]
    pub fn dataset_name(self) -> &'static str {
        match self {
            Self::BaseCallQV => "BaseCallQV",
            Self::ColorCallQV => "ColorCallQV",
        }
    }
}

/// A sequencing channel (e.g. `F3`, `R3`, `BC`) and how its calls are encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    id: String,
    is_colorspace: bool,
    prefix: Option<String>,
}
impl Tag {
    /// Creates a tag; an empty prefix is treated as no prefix.
    pub fn new(id: impl Into<String>, is_colorspace: bool, prefix: Option<String>) -> Self {
        Self {
            id: id.into(),
            is_colorspace,
            prefix: prefix.filter(|p| !p.is_empty()),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn is_colorspace(&self) -> bool {
        self.is_colorspace
    }

    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    #[must_use]
    pub fn space(&self) -> CallSpace {
        if self.is_colorspace {
            CallSpace::Color
        } else {
            CallSpace::Nucleotide
        }
    }

    #[must_use]
    pub fn column_kind(&self) -> ColumnKind {
        if self.is_colorspace {
            ColumnKind::ColorCallQV
        } else {
            ColumnKind::BaseCallQV
        }
    }

    /// Leading bases written before the decoded calls of every read.
    ///
    /// Only color-space tags carry a primer base in front of their colors.
    #[must_use]
    pub fn sequence_prefix(&self) -> &[u8] {
        match (self.is_colorspace, self.prefix.as_deref()) {
            (true, Some(prefix)) => prefix.as_bytes(),
            _ => &[],
        }
    }
}
impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_colorspace {
            write!(f, "{}[cs/{}]", self.id, self.prefix().unwrap_or(""))
        } else {
            write!(f, "{}[nt]", self.id)
        }
    }
}

/// Ordered set of the tags declared by a file.
///
/// The iteration order is the file's own tag order and is the default
/// interleaving order of converted records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRegistry {
    tags: Vec<Tag>,
}
impl TagRegistry {
    pub fn new(tags: Vec<Tag>) -> Self {
        Self { tags }
    }

    pub fn get(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Resolves a tag selection against the registry.
    ///
    /// An empty selection means every tag in file order; otherwise the
    /// caller's order is kept and every id must exist.
    pub fn select(&self, requested: &[String]) -> Result<Vec<Tag>> {
        if requested.is_empty() {
            return Ok(self.tags.clone());
        }
        requested
            .iter()
            .map(|id| {
                self.get(id)
                    .cloned()
                    .ok_or_else(|| XsqError::not_found(EntityKind::Tag, id.as_str()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TagRegistry {
        TagRegistry::new(vec![
            Tag::new("F3", true, Some("T".into())),
            Tag::new("R3", false, None),
            Tag::new("BC", false, Some(String::new())),
        ])
    }

    #[test]
    fn empty_selection_keeps_file_order() {
        let tags = registry().select(&[]).unwrap();
        let ids: Vec<_> = tags.iter().map(Tag::id).collect();
        assert_eq!(ids, ["F3", "R3", "BC"]);
    }

    #[test]
    fn explicit_selection_keeps_caller_order() {
        let tags = registry()
            .select(&["BC".to_string(), "F3".to_string()])
            .unwrap();
        let ids: Vec<_> = tags.iter().map(Tag::id).collect();
        assert_eq!(ids, ["BC", "F3"]);
    }

    #[test]
    fn unknown_tag_is_not_found() {
        let err = registry().select(&["F5".to_string()]).unwrap_err();
        assert!(matches!(
            err,
            XsqError::NotFound {
                kind: EntityKind::Tag,
                ..
            }
        ));
    }

    #[test]
    fn only_colorspace_tags_carry_a_sequence_prefix() {
        let reg = registry();
        assert_eq!(reg.get("F3").unwrap().sequence_prefix(), b"T");
        assert!(reg.get("R3").unwrap().sequence_prefix().is_empty());
        assert_eq!(reg.get("BC").unwrap().prefix(), None);
    }

    #[test]
    fn display_matches_listing_format() {
        let reg = registry();
        assert_eq!(reg.get("F3").unwrap().to_string(), "F3[cs/T]");
        assert_eq!(reg.get("R3").unwrap().to_string(), "R3[nt]");
        assert_eq!(
            reg.get("F3").unwrap().column_kind().dataset_name(),
            "ColorCallQV"
        );
    }
}
