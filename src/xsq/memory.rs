//! An in-memory XSQ source.
//!
//! Holds samples, regions and packed columns in plain vectors. Clones share the
//! same data, so a `MemoryXsq` is also its own [`OpenSource`].

use std::collections::HashMap;
use std::sync::Arc;

use super::{Location, MetadataNode, OpenSource, PackedColumn, Tag, TagRegistry, XsqSource};
use crate::error::{EntityKind, Result, XsqError};

#[derive(Debug, Default)]
struct MemoryRegion {
    id: String,
    locations: Vec<Location>,
    columns: HashMap<String, PackedColumn>,
}

#[derive(Debug, Default)]
struct MemorySample {
    id: String,
    description: Option<String>,
    regions: Vec<MemoryRegion>,
}

#[derive(Debug, Default)]
struct Inner {
    name: String,
    tags: TagRegistry,
    samples: Vec<MemorySample>,
    metadata: Option<MetadataNode>,
}

#[derive(Debug, Clone)]
pub struct MemoryXsq {
    inner: Arc<Inner>,
}
impl MemoryXsq {
    pub fn builder(name: impl Into<String>) -> MemoryXsqBuilder {
        MemoryXsqBuilder {
            inner: Inner {
                name: name.into(),
                ..Default::default()
            },
        }
    }

    fn sample(&self, sample: &str) -> Result<&MemorySample> {
        self.inner
            .samples
            .iter()
            .find(|s| s.id == sample)
            .ok_or_else(|| XsqError::not_found(EntityKind::Sample, sample))
    }

    fn region(&self, sample: &str, region: &str) -> Result<&MemoryRegion> {
        self.sample(sample)?
            .regions
            .iter()
            .find(|r| r.id == region)
            .ok_or_else(|| XsqError::not_found(EntityKind::Region, region))
    }
}
impl XsqSource for MemoryXsq {
    fn tags(&self) -> &TagRegistry {
        &self.inner.tags
    }

    fn samples(&self) -> Result<Vec<String>> {
        Ok(self.inner.samples.iter().map(|s| s.id.clone()).collect())
    }

    fn regions(&self, sample: &str) -> Result<Vec<String>> {
        Ok(self
            .sample(sample)?
            .regions
            .iter()
            .map(|r| r.id.clone())
            .collect())
    }

    fn locations(&self, sample: &str, region: &str) -> Result<Vec<Location>> {
        Ok(self.region(sample, region)?.locations.clone())
    }

    fn tag_column(&self, sample: &str, region: &str, tag: &Tag) -> Result<PackedColumn> {
        self.region(sample, region)?
            .columns
            .get(tag.id())
            .cloned()
            .ok_or_else(|| XsqError::not_found(EntityKind::Tag, tag.id()))
    }

    fn sample_description(&self, sample: &str) -> Result<Option<String>> {
        Ok(self.sample(sample)?.description.clone())
    }

    fn region_len(&self, sample: &str, region: &str) -> Result<usize> {
        Ok(self.region(sample, region)?.locations.len())
    }

    fn metadata(&self) -> Result<Option<MetadataNode>> {
        Ok(self.inner.metadata.clone())
    }
}
impl OpenSource for MemoryXsq {
    type Source = MemoryXsq;

    fn open(&self) -> Result<Self::Source> {
        Ok(self.clone())
    }

    fn stem(&self) -> &str {
        &self.inner.name
    }
}

/// Builds a [`MemoryXsq`] sample by sample.
///
/// Regions are appended in call order, which becomes their listing order.
#[derive(Debug)]
pub struct MemoryXsqBuilder {
    inner: Inner,
}
impl MemoryXsqBuilder {
    #[must_use]
    pub fn tag(mut self, tag: Tag) -> Self {
        let mut tags: Vec<Tag> = self.inner.tags.iter().cloned().collect();
        tags.push(tag);
        self.inner.tags = TagRegistry::new(tags);
        self
    }

    #[must_use]
    pub fn sample(mut self, id: impl Into<String>, description: Option<&str>) -> Self {
        self.inner.samples.push(MemorySample {
            id: id.into(),
            description: description.map(str::to_string),
            regions: Vec::new(),
        });
        self
    }

    /// Appends a region to the most recently added sample.
    ///
    /// `columns` maps tag ids to one row of packed bytes per location.
    pub fn region(
        mut self,
        id: impl Into<String>,
        locations: Vec<(u32, u32)>,
        columns: Vec<(&str, Vec<Vec<u8>>)>,
    ) -> Result<Self> {
        let id = id.into();
        let sample = self
            .inner
            .samples
            .last_mut()
            .ok_or_else(|| XsqError::Source(format!("region '{id}' added before any sample")))?;

        let mut region = MemoryRegion {
            id,
            locations: locations.into_iter().map(Location::from).collect(),
            columns: HashMap::new(),
        };
        for (tag, rows) in columns {
            let width = rows.first().map_or(0, Vec::len);
            if let Some(row) = rows.iter().find(|r| r.len() != width) {
                return Err(XsqError::Malformed {
                    tag: tag.to_string(),
                    expected: width,
                    got: row.len(),
                });
            }
            region
                .columns
                .insert(tag.to_string(), PackedColumn::from_rows(&rows));
        }
        sample.regions.push(region);
        Ok(self)
    }

    #[must_use]
    pub fn metadata(mut self, root: MetadataNode) -> Self {
        self.inner.metadata = Some(root);
        self
    }

    #[must_use]
    pub fn build(self) -> MemoryXsq {
        MemoryXsq {
            inner: Arc::new(self.inner),
        }
    }
}
