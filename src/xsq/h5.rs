//! XSQ containers stored as HDF5 files.
//!
//! Layout:
//!
//! ```text
//! /RunMetadata/TagDetails/<tag>            attrs IsColorPresent, TagSequence
//! /RunMetadata/LibraryDetails              table (LibraryName, Description, ...)
//! /<sample>/<region>/Fragments/yxLocation  n x 2
//! /<sample>/<region>/<tag>/BaseCallQV      n x read length
//! /<sample>/<region>/<tag>/ColorCallQV     n x read length
//! ```
//!
//! Metadata tables follow the PyTables convention: a compound dataset with
//! `CLASS = TABLE` and one `FIELD_<k>_NAME` attribute per column.

use std::path::{Path, PathBuf};

use hdf5::types::{
    CompoundType, FixedAscii, FixedUnicode, FloatSize, IntSize, TypeDescriptor, VarLenAscii,
    VarLenUnicode,
};
use hdf5::{Attribute, Dataset, Datatype, File, Group, Location as H5Location};
use log::{debug, trace, warn};

use super::{
    Location, MetadataNode, MetadataTable, OpenSource, PackedColumn, Tag, TagRegistry, XsqSource,
};
use crate::error::{EntityKind, Result, XsqError};

const METADATA: &str = "RunMetadata";
const NON_SAMPLE_GROUPS: [&str; 2] = [METADATA, "Indexing"];
const LOCATIONS: &str = "Fragments/yxLocation";
const LIBRARY_TABLE: &str = "RunMetadata/LibraryDetails";
const DESCRIPTION: &str = "Description";

/// Width of the fixed strings read from attributes
const FIELD_LEN: usize = 256;

impl From<hdf5::Error> for XsqError {
    fn from(err: hdf5::Error) -> Self {
        Self::Source(err.to_string())
    }
}

/// Reads the first element of a string attribute, whatever its string flavor.
fn read_string_attr(attr: &Attribute) -> Option<String> {
    if let Ok(vals) = attr.read_raw::<FixedAscii<FIELD_LEN>>() {
        return vals.first().map(|v| v.as_str().to_string());
    }
    if let Ok(vals) = attr.read_raw::<FixedUnicode<FIELD_LEN>>() {
        return vals.first().map(|v| v.as_str().to_string());
    }
    if let Ok(vals) = attr.read_raw::<VarLenAscii>() {
        return vals.first().map(|v| v.as_str().to_string());
    }
    if let Ok(vals) = attr.read_raw::<VarLenUnicode>() {
        return vals.first().map(|v| v.as_str().to_string());
    }
    None
}

fn join_values<T: ToString>(values: &[T]) -> String {
    match values {
        [single] => single.to_string(),
        _ => {
            let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
            format!("[{}]", parts.join(", "))
        }
    }
}

/// Renders an attribute value as text (arrays as `[a, b]`).
fn format_attr(attr: &Attribute) -> Result<String> {
    let value = match attr.dtype()?.to_descriptor()? {
        TypeDescriptor::Integer(_) => join_values(&attr.read_raw::<i64>()?),
        TypeDescriptor::Unsigned(_) => join_values(&attr.read_raw::<u64>()?),
        TypeDescriptor::Float(_) => join_values(&attr.read_raw::<f64>()?),
        TypeDescriptor::Boolean => join_values(&attr.read_raw::<bool>()?),
        TypeDescriptor::FixedAscii(_)
        | TypeDescriptor::FixedUnicode(_)
        | TypeDescriptor::VarLenAscii
        | TypeDescriptor::VarLenUnicode => read_string_attr(attr).unwrap_or_default(),
        other => format!("<{other:?}>"),
    };
    Ok(value)
}

fn read_attrs(location: &H5Location) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for name in location.attr_names()? {
        let value = format_attr(&location.attr(&name)?)?;
        attrs.push((name, value));
    }
    Ok(attrs)
}

fn is_table(attrs: &[(String, String)]) -> bool {
    attrs.iter().any(|(k, v)| k == "CLASS" && v == "TABLE")
}

/// Column names from the `FIELD_<k>_NAME` attributes, ordered by `k`.
fn field_names(attrs: &[(String, String)]) -> Vec<String> {
    let mut fields: Vec<(usize, &str)> = attrs
        .iter()
        .filter_map(|(key, value)| {
            let k = key.strip_prefix("FIELD_")?.strip_suffix("_NAME")?;
            Some((k.parse().ok()?, value.as_str()))
        })
        .collect();
    fields.sort_unstable_by_key(|(k, _)| *k);
    fields.into_iter().map(|(_, name)| name.to_string()).collect()
}

/// Renders one fixed-size cell stored in native layout
fn format_cell(ty: &TypeDescriptor, bytes: &[u8]) -> String {
    fn int_cell(size: IntSize, signed: bool, bytes: &[u8]) -> Option<String> {
        Some(match (size, signed) {
            (IntSize::U1, true) => i8::from_ne_bytes(bytes.get(..1)?.try_into().ok()?).to_string(),
            (IntSize::U1, false) => u8::from_ne_bytes(bytes.get(..1)?.try_into().ok()?).to_string(),
            (IntSize::U2, true) => i16::from_ne_bytes(bytes.get(..2)?.try_into().ok()?).to_string(),
            (IntSize::U2, false) => u16::from_ne_bytes(bytes.get(..2)?.try_into().ok()?).to_string(),
            (IntSize::U4, true) => i32::from_ne_bytes(bytes.get(..4)?.try_into().ok()?).to_string(),
            (IntSize::U4, false) => u32::from_ne_bytes(bytes.get(..4)?.try_into().ok()?).to_string(),
            (IntSize::U8, true) => i64::from_ne_bytes(bytes.get(..8)?.try_into().ok()?).to_string(),
            (IntSize::U8, false) => u64::from_ne_bytes(bytes.get(..8)?.try_into().ok()?).to_string(),
        })
    }

    let cell = match ty {
        TypeDescriptor::Integer(size) => int_cell(*size, true, bytes),
        TypeDescriptor::Unsigned(size) => int_cell(*size, false, bytes),
        TypeDescriptor::Float(FloatSize::U4) => bytes
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .map(|b| f32::from_ne_bytes(b).to_string()),
        TypeDescriptor::Float(FloatSize::U8) => bytes
            .get(..8)
            .and_then(|b| b.try_into().ok())
            .map(|b| f64::from_ne_bytes(b).to_string()),
        TypeDescriptor::Boolean => bytes.first().map(|&b| (b != 0).to_string()),
        TypeDescriptor::FixedAscii(len) | TypeDescriptor::FixedUnicode(len) => {
            bytes.get(..*len).map(|raw| {
                String::from_utf8_lossy(raw)
                    .trim_end_matches('\0')
                    .to_string()
            })
        }
        _ => None,
    };
    cell.unwrap_or_else(|| "?".to_string())
}

/// Reads the raw rows of a compound dataset in the native layout of `compound`.
fn read_compound_rows(dataset: &Dataset, compound: &CompoundType) -> Result<Vec<u8>> {
    let mem_type = Datatype::from_descriptor(&TypeDescriptor::Compound(compound.clone()))?;
    let mut buffer = vec![0u8; dataset.size() * compound.size];
    // SAFETY: `buffer` holds `size()` elements of `mem_type`, whose size is
    // `compound.size`; every field of `compound` is fixed size.
    let status = unsafe {
        hdf5_sys::h5d::H5Dread(
            dataset.id(),
            mem_type.id(),
            hdf5_sys::h5s::H5S_ALL,
            hdf5_sys::h5s::H5S_ALL,
            hdf5_sys::h5p::H5P_DEFAULT,
            buffer.as_mut_ptr().cast(),
        )
    };
    if status < 0 {
        return Err(XsqError::Source(format!(
            "Unable to read table {}",
            dataset.name()
        )));
    }
    Ok(buffer)
}

/// Reads a metadata table, every cell rendered as text.
///
/// Column names come from the `FIELD_<k>_NAME` attributes when they cover
/// every column, otherwise from the compound member names.
fn read_table(dataset: &Dataset, name: &str, attrs: &[(String, String)]) -> Result<MetadataTable> {
    let TypeDescriptor::Compound(mut compound) = dataset.dtype()?.to_descriptor()? else {
        return Err(XsqError::Source(format!("{name} is not a table")));
    };
    compound.fields.sort_by_key(|field| field.index);
    let fixed = |ty: &TypeDescriptor| {
        !matches!(
            ty,
            TypeDescriptor::VarLenAscii
                | TypeDescriptor::VarLenUnicode
                | TypeDescriptor::VarLenArray(_)
        )
    };
    if !compound.fields.iter().all(|field| fixed(&field.ty)) {
        return Err(XsqError::Source(format!(
            "{name} has variable-length columns"
        )));
    }

    let mut headers = field_names(attrs);
    if headers.len() != compound.fields.len() {
        headers = compound.fields.iter().map(|f| f.name.clone()).collect();
    }

    let buffer = read_compound_rows(dataset, &compound)?;
    let rows = buffer
        .chunks_exact(compound.size.max(1))
        .take(dataset.size())
        .map(|row| {
            compound
                .fields
                .iter()
                .map(|field| format_cell(&field.ty, row.get(field.offset..).unwrap_or_default()))
                .collect()
        })
        .collect();
    trace!("Read table {name}: {} columns", headers.len());
    Ok(MetadataTable {
        name: name.to_string(),
        headers,
        rows,
    })
}

fn dump_dataset(dataset: &Dataset, name: &str) -> Result<MetadataNode> {
    let attrs = read_attrs(dataset)?;
    if is_table(&attrs) {
        return Ok(MetadataNode::Table(read_table(dataset, name, &attrs)?));
    }
    Ok(MetadataNode::Group {
        name: name.to_string(),
        attrs,
        children: Vec::new(),
    })
}

fn dump_group(group: &Group, name: &str) -> Result<MetadataNode> {
    let attrs = read_attrs(group)?;
    let mut children = Vec::new();
    for member in group.member_names()? {
        let child = match group.group(&member) {
            Ok(subgroup) => dump_group(&subgroup, &member)?,
            Err(_) => dump_dataset(&group.dataset(&member)?, &member)?,
        };
        children.push(child);
    }
    Ok(MetadataNode::Group {
        name: name.to_string(),
        attrs,
        children,
    })
}

fn load_tags(file: &File) -> Result<TagRegistry> {
    let details = file.group(&format!("{METADATA}/TagDetails"))?;
    let mut tags = Vec::new();
    for name in details.member_names()? {
        let group = details.group(&name)?;
        let is_colorspace = group
            .attr("IsColorPresent")?
            .read_raw::<u8>()?
            .first()
            .is_some_and(|&v| v == 1);
        let prefix = group
            .attr("TagSequence")
            .ok()
            .and_then(|attr| read_string_attr(&attr))
            .map(|p| p.trim().to_string());
        trace!("Tag {name}: colorspace={is_colorspace} prefix={prefix:?}");
        tags.push(Tag::new(name, is_colorspace, prefix));
    }
    Ok(TagRegistry::new(tags))
}

/// A read-only handle onto an XSQ file
pub struct Hdf5Xsq {
    file: File,
    tags: TagRegistry,
}
impl Hdf5Xsq {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let tags = load_tags(&file)?;
        debug!(
            "Opened {} with {} tags",
            path.as_ref().display(),
            tags.len()
        );
        Ok(Self { file, tags })
    }

    fn sample_group(&self, sample: &str) -> Result<Group> {
        if NON_SAMPLE_GROUPS.contains(&sample) || !self.file.link_exists(sample) {
            return Err(XsqError::not_found(EntityKind::Sample, sample));
        }
        Ok(self.file.group(sample)?)
    }

    fn region_group(&self, sample: &str, region: &str) -> Result<Group> {
        let group = self.sample_group(sample)?;
        if !group.link_exists(region) {
            return Err(XsqError::not_found(EntityKind::Region, region));
        }
        Ok(group.group(region)?)
    }

    fn location_dataset(&self, sample: &str, region: &str) -> Result<Dataset> {
        Ok(self.region_group(sample, region)?.dataset(LOCATIONS)?)
    }

    fn library_table(&self) -> Result<Option<MetadataTable>> {
        if !self.file.link_exists(LIBRARY_TABLE) {
            return Ok(None);
        }
        let dataset = self.file.dataset(LIBRARY_TABLE)?;
        let attrs = read_attrs(&dataset)?;
        Ok(Some(read_table(&dataset, "LibraryDetails", &attrs)?))
    }
}
impl XsqSource for Hdf5Xsq {
    fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    fn samples(&self) -> Result<Vec<String>> {
        Ok(self
            .file
            .member_names()?
            .into_iter()
            .filter(|name| !NON_SAMPLE_GROUPS.contains(&name.as_str()))
            .collect())
    }

    fn regions(&self, sample: &str) -> Result<Vec<String>> {
        Ok(self.sample_group(sample)?.member_names()?)
    }

    fn locations(&self, sample: &str, region: &str) -> Result<Vec<Location>> {
        let coords = self.location_dataset(sample, region)?.read_raw::<u32>()?;
        Ok(coords
            .chunks_exact(2)
            .map(|yx| Location::new(yx[0], yx[1]))
            .collect())
    }

    fn tag_column(&self, sample: &str, region: &str, tag: &Tag) -> Result<PackedColumn> {
        let group = self.region_group(sample, region)?;
        if !group.link_exists(tag.id()) {
            return Err(XsqError::not_found(EntityKind::Tag, tag.id()));
        }
        let dataset = group
            .group(tag.id())?
            .dataset(tag.column_kind().dataset_name())?;
        let shape = dataset.shape();
        let width = match shape.as_slice() {
            [_, width, ..] => *width,
            _ => 1,
        };
        Ok(PackedColumn::new(dataset.read_raw::<u8>()?, width))
    }

    /// The `Description` cell of the library table row whose first column
    /// matches the sample name up to its first `_`.
    fn sample_description(&self, sample: &str) -> Result<Option<String>> {
        self.sample_group(sample)?;
        let table = match self.library_table() {
            Ok(Some(table)) => table,
            Ok(None) => return Ok(None),
            Err(err) => {
                warn!("Unable to read {LIBRARY_TABLE}: {err}");
                return Ok(None);
            }
        };
        let library = sample.split('_').next().unwrap_or(sample);
        Ok(table.lookup(library, DESCRIPTION))
    }

    fn region_len(&self, sample: &str, region: &str) -> Result<usize> {
        let shape = self.location_dataset(sample, region)?.shape();
        Ok(shape.first().copied().unwrap_or(0))
    }

    fn metadata(&self) -> Result<Option<MetadataNode>> {
        if !self.file.link_exists(METADATA) {
            return Ok(None);
        }
        Ok(Some(dump_group(&self.file.group(METADATA)?, METADATA)?))
    }
}

/// Opens independent [`Hdf5Xsq`] handles onto one file
#[derive(Debug, Clone)]
pub struct Hdf5Opener {
    path: PathBuf,
    stem: String,
}
impl Hdf5Opener {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let stem = path
            .file_stem()
            .map_or_else(|| "xsq".to_string(), |s| s.to_string_lossy().into_owned());
        Self { path, stem }
    }
}
impl OpenSource for Hdf5Opener {
    type Source = Hdf5Xsq;

    fn open(&self) -> Result<Self::Source> {
        Hdf5Xsq::open(&self.path)
    }

    fn stem(&self) -> &str {
        &self.stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn field_names_follow_their_index() {
        let attrs = attrs(&[
            ("CLASS", "TABLE"),
            ("FIELD_10_NAME", "Last"),
            ("FIELD_0_NAME", "LibraryName"),
            ("FIELD_1_NAME", "Description"),
            ("FIELD_0_FILL", ""),
        ]);
        assert!(is_table(&attrs));
        assert_eq!(field_names(&attrs), ["LibraryName", "Description", "Last"]);
    }

    #[test]
    fn cells_render_native_values() {
        let ty = TypeDescriptor::Integer(IntSize::U4);
        assert_eq!(format_cell(&ty, &(-7i32).to_ne_bytes()), "-7");
        let ty = TypeDescriptor::Unsigned(IntSize::U2);
        assert_eq!(format_cell(&ty, &513u16.to_ne_bytes()), "513");
        let ty = TypeDescriptor::FixedAscii(6);
        assert_eq!(format_cell(&ty, b"LIB1\0\0"), "LIB1");
        assert_eq!(format_cell(&ty, b"AB"), "?");
    }

    #[test]
    fn arrays_are_bracketed() {
        assert_eq!(join_values(&[1]), "1");
        assert_eq!(join_values(&[1, 2]), "[1, 2]");
    }
}
