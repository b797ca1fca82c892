//! Run metadata of a container, as a tree of groups and tables.

use std::io::{self, Write};

/// A column-named table of metadata rows, every cell rendered as text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
impl MetadataTable {
    /// Position of the column named `header`
    #[must_use]
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Looks up the row whose first cell is `key` and returns its `header` cell.
    #[must_use]
    pub fn lookup(&self, key: &str, header: &str) -> Option<String> {
        let column = self.column(header)?;
        self.rows
            .iter()
            .find(|row| row.first().is_some_and(|first| first == key))
            .and_then(|row| row.get(column))
            .map(|cell| cell.trim().to_string())
    }

    fn write_dump<W: Write>(&self, out: &mut W, indent: usize) -> io::Result<()> {
        let spaces = "  ".repeat(indent);
        let mut widths: Vec<usize> = self.headers.iter().map(String::len).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        write!(out, "{spaces}   |")?;
        for (header, width) in self.headers.iter().zip(&widths) {
            write!(out, " {header:<width$} |")?;
        }
        writeln!(out)?;
        for row in &self.rows {
            write!(out, "{spaces}   |")?;
            for (cell, width) in row.iter().zip(&widths) {
                write!(out, " {cell:<width$} |")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

/// A node of the metadata tree.
///
/// Datasets that are not tables are groups without children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataNode {
    Group {
        name: String,
        attrs: Vec<(String, String)>,
        children: Vec<MetadataNode>,
    },
    Table(MetadataTable),
}
impl MetadataNode {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Group { name, .. } => name,
            Self::Table(table) => &table.name,
        }
    }

    /// Finds a descendant by `/`-separated path relative to this node
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&MetadataNode> {
        path.split('/')
            .filter(|part| !part.is_empty())
            .try_fold(self, |node, part| match node {
                Self::Group { children, .. } => children.iter().find(|c| c.name() == part),
                Self::Table(_) => None,
            })
    }

    /// Prints the tree: `[name]` headings, `key: value` attributes, and
    /// tables as `|`-separated columns padded to their widest cell.
    pub fn write_dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.write_indented(out, 0)
    }

    fn write_indented<W: Write>(&self, out: &mut W, indent: usize) -> io::Result<()> {
        let spaces = "  ".repeat(indent);
        writeln!(out, "{spaces}[{}]", self.name())?;
        match self {
            Self::Table(table) => table.write_dump(out, indent),
            Self::Group {
                attrs, children, ..
            } => {
                for (key, value) in attrs {
                    writeln!(out, "{spaces}  {key}: {value}")?;
                }
                for child in children {
                    child.write_indented(out, indent + 1)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> MetadataTable {
        MetadataTable {
            name: "LibraryDetails".into(),
            headers: vec!["LibraryName".into(), "Description".into()],
            rows: vec![
                vec!["LIB1".into(), "liver ".into()],
                vec!["LIB22".into(), "kidney".into()],
            ],
        }
    }

    fn tree() -> MetadataNode {
        MetadataNode::Group {
            name: "RunMetadata".into(),
            attrs: vec![("RunName".into(), "run42".into())],
            children: vec![
                MetadataNode::Group {
                    name: "TagDetails".into(),
                    attrs: Vec::new(),
                    children: vec![MetadataNode::Group {
                        name: "F3".into(),
                        attrs: vec![("IsColorPresent".into(), "1".into())],
                        children: Vec::new(),
                    }],
                },
                MetadataNode::Table(library()),
            ],
        }
    }

    #[test]
    fn lookup_matches_the_first_column() {
        let table = library();
        assert_eq!(table.lookup("LIB1", "Description").as_deref(), Some("liver"));
        assert_eq!(table.lookup("LIB2", "Description"), None);
        assert_eq!(table.lookup("LIB1", "Missing"), None);
    }

    #[test]
    fn find_walks_groups() {
        let tree = tree();
        assert_eq!(tree.find("TagDetails/F3").map(MetadataNode::name), Some("F3"));
        assert!(tree.find("LibraryDetails").is_some());
        assert!(tree.find("LibraryDetails/x").is_none());
    }

    #[test]
    fn dump_layout() {
        let mut out = Vec::new();
        tree().write_dump(&mut out).unwrap();
        let expected = "\
[RunMetadata]
  RunName: run42
  [TagDetails]
    [F3]
      IsColorPresent: 1
  [LibraryDetails]
     | LibraryName | Description |
     | LIB1        | liver       |
     | LIB22       | kidney      |
";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }
}
