use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{trace, warn};

use crate::error::Result;

/// Staging path of a destination: a `.tmp.`-prefixed sibling.
#[must_use]
pub fn staging_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".tmp.{name}"))
}

/// Copies the raw bytes of every part, in order, into `writer`.
///
/// Parts are never decompressed: independently terminated gzip members
/// concatenate into a valid multi-member stream, and plain FASTQ
/// concatenates as text.
pub fn concat_parts<W: Write>(parts: &[PathBuf], writer: &mut W) -> Result<u64> {
    let mut total = 0;
    for part in parts {
        let mut handle = File::open(part)?;
        let copied = io::copy(&mut handle, writer)?;
        trace!("Appended {} bytes from {}", copied, part.display());
        total += copied;
    }
    Ok(total)
}

/// Concatenates the parts into `dest`, then removes them.
///
/// The output is assembled at [`staging_path`] and renamed over `dest` only
/// once complete, so `dest` is never left partially written. The parts are
/// removed whether or not the merge succeeds.
pub fn merge_parts(parts: &[PathBuf], dest: &Path) -> Result<u64> {
    let staging = staging_path(dest);
    let merged = write_staged(parts, &staging, dest);
    if merged.is_err() {
        remove_parts(std::slice::from_ref(&staging));
    }
    remove_parts(parts);
    merged
}

fn write_staged(parts: &[PathBuf], staging: &Path, dest: &Path) -> Result<u64> {
    let mut writer = BufWriter::new(File::create(staging)?);
    let bytes = concat_parts(parts, &mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    drop(writer);
    fs::rename(staging, dest)?;
    Ok(bytes)
}

/// Best-effort removal of part files; missing files are ignored.
pub fn remove_parts(parts: &[PathBuf]) {
    for part in parts {
        match fs::remove_file(part) {
            Ok(()) => trace!("Removed {}", part.display()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!("Unable to remove {}: {}", part.display(), err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_parts(dir: &Path, contents: &[&str]) -> Vec<PathBuf> {
        contents
            .iter()
            .enumerate()
            .map(|(idx, text)| {
                let path = dir.join(format!(".tmp.part{idx}"));
                fs::write(&path, text).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn staging_is_a_hidden_sibling() {
        assert_eq!(
            staging_path(Path::new("/data/S1.fastq.gz")),
            Path::new("/data/.tmp.S1.fastq.gz")
        );
    }

    #[test]
    fn parts_are_concatenated_in_list_order() {
        let dir = tempfile::tempdir().unwrap();
        let parts = write_parts(dir.path(), &["b\n", "a\n", "c\n"]);
        let dest = dir.path().join("out.fastq");
        let bytes = merge_parts(&parts, &dest).unwrap();
        assert_eq!(bytes, 6);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "b\na\nc\n");
        assert!(parts.iter().all(|p| !p.exists()));
        assert!(!staging_path(&dest).exists());
    }

    #[test]
    fn missing_part_leaves_destination_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut parts = write_parts(dir.path(), &["x\n"]);
        parts.push(dir.path().join("missing"));
        let dest = dir.path().join("out.fastq");
        fs::write(&dest, "previous\n").unwrap();

        assert!(merge_parts(&parts, &dest).is_err());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "previous\n");
        assert!(!staging_path(&dest).exists());
        assert!(!parts[0].exists());
    }

    #[test]
    fn failed_rename_removes_parts() {
        let dir = tempfile::tempdir().unwrap();
        let parts = write_parts(dir.path(), &["x\n", "y\n"]);
        let dest = dir.path().join("out.fastq");
        fs::create_dir(&dest).unwrap();
        fs::write(dest.join("occupied"), "z\n").unwrap();

        assert!(merge_parts(&parts, &dest).is_err());
        assert!(dest.join("occupied").exists());
        assert!(!staging_path(&dest).exists());
        assert!(parts.iter().all(|p| !p.exists()));
    }
}
