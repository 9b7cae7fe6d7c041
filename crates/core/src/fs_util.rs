use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

/// Failure to reach the directory an operation starts from. Nothing has been
/// processed when one of these is returned.
#[derive(Debug, Error)]
pub enum RootAccessError {
    #[error("failed to access directory {}: {source}", .path.display())]
    Missing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not a directory", .path.display())]
    NotADirectory { path: PathBuf },
    #[error("failed to read directory {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone)]
pub struct DirEntryInfo {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    pub modified: Option<SystemTime>,
}

impl DirEntryInfo {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// One directory level, plus the entries that could not be represented.
#[derive(Debug, Default)]
pub struct DirListing {
    pub entries: Vec<DirEntryInfo>,
    pub rejected: Vec<(PathBuf, String)>,
}

pub fn ensure_dir(path: &Path) -> Result<(), RootAccessError> {
    let meta = fs::metadata(path).map_err(|source| RootAccessError::Missing {
        path: path.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(RootAccessError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Lists `dir` one level deep, sorted by file name. The type of each entry is
/// its own (symlinks are not followed).
pub fn list_entries(dir: &Path) -> io::Result<DirListing> {
    let mut listing = DirListing::default();

    for entry in fs::read_dir(dir)? {
        record_entry(&mut listing, dir, entry);
    }

    listing.entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(listing)
}

fn record_entry(listing: &mut DirListing, dir: &Path, entry: io::Result<fs::DirEntry>) {
    let entry = match entry {
        Ok(entry) => entry,
        Err(err) => {
            listing.rejected.push((
                dir.to_path_buf(),
                format!("failed to read directory entry: {err}"),
            ));
            return;
        }
    };
    let path = entry.path();
    let name = match entry.file_name().into_string() {
        Ok(name) => name,
        Err(raw) => {
            listing
                .rejected
                .push((path, format!("file name is not valid UTF-8: {raw:?}")));
            return;
        }
    };
    let kind = match entry.file_type() {
        Ok(ft) if ft.is_dir() => EntryKind::Directory,
        Ok(_) => EntryKind::File,
        Err(err) => {
            listing
                .rejected
                .push((path, format!("failed to read file type: {err}")));
            return;
        }
    };
    let modified = entry.metadata().ok().and_then(|m| m.modified().ok());

    listing.entries.push(DirEntryInfo {
        name,
        path,
        kind,
        modified,
    });
}

pub fn copy_file(src: &Path, dst: &Path) -> Result<u64> {
    let mut source = File::open(src).with_context(|| format!("failed to open {}", src.display()))?;
    let mut dest =
        File::create(dst).with_context(|| format!("failed to create {}", dst.display()))?;
    let copied = io::copy(&mut source, &mut dest)
        .with_context(|| format!("failed to copy {} -> {}", src.display(), dst.display()))?;
    Ok(copied)
}

/// Everything from the last `.` on, dot included. `"archive.tar.gz"` gives
/// `".gz"`, `".env"` gives `".env"`, `"README"` gives `""`.
pub fn extension_with_dot(name: &str) -> &str {
    name.rfind('.').map(|idx| &name[idx..]).unwrap_or("")
}

/// Final component of `path`. Paths like `.` or `..` have none, so the
/// canonical form is consulted.
pub fn dir_basename(path: &Path) -> Result<String> {
    if let Some(name) = path.file_name() {
        return Ok(name.to_string_lossy().to_string());
    }

    let canonical = fs::canonicalize(path)
        .with_context(|| format!("failed to resolve directory {}", path.display()))?;
    let name = canonical
        .file_name()
        .map(OsString::from)
        .with_context(|| format!("directory has no name: {}", canonical.display()))?;
    Ok(name.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn extension_follows_last_dot() {
        assert_eq!(extension_with_dot("archive.tar.gz"), ".gz");
        assert_eq!(extension_with_dot("photo.JPG"), ".JPG");
        assert_eq!(extension_with_dot(".env"), ".env");
        assert_eq!(extension_with_dot("README"), "");
    }

    #[test]
    fn ensure_dir_distinguishes_missing_and_file() {
        let temp = tempdir().expect("tempdir");
        let file = temp.path().join("plain.txt");
        fs::write(&file, b"x").expect("write file");

        assert!(ensure_dir(temp.path()).is_ok());
        assert!(matches!(
            ensure_dir(&temp.path().join("nope")),
            Err(RootAccessError::Missing { .. })
        ));
        assert!(matches!(
            ensure_dir(&file),
            Err(RootAccessError::NotADirectory { .. })
        ));
    }

    #[test]
    fn list_entries_sorts_by_name_and_marks_directories() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("b.txt"), b"b").expect("write b");
        fs::write(temp.path().join("a.txt"), b"a").expect("write a");
        fs::create_dir(temp.path().join("c")).expect("create dir");

        let listing = list_entries(temp.path()).expect("listing");
        let names: Vec<_> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c"]);
        assert!(listing.entries[2].is_dir());
        assert!(listing.entries[0].modified.is_some());
        assert!(listing.rejected.is_empty());
    }

    #[test]
    fn unreadable_entry_is_rejected_and_listing_continues() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("a.txt"), b"a").expect("write a");

        let mut listing = DirListing::default();
        record_entry(&mut listing, temp.path(), Err(io::Error::other("boom")));
        for entry in fs::read_dir(temp.path()).expect("read_dir") {
            record_entry(&mut listing, temp.path(), entry);
        }

        assert_eq!(listing.rejected.len(), 1);
        assert_eq!(listing.rejected[0].0, temp.path());
        assert!(listing.rejected[0]
            .1
            .contains("failed to read directory entry: boom"));
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.entries[0].name, "a.txt");
    }

    #[test]
    fn copy_file_overwrites_destination() {
        let temp = tempdir().expect("tempdir");
        let src = temp.path().join("src.png");
        let dst = temp.path().join("dst.png");
        fs::write(&src, b"new-content").expect("write src");
        fs::write(&dst, b"old-content-that-is-longer").expect("write dst");

        let copied = copy_file(&src, &dst).expect("copy");
        assert_eq!(copied, 11);
        assert_eq!(fs::read(&dst).expect("read dst"), b"new-content");
    }

    #[test]
    fn dir_basename_resolves_dot() {
        let temp = tempdir().expect("tempdir");
        let reports = temp.path().join("reports");
        fs::create_dir(&reports).expect("create reports");

        assert_eq!(dir_basename(&reports).expect("basename"), "reports");
        assert_eq!(
            dir_basename(&reports.join(".")).expect("basename of dot"),
            "reports"
        );
    }
}
