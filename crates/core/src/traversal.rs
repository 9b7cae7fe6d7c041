use crate::fs_util::{ensure_dir, list_entries, DirEntryInfo, DirListing, RootAccessError};
use crate::planner::{RenameOperation, RenamePlan};
use anyhow::Result;
use std::path::Path;

/// Decides the new name of one file. `position` is the 1-based index of the
/// file among the files of its own directory. `Ok(None)` leaves it alone.
pub(crate) type NameVisitor<'a> = dyn FnMut(&DirEntryInfo, usize) -> Result<Option<String>> + 'a;

/// Depth-first walk shared by every in-place rename. Directories are never
/// renamed; they are descended into, at the point they appear in the
/// listing, when `recursive` is set.
///
/// Only the root can fail the walk. An unreadable subdirectory or a visitor
/// error becomes a warning on `plan`.
pub(crate) fn walk_renames(
    root: &Path,
    recursive: bool,
    plan: &mut RenamePlan,
    visitor: &mut NameVisitor<'_>,
) -> Result<(), RootAccessError> {
    ensure_dir(root)?;
    let listing = list_entries(root).map_err(|source| RootAccessError::Unreadable {
        path: root.to_path_buf(),
        source,
    })?;
    visit_directory(root, listing, recursive, plan, visitor);
    Ok(())
}

fn visit_directory(
    dir: &Path,
    listing: DirListing,
    recursive: bool,
    plan: &mut RenamePlan,
    visitor: &mut NameVisitor<'_>,
) {
    plan.stats.directories_scanned += 1;
    for (path, message) in listing.rejected {
        plan.warn(path, message);
    }

    let mut position = 0usize;
    for entry in &listing.entries {
        if entry.is_dir() {
            if recursive {
                match list_entries(&entry.path) {
                    Ok(sub) => visit_directory(&entry.path, sub, recursive, plan, visitor),
                    Err(err) => {
                        plan.warn(entry.path.clone(), format!("failed to read directory: {err}"))
                    }
                }
            }
            continue;
        }

        position += 1;
        plan.stats.files_scanned += 1;
        match visitor(entry, position) {
            Ok(Some(new_name)) if new_name == entry.name => plan.stats.unchanged += 1,
            Ok(Some(new_name)) => {
                plan.push(RenameOperation::rename(
                    entry.path.clone(),
                    dir.join(new_name),
                ));
            }
            Ok(None) => plan.stats.skipped += 1,
            Err(err) => plan.warn(entry.path.clone(), format!("{err:#}")),
        }
    }
}
