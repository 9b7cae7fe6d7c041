use crate::fs_util::{dir_basename, ensure_dir, extension_with_dot, list_entries, RootAccessError};
use crate::mode::FolderTarget;
use crate::planner::RenamePlan;
use crate::traversal::walk_renames;
use anyhow::Result;
use std::path::Path;

pub fn plan_folder_name(target: &FolderTarget, plan: &mut RenamePlan) -> Result<()> {
    match target {
        FolderTarget::Single(dir) => {
            ensure_dir(dir)?;
            let folder = dir_basename(dir)?;
            plan_one_folder(dir, &folder, plan)?;
        }
        FolderTarget::Batch(parent) => {
            ensure_dir(parent)?;
            let listing = list_entries(parent).map_err(|source| RootAccessError::Unreadable {
                path: parent.to_path_buf(),
                source,
            })?;
            for (path, message) in listing.rejected {
                plan.warn(path, message);
            }
            for entry in listing.entries.iter().filter(|e| e.is_dir()) {
                if let Err(err) = plan_one_folder(&entry.path, &entry.name, plan) {
                    plan.warn(entry.path.clone(), err.to_string());
                }
            }
        }
    }
    Ok(())
}

/// Files directly in `dir` become `<folder>_<nnn><ext>`, numbered from 1.
/// Subdirectories are left alone.
fn plan_one_folder(dir: &Path, folder: &str, plan: &mut RenamePlan) -> Result<(), RootAccessError> {
    walk_renames(dir, false, plan, &mut |entry, position| {
        Ok(Some(folder_sequence_name(folder, position, &entry.name)))
    })
}

pub fn folder_sequence_name(folder: &str, position: usize, name: &str) -> String {
    format!("{}_{:03}{}", folder, position, extension_with_dot(name))
}
