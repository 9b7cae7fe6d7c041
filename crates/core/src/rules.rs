use crate::fs_util::{extension_with_dot, DirEntryInfo};
use crate::mode::NamedRule;
use crate::planner::RenamePlan;
use crate::traversal::walk_renames;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::Path;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub fn plan_rule_rename(
    root: &Path,
    rule: NamedRule,
    recursive: bool,
    plan: &mut RenamePlan,
) -> Result<()> {
    walk_renames(root, recursive, plan, &mut |entry, position| match rule {
        NamedRule::Timestamp => timestamp_name(entry).map(Some),
        NamedRule::Sequence => Ok(Some(sequence_name(&entry.name, position))),
        NamedRule::Lowercase => Ok(lowercase_name(&entry.name)),
    })?;
    Ok(())
}

/// `<mtime as YYYYMMDD_HHMMSS>_<name>`, using the file's own modification time
/// in local time.
pub fn timestamp_name(entry: &DirEntryInfo) -> Result<String> {
    let modified = entry
        .modified
        .with_context(|| format!("failed to read modification time: {}", entry.path.display()))?;
    let stamp = DateTime::<Local>::from(modified).format(TIMESTAMP_FORMAT);
    Ok(format!("{}_{}", stamp, entry.name))
}

pub fn sequence_name(name: &str, position: usize) -> String {
    format!("file_{:03}{}", position, extension_with_dot(name))
}

/// `None` when the name is already lowercase.
pub fn lowercase_name(name: &str) -> Option<String> {
    let lower = name.to_lowercase();
    (lower != name).then_some(lower)
}
