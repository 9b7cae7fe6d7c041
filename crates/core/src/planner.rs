use crate::asset_export::plan_asset_export;
use crate::folder_name::plan_folder_name;
use crate::mode::RenameMode;
use crate::pattern::plan_pattern_rename;
use crate::rules::plan_rule_rename;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationAction {
    Rename,
    Copy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenameOperation {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub action: OperationAction,
}

impl RenameOperation {
    pub fn rename(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
            action: OperationAction::Rename,
        }
    }

    pub fn copy(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
            action: OperationAction::Copy,
        }
    }
}

/// Something under the root that could not be planned. The rest of the plan
/// is unaffected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanWarning {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RenameStats {
    pub directories_scanned: usize,
    pub files_scanned: usize,
    pub planned: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamePlan {
    pub mode: String,
    /// Set when the plan copies into an export directory.
    pub output_dir: Option<PathBuf>,
    pub operations: Vec<RenameOperation>,
    pub warnings: Vec<PlanWarning>,
    pub stats: RenameStats,
}

impl RenamePlan {
    pub(crate) fn new(mode: String) -> Self {
        Self {
            mode,
            output_dir: None,
            operations: Vec::new(),
            warnings: Vec::new(),
            stats: RenameStats::default(),
        }
    }

    pub(crate) fn push(&mut self, operation: RenameOperation) {
        tracing::debug!(
            source = %operation.source.display(),
            destination = %operation.destination.display(),
            action = ?operation.action,
            "planned"
        );
        self.stats.planned += 1;
        self.operations.push(operation);
    }

    pub(crate) fn warn(&mut self, path: PathBuf, message: String) {
        tracing::warn!(path = %path.display(), "{message}");
        self.warnings.push(PlanWarning { path, message });
    }

    /// `(source, destination)` pairs in planned order.
    pub fn pairs(&self) -> Vec<(PathBuf, PathBuf)> {
        self.operations
            .iter()
            .map(|op| (op.source.clone(), op.destination.clone()))
            .collect()
    }
}

/// Runs exactly one engine for `mode` without touching the filesystem. The
/// only errors returned are failures to reach the starting directory.
pub fn generate_plan(mode: &RenameMode) -> Result<RenamePlan> {
    let mut plan = RenamePlan::new(mode.label());

    match mode {
        RenameMode::Pattern {
            root,
            pattern,
            replacement,
            recursive,
        } => plan_pattern_rename(root, pattern, replacement, *recursive, &mut plan)?,
        RenameMode::Rule {
            root,
            rule,
            recursive,
        } => plan_rule_rename(root, *rule, *recursive, &mut plan)?,
        RenameMode::FolderName(target) => plan_folder_name(target, &mut plan)?,
        RenameMode::AssetExport(options) => plan_asset_export(options, &mut plan)?,
    }

    Ok(plan)
}
