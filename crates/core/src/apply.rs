use crate::fs_util::copy_file;
use crate::mode::RenameMode;
use crate::planner::{generate_plan, OperationAction, RenameOperation, RenamePlan};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationFailure {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApplyResult {
    pub applied: usize,
    pub failures: Vec<OperationFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub plan: RenamePlan,
    pub applied: Option<ApplyResult>,
}

/// Plans `mode` and, unless `dry_run`, applies the plan. Both paths share the
/// same plan, so a dry run lists exactly what an execution would do.
pub fn run(mode: &RenameMode, dry_run: bool) -> Result<RunReport> {
    let plan = generate_plan(mode)?;
    let applied = if dry_run {
        None
    } else {
        Some(apply_plan(&plan)?)
    };
    Ok(RunReport {
        dry_run,
        plan,
        applied,
    })
}

/// Performs every operation in order. A failing operation is recorded and
/// the rest still run; only failing to create the export directory aborts.
pub fn apply_plan(plan: &RenamePlan) -> Result<ApplyResult> {
    if let Some(output_dir) = plan.output_dir.as_ref() {
        fs::create_dir_all(output_dir).with_context(|| {
            format!(
                "failed to create output directory {}",
                output_dir.display()
            )
        })?;
    }

    let mut result = ApplyResult::default();
    for operation in &plan.operations {
        match perform(operation) {
            Ok(()) => {
                tracing::debug!(
                    source = %operation.source.display(),
                    destination = %operation.destination.display(),
                    "applied"
                );
                result.applied += 1;
            }
            Err(err) => {
                let message = format!("{err:#}");
                tracing::warn!(
                    source = %operation.source.display(),
                    destination = %operation.destination.display(),
                    "{message}"
                );
                result.failures.push(OperationFailure {
                    source: operation.source.clone(),
                    destination: operation.destination.clone(),
                    message,
                });
            }
        }
    }

    Ok(result)
}

fn perform(operation: &RenameOperation) -> Result<()> {
    match operation.action {
        OperationAction::Rename => {
            fs::rename(&operation.source, &operation.destination).with_context(|| {
                format!(
                    "failed to rename {} -> {}",
                    operation.source.display(),
                    operation.destination.display()
                )
            })
        }
        OperationAction::Copy => copy_file(&operation.source, &operation.destination).map(|_| ()),
    }
}
