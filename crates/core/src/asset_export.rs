use crate::fs_util::{dir_basename, ensure_dir, extension_with_dot, list_entries, RootAccessError};
use crate::mode::ExportOptions;
use crate::planner::{RenameOperation, RenamePlan};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const ASSETS_DIR_NAME: &str = "assets";

/// Independent 1-based counters, one per scope key. Lives for one export.
#[derive(Debug, Default)]
pub struct SequenceCounters {
    counters: HashMap<String, u32>,
}

impl SequenceCounters {
    pub fn next(&mut self, scope: &str) -> u32 {
        let counter = self.counters.entry(scope.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }
}

/// Plans copies of `<source>/<page>/assets/<image>` into
/// `<output_dir>/<prefix>_<page>_<nnn><ext>`.
///
/// Only the direct children of each `assets` folder are considered. Pages
/// without an `assets` folder are skipped.
pub fn plan_asset_export(options: &ExportOptions, plan: &mut RenamePlan) -> Result<()> {
    let source = match &options.source {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("failed to get current directory")?,
    };
    ensure_dir(&source)?;

    let prefix = match &options.prefix {
        Some(prefix) => prefix.clone(),
        None => dir_basename(&source)?,
    };

    let listing = list_entries(&source).map_err(|source_err| RootAccessError::Unreadable {
        path: source.clone(),
        source: source_err,
    })?;
    for (path, message) in listing.rejected {
        plan.warn(path, message);
    }

    plan.output_dir = Some(options.output_dir.clone());

    let pages: Vec<_> = listing.entries.iter().filter(|e| e.is_dir()).collect();
    if pages.is_empty() {
        plan.warn(
            source.clone(),
            format!("no subdirectories found in {}", source.display()),
        );
        return Ok(());
    }

    let mut counters = SequenceCounters::default();
    for page in pages {
        plan.stats.directories_scanned += 1;
        plan_page(&page.path, &page.name, &prefix, options, &mut counters, plan);
    }

    Ok(())
}

fn plan_page(
    page_dir: &Path,
    page_name: &str,
    prefix: &str,
    options: &ExportOptions,
    counters: &mut SequenceCounters,
    plan: &mut RenamePlan,
) {
    let assets_dir = page_dir.join(ASSETS_DIR_NAME);
    match fs::metadata(&assets_dir) {
        Ok(meta) if meta.is_dir() => {}
        _ => {
            tracing::info!(page = %page_dir.display(), "no assets folder, skipping");
            return;
        }
    }

    let listing = match list_entries(&assets_dir) {
        Ok(listing) => listing,
        Err(err) => {
            plan.warn(
                assets_dir,
                format!("failed to read assets directory: {err}"),
            );
            return;
        }
    };
    for (path, message) in listing.rejected {
        plan.warn(path, message);
    }

    for file in listing.entries.iter().filter(|e| !e.is_dir()) {
        plan.stats.files_scanned += 1;
        let ext = extension_with_dot(&file.name);
        if !is_exported_extension(ext, &options.extensions) {
            plan.stats.skipped += 1;
            continue;
        }

        let sequence = counters.next(page_name);
        plan.push(RenameOperation::copy(
            file.path.clone(),
            export_target(&options.output_dir, prefix, page_name, sequence, ext),
        ));
    }
}

fn is_exported_extension(ext: &str, allowed: &[String]) -> bool {
    let lower = ext.to_ascii_lowercase();
    allowed.iter().any(|candidate| candidate == &lower)
}

pub fn export_target(
    output_dir: &Path,
    prefix: &str,
    page_name: &str,
    sequence: u32,
    ext: &str,
) -> PathBuf {
    output_dir.join(format!("{}_{}_{:03}{}", prefix, page_name, sequence, ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent dirs must be creatable");
        }
        File::create(path).expect("file must be creatable");
    }

    fn options(source: &Path, output_dir: &Path, prefix: Option<&str>) -> ExportOptions {
        ExportOptions {
            source: Some(source.to_path_buf()),
            output_dir: output_dir.to_path_buf(),
            prefix: prefix.map(str::to_string),
            ..ExportOptions::default()
        }
    }

    fn destination_names(plan: &RenamePlan) -> Vec<String> {
        plan.operations
            .iter()
            .map(|op| {
                op.destination
                    .file_name()
                    .map(|v| v.to_string_lossy().to_string())
                    .unwrap_or_default()
            })
            .collect()
    }

    #[test]
    fn counters_are_independent_per_scope() {
        let mut counters = SequenceCounters::default();
        assert_eq!(counters.next("page1"), 1);
        assert_eq!(counters.next("page1"), 2);
        assert_eq!(counters.next("page2"), 1);
        assert_eq!(counters.next("page1"), 3);
    }

    #[test]
    fn each_page_gets_its_own_sequence() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("path1");
        let out = temp.path().join("out");
        touch(&source.join("page1/assets/img.png"));
        touch(&source.join("page2/assets/icon.jpg"));

        let mut plan = RenamePlan::new("wx-exporter".to_string());
        plan_asset_export(&options(&source, &out, Some("site")), &mut plan).expect("plan");

        assert_eq!(
            plan.pairs(),
            vec![
                (
                    source.join("page1/assets/img.png"),
                    out.join("site_page1_001.png")
                ),
                (
                    source.join("page2/assets/icon.jpg"),
                    out.join("site_page2_001.jpg")
                ),
            ]
        );
        assert_eq!(plan.output_dir.as_deref(), Some(out.as_path()));
    }

    #[test]
    fn filters_extensions_and_nested_folders() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("project");
        let out = temp.path().join("out");
        touch(&source.join("home/assets/a.PNG"));
        touch(&source.join("home/assets/b.txt"));
        touch(&source.join("home/assets/c.webp"));
        touch(&source.join("home/assets/deeper/d.png"));
        touch(&source.join("home/assets/deeper/assets/e.png"));
        touch(&source.join("home/other/assets/f.png"));
        touch(&source.join("home/f.png"));

        let mut plan = RenamePlan::new("wx-exporter".to_string());
        plan_asset_export(&options(&source, &out, None), &mut plan).expect("plan");

        assert_eq!(
            destination_names(&plan),
            vec!["project_home_001.PNG", "project_home_002.webp"]
        );
        assert_eq!(plan.stats.skipped, 1);
    }

    #[test]
    fn pages_without_assets_are_skipped_silently() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("src");
        touch(&source.join("empty_page/readme.md"));
        touch(&source.join("file_page/assets"));
        touch(&source.join("real/assets/x.gif"));

        let mut plan = RenamePlan::new("wx-exporter".to_string());
        plan_asset_export(&options(&source, &temp.path().join("o"), Some("p")), &mut plan)
            .expect("plan");

        assert_eq!(destination_names(&plan), vec!["p_real_001.gif"]);
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn no_subdirectories_is_a_warning() {
        let temp = tempdir().expect("tempdir");
        touch(&temp.path().join("lonely.png"));

        let mut plan = RenamePlan::new("wx-exporter".to_string());
        plan_asset_export(&options(temp.path(), &temp.path().join("o"), None), &mut plan)
            .expect("no subdirectories is not an error");

        assert!(plan.operations.is_empty());
        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].message.contains("no subdirectories"));
    }

    #[test]
    fn missing_source_is_root_error() {
        let temp = tempdir().expect("tempdir");
        let mut plan = RenamePlan::new("wx-exporter".to_string());
        let err = plan_asset_export(
            &options(&temp.path().join("nope"), &temp.path().join("o"), None),
            &mut plan,
        )
        .expect_err("missing source");
        assert!(err.downcast_ref::<RootAccessError>().is_some());
        assert!(plan.output_dir.is_none());
    }
}
