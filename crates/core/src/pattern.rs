use crate::planner::RenamePlan;
use crate::traversal::walk_renames;
use anyhow::{bail, Result};
use regex::Regex;
use std::path::Path;

/// Renames every file whose name matches `pattern`, substituting `$1`/`${name}`
/// captures into `replacement`. Non-matching files are left alone.
pub fn plan_pattern_rename(
    root: &Path,
    pattern: &Regex,
    replacement: &str,
    recursive: bool,
    plan: &mut RenamePlan,
) -> Result<()> {
    walk_renames(root, recursive, plan, &mut |entry, _| {
        substitute(pattern, replacement, &entry.name)
    })?;
    Ok(())
}

pub fn substitute(pattern: &Regex, replacement: &str, name: &str) -> Result<Option<String>> {
    if !pattern.is_match(name) {
        return Ok(None);
    }
    let renamed = pattern.replace_all(name, replacement);
    if renamed.is_empty() {
        bail!("replacement produced an empty file name for {name}");
    }
    Ok(Some(renamed.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn regex(value: &str) -> Regex {
        Regex::new(value).expect("regex")
    }

    #[test]
    fn substitutes_capture_groups() {
        let re = regex(r"file_(\d+)\.txt");
        assert_eq!(
            substitute(&re, "document_$1.txt", "file_12.txt").expect("substitute"),
            Some("document_12.txt".to_string())
        );
        assert_eq!(
            substitute(&re, "document_$1.txt", "notes.txt").expect("substitute"),
            None
        );
    }

    #[test]
    fn replaces_every_match_in_the_name() {
        let re = regex("-");
        assert_eq!(
            substitute(&re, "_", "a-b-c.txt").expect("substitute"),
            Some("a_b_c.txt".to_string())
        );
    }

    #[test]
    fn empty_result_is_an_item_error() {
        let re = regex(r"^.*$");
        assert!(substitute(&re, "", "gone.txt").is_err());
    }

    #[test]
    fn renames_matching_files_in_directory() {
        let temp = tempdir().expect("tempdir");
        let files = temp.path().join("files");
        fs::create_dir(&files).expect("create files");
        fs::write(files.join("file_1.txt"), b"1").expect("write 1");
        fs::write(files.join("file_2.txt"), b"2").expect("write 2");

        let mut plan = RenamePlan::new("pattern".to_string());
        plan_pattern_rename(
            &files,
            &regex(r"file_(\d+)\.txt"),
            "document_$1.txt",
            false,
            &mut plan,
        )
        .expect("plan");

        assert_eq!(
            plan.pairs(),
            vec![
                (files.join("file_1.txt"), files.join("document_1.txt")),
                (files.join("file_2.txt"), files.join("document_2.txt")),
            ]
        );
    }

    #[test]
    fn zero_matches_leaves_directory_untouched() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("keep.md"), b"k").expect("write");
        fs::create_dir(temp.path().join("file_9.txt")).expect("dir named like a match");

        let mut plan = RenamePlan::new("pattern".to_string());
        plan_pattern_rename(
            temp.path(),
            &regex(r"file_(\d+)\.txt"),
            "document_$1.txt",
            true,
            &mut plan,
        )
        .expect("plan");

        assert!(plan.operations.is_empty());
        assert_eq!(plan.stats.skipped, 1);
    }

    #[test]
    fn recursion_applies_same_pattern_below_root() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path();
        fs::create_dir_all(root.join("a").join("b")).expect("create nested");
        fs::write(root.join("a").join("b").join("file_3.txt"), b"3").expect("write nested");

        let mut flat = RenamePlan::new("pattern".to_string());
        plan_pattern_rename(root, &regex(r"file_(\d+)"), "doc_$1", false, &mut flat)
            .expect("flat plan");
        assert!(flat.operations.is_empty());

        let mut deep = RenamePlan::new("pattern".to_string());
        plan_pattern_rename(root, &regex(r"file_(\d+)"), "doc_$1", true, &mut deep)
            .expect("deep plan");
        assert_eq!(
            deep.pairs(),
            vec![(
                root.join("a").join("b").join("file_3.txt"),
                root.join("a").join("b").join("doc_3.txt")
            )]
        );
    }
}
