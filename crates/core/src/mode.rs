use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_EXPORT_DIR: &str = "wx-export";
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

#[derive(Debug, Error)]
pub enum ModeError {
    #[error("either --pattern or --rule is required")]
    NothingSelected,
    #[error("--pattern and --rule cannot be used together")]
    PatternAndRule,
    #[error("--replacement is required with --pattern")]
    MissingReplacement,
    #[error("--replacement can only be used with --pattern")]
    ReplacementWithoutPattern,
    #[error("--dir is required for this operation")]
    MissingDirectory,
    #[error("specify either --dir or --pdir, but not both, for the foldername-rename rule")]
    FolderTargetConflict,
    #[error("--pdir can only be used with the foldername-rename rule")]
    UnexpectedParentDir,
    #[error("unknown rule type: {0} (expected timestamp, sequence, lowercase, wx-exporter or foldername-rename)")]
    UnknownRule(String),
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Timestamp,
    Sequence,
    Lowercase,
    WxExporter,
    FoldernameRename,
}

impl FromStr for RuleKind {
    type Err = ModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "timestamp" => Ok(Self::Timestamp),
            "sequence" => Ok(Self::Sequence),
            "lowercase" => Ok(Self::Lowercase),
            "wx-exporter" => Ok(Self::WxExporter),
            "foldername-rename" => Ok(Self::FoldernameRename),
            _ => Err(ModeError::UnknownRule(value.to_string())),
        }
    }
}

/// The per-directory rules that share the generic traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedRule {
    Timestamp,
    Sequence,
    Lowercase,
}

impl fmt::Display for NamedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timestamp => "timestamp",
            Self::Sequence => "sequence",
            Self::Lowercase => "lowercase",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderTarget {
    Single(PathBuf),
    /// Every immediate subdirectory of the parent, each numbered on its own.
    Batch(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// `None` means the current working directory.
    pub source: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// `None` means the base name of the source directory.
    pub prefix: Option<String>,
    /// Lowercase, dot included.
    pub extensions: Vec<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            source: None,
            output_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            prefix: None,
            extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RenameMode {
    Pattern {
        root: PathBuf,
        pattern: Regex,
        replacement: String,
        recursive: bool,
    },
    Rule {
        root: PathBuf,
        rule: NamedRule,
        recursive: bool,
    },
    FolderName(FolderTarget),
    AssetExport(ExportOptions),
}

impl RenameMode {
    pub fn label(&self) -> String {
        match self {
            Self::Pattern { .. } => "pattern".to_string(),
            Self::Rule { rule, .. } => rule.to_string(),
            Self::FolderName(_) => "foldername-rename".to_string(),
            Self::AssetExport(_) => "wx-exporter".to_string(),
        }
    }
}

/// Flat view of the `rename` flags, before any cross-flag validation.
#[derive(Debug, Clone, Default)]
pub struct RenameRequest {
    pub dir: Option<PathBuf>,
    pub parent_dir: Option<PathBuf>,
    pub pattern: Option<String>,
    pub replacement: Option<String>,
    pub rule: Option<String>,
    pub recursive: bool,
    pub source_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub prefix: Option<String>,
    pub extensions: Option<Vec<String>>,
}

impl RenameRequest {
    pub fn into_mode(self) -> Result<RenameMode, ModeError> {
        let rule = self
            .rule
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .map(RuleKind::from_str)
            .transpose()?;
        let pattern = self.pattern.filter(|p| !p.is_empty());

        match (pattern, rule) {
            (Some(_), Some(_)) => Err(ModeError::PatternAndRule),
            (None, None) => {
                if self.replacement.is_some() {
                    Err(ModeError::ReplacementWithoutPattern)
                } else {
                    Err(ModeError::NothingSelected)
                }
            }
            (Some(pattern), None) => {
                if self.parent_dir.is_some() {
                    return Err(ModeError::UnexpectedParentDir);
                }
                let replacement = self.replacement.ok_or(ModeError::MissingReplacement)?;
                let root = self.dir.ok_or(ModeError::MissingDirectory)?;
                let pattern = Regex::new(&pattern)?;
                Ok(RenameMode::Pattern {
                    root,
                    pattern,
                    replacement,
                    recursive: self.recursive,
                })
            }
            (None, Some(kind)) => {
                if self.replacement.is_some() {
                    return Err(ModeError::ReplacementWithoutPattern);
                }
                match kind {
                    RuleKind::FoldernameRename => {
                        let target = match (self.dir, self.parent_dir) {
                            (Some(dir), None) => FolderTarget::Single(dir),
                            (None, Some(parent)) => FolderTarget::Batch(parent),
                            _ => return Err(ModeError::FolderTargetConflict),
                        };
                        if self.recursive {
                            tracing::warn!("--recursive has no effect on foldername-rename");
                        }
                        Ok(RenameMode::FolderName(target))
                    }
                    RuleKind::WxExporter => {
                        if self.parent_dir.is_some() {
                            return Err(ModeError::UnexpectedParentDir);
                        }
                        if self.recursive {
                            tracing::warn!("--recursive has no effect on wx-exporter");
                        }
                        let defaults = ExportOptions::default();
                        Ok(RenameMode::AssetExport(ExportOptions {
                            source: self.source_path,
                            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
                            prefix: self.prefix.filter(|p| !p.is_empty()),
                            extensions: self
                                .extensions
                                .map(|exts| exts.iter().map(|e| normalize_extension(e)).collect())
                                .unwrap_or(defaults.extensions),
                        }))
                    }
                    RuleKind::Timestamp | RuleKind::Sequence | RuleKind::Lowercase => {
                        if self.parent_dir.is_some() {
                            return Err(ModeError::UnexpectedParentDir);
                        }
                        let root = self.dir.ok_or(ModeError::MissingDirectory)?;
                        let rule = match kind {
                            RuleKind::Timestamp => NamedRule::Timestamp,
                            RuleKind::Sequence => NamedRule::Sequence,
                            _ => NamedRule::Lowercase,
                        };
                        Ok(RenameMode::Rule {
                            root,
                            rule,
                            recursive: self.recursive,
                        })
                    }
                }
            }
        }
    }
}

/// `"PNG"` and `".png"` both become `".png"`.
pub fn normalize_extension(value: &str) -> String {
    let lower = value.trim().to_ascii_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}
