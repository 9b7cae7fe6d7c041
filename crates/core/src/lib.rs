mod apply;
mod asset_export;
mod config;
mod exif_reader;
mod folder_name;
mod fs_util;
mod mode;
mod pattern;
mod planner;
mod rules;
mod traversal;

pub use apply::{apply_plan, run, ApplyResult, OperationFailure, RunReport};
pub use asset_export::{export_target, SequenceCounters, ASSETS_DIR_NAME};
pub use config::{
    app_paths, load_config, load_config_from, load_config_or_default, load_config_or_default_from,
    AppConfig, AppPaths,
};
pub use exif_reader::{
    collect_exif_targets, is_exif_candidate, read_exif_report, ExifError, ExifField, ExifReport,
    ExifTargets, GpsCoordinates, EXIF_EXTENSIONS,
};
pub use folder_name::folder_sequence_name;
pub use fs_util::{
    copy_file, dir_basename, ensure_dir, extension_with_dot, list_entries, DirEntryInfo,
    DirListing, EntryKind, RootAccessError,
};
pub use mode::{
    normalize_extension, ExportOptions, FolderTarget, ModeError, NamedRule, RenameMode,
    RenameRequest, RuleKind, DEFAULT_EXPORT_DIR, DEFAULT_IMAGE_EXTENSIONS,
};
pub use pattern::substitute;
pub use planner::{
    generate_plan, OperationAction, PlanWarning, RenameOperation, RenamePlan, RenameStats,
};
pub use rules::{lowercase_name, sequence_name, timestamp_name, TIMESTAMP_FORMAT};
