use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use pyrgear_core::{
    apply_plan, app_paths, collect_exif_targets, generate_plan, load_config,
    load_config_or_default, read_exif_report, run, ApplyResult, ExifReport, ModeError,
    OperationAction, RenamePlan, RenameRequest, RuleKind,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "pyrgear", version)]
#[command(about = "Batch file renaming and image metadata inspection")]
struct Cli {
    /// Log every planned and applied operation
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Batch rename files in a directory
    #[command(after_help = RENAME_EXAMPLES)]
    Rename(RenameArgs),
    /// Read EXIF information from image files
    Exif(ExifArgs),
    Config(ConfigArgs),
}

const RENAME_EXAMPLES: &str = r#"Examples:
  pyrgear rename --dir ./my_files --pattern "file_(\d+)" --replacement "document_$1" --recursive
  pyrgear rename --dir ./my_files --rule timestamp
  pyrgear rename --rule foldername-rename --pdir ./albums
  pyrgear rename --rule wx-exporter --source-path /path/to/source --output-dir ./output --pre-name site"#;

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
}

#[derive(Debug, Args)]
struct RenameArgs {
    /// Directory to process
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Regular expression matched against file names
    #[arg(long)]
    pattern: Option<String>,
    /// Replacement for matched names; `$1` and `${name}` insert captures
    #[arg(long, allow_hyphen_values = true)]
    replacement: Option<String>,
    /// timestamp, sequence, lowercase, wx-exporter or foldername-rename
    #[arg(long)]
    rule: Option<String>,
    #[arg(long, default_value_t = false)]
    recursive: bool,
    /// Show what would change without touching any file
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// wx-exporter: directory whose subdirectories hold `assets` folders
    #[arg(long)]
    source_path: Option<PathBuf>,
    /// wx-exporter: where images are copied to
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// wx-exporter: file name prefix, defaults to the source directory name
    #[arg(long)]
    pre_name: Option<String>,
    /// foldername-rename: rename inside every subdirectory of this directory
    #[arg(long)]
    pdir: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Args)]
struct ExifArgs {
    /// Path to a single image file
    #[arg(long, conflicts_with = "dir")]
    image: Option<PathBuf>,
    /// Directory containing image files
    #[arg(long, required_unless_present = "image")]
    dir: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = ExifFormat::Text)]
    format: ExifFormat,
    #[arg(long, default_value_t = false)]
    recursive: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExifFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Rename(args) => cmd_rename(args),
        Commands::Exif(args) => cmd_exif(args),
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn cmd_rename(args: RenameArgs) -> Result<()> {
    let (output_dir, extensions) = if uses_export_config(args.rule.as_deref()) {
        let config = load_config_or_default();
        (
            Some(
                args.output_dir
                    .unwrap_or_else(|| PathBuf::from(&config.export_output_dir)),
            ),
            Some(config.export_image_extensions),
        )
    } else {
        (args.output_dir, None)
    };

    let request = RenameRequest {
        dir: args.dir,
        parent_dir: args.pdir,
        pattern: args.pattern,
        replacement: args.replacement,
        rule: args.rule,
        recursive: args.recursive,
        source_path: args.source_path,
        output_dir,
        prefix: args.pre_name,
        extensions,
    };

    let mode = match request.into_mode() {
        Ok(mode) => mode,
        Err(err) => usage_error(err).exit(),
    };

    match args.output {
        OutputFormat::Json => {
            let report = run(&mode, args.dry_run)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            let plan = generate_plan(&mode)?;
            print_operations(&plan, args.dry_run);
            let applied = if args.dry_run {
                None
            } else {
                Some(apply_plan(&plan)?)
            };
            print_summary(&plan, applied.as_ref());
        }
    }

    Ok(())
}

/// Only wx-exporter reads settings from the config file.
fn uses_export_config(rule: Option<&str>) -> bool {
    rule.and_then(|r| r.parse::<RuleKind>().ok()) == Some(RuleKind::WxExporter)
}

fn usage_error(err: ModeError) -> clap::Error {
    let mut cmd = Cli::command();
    cmd.build();
    match cmd.find_subcommand_mut("rename") {
        Some(rename) => rename.error(ErrorKind::ArgumentConflict, err),
        None => cmd.error(ErrorKind::ArgumentConflict, err),
    }
}

fn print_operations(plan: &RenamePlan, dry_run: bool) {
    for op in &plan.operations {
        let verb = match (op.action, dry_run) {
            (OperationAction::Rename, true) => "Would rename",
            (OperationAction::Rename, false) => "Renaming",
            (OperationAction::Copy, true) => "Would copy",
            (OperationAction::Copy, false) => "Copying",
        };
        println!(
            "{}: {} -> {}",
            verb,
            op.source.display(),
            op.destination.display()
        );
    }
}

fn print_summary(plan: &RenamePlan, applied: Option<&ApplyResult>) {
    eprintln!(
        "\n{}: scanned_dirs={} scanned_files={} planned={} unchanged={} skipped={} warnings={}",
        plan.mode,
        plan.stats.directories_scanned,
        plan.stats.files_scanned,
        plan.stats.planned,
        plan.stats.unchanged,
        plan.stats.skipped,
        plan.warnings.len()
    );
    match applied {
        Some(result) => eprintln!(
            "applied {} (failed {})",
            result.applied,
            result.failures.len()
        ),
        None => eprintln!("dry-run: no files were changed. Run without --dry-run to apply."),
    }
}

fn cmd_exif(args: ExifArgs) -> Result<()> {
    if let Some(image) = args.image {
        let report = read_exif_report(&image)?;
        print_exif(&report, args.format)?;
        return Ok(());
    }

    let Some(dir) = args.dir else {
        anyhow::bail!("either --image or --dir is required");
    };
    let targets = collect_exif_targets(&dir, args.recursive)?;
    for (path, message) in &targets.warnings {
        tracing::warn!(path = %path.display(), "{message}");
    }
    for path in &targets.files {
        match read_exif_report(path) {
            Ok(report) => print_exif(&report, args.format)?,
            Err(err) => tracing::warn!("failed to process {}: {err}", path.display()),
        }
    }
    Ok(())
}

fn print_exif(report: &ExifReport, format: ExifFormat) -> Result<()> {
    match format {
        ExifFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        ExifFormat::Text => {
            println!("\n=== EXIF Information for {} ===", report.path.display());
            for field in &report.fields {
                println!("{:<30}: {}", field.tag, field.value);
            }
            if let Some(gps) = report.gps {
                println!(
                    "{:<30}: {:.6}, {:.6}",
                    "GPS Coordinates", gps.latitude, gps.longitude
                );
            }
            println!();
        }
    }
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("config file: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
