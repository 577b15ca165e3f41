use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::{ArgAction, Parser};

use pageink::config::Config;
use pageink::replay;
use pageink::session::{self, SessionInspection, SessionOptions};
use pageink::{PersistenceStore, Settings};

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PAGEINK_GIT_HASH"), ")");

#[derive(Parser, Debug)]
#[command(name = "pageink")]
#[command(
    version,
    long_version = LONG_VERSION,
    about = "Stylus annotation engine for paginated documents on e-ink displays"
)]
struct Cli {
    /// Directory holding the document's annotation file
    #[arg(long, value_name = "DIR")]
    sidecar: Option<PathBuf>,

    /// Configuration file (defaults to ~/.config/pageink/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show what the annotation file holds
    #[arg(long, action = ArgAction::SetTrue, conflicts_with_all = ["clear", "replay"])]
    info: bool,

    /// Delete the annotation file, its backup and its lock
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "replay")]
    clear: bool,

    /// Feed a JSON event script through the annotator and save the result
    #[arg(long, value_name = "SCRIPT")]
    replay: Option<PathBuf>,

    /// Logical screen width for --replay
    #[arg(long, default_value_t = 1072, requires = "replay")]
    width: i32,

    /// Logical screen height for --replay
    #[arg(long, default_value_t = 1448, requires = "replay")]
    height: i32,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let sidecar = cli.sidecar.clone().unwrap_or_else(session::default_sidecar_dir);
    let options = session::options_from_config(&config.session, &sidecar);

    if cli.info {
        let inspection = session::inspect_session(&options)?;
        print_inspection(&inspection);
    } else if cli.clear {
        let outcome = session::clear_session(&options)?;
        if outcome.removed_session || outcome.removed_backup {
            println!("Removed annotations in {}", sidecar.display());
        } else {
            println!("No annotations in {}", sidecar.display());
        }
    } else if let Some(script_path) = &cli.replay {
        run_replay(script_path, &config, options, cli.width, cli.height)?;
    } else {
        println!("pageink: Stylus annotation engine for paginated documents on e-ink displays");
        println!();
        println!("Usage:");
        println!("  pageink --sidecar DIR --info             Show stored annotations");
        println!("  pageink --sidecar DIR --clear            Delete stored annotations");
        println!("  pageink --sidecar DIR --replay SCRIPT    Replay an event script");
        println!("  pageink --help                           Show help");
    }

    Ok(())
}

fn run_replay(
    script_path: &Path,
    config: &Config,
    options: SessionOptions,
    width: i32,
    height: i32,
) -> Result<()> {
    let script = replay::load_script(script_path)?;
    let settings = Settings::from_config(config);
    let report = replay::run_script(
        &script,
        settings,
        width,
        height,
        Some(PersistenceStore::new(options)),
    )
    .with_context(|| format!("Replay of {} failed", script_path.display()))?;

    println!("Events:  {}", report.events);
    println!("Strokes: {}", report.strokes);
    for (page, count) in &report.pages {
        println!("  page {}: {}", page.as_str(), count);
    }
    println!(
        "Refreshes: {} partial, {} fast, {} full",
        report.partial_refreshes, report.fast_refreshes, report.full_refreshes
    );
    for signal in &report.signals {
        println!("Signal: {:?}", signal);
    }
    match report.saved {
        Some(outcome) => println!("Save: {:?}", outcome),
        None => println!("Save: skipped"),
    }
    Ok(())
}

fn print_inspection(inspection: &SessionInspection) {
    println!("Annotation file: {}", inspection.session_path.display());
    if !inspection.exists {
        println!("  (not present)");
    } else {
        if let Some(size) = inspection.size_bytes {
            println!("  Size: {} bytes", size);
        }
        if let Some(modified) = inspection.modified {
            let local: DateTime<Local> = modified.into();
            println!("  Modified: {}", local.format("%Y-%m-%d %H:%M:%S"));
        }
        println!("  Compressed: {}", if inspection.compressed { "yes" } else { "no" });
        match &inspection.page_counts {
            Some(counts) => {
                println!("  Strokes: {}", inspection.total_strokes());
                for (page, count) in counts {
                    println!("    page {}: {}", page.as_str(), count);
                }
            }
            None => println!("  Strokes: unreadable"),
        }
        if inspection.skipped_records > 0 {
            println!("  Skipped records: {}", inspection.skipped_records);
        }
    }
    if inspection.backup_exists {
        println!(
            "Backup: {} ({} bytes)",
            inspection.backup_path.display(),
            inspection.backup_size_bytes.unwrap_or(0)
        );
    } else {
        println!("Backup: none");
    }
}
