//! twiddler-ctl: manage Twiddler chorded keyboard configs.
//!
//! # Usage
//!
//! ```text
//! twiddler-ctl [OPTIONS] <COMMAND>
//!
//! Commands:
//!   convert      Convert configs between the text and binary formats
//!   convert-log  Convert untethered keystroke recordings
//!   sync         Push configs to a mounted device
//!   dump         List valid identifiers for the text format
//!   visualize    Draw every chord in a config as braille charts
//!
//! Options:
//!   --layout <NAME>      Keyboard layout [env: TWIDDLER_LAYOUT] [default: default]
//!   --layout-dir <DIR>   Extra layout JSON files [env: TWIDDLER_LAYOUT_DIR]
//!   -v, --verbose        More log output (-v info, -vv debug)
//! ```
//!
//! Logs go to standard error; `RUST_LOG` overrides `-v`.

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use twiddler_core::layout::DEFAULT_LAYOUT;
use twiddler_core::{LayoutTranslator, UnknownPolicy};

use twiddler_ctl::application::convert::{convert, ConvertOptions};
use twiddler_ctl::application::convert_log::convert_log;
use twiddler_ctl::application::dump::{entries, Table};
use twiddler_ctl::application::sync::sync;
use twiddler_ctl::application::visualize::{charts, render};
use twiddler_ctl::application::Session;
use twiddler_ctl::infrastructure::files::{load_layouts, read_config, FileFormat};
use twiddler_ctl::infrastructure::sync_config::{SyncPlan, DEFAULT_SYNC_CONFIG};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Manage Twiddler configs.
#[derive(Debug, Parser)]
#[command(name = "twiddler-ctl", about = "Manage Twiddler chorded keyboard configs", version)]
struct Cli {
    /// Keyboard layout used to resolve key names.
    ///
    /// Defaults to `default`; for `sync` the settings file's layout is used
    /// when this is not given.
    #[arg(long, global = true, env = "TWIDDLER_LAYOUT")]
    layout: Option<String>,

    /// Directory of extra layout JSON files, loaded after the built-in ones.
    #[arg(long, global = true, env = "TWIDDLER_LAYOUT_DIR")]
    layout_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert configs between the text and binary formats.
    Convert(ConvertArgs),
    /// Convert untethered keystroke recordings between text and binary.
    ConvertLog(ConvertLogArgs),
    /// Push configs to a mounted device, rewriting only changed slots.
    Sync(SyncArgs),
    /// List valid identifiers for the text format.
    Dump(DumpArgs),
    /// Draw every chord in a config as braille charts.
    Visualize(VisualizeArgs),
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Input file (`.cfg` is read as binary, anything else as text).
    input: PathBuf,
    /// Output file (`.cfg` is written as binary, anything else as text).
    output: PathBuf,
    #[arg(long, value_enum)]
    input_format: Option<FileFormat>,
    #[arg(long, value_enum)]
    output_format: Option<FileFormat>,
    /// Drop unknown names from text input instead of failing.
    #[arg(long)]
    skip_unknown: bool,
}

#[derive(Debug, Args)]
struct ConvertLogArgs {
    /// Input file (`.log` is read as binary, anything else as text).
    input: PathBuf,
    /// Output file (`.log` is written as binary, anything else as text).
    output: PathBuf,
    #[arg(long, value_enum)]
    input_format: Option<FileFormat>,
    #[arg(long, value_enum)]
    output_format: Option<FileFormat>,
}

#[derive(Debug, Args)]
struct SyncArgs {
    /// Sync settings file.
    #[arg(long, default_value = DEFAULT_SYNC_CONFIG)]
    config: PathBuf,
}

#[derive(Debug, Args)]
struct DumpArgs {
    #[arg(long, value_enum, default_value_t = Table::Keys)]
    table: Table,
}

#[derive(Debug, Args)]
struct VisualizeArgs {
    input: PathBuf,
    #[arg(long, value_enum)]
    input_format: Option<FileFormat>,
    /// Terminal width in columns.
    #[arg(long, env = "COLUMNS", default_value_t = 80)]
    width: usize,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}

/// Installs the log subscriber.  `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let translator = load_layouts(cli.layout_dir.as_deref())?;

    // The sync settings file may name the layout, so it is read before the
    // session is opened.
    let plan = match &cli.command {
        Command::Sync(args) => Some(
            SyncPlan::load(&args.config)
                .with_context(|| format!("cannot sync with {}", args.config.display()))?,
        ),
        _ => None,
    };
    let layout = cli.layout.or_else(|| plan.as_ref().and_then(|p| p.layout.clone()));
    let session = open_session(translator, layout)?;

    match cli.command {
        Command::Convert(args) => {
            let options = ConvertOptions {
                input_format: args.input_format,
                output_format: args.output_format,
                policy: if args.skip_unknown {
                    UnknownPolicy::Skip
                } else {
                    UnknownPolicy::Abort
                },
            };
            convert(&session, &args.input, &args.output, options)?;
            println!("Wrote config to {}", args.output.display());
        }
        Command::ConvertLog(args) => {
            convert_log(&session, &args.input, &args.output, args.input_format, args.output_format)?;
            println!("Wrote log to {}", args.output.display());
        }
        Command::Sync(_) => {
            if let Some(plan) = &plan {
                for update in sync(plan, &session)? {
                    println!("Updating {}.cfg with {}", update.slot, update.source.display());
                }
            }
        }
        Command::Dump(args) => {
            for name in entries(args.table, &session)? {
                println!("{name}");
            }
        }
        Command::Visualize(args) => {
            let format = FileFormat::for_config(&args.input, args.input_format);
            let config = read_config(&args.input, format, &session, UnknownPolicy::Abort)?;
            print!("{}", render(&charts(&config), args.width));
        }
    }
    Ok(())
}

fn open_session(translator: LayoutTranslator, layout: Option<String>) -> anyhow::Result<Session> {
    let layout = layout.unwrap_or_else(|| DEFAULT_LAYOUT.to_string());
    debug!(layout = %layout, "opening session");
    Ok(Session::new(translator, layout)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_defaults() {
        // Arrange / Act
        let cli = Cli::parse_from(["twiddler-ctl", "convert", "in.ini", "1.cfg"]);

        // Assert
        assert_eq!(cli.layout, None);
        assert_eq!(cli.verbose, 0);
        match cli.command {
            Command::Convert(args) => {
                assert_eq!(args.input, PathBuf::from("in.ini"));
                assert_eq!(args.output, PathBuf::from("1.cfg"));
                assert_eq!(args.input_format, None);
                assert!(!args.skip_unknown);
            }
            other => panic!("expected convert, got {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "twiddler-ctl",
            "convert-log",
            "rec.log",
            "rec.txt",
            "--layout",
            "de_de",
            "-vv",
            "--output-format",
            "text",
        ]);

        assert_eq!(cli.layout.as_deref(), Some("de_de"));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::ConvertLog(args) => assert_eq!(args.output_format, Some(FileFormat::Text)),
            other => panic!("expected convert-log, got {other:?}"),
        }
    }

    #[test]
    fn test_sync_default_settings_file() {
        let cli = Cli::parse_from(["twiddler-ctl", "sync"]);

        match cli.command {
            Command::Sync(args) => assert_eq!(args.config, PathBuf::from(DEFAULT_SYNC_CONFIG)),
            other => panic!("expected sync, got {other:?}"),
        }
    }

    #[test]
    fn test_dump_table_names() {
        let cli = Cli::parse_from(["twiddler-ctl", "dump", "--table", "application-keys"]);

        match cli.command {
            Command::Dump(args) => assert_eq!(args.table, Table::ApplicationKeys),
            other => panic!("expected dump, got {other:?}"),
        }
    }

    #[test]
    fn test_visualize_width_flag() {
        let cli = Cli::parse_from(["twiddler-ctl", "visualize", "1.cfg", "--width", "40"]);

        match cli.command {
            Command::Visualize(args) => assert_eq!(args.width, 40),
            other => panic!("expected visualize, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_layout_fails_before_reading_input() {
        let cli = Cli::parse_from(["twiddler-ctl", "--layout", "xx_yy", "convert", "/nonexistent/in.ini", "out.cfg"]);

        let err = run(cli).unwrap_err();

        assert!(err.to_string().contains("xx_yy"));
    }
}
