//! Folio - a terminal e-reader with chapter-aware pagination.
//!
//! # Usage
//!
//! ```bash
//! folio moby-dick.txt
//! folio --watch chapters/
//! folio --margin 4 --line-height 2 book.txt
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use folio::app::App;
use folio::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use folio::perf;
use folio::progress::{ProgressStore, default_progress_path};

/// A terminal e-reader with chapter-aware pagination
#[derive(Parser, Debug)]
#[command(name = "folio", version, about, long_about = None)]
struct Cli {
    /// Book to read: a text file or a directory of chapter files
    #[arg(value_name = "BOOK")]
    book: PathBuf,

    /// Reload when the book changes on disk
    #[arg(short, long)]
    watch: bool,

    /// Neither restore nor save the reading position
    #[arg(long)]
    no_progress: bool,

    /// Horizontal page margin in columns [default: 2]
    #[arg(long, value_name = "N")]
    margin: Option<u16>,

    /// Vertical page margin in rows [default: 0]
    #[arg(long, value_name = "N")]
    margin_y: Option<u16>,

    /// Terminal rows per text line [default: 1]
    #[arg(long, value_name = "N")]
    line_height: Option<u16>,

    /// Chapters kept loaded on each side of the current one [default: 2]
    #[arg(long, value_name = "N")]
    cache_radius: Option<usize>,

    /// Print timing information to stderr
    #[arg(long)]
    perf: bool,

    /// Write detailed load/render debug events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os(perf::DEBUG_LOG_ENV).map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize render debug log {}: {}",
            render_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    if !cli.book.exists() {
        anyhow::bail!("Book not found: {}", cli.book.display());
    }

    let progress = (!effective.no_progress).then(|| ProgressStore::new(default_progress_path()));

    let app = App::new(cli.book)
        .with_flags(effective)
        .with_progress(progress)
        .with_config_paths(
            Some(global_path.clone()),
            if local_path.exists() {
                Some(local_path.clone())
            } else {
                None
            },
        );

    app.run().context("Application error")
}
