//! Build prompts from a library of reusable fragments.
//!
//! Opens the terminal UI over the fragment library and prompt history
//! stored in the platform data directory, or in `--data-dir`.
//!
//! ```sh
//! promptlib
//! promptlib --data-dir ~/prompts --verbose
//! ```

use std::path::PathBuf;

use clap::Parser;
use promptlib::Workspace;
use promptlib::config::StorageConfig;
use promptlib::logging::UiTracingLayer;
use promptlib_tui::TuiConfig;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Build prompts from a library of reusable fragments.
#[derive(Parser)]
#[command(name = "promptlib", version)]
struct Cli {
    /// Directory holding prompt_elements.csv and prompt_history.csv.
    /// Defaults to the platform data directory.
    #[arg(long, env = "PROMPTLIB_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Capture debug-level logs in the log pane.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // Set up tracing → TUI log buffer.
    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let (tracing_layer, log_buffer) = UiTracingLayer::new();
    tracing_subscriber::registry()
        .with(tracing_layer.with_filter(level))
        .init();

    let mut storage = StorageConfig::default();
    if let Some(dir) = cli.data_dir {
        storage = storage.with_data_dir(dir);
    }

    let workspace = match Workspace::open(&storage) {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("Error: failed to open storage: {e}");
            std::process::exit(1);
        }
    };

    let tui_config = TuiConfig {
        log_buffer: Some(log_buffer),
        ..Default::default()
    };
    if let Err(e) = promptlib_tui::run_tui(&workspace, &tui_config) {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }
}
