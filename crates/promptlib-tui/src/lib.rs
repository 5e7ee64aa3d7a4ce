//! Terminal front end for promptlib.
//!
//! Four views over one [`Workspace`]: Element Creator, Element Editor,
//! Prompt Builder and Browse Prompts (ratatui + crossterm). The loop is
//! single-threaded: draw, wait up to [`TuiConfig::poll_interval`] for a
//! key, handle it, reload both tables.
//!
//! ```no_run
//! use promptlib::Workspace;
//! use promptlib::config::StorageConfig;
//! use promptlib_tui::{TuiConfig, run_tui};
//!
//! let workspace = Workspace::open(&StorageConfig::default()).unwrap();
//! run_tui(&workspace, &TuiConfig::default()).unwrap();
//! ```

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{cursor, execute};
use promptlib::Workspace;
use promptlib::logging::LogBuffer;
use ratatui::prelude::*;

mod app;
mod input;
mod render;

pub use render::{log_level_style, one_line_preview, truncate_str};

use app::App;
use input::handle_key_event;
use render::render;

/// Configuration for the TUI.
pub struct TuiConfig {
    /// Optional log buffer from the tracing layer.
    ///
    /// When set, the TUI drains pending log lines once per frame into its
    /// own bounded history, shown in the log pane and the status line.
    pub log_buffer: Option<LogBuffer>,
    /// How long to wait for a key before redrawing.
    pub poll_interval: Duration,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            log_buffer: None,
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Run the TUI event loop (blocking) until the user quits.
///
/// The terminal is restored even when the loop fails.
pub fn run_tui(workspace: &Workspace, config: &TuiConfig) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut app = App::new(workspace);

    let result = event_loop(&mut terminal, &mut app, workspace, config);

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;
    terminal.show_cursor()?;
    result
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    workspace: &Workspace,
    config: &TuiConfig,
) -> io::Result<()> {
    while !app.should_quit {
        if let Some(ref log_buf) = config.log_buffer {
            log_buf.flush_into(&mut app.logs);
        }

        terminal.draw(|frame| render(frame, app))?;

        if event::poll(config.poll_interval)?
            && let Event::Key(key) = event::read()?
        {
            handle_key_event(key, app, workspace);
        }
    }
    Ok(())
}
