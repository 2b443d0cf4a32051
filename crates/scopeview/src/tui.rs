//! Terminal initialization, restoration, and panic-safe cleanup.
//!
//! Wraps the crossterm + ratatui terminal lifecycle so the rest of the app
//! never has to think about raw mode, the alternate screen, or keyboard
//! enhancement flags.

use std::io::{Stdout, stdout};

use color_eyre::eyre::Result;
use crossterm::{
    ExecutableCommand, cursor,
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, warn};

pub type Backend = CrosstermBackend<Stdout>;

/// Something with a measurable size, in cells.
pub trait Surface: Send {
    /// `None` when the size can't be determined right now.
    fn measure(&self) -> Option<(u16, u16)>;
}

/// The real terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSurface;

impl Surface for TerminalSurface {
    fn measure(&self) -> Option<(u16, u16)> {
        match terminal::size() {
            Ok(size) => Some(size),
            Err(e) => {
                warn!(error = %e, "could not measure terminal");
                None
            }
        }
    }
}

/// Terminal wrapper that handles setup, teardown, and panic recovery.
pub struct Tui {
    pub terminal: Terminal<Backend>,
    /// Whether the terminal agreed to report key releases.
    releases_reported: bool,
}

impl Tui {
    /// Create a new terminal instance (does NOT enter raw mode yet).
    pub fn new() -> Result<Self> {
        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        Ok(Self {
            terminal,
            releases_reported: false,
        })
    }

    /// Enter TUI mode: alternate screen, raw mode, hidden cursor, and key
    /// release reporting where the terminal supports it.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        stdout().execute(cursor::Hide)?;

        self.releases_reported = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.releases_reported {
            stdout().execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))?;
        }
        debug!(releases_reported = self.releases_reported, "terminal entered");

        self.terminal.clear()?;
        Ok(())
    }

    /// Exit TUI mode: restore terminal to its original state.
    pub fn exit(&mut self) -> Result<()> {
        // Best-effort restoration; keep going on partial failures
        if self.releases_reported {
            let _ = stdout().execute(PopKeyboardEnhancementFlags);
            self.releases_reported = false;
        }
        let _ = stdout().execute(cursor::Show);
        let _ = stdout().execute(LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        Ok(())
    }

    /// Whether key releases arrive as their own events.
    pub fn releases_reported(&self) -> bool {
        self.releases_reported
    }

    /// Draw a frame using the provided render closure.
    pub fn draw<F>(&mut self, render: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.exit();
    }
}

/// Install panic and error hooks that restore the terminal before printing.
///
/// Must be called BEFORE entering the terminal, so panics during init
/// also get clean output.
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .into_hooks();

    eyre_hook.install()?;

    let panic_hook = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = stdout().execute(PopKeyboardEnhancementFlags);
        let _ = stdout().execute(cursor::Show);
        let _ = stdout().execute(LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();

        panic_hook(info);
    }));

    Ok(())
}
