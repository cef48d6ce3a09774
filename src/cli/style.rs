//! Terminal styling helpers
//!
//! Output goes through `anstream`, which strips ANSI codes when stdout is
//! not a terminal, so these helpers always emit colors.

use indicatif::ProgressStyle;
use owo_colors::OwoColorize;
use std::fmt::Display;

/// Check mark used for completed steps
pub const CHECK: &str = "✓";

/// Semantic styles for CLI output
pub trait Stylize: Display {
    /// De-emphasized text
    fn muted(&self) -> String {
        self.dimmed().to_string()
    }

    /// Names and values worth spotting
    fn accent(&self) -> String {
        self.cyan().to_string()
    }

    /// Headings
    fn emphasis(&self) -> String {
        self.bold().to_string()
    }

    /// Successful outcomes
    fn success(&self) -> String {
        self.green().to_string()
    }

    /// Outcomes that need attention
    fn warn(&self) -> String {
        self.yellow().to_string()
    }

    /// Failures
    fn error(&self) -> String {
        self.red().bold().to_string()
    }
}

impl<T: Display + ?Sized> Stylize for T {}

/// Green check mark
pub fn check() -> String {
    CHECK.success()
}

/// Arrow between old and new values
pub fn arrow() -> String {
    "→".muted()
}

/// Spinner style for network operations
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Clickable link when the terminal supports it, plain URL otherwise
pub fn hyperlink(text: &str, url: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        terminal_link::Link::new(text, url).to_string()
    } else {
        url.to_string()
    }
}
