//! Terminal output utilities for styled CLI output.
//!
//! Keeps the styling of status lines in one place instead of scattering
//! `println!` calls through the commands.

use std::fmt::Display;

use console::{Term, style};

/// Terminal output helper for consistent styled output.
pub struct Output {
    term: Term,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    fn line(&self, text: &str) {
        drop(self.term.write_line(text));
    }

    pub fn success(&self, message: impl Display) {
        self.line(&format!("{} {}", style("✓").green().bold(), message));
    }

    pub fn error(&self, message: impl Display) {
        self.line(&format!("{} {}", style("✗").red().bold(), message));
    }

    pub fn warning(&self, message: impl Display) {
        self.line(&format!("{} {}", style("⚠").yellow().bold(), message));
    }

    pub fn info(&self, message: impl Display) {
        self.line(&format!("{} {}", style("ℹ").blue().bold(), message));
    }

    /// Print a plain message without any prefix.
    pub fn print(&self, message: impl Display) {
        self.line(&message.to_string());
    }

    pub fn newline(&self) {
        self.line("");
    }

    pub fn header(&self, message: impl Display) {
        self.line(&style(message).bold().cyan().to_string());
    }

    pub fn subheader(&self, message: impl Display) {
        self.line(&style(message).bold().to_string());
    }

    pub fn dim(&self, message: impl Display) {
        self.line(&style(message).dim().to_string());
    }

    /// Print a labeled value with indentation.
    pub fn labeled_indent(&self, label: impl Display, value: impl Display, indent: usize) {
        let spaces = " ".repeat(indent);
        self.line(&format!("{spaces}{}: {}", style(label).dim(), value));
    }
}
