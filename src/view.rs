//! The presentation side of a session.
//!
//! [`Session`](crate::session::Session) only talks to the user through the
//! [`View`] trait. The terminal front end lives in [`crate::repl`];
//! [`ScriptedView`] answers from a queue and records what it was shown.

use crate::results_grid::ResultsGrid;
use std::collections::VecDeque;
use std::fmt;

/// Severity of a notice shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Info => write!(f, "info"),
            Level::Warning => write!(f, "warning"),
            Level::Error => write!(f, "error"),
        }
    }
}

pub trait View {
    /// Replaces the table list.
    fn show_tables(&mut self, tables: &[String]);

    /// Replaces the result grid.
    fn show_results(&mut self, grid: &ResultsGrid);

    fn clear_results(&mut self);

    /// Asks for a line of text. `None` means the prompt was dismissed.
    fn prompt(&mut self, title: &str, message: &str, initial: Option<&str>) -> Option<String>;

    /// Asks a yes/no question.
    fn confirm(&mut self, title: &str, message: &str) -> bool;

    fn notify(&mut self, level: Level, message: &str);
}

/// A prompt as it was put to a [`ScriptedView`].
#[derive(Debug, Clone, PartialEq)]
pub struct AskedPrompt {
    pub title: String,
    pub message: String,
    pub initial: Option<String>,
}

/// Headless [`View`] fed from queued answers.
///
/// Prompts pop from the answer queue and confirmations from the
/// confirmation queue. An exhausted queue dismisses the prompt or declines
/// the confirmation.
#[derive(Debug, Default)]
pub struct ScriptedView {
    answers: VecDeque<Option<String>>,
    confirmations: VecDeque<bool>,
    pub tables: Vec<String>,
    pub results: ResultsGrid,
    pub notices: Vec<(Level, String)>,
    pub prompts: Vec<AskedPrompt>,
}

impl ScriptedView {
    pub fn new() -> Self {
        ScriptedView::default()
    }

    /// Queues a typed answer.
    pub fn answer(&mut self, text: &str) -> &mut Self {
        self.answers.push_back(Some(text.to_string()));
        self
    }

    /// Queues a dismissed prompt.
    pub fn dismiss(&mut self) -> &mut Self {
        self.answers.push_back(None);
        self
    }

    pub fn confirm_next(&mut self, yes: bool) -> &mut Self {
        self.confirmations.push_back(yes);
        self
    }

    /// The most recent notice, if any.
    pub fn last_notice(&self) -> Option<&(Level, String)> {
        self.notices.last()
    }

    pub fn pending_answers(&self) -> usize {
        self.answers.len()
    }
}

impl View for ScriptedView {
    fn show_tables(&mut self, tables: &[String]) {
        self.tables = tables.to_vec();
    }

    fn show_results(&mut self, grid: &ResultsGrid) {
        self.results = grid.clone();
    }

    fn clear_results(&mut self) {
        self.results.clear();
    }

    fn prompt(&mut self, title: &str, message: &str, initial: Option<&str>) -> Option<String> {
        self.prompts.push(AskedPrompt {
            title: title.to_string(),
            message: message.to_string(),
            initial: initial.map(str::to_string),
        });
        self.answers.pop_front().flatten()
    }

    fn confirm(&mut self, _title: &str, _message: &str) -> bool {
        self.confirmations.pop_front().unwrap_or(false)
    }

    fn notify(&mut self, level: Level, message: &str) {
        self.notices.push((level, message.to_string()));
    }
}
