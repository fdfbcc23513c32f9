//! The interactive terminal front end.
//!
//! Input lines starting with `:` are commands, everything else is SQL.
//! SQL left open by a parenthesis, quote or block comment continues on the
//! following lines.
//! [`TerminalView`] implements [`View`] over any reader/writer pair, so the
//! whole loop runs the same against stdin/stdout or in-memory buffers.

use crate::command_palette::CommandPalette;
use crate::engine::Engine;
use crate::results_grid::ResultsGrid;
use crate::session::Session;
use crate::view::{Level, View};
use crossterm::style::Stylize;
use std::io::{BufRead, Write};
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;
use tracing::{debug, warn};

/// Represents a parsed REPL command.
#[derive(Debug, PartialEq)]
pub enum Command {
    Open(String),
    Tables,
    Use(String),
    View,
    Create,
    Drop,
    Add,
    /// 0-based grid row, `None` when missing or not a row number
    Edit(Option<usize>),
    Delete(Option<usize>),
    Fields,
    Help,
    Quit,
    Sql(String),
    Unknown(String),
}

/// Grid rows are shown numbered from 1.
fn parse_row(arg: &str) -> Option<usize> {
    arg.parse::<usize>().ok().and_then(|n| n.checked_sub(1))
}

/// Parses a user input string into a corresponding `Command`.
///
/// If the input starts with a colon (`:`), it is interpreted as a command.
/// Otherwise, it is treated as a SQL query.
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let Some(trimmed) = input.strip_prefix(':') else {
        return Command::Sql(input.to_string());
    };
    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };
    match (name, rest) {
        ("open", "") | ("use", "") => Command::Unknown(input.to_string()),
        ("open", path) => Command::Open(path.to_string()),
        ("use", table) => Command::Use(table.to_string()),
        ("tables", _) => Command::Tables,
        ("view", _) => Command::View,
        ("create", _) => Command::Create,
        ("drop", _) => Command::Drop,
        ("add", _) => Command::Add,
        ("edit", row) => Command::Edit(parse_row(row)),
        ("delete", row) => Command::Delete(parse_row(row)),
        ("fields", _) => Command::Fields,
        ("help", _) => Command::Help,
        ("quit", _) | ("q", _) | ("exit", _) => Command::Quit,
        _ => Command::Unknown(input.to_string()),
    }
}

/// Consumes characters up to and including `end`. False if input ran out.
fn skip_past(chars: &mut Peekable<Chars<'_>>, end: char) -> bool {
    chars.any(|c| c == end)
}

/// True while `sql` has an unclosed parenthesis, quoted identifier, string
/// literal or block comment, so the statement goes on past the line end.
pub fn statement_is_open(sql: &str) -> bool {
    let mut depth = 0i32;
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        let closed = match c {
            '\'' | '"' | '`' => skip_past(&mut chars, c),
            '[' => skip_past(&mut chars, ']'),
            '-' if chars.peek() == Some(&'-') => {
                skip_past(&mut chars, '\n');
                true
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                chars.any(|c| {
                    let end = prev == '*' && c == '/';
                    prev = c;
                    end
                })
            }
            '(' => {
                depth += 1;
                true
            }
            ')' => {
                depth -= 1;
                true
            }
            _ => true,
        };
        if !closed {
            return true;
        }
    }
    depth > 0
}

/// A [`View`] that talks to a terminal through line-based input and output.
pub struct TerminalView<R: BufRead, W: Write> {
    input: R,
    output: W,
    color: bool,
    max_column_width: usize,
}

impl<R: BufRead, W: Write> TerminalView<R, W> {
    pub fn new(input: R, output: W) -> Self {
        TerminalView {
            input,
            output,
            color: false,
            max_column_width: 40,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_max_column_width(mut self, width: usize) -> Self {
        self.max_column_width = width;
        self
    }

    /// Consumes the view, returning the output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    pub fn write_text(&mut self, text: &str) {
        let result = self
            .output
            .write_all(text.as_bytes())
            .and_then(|_| self.output.flush());
        if let Err(err) = result {
            warn!(error = %err, "failed to write to the terminal");
        }
    }

    /// Shows `prompt` and reads one line without its line ending.
    /// Returns `None` at end of input.
    pub fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.write_text(prompt);
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(&['\n', '\r'][..]).to_string()),
            Err(err) => {
                warn!(error = %err, "failed to read from the terminal");
                None
            }
        }
    }
}

impl<R: BufRead, W: Write> View for TerminalView<R, W> {
    fn show_tables(&mut self, tables: &[String]) {
        let mut text = String::from("Tables:\n");
        if tables.is_empty() {
            text.push_str("  (none)\n");
        }
        for table in tables {
            text.push_str(&format!("  {}\n", table));
        }
        self.write_text(&text);
    }

    fn show_results(&mut self, grid: &ResultsGrid) {
        let rendered = grid.render(self.max_column_width);
        self.write_text(&rendered);
    }

    fn clear_results(&mut self) {
        debug!("results cleared");
    }

    fn prompt(&mut self, title: &str, message: &str, initial: Option<&str>) -> Option<String> {
        let mut text = format!("{}: {}\n", title, message);
        if let Some(initial) = initial {
            text.push_str(&format!("[{}] ", initial));
        }
        text.push_str("> ");

        let line = self.read_line(&text)?;
        if line.trim() == ":cancel" {
            return None;
        }
        match initial {
            Some(initial) if line.is_empty() => Some(initial.to_string()),
            _ => Some(line),
        }
    }

    fn confirm(&mut self, title: &str, message: &str) -> bool {
        let answer = self.read_line(&format!("{}: {} [y/N] ", title, message));
        matches!(
            answer.as_deref().map(|a| a.trim().to_lowercase()).as_deref(),
            Some("y") | Some("yes")
        )
    }

    fn notify(&mut self, level: Level, message: &str) {
        let tag = format!("[{}]", level);
        let tag = if self.color {
            match level {
                Level::Info => tag.as_str().green().to_string(),
                Level::Warning => tag.as_str().yellow().to_string(),
                Level::Error => tag.as_str().red().to_string(),
            }
        } else {
            tag
        };
        self.write_text(&format!("{} {}\n", tag, message));
    }
}

/// Reads continuation lines until `first` forms a complete statement.
fn read_statement<R: BufRead, W: Write>(view: &mut TerminalView<R, W>, first: String) -> String {
    let mut sql = first;
    while statement_is_open(&sql) {
        match view.read_line("   ...> ") {
            Some(line) => {
                sql.push('\n');
                sql.push_str(&line);
            }
            None => break,
        }
    }
    sql
}

/// Runs the command loop until `:quit` or end of input.
pub fn run<E: Engine, R: BufRead, W: Write>(session: &mut Session<E, TerminalView<R, W>>) {
    let palette = CommandPalette::new();
    session
        .view_mut()
        .write_text("Welcome to sqledit! Type :help for commands, :quit to exit.\n");

    while let Some(line) = session.view_mut().read_line("sqledit> ") {
        if line.trim().is_empty() {
            continue;
        }
        let command = parse_command(&line);
        debug!(?command, "command");
        match command {
            Command::Quit => break,
            Command::Help => {
                let help = palette.help_text();
                session.view_mut().write_text(&help);
            }
            Command::Open(path) => session.open_database(Path::new(&path)),
            Command::Tables => {
                session.list_tables();
            }
            Command::Use(table) => session.select_table(&table),
            Command::View => session.view_content(),
            Command::Create => session.create_table(),
            Command::Drop => session.delete_table(),
            Command::Add => session.add_record(),
            Command::Edit(row) => session.edit_record(row),
            Command::Delete(row) => session.delete_record(row),
            Command::Fields => session.modify_fields(),
            Command::Sql(sql) => {
                let sql = read_statement(session.view_mut(), sql);
                session.execute_query(&sql);
            }
            Command::Unknown(input) => {
                let mut text = format!("Unknown command: {}\n", input);
                let word = input
                    .trim_start_matches(':')
                    .split_whitespace()
                    .next()
                    .unwrap_or("");
                let suggestions = palette.filter_commands(word);
                if !suggestions.is_empty() {
                    text.push_str("Did you mean:\n");
                    for suggestion in suggestions {
                        text.push_str(&format!(
                            "  {} - {}\n",
                            suggestion.usage, suggestion.description
                        ));
                    }
                }
                session.view_mut().write_text(&text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::ConnectOptions;
    use crate::engine::SqliteEngine;
    use std::io::Cursor;

    fn terminal(input: &str) -> TerminalView<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalView::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(view: TerminalView<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(view.into_output()).unwrap()
    }

    #[test]
    fn test_parse_open_command() {
        assert_eq!(
            parse_command(":open my files/database.db"),
            Command::Open("my files/database.db".to_string())
        );
        assert_eq!(parse_command(":open"), Command::Unknown(":open".to_string()));
    }

    #[test]
    fn test_parse_use_command() {
        assert_eq!(
            parse_command("  :use order items "),
            Command::Use("order items".to_string())
        );
    }

    #[test]
    fn test_parse_row_commands() {
        assert_eq!(parse_command(":edit 3"), Command::Edit(Some(2)));
        assert_eq!(parse_command(":edit"), Command::Edit(None));
        assert_eq!(parse_command(":edit 0"), Command::Edit(None));
        assert_eq!(parse_command(":delete x"), Command::Delete(None));
        assert_eq!(parse_command(":delete 1"), Command::Delete(Some(0)));
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command(":tables"), Command::Tables);
        assert_eq!(parse_command(":fields"), Command::Fields);
        assert_eq!(parse_command(":q"), Command::Quit);
        assert_eq!(parse_command(":help"), Command::Help);
    }

    #[test]
    fn test_parse_unknown_command() {
        let cmd = parse_command(":invalid");
        assert_eq!(cmd, Command::Unknown(":invalid".to_string()));
    }

    #[test]
    fn test_parse_sql_query() {
        let cmd = parse_command("SELECT * FROM users");
        assert_eq!(cmd, Command::Sql("SELECT * FROM users".to_string()));
    }

    #[test]
    fn test_statement_is_open() {
        assert!(!statement_is_open("SELECT 1"));
        assert!(statement_is_open("CREATE TABLE t ("));
        assert!(!statement_is_open("CREATE TABLE t (\n  a INTEGER,\n  b TEXT\n)"));
        assert!(statement_is_open("INSERT INTO t VALUES ('it''s"));
        assert!(!statement_is_open("INSERT INTO t VALUES ('it''s (fine')"));
        assert!(statement_is_open("SELECT \"odd name"));
        assert!(!statement_is_open("SELECT [a(] FROM t"));
        assert!(statement_is_open("SELECT 1 /* unfinished"));
        assert!(!statement_is_open("SELECT 1 /* ( */"));
        assert!(!statement_is_open("SELECT 1 -- (comment"));
        assert!(!statement_is_open("SELECT 1)"));
    }

    #[test]
    fn test_prompt_answers() {
        let mut view = terminal("Alice\n\n:cancel\n");
        assert_eq!(view.prompt("Add", "name:", None), Some("Alice".to_string()));
        // Empty answer keeps the pre-filled value
        assert_eq!(view.prompt("Edit", "name:", Some("Bob")), Some("Bob".to_string()));
        assert_eq!(view.prompt("Edit", "name:", Some("Bob")), None);
        // End of input dismisses
        assert_eq!(view.prompt("Edit", "name:", None), None);

        let text = output(view);
        assert!(text.contains("Add: name:\n> "));
        assert!(text.contains("[Bob] > "));
    }

    #[test]
    fn test_confirm_answers() {
        let mut view = terminal("y\nno\nYES\n");
        assert!(view.confirm("Confirm", "sure?"));
        assert!(!view.confirm("Confirm", "sure?"));
        assert!(view.confirm("Confirm", "sure?"));
        assert!(!view.confirm("Confirm", "sure?"));
    }

    #[test]
    fn test_notify_plain() {
        let mut view = terminal("");
        view.notify(Level::Warning, "No table selected");
        assert_eq!(output(view), "[warning] No table selected\n");
    }

    #[test]
    fn test_notify_colored_keeps_text() {
        let mut view = terminal("").with_color(true);
        view.notify(Level::Error, "boom");
        let text = output(view);
        assert!(text.contains("[error]"));
        assert!(text.contains("boom"));
        assert!(text.contains('\u{1b}'));
    }

    #[test]
    fn test_run_session_end_to_end() {
        let input = "\
:create
t
a
INTEGER

INSERT INTO t VALUES (5)
:use t
:nope
:quit
SELECT 'never reached'
";
        let options = ConnectOptions::default();
        let engine = SqliteEngine::in_memory(&options).unwrap();
        let mut session = Session::with_engine(engine, terminal(input), options);
        run(&mut session);

        assert_eq!(session.current_table(), Some("t"));
        assert_eq!(session.results().row_count(), 1);

        let text = String::from_utf8(session.view().output.clone()).unwrap();
        assert!(text.contains("[info] Table 't' created"));
        assert!(text.contains("[info] Query executed successfully (1 row affected)"));
        assert!(text.contains("1 | 5"));
        assert!(text.contains("Unknown command: :nope"));
        assert!(!text.contains("never reached"));
    }

    #[test]
    fn test_run_joins_multiline_statements() {
        let input = "\
CREATE TABLE notes (
  id INTEGER,
  body TEXT
)
INSERT INTO notes VALUES (1, 'line one
line two')
:use notes
";
        let options = ConnectOptions::default();
        let engine = SqliteEngine::in_memory(&options).unwrap();
        let mut session = Session::with_engine(engine, terminal(input), options);
        run(&mut session);

        assert_eq!(session.tables(), ["notes"]);
        assert_eq!(
            session.results().rows,
            vec![vec![
                crate::core::db::Value::Integer(1),
                crate::core::db::Value::Text("line one\nline two".to_string()),
            ]]
        );
        let text = String::from_utf8(session.view().output.clone()).unwrap();
        assert!(text.contains("   ...> "));
        assert!(!text.contains("[error]"));
    }
}
