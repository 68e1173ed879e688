//! Terminal front end.
//!
//! [`Console`] is the [`Feedback`] sink for a terminal: notices are printed
//! and confirmations are read as y/n answers. [`run_session`] drives the
//! interactive form-and-table session on top of a [`Shell`].

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::error::Result;
use crate::form::Field;
use crate::shell::{Feedback, Level, Notice, Outcome, Shell};
use crate::store::RecordStore;

const HELP: &str = "\
Commands:
  add           fill in the form and add a student
  refresh       reload the table from the database
  select <row>  select a row by its number
  delete        delete the selected row
  show          print the table again
  help          show this message
  quit          leave the session
";

/// Line-oriented terminal I/O.
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
    assume_yes: bool,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Create a console over the given reader and writer.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            assume_yes: false,
        }
    }

    /// Answer every confirmation with yes without reading input.
    #[must_use]
    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    /// The underlying writer.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Print `prompt` and read one line, without its line ending.
    ///
    /// Returns `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read or written.
    pub fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        // Bytes, not read_line: a stray non-UTF-8 byte must not end the session.
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&buf);
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Print a block of text as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be written.
    pub fn print(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> Feedback for Console<R, W> {
    fn notify(&mut self, notice: Notice) {
        let tag = match notice.level {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        if let Err(err) = writeln!(self.output, "[{tag}] {}: {}", notice.title, notice.message) {
            warn!("Failed to print notice: {}", err);
        }
    }

    fn confirm(&mut self, title: &str, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        match self.prompt(&format!("{title}: {question} [y/N] ")) {
            Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Ok(None) => false,
            Err(err) => {
                warn!("Failed to read confirmation: {}", err);
                false
            }
        }
    }
}

/// A parsed session command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    Add,
    Refresh,
    Select(usize),
    Delete,
    Show,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl SessionCommand {
    fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Self::Empty;
        };
        match (verb.to_ascii_lowercase().as_str(), words.next()) {
            ("add" | "a", None) => Self::Add,
            ("refresh" | "r", None) => Self::Refresh,
            ("select" | "s", Some(row)) => match row.parse::<usize>() {
                Ok(row) if row > 0 && words.next().is_none() => Self::Select(row),
                _ => Self::Unknown(line.trim().to_string()),
            },
            ("delete" | "d", None) => Self::Delete,
            ("show" | "table", None) => Self::Show,
            ("help" | "?", None) => Self::Help,
            ("quit" | "exit" | "q", None) => Self::Quit,
            _ => Self::Unknown(line.trim().to_string()),
        }
    }
}

/// Run the interactive session until `quit` or end of input.
///
/// The table is populated with a refresh before the first prompt.
///
/// # Errors
///
/// Returns an error only if the terminal itself fails; store and input
/// problems are reported as notices and the session continues.
pub fn run_session<S, R, W>(shell: &mut Shell<S>, console: &mut Console<R, W>) -> Result<()>
where
    S: RecordStore,
    R: BufRead,
    W: Write,
{
    console.print("Student records. Type 'help' for commands.\n")?;
    shell.refresh(console);
    console.print(&shell.table().to_text())?;

    loop {
        let Some(line) = console.prompt("roster> ")? else {
            break;
        };
        let command = SessionCommand::parse(&line);
        debug!("Session command: {:?}", command);

        match command {
            SessionCommand::Add => {
                if !fill_form(shell, console)? {
                    break;
                }
                if let Outcome::Added(_) = shell.add(console) {
                    console.print(&shell.table().to_text())?;
                }
            }
            SessionCommand::Refresh => {
                if let Outcome::Refreshed(_) = shell.refresh(console) {
                    console.print(&shell.table().to_text())?;
                }
            }
            SessionCommand::Select(row) => {
                if shell.table_mut().select(row - 1) {
                    console.print(&shell.table().to_text())?;
                } else {
                    console.notify(Notice::warning(
                        "Select Record",
                        format!("There is no row {row}."),
                    ));
                }
            }
            SessionCommand::Delete => {
                if let Outcome::Deleted(_) = shell.delete(console) {
                    console.print(&shell.table().to_text())?;
                }
            }
            SessionCommand::Show => console.print(&shell.table().to_text())?,
            SessionCommand::Help => console.print(HELP)?,
            SessionCommand::Quit => break,
            SessionCommand::Empty => {}
            SessionCommand::Unknown(text) => {
                console.print(&format!("Unknown command '{text}'. Type 'help'.\n"))?;
            }
        }
    }

    Ok(())
}

/// Prompt for each form field. Returns false if input ended part way.
fn fill_form<S, R, W>(shell: &mut Shell<S>, console: &mut Console<R, W>) -> Result<bool>
where
    S: RecordStore,
    R: BufRead,
    W: Write,
{
    for field in Field::ALL {
        let current = shell.form().get(field).to_string();
        let prompt = if current.is_empty() {
            format!("  {field}: ")
        } else {
            format!("  {field} [{current}]: ")
        };
        let Some(value) = console.prompt(&prompt)? else {
            return Ok(false);
        };
        // An empty answer keeps a previously entered value.
        if !value.trim().is_empty() || current.is_empty() {
            shell.form_mut().set(field, value);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::store::DocumentStore;

    fn run(script: &str) -> (String, Shell<DocumentStore>) {
        let store = DocumentStore::open_in_memory("students").unwrap();
        let mut shell = Shell::new(store);
        let mut console = Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
        run_session(&mut shell, &mut console).unwrap();
        let output = String::from_utf8(console.output().clone()).unwrap();
        (output, shell)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(SessionCommand::parse("add"), SessionCommand::Add);
        assert_eq!(SessionCommand::parse("  Refresh "), SessionCommand::Refresh);
        assert_eq!(SessionCommand::parse("select 2"), SessionCommand::Select(2));
        assert_eq!(SessionCommand::parse("delete"), SessionCommand::Delete);
        assert_eq!(SessionCommand::parse("q"), SessionCommand::Quit);
        assert_eq!(SessionCommand::parse(""), SessionCommand::Empty);
        assert!(matches!(
            SessionCommand::parse("select 0"),
            SessionCommand::Unknown(_)
        ));
        assert!(matches!(
            SessionCommand::parse("select two"),
            SessionCommand::Unknown(_)
        ));
        assert!(matches!(
            SessionCommand::parse("frobnicate"),
            SessionCommand::Unknown(_)
        ));
    }

    #[test]
    fn test_startup_refresh_reports_empty_store() {
        let (output, shell) = run("quit\n");
        assert!(output.contains("No student records found."));
        assert!(shell.table().is_empty());
    }

    #[test]
    fn test_session_add_then_delete() {
        let script = "add\nAlice\n21\na@x.com\nCS\nselect 1\ndelete\ny\nquit\n";
        let (output, shell) = run(script);

        assert!(output.contains("Student added successfully."));
        assert!(output.contains("Alice"));
        assert!(output.contains("Record deleted successfully."));
        assert!(shell.table().is_empty());
        assert!(shell.store().list_all().unwrap().is_empty());
    }

    #[test]
    fn test_session_invalid_age_then_retry_keeps_fields() {
        // Second pass keeps name/email/course by answering blank.
        let script = "add\nAlice\ntwenty\na@x.com\nCS\nadd\n\n21\n\n\nquit\n";
        let (output, shell) = run(script);

        assert!(output.contains("Age must be a number."));
        let stored = shell.store().list_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].record.name, "Alice");
        assert_eq!(stored[0].record.age, 21);
    }

    #[test]
    fn test_session_delete_declined() {
        let script = "add\nAlice\n21\na@x.com\nCS\nselect 1\ndelete\nn\nquit\n";
        let (_, shell) = run(script);
        assert_eq!(shell.store().list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_session_delete_without_selection() {
        let (output, _) = run("delete\nquit\n");
        assert!(output.contains("Please select a record to delete."));
    }

    #[test]
    fn test_session_select_out_of_range() {
        let (output, _) = run("select 3\nquit\n");
        assert!(output.contains("There is no row 3."));
    }

    #[test]
    fn test_session_ends_at_eof_mid_form() {
        let (_, shell) = run("add\nAlice\n");
        assert!(shell.store().list_all().unwrap().is_empty());
    }

    #[test]
    fn test_session_survives_invalid_utf8() {
        let store = DocumentStore::open_in_memory("students").unwrap();
        let mut shell = Shell::new(store);
        let script = b"add\nJos\xe9\n21\nj@x.com\nCS\nquit\n".to_vec();
        let mut console = Console::new(Cursor::new(script), Vec::new());

        run_session(&mut shell, &mut console).unwrap();

        let stored = shell.store().list_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].record.name, "Jos\u{fffd}");
        assert_eq!(stored[0].record.age, 21);
    }

    #[test]
    fn test_confirm_assume_yes_reads_nothing() {
        let mut console = Console::new(Cursor::new(Vec::new()), Vec::new()).assume_yes(true);
        assert!(console.confirm("Confirm Delete", "Sure?"));
        assert!(console.output().is_empty());
    }

    #[test]
    fn test_confirm_defaults_to_no() {
        let mut console = Console::new(Cursor::new(b"\n".to_vec()), Vec::new());
        assert!(!console.confirm("Confirm Delete", "Sure?"));
        let mut console = Console::new(Cursor::new(b"YES\n".to_vec()), Vec::new());
        assert!(console.confirm("Confirm Delete", "Sure?"));
    }

    #[test]
    fn test_notify_format() {
        let mut console = Console::new(Cursor::new(Vec::new()), Vec::new());
        console.notify(Notice::warning("Select Record", "Pick one."));
        let output = String::from_utf8(console.output().clone()).unwrap();
        assert_eq!(output, "[warning] Select Record: Pick one.\n");
    }
}
