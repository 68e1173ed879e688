//! Application shell.
//!
//! [`Shell`] owns the form, the table and the record store, and exposes the
//! three user actions as command handlers. User-facing messages and
//! confirmations go through a [`Feedback`] sink passed to each handler, so
//! the handlers run the same with a terminal, a test double, or nothing.

use tracing::{debug, info, warn};

use crate::error::{Error, ValidationError};
use crate::form::{Field, Form};
use crate::record::RecordId;
use crate::store::{Deletion, RecordStore};
use crate::table::TableView;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Informational, including success confirmations.
    Info,
    /// The action was not carried out but nothing went wrong.
    Warning,
    /// The action failed.
    Error,
}

/// A message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: Level,
    /// Short heading.
    pub title: String,
    /// Body text.
    pub message: String,
}

impl Notice {
    fn new(level: Level, title: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            message: message.into(),
        }
    }

    /// An informational notice.
    #[must_use]
    pub fn info(title: &str, message: impl Into<String>) -> Self {
        Self::new(Level::Info, title, message)
    }

    /// A warning notice.
    #[must_use]
    pub fn warning(title: &str, message: impl Into<String>) -> Self {
        Self::new(Level::Warning, title, message)
    }

    /// An error notice.
    #[must_use]
    pub fn error(title: &str, message: impl Into<String>) -> Self {
        Self::new(Level::Error, title, message)
    }
}

/// Where the shell sends notices and asks yes/no questions.
pub trait Feedback {
    /// Show a notice.
    fn notify(&mut self, notice: Notice);

    /// Ask the user to confirm; `true` means proceed.
    fn confirm(&mut self, title: &str, question: &str) -> bool;
}

/// What a command handler did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A record was inserted with this identifier.
    Added(RecordId),
    /// The table was re-rendered with this many rows.
    Refreshed(usize),
    /// The record with this identifier was deleted.
    Deleted(RecordId),
    /// The form did not validate; nothing was written.
    Rejected(ValidationError),
    /// Delete was requested with no row selected.
    NothingSelected,
    /// The user declined the delete confirmation.
    Declined,
    /// The selected record was already gone from the store.
    NotFound(RecordId),
    /// The store could not service the call.
    StoreUnavailable,
}

/// Shell state for one session: the injected store plus form and table.
#[derive(Debug)]
pub struct Shell<S> {
    store: S,
    form: Form,
    table: TableView,
    confirm_delete: bool,
}

impl<S: RecordStore> Shell<S> {
    /// Create a shell around an open store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            form: Form::new(),
            table: TableView::new(),
            confirm_delete: true,
        }
    }

    /// Set whether Delete asks for confirmation.
    #[must_use]
    pub fn with_confirm_delete(mut self, confirm: bool) -> Self {
        self.confirm_delete = confirm;
        self
    }

    /// The entry form.
    pub fn form(&self) -> &Form {
        &self.form
    }

    /// The entry form, for filling in fields.
    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    /// The table view.
    pub fn table(&self) -> &TableView {
        &self.table
    }

    /// The table view, for changing the selection.
    pub fn table_mut(&mut self) -> &mut TableView {
        &mut self.table
    }

    /// The record store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tear down the shell and hand back the store for closing.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Validate the form, insert the record, clear the form and refresh.
    pub fn add(&mut self, feedback: &mut dyn Feedback) -> Outcome {
        let raw = self.form.read_inputs();
        let record = match Form::validate_and_build(&raw) {
            Ok(record) => record,
            Err(err) => {
                debug!("Add rejected: {}", err);
                feedback.notify(validation_notice(&err));
                return Outcome::Rejected(err);
            }
        };

        let id = match self.store.insert(&record) {
            Ok(id) => id,
            Err(err) => {
                feedback.notify(store_notice(&err));
                return Outcome::StoreUnavailable;
            }
        };

        info!("Added student {}", id);
        feedback.notify(Notice::info("Success", "Student added successfully."));
        self.form.clear();
        self.refresh(feedback);
        Outcome::Added(id)
    }

    /// Fetch every record and re-render the table.
    ///
    /// An empty store is reported with an informational notice. On store
    /// failure the table keeps its previous contents.
    pub fn refresh(&mut self, feedback: &mut dyn Feedback) -> Outcome {
        let records = match self.store.list_all() {
            Ok(records) => records,
            Err(err) => {
                feedback.notify(store_notice(&err));
                return Outcome::StoreUnavailable;
            }
        };

        self.table.render(&records);
        debug!("Rendered {} rows", records.len());
        if records.is_empty() {
            feedback.notify(Notice::info("Info", "No student records found."));
        }
        Outcome::Refreshed(records.len())
    }

    /// Delete the selected record after confirmation, then refresh.
    pub fn delete(&mut self, feedback: &mut dyn Feedback) -> Outcome {
        let Some(id) = self.table.selected_identifier() else {
            feedback.notify(Notice::warning(
                "Select Record",
                "Please select a record to delete.",
            ));
            return Outcome::NothingSelected;
        };

        if self.confirm_delete
            && !feedback.confirm(
                "Confirm Delete",
                "Are you sure you want to delete the selected student?",
            )
        {
            debug!("Delete of {} declined", id);
            return Outcome::Declined;
        }

        match self.store.delete_by_id(&id) {
            Ok(Deletion::Deleted) => {
                info!("Deleted student {}", id);
                feedback.notify(Notice::info("Deleted", "Record deleted successfully."));
                self.refresh(feedback);
                Outcome::Deleted(id)
            }
            Ok(Deletion::NotFound) => {
                feedback.notify(Notice::warning(
                    "Not Found",
                    "The selected student no longer exists. Refresh to update the table.",
                ));
                Outcome::NotFound(id)
            }
            Err(err) => {
                feedback.notify(store_notice(&err));
                Outcome::StoreUnavailable
            }
        }
    }
}

fn validation_notice(err: &ValidationError) -> Notice {
    match err {
        ValidationError::MissingField(field) => Notice::error(
            "Input Error",
            format!("Please fill in the {} field.", field.label()),
        ),
        ValidationError::InvalidAge(_) => Notice::error(
            "Input Error",
            format!("{} must be a number.", Field::Age.label()),
        ),
    }
}

fn store_notice(err: &Error) -> Notice {
    warn!("Record store call failed: {}", err);
    Notice::error(
        "Database Error",
        format!("The student database could not be reached ({err}). Please try again."),
    )
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    use super::*;
    use crate::error::Result;
    use crate::record::{StoredStudent, StudentRecord};

    /// In-memory store that records every call.
    #[derive(Debug, Default)]
    struct FakeStore {
        records: RefCell<Vec<StoredStudent>>,
        inserted: RefCell<Vec<StudentRecord>>,
        deleted: RefCell<Vec<RecordId>>,
        list_calls: Cell<usize>,
        next_id: Cell<usize>,
        unavailable: Cell<bool>,
    }

    impl FakeStore {
        fn with_records(records: Vec<StoredStudent>) -> Self {
            Self {
                records: RefCell::new(records),
                ..Self::default()
            }
        }

        fn check(&self) -> Result<()> {
            if self.unavailable.get() {
                Err(Error::store_unavailable("connection refused"))
            } else {
                Ok(())
            }
        }

        fn gateway_calls(&self) -> usize {
            self.inserted.borrow().len() + self.deleted.borrow().len() + self.list_calls.get()
        }
    }

    impl RecordStore for FakeStore {
        fn insert(&self, record: &StudentRecord) -> Result<RecordId> {
            self.check()?;
            self.inserted.borrow_mut().push(record.clone());
            let n = self.next_id.get() + 1;
            self.next_id.set(n);
            let id = RecordId::from_token(format!("new{n}"));
            self.records
                .borrow_mut()
                .push(StoredStudent::new(id.clone(), record.clone()));
            Ok(id)
        }

        fn list_all(&self) -> Result<Vec<StoredStudent>> {
            self.list_calls.set(self.list_calls.get() + 1);
            self.check()?;
            Ok(self.records.borrow().clone())
        }

        fn delete_by_id(&self, id: &RecordId) -> Result<Deletion> {
            self.deleted.borrow_mut().push(id.clone());
            self.check()?;
            let mut records = self.records.borrow_mut();
            let before = records.len();
            records.retain(|r| &r.id != id);
            Ok(if records.len() < before {
                Deletion::Deleted
            } else {
                Deletion::NotFound
            })
        }
    }

    /// Feedback sink with canned confirmation answers.
    #[derive(Debug, Default)]
    struct ScriptedFeedback {
        notices: Vec<Notice>,
        answers: VecDeque<bool>,
        questions: usize,
    }

    impl ScriptedFeedback {
        fn answering(answer: bool) -> Self {
            Self {
                answers: VecDeque::from([answer]),
                ..Self::default()
            }
        }

        fn levels(&self) -> Vec<Level> {
            self.notices.iter().map(|n| n.level).collect()
        }
    }

    impl Feedback for ScriptedFeedback {
        fn notify(&mut self, notice: Notice) {
            self.notices.push(notice);
        }

        fn confirm(&mut self, _title: &str, _question: &str) -> bool {
            self.questions += 1;
            self.answers.pop_front().unwrap_or(false)
        }
    }

    fn student(name: &str, age: i64) -> StudentRecord {
        StudentRecord {
            name: name.to_string(),
            age,
            email: format!("{}@x.com", name.to_lowercase()),
            course: "CS".to_string(),
        }
    }

    fn two_students() -> Vec<StoredStudent> {
        vec![
            StoredStudent::new(RecordId::from_token("id1"), student("Alice", 21)),
            StoredStudent::new(RecordId::from_token("id2"), student("Bob", 22)),
        ]
    }

    fn fill(shell: &mut Shell<FakeStore>, name: &str, age: &str, email: &str, course: &str) {
        let form = shell.form_mut();
        form.set(Field::Name, name);
        form.set(Field::Age, age);
        form.set(Field::Email, email);
        form.set(Field::Course, course);
    }

    #[test]
    fn test_add_missing_field_skips_insert() {
        for missing in Field::ALL {
            let mut shell = Shell::new(FakeStore::default());
            fill(&mut shell, "Alice", "21", "a@x.com", "CS");
            shell.form_mut().set(missing, "  ");
            let mut feedback = ScriptedFeedback::default();

            let outcome = shell.add(&mut feedback);

            assert_eq!(
                outcome,
                Outcome::Rejected(ValidationError::MissingField(missing))
            );
            assert_eq!(shell.store().gateway_calls(), 0);
            assert_eq!(feedback.levels(), [Level::Error]);
            assert!(feedback.notices[0].message.contains(missing.label()));
        }
    }

    #[test]
    fn test_add_invalid_age_skips_insert() {
        let mut shell = Shell::new(FakeStore::default());
        fill(&mut shell, "Alice", "twenty", "a@x.com", "CS");
        let mut feedback = ScriptedFeedback::default();

        let outcome = shell.add(&mut feedback);

        assert_eq!(
            outcome,
            Outcome::Rejected(ValidationError::InvalidAge("twenty".to_string()))
        );
        assert_eq!(shell.store().gateway_calls(), 0);
        assert_eq!(feedback.notices[0].message, "Age must be a number.");
        // Rejected input stays on the form for correction.
        assert_eq!(shell.form().get(Field::Age), "twenty");
    }

    #[test]
    fn test_add_valid_inserts_clears_and_refreshes() {
        let mut shell = Shell::new(FakeStore::default());
        fill(&mut shell, "Alice", "21", "a@x.com", "CS");
        let mut feedback = ScriptedFeedback::default();

        let outcome = shell.add(&mut feedback);

        assert!(matches!(outcome, Outcome::Added(_)));
        assert_eq!(
            *shell.store().inserted.borrow(),
            [StudentRecord {
                name: "Alice".to_string(),
                age: 21,
                email: "a@x.com".to_string(),
                course: "CS".to_string(),
            }]
        );
        assert!(shell.form().is_empty());
        assert_eq!(shell.store().list_calls.get(), 1);
        assert_eq!(shell.table().len(), 1);
        assert_eq!(feedback.notices[0].title, "Success");
    }

    #[test]
    fn test_add_store_unavailable() {
        let store = FakeStore::default();
        store.unavailable.set(true);
        let mut shell = Shell::new(store);
        fill(&mut shell, "Alice", "21", "a@x.com", "CS");
        let mut feedback = ScriptedFeedback::default();

        let outcome = shell.add(&mut feedback);

        assert_eq!(outcome, Outcome::StoreUnavailable);
        assert_eq!(feedback.levels(), [Level::Error]);
        assert_eq!(shell.store().list_calls.get(), 0);
        // The form is kept so the user can retry.
        assert!(!shell.form().is_empty());
    }

    #[test]
    fn test_add_retry_after_outage() {
        let store = FakeStore::default();
        store.unavailable.set(true);
        let mut shell = Shell::new(store);
        fill(&mut shell, "Alice", "21", "a@x.com", "CS");
        let mut feedback = ScriptedFeedback::default();

        assert_eq!(shell.add(&mut feedback), Outcome::StoreUnavailable);
        shell.store().unavailable.set(false);
        assert!(matches!(shell.add(&mut feedback), Outcome::Added(_)));
    }

    #[test]
    fn test_refresh_empty_store_notifies() {
        let mut shell = Shell::new(FakeStore::default());
        let mut feedback = ScriptedFeedback::default();

        assert_eq!(shell.refresh(&mut feedback), Outcome::Refreshed(0));
        assert!(shell.table().is_empty());
        assert_eq!(feedback.notices.len(), 1);
        assert_eq!(feedback.notices[0].level, Level::Info);
        assert_eq!(feedback.notices[0].message, "No student records found.");
    }

    #[test]
    fn test_refresh_tags_rows() {
        let mut shell = Shell::new(FakeStore::with_records(two_students()));
        let mut feedback = ScriptedFeedback::default();

        assert_eq!(shell.refresh(&mut feedback), Outcome::Refreshed(2));
        let ids: Vec<_> = shell.table().rows().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["id1", "id2"]);
        assert!(feedback.notices.is_empty());
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let mut shell = Shell::new(FakeStore::with_records(two_students()));
        let mut feedback = ScriptedFeedback::default();

        shell.refresh(&mut feedback);
        let first = shell.table().clone();
        shell.refresh(&mut feedback);

        assert_eq!(shell.table(), &first);
        assert_eq!(shell.table().to_text(), first.to_text());
    }

    #[test]
    fn test_refresh_store_unavailable_keeps_table() {
        let mut shell = Shell::new(FakeStore::with_records(two_students()));
        let mut feedback = ScriptedFeedback::default();
        shell.refresh(&mut feedback);

        shell.store().unavailable.set(true);
        assert_eq!(shell.refresh(&mut feedback), Outcome::StoreUnavailable);
        assert_eq!(shell.table().len(), 2);
        assert_eq!(feedback.levels(), [Level::Error]);
    }

    #[test]
    fn test_delete_without_selection() {
        let mut shell = Shell::new(FakeStore::with_records(two_students()));
        let mut feedback = ScriptedFeedback::answering(true);

        assert_eq!(shell.delete(&mut feedback), Outcome::NothingSelected);
        assert_eq!(shell.store().gateway_calls(), 0);
        assert_eq!(feedback.questions, 0);
        assert_eq!(feedback.levels(), [Level::Warning]);
    }

    #[test]
    fn test_delete_declined() {
        let mut shell = Shell::new(FakeStore::with_records(two_students()));
        shell.refresh(&mut ScriptedFeedback::default());
        shell.table_mut().select(0);
        let before = shell.table().clone();
        let calls_before = shell.store().gateway_calls();
        let mut feedback = ScriptedFeedback::answering(false);

        assert_eq!(shell.delete(&mut feedback), Outcome::Declined);
        assert_eq!(shell.store().gateway_calls(), calls_before);
        assert_eq!(shell.table(), &before);
        assert!(feedback.notices.is_empty());
    }

    #[test]
    fn test_delete_confirmed() {
        let mut shell = Shell::new(FakeStore::with_records(two_students()));
        shell.refresh(&mut ScriptedFeedback::default());
        shell.table_mut().select(1);
        let mut feedback = ScriptedFeedback::answering(true);

        let outcome = shell.delete(&mut feedback);

        assert_eq!(outcome, Outcome::Deleted(RecordId::from_token("id2")));
        assert_eq!(
            *shell.store().deleted.borrow(),
            [RecordId::from_token("id2")]
        );
        assert_eq!(shell.store().list_calls.get(), 2);
        assert_eq!(shell.table().len(), 1);
        assert_eq!(feedback.questions, 1);
        assert_eq!(feedback.notices[0].title, "Deleted");
    }

    #[test]
    fn test_delete_without_confirmation_prompt() {
        let mut shell =
            Shell::new(FakeStore::with_records(two_students())).with_confirm_delete(false);
        shell.refresh(&mut ScriptedFeedback::default());
        shell.table_mut().select(0);
        let mut feedback = ScriptedFeedback::default();

        assert_eq!(
            shell.delete(&mut feedback),
            Outcome::Deleted(RecordId::from_token("id1"))
        );
        assert_eq!(feedback.questions, 0);
    }

    #[test]
    fn test_delete_not_found_is_non_fatal() {
        let mut shell = Shell::new(FakeStore::with_records(two_students()));
        shell.refresh(&mut ScriptedFeedback::default());
        shell.table_mut().select(0);
        shell.store().records.borrow_mut().remove(0);
        let mut feedback = ScriptedFeedback::answering(true);

        assert_eq!(
            shell.delete(&mut feedback),
            Outcome::NotFound(RecordId::from_token("id1"))
        );
        assert_eq!(feedback.levels(), [Level::Warning]);
        assert_eq!(shell.store().list_calls.get(), 1);
    }

    #[test]
    fn test_delete_store_unavailable() {
        let mut shell = Shell::new(FakeStore::with_records(two_students()));
        shell.refresh(&mut ScriptedFeedback::default());
        shell.table_mut().select(0);
        shell.store().unavailable.set(true);
        let mut feedback = ScriptedFeedback::answering(true);

        assert_eq!(shell.delete(&mut feedback), Outcome::StoreUnavailable);
        assert_eq!(shell.table().len(), 2);
        assert_eq!(feedback.levels(), [Level::Error]);
    }
}
