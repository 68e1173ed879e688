//! Table view of the current record set.
//!
//! Rows carry the identifier of the record they came from so a selection can
//! be turned back into a delete target. The identifier is never a column.

use std::fmt::Write as _;

use crate::record::{RecordId, StoredStudent};

/// Column headings, in display order.
pub const COLUMNS: [&str; 4] = ["Name", "Age", "Email", "Course"];

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Identifier of the source record.
    pub id: RecordId,
    /// Cell text for each of [`COLUMNS`].
    pub cells: [String; 4],
}

impl From<&StoredStudent> for Row {
    fn from(stored: &StoredStudent) -> Self {
        let record = &stored.record;
        Self {
            id: stored.id.clone(),
            cells: [
                record.name.clone(),
                record.age.to_string(),
                record.email.clone(),
                record.course.clone(),
            ],
        }
    }
}

/// The table of students plus the current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableView {
    rows: Vec<Row>,
    selected: Option<usize>,
}

impl TableView {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the displayed rows. Any selection is dropped.
    pub fn render(&mut self, records: &[StoredStudent]) {
        self.rows = records.iter().map(Row::from).collect();
        self.selected = None;
    }

    /// Identifier behind the selected row, if any.
    #[must_use]
    pub fn selected_identifier(&self) -> Option<RecordId> {
        self.selected
            .and_then(|index| self.rows.get(index))
            .map(|row| row.id.clone())
    }

    /// Select the row at `index`. Returns false if there is no such row.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.rows.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    /// Select the row showing the record with `id`.
    pub fn select_identifier(&mut self, id: &RecordId) -> bool {
        match self.rows.iter().position(|row| &row.id == id) {
            Some(index) => {
                self.selected = Some(index);
                true
            }
            None => false,
        }
    }

    /// Drop the current selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Index of the selected row.
    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Rendered rows.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Plain-text rendering with a numbered, aligned row per record.
    ///
    /// The selected row is marked with `>`.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut widths = COLUMNS.map(str::len);
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(&row.cells) {
                *width = (*width).max(cell.chars().count());
            }
        }
        let number_width = self.rows.len().to_string().len().max(1);

        let mut out = String::new();
        let _ = write!(out, "  {:>number_width$} ", "#");
        push_cells(&mut out, &COLUMNS.map(String::from), &widths);

        let _ = write!(out, "  {} ", "-".repeat(number_width));
        push_cells(&mut out, &widths.map(|w| "-".repeat(w)), &widths);

        for (index, row) in self.rows.iter().enumerate() {
            let marker = if self.selected == Some(index) { '>' } else { ' ' };
            let _ = write!(out, "{marker} {:>number_width$} ", index + 1);
            push_cells(&mut out, &row.cells, &widths);
        }
        out
    }
}

fn push_cells(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}
