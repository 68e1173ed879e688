//! Student entry form.
//!
//! The form holds the four raw text fields and turns them into a
//! [`StudentRecord`] once they validate.

use serde::Serialize;

use crate::error::ValidationError;
use crate::record::StudentRecord;

/// One of the four form fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Student name.
    Name,
    /// Student age.
    Age,
    /// Contact email.
    Email,
    /// Enrolled course.
    Course,
}

impl Field {
    /// All fields in the order they appear on the form.
    pub const ALL: [Self; 4] = [Self::Name, Self::Age, Self::Email, Self::Course];

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Age => "Age",
            Self::Email => "Email",
            Self::Course => "Course",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Trimmed field contents, read off the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInputs {
    /// Name text.
    pub name: String,
    /// Age text, not yet parsed.
    pub age: String,
    /// Email text.
    pub email: String,
    /// Course text.
    pub course: String,
}

impl RawInputs {
    fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Age => &self.age,
            Field::Email => &self.email,
            Field::Course => &self.course,
        }
    }
}

/// The form controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    name: String,
    age: String,
    email: String,
    course: String,
}

impl Form {
    /// Create an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents of a field.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot(field) = value.into();
    }

    /// Current contents of a field, untrimmed.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Age => &self.age,
            Field::Email => &self.email,
            Field::Course => &self.course,
        }
    }

    /// Read all four fields with surrounding whitespace trimmed.
    #[must_use]
    pub fn read_inputs(&self) -> RawInputs {
        RawInputs {
            name: self.name.trim().to_string(),
            age: self.age.trim().to_string(),
            email: self.email.trim().to_string(),
            course: self.course.trim().to_string(),
        }
    }

    /// Validate raw inputs and build a record ready for insertion.
    ///
    /// Emptiness is checked for every field before the age is parsed, so a
    /// form with an empty name and a bad age reports the missing name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] for the first empty field in
    /// form order, or [`ValidationError::InvalidAge`] if the age is not an
    /// integer.
    pub fn validate_and_build(raw: &RawInputs) -> Result<StudentRecord, ValidationError> {
        if let Some(field) = Field::ALL
            .into_iter()
            .find(|field| raw.get(*field).trim().is_empty())
        {
            return Err(ValidationError::MissingField(field));
        }

        let age = raw
            .age
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidAge(raw.age.clone()))?;

        Ok(StudentRecord {
            name: raw.name.trim().to_string(),
            age,
            email: raw.email.trim().to_string(),
            course: raw.course.trim().to_string(),
        })
    }

    /// Reset every field to empty.
    pub fn clear(&mut self) {
        for field in Field::ALL {
            self.slot(field).clear();
        }
    }

    /// Check if every field is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Field::ALL.into_iter().all(|field| self.get(field).is_empty())
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Age => &mut self.age,
            Field::Email => &mut self.email,
            Field::Course => &mut self.course,
        }
    }
}
