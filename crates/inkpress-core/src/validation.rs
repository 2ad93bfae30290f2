//! Field-level validation shared by the entity constructors.

use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

use crate::error::DomainError;
use crate::slug::slugify;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";

/// Longest email the store accepts.
pub const EMAIL_MAX_CHARS: usize = 254;

/// DRF-style message for a reference to a record that does not exist.
pub fn missing_reference(id: Uuid) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

/// Validation messages keyed by field name, sorted for stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// Keep the value of a successful validation, or fold its errors into `self`.
    pub fn absorb<T>(&mut self, result: Result<T, FieldErrors>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(errors) => {
                self.merge(errors);
                None
            }
        }
    }

    /// Fail with everything collected so far, otherwise hand back `value`.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, DomainError> {
        if !self.is_empty() {
            return Err(DomainError::Validation(self));
        }
        value.ok_or_else(|| DomainError::Internal("validation produced no value".to_string()))
    }

    /// Trimmed, non-blank text within `max_chars`.
    pub fn required_text(
        &mut self,
        field: &str,
        value: Option<String>,
        max_chars: Option<usize>,
    ) -> Option<String> {
        let Some(value) = value else {
            self.add(field, REQUIRED);
            return None;
        };
        self.text(field, value, max_chars)
    }

    /// Validates a value that was supplied, e.g. in a partial update.
    pub fn text(&mut self, field: &str, value: String, max_chars: Option<usize>) -> Option<String> {
        let value = value.trim().to_string();
        if value.is_empty() {
            self.add(field, BLANK);
            return None;
        }
        if let Some(max) = max_chars {
            if value.chars().count() > max {
                self.add(
                    field,
                    format!("Ensure this field has no more than {max} characters."),
                );
                return None;
            }
        }
        Some(value)
    }

    pub fn required_email(&mut self, field: &str, value: Option<String>) -> Option<String> {
        let value = self.required_text(field, value, Some(EMAIL_MAX_CHARS))?;
        if !is_valid_email(&value) {
            self.add(field, INVALID_EMAIL);
            return None;
        }
        Some(value)
    }

    pub fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, REQUIRED);
        }
        value
    }

    /// Slug for `text`, reported against `source_field` when nothing usable survives.
    pub fn derived_slug(&mut self, source_field: &str, text: &str) -> Option<String> {
        let slug = slugify(text);
        if slug.is_empty() {
            self.add(source_field, "Must contain at least one letter or digit.");
            return None;
        }
        Some(slug)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(" "))?;
        }
        Ok(())
    }
}

/// An address needs both an `@` and a `.` to be accepted.
pub fn is_valid_email(value: &str) -> bool {
    value.contains('@') && value.contains('.')
}
