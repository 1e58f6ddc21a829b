use serde::Serialize;
use thiserror::Error;

/// A single rejected field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid fields: {}", summarize(.0))]
    Fields(Vec<FieldError>),

    /// A reference field is not a well-formed store identifier.
    #[error("{0}")]
    MalformedId(&'static str),
}

fn summarize(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{} {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Turns a raw request body into a record that may be stored.
pub trait Validate {
    type Record;

    fn validate(self) -> Result<Self::Record, ValidationError>;
}

/// Collects every violation of one record before failing.
#[derive(Debug, Default)]
pub struct FieldChecks {
    errors: Vec<FieldError>,
}

impl FieldChecks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn non_empty(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.reject(field, "must not be empty");
        }
    }

    /// Checks `min <= value <= max` and narrows the value on success.
    pub fn in_range<T: TryFrom<i64>>(&mut self, field: &str, value: i64, min: i64, max: i64) -> Option<T> {
        if value < min {
            self.reject(field, format!("must be greater than or equal to {min}"));
            return None;
        }
        if value > max {
            self.reject(field, format!("must be less than or equal to {max}"));
            return None;
        }
        match T::try_from(value) {
            Ok(v) => Some(v),
            Err(_) => {
                self.reject(field, "is out of range");
                None
            }
        }
    }

    /// Non-negative counter.
    pub fn counter(&mut self, field: &str, value: i64) -> u64 {
        self.in_range(field, value, 0, i64::MAX).unwrap_or_default()
    }

    pub fn optional_counter(&mut self, field: &str, value: Option<i64>) -> Option<u64> {
        value.map(|v| self.counter(field, v))
    }

    pub fn finish<T>(self, record: T) -> Result<T, ValidationError> {
        if self.errors.is_empty() {
            Ok(record)
        } else {
            Err(ValidationError::Fields(self.errors))
        }
    }
}
