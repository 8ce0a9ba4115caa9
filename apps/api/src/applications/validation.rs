//! Payload validation for the application endpoints.
//!
//! Payloads are walked field by field over the raw JSON so that every
//! offending field is reported, not just the first serde failure.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::errors::FieldError;
use crate::models::application::{ApplicationPatch, ApplicationStatus, NewApplication, Patch};

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_NOTES_CHARS: usize = 2000;

/// Validates a create payload. Omitted `status` defaults to `TO_APPLY`.
pub fn validate_create(payload: &Value) -> Result<NewApplication, Vec<FieldError>> {
    let mut reader = FieldReader::new(payload)?;

    let company = reader.required_name("company");
    let position = reader.required_name("position");
    let status = reader.status("status");
    let applied_date = reader.nullable_date("appliedDate");
    let reminder_date = reader.nullable_date("reminderDate");
    let notes = reader.nullable_notes("notes");
    reader.finish()?;

    Ok(NewApplication {
        // `finish` returned Ok, so the required fields were read successfully
        company: company.unwrap_or_default(),
        position: position.unwrap_or_default(),
        status: status.unwrap_or_default(),
        applied_date: applied_date.value().copied(),
        reminder_date: reminder_date.value().copied(),
        notes: notes.value().cloned(),
    })
}

/// Validates an update payload. Every field is optional; absent fields are `Missing`.
pub fn validate_update(payload: &Value) -> Result<ApplicationPatch, Vec<FieldError>> {
    let mut reader = FieldReader::new(payload)?;

    let company = reader.optional_name("company");
    let position = reader.optional_name("position");
    let status = reader.status("status");
    let applied_date = reader.nullable_date("appliedDate");
    let reminder_date = reader.nullable_date("reminderDate");
    let notes = reader.nullable_notes("notes");
    reader.finish()?;

    Ok(ApplicationPatch {
        company,
        position,
        status,
        applied_date,
        reminder_date,
        notes,
    })
}

/// Parses a date-like string into a UTC timestamp.
///
/// Accepts RFC 3339, a zone-less `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC),
/// or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

struct FieldReader<'a> {
    fields: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> FieldReader<'a> {
    fn new(payload: &'a Value) -> Result<Self, Vec<FieldError>> {
        match payload.as_object() {
            Some(fields) => Ok(FieldReader {
                fields,
                errors: Vec::new(),
            }),
            None => Err(vec![FieldError::new("body", "Expected a JSON object")]),
        }
    }

    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    fn required_name(&mut self, field: &str) -> Option<String> {
        if self.fields.get(field).is_none() {
            self.fail(field, "Required");
            return None;
        }
        self.optional_name(field)
    }

    fn optional_name(&mut self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::String(s) => {
                let len = s.chars().count();
                if len < 1 {
                    self.fail(field, "Must be at least 1 character");
                    None
                } else if len > MAX_NAME_CHARS {
                    self.fail(
                        field,
                        format!("Must be at most {MAX_NAME_CHARS} characters"),
                    );
                    None
                } else {
                    Some(s.clone())
                }
            }
            _ => {
                self.fail(field, "Expected string");
                None
            }
        }
    }

    fn status(&mut self, field: &str) -> Option<ApplicationStatus> {
        match self.fields.get(field)? {
            Value::String(s) => {
                let parsed = ApplicationStatus::parse(s);
                if parsed.is_none() {
                    self.fail(field, invalid_status_message());
                }
                parsed
            }
            _ => {
                self.fail(field, invalid_status_message());
                None
            }
        }
    }

    fn nullable_date(&mut self, field: &str) -> Patch<DateTime<Utc>> {
        match self.fields.get(field) {
            None => Patch::Missing,
            Some(Value::Null) => Patch::Null,
            // Empty input from a cleared form control means "no date"
            Some(Value::String(s)) if s.trim().is_empty() => Patch::Null,
            Some(Value::String(s)) => match parse_date(s) {
                Some(dt) => Patch::Value(dt),
                None => {
                    self.fail(field, "Invalid date");
                    Patch::Missing
                }
            },
            Some(_) => {
                self.fail(field, "Expected string or null");
                Patch::Missing
            }
        }
    }

    fn nullable_notes(&mut self, field: &str) -> Patch<String> {
        match self.fields.get(field) {
            None => Patch::Missing,
            Some(Value::Null) => Patch::Null,
            Some(Value::String(s)) if s.chars().count() > MAX_NOTES_CHARS => {
                self.fail(
                    field,
                    format!("Must be at most {MAX_NOTES_CHARS} characters"),
                );
                Patch::Missing
            }
            Some(Value::String(s)) => Patch::Value(s.clone()),
            Some(_) => {
                self.fail(field, "Expected string or null");
                Patch::Missing
            }
        }
    }

    fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

fn invalid_status_message() -> String {
    let names: Vec<&str> = ApplicationStatus::ALL.iter().map(|s| s.as_str()).collect();
    format!("Invalid status; expected one of {}", names.join(", "))
}
