//! Field-level validation for survey payloads.
//!
//! Failures are collected into [`FieldErrors`], a map from field name to an
//! ordered list of human-readable messages. The API returns it under the
//! `errors` key of a 422 response; the editor renders each list under the
//! matching input. Nested fields use dotted keys such as
//! `questions.0.question`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data_url::{DataUrl, DataUrlError, ALLOWED_IMAGE_TYPES};
use crate::survey::SurveyPayload;

/// Maximum title length in characters.
pub const TITLE_MAX_LEN: usize = 1000;

/// Maximum question text length in characters.
pub const QUESTION_MAX_LEN: usize = 2000;

/// Field name to ordered error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message for `field`, keeping earlier messages first.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one message.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// First message for `field`, the one an inline form shows.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(|m| m.first()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `Ok(())` when nothing was recorded, `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<BTreeMap<String, Vec<String>>> for FieldErrors {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        Self(map)
    }
}

/// Turn `expire_date` into `expire date` for messages.
fn attribute(field: &str) -> String {
    field.replace('_', " ")
}

pub fn required_message(field: &str) -> String {
    format!("The {} field is required.", attribute(field))
}

pub fn max_length_message(field: &str, max: usize) -> String {
    format!(
        "The {} field must not be greater than {max} characters.",
        attribute(field)
    )
}

/// Validate a create/update payload.
///
/// `today` is passed in so callers (and tests) control what "after today"
/// means.
pub fn validate_survey(payload: &SurveyPayload, today: NaiveDate) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    let title = payload.title.trim();
    if title.is_empty() {
        errors.add("title", required_message("title"));
    } else if title.chars().count() > TITLE_MAX_LEN {
        errors.add("title", max_length_message("title", TITLE_MAX_LEN));
    }

    if let Some(date) = payload.expire_date {
        if date <= today {
            errors.add(
                "expire_date",
                "The expire date field must be a date after today.",
            );
        }
    }

    if let Some(image) = payload.image.as_deref() {
        if let Err(e) = DataUrl::parse(image).and_then(|url| url.image_extension().map(|_| ())) {
            let message = match e {
                DataUrlError::UnsupportedType(_) | DataUrlError::MissingPrefix => format!(
                    "The image field must be a file of type: {}.",
                    ALLOWED_IMAGE_TYPES.join(", ")
                ),
                DataUrlError::NotBase64 | DataUrlError::Base64(_) => {
                    "The image field must be a base64 encoded data URL.".to_string()
                }
                DataUrlError::UnrecognizedImage => "The image field must be an image.".to_string(),
            };
            errors.add("image", message);
        }
    }

    for (i, q) in payload.questions.iter().enumerate() {
        let field = format!("questions.{i}.question");
        let text = q.question.trim();
        if text.is_empty() {
            errors.add(&field, required_message(&field));
        } else if text.chars().count() > QUESTION_MAX_LEN {
            errors.add(&field, max_length_message(&field, QUESTION_MAX_LEN));
        }

        if q.kind.is_selection() {
            let answers_field = format!("questions.{i}.answers");
            if q.answers.is_empty() {
                errors.add(
                    &answers_field,
                    format!("The {answers_field} field must have at least 1 items."),
                );
            }
            for (j, answer) in q.answers.iter().enumerate() {
                if answer.trim().is_empty() {
                    let answer_field = format!("{answers_field}.{j}");
                    errors.add(&answer_field, required_message(&answer_field));
                }
            }
        }
    }

    errors.into_result()
}
