//! Survey and question models shared by the API server and the editor client.
//!
//! Two wire shapes exist for a survey:
//!
//! - [`SurveyResource`] is what the server returns: the stored image is
//!   exposed as `image_url` and there is never a raw payload.
//! - [`SurveyPayload`] is what the client sends on create/update: a newly
//!   chosen image travels as a data URL in `image`, and `image: null` keeps the
//!   stored one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Question type
// ---------------------------------------------------------------------------

/// The kind of input a question renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    Text,
    Textarea,
    Select,
    Radio,
    Checkbox,
}

impl QuestionType {
    /// Every question type, in the order editors list them.
    pub const ALL: [QuestionType; 5] = [
        Self::Text,
        Self::Textarea,
        Self::Select,
        Self::Radio,
        Self::Checkbox,
    ];

    /// Whether the question offers a list of candidate answers.
    pub fn is_selection(self) -> bool {
        match self {
            Self::Select | Self::Radio | Self::Checkbox => true,
            Self::Text | Self::Textarea => false,
        }
    }

    /// Parse a type string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "text" => Ok(Self::Text),
            "textarea" => Ok(Self::Textarea),
            "select" => Ok(Self::Select),
            "radio" => Ok(Self::Radio),
            "checkbox" => Ok(Self::Checkbox),
            _ => Err(CoreError::Validation(format!(
                "Invalid question type '{s}'. Must be one of: text, textarea, select, radio, checkbox"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
        }
    }
}

// ---------------------------------------------------------------------------
// Question
// ---------------------------------------------------------------------------

/// Identifier of a question.
///
/// Server-assigned ids are positive and globally unique. Questions created
/// in the editor and not saved yet carry a negative temporary id, so the
/// payload builder can tell new questions from existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub DbId);

impl QuestionId {
    /// True for ids that were never assigned by the server.
    pub fn is_temporary(self) -> bool {
        self.0 <= 0
    }

    /// The server id, or `None` for a temporary id.
    pub fn persisted(self) -> Option<DbId> {
        (!self.is_temporary()).then_some(self.0)
    }
}

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One question of a survey, as held by the editor and returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Candidate answers. Always empty for free-text types.
    #[serde(default)]
    pub answers: Vec<String>,
}

impl Question {
    /// A blank free-text question with the given id.
    pub fn blank(id: QuestionId) -> Self {
        Self {
            id,
            kind: QuestionType::Text,
            question: String::new(),
            description: None,
            required: false,
            answers: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

/// A survey as returned by `GET /survey/{id}` (inside the `data` envelope).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyResource {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub status: bool,
    #[serde(default)]
    pub description: Option<String>,
    /// Absolute URL of the stored image, if any.
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, with = "optional_date")]
    pub expire_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub questions: Vec<Question>,
}

// ---------------------------------------------------------------------------
// Write side
// ---------------------------------------------------------------------------

/// Request body for `POST /survey` and `PUT /survey/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: bool,
    /// Newly chosen image as a data URL. `None` keeps the stored image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, with = "optional_date")]
    pub expire_date: Option<NaiveDate>,
    #[serde(default)]
    pub questions: Vec<QuestionPayload>,
}

/// One question inside a [`SurveyPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPayload {
    /// Server id of an existing question; `None` (or a non-positive value)
    /// for a new one.
    #[serde(default)]
    pub id: Option<DbId>,
    #[serde(rename = "type", default)]
    pub kind: QuestionType,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub answers: Vec<String>,
}

impl QuestionPayload {
    /// The server id this payload refers to, if it names one.
    pub fn existing_id(&self) -> Option<DbId> {
        self.id.filter(|id| *id > 0)
    }

    /// Answers to store: dropped entirely for free-text types.
    pub fn normalized_answers(&self) -> Vec<String> {
        if self.kind.is_selection() {
            self.answers.clone()
        } else {
            Vec::new()
        }
    }
}

impl From<&Question> for QuestionPayload {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.persisted(),
            kind: q.kind,
            question: q.question.clone(),
            description: q.description.clone(),
            required: q.required,
            answers: if q.kind.is_selection() {
                q.answers.clone()
            } else {
                Vec::new()
            },
        }
    }
}

/// `YYYY-MM-DD` dates where `null`, a missing key and `""` all mean "no date".
///
/// Date inputs submit an empty string when cleared.
mod optional_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format(FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            // Accept full timestamps too; only the date part is kept.
            Some(s) => NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
