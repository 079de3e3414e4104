//! The survey as held by the editing form.

use std::sync::Arc;

use chrono::NaiveDate;
use websurvey_core::data_url::DataUrl;
use websurvey_core::survey::{Question, QuestionPayload, SurveyPayload, SurveyResource};
use websurvey_core::types::DbId;

/// A newly chosen image that has not been saved yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

impl ImagePayload {
    /// The `data:` URL used both as preview and as the wire value.
    pub fn data_url(&self) -> String {
        DataUrl::new(self.mime.clone(), self.bytes.to_vec()).encode()
    }
}

/// One immutable form snapshot.
///
/// `image` and `image_url` always change together: with a payload present,
/// `image_url` is its data URL; without one it is the stored image's URL.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyForm {
    /// Absent until the survey has been persisted.
    pub id: Option<DbId>,
    pub title: String,
    /// Derived by the server; never sent.
    pub slug: String,
    pub description: Option<String>,
    /// `true` publishes the survey, `false` keeps it a draft.
    pub status: bool,
    pub image: Option<ImagePayload>,
    pub image_url: Option<String>,
    pub expire_date: Option<NaiveDate>,
    pub questions: Arc<[Question]>,
}

impl SurveyForm {
    /// The blank form shown on "create".
    pub fn empty() -> Self {
        Self {
            id: None,
            title: String::new(),
            slug: String::new(),
            description: None,
            status: false,
            image: None,
            image_url: None,
            expire_date: None,
            questions: Arc::from(Vec::new()),
        }
    }

    /// A form holding server data. The preview is the stored URL.
    pub fn from_resource(resource: SurveyResource) -> Self {
        Self {
            id: Some(resource.id),
            title: resource.title,
            slug: resource.slug,
            description: resource.description,
            status: resource.status,
            image: None,
            image_url: resource.image_url,
            expire_date: resource.expire_date,
            questions: resource.questions.into(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

impl Default for SurveyForm {
    fn default() -> Self {
        Self::empty()
    }
}

/// A change to one scalar form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Title(String),
    Description(Option<String>),
    ExpireDate(Option<NaiveDate>),
    Status(bool),
}

impl FieldChange {
    /// Form field name, matching the server's error keys.
    pub fn field(&self) -> &'static str {
        match self {
            FieldChange::Title(_) => "title",
            FieldChange::Description(_) => "description",
            FieldChange::ExpireDate(_) => "expire_date",
            FieldChange::Status(_) => "status",
        }
    }

    /// Write the change into `form`.
    pub(crate) fn apply_to(self, form: &mut SurveyForm) {
        match self {
            FieldChange::Title(title) => form.title = title,
            FieldChange::Description(description) => form.description = description,
            FieldChange::ExpireDate(date) => form.expire_date = date,
            FieldChange::Status(status) => form.status = status,
        }
    }
}

/// Build the write payload for a snapshot.
///
/// A chosen image travels as its data URL; otherwise `image` is omitted and
/// the server keeps what it has. Temporary question ids become `null`.
impl From<&SurveyForm> for SurveyPayload {
    fn from(form: &SurveyForm) -> Self {
        SurveyPayload {
            title: form.title.clone(),
            description: form.description.clone(),
            status: form.status,
            image: form.image.as_ref().map(ImagePayload::data_url),
            expire_date: form.expire_date,
            questions: form.questions.iter().map(QuestionPayload::from).collect(),
        }
    }
}
