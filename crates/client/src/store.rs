//! Survey form-state store.
//!
//! The store owns the current [`SurveyForm`] snapshot behind an `Arc`. Every
//! change arrives as a [`FormEvent`] and is reduced into a new snapshot; the
//! previous one is never mutated, so comparing `Arc` pointers tells a view
//! whether anything changed. Rejected events leave the pointer untouched.
//!
//! Image reads are asynchronous. [`FormStore::request_image`] hands out an
//! [`ImageRequest`] tagged with a generation number; only the load carrying
//! the latest generation is applied, so overlapping reads resolve to the
//! most recently chosen file no matter which finishes first.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use websurvey_core::data_url::DataUrl;
use websurvey_core::survey::{Question, SurveyResource};
use websurvey_core::validation::FieldErrors;

use crate::error::{GatewayError, ImageReadError};
use crate::form::{FieldChange, ImagePayload, SurveyForm};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// The question editor's output: the full new question list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionsChanged {
    pub questions: Vec<Question>,
}

/// A finished image read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLoaded {
    pub generation: u64,
    pub payload: ImagePayload,
}

/// Every transition the store knows.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    /// Replace everything with server data.
    Hydrated(SurveyResource),
    FieldChanged(FieldChange),
    ImageLoaded(ImageLoaded),
    QuestionsChanged(QuestionsChanged),
    /// The server accepted a save; adopt its id, slug and stored image.
    Saved(SurveyResource),
    /// Back to the empty survey.
    Reset,
}

/// Why the last submit failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// Messages to render under each field.
    Fields(FieldErrors),
    /// One message for the whole form.
    Message(String),
}

impl From<&GatewayError> for SubmitError {
    fn from(err: &GatewayError) -> Self {
        match err {
            GatewayError::Validation(errors) => SubmitError::Fields(errors.clone()),
            other => SubmitError::Message(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Image requests
// ---------------------------------------------------------------------------

/// A pending read of a chosen image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    generation: u64,
    path: PathBuf,
}

impl ImageRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file and identify its format from its content.
    pub async fn load(self) -> Result<ImageLoaded, ImageReadError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| ImageReadError::Io {
                path: self.path.clone(),
                source,
            })?;
        let image = DataUrl::from_image_bytes(bytes).map_err(|source| {
            ImageReadError::NotAnImage {
                path: self.path.clone(),
                source,
            }
        })?;

        Ok(ImageLoaded {
            generation: self.generation,
            payload: ImagePayload {
                mime: image.mime().to_string(),
                bytes: image.into_data().into(),
            },
        })
    }

    /// [`load`](Self::load) as a store event. Failures are logged and yield
    /// `None`, leaving the form as it was.
    pub async fn into_event(self) -> Option<FormEvent> {
        match self.load().await {
            Ok(loaded) => Some(FormEvent::ImageLoaded(loaded)),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable image");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Owner of the current form snapshot.
#[derive(Debug)]
pub struct FormStore {
    snapshot: Arc<SurveyForm>,
    image_generation: u64,
    submit_error: Option<SubmitError>,
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FormStore {
    /// A store holding the empty survey.
    pub fn new() -> Self {
        Self {
            snapshot: Arc::new(SurveyForm::empty()),
            image_generation: 0,
            submit_error: None,
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<SurveyForm> {
        Arc::clone(&self.snapshot)
    }

    pub fn form(&self) -> &SurveyForm {
        &self.snapshot
    }

    /// Reduce one event. Returns whether a new snapshot was produced.
    pub fn dispatch(&mut self, event: FormEvent) -> bool {
        let next = match event {
            FormEvent::Hydrated(resource) => {
                self.invalidate_image_requests();
                SurveyForm::from_resource(resource)
            }
            FormEvent::FieldChanged(change) => {
                let mut next = SurveyForm::clone(&self.snapshot);
                change.apply_to(&mut next);
                next
            }
            FormEvent::ImageLoaded(loaded) => {
                if loaded.generation != self.image_generation {
                    tracing::debug!(
                        generation = loaded.generation,
                        latest = self.image_generation,
                        "Discarding superseded image load"
                    );
                    return false;
                }
                let mut next = SurveyForm::clone(&self.snapshot);
                next.image_url = Some(loaded.payload.data_url());
                next.image = Some(loaded.payload);
                next
            }
            FormEvent::QuestionsChanged(changed) => {
                let mut next = SurveyForm::clone(&self.snapshot);
                next.questions = changed.questions.into();
                next
            }
            FormEvent::Saved(resource) => {
                self.invalidate_image_requests();
                let mut next = SurveyForm::clone(&self.snapshot);
                next.id = Some(resource.id);
                next.slug = resource.slug;
                next.image = None;
                next.image_url = resource.image_url;
                next.questions = resource.questions.into();
                next
            }
            FormEvent::Reset => {
                self.invalidate_image_requests();
                self.submit_error = None;
                SurveyForm::empty()
            }
        };

        self.snapshot = Arc::new(next);
        true
    }

    /// Drain every event queued on `events` (e.g. by a bound editor).
    /// Returns how many produced a new snapshot.
    pub fn dispatch_pending(&mut self, events: &mut UnboundedReceiver<FormEvent>) -> usize {
        let mut applied = 0;
        while let Ok(event) = events.try_recv() {
            if self.dispatch(event) {
                applied += 1;
            }
        }
        applied
    }

    // ---- convenience wrappers ----

    pub fn hydrate(&mut self, resource: SurveyResource) {
        self.dispatch(FormEvent::Hydrated(resource));
    }

    pub fn set_field(&mut self, change: FieldChange) {
        self.dispatch(FormEvent::FieldChanged(change));
    }

    pub fn replace_questions(&mut self, questions: Vec<Question>) {
        self.dispatch(FormEvent::QuestionsChanged(QuestionsChanged { questions }));
    }

    pub fn reset(&mut self) {
        self.dispatch(FormEvent::Reset);
    }

    /// Start reading an image. Any read requested earlier is superseded.
    pub fn request_image(&mut self, path: impl Into<PathBuf>) -> ImageRequest {
        self.image_generation += 1;
        ImageRequest {
            generation: self.image_generation,
            path: path.into(),
        }
    }

    fn invalidate_image_requests(&mut self) {
        self.image_generation += 1;
    }

    // ---- submit state ----

    /// Forget the previous failure before a new submit.
    pub fn begin_submit(&mut self) {
        self.submit_error = None;
    }

    pub fn record_submit_error(&mut self, err: &GatewayError) {
        self.submit_error = Some(SubmitError::from(err));
    }

    pub fn submit_error(&self) -> Option<&SubmitError> {
        self.submit_error.as_ref()
    }

    /// First message to show under `field`, if the last submit flagged it.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        match &self.submit_error {
            Some(SubmitError::Fields(errors)) => errors.first(field),
            _ => None,
        }
    }
}
