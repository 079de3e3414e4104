//! The survey create/edit page.

use std::path::PathBuf;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use websurvey_core::survey::SurveyResource;
use websurvey_core::types::DbId;

use crate::editor::{EditorError, EditorOp, QuestionEditor};
use crate::error::GatewayError;
use crate::form::FieldChange;
use crate::gateway::SurveyGateway;
use crate::store::{FormEvent, FormStore, ImageRequest, SubmitError};

/// Where the page sends the user after a successful save.
pub const SURVEYS_ROUTE: &str = "/surveys";

/// Result of [`SurveyPage::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Saved {
        survey: SurveyResource,
        navigate_to: &'static str,
    },
    /// Nothing was saved; the store now holds the same error.
    Rejected(SubmitError),
}

/// Store, editor and gateway for one survey being created or edited.
#[derive(Debug)]
pub struct SurveyPage {
    survey_id: Option<DbId>,
    store: FormStore,
    editor: QuestionEditor,
    events: UnboundedReceiver<FormEvent>,
    gateway: SurveyGateway,
}

impl SurveyPage {
    /// A page creating a new survey.
    pub fn create(gateway: SurveyGateway) -> Self {
        Self::with_id(gateway, None)
    }

    /// A page editing survey `id`. Call [`mount`](Self::mount) to load it.
    pub fn edit_existing(gateway: SurveyGateway, id: DbId) -> Self {
        Self::with_id(gateway, Some(id))
    }

    fn with_id(gateway: SurveyGateway, survey_id: Option<DbId>) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        Self {
            survey_id,
            store: FormStore::new(),
            editor: QuestionEditor::bound(tx),
            events,
            gateway,
        }
    }

    pub fn store(&self) -> &FormStore {
        &self.store
    }

    /// Load the survey being edited. Nothing happens on a create page.
    pub async fn mount(&mut self) -> Result<(), GatewayError> {
        let Some(id) = self.survey_id else {
            return Ok(());
        };
        let resource = self.gateway.fetch(id).await?;
        self.store.hydrate(resource);
        Ok(())
    }

    pub fn set_field(&mut self, change: FieldChange) {
        self.store.set_field(change);
    }

    /// Run an editor operation against the current questions.
    pub fn edit(&mut self, op: EditorOp) -> Result<(), EditorError> {
        let questions = self.store.snapshot().questions.clone();
        self.editor.submit(&questions, op)?;
        self.store.dispatch_pending(&mut self.events);
        Ok(())
    }

    /// Begin reading an image file; feed the awaited result to
    /// [`image_loaded`](Self::image_loaded).
    pub fn choose_image(&mut self, path: impl Into<PathBuf>) -> ImageRequest {
        self.store.request_image(path)
    }

    /// Apply a finished image read. Returns whether the form changed.
    pub fn image_loaded(&mut self, event: Option<FormEvent>) -> bool {
        match event {
            Some(event) => self.store.dispatch(event),
            None => false,
        }
    }

    /// Save the form. On success the form is cleared and the caller should
    /// navigate to `navigate_to`; on failure the error stays on the store.
    pub async fn submit(&mut self) -> SubmitOutcome {
        self.store.begin_submit();
        let form = self.store.snapshot();

        // An edit page always updates its own survey, even when the load failed.
        let target = self.survey_id.or(form.id);
        match self.gateway.save_as(target, &form).await {
            Ok(survey) => {
                self.store.reset();
                SubmitOutcome::Saved {
                    survey,
                    navigate_to: SURVEYS_ROUTE,
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Survey save rejected");
                self.store.record_submit_error(&e);
                SubmitOutcome::Rejected(SubmitError::from(&e))
            }
        }
    }
}
