//! Survey question model.

use sqlx::types::Json;
use sqlx::FromRow;
use websurvey_core::error::CoreError;
use websurvey_core::survey::{Question, QuestionId, QuestionType};
use websurvey_core::types::{DbId, Timestamp};

/// A row from the `survey_questions` table.
#[derive(Debug, Clone, FromRow)]
pub struct SurveyQuestion {
    pub id: DbId,
    pub survey_id: DbId,
    pub position: i32,
    pub question_type: String,
    pub question: String,
    pub description: Option<String>,
    pub required: bool,
    pub answers: Json<Vec<String>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<SurveyQuestion> for Question {
    type Error = CoreError;

    fn try_from(row: SurveyQuestion) -> Result<Self, Self::Error> {
        let kind = QuestionType::from_str_db(&row.question_type)?;
        Ok(Question {
            id: QuestionId(row.id),
            kind,
            question: row.question,
            description: row.description,
            required: row.required,
            answers: if kind.is_selection() {
                row.answers.0
            } else {
                Vec::new()
            },
        })
    }
}
