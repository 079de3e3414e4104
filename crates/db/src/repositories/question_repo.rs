//! Repository for the `survey_questions` table.

use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use websurvey_core::question_sync::{plan_question_sync, PlannedQuestion};
use websurvey_core::survey::QuestionPayload;
use websurvey_core::types::DbId;

use crate::models::question::SurveyQuestion;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, survey_id, position, question_type, question, description, \
                       required, answers, created_at, updated_at";

/// Provides reads and transactional writes for survey questions.
pub struct SurveyQuestionRepo;

impl SurveyQuestionRepo {
    /// List the questions of a survey in display order.
    pub async fn list_by_survey(
        pool: &PgPool,
        survey_id: DbId,
    ) -> Result<Vec<SurveyQuestion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM survey_questions
             WHERE survey_id = $1
             ORDER BY position, id"
        );
        sqlx::query_as::<_, SurveyQuestion>(&query)
            .bind(survey_id)
            .fetch_all(pool)
            .await
    }

    /// Insert every payload question as new, in order. Used on survey creation.
    pub async fn insert_all(
        conn: &mut PgConnection,
        survey_id: DbId,
        questions: &[QuestionPayload],
    ) -> Result<(), sqlx::Error> {
        for (position, payload) in questions.iter().enumerate() {
            let planned = PlannedQuestion {
                position: position as i32,
                payload,
            };
            Self::insert(&mut *conn, survey_id, &planned).await?;
        }
        Ok(())
    }

    /// Make the stored questions of `survey_id` match `questions`.
    ///
    /// Runs inside the caller's transaction. See
    /// [`plan_question_sync`] for how ids are matched.
    pub async fn sync(
        conn: &mut PgConnection,
        survey_id: DbId,
        questions: &[QuestionPayload],
    ) -> Result<(), sqlx::Error> {
        let existing: Vec<DbId> =
            sqlx::query_scalar("SELECT id FROM survey_questions WHERE survey_id = $1 ORDER BY id")
                .bind(survey_id)
                .fetch_all(&mut *conn)
                .await?;

        let plan = plan_question_sync(&existing, questions);
        if plan.is_noop() {
            return Ok(());
        }
        tracing::debug!(
            survey_id,
            create = plan.create.len(),
            update = plan.update.len(),
            delete = plan.delete.len(),
            "Syncing survey questions"
        );

        if !plan.delete.is_empty() {
            sqlx::query("DELETE FROM survey_questions WHERE survey_id = $1 AND id = ANY($2)")
                .bind(survey_id)
                .bind(&plan.delete)
                .execute(&mut *conn)
                .await?;
        }
        for (id, planned) in &plan.update {
            Self::update(&mut *conn, *id, planned).await?;
        }
        for planned in &plan.create {
            Self::insert(&mut *conn, survey_id, planned).await?;
        }
        Ok(())
    }

    async fn insert(
        conn: &mut PgConnection,
        survey_id: DbId,
        planned: &PlannedQuestion<'_>,
    ) -> Result<(), sqlx::Error> {
        let q = planned.payload;
        sqlx::query(
            "INSERT INTO survey_questions
                (survey_id, position, question_type, question, description, required, answers)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(survey_id)
        .bind(planned.position)
        .bind(q.kind.as_str())
        .bind(q.question.trim())
        .bind(&q.description)
        .bind(q.required)
        .bind(Json(q.normalized_answers()))
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn update(
        conn: &mut PgConnection,
        id: DbId,
        planned: &PlannedQuestion<'_>,
    ) -> Result<(), sqlx::Error> {
        let q = planned.payload;
        sqlx::query(
            "UPDATE survey_questions SET
                position = $2,
                question_type = $3,
                question = $4,
                description = $5,
                required = $6,
                answers = $7,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(planned.position)
        .bind(q.kind.as_str())
        .bind(q.question.trim())
        .bind(&q.description)
        .bind(q.required)
        .bind(Json(q.normalized_answers()))
        .execute(conn)
        .await?;
        Ok(())
    }
}
