//! Repository for the `surveys` table.

use sqlx::PgPool;
use websurvey_core::slug;
use websurvey_core::survey::QuestionPayload;
use websurvey_core::types::DbId;

use crate::models::survey::{CreateSurvey, Survey, UpdateSurvey};
use crate::repositories::SurveyQuestionRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, title, slug, status, description, image_path, \
                       expire_date, created_at, updated_at";

/// Provides CRUD operations for surveys and, transactionally, their questions.
pub struct SurveyRepo;

impl SurveyRepo {
    /// Insert a survey and its questions in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSurvey,
        questions: &[QuestionPayload],
    ) -> Result<Survey, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO surveys (user_id, title, slug, status, description, image_path, expire_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let survey = sqlx::query_as::<_, Survey>(&query)
            .bind(input.user_id)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(input.status)
            .bind(&input.description)
            .bind(&input.image_path)
            .bind(input.expire_date)
            .fetch_one(&mut *tx)
            .await?;

        SurveyQuestionRepo::insert_all(&mut tx, survey.id, questions).await?;

        tx.commit().await?;
        Ok(survey)
    }

    /// Find a survey by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Survey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM surveys WHERE id = $1");
        sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's surveys, newest first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Survey>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM surveys
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Survey>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count a user's surveys.
    pub async fn count_by_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM surveys WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Update a survey and sync its questions in one transaction.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSurvey,
        questions: &[QuestionPayload],
    ) -> Result<Option<Survey>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE surveys SET
                title = $2,
                slug = $3,
                status = $4,
                description = $5,
                image_path = COALESCE($6, image_path),
                expire_date = $7,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let survey = sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(input.status)
            .bind(&input.description)
            .bind(&input.image_path)
            .bind(input.expire_date)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(survey) = survey else {
            return Ok(None);
        };

        SurveyQuestionRepo::sync(&mut tx, survey.id, questions).await?;

        tx.commit().await?;
        Ok(Some(survey))
    }

    /// Delete a survey (questions cascade). Returns the deleted row so the
    /// caller can clean up its image.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Survey>, sqlx::Error> {
        let query = format!("DELETE FROM surveys WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether `slug` is used by any survey other than `except_id`.
    pub async fn slug_taken(
        pool: &PgPool,
        slug: &str,
        except_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM surveys WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(slug)
        .bind(except_id)
        .fetch_one(pool)
        .await
    }

    /// Derive a slug from `title` that no other survey uses.
    ///
    /// Two concurrent saves can still race to the same slug; the loser fails
    /// on `uq_surveys_slug` and surfaces as a 409.
    pub async fn unique_slug(
        pool: &PgPool,
        title: &str,
        except_id: Option<DbId>,
    ) -> Result<String, sqlx::Error> {
        let base = slug::slugify(title);
        let mut n = 1;
        loop {
            let candidate = slug::candidate(&base, n);
            if !Self::slug_taken(pool, &candidate, except_id).await? {
                return Ok(candidate);
            }
            n += 1;
        }
    }
}
