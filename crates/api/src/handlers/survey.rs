//! Handlers for the `/survey` resource.
//!
//! Every route requires authentication and only ever exposes the caller's own
//! surveys. Writes validate the payload first, then store a new image (if one
//! was sent), then write the survey and its questions in one transaction.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use websurvey_core::error::CoreError;
use websurvey_core::survey::{Question, SurveyPayload, SurveyResource};
use websurvey_core::types::DbId;
use websurvey_core::validation::validate_survey;
use websurvey_db::models::survey::{CreateSurvey, Survey, UpdateSurvey};
use websurvey_db::repositories::{clamp_limit, clamp_offset, SurveyQuestionRepo, SurveyRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{DataResponse, PageMeta, PagedResponse};
use crate::state::AppState;

const UNAUTHORIZED_ACTION: &str = "This action is unauthorized.";

/// GET /api/survey
///
/// The caller's surveys, newest first, each with its questions.
pub async fn index(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PagedResponse<SurveyResource>>> {
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);

    let surveys = SurveyRepo::list_by_user(&state.pool, auth.user_id, limit, offset).await?;
    let total = SurveyRepo::count_by_user(&state.pool, auth.user_id).await?;

    let mut data = Vec::with_capacity(surveys.len());
    for survey in surveys {
        data.push(survey_resource(&state, survey).await?);
    }

    Ok(Json(PagedResponse {
        data,
        meta: PageMeta {
            total,
            limit,
            offset,
        },
    }))
}

/// POST /api/survey
///
/// Create a survey with its questions. Returns 201.
pub async fn store(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SurveyPayload>,
) -> AppResult<(StatusCode, Json<DataResponse<SurveyResource>>)> {
    validate_survey(&payload, Utc::now().date_naive())?;

    let image_path = match payload.image.as_deref() {
        Some(data_url) => Some(state.images.save_data_url(data_url).await?),
        None => None,
    };

    let title = payload.title.trim().to_string();
    let input = CreateSurvey {
        user_id: auth.user_id,
        slug: SurveyRepo::unique_slug(&state.pool, &title, None).await?,
        title,
        status: payload.status,
        description: non_empty(payload.description),
        image_path: image_path.clone(),
        expire_date: payload.expire_date,
    };

    let survey = match SurveyRepo::create(&state.pool, &input, &payload.questions).await {
        Ok(survey) => survey,
        Err(e) => {
            if let Some(name) = &image_path {
                state.images.discard(name).await;
            }
            return Err(e.into());
        }
    };
    tracing::info!(
        survey_id = survey.id,
        user_id = auth.user_id,
        questions = payload.questions.len(),
        "Survey created"
    );

    let resource = survey_resource(&state, survey).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: resource })))
}

/// GET /api/survey/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SurveyResource>>> {
    let survey = find_owned(&state, &auth, id).await?;
    let resource = survey_resource(&state, survey).await?;
    Ok(Json(DataResponse { data: resource }))
}

/// PUT /api/survey/{id}
///
/// Replace the survey fields and sync its questions. A new image replaces
/// (and deletes) the stored one; no image keeps it.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(payload): Json<SurveyPayload>,
) -> AppResult<Json<DataResponse<SurveyResource>>> {
    let existing = find_owned(&state, &auth, id).await?;
    validate_survey(&payload, Utc::now().date_naive())?;

    let new_image = match payload.image.as_deref() {
        Some(data_url) => Some(state.images.save_data_url(data_url).await?),
        None => None,
    };

    let title = payload.title.trim().to_string();
    let input = UpdateSurvey {
        slug: SurveyRepo::unique_slug(&state.pool, &title, Some(id)).await?,
        title,
        status: payload.status,
        description: non_empty(payload.description),
        image_path: new_image.clone(),
        expire_date: payload.expire_date,
    };

    let updated = SurveyRepo::update(&state.pool, id, &input, &payload.questions)
        .await
        .map_err(AppError::from)
        .and_then(|survey| {
            survey.ok_or(AppError::Core(CoreError::NotFound {
                entity: "Survey",
                id,
            }))
        });
    let survey = match updated {
        Ok(survey) => survey,
        Err(e) => {
            if let Some(name) = &new_image {
                state.images.discard(name).await;
            }
            return Err(e);
        }
    };

    if new_image.is_some() {
        if let Some(old) = &existing.image_path {
            state.images.discard(old).await;
        }
    }
    tracing::info!(survey_id = id, user_id = auth.user_id, "Survey updated");

    let resource = survey_resource(&state, survey).await?;
    Ok(Json(DataResponse { data: resource }))
}

/// DELETE /api/survey/{id}
///
/// Delete the survey, its questions and its image. Returns 204.
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_owned(&state, &auth, id).await?;

    let deleted = SurveyRepo::delete(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Survey",
            id,
        }))?;
    if let Some(name) = &deleted.image_path {
        state.images.discard(name).await;
    }
    tracing::info!(survey_id = id, user_id = auth.user_id, "Survey deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a survey, 404 if missing, 403 if owned by someone else.
async fn find_owned(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Survey> {
    let survey = SurveyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Survey",
            id,
        }))?;

    if survey.user_id != auth.user_id {
        tracing::warn!(survey_id = id, user_id = auth.user_id, "Denied access to survey");
        return Err(AppError::Core(CoreError::Forbidden(
            UNAUTHORIZED_ACTION.into(),
        )));
    }
    Ok(survey)
}

/// Build the public representation of a survey row.
async fn survey_resource(state: &AppState, survey: Survey) -> AppResult<SurveyResource> {
    let questions = SurveyQuestionRepo::list_by_survey(&state.pool, survey.id)
        .await?
        .into_iter()
        .map(Question::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SurveyResource {
        id: survey.id,
        title: survey.title,
        slug: survey.slug,
        status: survey.status,
        description: survey.description,
        image_url: survey.image_path.map(|name| state.images.public_url(&name)),
        expire_date: survey.expire_date,
        created_at: survey.created_at,
        updated_at: survey.updated_at,
        questions,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
