//! Survey entity model and DTOs.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use websurvey_core::types::{DbId, Timestamp};

/// A survey row from the `surveys` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Survey {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub slug: String,
    pub status: bool,
    pub description: Option<String>,
    /// Path of the stored image relative to the image storage root.
    pub image_path: Option<String>,
    pub expire_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new survey.
#[derive(Debug, Clone)]
pub struct CreateSurvey {
    pub user_id: DbId,
    pub title: String,
    pub slug: String,
    pub status: bool,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub expire_date: Option<NaiveDate>,
}

/// DTO for updating a survey.
///
/// Every field except `image_path` is written as given (the editor always
/// sends the full form). `image_path: None` keeps the stored image.
#[derive(Debug, Clone)]
pub struct UpdateSurvey {
    pub title: String,
    pub slug: String,
    pub status: bool,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub expire_date: Option<NaiveDate>,
}
