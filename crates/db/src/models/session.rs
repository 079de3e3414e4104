//! Session rows: one per issued access token, revocable on logout.

use sqlx::FromRow;
use uuid::Uuid;
use websurvey_core::types::{DbId, Timestamp};

/// A row from the `user_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    /// The `jti` claim of the access token this session backs.
    pub token_id: Uuid,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a session at login.
#[derive(Debug)]
pub struct CreateSession {
    pub user_id: DbId,
    pub token_id: Uuid,
    pub expires_at: Timestamp,
}
