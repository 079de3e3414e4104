//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Helpers that must run inside
//! a caller's transaction take `&mut PgConnection` instead.

pub mod question_repo;
pub mod session_repo;
pub mod survey_repo;
pub mod user_repo;

pub use question_repo::SurveyQuestionRepo;
pub use session_repo::SessionRepo;
pub use survey_repo::SurveyRepo;
pub use user_repo::UserRepo;

/// Page size used when a list request does not specify one.
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page size a list request may ask for.
pub const MAX_LIMIT: i64 = 100;

/// Clamp a requested page size into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Clamp a requested offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_bounds() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(10_000)), MAX_LIMIT);
        assert_eq!(clamp_offset(Some(-5)), 0);
        assert_eq!(clamp_offset(Some(20)), 20);
    }
}
