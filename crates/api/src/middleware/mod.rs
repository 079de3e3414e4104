//! Request extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated user behind a bearer token.

pub mod auth;
