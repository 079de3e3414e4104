//! Shared domain model for the websurvey workspace.
//!
//! Everything in this crate is pure: survey and question types, the wire
//! representations exchanged between the editor and the REST API, field
//! validation, slug generation, data-URL image handling, and question sync
//! planning. The `api` and `client` crates both build on it.

pub mod data_url;
pub mod error;
pub mod question_sync;
pub mod slug;
pub mod survey;
pub mod types;
pub mod validation;
