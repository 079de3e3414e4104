pub mod auth;
pub mod survey;
