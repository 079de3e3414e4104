//! Row types and DTOs, one module per table.

pub mod question;
pub mod session;
pub mod survey;
pub mod user;
