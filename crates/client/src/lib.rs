//! Client-side survey editing.
//!
//! - [`http`] / [`session`] -- authenticated HTTP adapter over `reqwest`.
//! - [`auth`] -- login, sign-up, logout; the only writer of the session token.
//! - [`form`] / [`store`] -- survey form snapshots and the reducer that
//!   produces them.
//! - [`editor`] -- pure operations over the question list.
//! - [`gateway`] -- survey REST calls.
//! - [`page`] -- the survey create/edit page gluing the above together.

pub mod auth;
pub mod config;
pub mod editor;
pub mod error;
pub mod form;
pub mod gateway;
pub mod http;
pub mod page;
pub mod session;
pub mod store;
