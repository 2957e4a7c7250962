//! Request middleware.

pub mod auth;

pub use auth::{AccessPolicy, CurrentUser, access_guard};
