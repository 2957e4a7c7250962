//! Business services.
//!
//! - [`password`] - Salted one-way hashing of account passwords
//! - [`token`] - Signed, time-limited identity tokens
//! - [`auth`] - Sign-up / sign-in orchestration
//! - [`applications`] - The Active→Resolved lifecycle and its notifications
//! - [`notifier`] - Capture and SMTP notification delivery

pub mod applications;
pub mod auth;
pub mod notifier;
pub mod password;
pub mod token;
