//! Domain models for the helpdesk service.

pub mod application;
pub mod principal;
pub mod user;

pub use application::{Application, ApplicationFilter, FilterError, NewApplication, SortOrder};
pub use principal::Principal;
pub use user::{NewUser, User};
