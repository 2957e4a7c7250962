//! Helpdesk API library.
//!
//! This crate provides the service as a library, allowing it to be tested
//! and reused: the binary in `main.rs` wires the `PostgreSQL` stores and
//! the configured notifier into [`state::AppState`], while the test
//! harnesses assemble the same router over the in-memory stores.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
