//! Notion document proxy service.
//!
//! This crate provides:
//! - REST API client for the Notion databases/pages/blocks endpoints
//! - Request payload mapping (properties and content blocks)
//! - HTTP server exposing simplified database and page operations
//! - Environment-backed configuration

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Most async API methods can fail

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod server;

pub use client::{BlockDeletion, NotionClient, UpdateOutcome, Upstream};
pub use config::Config;
pub use error::ProxyError;
pub use models::{ContentBlock, CreateDatabaseRequest, PageFields, TodoItem};
pub use server::{build_router, AppState};
