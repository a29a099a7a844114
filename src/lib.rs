//! Biblib Shared Library Management System
//!
//! A Rust implementation of a shared bibliographic library service: users
//! create named collections of bibliographic records and grant other users
//! graduated access rights (read, write, admin, owner) to them.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
