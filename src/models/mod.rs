//! Data models

pub mod document;
pub mod library;
pub mod permission;
pub mod user;
