//! Shared types, errors, and configuration for Somon.
//!
//! This crate provides common types used across all other crates:
//! - Money and currency types with decimal precision
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Authentication request/response payloads
//! - Application-wide error types
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
