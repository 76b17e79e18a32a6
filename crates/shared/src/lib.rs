//! Shared errors, configuration, and collaborator contracts for Velka.
//!
//! This crate provides the pieces used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - The notification collaborator contract and its SMTP implementation

pub mod config;
pub mod error;
pub mod notification;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use notification::{NotificationRequest, Notifier, SmtpNotifier};
