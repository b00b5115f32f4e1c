//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep HTTP and other transports decoupled from storage details.

pub mod person_service;
pub mod task_service;
