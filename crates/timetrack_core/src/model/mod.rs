//! Domain model for people, tasks and reporting periods.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own input validation that does not need storage access.
//!
//! # Invariants
//! - Identifiers are assigned by the store and never reused.
//! - A passport is exactly 4 series digits and 6 number digits.

pub mod period;
pub mod person;
pub mod task;
