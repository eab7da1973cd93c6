//! Registry use-case services.
//!
//! # Responsibility
//! - Orchestrate load → filter → mutate → save cycles for callers.
//! - Provide form descriptors and dashboard metrics for presentation code.
//!
//! # See also
//! - `crate::repo` for the persistence contract these services drive.

pub mod form;
pub mod metrics;
pub mod record_service;
