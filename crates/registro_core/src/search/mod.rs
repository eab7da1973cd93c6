//! Free-text row filtering.
//!
//! # Responsibility
//! - Narrow a loaded table to the rows matching a search box query.

pub mod filter;
