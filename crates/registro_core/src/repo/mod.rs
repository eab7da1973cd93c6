//! Storage adapter for the registry file.
//!
//! # Responsibility
//! - Read and write the `;`-delimited registry file.
//! - Keep CSV dialect details out of search, workflow and export code.
//!
//! # Invariants
//! - Every save is a full overwrite of the target file.
//! - `unnamed*` columns never survive a load or a save.
//! - One active writer is assumed; concurrent writers race with
//!   last-write-wins semantics.

pub mod table_repo;
