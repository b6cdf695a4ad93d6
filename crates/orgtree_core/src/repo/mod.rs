//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts for organizations and sectors.
//! - Isolate SQLite query details from the tree orchestration service.
//!
//! # Invariants
//! - Stores report storage failures only (`StoreError`); turning a missing
//!   row or a duplicate into a domain error is the service's job.
//! - Every sector/organization query is scoped by tenant id, except the
//!   bulk delete keyed by organization id.

pub mod error;
pub mod organization_repo;
mod schema;
pub mod sector_repo;

pub use error::{StoreError, StoreResult};
