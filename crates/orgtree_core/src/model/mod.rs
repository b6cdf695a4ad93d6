//! Domain model for organizations and their sector trees.
//!
//! # Responsibility
//! - Define plain value types shared by stores, service and reconstruction.
//!
//! # Invariants
//! - Every organization owns exactly one root sector (`depth == 0`).
//! - Sector codes are stable and never reused.

pub mod organization;
pub mod sector;

/// Tenant isolation key carried by every row.
pub type TenantId = i64;
