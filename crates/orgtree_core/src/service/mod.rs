//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into tree-preserving operations.
//! - Keep outer layers decoupled from storage details.

pub mod org_tree_service;
