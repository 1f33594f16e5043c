//! Shared utilities and common types for the certificate report backend.
//!
//! This crate provides common functionality used across all other crates:
//! - API key hashing
//! - Export filename sanitizing and date labels
//! - Page window clamping
//! - Report parameter validation

pub mod crypto;
pub mod filename;
pub mod pagination;
pub mod validation;
