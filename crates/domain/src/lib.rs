//! Domain layer for the certificate report backend.
//!
//! This crate contains:
//! - Domain models (certificates, issues, attachments, export requests, views)
//! - Business logic services (projection, grades, group scope, presentation)
//! - Store traits implemented by the persistence layer

pub mod models;
pub mod services;
