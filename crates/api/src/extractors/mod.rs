//! Custom Axum extractors.

pub mod caller;

pub use caller::{authenticate, AuthenticatedCaller, API_KEY_HEADER};
