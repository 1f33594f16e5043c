//! PostgreSQL implementations of the report store traits.

pub mod access;
pub mod attachment;
pub mod certificate;
pub mod issue;

pub use access::{access_from_roles, AccessRepository};
pub use attachment::AttachmentRepository;
pub use certificate::CertificateRepository;
pub use issue::IssueRepository;
