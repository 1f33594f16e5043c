//! Entity definitions (database row mappings).

pub mod api_key;
pub mod attachment;
pub mod certificate;
pub mod issue;

pub use api_key::ApiKeyEntity;
pub use attachment::CertificateFileEntity;
pub use certificate::CertificateEntity;
pub use issue::IssueRowEntity;
