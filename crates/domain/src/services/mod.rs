//! Report core services.
//!
//! Record access goes through the store traits; projection, grade
//! resolution, group scoping and presentation are pure.

pub mod field_projector;
pub mod grade;
pub mod group_scope;
pub mod report_presenter;
pub mod stores;

pub use field_projector::{FieldProjector, DEFAULT_DATE_FORMAT, EMPTY_ID_NUMBER};
pub use grade::{GradeResolver, GradebookResolver};
pub use group_scope::resolve_group_scope;
pub use report_presenter::ReportPresenter;
pub use stores::{
    AccessPolicy, AttachmentStore, Caller, CertificateDirectory, CourseAccess, IssueStore,
    ReportStores, StoreError,
};
