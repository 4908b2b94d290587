//! Core service types.
//!
//! These types enforce addressing invariants at construction time,
//! ensuring invalid states are unrepresentable.

mod document_path;
mod object_path;
mod service_url;
mod user_id;

pub use document_path::{CollectionPath, DocumentId, DocumentPath};
pub use object_path::ObjectPath;
pub use service_url::ServiceUrl;
pub use user_id::UserId;
