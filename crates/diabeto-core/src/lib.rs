//! diabeto-core - Core types, service traits and workflows.
//!
//! The managed services the toolkit talks to (identity provider, document
//! store, object store, inference endpoint, device storage) are expressed as
//! traits in [`traits`]. The user-facing workflows in [`workflow`] are written
//! against those traits and receive their collaborators through an explicit
//! [`ClientContext`].

pub mod context;
pub mod credentials;
pub mod document;
pub mod error;
pub mod model;
pub mod tokens;
pub mod traits;
pub mod types;
pub mod validation;
pub mod workflow;

pub use context::ClientContext;
pub use credentials::{Credentials, Registration};
pub use document::{Document, FieldValue, FieldWrite, StoredDocument, WriteFields};
pub use error::{AuthError, Error};
pub use model::{HistoryCollection, HistoryRecord, VisitorStats};
pub use tokens::{ApiKey, IdToken, RefreshToken};
pub use traits::{
    Announcer, AuthSession, Backend, Classifier, DocumentStore, IdentityProvider, LocalStore,
    ObjectStore,
};
pub use types::{CollectionPath, DocumentId, DocumentPath, ObjectPath, ServiceUrl, UserId};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
