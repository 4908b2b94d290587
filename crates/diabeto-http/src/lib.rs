//! diabeto-http - Hosted services over their REST APIs.
//!
//! [`HostedBackend`] speaks to the identity, document and storage services;
//! [`ChatClassifier`] to a chat-completions inference endpoint. Every base
//! URL is configurable so the services can be replaced by an emulator.

mod backend;
mod client;
mod documents;
mod identity;
mod inference;
mod storage;

pub use backend::{Endpoints, HostedBackend, HostedConfig};
pub use client::RestClient;
pub use documents::RestDocuments;
pub use identity::RestIdentity;
pub use inference::{ChatClassifier, DEFAULT_MODEL};
pub use storage::RestStorage;
