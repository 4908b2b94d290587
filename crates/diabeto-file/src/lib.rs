//! diabeto-file - Filesystem-backed services for local development and tests.

mod backend;
mod documents;
mod identity;
mod local;
mod objects;
mod store;

pub use backend::FileBackend;
pub use documents::FileDocuments;
pub use identity::FileIdentity;
pub use local::FileLocalStore;
pub use objects::FileObjects;
pub use store::{FileStore, LocalAccount};
