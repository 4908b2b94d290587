//! Traits for the managed services the toolkit talks to.

mod announcer;
mod backend;
mod classifier;
mod documents;
mod identity;
mod local;
mod objects;

pub use announcer::{Announcer, Language};
pub use backend::Backend;
pub use classifier::{
    Classifier, NO_RESPONSE, NO_TRANSLATION, SYSTEM_PROMPT, TRANSLATE_PROMPT, USER_INSTRUCTION,
};
pub use documents::DocumentStore;
pub use identity::{AuthSession, IdentityProvider};
pub use local::LocalStore;
pub use objects::ObjectStore;
