//! Application records read back from the document store.

pub mod history;
mod stats;

pub use history::{HistoryCollection, HistoryRecord};
pub use stats::{VISITOR_BASELINE, VisitorStats};
