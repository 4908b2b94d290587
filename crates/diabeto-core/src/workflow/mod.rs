//! User-facing workflows written against the service traits.

pub mod auth;
pub mod encoder;
pub mod history;
pub mod scan;
pub mod visits;

pub use encoder::{EncodedImage, ImageSource, encode};
pub use history::HistoryBrowser;
pub use scan::{ScanOutcome, run_scan, store_result};
pub use visits::{TrackOutcome, VisitCounter};
