use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::document::Document;

/// Offset added to both published visitor counters.
pub const VISITOR_BASELINE: i64 = 398;

/// Published app-wide visitor counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorStats {
    pub total_unique_visitors: i64,
    pub total_visits: i64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl VisitorStats {
    /// Stats shown when nothing has been recorded or the read failed.
    pub fn baseline() -> Self {
        Self {
            total_unique_visitors: VISITOR_BASELINE,
            total_visits: VISITOR_BASELINE,
            last_updated: None,
        }
    }

    /// Read the aggregate document, adding the baseline to each counter.
    pub fn from_document(doc: &Document) -> Self {
        Self {
            total_unique_visitors: doc.counter("totalUniqueVisitors") + VISITOR_BASELINE,
            total_visits: doc.counter("totalVisits") + VISITOR_BASELINE,
            last_updated: doc.get("lastUpdated").and_then(|v| v.as_timestamp()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_baseline() {
        let mut doc = Document::new();
        doc.insert("totalUniqueVisitors", 2i64);
        doc.insert("totalVisits", 5i64);
        let stats = VisitorStats::from_document(&doc);
        assert_eq!(stats.total_unique_visitors, 400);
        assert_eq!(stats.total_visits, 403);
        assert_eq!(stats.last_updated, None);
    }

    #[test]
    fn empty_document_is_baseline() {
        assert_eq!(VisitorStats::from_document(&Document::new()), VisitorStats::baseline());
    }
}
