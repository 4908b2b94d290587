//! Per-device daily visit counting.
//!
//! A visit counts once per device per UTC day. The local marker is written
//! first and the three remote aggregates are bumped afterwards; nothing here
//! ever fails the caller.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::context::ClientContext;
use crate::document::WriteFields;
use crate::model::VisitorStats;
use crate::traits::{DocumentStore, LocalStore};
use crate::types::DocumentPath;
use crate::Result;

pub const VISITOR_ID_KEY: &str = "visitor_id";
pub const VISIT_COUNT_KEY: &str = "visit_count";
pub const LAST_VISIT_DATE_KEY: &str = "last_visit_date";

const STATS_DOCUMENT: &str = "app_stats/visitor_stats";
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Result of [`VisitCounter::track`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackOutcome {
    /// `None` when local storage failed.
    pub visitor_id: Option<String>,
    pub is_new_visit_today: bool,
}

/// Tracks visits against device storage and anonymous remote aggregates.
pub struct VisitCounter {
    local: Arc<dyn LocalStore>,
    documents: Arc<dyn DocumentStore>,
}

impl VisitCounter {
    pub fn new(ctx: &ClientContext) -> Self {
        Self {
            local: ctx.local().clone(),
            documents: ctx.backend().documents(None),
        }
    }

    /// Track a visit happening now.
    pub async fn track_now(&self) -> TrackOutcome {
        self.track(Utc::now().date_naive()).await
    }

    /// Track a visit on `today`.
    #[instrument(skip(self))]
    pub async fn track(&self, today: NaiveDate) -> TrackOutcome {
        match self.track_local(today).await {
            Ok((visitor_id, is_new)) => {
                if is_new {
                    let date = today.format("%Y-%m-%d").to_string();
                    if let Err(err) = self.update_remote(&visitor_id, &date).await {
                        warn!(error = %err, "failed to update visitor stats");
                    }
                }
                TrackOutcome {
                    visitor_id: Some(visitor_id),
                    is_new_visit_today: is_new,
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to track visit");
                TrackOutcome {
                    visitor_id: None,
                    is_new_visit_today: false,
                }
            }
        }
    }

    /// Published totals, with the baseline offset applied.
    pub async fn stats(&self) -> VisitorStats {
        let result = async {
            let path = DocumentPath::new(STATS_DOCUMENT)?;
            self.documents.get(&path).await
        }
        .await;

        match result {
            Ok(Some(doc)) => VisitorStats::from_document(&doc.fields),
            Ok(None) => VisitorStats::baseline(),
            Err(err) => {
                warn!(error = %err, "failed to read visitor stats");
                VisitorStats::baseline()
            }
        }
    }

    /// Days on which this device has been counted.
    pub async fn local_count(&self) -> u64 {
        match self.local.get(VISIT_COUNT_KEY).await {
            Ok(value) => value.and_then(|v| v.parse().ok()).unwrap_or(0),
            Err(err) => {
                warn!(error = %err, "failed to read local visit count");
                0
            }
        }
    }

    /// Forget this device's visitor id, counter and last-visit day.
    pub async fn reset(&self) {
        for key in [VISITOR_ID_KEY, VISIT_COUNT_KEY, LAST_VISIT_DATE_KEY] {
            if let Err(err) = self.local.remove(key).await {
                warn!(error = %err, "failed to reset visitor data");
                return;
            }
        }
        debug!("visitor data reset");
    }

    async fn track_local(&self, today: NaiveDate) -> Result<(String, bool)> {
        let visitor_id = self.visitor_id().await;
        let date = today.format("%Y-%m-%d").to_string();

        // Only the activation that moves the day marker counts.
        if !self.local.set_if_changed(LAST_VISIT_DATE_KEY, &date).await? {
            return Ok((visitor_id, false));
        }

        let count = self
            .local
            .get(VISIT_COUNT_KEY)
            .await?
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        self.local
            .set(VISIT_COUNT_KEY, &(count + 1).to_string())
            .await?;
        debug!(%visitor_id, %date, "new visit");
        Ok((visitor_id, true))
    }

    /// The stored visitor id, creating one if absent. A storage failure
    /// yields a fresh, unsaved id.
    async fn visitor_id(&self) -> String {
        match self.local.get(VISITOR_ID_KEY).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                let id = generate_visitor_id();
                if let Err(err) = self.local.set(VISITOR_ID_KEY, &id).await {
                    warn!(error = %err, "failed to save visitor id");
                }
                id
            }
            Err(err) => {
                warn!(error = %err, "failed to read visitor id");
                generate_visitor_id()
            }
        }
    }

    /// Bump the three aggregates in order, stopping at the first failure.
    async fn update_remote(&self, visitor_id: &str, date: &str) -> Result<()> {
        let visitor = DocumentPath::new(format!("visitors/{visitor_id}"))?;
        self.documents
            .merge(
                &visitor,
                &WriteFields::new()
                    .server_timestamp("firstVisit")
                    .server_timestamp("lastVisit")
                    .increment("totalVisits", 1)
                    .set("lastVisitDate", date),
            )
            .await?;

        let daily = DocumentPath::new(format!("daily_stats/{date}"))?;
        self.documents
            .merge(
                &daily,
                &WriteFields::new()
                    .set("date", date)
                    .increment("uniqueVisitors", 1)
                    .increment("totalVisits", 1)
                    .server_timestamp("lastUpdated"),
            )
            .await?;

        let stats = DocumentPath::new(STATS_DOCUMENT)?;
        self.documents
            .merge(
                &stats,
                &WriteFields::new()
                    .increment("totalUniqueVisitors", 1)
                    .increment("totalVisits", 1)
                    .server_timestamp("lastUpdated"),
            )
            .await?;
        Ok(())
    }
}

/// `visitor_<unix millis>_<9 base36 chars>`.
pub fn generate_visitor_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("visitor_{}_{suffix}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visitor_id_shape() {
        let id = generate_visitor_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "visitor");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].bytes().all(|b| ID_ALPHABET.contains(&b)));
    }

    #[test]
    fn visitor_ids_differ() {
        assert_ne!(generate_visitor_id(), generate_visitor_id());
    }
}
