//! Retention purge for stale, unresolved alert records.

use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::store::models::{Filter, QueryRequest};
use crate::store::StoreClient;

/// Relation maintained externally; a non-empty value protects the alert from
/// purge.
const INCIDENT_RELATION_PROPERTY: &str = "Related Incident";

/// Settings for the purge task.
#[derive(Debug, Clone)]
pub struct PurgeSettings {
    /// Alert collection to sweep.
    pub database_id: String,
    /// Archive alerts created more than this many days ago.
    pub age_days: i64,
    /// Time between sweeps.
    pub interval: Duration,
}

/// Run the purge loop until `cancel` fires.
///
/// Sweeps immediately, then once per interval. A failed sweep query aborts
/// only that iteration; the loop itself never terminates on errors.
pub async fn run_purge_loop(store: StoreClient, settings: PurgeSettings, cancel: CancellationToken) {
    info!(
        age_days = settings.age_days,
        interval_secs = settings.interval.as_secs(),
        "Alert purge loop started"
    );

    loop {
        match sweep_expired_alerts(&store, &settings.database_id, settings.age_days).await {
            Ok(archived) if archived > 0 => {
                info!(archived, "Purge sweep completed");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Purge sweep query failed; retrying next interval");
            }
        }

        tokio::select! {
            () = cancel.cancelled() => {
                info!("Alert purge loop stopped");
                return;
            }
            () = tokio::time::sleep(settings.interval) => {}
        }
    }
}

/// Archive every alert created more than `age_days` ago that has no linked
/// incident. Returns the number of records archived.
///
/// A per-record archive failure is logged and skipped; the sweep always runs
/// to the end of the result set.
///
/// # Errors
/// Returns error only if the query itself fails.
pub async fn sweep_expired_alerts(
    store: &StoreClient,
    database_id: &str,
    age_days: i64,
) -> Result<usize, StoreError> {
    let cutoff = Utc::now() - chrono::Duration::days(age_days);
    let query = QueryRequest {
        filter: Filter::and(vec![
            Filter::created_before(cutoff),
            Filter::relation_is_empty(INCIDENT_RELATION_PROPERTY),
        ]),
    };

    let response = store.query_database(database_id, &query).await?;
    if response.has_more {
        // Remaining records are picked up by later sweeps.
        debug!("Purge query returned a partial result page");
    }

    let mut archived = 0;
    for page in &response.results {
        let name = page.title_text().unwrap_or("<untitled>");
        match store.archive_page(&page.id).await {
            Ok(()) => {
                archived += 1;
                info!(alert_id = %page.id, name = %name, "Archived expired alert");
            }
            Err(e) => {
                warn!(alert_id = %page.id, name = %name, error = %e, "Failed to archive alert");
            }
        }
    }

    Ok(archived)
}
