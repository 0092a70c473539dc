//! Bounded enrichment of secondary results with primary identifiers.

use serde::Serialize;
use tracing::{debug, warn};
use tunegate_core::{CanonicalResult, PlaybackSource};
use tunegate_providers::PrimaryProvider;
use tunegate_quota::QuotaTracker;

/// Why an enrichment pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every eligible item was looked up.
    Completed,
    /// The per-request lookup budget ran out.
    BudgetExhausted,
    /// The quota tracker refused a lookup.
    QuotaDenied,
    /// The primary failed a lookup.
    ProviderError,
}

/// What one enrichment pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnrichmentSummary {
    pub attempted: u32,
    pub enriched: u32,
    pub stopped_by: StopReason,
}

/// Try to attach primary identifiers to secondary items.
///
/// At most `budget` lookups are made, each spending one unit from `bucket`.
/// Items that are not matched keep their secondary data untouched.
pub async fn enrich(
    mut results: Vec<CanonicalResult>,
    budget: u32,
    bucket: &str,
    quota: &QuotaTracker,
    primary: &dyn PrimaryProvider,
) -> (Vec<CanonicalResult>, EnrichmentSummary) {
    let mut remaining = budget;
    let mut attempted = 0;
    let mut enriched = 0;
    let mut stopped_by = StopReason::Completed;

    for item in results.iter_mut().filter(|item| item.needs_enrichment()) {
        if remaining == 0 {
            stopped_by = StopReason::BudgetExhausted;
            break;
        }

        if !quota.consume_one(bucket).allowed {
            stopped_by = StopReason::QuotaDenied;
            break;
        }
        remaining -= 1;
        attempted += 1;

        match primary.lookup(&item.lookup_query()).await {
            Ok(Some(matched)) => {
                apply_match(item, matched);
                enriched += 1;
            }
            Ok(None) => {
                debug!(external_id = %item.external_id, "No primary match");
            }
            Err(e) => {
                warn!(
                    provider = primary.name(),
                    kind = e.kind(),
                    status = e.status(),
                    error = %e,
                    "Enrichment lookup failed"
                );
                stopped_by = StopReason::ProviderError;
                break;
            }
        }
    }

    let summary = EnrichmentSummary {
        attempted,
        enriched,
        stopped_by,
    };
    debug!(
        attempted,
        enriched,
        stopped_by = ?stopped_by,
        bucket,
        "Enrichment pass finished"
    );
    (results, summary)
}

/// Keep the secondary's descriptive fields; take the primary's identity.
fn apply_match(item: &mut CanonicalResult, mut matched: CanonicalResult) {
    item.external_id = std::mem::take(&mut matched.external_id);
    if !matched.thumbnail_refs.is_empty() {
        item.thumbnail_refs = std::mem::take(&mut matched.thumbnail_refs);
    }
    if !item.has_known_duration() && matched.has_known_duration() {
        item.duration_iso8601 = matched.duration_iso8601;
    }
    item.playback_source = PlaybackSource::SecondaryEnriched;
}
