//! Refresh reconciliation: re-price an existing sweepstake in place.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::error::{EngineError, ReconcileError};
use crate::market::{MarketDataProvider, SelectionId};
use crate::metrics;
use crate::probability::{compute_market_probabilities, SelectionProbability};

use super::store::SweepstakeStore;
use super::types::{Participant, Sweepstake, SweepstakeId};

/// What a reconciliation pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Assignments matched against fresh data and re-priced.
    pub updated: usize,
    /// Assignments whose selection vanished from the market.
    pub vanished: usize,
}

/// Reconcile a sweepstake against freshly derived probabilities.
///
/// Matching is by stable selection identifier. An assignment with a match
/// gets a fresh history record; one whose selection vanished from the market
/// gets a zero record but keeps its participant — reconciliation never
/// re-allocates. Duplicate identifiers within a participant's list are
/// collapsed before matching so a stale duplicate is only reconciled once.
///
/// The replacement participant set is built completely before being swapped
/// in, so an error partway leaves the sweepstake untouched.
pub fn reconcile(
    sweepstake: &mut Sweepstake,
    fresh: &[SelectionProbability],
    now: OffsetDateTime,
) -> Result<RefreshOutcome, ReconcileError> {
    if !sweepstake.active {
        return Err(ReconcileError::Inactive {
            id: sweepstake.id.to_string(),
        });
    }

    if fresh.is_empty() {
        return Err(ReconcileError::MarketNotFound {
            market_id: sweepstake.market_id.clone(),
        });
    }

    let fresh_by_id: HashMap<SelectionId, &SelectionProbability> =
        fresh.iter().map(|p| (p.selection_id, p)).collect();

    let mut updated = 0;
    let mut vanished = 0;

    let mut next: Vec<Participant> = sweepstake.participants.clone();
    for participant in &mut next {
        let mut seen = HashSet::new();
        participant
            .assignments
            .retain(|a| seen.insert(a.selection_id));

        for assignment in &mut participant.assignments {
            match fresh_by_id.get(&assignment.selection_id) {
                Some(current) => {
                    assignment.record(current.market_adjusted, now);
                    updated += 1;
                }
                None => {
                    warn!(
                        selection_id = %assignment.selection_id,
                        name = %assignment.name,
                        "selection vanished from market; forcing probability to zero"
                    );
                    assignment.record(Decimal::ZERO, now);
                    vanished += 1;
                }
            }
        }

        participant.resync();
    }

    sweepstake.participants = next;
    sweepstake.updated_at = now;

    metrics::record_selections_vanished(vanished);
    debug!(
        sweepstake_id = %sweepstake.id,
        updated,
        vanished,
        total_equity = %sweepstake.total_equity(),
        "reconciled sweepstake"
    );

    Ok(RefreshOutcome { updated, vanished })
}

/// Fetch the sweepstake's market and run one full refresh cycle against the
/// store. Fetching and probability derivation happen before the entry lock
/// is taken; the in-place mutation itself is synchronous.
pub async fn refresh_sweepstake(
    provider: &dyn MarketDataProvider,
    store: &SweepstakeStore,
    id: SweepstakeId,
) -> Result<RefreshOutcome, EngineError> {
    let start = std::time::Instant::now();

    let sweepstake = store
        .get(id)
        .ok_or_else(|| ReconcileError::SweepstakeNotFound { id: id.to_string() })?;

    if !sweepstake.active {
        return Err(ReconcileError::Inactive { id: id.to_string() }.into());
    }

    let market = provider.fetch_market(&sweepstake.market_id).await?;
    if market.selections.is_empty() {
        return Err(ReconcileError::MarketNotFound {
            market_id: sweepstake.market_id.clone(),
        }
        .into());
    }

    let fresh = compute_market_probabilities(&market.selections)?;

    let now = OffsetDateTime::now_utc();
    let outcome = store
        .with_mut(id, |s| reconcile(s, &fresh, now))
        .ok_or_else(|| ReconcileError::SweepstakeNotFound { id: id.to_string() })??;

    metrics::record_refresh(start.elapsed());
    info!(
        sweepstake_id = %id,
        updated = outcome.updated,
        vanished = outcome.vanished,
        "refreshed sweepstake"
    );

    Ok(outcome)
}
