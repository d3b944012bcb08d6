//! Background refresh of active sweepstakes.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use crate::market::MarketDataProvider;
use crate::metrics;
use crate::sweepstake::{refresh_sweepstake, SweepstakeStore};

/// Run one refresh sweep over every active sweepstake, strictly
/// sequentially. A failed refresh leaves that sweepstake unchanged; the
/// next sweep retries it.
pub async fn refresh_all(provider: &dyn MarketDataProvider, store: &SweepstakeStore) {
    let ids = store.active_ids();
    if ids.is_empty() {
        info!("no active sweepstakes to refresh");
        return;
    }

    info!(count = ids.len(), "refreshing active sweepstakes");
    for id in ids {
        match refresh_sweepstake(provider, store, id).await {
            Ok(outcome) => {
                info!(
                    sweepstake_id = %id,
                    updated = outcome.updated,
                    vanished = outcome.vanished,
                    "refresh complete"
                );
            }
            Err(e) => {
                metrics::record_refresh_failure();
                error!(sweepstake_id = %id, error = %e, "refresh failed; will retry next sweep");
            }
        }
    }
}

/// Periodic refresh loop. Ticks every `interval_secs`; an interval of zero
/// disables refreshing entirely. Stops when the shutdown channel fires.
pub async fn run_refresh_task(
    provider: Arc<dyn MarketDataProvider>,
    store: Arc<SweepstakeStore>,
    interval_secs: u64,
    mut shutdown: watch::Receiver<bool>,
) {
    if interval_secs == 0 {
        info!("refresh task disabled (interval is 0)");
        return;
    }

    let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!(interval_secs, "refresh task started");
    loop {
        tokio::select! {
            _ = interval.tick() => {
                refresh_all(provider.as_ref(), store.as_ref()).await;
            }
            _ = shutdown.changed() => {
                info!("refresh task stopping");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::mock::{mock_market, MockProvider, SelectionBuilder};
    use crate::sweepstake::{generate, SweepstakeRequest};
    use crate::allocation::AllocationPolicy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    fn provider() -> MockProvider {
        let p = MockProvider::new();
        p.set_market(mock_market(
            "1.234",
            "Test",
            vec![
                SelectionBuilder::new(1, "A")
                    .back(dec!(2.0), dec!(100))
                    .lay(dec!(2.2), dec!(100))
                    .build(),
                SelectionBuilder::new(2, "B")
                    .back(dec!(3.0), dec!(100))
                    .lay(dec!(3.3), dec!(100))
                    .build(),
            ],
        ));
        p
    }

    #[tokio::test]
    async fn refresh_all_touches_only_active_sweepstakes() {
        let provider = provider();
        let store = SweepstakeStore::new();
        let mut rng = StdRng::seed_from_u64(3);

        let request = SweepstakeRequest {
            name: "Sweep".to_string(),
            market_id: "1.234".to_string(),
            policy: AllocationPolicy::Staggered,
            participants: vec!["Alice".to_string(), "Bob".to_string()],
            ignore_longshots: false,
        };

        let active = store.insert(generate(&provider, &request, &mut rng).await.unwrap());
        let closed = store.insert(generate(&provider, &request, &mut rng).await.unwrap());
        let _ = store.with_mut(closed, |s| s.active = false);

        refresh_all(&provider, &store).await;

        let history_len = |id| {
            store.get(id).unwrap().participants[0].assignments[0]
                .history()
                .len()
        };
        assert_eq!(history_len(active), 2);
        assert_eq!(history_len(closed), 1);
    }

    #[tokio::test]
    async fn refresh_all_survives_a_missing_market() {
        let provider = provider();
        let store = SweepstakeStore::new();
        let mut rng = StdRng::seed_from_u64(3);

        let request = SweepstakeRequest {
            name: "Sweep".to_string(),
            market_id: "1.234".to_string(),
            policy: AllocationPolicy::Random,
            participants: vec!["Alice".to_string(), "Bob".to_string()],
            ignore_longshots: false,
        };

        let id = store.insert(generate(&provider, &request, &mut rng).await.unwrap());
        let before = store.get(id).unwrap();

        provider.remove_market("1.234");
        refresh_all(&provider, &store).await;

        // Failed cycle leaves the sweepstake untouched.
        let after = store.get(id).unwrap();
        assert_eq!(after.updated_at, before.updated_at);
        assert_eq!(after.participants, before.participants);
    }
}
