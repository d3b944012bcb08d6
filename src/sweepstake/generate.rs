//! Sweepstake generation: market snapshot to allocated participants.

use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::allocation::{allocate, AllocationPolicy};
use crate::error::EngineError;
use crate::market::MarketDataProvider;
use crate::metrics;
use crate::probability::{compute_market_probabilities, SelectionProbability};

use super::types::{AssignedSelection, Participant, Sweepstake, SweepstakeId};

/// Everything needed to generate one sweepstake.
#[derive(Debug, Clone)]
pub struct SweepstakeRequest {
    /// Display name for the sweepstake.
    pub name: String,
    /// Exchange market to price.
    pub market_id: String,
    /// Allocation policy to apply.
    pub policy: AllocationPolicy,
    /// Participant names, unique.
    pub participants: Vec<String>,
    /// Drop selections with no lay depth before allocating.
    pub ignore_longshots: bool,
}

/// Generate a sweepstake from a live market snapshot.
///
/// Participant order is shuffled before allocation so that input order
/// never decides who benefits from order-sensitive policies. The returned
/// sweepstake carries [`SweepstakeId::UNASSIGNED`] until the store admits it.
pub async fn generate(
    provider: &dyn MarketDataProvider,
    request: &SweepstakeRequest,
    rng: &mut impl Rng,
) -> Result<Sweepstake, EngineError> {
    let market = provider.fetch_market(&request.market_id).await?;
    debug!(
        market_id = %market.market_id,
        status = %market.status,
        num_selections = market.selections.len(),
        "generating sweepstake"
    );

    let mut selections = market.selections;
    if request.ignore_longshots {
        let before = selections.len();
        selections.retain(|s| !s.is_longshot());
        debug!(dropped = before - selections.len(), "filtered longshots");
    }

    let probabilities = compute_market_probabilities(&selections)?;

    let mut draft_order = request.participants.clone();
    draft_order.shuffle(rng);

    let allocation = allocate(&draft_order, &probabilities, request.policy, rng)?;

    let now = OffsetDateTime::now_utc();
    let participants = allocation
        .into_buckets()
        .into_iter()
        .map(|(name, mut selections)| {
            selections.sort_by(SelectionProbability::favorite_cmp);
            let mut participant = Participant {
                name,
                equity: Decimal::ZERO,
                assignments: selections
                    .into_iter()
                    .map(|s| AssignedSelection::new(s.selection_id, s.name, s.market_adjusted, now))
                    .collect(),
            };
            participant.resync();
            participant
        })
        .collect();

    let sweepstake = Sweepstake {
        id: SweepstakeId::UNASSIGNED,
        name: request.name.clone(),
        market_id: request.market_id.clone(),
        policy: request.policy,
        active: true,
        created_at: now,
        updated_at: now,
        participants,
    };

    metrics::record_sweepstake_generated(request.policy);
    info!(
        market_id = %sweepstake.market_id,
        policy = %sweepstake.policy,
        num_participants = sweepstake.participants.len(),
        num_selections = sweepstake.num_selections(),
        "sweepstake generated"
    );

    Ok(sweepstake)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::mock::{mock_market, MockProvider, SelectionBuilder};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn provider_with_field() -> MockProvider {
        let provider = MockProvider::new();
        provider.set_market(mock_market(
            "1.234",
            "Tournament Winner",
            vec![
                SelectionBuilder::new(1, "A")
                    .back(dec!(2.0), dec!(100))
                    .lay(dec!(2.2), dec!(100))
                    .build(),
                SelectionBuilder::new(2, "B")
                    .back(dec!(4.0), dec!(100))
                    .lay(dec!(4.4), dec!(100))
                    .build(),
                SelectionBuilder::new(3, "C")
                    .back(dec!(8.0), dec!(100))
                    .lay(dec!(9.0), dec!(100))
                    .build(),
                SelectionBuilder::new(4, "Longshot").back(dec!(500), dec!(5)).build(),
            ],
        ));
        provider
    }

    fn request(ignore_longshots: bool) -> SweepstakeRequest {
        SweepstakeRequest {
            name: "Test Sweep".to_string(),
            market_id: "1.234".to_string(),
            policy: AllocationPolicy::Staggered,
            participants: vec!["Alice".to_string(), "Bob".to_string()],
            ignore_longshots,
        }
    }

    #[tokio::test]
    async fn generates_a_full_partition() {
        let provider = provider_with_field();
        let mut rng = StdRng::seed_from_u64(1);

        let sweepstake = generate(&provider, &request(false), &mut rng).await.unwrap();

        assert_eq!(sweepstake.id, SweepstakeId::UNASSIGNED);
        assert!(sweepstake.active);
        assert_eq!(sweepstake.participants.len(), 2);
        assert_eq!(sweepstake.num_selections(), 4);

        // Total equity is the full normalized probability mass.
        let tolerance = Decimal::new(4, 4);
        assert!((sweepstake.total_equity() - Decimal::ONE).abs() <= tolerance);
    }

    #[tokio::test]
    async fn longshot_filter_drops_unlayable_selections() {
        let provider = provider_with_field();
        let mut rng = StdRng::seed_from_u64(1);

        let sweepstake = generate(&provider, &request(true), &mut rng).await.unwrap();

        assert_eq!(sweepstake.num_selections(), 3);
        for participant in &sweepstake.participants {
            assert!(participant
                .assignments
                .iter()
                .all(|a| a.name != "Longshot"));
        }
    }

    #[tokio::test]
    async fn assignments_start_with_one_history_record() {
        let provider = provider_with_field();
        let mut rng = StdRng::seed_from_u64(1);

        let sweepstake = generate(&provider, &request(false), &mut rng).await.unwrap();

        for participant in &sweepstake.participants {
            for assignment in &participant.assignments {
                assert_eq!(assignment.history().len(), 1);
            }
        }
    }

    #[tokio::test]
    async fn missing_market_propagates() {
        let provider = MockProvider::new();
        let mut rng = StdRng::seed_from_u64(1);

        let result = generate(&provider, &request(false), &mut rng).await;
        assert!(matches!(
            result,
            Err(EngineError::Market(crate::error::MarketError::MarketNotFound { .. }))
        ));
    }
}
