//! The four allocation policy implementations.

use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use tracing::instrument;

use crate::error::AllocationError;
use crate::probability::SelectionProbability;

use super::policy::AllocationPolicy;
use super::types::Allocation;

/// Distribute selections across participants under the given policy.
///
/// Selections are sorted favorite-first before any policy runs (the random
/// policy ignores the ordering entirely). The RNG drives every shuffle, so
/// callers that need reproducible output pass a seeded generator.
#[instrument(skip(participants, selections, rng), fields(policy = %policy, num_participants = participants.len(), num_selections = selections.len()))]
pub fn allocate<R: Rng>(
    participants: &[String],
    selections: &[SelectionProbability],
    policy: AllocationPolicy,
    rng: &mut R,
) -> Result<Allocation, AllocationError> {
    if participants.is_empty() {
        return Err(AllocationError::NoParticipants);
    }

    for (i, name) in participants.iter().enumerate() {
        if participants[..i].contains(name) {
            return Err(AllocationError::DuplicateParticipant(name.clone()));
        }
    }

    if selections.len() < participants.len() {
        return Err(AllocationError::NotEnoughSelections {
            num_selections: selections.len(),
            num_participants: participants.len(),
        });
    }

    let buckets = match policy {
        AllocationPolicy::Staggered => assign_staggered(participants, selections),
        AllocationPolicy::Tiered => assign_tiered(participants, selections, rng),
        AllocationPolicy::Random => assign_random(participants, selections, rng),
        AllocationPolicy::Fair => assign_fair(participants, selections, rng),
    };

    Ok(Allocation::new(
        participants
            .iter()
            .cloned()
            .zip(buckets)
            .collect(),
    ))
}

fn sorted_by_favorite(selections: &[SelectionProbability]) -> Vec<SelectionProbability> {
    let mut sorted = selections.to_vec();
    sorted.sort_by(SelectionProbability::favorite_cmp);
    sorted
}

/// Snake draft. Walk the favorite-first list assigning one selection per
/// participant; after each full pass, reverse the pick order so the same
/// participant never holds first pick twice in a row.
fn assign_staggered(
    participants: &[String],
    selections: &[SelectionProbability],
) -> Vec<Vec<SelectionProbability>> {
    let n = participants.len();
    let mut pick_order: Vec<usize> = (0..n).collect();
    let mut buckets: Vec<Vec<SelectionProbability>> = vec![Vec::new(); n];

    for (i, selection) in sorted_by_favorite(selections).into_iter().enumerate() {
        let slot = i % n;
        buckets[pick_order[slot]].push(selection);

        if slot == n - 1 {
            pick_order.reverse();
        }
    }

    buckets
}

/// Favorite-first tiers of one selection per participant, drawn uniformly
/// at random within each tier. Every participant gets exactly one item per
/// full tier; the final short tier goes to a random subset.
fn assign_tiered<R: Rng>(
    participants: &[String],
    selections: &[SelectionProbability],
    rng: &mut R,
) -> Vec<Vec<SelectionProbability>> {
    let n = participants.len();
    let mut buckets: Vec<Vec<SelectionProbability>> = vec![Vec::new(); n];

    for tier in sorted_by_favorite(selections).chunks(n) {
        let mut draw_order: Vec<usize> = (0..n).collect();
        draw_order.shuffle(rng);

        for (selection, &participant) in tier.iter().zip(draw_order.iter()) {
            buckets[participant].push(selection.clone());
        }
    }

    buckets
}

/// Uniform random partition: shuffle both lists, deal round-robin.
fn assign_random<R: Rng>(
    participants: &[String],
    selections: &[SelectionProbability],
    rng: &mut R,
) -> Vec<Vec<SelectionProbability>> {
    let n = participants.len();
    let mut buckets: Vec<Vec<SelectionProbability>> = vec![Vec::new(); n];

    let mut shuffled = selections.to_vec();
    shuffled.shuffle(rng);

    let mut deal_order: Vec<usize> = (0..n).collect();
    deal_order.shuffle(rng);

    for (i, selection) in shuffled.into_iter().enumerate() {
        buckets[deal_order[i % n]].push(selection);
    }

    buckets
}

/// Equity-balancing greedy. Each participant starts owed an equal share of
/// the total probability mass, takes one of the top-n selections, then the
/// remainder is dealt in random order to whoever is owed the most.
///
/// Ties on remaining deficit break toward the earliest participant in the
/// caller's input order, keeping the result reproducible for a fixed seed.
fn assign_fair<R: Rng>(
    participants: &[String],
    selections: &[SelectionProbability],
    rng: &mut R,
) -> Vec<Vec<SelectionProbability>> {
    let n = participants.len();
    let target = Decimal::ONE / Decimal::from(n as u64);

    let mut deficits: Vec<Decimal> = vec![target; n];
    let mut buckets: Vec<Vec<SelectionProbability>> = vec![Vec::new(); n];

    let mut remaining = sorted_by_favorite(selections);

    // One top selection each, favorites going to participants in input order.
    for (deficit, bucket) in deficits.iter_mut().zip(buckets.iter_mut()) {
        let selection = remaining.remove(0);
        *deficit -= selection.market_adjusted;
        bucket.push(selection);
    }

    // Shuffling the remainder avoids systematically handing the best of the
    // rest to whoever drew the worst opener.
    remaining.shuffle(rng);

    for selection in remaining {
        let mut neediest = 0;
        for i in 1..n {
            if deficits[i] > deficits[neediest] {
                neediest = i;
            }
        }

        deficits[neediest] -= selection.market_adjusted;
        buckets[neediest].push(selection);
    }

    buckets
}
