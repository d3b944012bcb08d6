//! Allocation result types.

use rust_decimal::Decimal;

use crate::probability::SelectionProbability;

/// A partition of selections across participants.
///
/// Participant order is the order the engine assigned in; every input
/// selection appears in exactly one bucket.
#[derive(Debug, Clone)]
pub struct Allocation {
    buckets: Vec<(String, Vec<SelectionProbability>)>,
}

impl Allocation {
    pub(crate) fn new(buckets: Vec<(String, Vec<SelectionProbability>)>) -> Self {
        Self { buckets }
    }

    /// Number of participants.
    pub fn num_participants(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of assigned selections across all participants.
    pub fn num_selections(&self) -> usize {
        self.buckets.iter().map(|(_, s)| s.len()).sum()
    }

    /// Selections assigned to one participant.
    pub fn get(&self, name: &str) -> Option<&[SelectionProbability]> {
        self.buckets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.as_slice())
    }

    /// A participant's equity: the sum of its market-adjusted probabilities.
    pub fn equity(&self, name: &str) -> Decimal {
        self.get(name)
            .map(|selections| selections.iter().map(|s| s.market_adjusted).sum())
            .unwrap_or(Decimal::ZERO)
    }

    /// Iterate over (participant, selections) buckets.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SelectionProbability])> {
        self.buckets
            .iter()
            .map(|(name, selections)| (name.as_str(), selections.as_slice()))
    }

    /// Consume the allocation into its buckets.
    pub fn into_buckets(self) -> Vec<(String, Vec<SelectionProbability>)> {
        self.buckets
    }
}
