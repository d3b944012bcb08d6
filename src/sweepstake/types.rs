//! Sweepstake aggregate types.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::allocation::AllocationPolicy;
use crate::market::SelectionId;

/// Store-assigned sweepstake identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct SweepstakeId(pub u64);

impl SweepstakeId {
    /// Placeholder before the store assigns a real identifier.
    pub const UNASSIGNED: SweepstakeId = SweepstakeId(0);
}

impl fmt::Display for SweepstakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "swp-{:06}", self.0)
    }
}

impl FromStr for SweepstakeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("swp-").unwrap_or(s);
        digits.parse().map(SweepstakeId)
    }
}

/// One probability observation for an assigned selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProbabilityRecord {
    /// Market-adjusted probability at observation time.
    pub probability: Decimal,
    /// When the observation was made.
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

/// A selection held by a participant, with its probability history.
///
/// Refreshes append records; nothing ever overwrites an old observation.
/// The current probability is simply the latest record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignedSelection {
    /// Exchange identifier used to match against fresh market data.
    pub selection_id: SelectionId,
    /// Runner name at assignment time.
    pub name: String,
    history: Vec<ProbabilityRecord>,
}

impl AssignedSelection {
    /// Create an assignment with its initial probability observation.
    pub fn new(
        selection_id: SelectionId,
        name: impl Into<String>,
        probability: Decimal,
        recorded_at: OffsetDateTime,
    ) -> Self {
        Self {
            selection_id,
            name: name.into(),
            history: vec![ProbabilityRecord {
                probability,
                recorded_at,
            }],
        }
    }

    /// Append a fresh probability observation.
    pub fn record(&mut self, probability: Decimal, recorded_at: OffsetDateTime) {
        self.history.push(ProbabilityRecord {
            probability,
            recorded_at,
        });
    }

    /// The latest observed probability.
    pub fn current_probability(&self) -> Decimal {
        self.history
            .last()
            .map(|r| r.probability)
            .unwrap_or(Decimal::ZERO)
    }

    /// Full observation history, oldest first.
    pub fn history(&self) -> &[ProbabilityRecord] {
        &self.history
    }
}

/// A participant and everything assigned to them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    /// Participant name, unique within a sweepstake.
    pub name: String,
    /// Sum of current probabilities over all assignments.
    pub equity: Decimal,
    /// Assigned selections, favorite-first by current probability.
    pub assignments: Vec<AssignedSelection>,
}

impl Participant {
    /// Recompute equity from current probabilities and restore the
    /// favorite-first assignment order.
    pub fn resync(&mut self) {
        self.assignments
            .sort_by(|a, b| b.current_probability().cmp(&a.current_probability()));
        self.equity = self
            .assignments
            .iter()
            .map(|a| a.current_probability())
            .sum();
    }
}

/// A running sweepstake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sweepstake {
    /// Store-assigned identifier.
    pub id: SweepstakeId,
    /// Display name.
    pub name: String,
    /// Exchange market this sweepstake tracks.
    pub market_id: String,
    /// Policy the initial allocation used.
    pub policy: AllocationPolicy,
    /// Whether refresh cycles still apply.
    pub active: bool,
    /// Creation time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last successful refresh (or creation) time.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Participants with their assignments.
    pub participants: Vec<Participant>,
}

impl Sweepstake {
    /// Total number of assigned selections.
    pub fn num_selections(&self) -> usize {
        self.participants.iter().map(|p| p.assignments.len()).sum()
    }

    /// Total equity across participants; close to 1 for a fresh allocation.
    pub fn total_equity(&self) -> Decimal {
        self.participants.iter().map(|p| p.equity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    #[test]
    fn sweepstake_id_round_trips() {
        let id = SweepstakeId(42);
        assert_eq!(id.to_string(), "swp-000042");
        assert_eq!("swp-000042".parse::<SweepstakeId>().unwrap(), id);
        assert_eq!("42".parse::<SweepstakeId>().unwrap(), id);
        assert!("swp-abc".parse::<SweepstakeId>().is_err());
    }

    #[test]
    fn assignment_history_is_append_only() {
        let t0 = datetime!(2026-07-01 12:00 UTC);
        let t1 = datetime!(2026-07-01 12:15 UTC);

        let mut assignment = AssignedSelection::new(SelectionId(1), "Runner", dec!(0.25), t0);
        assert_eq!(assignment.current_probability(), dec!(0.25));
        assert_eq!(assignment.history().len(), 1);

        assignment.record(dec!(0.31), t1);
        assert_eq!(assignment.current_probability(), dec!(0.31));
        assert_eq!(assignment.history().len(), 2);
        assert_eq!(assignment.history()[0].probability, dec!(0.25));
    }

    #[test]
    fn resync_recomputes_equity_and_order() {
        let t0 = datetime!(2026-07-01 12:00 UTC);
        let t1 = datetime!(2026-07-01 12:15 UTC);

        let mut a = AssignedSelection::new(SelectionId(1), "A", dec!(0.4), t0);
        let b = AssignedSelection::new(SelectionId(2), "B", dec!(0.3), t0);

        // A collapses below B on refresh.
        a.record(dec!(0.1), t1);

        let mut participant = Participant {
            name: "Alice".to_string(),
            equity: dec!(0.7),
            assignments: vec![a, b],
        };
        participant.resync();

        assert_eq!(participant.equity, dec!(0.4));
        assert_eq!(participant.assignments[0].selection_id, SelectionId(2));
    }
}
