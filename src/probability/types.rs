//! Probability result types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::market::SelectionId;

/// Win probabilities derived for one selection from a market snapshot.
///
/// `implied` is the raw probability read off the order book; `market_adjusted`
/// is `implied` normalized so that one market's probabilities sum to 1.
/// Values are immutable once derived — a refresh derives a fresh set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionProbability {
    /// Exchange identifier of the selection this was derived from.
    pub selection_id: SelectionId,
    /// Runner name at derivation time.
    pub name: String,
    /// Raw implied probability, before overround removal.
    pub implied: Decimal,
    /// Probability normalized across the whole market.
    pub market_adjusted: Decimal,
}

impl SelectionProbability {
    /// Favorite-first comparison: highest market-adjusted probability wins.
    pub fn favorite_cmp(a: &Self, b: &Self) -> std::cmp::Ordering {
        b.market_adjusted.cmp(&a.market_adjusted)
    }
}
