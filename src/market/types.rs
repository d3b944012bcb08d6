//! Exchange market domain types.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::pricing::PriceLevel;

/// Stable identifier the exchange assigns to a selection.
///
/// Reconciliation matches on this, never on runner names — names can collide
/// with stale duplicates after market edits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SelectionId(pub i64);

impl fmt::Display for SelectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Trading status of an exchange market.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum MarketStatus {
    /// Market is live and tradeable.
    #[default]
    Open,
    /// Trading temporarily halted.
    Suspended,
    /// Market settled and removed from the exchange.
    Closed,
    /// Market defined but not yet open.
    Inactive,
}

/// One runner in an exchange market, with its two-sided depth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selection {
    /// Exchange-assigned selection identifier.
    pub id: SelectionId,
    /// Runner name as listed by the exchange.
    pub name: String,
    /// Back-side depth, best price first.
    pub available_to_back: Vec<PriceLevel>,
    /// Lay-side depth, best price first.
    pub available_to_lay: Vec<PriceLevel>,
    /// Last traded price, if any trade has occurred.
    pub last_price_traded: Option<Decimal>,
}

impl Selection {
    /// Best back price, if the back side has any depth.
    pub fn best_back_price(&self) -> Option<Decimal> {
        self.available_to_back.first().map(|l| l.price)
    }

    /// Best lay price, if the lay side has any depth.
    pub fn best_lay_price(&self) -> Option<Decimal> {
        self.available_to_lay.first().map(|l| l.price)
    }

    /// A longshot has no lay depth at all: nobody will cover it winning.
    pub fn is_longshot(&self) -> bool {
        self.available_to_lay.is_empty()
    }
}

/// Snapshot of one exchange market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    /// Exchange market identifier.
    pub market_id: String,
    /// Human-readable market name.
    pub market_name: String,
    /// Trading status at snapshot time.
    pub status: MarketStatus,
    /// Runners in the market, in exchange listing order.
    pub selections: Vec<Selection>,
}

impl Market {
    /// Check whether the market can currently be priced.
    pub fn is_open(&self) -> bool {
        self.status == MarketStatus::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn selection(backs: Vec<PriceLevel>, lays: Vec<PriceLevel>) -> Selection {
        Selection {
            id: SelectionId(1),
            name: "Runner".to_string(),
            available_to_back: backs,
            available_to_lay: lays,
            last_price_traded: None,
        }
    }

    #[test]
    fn market_status_from_string() {
        use std::str::FromStr;
        assert_eq!(MarketStatus::from_str("OPEN").unwrap(), MarketStatus::Open);
        assert_eq!(
            MarketStatus::from_str("suspended").unwrap(),
            MarketStatus::Suspended
        );
        assert!(MarketStatus::from_str("VOID").is_err());
    }

    #[test]
    fn best_prices_come_from_first_level() {
        let s = selection(
            vec![
                PriceLevel::new(dec!(3.0), dec!(50)),
                PriceLevel::new(dec!(2.9), dec!(100)),
            ],
            vec![
                PriceLevel::new(dec!(3.1), dec!(40)),
                PriceLevel::new(dec!(3.2), dec!(80)),
            ],
        );
        assert_eq!(s.best_back_price(), Some(dec!(3.0)));
        assert_eq!(s.best_lay_price(), Some(dec!(3.1)));
    }

    #[test]
    fn empty_sides_have_no_best_price() {
        let s = selection(vec![], vec![]);
        assert_eq!(s.best_back_price(), None);
        assert_eq!(s.best_lay_price(), None);
        assert!(s.is_longshot());
    }
}
