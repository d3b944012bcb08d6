//! Order book price level types.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MarketError;

/// Lowest decimal odds the exchange publishes.
static MIN_PRICE: Lazy<Decimal> = Lazy::new(|| Decimal::ONE);

/// Highest decimal odds the exchange publishes.
static MAX_PRICE: Lazy<Decimal> = Lazy::new(|| Decimal::new(1000, 0));

/// Largest per-level size the exchange publishes.
static MAX_SIZE: Lazy<Decimal> = Lazy::new(|| Decimal::new(1000, 0));

/// Single price level on one side of an order book.
///
/// `price` is decimal odds; `size` is the stake available at that price.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceLevel {
    /// Decimal odds at this level.
    pub price: Decimal,
    /// Total size available at this price.
    pub size: Decimal,
}

impl PriceLevel {
    /// Create a new price level.
    pub fn new(price: Decimal, size: Decimal) -> Self {
        Self { price, size }
    }

    /// Create a price level, rejecting values outside the exchange's
    /// published bounds (odds in [1, 1000], size in [0, 1000]).
    pub fn validated(price: Decimal, size: Decimal) -> Result<Self, MarketError> {
        let level = Self { price, size };
        if !level.is_within_exchange_bounds() {
            return Err(MarketError::ParseError(format!(
                "price level out of bounds: price={price} size={size}"
            )));
        }
        Ok(level)
    }

    /// Check the level against the exchange's published bounds.
    pub fn is_within_exchange_bounds(&self) -> bool {
        self.price >= *MIN_PRICE
            && self.price <= *MAX_PRICE
            && self.size >= Decimal::ZERO
            && self.size <= *MAX_SIZE
    }
}
