//! Price level types and depth-weighted average calculations.

pub mod aggregator;
pub mod types;

pub use aggregator::{weighted_average, weighted_back_price, weighted_lay_price};
pub use types::PriceLevel;

/// Decimal places used for all published prices and probabilities.
///
/// Intermediate arithmetic is never rounded; only values crossing a module
/// boundary are quantized to this scale.
pub const DECIMAL_PLACES: u32 = 4;
