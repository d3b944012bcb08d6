//! Size-weighted average prices over order book depth.

use rust_decimal::Decimal;

use super::types::PriceLevel;
use super::DECIMAL_PLACES;

/// Calculate the size-weighted average price of the given levels.
///
/// Walks `levels` in the order given, consuming at most `max_size` units of
/// depth in total. Returns `None` when less than `min_size` depth could be
/// accumulated — the side cannot be priced and callers must special-case it.
///
/// The caller is responsible for pre-sorting `levels` best-first for the
/// side being priced; see [`weighted_back_price`] and [`weighted_lay_price`].
pub fn weighted_average(
    levels: &[PriceLevel],
    min_size: Decimal,
    max_size: Decimal,
) -> Option<Decimal> {
    let mut total_size = Decimal::ZERO;
    let mut weighted_sum = Decimal::ZERO;

    for level in levels {
        let size_to_add = (max_size - total_size).min(level.size);
        if size_to_add <= Decimal::ZERO {
            break;
        }

        total_size += size_to_add;
        weighted_sum += size_to_add * level.price;
    }

    if total_size < min_size {
        return None;
    }

    Some((weighted_sum / total_size).round_dp(DECIMAL_PLACES))
}

/// Weighted average back price over the single best-priced unit of depth.
///
/// The best back price is the highest on offer, so levels are sorted by
/// price descending before averaging.
pub fn weighted_back_price(levels: &[PriceLevel]) -> Option<Decimal> {
    let mut sorted = levels.to_vec();
    sorted.sort_by(|a, b| b.price.cmp(&a.price));
    weighted_average(&sorted, Decimal::ONE, Decimal::ONE)
}

/// Weighted average lay price over the single best-priced unit of depth.
///
/// The best lay price is the lowest on offer, so levels are sorted by
/// price ascending before averaging.
pub fn weighted_lay_price(levels: &[PriceLevel]) -> Option<Decimal> {
    let mut sorted = levels.to_vec();
    sorted.sort_by(|a, b| a.price.cmp(&b.price));
    weighted_average(&sorted, Decimal::ONE, Decimal::ONE)
}
