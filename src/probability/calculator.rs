//! Probability derivation from two-sided market depth.

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::ProbabilityError;
use crate::market::Selection;
use crate::pricing::{weighted_back_price, weighted_lay_price, PriceLevel, DECIMAL_PLACES};

use super::types::SelectionProbability;

/// Implied win probability from back and lay depth.
///
/// The weighted back and lay prices bracket the fair decimal odds, so
/// `2 / (back + lay)` estimates the fair price's implied probability.
/// Returns `None` when either side has insufficient liquidity to price.
pub fn implied_probability(
    back_levels: &[PriceLevel],
    lay_levels: &[PriceLevel],
) -> Option<Decimal> {
    let back_price = weighted_back_price(back_levels)?;
    let lay_price = weighted_lay_price(lay_levels)?;

    Some((Decimal::TWO / (back_price + lay_price)).round_dp(DECIMAL_PLACES))
}

/// Derive normalized win probabilities for every selection in a market.
///
/// A selection the market cannot price contributes zero probability mass
/// rather than poisoning the sum. The overround (sum of implied
/// probabilities, normally > 1 due to the vig) is divided out so that
/// `market_adjusted` sums to 1 across the market. Output preserves the
/// input selection order.
///
/// Fails with [`ProbabilityError::UnpriceableMarket`] when no selection at
/// all could be priced — normalization would divide by zero.
pub fn compute_market_probabilities(
    selections: &[Selection],
) -> Result<Vec<SelectionProbability>, ProbabilityError> {
    let mut market_overround = Decimal::ZERO;
    let mut implied_by_selection = Vec::with_capacity(selections.len());

    for selection in selections {
        let implied = implied_probability(
            &selection.available_to_back,
            &selection.available_to_lay,
        )
        .unwrap_or(Decimal::ZERO);

        market_overround += implied;
        implied_by_selection.push((selection, implied));
    }

    if market_overround.is_zero() {
        return Err(ProbabilityError::UnpriceableMarket {
            num_selections: selections.len(),
        });
    }

    debug!(%market_overround, num_selections = selections.len(), "normalizing market");

    Ok(implied_by_selection
        .into_iter()
        .map(|(selection, implied)| SelectionProbability {
            selection_id: selection.id,
            name: selection.name.clone(),
            implied,
            market_adjusted: (implied / market_overround).round_dp(DECIMAL_PLACES),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::mock::SelectionBuilder;
    use rust_decimal_macros::dec;

    #[test]
    fn implied_probability_simple() {
        let back = vec![PriceLevel::new(dec!(2.0), dec!(100))];
        let lay = vec![PriceLevel::new(dec!(3.0), dec!(100))];
        assert_eq!(implied_probability(&back, &lay), Some(dec!(0.4)));
    }

    #[test]
    fn implied_probability_uses_best_of_each_side() {
        // Back picks highest (3.0), lay picks lowest (4.0): 2 / 7.
        let back = vec![
            PriceLevel::new(dec!(2.0), dec!(100)),
            PriceLevel::new(dec!(3.0), dec!(200)),
        ];
        let lay = vec![
            PriceLevel::new(dec!(4.0), dec!(50)),
            PriceLevel::new(dec!(5.0), dec!(200)),
        ];
        assert_eq!(implied_probability(&back, &lay), Some(dec!(0.2857)));
    }

    #[test]
    fn implied_probability_missing_side_is_undetermined() {
        let back = vec![PriceLevel::new(dec!(2.0), dec!(100))];
        assert_eq!(implied_probability(&back, &[]), None);
        assert_eq!(implied_probability(&[], &back), None);
        assert_eq!(implied_probability(&[], &[]), None);
    }

    #[test]
    fn market_probabilities_sum_to_one() {
        let selections = vec![
            SelectionBuilder::new(1, "A")
                .back(dec!(2.0), dec!(100))
                .lay(dec!(2.2), dec!(100))
                .build(),
            SelectionBuilder::new(2, "B")
                .back(dec!(3.0), dec!(100))
                .lay(dec!(3.4), dec!(100))
                .build(),
            SelectionBuilder::new(3, "C")
                .back(dec!(6.0), dec!(100))
                .lay(dec!(7.0), dec!(100))
                .build(),
        ];

        let probs = compute_market_probabilities(&selections).unwrap();
        assert_eq!(probs.len(), 3);

        let total: Decimal = probs.iter().map(|p| p.market_adjusted).sum();
        let tolerance = Decimal::new(selections.len() as i64, 4);
        assert!(
            (total - Decimal::ONE).abs() <= tolerance,
            "sum {total} outside tolerance"
        );
    }

    #[test]
    fn unpriceable_selection_contributes_zero() {
        let selections = vec![
            SelectionBuilder::new(1, "Priced")
                .back(dec!(2.0), dec!(100))
                .lay(dec!(2.2), dec!(100))
                .build(),
            // No lay side at all: cannot be priced.
            SelectionBuilder::new(2, "Longshot")
                .back(dec!(900), dec!(5))
                .build(),
        ];

        let probs = compute_market_probabilities(&selections).unwrap();
        assert_eq!(probs[1].implied, Decimal::ZERO);
        assert_eq!(probs[1].market_adjusted, Decimal::ZERO);
        // The priced selection takes the whole normalized mass.
        assert_eq!(probs[0].market_adjusted, Decimal::ONE);
    }

    #[test]
    fn output_preserves_input_order() {
        let selections = vec![
            SelectionBuilder::new(9, "Outsider")
                .back(dec!(10.0), dec!(50))
                .lay(dec!(11.0), dec!(50))
                .build(),
            SelectionBuilder::new(4, "Favorite")
                .back(dec!(1.5), dec!(500))
                .lay(dec!(1.6), dec!(500))
                .build(),
        ];

        let probs = compute_market_probabilities(&selections).unwrap();
        assert_eq!(probs[0].selection_id.0, 9);
        assert_eq!(probs[1].selection_id.0, 4);
        assert!(probs[1].market_adjusted > probs[0].market_adjusted);
    }

    #[test]
    fn fully_unpriceable_market_is_an_error() {
        let selections = vec![
            SelectionBuilder::new(1, "A").back(dec!(2.0), dec!(10)).build(),
            SelectionBuilder::new(2, "B").build(),
        ];

        assert!(matches!(
            compute_market_probabilities(&selections),
            Err(ProbabilityError::UnpriceableMarket { num_selections: 2 })
        ));
    }

    #[test]
    fn empty_market_is_an_error() {
        assert!(matches!(
            compute_market_probabilities(&[]),
            Err(ProbabilityError::UnpriceableMarket { num_selections: 0 })
        ));
    }
}
