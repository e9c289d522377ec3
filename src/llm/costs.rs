//! Per-token pricing for hosted models.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Look up (input, output) cost per token for a model.
///
/// Matches on model-name prefixes; unknown models cost nothing.
pub fn model_cost(model: &str) -> (Decimal, Decimal) {
    // Prices are USD per million tokens.
    let per_million = if model.starts_with("claude-3-5-haiku") || model.starts_with("claude-haiku")
    {
        (dec!(0.80), dec!(4))
    } else if model.starts_with("claude-opus") || model.starts_with("claude-3-opus") {
        (dec!(15), dec!(75))
    } else if model.starts_with("claude") {
        (dec!(3), dec!(15))
    } else if model.starts_with("gpt-4o-mini") {
        (dec!(0.15), dec!(0.60))
    } else if model.starts_with("gpt-4o") {
        (dec!(2.50), dec!(10))
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    let million = dec!(1000000);
    (per_million.0 / million, per_million.1 / million)
}
