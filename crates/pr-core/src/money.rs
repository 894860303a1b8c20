use rust_decimal::{Decimal, RoundingStrategy};

/// Fractional digits of every externally visible monetary figure.
pub const MONEY_SCALE: u32 = 2;

/// Rounds half-up (away from zero) to two fractional digits and pins the
/// scale so `30` renders as `30.00`.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}
