//! Cent-exact money arithmetic
//!
//! Amounts are `rust_decimal::Decimal` values. Every accumulation step works on
//! values rounded to the currency's minor unit, so partial sums never carry
//! sub-cent residue and the order of summation does not affect the result.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places in the currency's minor unit
pub const CENT_PLACES: u32 = 2;

/// Round an amount to whole cents (half away from zero)
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CENT_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Add two amounts at cent granularity
///
/// Both operands are rounded to cents before the (exact) decimal addition, so the
/// result is always a cent value.
pub fn sum(a: Decimal, b: Decimal) -> Decimal {
    round_cents(a) + round_cents(b)
}

/// Sum any number of amounts at cent granularity
pub fn sum_all<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().fold(Decimal::ZERO, sum)
}
