use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Amounts are stored as integer millionths of the currency unit, which keeps
/// the six decimal places of the ledger exact. 12.5 USD = 12_500_000.
pub type MicroUnits = i64;

/// Decimal places carried by [`MicroUnits`].
pub const AMOUNT_SCALE: u32 = 6;

const UNITS_PER_WHOLE: i64 = 1_000_000;

/// Convert stored micro-units to a decimal amount with trailing zeros removed.
pub fn from_micro_units(units: MicroUnits) -> Decimal {
    Decimal::new(units, AMOUNT_SCALE).normalize()
}

/// Convert a decimal amount to micro-units. Returns None when the amount has
/// more than six decimal places or does not fit.
pub fn to_micro_units(amount: Decimal) -> Option<MicroUnits> {
    let scaled = amount.checked_mul(Decimal::from(UNITS_PER_WHOLE))?;
    if scaled.fract() != Decimal::ZERO {
        return None;
    }
    scaled.to_i64()
}
