use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use super::domain::DispositionError;

/// Currency precision carried by every derived monetary figure.
pub const CURRENCY_SCALE: u32 = 2;

/// Largest single amount (deposit or repair cost) the engine accepts, in whole dollars.
pub const MAX_CURRENCY_UNITS: u64 = 1_000_000_000;

/// A currency sum or product left the representable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{field} exceeds the supported currency range")]
pub struct CurrencyOverflow {
    pub field: &'static str,
}

/// Round to cents, half away from zero.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Whole days from `from` to `to`; negative when `to` precedes `from`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Sum `amounts`, failing instead of panicking when the total overflows.
pub fn checked_sum<I>(field: &'static str, amounts: I) -> Result<Decimal, CurrencyOverflow>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
        .ok_or(CurrencyOverflow { field })
}

pub(crate) fn ensure_non_negative(
    field: &'static str,
    amount: Decimal,
) -> Result<Decimal, DispositionError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DispositionError::Validation {
            field,
            reason: format!("must not be negative (found {amount})"),
        });
    }
    Ok(amount)
}

/// Non-negative, whole cents and no larger than [`MAX_CURRENCY_UNITS`].
pub(crate) fn ensure_currency(
    field: &'static str,
    amount: Decimal,
) -> Result<Decimal, DispositionError> {
    ensure_non_negative(field, amount)?;
    if amount.normalize().scale() > CURRENCY_SCALE {
        return Err(DispositionError::Validation {
            field,
            reason: format!("must be whole cents (found {amount})"),
        });
    }
    if amount > Decimal::from(MAX_CURRENCY_UNITS) {
        return Err(DispositionError::Validation {
            field,
            reason: format!("must not exceed {MAX_CURRENCY_UNITS} (found {amount})"),
        });
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn rounds_midpoints_away_from_zero() {
        assert_eq!(round_currency(dec!(5.985)), dec!(5.99));
        assert_eq!(round_currency(dec!(5.984)), dec!(5.98));
        assert_eq!(round_currency(dec!(-2.005)), dec!(-2.01));
        assert_eq!(round_currency(dec!(12)), dec!(12.00));
    }

    #[test]
    fn days_between_is_signed() {
        assert_eq!(days_between(date(2024, 1, 1), date(2025, 1, 1)), 366);
        assert_eq!(days_between(date(2025, 1, 31), date(2025, 1, 10)), -21);
        assert_eq!(days_between(date(2025, 1, 10), date(2025, 1, 10)), 0);
    }

    #[test]
    fn negative_amounts_fail_validation() {
        assert!(ensure_non_negative("repair_cost", dec!(0)).is_ok());
        assert!(ensure_non_negative("repair_cost", dec!(-0.00)).is_ok());
        match ensure_non_negative("repair_cost", dec!(-1.50)) {
            Err(DispositionError::Validation { field, .. }) => assert_eq!(field, "repair_cost"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn currency_amounts_are_whole_cents_within_range() {
        assert_eq!(ensure_currency("repair_cost", dec!(19.990)).ok(), Some(dec!(19.990)));
        assert!(ensure_currency("repair_cost", dec!(1000000000)).is_ok());

        for rejected in [dec!(0.004), dec!(1000000000.01), dec!(50000000000000000000000000000)] {
            match ensure_currency("repair_cost", rejected) {
                Err(DispositionError::Validation { field, .. }) => assert_eq!(field, "repair_cost"),
                other => panic!("expected validation error for {rejected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn checked_sum_reports_overflow() {
        assert_eq!(checked_sum("total", [dec!(1.10), dec!(2.20)]), Ok(dec!(3.30)));
        assert_eq!(
            checked_sum("total", [Decimal::MAX, dec!(1)]),
            Err(CurrencyOverflow { field: "total" })
        );
    }
}
