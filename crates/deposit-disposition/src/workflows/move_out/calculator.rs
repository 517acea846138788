use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::classification::classify;
use super::domain::{DamageItem, DepositDisposition, ItemizedDeduction};
use super::money::{checked_sum, round_currency, CurrencyOverflow};

/// Deposit side of the calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositBasis {
    pub amount: Decimal,
    pub interest_accrued: Decimal,
}

impl DepositBasis {
    pub fn of(disposition: &DepositDisposition) -> Self {
        Self {
            amount: disposition.original_deposit,
            interest_accrued: disposition.interest_accrued,
        }
    }

    pub fn total(&self) -> Result<Decimal, CurrencyOverflow> {
        self.amount
            .checked_add(self.interest_accrued)
            .ok_or(CurrencyOverflow {
                field: "deposit_total",
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispositionCalculation {
    pub total_deductions: Decimal,
    pub refund_amount: Decimal,
    /// Deductions left uncovered by deposit plus interest; collection is the caller's concern.
    pub shortfall: Decimal,
    pub itemized_deductions: Vec<ItemizedDeduction>,
}

impl DispositionCalculation {
    pub fn requires_additional_collection(&self) -> bool {
        self.shortfall > Decimal::ZERO
    }
}

/// Pure deposit + interest - deductions arithmetic.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispositionCalculator;

impl DispositionCalculator {
    /// Lines are rounded to cents first so the itemization always sums to the total.
    pub fn calculate(
        &self,
        basis: DepositBasis,
        items: &[DamageItem],
    ) -> Result<DispositionCalculation, CurrencyOverflow> {
        let groups = classify(items);

        let itemized_deductions: Vec<ItemizedDeduction> = groups
            .deductible
            .iter()
            .map(|item| ItemizedDeduction {
                description: item.description.clone(),
                location: item.location.clone(),
                amount: round_currency(item.repair_cost),
                notes: item.notes.clone(),
            })
            .collect();

        let total_deductions = checked_sum(
            "total_deductions",
            itemized_deductions.iter().map(|line| line.amount),
        )?;

        let balance = basis
            .total()?
            .checked_sub(total_deductions)
            .ok_or(CurrencyOverflow {
                field: "refund_amount",
            })?;
        let refund_amount = round_currency(balance.max(Decimal::ZERO));
        let shortfall = round_currency((-balance).max(Decimal::ZERO));

        Ok(DispositionCalculation {
            total_deductions,
            refund_amount,
            shortfall,
            itemized_deductions,
        })
    }

    /// Recompute the derived fields of `disposition` from `items`.
    ///
    /// This is the only place derived totals are written; stores call it inside the same
    /// unit of work that changed the damage items. On overflow `disposition` is left as it was.
    pub fn recalculate(
        &self,
        disposition: &mut DepositDisposition,
        items: &[DamageItem],
    ) -> Result<DispositionCalculation, CurrencyOverflow> {
        let calculation = self.calculate(DepositBasis::of(disposition), items)?;

        disposition.total_deductions = calculation.total_deductions;
        disposition.refund_amount = calculation.refund_amount;
        disposition.itemized_deductions = calculation.itemized_deductions.clone();

        debug!(
            lease_id = %disposition.lease_id,
            total_deductions = %calculation.total_deductions,
            refund_amount = %calculation.refund_amount,
            line_items = calculation.itemized_deductions.len(),
            "disposition recalculated"
        );

        Ok(calculation)
    }
}
