use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::calculator::{DepositBasis, DispositionCalculator};
use super::classification::{classify, ExclusionReason};
use super::deadline::{DeadlineStatus, DeadlineTracker};
use super::domain::{DamageItem, DepositDisposition, DispositionStatus, LeaseId};
use super::money::CurrencyOverflow;
use super::policy::{DisclosureField, JurisdictionPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementLine {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Present on lines shown as "not deducted".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_because: Option<&'static str>,
}

impl StatementLine {
    fn from_item(item: &DamageItem) -> Self {
        Self {
            description: item.description.clone(),
            location: item.location.clone(),
            amount: item.repair_cost,
            notes: item.notes.clone(),
            excluded_because: ExclusionReason::for_item(item).map(ExclusionReason::label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisclosureLine {
    pub field: DisclosureField,
    pub label: &'static str,
    pub value: String,
}

/// Everything the itemized disposition letter presents to the tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispositionStatement {
    pub lease_id: LeaseId,
    pub jurisdiction: String,
    pub status: DispositionStatus,
    pub status_label: &'static str,
    pub move_out_date: NaiveDate,
    pub deadline: DeadlineStatus,
    pub original_deposit: Decimal,
    pub interest_accrued: Decimal,
    pub total_deductions: Decimal,
    pub refund_amount: Decimal,
    /// Set when deductions exceed deposit plus interest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_collection: Option<Decimal>,
    pub deducted: Vec<StatementLine>,
    pub not_deducted: Vec<StatementLine>,
    pub disclosures: Vec<DisclosureLine>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_disclosures: Vec<DisclosureField>,
}

impl DispositionStatement {
    /// Totals come from the stored record; the damage items supply the line detail and
    /// the shortfall figure.
    pub fn build(
        disposition: &DepositDisposition,
        items: &[DamageItem],
        policy: &JurisdictionPolicy,
        tracker: &DeadlineTracker,
        calculator: &DispositionCalculator,
        today: NaiveDate,
    ) -> Result<Self, CurrencyOverflow> {
        let groups = classify(items);
        let calculation = calculator.calculate(DepositBasis::of(disposition), items)?;

        let disclosures = policy
            .disclosure_fields
            .iter()
            .filter_map(|field| {
                field.value_in(disposition).map(|value| DisclosureLine {
                    field: *field,
                    label: field.label(),
                    value: value.to_string(),
                })
            })
            .collect();

        Ok(Self {
            lease_id: disposition.lease_id.clone(),
            jurisdiction: policy.jurisdiction.clone(),
            status: disposition.status,
            status_label: disposition.status.label(),
            move_out_date: disposition.move_out_date,
            deadline: tracker.status(disposition, today),
            original_deposit: disposition.original_deposit,
            interest_accrued: disposition.interest_accrued,
            total_deductions: disposition.total_deductions,
            refund_amount: disposition.refund_amount,
            additional_collection: calculation
                .requires_additional_collection()
                .then_some(calculation.shortfall),
            deducted: groups
                .deductible
                .iter()
                .map(|item| StatementLine::from_item(item))
                .collect(),
            not_deducted: groups
                .non_deductible
                .iter()
                .map(|item| StatementLine::from_item(item))
                .collect(),
            disclosures,
            missing_disclosures: policy.missing_disclosures(disposition),
        })
    }
}
