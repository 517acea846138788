use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::DepositDisposition;

const MINNESOTA_RETURN_DEADLINE_DAYS: u32 = 21;
const MINNESOTA_INTEREST_RATE_BASIS_POINTS: i64 = 100;
const SIMPLE_INTEREST_DAY_BASIS: u32 = 365;
const DEFAULT_DUE_SOON_DAYS: u32 = 5;

/// Deposit facts a disposition letter must disclose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisclosureField {
    BankName,
    AccountLast4,
}

impl DisclosureField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::BankName => "Depository bank",
            Self::AccountLast4 => "Account (last 4)",
        }
    }

    pub fn value_in(self, disposition: &DepositDisposition) -> Option<&str> {
        let value = match self {
            Self::BankName => disposition.bank_name.as_deref(),
            Self::AccountLast4 => disposition.account_last4.as_deref(),
        };
        value.filter(|value| !value.trim().is_empty())
    }
}

/// Statutory dials for a deposit-return regime ("N days, simple interest, itemized deductions").
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JurisdictionPolicy {
    pub jurisdiction: String,
    pub return_deadline_days: u32,
    pub default_interest_rate: Decimal,
    /// Fixed denominator for day-count interest.
    pub interest_day_basis: u32,
    pub due_soon_days: u32,
    pub disclosure_fields: Vec<DisclosureField>,
}

impl JurisdictionPolicy {
    /// Minn. Stat. 504B.178: 21 days after termination, 1% simple interest.
    pub fn minnesota() -> Self {
        Self {
            jurisdiction: "Minnesota (Minn. Stat. 504B.178)".to_string(),
            return_deadline_days: MINNESOTA_RETURN_DEADLINE_DAYS,
            default_interest_rate: Decimal::new(MINNESOTA_INTEREST_RATE_BASIS_POINTS, 4),
            interest_day_basis: SIMPLE_INTEREST_DAY_BASIS,
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
            disclosure_fields: vec![DisclosureField::BankName, DisclosureField::AccountLast4],
        }
    }

    pub fn missing_disclosures(&self, disposition: &DepositDisposition) -> Vec<DisclosureField> {
        self.disclosure_fields
            .iter()
            .copied()
            .filter(|field| field.value_in(disposition).is_none())
            .collect()
    }
}

impl Default for JurisdictionPolicy {
    fn default() -> Self {
        Self::minnesota()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn minnesota_defaults_match_statute() {
        let policy = JurisdictionPolicy::minnesota();
        assert_eq!(policy.return_deadline_days, 21);
        assert_eq!(policy.default_interest_rate, dec!(0.01));
        assert_eq!(policy.interest_day_basis, 365);
        assert_eq!(policy, JurisdictionPolicy::default());
    }
}
