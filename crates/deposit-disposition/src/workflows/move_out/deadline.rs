use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::{DepositDisposition, DispositionError};
use super::money::{
    days_between, ensure_currency, ensure_non_negative, round_currency, CurrencyOverflow,
};
use super::policy::JurisdictionPolicy;

/// True while the letter is unsent and the statutory deadline has passed.
///
/// Sending clears the flag for good, however late it happens.
pub fn is_overdue(deadline: NaiveDate, sent_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    sent_date.is_none() && today > deadline
}

/// Days left before the deadline; negative once it has passed.
pub fn days_until_deadline(deadline: NaiveDate, today: NaiveDate) -> i64 {
    days_between(today, deadline)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineUrgency {
    Sent,
    OnTrack,
    DueSoon,
    Overdue,
}

impl DeadlineUrgency {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sent => "Letter Sent",
            Self::OnTrack => "On Track",
            Self::DueSoon => "Due Soon",
            Self::Overdue => "Overdue",
        }
    }
}

/// Read-only deadline snapshot for a disposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadlineStatus {
    pub deadline_date: NaiveDate,
    pub days_until_deadline: i64,
    pub is_overdue: bool,
    pub sent_date: Option<NaiveDate>,
    pub urgency: DeadlineUrgency,
    pub urgency_label: &'static str,
}

/// Deadline derivation and day-count interest for one jurisdiction.
#[derive(Debug, Clone, Copy)]
pub struct DeadlineTracker {
    return_deadline_days: u32,
    interest_day_basis: u32,
    due_soon_days: u32,
}

impl DeadlineTracker {
    pub fn new(policy: &JurisdictionPolicy) -> Self {
        Self {
            return_deadline_days: policy.return_deadline_days,
            interest_day_basis: policy.interest_day_basis.max(1),
            due_soon_days: policy.due_soon_days,
        }
    }

    pub fn deadline_date(&self, move_out_date: NaiveDate) -> Result<NaiveDate, DispositionError> {
        move_out_date
            .checked_add_signed(Duration::days(i64::from(self.return_deadline_days)))
            .ok_or_else(|| DispositionError::Validation {
                field: "move_out_date",
                reason: format!("{move_out_date} leaves no representable return deadline"),
            })
    }

    /// Simple interest: `amount * rate * days_held / basis`, rounded to cents once.
    pub fn deposit_interest(
        &self,
        amount: Decimal,
        deposit_date: NaiveDate,
        move_out_date: NaiveDate,
        rate: Decimal,
    ) -> Result<Decimal, DispositionError> {
        ensure_currency("deposit_amount", amount)?;
        ensure_non_negative("interest_rate", rate)?;

        let days_held = days_between(deposit_date, move_out_date);
        if days_held < 0 {
            return Err(DispositionError::Validation {
                field: "move_out_date",
                reason: format!(
                    "move-out date {move_out_date} precedes deposit date {deposit_date}"
                ),
            });
        }

        let accrued = amount
            .checked_mul(rate)
            .and_then(|value| value.checked_mul(Decimal::from(days_held)))
            .and_then(|value| value.checked_div(Decimal::from(self.interest_day_basis)))
            .ok_or(CurrencyOverflow {
                field: "interest_accrued",
            })?;
        Ok(round_currency(accrued))
    }

    pub fn status(&self, disposition: &DepositDisposition, today: NaiveDate) -> DeadlineStatus {
        self.status_for(disposition.deadline_date, disposition.sent_date, today)
    }

    pub fn status_for(
        &self,
        deadline: NaiveDate,
        sent_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> DeadlineStatus {
        let days = days_until_deadline(deadline, today);
        let overdue = is_overdue(deadline, sent_date, today);

        let urgency = if sent_date.is_some() {
            DeadlineUrgency::Sent
        } else if overdue {
            DeadlineUrgency::Overdue
        } else if days <= i64::from(self.due_soon_days) {
            DeadlineUrgency::DueSoon
        } else {
            DeadlineUrgency::OnTrack
        };

        DeadlineStatus {
            deadline_date: deadline,
            days_until_deadline: days,
            is_overdue: overdue,
            sent_date,
            urgency,
            urgency_label: urgency.label(),
        }
    }
}

impl Default for DeadlineTracker {
    fn default() -> Self {
        Self::new(&JurisdictionPolicy::default())
    }
}
