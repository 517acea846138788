//! Disposition state machine: `DRAFT -> PENDING_REVIEW -> SENT -> {ACKNOWLEDGED, DISPUTED}`.
//!
//! Every status change is expressed as a [`DispositionPatch`] so stores can validate and apply
//! it against the current record inside one unit of work.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::{
    DeliveryMethod, DepositDisposition, DispositionStatus, InspectionLinks, LeaseDeposit,
    RefundMethod,
};

use DispositionStatus::{Acknowledged, Disputed, Draft, PendingReview, Sent};

/// Raised when a lifecycle step is attempted from an incompatible status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("cannot {action} a disposition in status {from}")]
pub struct InvalidTransition {
    pub action: &'static str,
    pub from: DispositionStatus,
}

/// Changes to the lease record that must land together with a disposition update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseEffect {
    None,
    EndLease,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispositionPatch {
    SubmitForReview,
    Send {
        sent_date: NaiveDate,
        method: DeliveryMethod,
        tracking_number: Option<String>,
    },
    Dispute {
        reason: String,
    },
    ProcessRefund {
        processed_date: NaiveDate,
        method: RefundMethod,
        check_number: Option<String>,
        amount: Decimal,
    },
}

impl DispositionPatch {
    pub const fn action(&self) -> &'static str {
        match self {
            Self::SubmitForReview => "submit for review",
            Self::Send { .. } => "send",
            Self::Dispute { .. } => "dispute",
            Self::ProcessRefund { .. } => "process a refund for",
        }
    }

    /// Statuses a patch may be applied from. Re-sending and refunding before the letter
    /// goes out are both rejected.
    pub const fn permitted_from(&self) -> &'static [DispositionStatus] {
        match self {
            Self::SubmitForReview => &[Draft],
            Self::Send { .. } => &[Draft, PendingReview],
            Self::Dispute { .. } => &[Sent],
            Self::ProcessRefund { .. } => &[Sent, Disputed],
        }
    }

    pub const fn target(&self) -> DispositionStatus {
        match self {
            Self::SubmitForReview => PendingReview,
            Self::Send { .. } => Sent,
            Self::Dispute { .. } => Disputed,
            Self::ProcessRefund { .. } => Acknowledged,
        }
    }

    pub const fn lease_effect(&self) -> LeaseEffect {
        match self {
            Self::ProcessRefund { .. } => LeaseEffect::EndLease,
            _ => LeaseEffect::None,
        }
    }
}

/// Rejection used by stores when derived totals may not be recomputed or damage edited.
pub(crate) fn ensure_recalculable(status: DispositionStatus) -> Result<(), InvalidTransition> {
    if status.is_terminal() {
        return Err(InvalidTransition {
            action: "recalculate",
            from: status,
        });
    }
    Ok(())
}

pub(crate) fn ensure_damage_editable(status: DispositionStatus) -> Result<(), InvalidTransition> {
    if !status.allows_damage_edits() {
        return Err(InvalidTransition {
            action: "edit damage items on",
            from: status,
        });
    }
    Ok(())
}

impl DepositDisposition {
    /// A fresh DRAFT record. Derived totals start at zero deductions with the full
    /// deposit plus interest refundable; stores recalculate before persisting.
    pub fn draft(
        deposit: &LeaseDeposit,
        move_out_date: NaiveDate,
        deadline_date: NaiveDate,
        interest_accrued: Decimal,
        inspections: InspectionLinks,
        notes: Option<String>,
    ) -> Self {
        Self {
            lease_id: deposit.lease_id.clone(),
            move_out_date,
            deadline_date,
            original_deposit: deposit.amount,
            interest_accrued,
            total_deductions: Decimal::ZERO,
            refund_amount: deposit.amount + interest_accrued,
            itemized_deductions: Vec::new(),
            move_in_inspection_id: inspections.move_in,
            move_out_inspection_id: inspections.move_out,
            bank_name: deposit.bank_name.clone(),
            account_last4: deposit.account_last4.clone(),
            notes,
            sent_date: None,
            sent_method: None,
            tracking_number: None,
            dispute_reason: None,
            refund_processed_date: None,
            refund_method: None,
            refund_check_number: None,
            status: Draft,
        }
    }

    pub fn can_apply(&self, patch: &DispositionPatch) -> bool {
        patch.permitted_from().contains(&self.status)
    }

    /// Validate `patch` against the current status and apply it.
    pub fn apply_patch(
        &mut self,
        patch: DispositionPatch,
    ) -> Result<LeaseEffect, InvalidTransition> {
        if !self.can_apply(&patch) {
            return Err(InvalidTransition {
                action: patch.action(),
                from: self.status,
            });
        }

        let effect = patch.lease_effect();
        self.status = patch.target();

        match patch {
            DispositionPatch::SubmitForReview => {}
            DispositionPatch::Send {
                sent_date,
                method,
                tracking_number,
            } => {
                self.sent_date = Some(sent_date);
                self.sent_method = Some(method);
                self.tracking_number = tracking_number;
            }
            DispositionPatch::Dispute { reason } => {
                self.dispute_reason = Some(reason);
            }
            DispositionPatch::ProcessRefund {
                processed_date,
                method,
                check_number,
                amount,
            } => {
                self.refund_processed_date = Some(processed_date);
                self.refund_method = Some(method);
                self.refund_check_number = check_number;
                // Manual true-up: the paid figure replaces the calculated one.
                self.refund_amount = amount;
            }
        }

        Ok(effect)
    }
}
