use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::lifecycle::InvalidTransition;
use super::money::{ensure_currency, CurrencyOverflow};
use super::repository::StoreError;

/// Identifier wrapper for leases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeaseId(pub String);

/// Identifier wrapper for move-in and move-out inspections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InspectionId(pub String);

/// Identifier wrapper for damage findings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DamageItemId(pub String);

impl fmt::Display for LeaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for InspectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DamageItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deposit terms recorded on the lease. Read-only for the disposition engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseDeposit {
    pub lease_id: LeaseId,
    pub amount: Decimal,
    pub lease_start: NaiveDate,
    #[serde(default)]
    pub paid_on: Option<NaiveDate>,
    /// Annual simple rate; the jurisdiction default applies when unset.
    #[serde(default)]
    pub interest_rate: Option<Decimal>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub account_last4: Option<String>,
}

impl LeaseDeposit {
    /// Date interest starts accruing: the recorded payment date, else lease start.
    pub fn deposit_date(&self) -> NaiveDate {
        self.paid_on.unwrap_or(self.lease_start)
    }
}

/// A damage finding captured on a move-out inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageItem {
    pub id: DamageItemId,
    pub inspection_id: InspectionId,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    pub repair_cost: Decimal,
    #[serde(default)]
    pub is_normal_wear: bool,
    #[serde(default)]
    pub is_pre_existing: bool,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Matching move-in condition record, informational only.
    #[serde(default)]
    pub move_in_item_id: Option<String>,
}

/// Caller-supplied fields for creating or replacing a damage item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageItemDraft {
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    pub repair_cost: Decimal,
    #[serde(default)]
    pub is_normal_wear: bool,
    #[serde(default)]
    pub is_pre_existing: bool,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub move_in_item_id: Option<String>,
}

impl DamageItemDraft {
    pub fn validate(&self) -> Result<(), DispositionError> {
        if self.description.trim().is_empty() {
            return Err(DispositionError::Validation {
                field: "description",
                reason: "must not be blank".to_string(),
            });
        }
        ensure_currency("repair_cost", self.repair_cost)?;
        Ok(())
    }

    pub fn into_item(self, id: DamageItemId, inspection_id: InspectionId) -> DamageItem {
        DamageItem {
            id,
            inspection_id,
            description: self.description.trim().to_string(),
            location: self.location,
            repair_cost: self.repair_cost,
            is_normal_wear: self.is_normal_wear,
            is_pre_existing: self.is_pre_existing,
            photo_urls: self.photo_urls,
            notes: self.notes,
            move_in_item_id: self.move_in_item_id,
        }
    }
}

/// One line of the compliance-facing itemization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedDeduction {
    pub description: String,
    pub location: Option<String>,
    pub amount: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispositionStatus {
    Draft,
    PendingReview,
    Sent,
    Acknowledged,
    Disputed,
}

impl DispositionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::PendingReview => "Pending Review",
            Self::Sent => "Sent",
            Self::Acknowledged => "Acknowledged",
            Self::Disputed => "Disputed",
        }
    }

    /// No further recalculation or transitions happen once a refund is processed.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Acknowledged)
    }

    pub const fn allows_damage_edits(self) -> bool {
        matches!(self, Self::Draft | Self::PendingReview)
    }
}

impl fmt::Display for DispositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::Draft => "DRAFT",
            Self::PendingReview => "PENDING_REVIEW",
            Self::Sent => "SENT",
            Self::Acknowledged => "ACKNOWLEDGED",
            Self::Disputed => "DISPUTED",
        };
        f.write_str(code)
    }
}

/// How the disposition letter reached the tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    FirstClassMail,
    CertifiedMail,
    HandDelivered,
    Email,
}

impl DeliveryMethod {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstClassMail => "First-Class Mail",
            Self::CertifiedMail => "Certified Mail",
            Self::HandDelivered => "Hand Delivered",
            Self::Email => "Email",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundMethod {
    Check,
    Ach,
    MoneyOrder,
    Cash,
}

impl RefundMethod {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Check => "Check",
            Self::Ach => "ACH Transfer",
            Self::MoneyOrder => "Money Order",
            Self::Cash => "Cash",
        }
    }
}

/// The recorded outcome of returning or withholding a tenant's deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositDisposition {
    pub lease_id: LeaseId,
    pub move_out_date: NaiveDate,
    pub deadline_date: NaiveDate,
    pub original_deposit: Decimal,
    pub interest_accrued: Decimal,
    pub total_deductions: Decimal,
    pub refund_amount: Decimal,
    pub itemized_deductions: Vec<ItemizedDeduction>,
    pub move_in_inspection_id: Option<InspectionId>,
    pub move_out_inspection_id: Option<InspectionId>,
    pub bank_name: Option<String>,
    pub account_last4: Option<String>,
    pub notes: Option<String>,
    pub sent_date: Option<NaiveDate>,
    pub sent_method: Option<DeliveryMethod>,
    pub tracking_number: Option<String>,
    pub dispute_reason: Option<String>,
    pub refund_processed_date: Option<NaiveDate>,
    pub refund_method: Option<RefundMethod>,
    pub refund_check_number: Option<String>,
    pub status: DispositionStatus,
}

/// Which inspection a snapshot was captured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionKind {
    MoveIn,
    MoveOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemCondition {
    Excellent,
    Good,
    Fair,
    Poor,
    Damaged,
    Missing,
}

/// A single (room, item) observation from an inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionItem {
    pub room: String,
    pub item: String,
    pub condition: ItemCondition,
    #[serde(default)]
    pub has_damage: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Inspection ids known for a lease.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionLinks {
    pub move_in: Option<InspectionId>,
    pub move_out: Option<InspectionId>,
}

/// Coarse classification callers use to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    InvalidTransition,
    Store,
}

#[derive(Debug, thiserror::Error)]
pub enum DispositionError {
    #[error("lease {0} not found")]
    LeaseNotFound(LeaseId),
    #[error("no disposition exists for lease {0}")]
    DispositionNotFound(LeaseId),
    #[error("damage item {0} not found")]
    DamageItemNotFound(DamageItemId),
    #[error("disposition already initiated for lease {0}")]
    AlreadyInitiated(LeaseId),
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DispositionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LeaseNotFound(_) | Self::DispositionNotFound(_) | Self::DamageItemNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::AlreadyInitiated(_) => ErrorKind::Conflict,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::InvalidTransition(_) => ErrorKind::InvalidTransition,
            Self::Store(StoreError::NotFound) => ErrorKind::NotFound,
            Self::Store(StoreError::Conflict) => ErrorKind::Conflict,
            Self::Store(StoreError::Rejected(_)) => ErrorKind::InvalidTransition,
            Self::Store(StoreError::Overflow(_)) => ErrorKind::Validation,
            Self::Store(StoreError::Unavailable(_)) => ErrorKind::Store,
        }
    }
}

impl From<CurrencyOverflow> for DispositionError {
    fn from(value: CurrencyOverflow) -> Self {
        Self::Validation {
            field: value.field,
            reason: "exceeds the supported currency range".to_string(),
        }
    }
}
