//! Move-out security-deposit disposition: damage itemization, refund calculation, statutory
//! deadline tracking and the letter lifecycle.

pub mod calculator;
pub mod classification;
pub mod clock;
pub mod comparison;
pub mod deadline;
pub mod domain;
pub mod lifecycle;
pub mod memory;
pub mod money;
pub mod policy;
pub mod repository;
pub mod router;
pub mod service;
pub mod statement;

#[cfg(test)]
mod tests;

pub use calculator::{DepositBasis, DispositionCalculation, DispositionCalculator};
pub use classification::{classify, is_deductible, DamageClassification, ExclusionReason};
pub use clock::{Clock, FixedClock, SystemClock};
pub use comparison::{compare_inspections, ComparisonRow, ComparisonSummary, InspectionComparison};
pub use deadline::{DeadlineStatus, DeadlineTracker, DeadlineUrgency};
pub use domain::{
    DamageItem, DamageItemDraft, DamageItemId, DeliveryMethod, DepositDisposition,
    DispositionError, DispositionStatus, ErrorKind, InspectionId, InspectionItem, InspectionKind,
    InspectionLinks, ItemCondition, ItemizedDeduction, LeaseDeposit, LeaseId, RefundMethod,
};
pub use lifecycle::{DispositionPatch, InvalidTransition, LeaseEffect};
pub use memory::{InMemoryDispositionStore, LeaseRecord};
pub use money::{
    checked_sum, days_between, round_currency, CurrencyOverflow, CURRENCY_SCALE, MAX_CURRENCY_UNITS,
};
pub use policy::{DisclosureField, JurisdictionPolicy};
pub use repository::{DamageChangeOutcome, DamageItemChange, DispositionStore, StoreError};
pub use router::disposition_router;
pub use service::DispositionService;
pub use statement::{DisclosureLine, DispositionStatement, StatementLine};
