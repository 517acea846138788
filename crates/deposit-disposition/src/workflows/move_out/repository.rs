use async_trait::async_trait;

use super::calculator::DispositionCalculator;
use super::domain::{
    DamageItem, DamageItemId, DepositDisposition, InspectionId, InspectionItem, InspectionKind,
    InspectionLinks, LeaseDeposit, LeaseId,
};
use super::lifecycle::{DispositionPatch, InvalidTransition};
use super::money::CurrencyOverflow;

/// A damage-item mutation routed through the store together with recalculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DamageItemChange {
    Create(DamageItem),
    Update(DamageItem),
    Delete {
        inspection_id: InspectionId,
        item_id: DamageItemId,
    },
}

impl DamageItemChange {
    pub fn inspection_id(&self) -> &InspectionId {
        match self {
            Self::Create(item) | Self::Update(item) => &item.inspection_id,
            Self::Delete { inspection_id, .. } => inspection_id,
        }
    }

    pub fn item_id(&self) -> &DamageItemId {
        match self {
            Self::Create(item) | Self::Update(item) => &item.id,
            Self::Delete { item_id, .. } => item_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageChangeOutcome {
    /// The created, updated or removed item.
    pub item: DamageItem,
    /// The owning disposition after recalculation, when the inspection has one.
    pub disposition: Option<DepositDisposition>,
}

/// Persistence boundary for the disposition engine.
///
/// Implementations must make `create_disposition`, `update_disposition`,
/// `recalculate_disposition` and `apply_damage_change` each a single transaction: concurrent
/// damage changes under the same disposition serialize, and recalculation always reads a
/// consistent damage-item set. Derived totals are only ever written through
/// [`DispositionCalculator::recalculate`].
#[async_trait]
pub trait DispositionStore: Send + Sync {
    async fn lease_deposit(&self, lease_id: &LeaseId) -> Result<Option<LeaseDeposit>, StoreError>;

    async fn inspection_links(&self, lease_id: &LeaseId) -> Result<InspectionLinks, StoreError>;

    async fn inspection_snapshot(
        &self,
        lease_id: &LeaseId,
        kind: InspectionKind,
    ) -> Result<Option<Vec<InspectionItem>>, StoreError>;

    async fn disposition(
        &self,
        lease_id: &LeaseId,
    ) -> Result<Option<DepositDisposition>, StoreError>;

    /// Insert a new disposition, derive its totals from the linked move-out inspection and
    /// record the move-out date on the lease. `Conflict` when one already exists.
    async fn create_disposition(
        &self,
        disposition: DepositDisposition,
        calculator: &DispositionCalculator,
    ) -> Result<DepositDisposition, StoreError>;

    /// Apply a lifecycle patch to the current record, along with its lease effect.
    async fn update_disposition(
        &self,
        lease_id: &LeaseId,
        patch: DispositionPatch,
    ) -> Result<DepositDisposition, StoreError>;

    async fn recalculate_disposition(
        &self,
        lease_id: &LeaseId,
        calculator: &DispositionCalculator,
    ) -> Result<DepositDisposition, StoreError>;

    async fn damage_items(&self, inspection_id: &InspectionId)
        -> Result<Vec<DamageItem>, StoreError>;

    /// Apply `change` and recalculate the disposition owning its inspection, if any.
    async fn apply_damage_change(
        &self,
        change: DamageItemChange,
        calculator: &DispositionCalculator,
    ) -> Result<DamageChangeOutcome, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Rejected(#[from] InvalidTransition),
    #[error(transparent)]
    Overflow(#[from] CurrencyOverflow),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
