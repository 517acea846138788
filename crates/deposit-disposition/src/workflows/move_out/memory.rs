use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::calculator::DispositionCalculator;
use super::domain::{
    DamageItem, DepositDisposition, InspectionId, InspectionItem, InspectionKind,
    InspectionLinks, LeaseDeposit, LeaseId,
};
use super::lifecycle::{
    ensure_damage_editable, ensure_recalculable, DispositionPatch, LeaseEffect,
};
use super::repository::{DamageChangeOutcome, DamageItemChange, DispositionStore, StoreError};

/// Lease-side state the engine touches as a side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseRecord {
    pub deposit: LeaseDeposit,
    pub move_out_date: Option<NaiveDate>,
    pub ended: bool,
}

#[derive(Debug, Clone)]
struct InspectionSnapshot {
    inspection_id: InspectionId,
    items: Vec<InspectionItem>,
}

#[derive(Debug, Default)]
struct StoreState {
    leases: HashMap<LeaseId, LeaseRecord>,
    inspections: HashMap<(LeaseId, InspectionKind), InspectionSnapshot>,
    dispositions: HashMap<LeaseId, DepositDisposition>,
    damage_items: HashMap<InspectionId, Vec<DamageItem>>,
}

impl StoreState {
    fn items_for(&self, inspection_id: Option<&InspectionId>) -> &[DamageItem] {
        inspection_id
            .and_then(|id| self.damage_items.get(id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn inspection_id_for(&self, lease_id: &LeaseId, kind: InspectionKind) -> Option<InspectionId> {
        self.inspections
            .get(&(lease_id.clone(), kind))
            .map(|snapshot| snapshot.inspection_id.clone())
    }

    /// Fill links the disposition was created without; inspections often land after initiation.
    fn link_inspections(&self, disposition: &mut DepositDisposition) {
        if disposition.move_in_inspection_id.is_none() {
            disposition.move_in_inspection_id =
                self.inspection_id_for(&disposition.lease_id, InspectionKind::MoveIn);
        }
        if disposition.move_out_inspection_id.is_none() {
            disposition.move_out_inspection_id =
                self.inspection_id_for(&disposition.lease_id, InspectionKind::MoveOut);
        }
    }

    /// Lease whose disposition is, or will be once linked, recalculated from `inspection_id`.
    fn owner_of(&self, inspection_id: &InspectionId) -> Option<LeaseId> {
        let linked = self.dispositions.values().find(|disposition| {
            disposition.move_out_inspection_id.as_ref() == Some(inspection_id)
        });
        if let Some(disposition) = linked {
            return Some(disposition.lease_id.clone());
        }

        self.inspections
            .iter()
            .find(|((_, kind), snapshot)| {
                *kind == InspectionKind::MoveOut && snapshot.inspection_id == *inspection_id
            })
            .map(|((lease_id, _), _)| lease_id.clone())
            .filter(|lease_id| {
                self.dispositions
                    .get(lease_id)
                    .is_some_and(|disposition| disposition.move_out_inspection_id.is_none())
            })
    }
}

/// Mutex-backed store; each trait call holds the lock for its whole unit of work.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDispositionStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryDispositionStore {
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }

    pub fn insert_lease(&self, deposit: LeaseDeposit) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.leases.insert(
            deposit.lease_id.clone(),
            LeaseRecord {
                deposit,
                move_out_date: None,
                ended: false,
            },
        );
        Ok(())
    }

    pub fn insert_inspection(
        &self,
        lease_id: &LeaseId,
        kind: InspectionKind,
        inspection_id: InspectionId,
        items: Vec<InspectionItem>,
    ) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.inspections.insert(
            (lease_id.clone(), kind),
            InspectionSnapshot {
                inspection_id,
                items,
            },
        );
        Ok(())
    }

    pub fn lease(&self, lease_id: &LeaseId) -> Result<Option<LeaseRecord>, StoreError> {
        let state = self.lock()?;
        Ok(state.leases.get(lease_id).cloned())
    }
}

#[async_trait]
impl DispositionStore for InMemoryDispositionStore {
    async fn lease_deposit(&self, lease_id: &LeaseId) -> Result<Option<LeaseDeposit>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .leases
            .get(lease_id)
            .map(|record| record.deposit.clone()))
    }

    async fn inspection_links(&self, lease_id: &LeaseId) -> Result<InspectionLinks, StoreError> {
        let state = self.lock()?;
        Ok(InspectionLinks {
            move_in: state.inspection_id_for(lease_id, InspectionKind::MoveIn),
            move_out: state.inspection_id_for(lease_id, InspectionKind::MoveOut),
        })
    }

    async fn inspection_snapshot(
        &self,
        lease_id: &LeaseId,
        kind: InspectionKind,
    ) -> Result<Option<Vec<InspectionItem>>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .inspections
            .get(&(lease_id.clone(), kind))
            .map(|snapshot| snapshot.items.clone()))
    }

    async fn disposition(
        &self,
        lease_id: &LeaseId,
    ) -> Result<Option<DepositDisposition>, StoreError> {
        let state = self.lock()?;
        Ok(state.dispositions.get(lease_id).cloned())
    }

    async fn create_disposition(
        &self,
        mut disposition: DepositDisposition,
        calculator: &DispositionCalculator,
    ) -> Result<DepositDisposition, StoreError> {
        let mut state = self.lock()?;
        if state.dispositions.contains_key(&disposition.lease_id) {
            return Err(StoreError::Conflict);
        }
        if !state.leases.contains_key(&disposition.lease_id) {
            return Err(StoreError::NotFound);
        }

        let items = state
            .items_for(disposition.move_out_inspection_id.as_ref())
            .to_vec();
        calculator.recalculate(&mut disposition, &items)?;

        if let Some(lease) = state.leases.get_mut(&disposition.lease_id) {
            lease.move_out_date = Some(disposition.move_out_date);
        }
        state
            .dispositions
            .insert(disposition.lease_id.clone(), disposition.clone());
        Ok(disposition)
    }

    async fn update_disposition(
        &self,
        lease_id: &LeaseId,
        patch: DispositionPatch,
    ) -> Result<DepositDisposition, StoreError> {
        let mut state = self.lock()?;
        let current = state
            .dispositions
            .get(lease_id)
            .ok_or(StoreError::NotFound)?;

        // Apply to a copy so a rejected patch leaves the stored record untouched.
        let mut updated = current.clone();
        let effect = updated.apply_patch(patch)?;

        if effect == LeaseEffect::EndLease {
            if let Some(lease) = state.leases.get_mut(lease_id) {
                lease.ended = true;
            }
        }
        state.dispositions.insert(lease_id.clone(), updated.clone());
        Ok(updated)
    }

    async fn recalculate_disposition(
        &self,
        lease_id: &LeaseId,
        calculator: &DispositionCalculator,
    ) -> Result<DepositDisposition, StoreError> {
        let mut state = self.lock()?;
        let mut disposition = state
            .dispositions
            .get(lease_id)
            .cloned()
            .ok_or(StoreError::NotFound)?;
        ensure_recalculable(disposition.status)?;

        state.link_inspections(&mut disposition);
        let items = state
            .items_for(disposition.move_out_inspection_id.as_ref())
            .to_vec();
        calculator.recalculate(&mut disposition, &items)?;

        state
            .dispositions
            .insert(lease_id.clone(), disposition.clone());
        Ok(disposition)
    }

    async fn damage_items(
        &self,
        inspection_id: &InspectionId,
    ) -> Result<Vec<DamageItem>, StoreError> {
        let state = self.lock()?;
        Ok(state.items_for(Some(inspection_id)).to_vec())
    }

    async fn apply_damage_change(
        &self,
        change: DamageItemChange,
        calculator: &DispositionCalculator,
    ) -> Result<DamageChangeOutcome, StoreError> {
        let mut state = self.lock()?;
        let inspection_id = change.inspection_id().clone();
        let owner = state
            .owner_of(&inspection_id)
            .and_then(|lease_id| state.dispositions.get(&lease_id).cloned());

        if let Some(disposition) = &owner {
            ensure_damage_editable(disposition.status)?;
        }

        // Work on copies; nothing is written back unless recalculation succeeds.
        let mut items = state.items_for(Some(&inspection_id)).to_vec();
        let item = match change {
            DamageItemChange::Create(item) => {
                if items.iter().any(|existing| existing.id == item.id) {
                    return Err(StoreError::Conflict);
                }
                items.push(item.clone());
                item
            }
            DamageItemChange::Update(item) => {
                let slot = items
                    .iter_mut()
                    .find(|existing| existing.id == item.id)
                    .ok_or(StoreError::NotFound)?;
                *slot = item.clone();
                item
            }
            DamageItemChange::Delete { item_id, .. } => {
                let position = items
                    .iter()
                    .position(|existing| existing.id == item_id)
                    .ok_or(StoreError::NotFound)?;
                items.remove(position)
            }
        };

        let disposition = match owner {
            Some(mut disposition) => {
                state.link_inspections(&mut disposition);
                calculator.recalculate(&mut disposition, &items)?;
                Some(disposition)
            }
            None => None,
        };

        state.damage_items.insert(inspection_id, items);
        if let Some(disposition) = &disposition {
            state
                .dispositions
                .insert(disposition.lease_id.clone(), disposition.clone());
        }

        Ok(DamageChangeOutcome { item, disposition })
    }
}
