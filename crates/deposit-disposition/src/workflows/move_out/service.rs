use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::calculator::DispositionCalculator;
use super::clock::{Clock, SystemClock};
use super::comparison::{compare_inspections, InspectionComparison};
use super::deadline::{self, DeadlineStatus, DeadlineTracker};
use super::domain::{
    DamageItem, DamageItemDraft, DamageItemId, DeliveryMethod, DepositDisposition,
    DispositionError, InspectionId, InspectionKind, LeaseId, RefundMethod,
};
use super::lifecycle::DispositionPatch;
use super::money::{ensure_non_negative, round_currency};
use super::policy::JurisdictionPolicy;
use super::repository::{DamageChangeOutcome, DamageItemChange, DispositionStore, StoreError};
use super::statement::DispositionStatement;

static DAMAGE_ITEM_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_damage_item_id() -> DamageItemId {
    let id = DAMAGE_ITEM_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    DamageItemId(format!("dmg-{id:06}"))
}

fn normalized(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Service composing the store, jurisdiction policy, calculator and deadline tracker.
pub struct DispositionService<S, C = SystemClock> {
    store: Arc<S>,
    clock: Arc<C>,
    policy: Arc<JurisdictionPolicy>,
    tracker: DeadlineTracker,
    calculator: DispositionCalculator,
}

impl<S> DispositionService<S, SystemClock>
where
    S: DispositionStore + 'static,
{
    pub fn new(store: Arc<S>, policy: JurisdictionPolicy) -> Self {
        Self::with_clock(store, policy, Arc::new(SystemClock))
    }
}

impl<S, C> DispositionService<S, C>
where
    S: DispositionStore + 'static,
    C: Clock + 'static,
{
    pub fn with_clock(store: Arc<S>, policy: JurisdictionPolicy, clock: Arc<C>) -> Self {
        let tracker = DeadlineTracker::new(&policy);
        Self {
            store,
            clock,
            policy: Arc::new(policy),
            tracker,
            calculator: DispositionCalculator,
        }
    }

    pub fn policy(&self) -> &JurisdictionPolicy {
        &self.policy
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Create the DRAFT disposition for a lease that is moving out.
    pub async fn initiate_move_out(
        &self,
        lease_id: &LeaseId,
        move_out_date: NaiveDate,
        notes: Option<String>,
    ) -> Result<DepositDisposition, DispositionError> {
        let deposit = self
            .store
            .lease_deposit(lease_id)
            .await?
            .ok_or_else(|| DispositionError::LeaseNotFound(lease_id.clone()))?;

        if self.store.disposition(lease_id).await?.is_some() {
            return Err(DispositionError::AlreadyInitiated(lease_id.clone()));
        }

        let rate = deposit
            .interest_rate
            .unwrap_or(self.policy.default_interest_rate);
        let interest = self.tracker.deposit_interest(
            deposit.amount,
            deposit.deposit_date(),
            move_out_date,
            rate,
        )?;
        let deadline_date = self.tracker.deadline_date(move_out_date)?;
        let inspections = self.store.inspection_links(lease_id).await?;

        let draft = DepositDisposition::draft(
            &deposit,
            move_out_date,
            deadline_date,
            interest,
            inspections,
            normalized(notes),
        );

        let created = self
            .store
            .create_disposition(draft, &self.calculator)
            .await
            .map_err(|err| match err {
                StoreError::Conflict => DispositionError::AlreadyInitiated(lease_id.clone()),
                StoreError::NotFound => DispositionError::LeaseNotFound(lease_id.clone()),
                StoreError::Overflow(overflow) => overflow.into(),
                other => other.into(),
            })?;

        info!(
            lease_id = %lease_id,
            %move_out_date,
            deadline = %created.deadline_date,
            interest = %created.interest_accrued,
            refund = %created.refund_amount,
            "move-out initiated"
        );
        Ok(created)
    }

    pub async fn disposition(
        &self,
        lease_id: &LeaseId,
    ) -> Result<DepositDisposition, DispositionError> {
        self.store
            .disposition(lease_id)
            .await?
            .ok_or_else(|| DispositionError::DispositionNotFound(lease_id.clone()))
    }

    /// Recompute totals and itemization from the current damage items.
    pub async fn recalculate_disposition(
        &self,
        lease_id: &LeaseId,
    ) -> Result<DepositDisposition, DispositionError> {
        self.store
            .recalculate_disposition(lease_id, &self.calculator)
            .await
            .map_err(|err| self.lifecycle_error(lease_id, "recalculate", err))
    }

    pub async fn compare_inspections(
        &self,
        lease_id: &LeaseId,
    ) -> Result<InspectionComparison, DispositionError> {
        let move_in = self
            .store
            .inspection_snapshot(lease_id, InspectionKind::MoveIn)
            .await?;
        let move_out = self
            .store
            .inspection_snapshot(lease_id, InspectionKind::MoveOut)
            .await?;
        Ok(compare_inspections(move_in.as_deref(), move_out.as_deref()))
    }

    pub async fn submit_for_review(
        &self,
        lease_id: &LeaseId,
    ) -> Result<DepositDisposition, DispositionError> {
        self.apply(lease_id, DispositionPatch::SubmitForReview).await
    }

    /// Record that the itemized letter went out. Clears overdue status permanently.
    pub async fn send_disposition_letter(
        &self,
        lease_id: &LeaseId,
        method: DeliveryMethod,
        tracking_number: Option<String>,
    ) -> Result<DepositDisposition, DispositionError> {
        let patch = DispositionPatch::Send {
            sent_date: self.clock.today(),
            method,
            tracking_number: normalized(tracking_number),
        };
        self.apply(lease_id, patch).await
    }

    pub async fn record_dispute(
        &self,
        lease_id: &LeaseId,
        reason: String,
    ) -> Result<DepositDisposition, DispositionError> {
        let reason = normalized(Some(reason)).ok_or_else(|| DispositionError::Validation {
            field: "reason",
            reason: "must not be blank".to_string(),
        })?;
        self.apply(lease_id, DispositionPatch::Dispute { reason }).await
    }

    /// Record the refund payment; `amount` replaces the calculated refund.
    pub async fn process_refund(
        &self,
        lease_id: &LeaseId,
        method: RefundMethod,
        check_number: Option<String>,
        amount: Decimal,
    ) -> Result<DepositDisposition, DispositionError> {
        let amount = round_currency(ensure_non_negative("amount", amount)?);
        let patch = DispositionPatch::ProcessRefund {
            processed_date: self.clock.today(),
            method,
            check_number: normalized(check_number),
            amount,
        };
        self.apply(lease_id, patch).await
    }

    pub async fn days_until_deadline(&self, lease_id: &LeaseId) -> Result<i64, DispositionError> {
        let disposition = self.disposition(lease_id).await?;
        Ok(deadline::days_until_deadline(
            disposition.deadline_date,
            self.clock.today(),
        ))
    }

    pub async fn is_overdue(&self, lease_id: &LeaseId) -> Result<bool, DispositionError> {
        let disposition = self.disposition(lease_id).await?;
        Ok(deadline::is_overdue(
            disposition.deadline_date,
            disposition.sent_date,
            self.clock.today(),
        ))
    }

    pub async fn deadline_status(
        &self,
        lease_id: &LeaseId,
    ) -> Result<DeadlineStatus, DispositionError> {
        let disposition = self.disposition(lease_id).await?;
        Ok(self.tracker.status(&disposition, self.clock.today()))
    }

    /// Letter-ready view of the disposition, including excluded findings.
    pub async fn statement(
        &self,
        lease_id: &LeaseId,
    ) -> Result<DispositionStatement, DispositionError> {
        let disposition = self.disposition(lease_id).await?;
        let move_out_inspection = match &disposition.move_out_inspection_id {
            Some(inspection_id) => Some(inspection_id.clone()),
            None => self.store.inspection_links(lease_id).await?.move_out,
        };
        let items = match &move_out_inspection {
            Some(inspection_id) => self.store.damage_items(inspection_id).await?,
            None => Vec::new(),
        };
        DispositionStatement::build(
            &disposition,
            &items,
            &self.policy,
            &self.tracker,
            &self.calculator,
            self.clock.today(),
        )
        .map_err(DispositionError::from)
    }

    pub async fn record_damage_item(
        &self,
        inspection_id: &InspectionId,
        draft: DamageItemDraft,
    ) -> Result<DamageChangeOutcome, DispositionError> {
        draft.validate()?;
        let item = draft.into_item(next_damage_item_id(), inspection_id.clone());
        self.change_damage(DamageItemChange::Create(item)).await
    }

    pub async fn update_damage_item(
        &self,
        inspection_id: &InspectionId,
        item_id: &DamageItemId,
        draft: DamageItemDraft,
    ) -> Result<DamageChangeOutcome, DispositionError> {
        draft.validate()?;
        let item = draft.into_item(item_id.clone(), inspection_id.clone());
        self.change_damage(DamageItemChange::Update(item)).await
    }

    pub async fn delete_damage_item(
        &self,
        inspection_id: &InspectionId,
        item_id: &DamageItemId,
    ) -> Result<DamageChangeOutcome, DispositionError> {
        self.change_damage(DamageItemChange::Delete {
            inspection_id: inspection_id.clone(),
            item_id: item_id.clone(),
        })
        .await
    }

    pub async fn damage_items(
        &self,
        inspection_id: &InspectionId,
    ) -> Result<Vec<DamageItem>, DispositionError> {
        Ok(self.store.damage_items(inspection_id).await?)
    }

    async fn change_damage(
        &self,
        change: DamageItemChange,
    ) -> Result<DamageChangeOutcome, DispositionError> {
        let item_id = change.item_id().clone();
        let inspection_id = change.inspection_id().clone();

        match self.store.apply_damage_change(change, &self.calculator).await {
            Ok(outcome) => {
                info!(
                    inspection_id = %inspection_id,
                    item_id = %item_id,
                    recalculated = outcome.disposition.is_some(),
                    "damage item changed"
                );
                Ok(outcome)
            }
            Err(StoreError::NotFound) => Err(DispositionError::DamageItemNotFound(item_id)),
            Err(StoreError::Conflict) => Err(DispositionError::Validation {
                field: "id",
                reason: format!("damage item {item_id} already exists"),
            }),
            Err(StoreError::Rejected(rejection)) => {
                warn!(inspection_id = %inspection_id, %rejection, "damage change rejected");
                Err(rejection.into())
            }
            Err(StoreError::Overflow(overflow)) => {
                warn!(inspection_id = %inspection_id, %overflow, "damage change rejected");
                Err(overflow.into())
            }
            Err(other) => Err(other.into()),
        }
    }

    async fn apply(
        &self,
        lease_id: &LeaseId,
        patch: DispositionPatch,
    ) -> Result<DepositDisposition, DispositionError> {
        let action = patch.action();
        let updated = self
            .store
            .update_disposition(lease_id, patch)
            .await
            .map_err(|err| self.lifecycle_error(lease_id, action, err))?;

        info!(lease_id = %lease_id, action, status = %updated.status, "disposition updated");
        Ok(updated)
    }

    fn lifecycle_error(
        &self,
        lease_id: &LeaseId,
        action: &str,
        err: StoreError,
    ) -> DispositionError {
        match err {
            StoreError::NotFound => DispositionError::DispositionNotFound(lease_id.clone()),
            StoreError::Rejected(rejection) => {
                warn!(lease_id = %lease_id, action, %rejection, "transition rejected");
                rejection.into()
            }
            StoreError::Overflow(overflow) => overflow.into(),
            other => other.into(),
        }
    }
}
