use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::workflows::move_out::calculator::DispositionCalculator;
use crate::workflows::move_out::clock::FixedClock;
use crate::workflows::move_out::domain::{
    DamageItem, DamageItemDraft, DepositDisposition, InspectionId, InspectionItem,
    InspectionKind, InspectionLinks, ItemCondition, LeaseDeposit, LeaseId,
};
use crate::workflows::move_out::lifecycle::DispositionPatch;
use crate::workflows::move_out::memory::InMemoryDispositionStore;
use crate::workflows::move_out::policy::JurisdictionPolicy;
use crate::workflows::move_out::repository::{
    DamageChangeOutcome, DamageItemChange, DispositionStore, StoreError,
};
use crate::workflows::move_out::service::DispositionService;

pub(super) type TestService = DispositionService<InMemoryDispositionStore, FixedClock>;

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn lease_id() -> LeaseId {
    LeaseId("lease-204".to_string())
}

pub(super) fn move_in_inspection() -> InspectionId {
    InspectionId("insp-204-in".to_string())
}

pub(super) fn move_out_inspection() -> InspectionId {
    InspectionId("insp-204-out".to_string())
}

/// Exactly one year of holding at 1% yields $10.00 on a $1000 deposit.
pub(super) fn move_out_date() -> NaiveDate {
    date(2024, 1, 10)
}

pub(super) fn deposit() -> LeaseDeposit {
    LeaseDeposit {
        lease_id: lease_id(),
        amount: dec!(1000),
        lease_start: date(2023, 1, 10),
        paid_on: None,
        interest_rate: None,
        bank_name: Some("North Star Credit Union".to_string()),
        account_last4: Some("4821".to_string()),
    }
}

pub(super) fn inspection_item(
    room: &str,
    item: &str,
    condition: ItemCondition,
    has_damage: bool,
) -> InspectionItem {
    InspectionItem {
        room: room.to_string(),
        item: item.to_string(),
        condition,
        has_damage,
        notes: None,
    }
}

pub(super) fn seeded_store() -> Arc<InMemoryDispositionStore> {
    let store = InMemoryDispositionStore::default();
    store.insert_lease(deposit()).expect("lease seeded");
    store
        .insert_inspection(
            &lease_id(),
            InspectionKind::MoveIn,
            move_in_inspection(),
            vec![inspection_item("Kitchen", "Faucet", ItemCondition::Good, false)],
        )
        .expect("move-in seeded");
    store
        .insert_inspection(
            &lease_id(),
            InspectionKind::MoveOut,
            move_out_inspection(),
            vec![
                inspection_item("Kitchen", "Faucet", ItemCondition::Damaged, true),
                inspection_item("Bedroom", "Carpet", ItemCondition::Good, false),
            ],
        )
        .expect("move-out seeded");
    Arc::new(store)
}

pub(super) type Harness = (TestService, Arc<InMemoryDispositionStore>, Arc<FixedClock>);

fn service_over(store: Arc<InMemoryDispositionStore>, today: NaiveDate) -> Harness {
    let clock = Arc::new(FixedClock::new(today));
    let policy = JurisdictionPolicy::minnesota();
    let service = DispositionService::with_clock(store.clone(), policy, clock.clone());
    (service, store, clock)
}

pub(super) fn build_service(today: NaiveDate) -> Harness {
    service_over(seeded_store(), today)
}

/// Lease on file but neither inspection captured yet.
pub(super) fn service_without_inspections(today: NaiveDate) -> Harness {
    let store = InMemoryDispositionStore::default();
    store.insert_lease(deposit()).expect("lease seeded");
    service_over(Arc::new(store), today)
}

pub(super) async fn initiated_service() -> Harness {
    let (service, store, clock) = build_service(date(2024, 1, 15));
    service
        .initiate_move_out(&lease_id(), move_out_date(), None)
        .await
        .expect("move-out initiated");
    (service, store, clock)
}

pub(super) fn damage(description: &str, cost: Decimal) -> DamageItemDraft {
    DamageItemDraft {
        description: description.to_string(),
        location: Some("Living Room".to_string()),
        repair_cost: cost,
        is_normal_wear: false,
        is_pre_existing: false,
        photo_urls: Vec::new(),
        notes: None,
        move_in_item_id: None,
    }
}

pub(super) fn normal_wear(description: &str, cost: Decimal) -> DamageItemDraft {
    DamageItemDraft {
        is_normal_wear: true,
        ..damage(description, cost)
    }
}

pub(super) fn pre_existing(description: &str, cost: Decimal) -> DamageItemDraft {
    DamageItemDraft {
        is_pre_existing: true,
        ..damage(description, cost)
    }
}

pub(super) struct UnavailableStore;

#[async_trait]
impl DispositionStore for UnavailableStore {
    async fn lease_deposit(
        &self,
        _lease_id: &LeaseId,
    ) -> Result<Option<LeaseDeposit>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn inspection_links(&self, _lease_id: &LeaseId) -> Result<InspectionLinks, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn inspection_snapshot(
        &self,
        _lease_id: &LeaseId,
        _kind: InspectionKind,
    ) -> Result<Option<Vec<InspectionItem>>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn disposition(
        &self,
        _lease_id: &LeaseId,
    ) -> Result<Option<DepositDisposition>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn create_disposition(
        &self,
        _disposition: DepositDisposition,
        _calculator: &DispositionCalculator,
    ) -> Result<DepositDisposition, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn update_disposition(
        &self,
        _lease_id: &LeaseId,
        _patch: DispositionPatch,
    ) -> Result<DepositDisposition, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn recalculate_disposition(
        &self,
        _lease_id: &LeaseId,
        _calculator: &DispositionCalculator,
    ) -> Result<DepositDisposition, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn damage_items(
        &self,
        _inspection_id: &InspectionId,
    ) -> Result<Vec<DamageItem>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn apply_damage_change(
        &self,
        _change: DamageItemChange,
        _calculator: &DispositionCalculator,
    ) -> Result<DamageChangeOutcome, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Decimals serialize as strings; compare by value rather than scale.
pub(super) fn decimal_at(value: &Value) -> Decimal {
    value
        .as_str()
        .and_then(|raw| raw.parse::<Decimal>().ok())
        .expect("decimal string")
}
