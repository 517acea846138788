use chrono::{Duration, NaiveDate};
use deposit_disposition::error::AppError;
use deposit_disposition::workflows::move_out::{
    DispositionError, InMemoryDispositionStore, InspectionId, InspectionItem, InspectionKind,
    ItemCondition, LeaseDeposit, LeaseId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) const DEMO_LEASE_ID: &str = "lease-demo-204";
pub(crate) const DEMO_MOVE_OUT_INSPECTION: &str = "insp-demo-204-out";

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// `date` moved by `days`, or a validation error on `field` when it leaves the calendar.
pub(crate) fn shift_days(
    date: NaiveDate,
    days: i64,
    field: &'static str,
) -> Result<NaiveDate, AppError> {
    date.checked_add_signed(Duration::days(days))
        .ok_or_else(|| {
            DispositionError::Validation {
                field,
                reason: format!("{date} shifted by {days} day(s) is out of range"),
            }
            .into()
        })
}

fn observation(
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

/// Seed a one-year lease ending on `move_out_date`, with both inspections captured.
pub(crate) fn seed_demo_lease(
    store: &InMemoryDispositionStore,
    move_out_date: NaiveDate,
) -> Result<LeaseId, AppError> {
    let lease_id = LeaseId(DEMO_LEASE_ID.to_string());
    let lease_start = shift_days(move_out_date, -365, "move_out_date")?;

    store
        .insert_lease(LeaseDeposit {
            lease_id: lease_id.clone(),
            amount: Decimal::new(1_200_00, 2),
            lease_start,
            paid_on: Some(lease_start),
            interest_rate: None,
            bank_name: Some("North Star Credit Union".to_string()),
            account_last4: Some("4821".to_string()),
        })
        .map_err(DispositionError::from)?;

    store
        .insert_inspection(
            &lease_id,
            InspectionKind::MoveIn,
            InspectionId("insp-demo-204-in".to_string()),
            vec![
                observation("Kitchen", "Faucet", ItemCondition::Good, false),
                observation("Living Room", "Carpet", ItemCondition::Fair, false),
                observation("Bathroom", "Mirror", ItemCondition::Good, false),
            ],
        )
        .map_err(DispositionError::from)?;

    store
        .insert_inspection(
            &lease_id,
            InspectionKind::MoveOut,
            InspectionId(DEMO_MOVE_OUT_INSPECTION.to_string()),
            vec![
                observation("Kitchen", "Faucet", ItemCondition::Damaged, true),
                observation("Living Room", "Carpet", ItemCondition::Poor, false),
                observation("Bedroom", "Blinds", ItemCondition::Missing, true),
            ],
        )
        .map_err(DispositionError::from)?;

    Ok(lease_id)
}
