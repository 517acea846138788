use super::common::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use crate::workflows::move_out::calculator::DispositionCalculator;
use crate::workflows::move_out::domain::{
    DamageItemId, DeliveryMethod, DispositionError, ErrorKind, InspectionId, InspectionKind,
    ItemCondition,
};
use crate::workflows::move_out::repository::{DamageItemChange, DispositionStore, StoreError};

#[tokio::test]
async fn recording_assigns_ids_and_recalculates_owner() {
    let (service, _, _) = initiated_service().await;

    let first = service
        .record_damage_item(&move_out_inspection(), damage("Hole in drywall", dec!(150)))
        .await
        .expect("recorded");
    let second = service
        .record_damage_item(&move_out_inspection(), damage("Missing blind", dec!(25.5)))
        .await
        .expect("recorded");

    assert_ne!(first.item.id, second.item.id);
    assert!(first.item.id.0.starts_with("dmg-"));
    assert_eq!(first.item.inspection_id, move_out_inspection());

    let disposition = second.disposition.expect("owner recalculated");
    assert_eq!(disposition.total_deductions, dec!(175.50));
    assert_eq!(disposition.refund_amount, dec!(834.50));

    let items = service
        .damage_items(&move_out_inspection())
        .await
        .expect("listed");
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn update_and_delete_keep_totals_current() {
    let (service, _, _) = initiated_service().await;
    let recorded = service
        .record_damage_item(&move_out_inspection(), damage("Stained carpet", dec!(300)))
        .await
        .expect("recorded");

    let updated = service
        .update_damage_item(
            &move_out_inspection(),
            &recorded.item.id,
            normal_wear("Stained carpet", dec!(300)),
        )
        .await
        .expect("reclassified as normal wear");
    assert!(updated.item.is_normal_wear);
    let disposition = updated.disposition.expect("owner recalculated");
    assert_eq!(disposition.total_deductions, dec!(0));
    assert_eq!(disposition.refund_amount, dec!(1010));

    service
        .update_damage_item(
            &move_out_inspection(),
            &recorded.item.id,
            damage("Stained carpet", dec!(1200)),
        )
        .await
        .expect("cost raised");
    let stored = service.disposition(&lease_id()).await.expect("stored");
    assert_eq!(stored.total_deductions, dec!(1200));
    assert_eq!(stored.refund_amount, dec!(0));

    let removed = service
        .delete_damage_item(&move_out_inspection(), &recorded.item.id)
        .await
        .expect("deleted");
    assert_eq!(removed.item.description, "Stained carpet");
    let disposition = removed.disposition.expect("owner recalculated");
    assert_eq!(disposition.total_deductions, dec!(0));
    assert!(disposition.itemized_deductions.is_empty());
}

#[tokio::test]
async fn unknown_items_are_not_found() {
    let (service, _, _) = initiated_service().await;
    let missing = DamageItemId("dmg-missing".to_string());

    let err = service
        .update_damage_item(&move_out_inspection(), &missing, damage("Door", dec!(10)))
        .await
        .expect_err("no such item");
    assert!(matches!(err, DispositionError::DamageItemNotFound(ref id) if *id == missing));

    let err = service
        .delete_damage_item(&move_out_inspection(), &missing)
        .await
        .expect_err("no such item");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn drafts_are_validated() {
    let (service, _, _) = initiated_service().await;

    let err = service
        .record_damage_item(&move_out_inspection(), damage("   ", dec!(10)))
        .await
        .expect_err("blank description");
    assert!(matches!(err, DispositionError::Validation { field: "description", .. }));

    let err = service
        .record_damage_item(&move_out_inspection(), damage("Window", dec!(-0.01)))
        .await
        .expect_err("negative cost");
    assert!(matches!(err, DispositionError::Validation { field: "repair_cost", .. }));

    let items = service
        .damage_items(&move_out_inspection())
        .await
        .expect("listed");
    assert!(items.is_empty());
}

#[tokio::test]
async fn repair_costs_must_be_whole_cents_within_range() {
    let (service, _, _) = initiated_service().await;

    for cost in [dec!(0.004), dec!(50000000000000000000000000000)] {
        let err = service
            .record_damage_item(&move_out_inspection(), damage("Flooded basement", cost))
            .await
            .expect_err("cost rejected");
        assert!(matches!(err, DispositionError::Validation { field: "repair_cost", .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    for _ in 0..2 {
        service
            .record_damage_item(&move_out_inspection(), damage("Rebuild unit", dec!(1000000000)))
            .await
            .expect("largest accepted cost");
    }

    let stored = service.disposition(&lease_id()).await.expect("store still available");
    assert_eq!(stored.total_deductions, dec!(2000000000));
    assert_eq!(stored.refund_amount, dec!(0));
    assert_eq!(stored.itemized_deductions.len(), 2);
}

#[tokio::test]
async fn overflowing_store_change_is_rolled_back() {
    let (service, store, _) = initiated_service().await;
    let huge = |id: &str| {
        damage("Unvalidated import", Decimal::MAX)
            .into_item(DamageItemId(id.to_string()), move_out_inspection())
    };

    store
        .apply_damage_change(
            DamageItemChange::Create(huge("dmg-import-1")),
            &DispositionCalculator,
        )
        .await
        .expect("single item in range");
    let err = store
        .apply_damage_change(
            DamageItemChange::Create(huge("dmg-import-2")),
            &DispositionCalculator,
        )
        .await
        .expect_err("sum overflows");
    assert!(matches!(err, StoreError::Overflow(_)));

    let items = service
        .damage_items(&move_out_inspection())
        .await
        .expect("store still available");
    assert_eq!(items.len(), 1);
    service
        .record_damage_item(&move_out_inspection(), damage("Door stop", dec!(5)))
        .await
        .expect_err("still overflows with the imported item");
    service
        .delete_damage_item(&move_out_inspection(), &DamageItemId("dmg-import-1".to_string()))
        .await
        .expect("import removed");

    let stored = service.disposition(&lease_id()).await.expect("stored");
    assert_eq!(stored.total_deductions, dec!(0));
    assert_eq!(stored.refund_amount, dec!(1010));
}

#[tokio::test]
async fn inspection_captured_after_initiation_is_linked() {
    let (service, store, _) = service_without_inspections(date(2024, 1, 15));
    let created = service
        .initiate_move_out(&lease_id(), move_out_date(), None)
        .await
        .expect("initiated");
    assert!(created.move_out_inspection_id.is_none());

    store
        .insert_inspection(
            &lease_id(),
            InspectionKind::MoveOut,
            move_out_inspection(),
            vec![inspection_item("Kitchen", "Counter", ItemCondition::Damaged, true)],
        )
        .expect("move-out captured");

    let outcome = service
        .record_damage_item(&move_out_inspection(), damage("Cracked countertop", dec!(200)))
        .await
        .expect("recorded");
    let disposition = outcome.disposition.expect("owner recalculated");
    assert_eq!(disposition.move_out_inspection_id, Some(move_out_inspection()));
    assert_eq!(disposition.total_deductions, dec!(200));
    assert_eq!(disposition.refund_amount, dec!(810));

    let statement = service.statement(&lease_id()).await.expect("statement");
    assert_eq!(statement.deducted.len(), 1);
}

#[tokio::test]
async fn recalculation_picks_up_a_late_inspection() {
    let (service, store, _) = service_without_inspections(date(2024, 1, 15));
    service
        .initiate_move_out(&lease_id(), move_out_date(), None)
        .await
        .expect("initiated");

    let outcome = service
        .record_damage_item(&move_out_inspection(), damage("Broken closet door", dec!(120)))
        .await
        .expect("recorded before the inspection is filed");
    assert!(outcome.disposition.is_none());

    store
        .insert_inspection(&lease_id(), InspectionKind::MoveOut, move_out_inspection(), vec![])
        .expect("move-out captured");

    let recalculated = service
        .recalculate_disposition(&lease_id())
        .await
        .expect("recalculated");
    assert_eq!(recalculated.move_out_inspection_id, Some(move_out_inspection()));
    assert_eq!(recalculated.total_deductions, dec!(120));
    assert_eq!(recalculated.refund_amount, dec!(890));
}

#[tokio::test]
async fn edits_are_frozen_once_the_letter_is_sent() {
    let (service, _, _) = initiated_service().await;
    let recorded = service
        .record_damage_item(&move_out_inspection(), damage("Cracked mirror", dec!(80)))
        .await
        .expect("recorded");
    service
        .send_disposition_letter(&lease_id(), DeliveryMethod::CertifiedMail, None)
        .await
        .expect("sent");

    let err = service
        .record_damage_item(&move_out_inspection(), damage("Late finding", dec!(40)))
        .await
        .expect_err("letter already sent");
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);

    let err = service
        .delete_damage_item(&move_out_inspection(), &recorded.item.id)
        .await
        .expect_err("letter already sent");
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);

    let stored = service.disposition(&lease_id()).await.expect("stored");
    assert_eq!(stored.total_deductions, dec!(80));
}

#[tokio::test]
async fn items_recorded_before_initiation_are_counted() {
    let (service, _, _) = build_service(date(2024, 1, 15));

    let outcome = service
        .record_damage_item(&move_out_inspection(), damage("Broken window", dec!(210)))
        .await
        .expect("recorded without a disposition");
    assert!(outcome.disposition.is_none());

    let created = service
        .initiate_move_out(&lease_id(), move_out_date(), None)
        .await
        .expect("initiated");
    assert_eq!(created.total_deductions, dec!(210));
    assert_eq!(created.refund_amount, dec!(800));
    assert_eq!(created.itemized_deductions.len(), 1);
}

#[tokio::test]
async fn unrelated_inspections_do_not_touch_the_disposition() {
    let (service, _, _) = initiated_service().await;
    let other = InspectionId("insp-routine-7".to_string());

    let outcome = service
        .record_damage_item(&other, damage("Dripping tap", dec!(60)))
        .await
        .expect("recorded");
    assert!(outcome.disposition.is_none());

    let stored = service.disposition(&lease_id()).await.expect("stored");
    assert_eq!(stored.total_deductions, dec!(0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_recording_never_loses_a_deduction() {
    let (service, _, _) = initiated_service().await;
    let service = Arc::new(service);

    let tasks: Vec<_> = (0..25)
        .map(|index| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .record_damage_item(
                        &move_out_inspection(),
                        damage(&format!("Finding {index}"), dec!(10)),
                    )
                    .await
                    .expect("recorded");
            })
        })
        .collect();
    for task in tasks {
        task.await.expect("task joined");
    }

    let stored = service.disposition(&lease_id()).await.expect("stored");
    assert_eq!(stored.total_deductions, dec!(250));
    assert_eq!(stored.refund_amount, dec!(760));
    assert_eq!(stored.itemized_deductions.len(), 25);
}
