use crate::infra::{seed_demo_lease, shift_days, DEMO_MOVE_OUT_INSPECTION};
use chrono::{Local, NaiveDate};
use clap::Args;
use deposit_disposition::config::AppConfig;
use deposit_disposition::error::AppError;
use deposit_disposition::workflows::move_out::{
    DamageItemDraft, DeadlineStatus, DeadlineTracker, DeliveryMethod, DispositionService,
    DispositionStatement, FixedClock, InMemoryDispositionStore, InspectionId, RefundMethod,
};
use rust_decimal::Decimal;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DeadlineArgs {
    /// Move-out (lease termination) date (YYYY-MM-DD)
    #[arg(long = "move-out", value_parser = crate::infra::parse_date)]
    pub(crate) move_out: NaiveDate,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Date the disposition letter was sent, if it has been
    #[arg(long = "sent-on", value_parser = crate::infra::parse_date)]
    pub(crate) sent_on: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Demo date (YYYY-MM-DD). The seeded lease moved out seven days earlier.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_deadline(args: DeadlineArgs) -> Result<(), AppError> {
    let DeadlineArgs {
        move_out,
        today,
        sent_on,
    } = args;

    let config = AppConfig::load()?;
    let tracker = DeadlineTracker::new(&config.jurisdiction);
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let status = tracker.status_for(tracker.deadline_date(move_out)?, sent_on, today);

    println!("Deposit return deadline ({})", config.jurisdiction.jurisdiction);
    println!("- Move-out: {move_out}");
    render_deadline(&status);
    Ok(())
}

fn render_deadline(status: &DeadlineStatus) {
    println!("- Deadline: {}", status.deadline_date);
    match status.sent_date {
        Some(sent) => println!("- Letter sent {sent}"),
        None if status.is_overdue => println!(
            "- OVERDUE by {} day(s)",
            status.days_until_deadline.unsigned_abs()
        ),
        None => println!("- {} day(s) remaining", status.days_until_deadline),
    }
    println!("- Status: {}", status.urgency_label);
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let move_out = shift_days(today, -7, "today")?;

    let store = Arc::new(InMemoryDispositionStore::default());
    let lease_id = seed_demo_lease(&store, move_out)?;
    let clock = Arc::new(FixedClock::new(today));
    let service =
        DispositionService::with_clock(store, AppConfig::load()?.jurisdiction, clock.clone());

    println!("Security deposit disposition demo");
    let created = service.initiate_move_out(&lease_id, move_out, None).await?;
    println!(
        "- Move-out initiated for {} on {} | deadline {} | deposit ${} + interest ${}",
        created.lease_id,
        created.move_out_date,
        created.deadline_date,
        created.original_deposit,
        created.interest_accrued
    );

    let comparison = service.compare_inspections(&lease_id).await?;
    println!(
        "\nInspection comparison: {} rows | {} changed | {} new damage | {} removed",
        comparison.summary.rows,
        comparison.summary.condition_changed,
        comparison.summary.damage_added,
        comparison.summary.items_removed
    );
    for row in comparison.comparison.iter().filter(|row| row.condition_changed) {
        println!(
            "  - {} / {}{}",
            row.room,
            row.item,
            if row.damage_added { " (new damage)" } else { "" }
        );
    }

    let inspection_id = InspectionId(DEMO_MOVE_OUT_INSPECTION.to_string());
    for draft in demo_findings() {
        service.record_damage_item(&inspection_id, draft).await?;
    }
    service.submit_for_review(&lease_id).await?;

    let statement = service.statement(&lease_id).await?;
    render_statement(&statement);

    let sent = service
        .send_disposition_letter(
            &lease_id,
            DeliveryMethod::CertifiedMail,
            Some("9400 1000 0000 0000 0042".to_string()),
        )
        .await?;
    println!(
        "\n- Letter sent {} via {}",
        sent.sent_date.unwrap_or(today),
        sent.sent_method.map(DeliveryMethod::label).unwrap_or("unknown")
    );

    clock.set(shift_days(today, 3, "today")?);
    let refunded = service
        .process_refund(
            &lease_id,
            RefundMethod::Check,
            Some("2210".to_string()),
            sent.refund_amount,
        )
        .await?;
    println!(
        "- Refund of ${} issued by {} -> status {}",
        refunded.refund_amount,
        refunded.refund_method.map(RefundMethod::label).unwrap_or("unknown"),
        refunded.status.label()
    );

    Ok(())
}

fn render_statement(statement: &DispositionStatement) {
    println!("\nItemized disposition ({})", statement.jurisdiction);
    println!("- Original deposit: ${}", statement.original_deposit);
    println!("- Interest accrued: ${}", statement.interest_accrued);
    println!("Deductions:");
    for line in &statement.deducted {
        println!(
            "  - {} [{}]: ${}",
            line.description,
            line.location.as_deref().unwrap_or("unspecified"),
            line.amount
        );
    }
    if !statement.not_deducted.is_empty() {
        println!("Not deducted:");
        for line in &statement.not_deducted {
            println!(
                "  - {}: ${} ({})",
                line.description,
                line.amount,
                line.excluded_because.unwrap_or("excluded")
            );
        }
    }
    println!("- Total deductions: ${}", statement.total_deductions);
    println!("- Refund due: ${}", statement.refund_amount);
    if let Some(balance) = statement.additional_collection {
        println!("- Balance owed by tenant: ${balance}");
    }
    for disclosure in &statement.disclosures {
        println!("- {}: {}", disclosure.label, disclosure.value);
    }
    render_deadline(&statement.deadline);
}

fn demo_findings() -> Vec<DamageItemDraft> {
    let finding = |description: &str, location: &str, cents: i64| DamageItemDraft {
        description: description.to_string(),
        location: Some(location.to_string()),
        repair_cost: Decimal::new(cents, 2),
        is_normal_wear: false,
        is_pre_existing: false,
        photo_urls: Vec::new(),
        notes: None,
        move_in_item_id: None,
    };

    vec![
        finding("Replace cracked faucet handle", "Kitchen", 85_00),
        finding("Replace missing blinds", "Bedroom", 62_50),
        DamageItemDraft {
            is_normal_wear: true,
            ..finding("Carpet traffic wear", "Living Room", 240_00)
        },
    ]
}
