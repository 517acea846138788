use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use super::clock::Clock;
use super::domain::{
    DamageItemDraft, DamageItemId, DeliveryMethod, DispositionError, ErrorKind, InspectionId,
    LeaseId, RefundMethod,
};
use super::repository::DispositionStore;
use super::service::DispositionService;

#[derive(Debug, Deserialize)]
pub struct InitiateMoveOutRequest {
    pub move_out_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendLetterRequest {
    pub method: DeliveryMethod,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DisputeRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub method: RefundMethod,
    #[serde(default)]
    pub check_number: Option<String>,
    pub amount: Decimal,
}

type SharedService<S, C> = State<Arc<DispositionService<S, C>>>;

/// Router builder exposing the disposition lifecycle over HTTP.
pub fn disposition_router<S, C>(service: Arc<DispositionService<S, C>>) -> Router
where
    S: DispositionStore + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route(
            "/api/v1/leases/:lease_id/move-out",
            post(initiate_handler::<S, C>),
        )
        .route(
            "/api/v1/leases/:lease_id/disposition",
            get(disposition_handler::<S, C>),
        )
        .route(
            "/api/v1/leases/:lease_id/disposition/recalculate",
            post(recalculate_handler::<S, C>),
        )
        .route(
            "/api/v1/leases/:lease_id/disposition/review",
            post(review_handler::<S, C>),
        )
        .route(
            "/api/v1/leases/:lease_id/disposition/send",
            post(send_handler::<S, C>),
        )
        .route(
            "/api/v1/leases/:lease_id/disposition/dispute",
            post(dispute_handler::<S, C>),
        )
        .route(
            "/api/v1/leases/:lease_id/disposition/refund",
            post(refund_handler::<S, C>),
        )
        .route(
            "/api/v1/leases/:lease_id/disposition/deadline",
            get(deadline_handler::<S, C>),
        )
        .route(
            "/api/v1/leases/:lease_id/disposition/statement",
            get(statement_handler::<S, C>),
        )
        .route(
            "/api/v1/leases/:lease_id/inspections/comparison",
            get(comparison_handler::<S, C>),
        )
        .route(
            "/api/v1/inspections/:inspection_id/damage-items",
            post(create_damage_handler::<S, C>).get(list_damage_handler::<S, C>),
        )
        .route(
            "/api/v1/inspections/:inspection_id/damage-items/:item_id",
            put(update_damage_handler::<S, C>).delete(delete_damage_handler::<S, C>),
        )
        .with_state(service)
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict | ErrorKind::InvalidTransition => StatusCode::CONFLICT,
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: DispositionError) -> Response {
    let status = status_for(error.kind());
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(
    status: StatusCode,
    result: Result<T, DispositionError>,
) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn initiate_handler<S, C>(
    State(service): SharedService<S, C>,
    Path(lease_id): Path<String>,
    Json(request): Json<InitiateMoveOutRequest>,
) -> Response
where
    S: DispositionStore + 'static,
    C: Clock + 'static,
{
    let lease_id = LeaseId(lease_id);
    let result = service
        .initiate_move_out(&lease_id, request.move_out_date, request.notes)
        .await;
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn disposition_handler<S, C>(
    State(service): SharedService<S, C>,
    Path(lease_id): Path<String>,
) -> Response
where
    S: DispositionStore + 'static,
    C: Clock + 'static,
{
    respond(StatusCode::OK, service.disposition(&LeaseId(lease_id)).await)
}

pub(crate) async fn recalculate_handler<S, C>(
    State(service): SharedService<S, C>,
    Path(lease_id): Path<String>,
) -> Response
where
    S: DispositionStore + 'static,
    C: Clock + 'static,
{
    let result = service.recalculate_disposition(&LeaseId(lease_id)).await;
    respond(StatusCode::OK, result)
}

pub(crate) async fn review_handler<S, C>(
    State(service): SharedService<S, C>,
    Path(lease_id): Path<String>,
) -> Response
where
    S: DispositionStore + 'static,
    C: Clock + 'static,
{
    respond(
        StatusCode::OK,
        service.submit_for_review(&LeaseId(lease_id)).await,
    )
}

pub(crate) async fn send_handler<S, C>(
    State(service): SharedService<S, C>,
    Path(lease_id): Path<String>,
    Json(request): Json<SendLetterRequest>,
) -> Response
where
    S: DispositionStore + 'static,
    C: Clock + 'static,
{
    let result = service
        .send_disposition_letter(&LeaseId(lease_id), request.method, request.tracking_number)
        .await;
    respond(StatusCode::OK, result)
}

pub(crate) async fn dispute_handler<S, C>(
    State(service): SharedService<S, C>,
    Path(lease_id): Path<String>,
    Json(request): Json<DisputeRequest>,
) -> Response
where
    S: DispositionStore + 'static,
    C: Clock + 'static,
{
    let result = service
        .record_dispute(&LeaseId(lease_id), request.reason)
        .await;
    respond(StatusCode::OK, result)
}

pub(crate) async fn refund_handler<S, C>(
    State(service): SharedService<S, C>,
    Path(lease_id): Path<String>,
    Json(request): Json<RefundRequest>,
) -> Response
where
    S: DispositionStore + 'static,
    C: Clock + 'static,
{
    let RefundRequest {
        method,
        check_number,
        amount,
    } = request;
    let result = service
        .process_refund(&LeaseId(lease_id), method, check_number, amount)
        .await;
    respond(StatusCode::OK, result)
}

pub(crate) async fn deadline_handler<S, C>(
    State(service): SharedService<S, C>,
    Path(lease_id): Path<String>,
) -> Response
where
    S: DispositionStore + 'static,
    C: Clock + 'static,
{
    respond(
        StatusCode::OK,
        service.deadline_status(&LeaseId(lease_id)).await,
    )
}

pub(crate) async fn statement_handler<S, C>(
    State(service): SharedService<S, C>,
    Path(lease_id): Path<String>,
) -> Response
where
    S: DispositionStore + 'static,
    C: Clock + 'static,
{
    respond(StatusCode::OK, service.statement(&LeaseId(lease_id)).await)
}

pub(crate) async fn comparison_handler<S, C>(
    State(service): SharedService<S, C>,
    Path(lease_id): Path<String>,
) -> Response
where
    S: DispositionStore + 'static,
    C: Clock + 'static,
{
    respond(
        StatusCode::OK,
        service.compare_inspections(&LeaseId(lease_id)).await,
    )
}

pub(crate) async fn list_damage_handler<S, C>(
    State(service): SharedService<S, C>,
    Path(inspection_id): Path<String>,
) -> Response
where
    S: DispositionStore + 'static,
    C: Clock + 'static,
{
    respond(
        StatusCode::OK,
        service.damage_items(&InspectionId(inspection_id)).await,
    )
}

pub(crate) async fn create_damage_handler<S, C>(
    State(service): SharedService<S, C>,
    Path(inspection_id): Path<String>,
    Json(draft): Json<DamageItemDraft>,
) -> Response
where
    S: DispositionStore + 'static,
    C: Clock + 'static,
{
    let result = service
        .record_damage_item(&InspectionId(inspection_id), draft)
        .await
        .map(|outcome| json!({ "item": outcome.item, "disposition": outcome.disposition }));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn update_damage_handler<S, C>(
    State(service): SharedService<S, C>,
    Path((inspection_id, item_id)): Path<(String, String)>,
    Json(draft): Json<DamageItemDraft>,
) -> Response
where
    S: DispositionStore + 'static,
    C: Clock + 'static,
{
    let result = service
        .update_damage_item(&InspectionId(inspection_id), &DamageItemId(item_id), draft)
        .await
        .map(|outcome| json!({ "item": outcome.item, "disposition": outcome.disposition }));
    respond(StatusCode::OK, result)
}

pub(crate) async fn delete_damage_handler<S, C>(
    State(service): SharedService<S, C>,
    Path((inspection_id, item_id)): Path<(String, String)>,
) -> Response
where
    S: DispositionStore + 'static,
    C: Clock + 'static,
{
    let result = service
        .delete_damage_item(&InspectionId(inspection_id), &DamageItemId(item_id))
        .await
        .map(|outcome| json!({ "item": outcome.item, "disposition": outcome.disposition }));
    respond(StatusCode::OK, result)
}
