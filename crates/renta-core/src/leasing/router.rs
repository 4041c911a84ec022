use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::contracts::ContractDraft;
use super::domain::{ContractId, FloorId, PropertyId, RoomId};
use super::invalidation::CacheInvalidator;
use super::repository::{PortfolioRepository, RepositoryError};
use super::rooms::RoomDraft;
use super::service::{LeasingService, LeasingServiceError};

/// Router builder exposing the leasing endpoints.
pub fn leasing_router<R, C>(service: Arc<LeasingService<R, C>>) -> Router
where
    R: PortfolioRepository + 'static,
    C: CacheInvalidator + 'static,
{
    Router::new()
        .route(
            "/api/v1/properties/:property_id/floors/:floor_id/room-codes",
            get(room_codes_handler::<R, C>),
        )
        .route(
            "/api/v1/properties/:property_id/rooms",
            post(create_room_handler::<R, C>),
        )
        .route(
            "/api/v1/properties/:property_id/contracts/candidates",
            get(contract_candidates_handler::<R, C>),
        )
        .route(
            "/api/v1/properties/:property_id/contracts",
            post(create_contract_handler::<R, C>),
        )
        .route(
            "/api/v1/properties/:property_id/contracts/:contract_id/finalize",
            post(finalize_contract_handler::<R, C>),
        )
        .route(
            "/api/v1/properties/:property_id/contracts/:contract_id/signature",
            post(sign_contract_handler::<R, C>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoomCodesQuery {
    /// Room currently being edited, whose own code stays selectable.
    pub(crate) editing: Option<u64>,
}

pub(crate) async fn room_codes_handler<R, C>(
    State(service): State<Arc<LeasingService<R, C>>>,
    Path((property_id, floor_id)): Path<(u64, u64)>,
    Query(query): Query<RoomCodesQuery>,
) -> Response
where
    R: PortfolioRepository + 'static,
    C: CacheInvalidator + 'static,
{
    let editing = query.editing.map(RoomId);
    match service.room_code_candidates(PropertyId(property_id), FloorId(floor_id), editing) {
        Ok(candidates) => (StatusCode::OK, axum::Json(candidates)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_room_handler<R, C>(
    State(service): State<Arc<LeasingService<R, C>>>,
    Path(property_id): Path<u64>,
    axum::Json(draft): axum::Json<RoomDraft>,
) -> Response
where
    R: PortfolioRepository + 'static,
    C: CacheInvalidator + 'static,
{
    match service.create_room(PropertyId(property_id), draft) {
        Ok(room) => (StatusCode::CREATED, axum::Json(room)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn contract_candidates_handler<R, C>(
    State(service): State<Arc<LeasingService<R, C>>>,
    Path(property_id): Path<u64>,
) -> Response
where
    R: PortfolioRepository + 'static,
    C: CacheInvalidator + 'static,
{
    match service.contract_candidates(PropertyId(property_id)) {
        Ok(candidates) => (StatusCode::OK, axum::Json(candidates)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_contract_handler<R, C>(
    State(service): State<Arc<LeasingService<R, C>>>,
    Path(property_id): Path<u64>,
    axum::Json(draft): axum::Json<ContractDraft>,
) -> Response
where
    R: PortfolioRepository + 'static,
    C: CacheInvalidator + 'static,
{
    match service.create_contract(PropertyId(property_id), draft) {
        Ok(contract) => (StatusCode::CREATED, axum::Json(contract)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn finalize_contract_handler<R, C>(
    State(service): State<Arc<LeasingService<R, C>>>,
    Path((property_id, contract_id)): Path<(u64, u64)>,
) -> Response
where
    R: PortfolioRepository + 'static,
    C: CacheInvalidator + 'static,
{
    match service.finalize_contract(PropertyId(property_id), ContractId(contract_id)) {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn sign_contract_handler<R, C>(
    State(service): State<Arc<LeasingService<R, C>>>,
    Path((property_id, contract_id)): Path<(u64, u64)>,
) -> Response
where
    R: PortfolioRepository + 'static,
    C: CacheInvalidator + 'static,
{
    match service.sign_contract(PropertyId(property_id), ContractId(contract_id)) {
        Ok(contract) => (StatusCode::OK, axum::Json(contract)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: LeasingServiceError) -> Response {
    let status = match &error {
        LeasingServiceError::Room(_) | LeasingServiceError::Contract(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LeasingServiceError::State(_)
        | LeasingServiceError::RoomUnavailable(_)
        | LeasingServiceError::TenantUnavailable(_)
        | LeasingServiceError::SignatureNotAllowed(_) => StatusCode::CONFLICT,
        LeasingServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        LeasingServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        LeasingServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
