//! HTTP request handlers

use super::AppState;
use super::error::ApiError;
use crate::domain::item::Item;
use crate::domain::machine::{Delivery, Outcome, Snapshot, StateKind, TransitionInput};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/addvm", post(add_machine))
        .route("/insert", post(insert_funds))
        .route("/select", post(select_product))
        .route("/abort", post(abort))
        // Data-driven variant: the machine state decides what the data means.
        .route("/sm/insert", post(transit))
        .route("/sm/select", post(transit))
        .route("/sm/deliver", post(transit))
        .route("/machines/:id", get(get_machine))
        .with_state(state)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddMachineRequest {
    #[serde(default)]
    pub inventory: Vec<Item>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddMachineResponse {
    pub machine_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InsertFundsRequest {
    pub machine_id: String,
    pub inserted_amount: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SelectProductRequest {
    pub machine_id: String,
    pub selected_product: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AbortRequest {
    pub machine_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub machine_id: String,
    #[serde(default)]
    pub data: TransitionInput,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransitionResponse {
    pub state: StateKind,
    pub outcome: Outcome,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn add_machine(
    State(state): State<AppState>,
    payload: Result<Json<AddMachineRequest>, JsonRejection>,
) -> Result<Json<AddMachineResponse>, ApiError> {
    let Json(req) = payload?;
    let machine_id = state.service.add_machine(req.inventory).await?;
    Ok(Json(AddMachineResponse { machine_id }))
}

async fn insert_funds(
    State(state): State<AppState>,
    payload: Result<Json<InsertFundsRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    let amount = req
        .inserted_amount
        .ok_or_else(|| ApiError::BadRequest("no amount inserted".to_string()))?;

    state.service.insert_funds(&req.machine_id, amount).await?;
    Ok(MessageResponse::new("inserted coin successfully"))
}

/// Selects and delivers in one request.
async fn select_product(
    State(state): State<AppState>,
    payload: Result<Json<SelectProductRequest>, JsonRejection>,
) -> Result<Json<Delivery>, ApiError> {
    let Json(req) = payload?;
    let product = req
        .selected_product
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("no product was selected".to_string()))?;

    let delivery = state.service.purchase(&req.machine_id, &product).await?;
    Ok(Json(delivery))
}

async fn abort(
    State(state): State<AppState>,
    payload: Result<Json<AbortRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    state.service.abort(&req.machine_id).await?;
    Ok(MessageResponse::new("aborted successfully"))
}

async fn transit(
    State(state): State<AppState>,
    payload: Result<Json<TransitionRequest>, JsonRejection>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let Json(req) = payload?;
    let (outcome, snapshot) = state.service.transit(&req.machine_id, req.data).await?;
    Ok(Json(TransitionResponse {
        state: snapshot.state,
        outcome,
    }))
}

async fn get_machine(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Snapshot>, ApiError> {
    Ok(Json(state.service.snapshot(&id).await?))
}
