use crate::api::{caller, AppState};
use crate::domain::{Address, Amount, PositionId, Token};
use crate::engine::{CreateRequest, PositionDetails};
use crate::error::ApiError;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub(crate) fn parse_token(raw: &str, field: &str) -> Result<Token, ApiError> {
    Token::from_str(raw).map_err(|e| ApiError::BadRequest(format!("invalid {}: {}", field, e)))
}

pub(crate) fn parse_address(raw: &str, field: &str) -> Result<Address, ApiError> {
    Address::from_str(raw).map_err(|e| ApiError::BadRequest(format!("invalid {}: {}", field, e)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
    pub from: String,
    pub to: String,
    pub interval_seconds: u64,
    pub amount: Amount,
    pub no_of_swaps: u64,
}

impl CreateBody {
    fn into_request(self) -> Result<CreateRequest, ApiError> {
        Ok(CreateRequest {
            from: parse_token(&self.from, "from")?,
            to: parse_token(&self.to, "to")?,
            interval_seconds: self.interval_seconds,
            amount: self.amount,
            no_of_swaps: self.no_of_swaps,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse {
    pub position_id: u64,
    pub rate: Amount,
    pub starting_swap: u64,
    pub final_swap: u64,
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateBody>,
) -> Result<(StatusCode, Json<CreateResponse>), ApiError> {
    let caller = caller(&headers)?;
    let request = body.into_request()?;

    let mut engine = state.engine();
    let id = engine.create_position(&caller, request)?;
    let position = engine
        .position(id)
        .expect("created position must exist")
        .clone();
    Ok((
        StatusCode::CREATED,
        Json(CreateResponse {
            position_id: id.as_u64(),
            rate: position.rate,
            starting_swap: position.starting_swap,
            final_swap: position.final_swap,
        }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchBody {
    pub positions: Vec<CreateBody>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchResponse {
    pub position_ids: Vec<u64>,
}

pub async fn create_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateBatchBody>,
) -> Result<(StatusCode, Json<CreateBatchResponse>), ApiError> {
    let caller = caller(&headers)?;
    let requests = body
        .positions
        .into_iter()
        .map(CreateBody::into_request)
        .collect::<Result<Vec<_>, _>>()?;

    let ids = state.engine().create_positions_batch(&caller, requests)?;
    Ok((
        StatusCode::CREATED,
        Json(CreateBatchResponse {
            position_ids: ids.iter().map(|id| id.as_u64()).collect(),
        }),
    ))
}

pub async fn details(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<PositionDetails>, ApiError> {
    let details = state.engine().position_details(PositionId::new(id))?;
    Ok(Json(details))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyBody {
    pub amount: Amount,
    pub no_of_swaps: u64,
    pub is_increase: bool,
}

pub async fn modify(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(body): Json<ModifyBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = caller(&headers)?;
    state.engine().modify_position(
        &caller,
        PositionId::new(id),
        body.amount,
        body.no_of_swaps,
        body.is_increase,
    )?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientBody {
    pub recipient: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawResponse {
    pub swapped: Amount,
}

pub async fn withdraw(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(body): Json<RecipientBody>,
) -> Result<Json<WithdrawResponse>, ApiError> {
    let caller = caller(&headers)?;
    let recipient = parse_address(&body.recipient, "recipient")?;
    let swapped = state
        .engine()
        .withdraw_swapped(&caller, PositionId::new(id), &recipient)?;
    Ok(Json(WithdrawResponse { swapped }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminateResponse {
    pub unswapped: Amount,
    pub swapped: Amount,
}

pub async fn terminate(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(body): Json<RecipientBody>,
) -> Result<Json<TerminateResponse>, ApiError> {
    let caller = caller(&headers)?;
    let recipient = parse_address(&body.recipient, "recipient")?;
    let (unswapped, swapped) =
        state
            .engine()
            .terminate_position(&caller, PositionId::new(id), &recipient)?;
    Ok(Json(TerminateResponse { unswapped, swapped }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferBody {
    pub new_owner: String,
}

pub async fn transfer(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(body): Json<TransferBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = caller(&headers)?;
    let new_owner = parse_address(&body.new_owner, "newOwner")?;
    state
        .engine()
        .transfer_ownership(&caller, PositionId::new(id), new_owner)?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}
