//! Admin endpoints, one per configuration operation.

use crate::api::positions::{parse_address, parse_token};
use crate::api::{caller, AppState};
use crate::domain::IntervalMask;
use crate::error::ApiError;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

fn ok() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

fn parse_interval(seconds: u64) -> Result<IntervalMask, ApiError> {
    IntervalMask::from_seconds(seconds)
        .ok_or_else(|| ApiError::BadRequest("unknown interval".into()))
}

pub async fn pause(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = caller(&headers)?;
    state.engine().pause(&caller)?;
    Ok(ok())
}

pub async fn unpause(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = caller(&headers)?;
    state.engine().unpause(&caller)?;
    Ok(ok())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBody {
    pub token: String,
    #[serde(default)]
    pub decimals: Option<u32>,
}

pub async fn allow_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<TokenBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = caller(&headers)?;
    let token = parse_token(&body.token, "token")?;
    let decimals = body.decimals.unwrap_or(18);
    state.engine().allow_token(&caller, token, decimals)?;
    Ok(ok())
}

pub async fn disallow_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<TokenBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = caller(&headers)?;
    let token = parse_token(&body.token, "token")?;
    state.engine().disallow_token(&caller, &token)?;
    Ok(ok())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalBody {
    pub interval_seconds: u64,
}

pub async fn allow_interval(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<IntervalBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = caller(&headers)?;
    let mask = parse_interval(body.interval_seconds)?;
    state.engine().allow_interval(&caller, mask)?;
    Ok(ok())
}

pub async fn disallow_interval(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<IntervalBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = caller(&headers)?;
    let mask = parse_interval(body.interval_seconds)?;
    state.engine().disallow_interval(&caller, mask)?;
    Ok(ok())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapFeeBody {
    pub interval_seconds: u64,
    pub fee_bps: u16,
}

pub async fn set_swap_fee(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SwapFeeBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = caller(&headers)?;
    let mask = parse_interval(body.interval_seconds)?;
    state.engine().set_swap_fee(&caller, mask, body.fee_bps)?;
    Ok(ok())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformRatioBody {
    pub ratio_bps: u16,
}

pub async fn set_platform_fee_ratio(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<PlatformRatioBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = caller(&headers)?;
    state
        .engine()
        .set_platform_fee_ratio(&caller, body.ratio_bps)?;
    Ok(ok())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultBody {
    pub vault: String,
}

pub async fn set_fee_vault(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<VaultBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = caller(&headers)?;
    let vault = parse_address(&body.vault, "vault")?;
    state.engine().set_fee_vault(&caller, vault)?;
    Ok(ok())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxSwapsBody {
    pub max_no_of_swaps: u64,
}

pub async fn set_max_no_of_swaps(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<MaxSwapsBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = caller(&headers)?;
    state
        .engine()
        .set_max_no_of_swaps(&caller, body.max_no_of_swaps)?;
    Ok(ok())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdGuardBody {
    pub seconds: u64,
}

pub async fn set_threshold_guard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ThresholdGuardBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = caller(&headers)?;
    state.engine().set_threshold_guard(&caller, body.seconds)?;
    Ok(ok())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBody {
    pub address: String,
}

pub async fn add_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AddressBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = caller(&headers)?;
    let admin = parse_address(&body.address, "address")?;
    state.engine().add_admin(&caller, admin)?;
    Ok(ok())
}

pub async fn remove_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AddressBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = caller(&headers)?;
    let admin = parse_address(&body.address, "address")?;
    state.engine().remove_admin(&caller, &admin)?;
    Ok(ok())
}

pub async fn add_swap_executor(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AddressBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = caller(&headers)?;
    let executor = parse_address(&body.address, "address")?;
    state.engine().add_swap_executor(&caller, executor)?;
    Ok(ok())
}

pub async fn remove_swap_executor(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AddressBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = caller(&headers)?;
    let executor = parse_address(&body.address, "address")?;
    state.engine().remove_swap_executor(&caller, &executor)?;
    Ok(ok())
}
