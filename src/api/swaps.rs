use crate::api::{caller, AppState};
use crate::domain::{Amount, IntervalMask, PairKey};
use crate::engine::SwapRequest;
use crate::error::ApiError;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::positions::{parse_address, parse_token};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapPairBody {
    pub from: String,
    pub to: String,
    pub amount: Amount,
    pub min_out: Amount,
    #[serde(default)]
    pub exec_data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapBody {
    pub pairs: Vec<SwapPairBody>,
    pub reward_recipient: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapOutcomeDto {
    pub from: String,
    pub to: String,
    pub intervals_in_swap: Vec<u64>,
    pub total_input: Amount,
    pub delivered: Amount,
    pub operator_reward: Amount,
    pub platform_fee: Amount,
}

pub async fn swap(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SwapBody>,
) -> Result<Json<Vec<SwapOutcomeDto>>, ApiError> {
    let caller = caller(&headers)?;
    let reward_recipient = parse_address(&body.reward_recipient, "rewardRecipient")?;
    let batch = body
        .pairs
        .into_iter()
        .map(|p| {
            Ok(SwapRequest {
                from: parse_token(&p.from, "from")?,
                to: parse_token(&p.to, "to")?,
                amount: p.amount,
                min_out: p.min_out,
                exec_data: p.exec_data,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let outcomes = state.engine().swap(&caller, batch, &reward_recipient)?;
    Ok(Json(
        outcomes
            .into_iter()
            .map(|o| SwapOutcomeDto {
                from: o.from.to_string(),
                to: o.to.to_string(),
                intervals_in_swap: o.intervals_in_swap.iter().map(|m| m.seconds()).collect(),
                total_input: o.total_input,
                delivered: o.delivered,
                operator_reward: o.operator_reward,
                platform_fee: o.platform_fee,
            })
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlankSwapBody {
    pub from: String,
    pub to: String,
    pub interval_seconds: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlankSwapResponse {
    pub performed_swaps: u64,
}

pub async fn blank_swap(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<BlankSwapBody>,
) -> Result<Json<BlankSwapResponse>, ApiError> {
    let caller = caller(&headers)?;
    let from = parse_token(&body.from, "from")?;
    let to = parse_token(&body.to, "to")?;
    let mask = IntervalMask::from_seconds(body.interval_seconds)
        .ok_or_else(|| ApiError::BadRequest("unknown interval".into()))?;

    let performed_swaps = state.engine().blank_swap(&caller, from, to, mask)?;
    Ok(Json(BlankSwapResponse { performed_swaps }))
}

#[derive(Debug, Deserialize)]
pub struct PairsQuery {
    /// Comma-separated "from:to" pairs.
    pub pairs: String,
}

fn parse_pairs(raw: &str) -> Result<Vec<PairKey>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            PairKey::from_str(s).map_err(|e| ApiError::BadRequest(format!("invalid pair: {}", e)))
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextSwapInfoDto {
    pub from: String,
    pub to: String,
    pub total_input: Amount,
    pub intervals_in_swap: Vec<u64>,
    pub operator_reward: Amount,
    pub platform_fee: Amount,
}

pub async fn next_swap_info(
    State(state): State<AppState>,
    Query(query): Query<PairsQuery>,
) -> Result<Json<Vec<NextSwapInfoDto>>, ApiError> {
    let pairs = parse_pairs(&query.pairs)?;
    let engine = state.engine();
    Ok(Json(
        pairs
            .iter()
            .map(|pair| {
                let info = engine.next_swap_info(pair);
                NextSwapInfoDto {
                    from: pair.from.to_string(),
                    to: pair.to.to_string(),
                    total_input: info.total_input,
                    intervals_in_swap: info.intervals_in_swap.iter().map(|m| m.seconds()).collect(),
                    operator_reward: info.operator_reward,
                    platform_fee: info.platform_fee,
                }
            })
            .collect(),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownDto {
    pub from: String,
    pub to: String,
    /// Seconds until the next swap; null when nothing is scheduled.
    pub seconds: Option<u64>,
}

pub async fn countdown(
    State(state): State<AppState>,
    Query(query): Query<PairsQuery>,
) -> Result<Json<Vec<CountdownDto>>, ApiError> {
    let pairs = parse_pairs(&query.pairs)?;
    let engine = state.engine();
    Ok(Json(
        pairs
            .iter()
            .map(|pair| {
                let seconds = engine.seconds_until_next_swap(pair);
                CountdownDto {
                    from: pair.from.to_string(),
                    to: pair.to.to_string(),
                    seconds: (seconds != u64::MAX).then_some(seconds),
                }
            })
            .collect(),
    ))
}
