//! HTTP surface over the engine.
//!
//! The engine itself is synchronous; the router serializes every entry
//! point behind one engine-wide lock, which doubles as the write lock the
//! swap path needs across execute-and-register.

pub mod admin;
pub mod health;
pub mod positions;
pub mod swaps;

use crate::domain::Address;
use crate::engine::Engine;
use crate::error::ApiError;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<Engine>>,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        AppState {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn engine(&self) -> MutexGuard<'_, Engine> {
        self.engine.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Caller identity from the `x-caller` header. Authentication is the
/// fronting host's job; the engine only needs a consistent identity.
pub(crate) fn caller(headers: &HeaderMap) -> Result<Address, ApiError> {
    let value = headers
        .get("x-caller")
        .ok_or_else(|| ApiError::BadRequest("missing x-caller header".into()))?;
    let raw = value
        .to_str()
        .map_err(|_| ApiError::BadRequest("x-caller is not valid ascii".into()))?;
    Address::from_str(raw).map_err(|e| ApiError::BadRequest(format!("invalid x-caller: {}", e)))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/positions", post(positions::create))
        .route("/v1/positions/batch", post(positions::create_batch))
        .route("/v1/positions/:id", get(positions::details))
        .route("/v1/positions/:id/modify", post(positions::modify))
        .route("/v1/positions/:id/withdraw", post(positions::withdraw))
        .route("/v1/positions/:id/terminate", post(positions::terminate))
        .route("/v1/positions/:id/transfer", post(positions::transfer))
        .route("/v1/swaps", post(swaps::swap))
        .route("/v1/swaps/blank", post(swaps::blank_swap))
        .route("/v1/swaps/next", get(swaps::next_swap_info))
        .route("/v1/swaps/countdown", get(swaps::countdown))
        .route("/v1/admin/pause", post(admin::pause))
        .route("/v1/admin/unpause", post(admin::unpause))
        .route("/v1/admin/tokens/add", post(admin::allow_token))
        .route("/v1/admin/tokens/remove", post(admin::disallow_token))
        .route("/v1/admin/intervals/add", post(admin::allow_interval))
        .route("/v1/admin/intervals/remove", post(admin::disallow_interval))
        .route("/v1/admin/fees/swap", post(admin::set_swap_fee))
        .route("/v1/admin/fees/platform-ratio", post(admin::set_platform_fee_ratio))
        .route("/v1/admin/fees/vault", post(admin::set_fee_vault))
        .route("/v1/admin/limits/max-swaps", post(admin::set_max_no_of_swaps))
        .route("/v1/admin/limits/threshold-guard", post(admin::set_threshold_guard))
        .route("/v1/admin/roles/admins/add", post(admin::add_admin))
        .route("/v1/admin/roles/admins/remove", post(admin::remove_admin))
        .route("/v1/admin/roles/executors/add", post(admin::add_swap_executor))
        .route("/v1/admin/roles/executors/remove", post(admin::remove_swap_executor))
        .with_state(state)
}
