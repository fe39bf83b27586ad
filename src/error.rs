use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Terminal errors for engine entry points. A failed call leaves no
/// observable mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("token is the zero address")]
    ZeroAddress,
    #[error("amount must be greater than zero")]
    InvalidAmount,
    #[error("number of swaps out of range")]
    InvalidNoOfSwaps,
    #[error("from and to must differ")]
    InvalidToken,
    #[error("token not allowed")]
    UnauthorizedTokens,
    #[error("interval not allowed")]
    InvalidInterval,
    #[error("rate truncates to zero")]
    InvalidRate,
    #[error("modification changes nothing")]
    NoChanges,
    #[error("unknown position")]
    InvalidPosition,
    #[error("caller not authorized")]
    UnauthorizedCaller,
    #[error("no swap available for the pair")]
    NoAvailableSwap,
    #[error("declared amount does not match the aggregate")]
    InvalidSwapAmount,
    #[error("delivered amount below the declared minimum")]
    InvalidReturnAmount,
    #[error("swap execution failed: {0}")]
    SwapCallFailed(String),
    #[error("blank swap requires an empty current window with deferred amount")]
    InvalidBlankSwap,
    #[error("nothing swapped to withdraw")]
    ZeroSwappedTokens,
    #[error("engine is paused")]
    Paused,
    #[error("custody: {0}")]
    Custody(String),
}

/// HTTP-facing error: engine errors plus request-shape problems.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Engine(err) => match err {
                EngineError::InvalidPosition => StatusCode::NOT_FOUND,
                EngineError::UnauthorizedCaller => StatusCode::FORBIDDEN,
                EngineError::Paused => StatusCode::CONFLICT,
                EngineError::SwapCallFailed(_) | EngineError::Custody(_) => {
                    StatusCode::BAD_GATEWAY
                }
                _ => StatusCode::BAD_REQUEST,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_display() {
        assert_eq!(
            EngineError::ZeroSwappedTokens.to_string(),
            "nothing swapped to withdraw"
        );
        assert_eq!(
            EngineError::SwapCallFailed("boom".into()).to_string(),
            "swap execution failed: boom"
        );
    }
}
