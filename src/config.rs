use crate::domain::{Address, IntervalMask, IntervalSet};
use crate::engine::EngineParams;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Default custody account for the engine pool.
const DEFAULT_ENGINE_ADDRESS: &str = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";
/// Default spender for the one-shot trade allowance.
const DEFAULT_SWAP_PROXY: &str = "0xcccccccccccccccccccccccccccccccccccccccc";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub governor: Address,
    pub fee_vault: Address,
    pub swap_proxy: Address,
    pub engine_address: Address,
    pub max_no_of_swaps: u64,
    pub threshold_guard_secs: u64,
    pub allowed_intervals: IntervalSet,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let governor = parse_address(&env_map, "GOVERNOR", None)?;
        let fee_vault = parse_address(&env_map, "FEE_VAULT", None)?;
        let swap_proxy = parse_address(&env_map, "SWAP_PROXY", Some(DEFAULT_SWAP_PROXY))?;
        let engine_address =
            parse_address(&env_map, "ENGINE_ADDRESS", Some(DEFAULT_ENGINE_ADDRESS))?;

        let max_no_of_swaps = env_map
            .get("MAX_NO_OF_SWAPS")
            .map(|s| s.as_str())
            .unwrap_or("4320")
            .parse::<u64>()
            .ok()
            .filter(|&n| n >= 2)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "MAX_NO_OF_SWAPS".to_string(),
                    "must be an integer >= 2".to_string(),
                )
            })?;

        let threshold_guard_secs = env_map
            .get("THRESHOLD_GUARD_SECS")
            .map(|s| s.as_str())
            .unwrap_or("600")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "THRESHOLD_GUARD_SECS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        let allowed_intervals = parse_allowed_intervals(&env_map)?;

        Ok(Config {
            port,
            governor,
            fee_vault,
            swap_proxy,
            engine_address,
            max_no_of_swaps,
            threshold_guard_secs,
            allowed_intervals,
        })
    }

    /// Engine construction parameters derived from this configuration.
    pub fn engine_params(&self) -> EngineParams {
        EngineParams {
            governor: self.governor.clone(),
            fee_vault: self.fee_vault.clone(),
            swap_proxy: self.swap_proxy.clone(),
            self_address: self.engine_address.clone(),
            max_no_of_swaps: self.max_no_of_swaps,
            threshold_guard_secs: self.threshold_guard_secs,
            allowed_intervals: self.allowed_intervals,
        }
    }
}

fn parse_address(
    env_map: &HashMap<String, String>,
    key: &str,
    default: Option<&str>,
) -> Result<Address, ConfigError> {
    let raw = match (env_map.get(key), default) {
        (Some(value), _) => value.as_str(),
        (None, Some(default)) => default,
        (None, None) => return Err(ConfigError::MissingEnv(key.to_string())),
    };
    Address::from_str(raw)
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}

/// Parse ALLOWED_INTERVALS as a comma-separated list of durations in
/// seconds; every registered interval is allowed when unset.
fn parse_allowed_intervals(
    env_map: &HashMap<String, String>,
) -> Result<IntervalSet, ConfigError> {
    let Some(raw) = env_map.get("ALLOWED_INTERVALS") else {
        return Ok(IntervalSet::all());
    };
    let mut set = IntervalSet::empty();
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let seconds = part.parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(
                "ALLOWED_INTERVALS".to_string(),
                format!("'{}' is not a number of seconds", part),
            )
        })?;
        let mask = IntervalMask::from_seconds(seconds).ok_or_else(|| {
            ConfigError::InvalidValue(
                "ALLOWED_INTERVALS".to_string(),
                format!("{}s is not a registered interval", seconds),
            )
        })?;
        set.insert(mask);
    }
    Ok(set)
}
