//! Domain primitives: Timestamp, Address, Token, PositionId.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Time in whole seconds since Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Create a Timestamp from seconds.
    pub fn new(secs: u64) -> Self {
        Timestamp(secs)
    }

    /// Current wall-clock time in seconds since Unix epoch.
    pub fn now() -> Self {
        Timestamp(chrono::Utc::now().timestamp().max(0) as u64)
    }

    /// Get the underlying seconds value.
    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Start of the aligned window of length `interval` containing this instant.
    pub fn window_start(&self, interval: u64) -> u64 {
        self.0 / interval * interval
    }
}

/// Account address (hex string).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    /// Create an Address from a string.
    pub fn new(addr: String) -> Self {
        Address(addr)
    }

    /// The all-zero address.
    pub fn zero() -> Self {
        Address(format!("0x{}", "0".repeat(40)))
    }

    /// True if every hex digit is zero.
    pub fn is_zero(&self) -> bool {
        self.0
            .strip_prefix("0x")
            .map(|h| h.chars().all(|c| c == '0'))
            .unwrap_or(false)
    }

    /// Get the address as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    /// Parse an address from a string.
    ///
    /// Requires exactly 42 characters: "0x" prefix + 40 hex digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 42 {
            return Err(AddressParseError::InvalidLength(s.len()));
        }
        if !s.starts_with("0x") {
            return Err(AddressParseError::MissingPrefix);
        }
        let hex_part = &s[2..];
        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressParseError::InvalidHex);
        }
        Ok(Address(s.to_lowercase()))
    }
}

/// Errors that can occur when parsing an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    /// Address must be exactly 42 characters (0x + 40 hex digits).
    InvalidLength(usize),
    /// Address must start with "0x".
    MissingPrefix,
    /// Address must contain only hex digits after the "0x" prefix.
    InvalidHex,
}

impl std::fmt::Display for AddressParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressParseError::InvalidLength(len) => {
                write!(f, "address must be 42 characters, got {}", len)
            }
            AddressParseError::MissingPrefix => {
                write!(f, "address must start with '0x'")
            }
            AddressParseError::InvalidHex => {
                write!(f, "address must contain only hex digits")
            }
        }
    }
}

impl std::error::Error for AddressParseError {}

/// A token, identified by its (wrapped) asset address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Token(pub Address);

impl Token {
    /// Create a Token from an address.
    pub fn new(addr: Address) -> Self {
        Token(addr)
    }

    /// True if the backing address is the all-zero address.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Get the backing address.
    pub fn address(&self) -> &Address {
        &self.0
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Token {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_str(s).map(Token)
    }
}

/// Monotonic position identifier, assigned at creation. Ids start at 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct PositionId(pub u64);

impl PositionId {
    pub fn new(id: u64) -> Self {
        PositionId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PositionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
