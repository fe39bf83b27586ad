//! Pair and triple keys for the aggregated swap streams.

use crate::domain::{IntervalMask, Token};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An ordered (from, to) token pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairKey {
    pub from: Token,
    pub to: Token,
}

impl PairKey {
    pub fn new(from: Token, to: Token) -> Self {
        PairKey { from, to }
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.from, self.to)
    }
}

impl FromStr for PairKey {
    type Err = PairParseError;

    /// Parse "fromAddress:toAddress".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s.split_once(':').ok_or(PairParseError)?;
        Ok(PairKey {
            from: Token::from_str(from).map_err(|_| PairParseError)?,
            to: Token::from_str(to).map_err(|_| PairParseError)?,
        })
    }
}

/// Error parsing a pair from its "from:to" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairParseError;

impl std::fmt::Display for PairParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pair must be 'fromAddress:toAddress'")
    }
}

impl std::error::Error for PairParseError {}

/// The (from, to, interval) key identifying one aggregated batch stream.
/// All positions sharing a triple swap together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TripleKey {
    pub from: Token,
    pub to: Token,
    pub mask: IntervalMask,
}

impl TripleKey {
    pub fn new(from: Token, to: Token, mask: IntervalMask) -> Self {
        TripleKey { from, to, mask }
    }

    pub fn from_pair(pair: &PairKey, mask: IntervalMask) -> Self {
        TripleKey {
            from: pair.from.clone(),
            to: pair.to.clone(),
            mask,
        }
    }

    pub fn pair(&self) -> PairKey {
        PairKey::new(self.from.clone(), self.to.clone())
    }
}

impl std::fmt::Display for TripleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}@{}", self.from, self.to, self.mask)
    }
}
