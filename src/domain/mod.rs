//! Domain types for the DCA accounting engine.
//!
//! This module provides:
//! - Integer-exact amounts via a 256-bit Amount wrapper
//! - Domain primitives: Timestamp, Address, Token, PositionId
//! - The interval registry (bitmask-encoded swap periods)
//! - Pair/triple keys and the Position record

pub mod amount;
pub mod interval;
pub mod pair;
pub mod position;
pub mod primitives;

pub use amount::{Amount, AmountParseError, BPS_DENOMINATOR};
pub use interval::{IntervalMask, IntervalSet, INTERVAL_SECONDS};
pub use pair::{PairKey, PairParseError, TripleKey};
pub use position::Position;
pub use primitives::{Address, AddressParseError, PositionId, Timestamp, Token};
