pub mod api;
pub mod clock;
pub mod config;
pub mod custody;
pub mod domain;
pub mod engine;
pub mod error;
pub mod executor;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use custody::{Custody, LedgerCustody};
pub use domain::{
    Address, Amount, IntervalMask, IntervalSet, PairKey, Position, PositionId, Timestamp, Token,
    TripleKey,
};
pub use engine::{CreateRequest, Engine, EngineParams, Event, SwapRequest};
pub use error::{ApiError, EngineError};
pub use executor::{FixedPriceExecutor, TradeExecutor};
