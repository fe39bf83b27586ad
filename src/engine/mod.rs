//! The DCA accounting engine.
//!
//! One `Engine` owns every store: positions, per-triple aggregate state,
//! per-pair active-interval bitmaps, and runtime configuration. Entry
//! points are synchronous and serialized by the caller; each validates and
//! computes before it mutates, so a failed call leaves no observable
//! change.

use crate::clock::Clock;
use crate::custody::Custody;
use crate::domain::{
    Address, Amount, IntervalMask, IntervalSet, PairKey, PositionId, Position, Timestamp, Token,
    TripleKey,
};
use crate::error::EngineError;
use crate::executor::TradeExecutor;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub mod admin;
pub mod events;
pub mod positions;
pub mod query;
pub mod schedule;
pub mod state;
pub mod swap;

pub use events::Event;
pub use positions::CreateRequest;
pub use query::PositionDetails;
pub use state::{ActiveIntervals, TripleState, TripleStore};
pub use swap::{NextSwapInfo, PairSwapOutcome, SwapRequest};

/// Construction-time parameters; everything else is runtime admin state.
#[derive(Debug, Clone)]
pub struct EngineParams {
    /// Initial administrator.
    pub governor: Address,
    /// Recipient of the platform share of swap fees.
    pub fee_vault: Address,
    /// Spender granted the one-shot trade allowance per swap.
    pub swap_proxy: Address,
    /// The engine's own custody account (the pool).
    pub self_address: Address,
    /// Upper bound on a position's number of swaps.
    pub max_no_of_swaps: u64,
    /// Safety margin before a window boundary; positions created past it
    /// are deferred to the swap after next.
    pub threshold_guard_secs: u64,
    /// Intervals positions may use.
    pub allowed_intervals: IntervalSet,
}

pub struct Engine {
    // Roles and runtime configuration.
    governor: Address,
    admins: HashSet<Address>,
    swap_executors: HashSet<Address>,
    paused: bool,
    allowed_tokens: HashSet<Token>,
    token_decimals: HashMap<Token, u32>,
    allowed_intervals: IntervalSet,
    swap_fee_bps: [u16; 8],
    platform_fee_ratio_bps: u16,
    fee_vault: Address,
    swap_proxy: Address,
    self_address: Address,
    max_no_of_swaps: u64,
    threshold_guard_secs: u64,

    // Stores.
    positions: HashMap<PositionId, Position>,
    triples: TripleStore,
    active: ActiveIntervals,
    total_created_positions: u64,

    // Collaborators.
    custody: Arc<dyn Custody>,
    executor: Arc<dyn TradeExecutor>,
    clock: Arc<dyn Clock>,

    events: Vec<Event>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("positions", &self.positions.len())
            .field("total_created_positions", &self.total_created_positions)
            .field("paused", &self.paused)
            .finish()
    }
}

impl Engine {
    pub fn new(
        params: EngineParams,
        custody: Arc<dyn Custody>,
        executor: Arc<dyn TradeExecutor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Engine {
            governor: params.governor.clone(),
            admins: HashSet::from([params.governor]),
            swap_executors: HashSet::new(),
            paused: false,
            allowed_tokens: HashSet::new(),
            token_decimals: HashMap::new(),
            allowed_intervals: params.allowed_intervals,
            swap_fee_bps: [0; 8],
            platform_fee_ratio_bps: 0,
            fee_vault: params.fee_vault,
            swap_proxy: params.swap_proxy,
            self_address: params.self_address,
            max_no_of_swaps: params.max_no_of_swaps,
            threshold_guard_secs: params.threshold_guard_secs,
            positions: HashMap::new(),
            triples: TripleStore::new(),
            active: ActiveIntervals::new(),
            total_created_positions: 0,
            custody,
            executor,
            clock,
            events: Vec::new(),
        }
    }

    // --- read access used by queries, the API layer, and tests ---

    pub fn position(&self, id: PositionId) -> Option<&Position> {
        self.positions.get(&id)
    }

    pub fn triple_state(&self, key: &TripleKey) -> Option<&TripleState> {
        self.triples.get(key)
    }

    pub fn active_intervals(&self, pair: &PairKey) -> IntervalSet {
        self.active.get(pair)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn total_created_positions(&self) -> u64 {
        self.total_created_positions
    }

    /// Drain the event log.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    // --- shared internals ---

    pub(crate) fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub(crate) fn emit(&mut self, event: Event) {
        tracing::info!(event = ?event, "engine event");
        self.events.push(event);
    }

    /// `10^decimals` for an asset registered at allow-listing time.
    /// Decimals survive a later allow-list removal so live positions keep
    /// settling.
    pub(crate) fn magnitude(&self, token: &Token) -> Amount {
        let decimals = self.token_decimals.get(token).copied().unwrap_or(18);
        Amount::pow10(decimals)
    }

    pub(crate) fn swap_fee_for(&self, mask: IntervalMask) -> u16 {
        self.swap_fee_bps[mask.bit_index()]
    }

    pub(crate) fn ensure_not_paused(&self) -> Result<(), EngineError> {
        if self.paused {
            return Err(EngineError::Paused);
        }
        Ok(())
    }

    pub(crate) fn ensure_admin(&self, caller: &Address) -> Result<(), EngineError> {
        if !self.admins.contains(caller) {
            return Err(EngineError::UnauthorizedCaller);
        }
        Ok(())
    }

    pub(crate) fn ensure_swap_executor(&self, caller: &Address) -> Result<(), EngineError> {
        if !self.swap_executors.contains(caller) {
            return Err(EngineError::UnauthorizedCaller);
        }
        Ok(())
    }

    pub(crate) fn ensure_token_allowed(&self, token: &Token) -> Result<(), EngineError> {
        if !self.allowed_tokens.contains(token) {
            return Err(EngineError::UnauthorizedTokens);
        }
        Ok(())
    }
}
