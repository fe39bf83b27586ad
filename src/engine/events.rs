//! Event records, one per user-visible mutation.

use crate::domain::{Address, Amount, PositionId, Token};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    #[serde(rename_all = "camelCase")]
    Created {
        position_id: PositionId,
        owner: Address,
        from: Token,
        to: Token,
        interval_seconds: u64,
        rate: Amount,
        starting_swap: u64,
        final_swap: u64,
    },
    #[serde(rename_all = "camelCase")]
    CreatedBatched { position_ids: Vec<PositionId> },
    #[serde(rename_all = "camelCase")]
    Modified {
        position_id: PositionId,
        rate: Amount,
        starting_swap: u64,
        final_swap: u64,
    },
    #[serde(rename_all = "camelCase")]
    Terminated {
        position_id: PositionId,
        recipient: Address,
        unswapped: Amount,
        swapped: Amount,
    },
    #[serde(rename_all = "camelCase")]
    Withdrawn {
        position_id: PositionId,
        recipient: Address,
        swapped: Amount,
    },
    #[serde(rename_all = "camelCase")]
    PositionOwnerUpdated {
        position_id: PositionId,
        previous_owner: Address,
        new_owner: Address,
    },
    #[serde(rename_all = "camelCase")]
    Swapped {
        from: Token,
        to: Token,
        intervals: u8,
        total_input: Amount,
        delivered: Amount,
        operator_reward: Amount,
        platform_fee: Amount,
    },
    #[serde(rename_all = "camelCase")]
    BlankSwapped {
        from: Token,
        to: Token,
        interval_seconds: u64,
        performed_swaps: u64,
    },
}
