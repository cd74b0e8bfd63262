use thiserror::Error;
use types::{
    nonstandard::ErrorKind,
    primitives::{Epoch, Shard, Slot, ValidatorIndex},
};

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "aggregation bitfield length {aggregation_bitfield_length} \
         does not match committee length {committee_length}"
    )]
    CommitteeLengthMismatch {
        aggregation_bitfield_length: usize,
        committee_length: usize,
    },
    #[error(
        "block root history has length {actual} \
         but SLOTS_PER_HISTORICAL_ROOT is {expected}"
    )]
    BlockRootHistoryLengthMismatch { expected: u64, actual: usize },
    #[error("total balance overflowed")]
    BalanceOverflow,
    #[error(
        "epoch {epoch} is neither the previous ({previous_epoch}) \
         nor the current ({current_epoch}) epoch"
    )]
    EpochOutOfRange {
        epoch: Epoch,
        previous_epoch: Epoch,
        current_epoch: Epoch,
    },
    #[error("no committee is assigned to shard {shard} at slot {slot}")]
    NoCommitteeForShard { slot: Slot, shard: Shard },
    #[error("shard {shard} is not below SHARD_COUNT ({shard_count})")]
    ShardAboveShardCount { shard: Shard, shard_count: u64 },
    #[error("shard {shard} is outside crosslink table of length {crosslink_count}")]
    ShardOutOfRange { shard: Shard, crosslink_count: usize },
    #[error("block root for slot {slot} is not retained by state at slot {state_slot}")]
    SlotOutOfRange { slot: Slot, state_slot: Slot },
    #[error("validator index {validator_index} is outside registry of length {validator_count}")]
    ValidatorIndexOutOfBounds {
        validator_index: ValidatorIndex,
        validator_count: usize,
    },
}

impl Error {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EpochOutOfRange { .. }
            | Self::NoCommitteeForShard { .. }
            | Self::SlotOutOfRange { .. } => ErrorKind::Lookup,
            Self::CommitteeLengthMismatch { .. }
            | Self::BlockRootHistoryLengthMismatch { .. }
            | Self::BalanceOverflow
            | Self::ShardAboveShardCount { .. }
            | Self::ShardOutOfRange { .. }
            | Self::ValidatorIndexOutOfBounds { .. } => ErrorKind::InvariantViolation,
        }
    }
}
