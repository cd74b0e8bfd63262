use serde::{Deserialize, Serialize};

use crate::primitives::{AggregationBitfield, Epoch, Gwei, Shard, Slot, H256};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AttestationData {
    pub slot: Slot,
    pub shard: Shard,
    pub beacon_block_root: H256,
    pub epoch_boundary_root: H256,
    pub crosslink_data_root: H256,
    pub latest_crosslink: Crosslink,
    pub justified_epoch: Epoch,
    pub justified_block_root: H256,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Crosslink {
    pub epoch: Epoch,
    pub crosslink_data_root: H256,
}

#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PendingAttestation {
    pub aggregation_bitfield: AggregationBitfield,
    pub data: AttestationData,
    pub inclusion_slot: Slot,
}

// The balance lives in the validator record rather than in a parallel list.
// Effective balances are derived from it and never stored.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Validator {
    pub balance: Gwei,
    pub activation_epoch: Epoch,
    pub exit_epoch: Epoch,
}
