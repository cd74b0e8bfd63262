use serde::{Deserialize, Serialize};

use crate::{
    containers::{Crosslink, PendingAttestation, Validator},
    primitives::{Epoch, Shard, Slot, H256},
};

/// Snapshot of the beacon chain as seen by epoch processing.
///
/// Collections are plain vectors because nothing here needs Merkleization.
/// `latest_block_roots` is a ring buffer of length `Config.slots_per_historical_root`
/// indexed by `slot % slots_per_historical_root`.
#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BeaconState {
    // > Misc
    pub slot: Slot,

    // > Validator registry
    pub validators: Vec<Validator>,

    // > Randomness and committees
    pub previous_shuffling_start_shard: Shard,
    pub current_shuffling_start_shard: Shard,
    pub previous_shuffling_epoch: Epoch,
    pub current_shuffling_epoch: Epoch,
    pub previous_shuffling_seed: H256,
    pub current_shuffling_seed: H256,

    // > Recent state
    pub latest_crosslinks: Vec<Crosslink>,
    pub latest_block_roots: Vec<H256>,
    pub latest_attestations: Vec<PendingAttestation>,
}
