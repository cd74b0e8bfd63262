use helper_functions::{
    accessors,
    committees::{CommitteeCache, CrosslinkCommittee},
    misc,
};
use types::{
    beacon_state::BeaconState,
    config::Config,
    consts::FAR_FUTURE_EPOCH,
    containers::{AttestationData, Crosslink, PendingAttestation, Validator},
    nonstandard::RelativeEpoch,
    primitives::{AggregationBitfield, Gwei, Shard, Slot, ValidatorIndex, H256},
};

#[must_use]
pub fn block_root(slot: Slot) -> H256 {
    H256::from_low_u64_be(slot + 1)
}

#[must_use]
pub fn crosslink_root(shard: Shard) -> H256 {
    H256::from_low_u64_le(shard + 1)
}

/// Builds a state at `slot` with one validator per balance, all active since genesis.
///
/// Every slot before `slot` that fits in the history has a block root from [`block_root`].
/// Every shard has a crosslink with a root from [`crosslink_root`].
#[must_use]
pub fn state(config: &Config, slot: Slot, balances: impl IntoIterator<Item = Gwei>) -> BeaconState {
    let validators = balances
        .into_iter()
        .map(|balance| Validator {
            balance,
            activation_epoch: 0,
            exit_epoch: FAR_FUTURE_EPOCH,
        })
        .collect();

    let latest_crosslinks = (0..config.shard_count.get())
        .map(|shard| Crosslink {
            epoch: 0,
            crosslink_data_root: crosslink_root(shard),
        })
        .collect();

    let history_length = config.slots_per_historical_root.get();
    let history_size = usize::try_from(history_length).expect("history should fit in memory");
    let mut latest_block_roots = vec![H256::zero(); history_size];

    for retained_slot in slot.saturating_sub(history_length)..slot {
        let index = usize::try_from(retained_slot % history_length)
            .expect("index is less than history_size");

        latest_block_roots[index] = block_root(retained_slot);
    }

    let mut state = BeaconState {
        slot,
        validators,
        previous_shuffling_start_shard: 0,
        current_shuffling_start_shard: 5,
        previous_shuffling_seed: H256::repeat_byte(0x11),
        current_shuffling_seed: H256::repeat_byte(0x22),
        latest_crosslinks,
        latest_block_roots,
        ..BeaconState::default()
    };

    state.previous_shuffling_epoch =
        accessors::absolute_epoch(config, &state, RelativeEpoch::Previous);

    state.current_shuffling_epoch =
        accessors::absolute_epoch(config, &state, RelativeEpoch::Current);

    state
}

/// Members of the first committee at `slot`.
#[must_use]
pub fn committee_at(config: &Config, state: &BeaconState, slot: Slot) -> Vec<ValidatorIndex> {
    let committees = CommitteeCache::new(config, state);
    crosslink_committee(&committees, slot, 0).committee.to_vec()
}

#[must_use]
pub fn crosslink_committee<'cache>(
    committees: &'cache CommitteeCache<'_>,
    slot: Slot,
    position: usize,
) -> CrosslinkCommittee<'cache> {
    committees
        .crosslink_committees_at_slot(slot)
        .expect("slot should be in the previous or current epoch")[position]
}

/// Finds the slot and committee that `validator_index` is assigned to within the epoch of `slot`.
#[must_use]
pub fn assignment<'cache>(
    committees: &'cache CommitteeCache<'_>,
    slot: Slot,
    validator_index: ValidatorIndex,
) -> (Slot, CrosslinkCommittee<'cache>) {
    let config = committees.config();
    let epoch = misc::compute_epoch_at_slot(config, slot);

    misc::slots_in_epoch(config, epoch)
        .flat_map(|slot| {
            committees
                .crosslink_committees_at_slot(slot)
                .expect("slot should be in the previous or current epoch")
                .into_iter()
                .map(move |crosslink_committee| (slot, crosslink_committee))
        })
        .find(|(_, crosslink_committee)| crosslink_committee.committee.contains(&validator_index))
        .expect("validator should be active in the epoch")
}

/// Builds an attestation by `attesters` that agrees with the chain built by [`state`].
#[must_use]
pub fn attestation(
    config: &Config,
    slot: Slot,
    crosslink_committee: CrosslinkCommittee<'_>,
    attesters: &[ValidatorIndex],
) -> PendingAttestation {
    let aggregation_bitfield = crosslink_committee
        .committee
        .iter()
        .map(|validator_index| attesters.contains(validator_index))
        .collect::<AggregationBitfield>();

    let epoch = misc::compute_epoch_at_slot(config, slot);
    let epoch_start = misc::compute_start_slot_at_epoch(config, epoch);

    PendingAttestation {
        aggregation_bitfield,
        data: AttestationData {
            slot,
            shard: crosslink_committee.shard,
            beacon_block_root: block_root(slot),
            epoch_boundary_root: block_root(epoch_start),
            crosslink_data_root: H256::repeat_byte(0xcc),
            ..AttestationData::default()
        },
        inclusion_slot: slot + 1,
    }
}
