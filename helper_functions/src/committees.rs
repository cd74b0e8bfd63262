use core::num::NonZeroU64;

use anyhow::{bail, ensure, Result};
use enum_map::EnumMap;
use once_cell::sync::OnceCell;
use tap::TryConv as _;
use types::{
    beacon_state::BeaconState,
    config::Config,
    nonstandard::AttestationEpoch,
    primitives::{Shard, Slot, ValidatorIndex},
};

use crate::{accessors, error::Error, misc};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CrosslinkCommittee<'cache> {
    pub shard: Shard,
    pub committee: &'cache [ValidatorIndex],
}

struct Shuffling {
    start_shard: Shard,
    committee_count: NonZeroU64,
    shuffled: Vec<ValidatorIndex>,
}

/// Crosslink committees of the previous and current epochs of one state.
///
/// Shufflings are computed on first use and shared between threads afterwards.
/// The cache borrows the state, so it cannot outlive or disagree with it.
pub struct CommitteeCache<'state> {
    config: &'state Config,
    state: &'state BeaconState,
    shufflings: EnumMap<AttestationEpoch, OnceCell<Shuffling>>,
}

impl<'state> CommitteeCache<'state> {
    #[must_use]
    pub fn new(config: &'state Config, state: &'state BeaconState) -> Self {
        Self {
            config,
            state,
            shufflings: EnumMap::default(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &'state Config {
        self.config
    }

    #[must_use]
    pub const fn state(&self) -> &'state BeaconState {
        self.state
    }

    /// Committees assigned at `slot` in shard order starting from the slot's first shard.
    pub fn crosslink_committees_at_slot(&self, slot: Slot) -> Result<Vec<CrosslinkCommittee<'_>>> {
        let config = self.config;
        let epoch = misc::compute_epoch_at_slot(config, slot);
        let attestation_epoch = accessors::attestation_epoch(config, self.state, epoch)?;

        let Shuffling {
            start_shard,
            committee_count,
            ref shuffled,
        } = *self.shuffling(attestation_epoch);

        let validator_count = u64::try_from(shuffled.len())?;
        let committees_per_slot = committee_count.get() / config.slots_per_epoch;
        let offset = misc::slots_since_epoch_start(config, slot);
        let first_committee = committees_per_slot * offset;
        let slot_start_shard =
            (start_shard % config.shard_count + first_committee) % config.shard_count;

        (0..committees_per_slot)
            .map(|index| {
                let index_in_epoch = first_committee + index;
                let bounds =
                    misc::committee_bounds(validator_count, index_in_epoch, committee_count);

                let start = usize::try_from(bounds.start)?;
                let end = usize::try_from(bounds.end)?;

                Ok(CrosslinkCommittee {
                    shard: (slot_start_shard + index) % config.shard_count,
                    committee: &shuffled[start..end],
                })
            })
            .collect()
    }

    pub fn crosslink_committee(&self, slot: Slot, shard: Shard) -> Result<&[ValidatorIndex]> {
        let shard_count = self.config.shard_count.get();

        ensure!(shard < shard_count, Error::ShardAboveShardCount { shard, shard_count });

        let Some(crosslink_committee) = self
            .crosslink_committees_at_slot(slot)?
            .into_iter()
            .find(|crosslink_committee| crosslink_committee.shard == shard)
        else {
            bail!(Error::NoCommitteeForShard { slot, shard });
        };

        Ok(crosslink_committee.committee)
    }

    fn shuffling(&self, attestation_epoch: AttestationEpoch) -> &Shuffling {
        self.shufflings[attestation_epoch].get_or_init(|| {
            let (epoch, seed, start_shard) = match attestation_epoch {
                AttestationEpoch::Previous => (
                    self.state.previous_shuffling_epoch,
                    self.state.previous_shuffling_seed,
                    self.state.previous_shuffling_start_shard,
                ),
                AttestationEpoch::Current => (
                    self.state.current_shuffling_epoch,
                    self.state.current_shuffling_seed,
                    self.state.current_shuffling_start_shard,
                ),
            };

            let active_validator_indices =
                accessors::get_active_validator_indices(self.state, epoch).collect::<Vec<_>>();

            let active_count = active_validator_indices
                .len()
                .try_conv::<u64>()
                .expect("number of validators fits in u64");

            Shuffling {
                start_shard,
                committee_count: misc::epoch_committee_count(self.config, active_count),
                shuffled: shuffling::shuffle_list(self.config, &active_validator_indices, seed),
            }
        })
    }
}
