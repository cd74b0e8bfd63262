use std::collections::BTreeSet;

use anyhow::{bail, ensure, Result};
use arithmetic::CheckedSumExt as _;
use bitvec::{order::Msb0, slice::BitSlice};
use itertools::Itertools as _;
use tap::Pipe as _;
use types::{
    beacon_state::BeaconState,
    config::Config,
    containers::{AttestationData, PendingAttestation, Validator},
    nonstandard::{AttestationEpoch, RelativeEpoch},
    primitives::{Epoch, Gwei, Slot, ValidatorIndex, H256},
};

use crate::{committees::CommitteeCache, error::Error, misc, predicates};

#[must_use]
pub fn get_current_epoch(config: &Config, state: &BeaconState) -> Epoch {
    misc::compute_epoch_at_slot(config, state.slot)
}

#[must_use]
pub fn get_previous_epoch(config: &Config, state: &BeaconState) -> Epoch {
    get_current_epoch(config, state)
        .saturating_sub(1)
        .max(config.genesis_epoch)
}

#[must_use]
pub fn get_next_epoch(config: &Config, state: &BeaconState) -> Epoch {
    get_current_epoch(config, state).saturating_add(1)
}

#[must_use]
pub fn absolute_epoch(
    config: &Config,
    state: &BeaconState,
    relative_epoch: RelativeEpoch,
) -> Epoch {
    match relative_epoch {
        RelativeEpoch::Previous => get_previous_epoch(config, state),
        RelativeEpoch::Current => get_current_epoch(config, state),
        RelativeEpoch::Next => get_next_epoch(config, state),
    }
}

/// Maps `epoch` to the relative epoch whose committees the state can compute.
///
/// At genesis the previous epoch equals the current one and `Current` is returned.
pub fn attestation_epoch(
    config: &Config,
    state: &BeaconState,
    epoch: Epoch,
) -> Result<AttestationEpoch> {
    let current_epoch = get_current_epoch(config, state);
    let previous_epoch = get_previous_epoch(config, state);

    if epoch == current_epoch {
        return Ok(AttestationEpoch::Current);
    }

    if epoch == previous_epoch {
        return Ok(AttestationEpoch::Previous);
    }

    bail!(Error::EpochOutOfRange {
        epoch,
        previous_epoch,
        current_epoch,
    })
}

/// Root of the block at `epoch`'s start slot, or of the last block before it.
pub fn get_block_root(
    config: &Config,
    state: &BeaconState,
    attestation_epoch: AttestationEpoch,
) -> Result<H256> {
    let epoch = absolute_epoch(config, state, attestation_epoch.into());
    let slot = misc::compute_start_slot_at_epoch(config, epoch);
    get_block_root_at_slot(config, state, slot)
}

pub fn get_block_root_at_slot(config: &Config, state: &BeaconState, slot: Slot) -> Result<H256> {
    let history_length = config.slots_per_historical_root;

    ensure!(
        u64::try_from(state.latest_block_roots.len()) == Ok(history_length.get()),
        Error::BlockRootHistoryLengthMismatch {
            expected: history_length.get(),
            actual: state.latest_block_roots.len(),
        },
    );

    ensure!(
        slot < state.slot && state.slot <= slot.saturating_add(history_length.get()),
        Error::SlotOutOfRange {
            slot,
            state_slot: state.slot,
        },
    );

    let index = usize::try_from(slot % history_length)?;

    Ok(state.latest_block_roots[index])
}

pub fn get_active_validator_indices(
    state: &BeaconState,
    epoch: Epoch,
) -> impl Iterator<Item = ValidatorIndex> + '_ {
    (0..)
        .zip(&state.validators)
        .filter(move |(_, validator)| predicates::is_active_validator(validator, epoch))
        .map(|(validator_index, _)| validator_index)
}

#[must_use]
pub fn get_effective_balance(config: &Config, validator: &Validator) -> Gwei {
    validator.balance.min(config.max_effective_balance)
}

/// Sums the effective balances of `validator_indices`.
///
/// Taking a set rules out counting a validator twice.
pub fn get_total_balance(
    config: &Config,
    state: &BeaconState,
    validator_indices: &BTreeSet<ValidatorIndex>,
) -> Result<Gwei> {
    let effective_balances = validator_indices
        .iter()
        .map(|validator_index| {
            usize::try_from(*validator_index)
                .ok()
                .and_then(|index| state.validators.get(index))
                .map(|validator| get_effective_balance(config, validator))
                .ok_or(Error::ValidatorIndexOutOfBounds {
                    validator_index: *validator_index,
                    validator_count: state.validators.len(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let total_balance = effective_balances
        .into_iter()
        .checked_sum()
        .ok_or(Error::BalanceOverflow)?;

    Ok(total_balance)
}

pub fn get_total_active_balance(
    config: &Config,
    state: &BeaconState,
    epoch: Epoch,
) -> Result<Gwei> {
    let total_balance = state
        .validators
        .iter()
        .filter(|validator| predicates::is_active_validator(validator, epoch))
        .map(|validator| get_effective_balance(config, validator))
        .checked_sum()
        .ok_or(Error::BalanceOverflow)?;

    Ok(total_balance)
}

/// Members of the committee for `(attestation_data.slot, attestation_data.shard)` whose bit is set.
pub fn get_attestation_participants(
    committees: &CommitteeCache<'_>,
    attestation_data: AttestationData,
    aggregation_bitfield: &BitSlice<u8, Msb0>,
) -> Result<BTreeSet<ValidatorIndex>> {
    let committee = committees.crosslink_committee(attestation_data.slot, attestation_data.shard)?;

    ensure!(
        committee.len() == aggregation_bitfield.len(),
        Error::CommitteeLengthMismatch {
            aggregation_bitfield_length: aggregation_bitfield.len(),
            committee_length: committee.len(),
        },
    );

    aggregation_bitfield
        .iter()
        .by_vals()
        .zip(committee)
        .filter_map(|(present, validator_index)| present.then_some(*validator_index))
        .collect::<BTreeSet<_>>()
        .pipe(Ok)
}

/// Union of the participants of `attestations`.
///
/// A validator that appears in several attestations is present once.
pub fn attesting_indices<'attestation>(
    committees: &CommitteeCache<'_>,
    attestations: impl IntoIterator<Item = &'attestation PendingAttestation>,
) -> Result<BTreeSet<ValidatorIndex>> {
    attestations
        .into_iter()
        .map(|attestation| {
            get_attestation_participants(
                committees,
                attestation.data,
                &attestation.aggregation_bitfield,
            )
        })
        .process_results(|participant_sets| participant_sets.flatten().collect())
}
