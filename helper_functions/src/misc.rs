use core::{num::NonZeroU64, ops::Range};

use arithmetic::U64Ext as _;
use tap::Pipe as _;
use types::{
    config::Config,
    primitives::{Epoch, Slot},
};

#[must_use]
pub fn compute_epoch_at_slot(config: &Config, slot: Slot) -> Epoch {
    slot / config.slots_per_epoch
}

#[must_use]
pub const fn compute_start_slot_at_epoch(config: &Config, epoch: Epoch) -> Slot {
    epoch.saturating_mul(config.slots_per_epoch.get())
}

#[must_use]
pub fn slots_since_epoch_start(config: &Config, slot: Slot) -> u64 {
    slot - slot.prev_multiple_of(config.slots_per_epoch)
}

#[must_use]
pub const fn slots_in_epoch(config: &Config, epoch: Epoch) -> Range<Slot> {
    compute_start_slot_at_epoch(config, epoch)
        ..compute_start_slot_at_epoch(config, epoch.saturating_add(1))
}

/// Number of crosslink committees formed from `active_validator_count` validators in one epoch.
///
/// Always a nonzero multiple of `SLOTS_PER_EPOCH`, so every slot gets the same number of
/// committees even if some of them are empty.
#[must_use]
pub fn epoch_committee_count(config: &Config, active_validator_count: u64) -> NonZeroU64 {
    let Config {
        slots_per_epoch,
        shard_count,
        target_committee_size,
        ..
    } = *config;

    let committees_per_slot = (shard_count.get() / slots_per_epoch)
        .min(active_validator_count / slots_per_epoch / target_committee_size)
        .pipe(NonZeroU64::new)
        .unwrap_or(NonZeroU64::MIN);

    committees_per_slot.saturating_mul(slots_per_epoch)
}

/// Bounds of the `index`-th of `committee_count` contiguous, nearly equal pieces of a list of
/// `validator_count` elements.
#[must_use]
pub fn committee_bounds(
    validator_count: u64,
    index: u64,
    committee_count: NonZeroU64,
) -> Range<u64> {
    assert!(index < committee_count.get());

    let start = validator_count
        .mul_div(index, committee_count)
        .expect("index is less than committee_count, so start does not exceed validator_count");

    let end = validator_count
        .mul_div(index + 1, committee_count)
        .expect("index is less than committee_count, so end does not exceed validator_count");

    start..end
}
