use std::collections::BTreeSet;

use anyhow::Result;
use enum_map::EnumMap;
use helper_functions::{accessors, committees::CommitteeCache};
use itertools::Itertools as _;
use rayon::iter::{IntoParallelIterator as _, ParallelIterator as _};
use serde::Serialize;
use tracing::{debug, instrument, trace};
use types::{
    beacon_state::BeaconState,
    config::Config,
    containers::PendingAttestation,
    primitives::{Epoch, Gwei, Shard, Slot, ValidatorIndex},
};

use crate::{
    classification::{self, AttestationBucket},
    crosslinks::{self, CrosslinkWinner},
};

/// Attestation statistics of the epochs around a state.
///
/// Attester indices are sets, so a validator counted in a balance is counted exactly once.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct EpochVariables {
    pub current_epoch: Epoch,
    pub previous_epoch: Epoch,
    pub next_epoch: Epoch,

    pub current_total_balance: Gwei,
    pub current_epoch_attestations: Vec<PendingAttestation>,
    pub current_epoch_boundary_attester_indices: BTreeSet<ValidatorIndex>,
    pub current_epoch_boundary_attesting_balance: Gwei,

    pub previous_total_balance: Gwei,
    pub previous_epoch_attestations: Vec<PendingAttestation>,
    pub previous_epoch_attester_indices: BTreeSet<ValidatorIndex>,
    pub previous_epoch_attesting_balance: Gwei,
    pub previous_epoch_boundary_attestations: Vec<PendingAttestation>,
    pub previous_epoch_boundary_attester_indices: BTreeSet<ValidatorIndex>,
    pub previous_epoch_boundary_attesting_balance: Gwei,
    pub previous_epoch_head_attestations: Vec<PendingAttestation>,
    pub previous_epoch_head_attester_indices: BTreeSet<ValidatorIndex>,
    pub previous_epoch_head_attesting_balance: Gwei,

    pub crosslink_winners: Vec<CrosslinkWinner>,
}

impl EpochVariables {
    #[must_use]
    pub fn current_epoch_boundary_supermajority(&self) -> bool {
        is_supermajority(
            self.current_epoch_boundary_attesting_balance,
            self.current_total_balance,
        )
    }

    #[must_use]
    pub fn previous_epoch_boundary_supermajority(&self) -> bool {
        is_supermajority(
            self.previous_epoch_boundary_attesting_balance,
            self.previous_total_balance,
        )
    }

    #[must_use]
    pub fn crosslink_winner(&self, slot: Slot, shard: Shard) -> Option<&CrosslinkWinner> {
        self.crosslink_winners
            .iter()
            .find(|winner| winner.slot == slot && winner.shard == shard)
    }
}

#[derive(Default)]
struct BucketSummary<'state> {
    attestations: Vec<&'state PendingAttestation>,
    attester_indices: BTreeSet<ValidatorIndex>,
    attesting_balance: Gwei,
}

impl BucketSummary<'_> {
    fn owned_attestations(&self) -> Vec<PendingAttestation> {
        self.attestations.iter().copied().cloned().collect()
    }
}

/// Computes [`EpochVariables`] for `state`.
///
/// Either every statistic is computed or an error is returned.
/// The result does not depend on thread scheduling.
#[instrument(level = "debug", skip_all, fields(slot = state.slot))]
pub fn epoch_variables(config: &Config, state: &BeaconState) -> Result<EpochVariables> {
    config.validate()?;

    let committees = CommitteeCache::new(config, state);

    let current_epoch = accessors::get_current_epoch(config, state);
    let previous_epoch = accessors::get_previous_epoch(config, state);
    let next_epoch = accessors::get_next_epoch(config, state);

    let current_total_balance =
        accessors::get_total_active_balance(config, state, current_epoch)?;

    let previous_total_balance =
        accessors::get_total_active_balance(config, state, previous_epoch)?;

    let (summaries, crosslink_winners) = rayon::join(
        || summarize_buckets(&committees),
        || crosslinks::winning_crosslinks(&committees),
    );

    let mut summaries = summaries?;
    let crosslink_winners = crosslink_winners?;

    for (bucket, summary) in &summaries {
        debug!(
            ?bucket,
            attestations = summary.attestations.len(),
            attesters = summary.attester_indices.len(),
            attesting_balance = summary.attesting_balance,
            "aggregated attestation bucket",
        );
    }

    for winner in &crosslink_winners {
        trace!(
            winner.slot,
            winner.shard,
            crosslink_data_root = ?winner.crosslink_data_root,
            winner.attesting_balance,
            winner.total_committee_balance,
            "resolved winning crosslink",
        );
    }

    debug!(
        current_epoch,
        previous_epoch,
        current_total_balance,
        previous_total_balance,
        crosslink_winners = crosslink_winners.len(),
        "computed epoch variables",
    );

    let mut take = |bucket: AttestationBucket| core::mem::take(&mut summaries[bucket]);

    let current = take(AttestationBucket::CurrentEpoch);
    let current_boundary = take(AttestationBucket::CurrentEpochBoundary);
    let previous = take(AttestationBucket::PreviousEpoch);
    let previous_boundary = take(AttestationBucket::PreviousEpochBoundary);
    let previous_head = take(AttestationBucket::PreviousEpochHead);

    Ok(EpochVariables {
        current_epoch,
        previous_epoch,
        next_epoch,

        current_total_balance,
        current_epoch_attestations: current.owned_attestations(),
        current_epoch_boundary_attester_indices: current_boundary.attester_indices,
        current_epoch_boundary_attesting_balance: current_boundary.attesting_balance,

        previous_total_balance,
        previous_epoch_attestations: previous.owned_attestations(),
        previous_epoch_attester_indices: previous.attester_indices,
        previous_epoch_attesting_balance: previous.attesting_balance,
        previous_epoch_boundary_attestations: previous_boundary.owned_attestations(),
        previous_epoch_boundary_attester_indices: previous_boundary.attester_indices,
        previous_epoch_boundary_attesting_balance: previous_boundary.attesting_balance,
        previous_epoch_head_attestations: previous_head.owned_attestations(),
        previous_epoch_head_attester_indices: previous_head.attester_indices,
        previous_epoch_head_attesting_balance: previous_head.attesting_balance,

        crosslink_winners,
    })
}

fn summarize_buckets<'state>(
    committees: &CommitteeCache<'state>,
) -> Result<EnumMap<AttestationBucket, BucketSummary<'state>>> {
    let summaries = enum_iterator::all::<AttestationBucket>()
        .collect_vec()
        .into_par_iter()
        .map(|bucket| summarize_bucket(committees, bucket).map(|summary| (bucket, summary)))
        .collect::<Result<Vec<_>>>()?;

    let mut summary_map = EnumMap::<_, BucketSummary>::default();
    summary_map.extend(summaries);
    Ok(summary_map)
}

fn summarize_bucket<'state>(
    committees: &CommitteeCache<'state>,
    bucket: AttestationBucket,
) -> Result<BucketSummary<'state>> {
    let config = committees.config();
    let state = committees.state();

    let attestations = classification::classify(config, state, bucket)?;
    let attester_indices = accessors::attesting_indices(committees, attestations.iter().copied())?;
    let attesting_balance = accessors::get_total_balance(config, state, &attester_indices)?;

    Ok(BucketSummary {
        attestations,
        attester_indices,
        attesting_balance,
    })
}

fn is_supermajority(attesting_balance: Gwei, total_balance: Gwei) -> bool {
    u128::from(attesting_balance) * 3 >= u128::from(total_balance) * 2
}
