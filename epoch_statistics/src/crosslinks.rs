use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::Result;
use helper_functions::{
    accessors,
    committees::{CommitteeCache, CrosslinkCommittee},
    error::Error,
    misc,
};
use itertools::Itertools as _;
use rayon::iter::{IntoParallelIterator as _, ParallelIterator as _};
use serde::Serialize;
use types::{
    containers::PendingAttestation,
    nonstandard::RelativeEpoch,
    primitives::{Gwei, Shard, Slot, ValidatorIndex, H256},
};

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct CrosslinkWinner {
    pub slot: Slot,
    pub shard: Shard,
    pub crosslink_data_root: H256,
    pub attesting_balance: Gwei,
    pub attester_indices: BTreeSet<ValidatorIndex>,
    pub total_committee_balance: Gwei,
}

impl CrosslinkWinner {
    /// Whether at least two thirds of the committee's balance voted for the winning root.
    #[must_use]
    pub fn has_supermajority(&self) -> bool {
        u128::from(self.attesting_balance) * 3 >= u128::from(self.total_committee_balance) * 2
    }
}

type Candidates<'state> = HashMap<(Slot, Shard), Vec<&'state PendingAttestation>>;

/// Resolves the winning crosslink of every committee in the previous and current epochs.
///
/// Winners are ordered by slot and then by committee position within the slot.
pub fn winning_crosslinks(committees: &CommitteeCache<'_>) -> Result<Vec<CrosslinkWinner>> {
    let config = committees.config();
    let state = committees.state();

    let previous_epoch = accessors::absolute_epoch(config, state, RelativeEpoch::Previous);
    let current_epoch = accessors::absolute_epoch(config, state, RelativeEpoch::Current);

    let slots = misc::slots_in_epoch(config, previous_epoch).start
        ..misc::slots_in_epoch(config, current_epoch).end;

    let candidates = state
        .latest_attestations
        .iter()
        .filter(|attestation| slots.contains(&attestation.data.slot))
        .into_group_map_by(|attestation| (attestation.data.slot, attestation.data.shard));

    let winners_by_slot = slots
        .into_par_iter()
        .map(|slot| winners_at_slot(committees, &candidates, slot))
        .collect::<Result<Vec<_>>>()?;

    Ok(winners_by_slot.into_iter().flatten().collect())
}

fn winners_at_slot(
    committees: &CommitteeCache<'_>,
    candidates: &Candidates<'_>,
    slot: Slot,
) -> Result<Vec<CrosslinkWinner>> {
    committees
        .crosslink_committees_at_slot(slot)?
        .into_iter()
        .map(|crosslink_committee| {
            let attestations = candidates
                .get(&(slot, crosslink_committee.shard))
                .map(Vec::as_slice)
                .unwrap_or_default();

            winning_crosslink(committees, slot, crosslink_committee, attestations)
        })
        .collect()
}

/// Picks the root with the greatest attesting balance among `attestations` for one committee.
///
/// Ties go to the numerically smallest root. Without any attestations the shard's last
/// crosslink wins with no attesters.
pub fn winning_crosslink(
    committees: &CommitteeCache<'_>,
    slot: Slot,
    crosslink_committee: CrosslinkCommittee<'_>,
    attestations: &[&PendingAttestation],
) -> Result<CrosslinkWinner> {
    let config = committees.config();
    let state = committees.state();
    let CrosslinkCommittee { shard, committee } = crosslink_committee;

    let latest_crosslink = usize::try_from(shard)
        .ok()
        .and_then(|index| state.latest_crosslinks.get(index))
        .ok_or(Error::ShardOutOfRange {
            shard,
            crosslink_count: state.latest_crosslinks.len(),
        })?;

    let mut attesters_by_root = BTreeMap::<_, BTreeSet<_>>::new();

    for attestation in attestations {
        let participants = accessors::get_attestation_participants(
            committees,
            attestation.data,
            &attestation.aggregation_bitfield,
        )?;

        attesters_by_root
            .entry(attestation.data.crosslink_data_root)
            .or_default()
            .extend(participants);
    }

    let committee_indices = committee.iter().copied().collect();
    let total_committee_balance = accessors::get_total_balance(config, state, &committee_indices)?;

    let mut winner = None::<(H256, Gwei, BTreeSet<ValidatorIndex>)>;

    // `BTreeMap` iterates in ascending root order, so keeping the first maximum breaks ties.
    for (root, attester_indices) in attesters_by_root {
        let balance = accessors::get_total_balance(config, state, &attester_indices)?;

        if winner
            .as_ref()
            .is_none_or(|(_, best_balance, _)| balance > *best_balance)
        {
            winner = Some((root, balance, attester_indices));
        }
    }

    let (crosslink_data_root, attesting_balance, attester_indices) =
        winner.unwrap_or((latest_crosslink.crosslink_data_root, 0, BTreeSet::new()));

    Ok(CrosslinkWinner {
        slot,
        shard,
        crosslink_data_root,
        attesting_balance,
        attester_indices,
        total_committee_balance,
    })
}
