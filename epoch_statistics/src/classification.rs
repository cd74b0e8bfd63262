use anyhow::Result;
use enum_iterator::Sequence;
use enum_map::Enum;
use helper_functions::{accessors, misc};
use itertools::Itertools as _;
use serde::Serialize;
use types::{
    beacon_state::BeaconState, config::Config, containers::PendingAttestation,
    nonstandard::AttestationEpoch,
};

/// Subsets of the attestation pool that epoch processing aggregates over.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Enum, Sequence, Serialize)]
pub enum AttestationBucket {
    CurrentEpoch,
    CurrentEpochBoundary,
    PreviousEpoch,
    PreviousEpochBoundary,
    PreviousEpochHead,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Requirement {
    None,
    MatchingBoundaryRoot,
    MatchingHeadRoot,
}

impl AttestationBucket {
    #[must_use]
    pub const fn attestation_epoch(self) -> AttestationEpoch {
        match self {
            Self::CurrentEpoch | Self::CurrentEpochBoundary => AttestationEpoch::Current,
            Self::PreviousEpoch | Self::PreviousEpochBoundary | Self::PreviousEpochHead => {
                AttestationEpoch::Previous
            }
        }
    }

    #[must_use]
    pub const fn requirement(self) -> Requirement {
        match self {
            Self::CurrentEpoch | Self::PreviousEpoch => Requirement::None,
            Self::CurrentEpochBoundary | Self::PreviousEpochBoundary => {
                Requirement::MatchingBoundaryRoot
            }
            Self::PreviousEpochHead => Requirement::MatchingHeadRoot,
        }
    }
}

/// Selects the attestations in `state.latest_attestations` that belong to `bucket`.
///
/// Pool order is preserved. Block roots are looked up only for attestations from the bucket's
/// epoch, so an empty epoch never fails.
pub fn classify<'state>(
    config: &Config,
    state: &'state BeaconState,
    bucket: AttestationBucket,
) -> Result<Vec<&'state PendingAttestation>> {
    let attestation_epoch = bucket.attestation_epoch();
    let epoch = accessors::absolute_epoch(config, state, attestation_epoch.into());

    let from_epoch = state
        .latest_attestations
        .iter()
        .filter(|attestation| misc::compute_epoch_at_slot(config, attestation.data.slot) == epoch)
        .collect_vec();

    match bucket.requirement() {
        Requirement::None => Ok(from_epoch),
        Requirement::MatchingBoundaryRoot => {
            if from_epoch.is_empty() {
                return Ok(from_epoch);
            }

            let boundary_root = accessors::get_block_root(config, state, attestation_epoch)?;

            Ok(from_epoch
                .into_iter()
                .filter(|attestation| attestation.data.epoch_boundary_root == boundary_root)
                .collect())
        }
        Requirement::MatchingHeadRoot => from_epoch
            .into_iter()
            .map(|attestation| {
                accessors::get_block_root_at_slot(config, state, attestation.data.slot)
                    .map(|head_root| (attestation, head_root))
            })
            .filter_ok(|(attestation, head_root)| attestation.data.beacon_block_root == *head_root)
            .map_ok(|(attestation, _)| attestation)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use helper_functions::error::Error;
    use test_case::test_case;
    use types::containers::AttestationData;

    use crate::test_utils;

    use super::*;

    #[test_case(AttestationBucket::CurrentEpoch => (AttestationEpoch::Current, Requirement::None))]
    #[test_case(
        AttestationBucket::CurrentEpochBoundary
        => (AttestationEpoch::Current, Requirement::MatchingBoundaryRoot)
    )]
    #[test_case(
        AttestationBucket::PreviousEpoch
        => (AttestationEpoch::Previous, Requirement::None)
    )]
    #[test_case(
        AttestationBucket::PreviousEpochBoundary
        => (AttestationEpoch::Previous, Requirement::MatchingBoundaryRoot)
    )]
    #[test_case(
        AttestationBucket::PreviousEpochHead
        => (AttestationEpoch::Previous, Requirement::MatchingHeadRoot)
    )]
    fn bucket_selectors(bucket: AttestationBucket) -> (AttestationEpoch, Requirement) {
        (bucket.attestation_epoch(), bucket.requirement())
    }

    fn pending_attestation(data: AttestationData) -> PendingAttestation {
        PendingAttestation {
            data,
            inclusion_slot: data.slot + 1,
            ..PendingAttestation::default()
        }
    }

    fn matching_attestation(slot: u64) -> PendingAttestation {
        let epoch_start = slot - slot % 8;

        pending_attestation(AttestationData {
            slot,
            beacon_block_root: test_utils::block_root(slot),
            epoch_boundary_root: test_utils::block_root(epoch_start),
            ..AttestationData::default()
        })
    }

    #[test]
    fn buckets_filter_by_epoch_and_roots() -> Result<()> {
        let config = Config::minimal();
        let mut state = test_utils::state(&config, 21, [32_000_000_000; 4]);

        let stale_head = pending_attestation(AttestationData {
            beacon_block_root: test_utils::block_root(9),
            ..matching_attestation(12).data
        });

        let stale_boundary = pending_attestation(AttestationData {
            epoch_boundary_root: test_utils::block_root(3),
            ..matching_attestation(10).data
        });

        state.latest_attestations = vec![
            matching_attestation(3),
            matching_attestation(9),
            stale_head,
            stale_boundary,
            matching_attestation(17),
        ];

        let slots = |bucket: AttestationBucket| -> Result<Vec<u64>> {
            Ok(classify(&config, &state, bucket)?
                .into_iter()
                .map(|attestation| attestation.data.slot)
                .collect())
        };

        assert_eq!(slots(AttestationBucket::PreviousEpoch)?, [9, 12, 10]);
        assert_eq!(slots(AttestationBucket::PreviousEpochBoundary)?, [9, 12]);
        assert_eq!(slots(AttestationBucket::PreviousEpochHead)?, [9, 10]);
        assert_eq!(slots(AttestationBucket::CurrentEpoch)?, [17]);
        assert_eq!(slots(AttestationBucket::CurrentEpochBoundary)?, [17]);

        Ok(())
    }

    #[test]
    fn genesis_epoch_is_both_previous_and_current() -> Result<()> {
        let config = Config::minimal();
        let mut state = test_utils::state(&config, 5, [32_000_000_000; 4]);

        state.latest_attestations = vec![matching_attestation(2)];

        for bucket in enum_iterator::all::<AttestationBucket>() {
            assert_eq!(classify(&config, &state, bucket)?.len(), 1, "{bucket:?}");
        }

        Ok(())
    }

    #[test]
    fn empty_epoch_needs_no_boundary_root() -> Result<()> {
        let config = Config::minimal();
        let mut state = test_utils::state(&config, 16, [32_000_000_000; 4]);

        state.latest_attestations = vec![matching_attestation(9)];

        // The boundary block of the current epoch is at the state's own slot and has no root yet.
        assert!(classify(&config, &state, AttestationBucket::CurrentEpochBoundary)?.is_empty());

        Ok(())
    }

    #[test]
    fn evicted_boundary_root_is_a_lookup_error() {
        let config = Config {
            slots_per_historical_root: nonzero_ext::nonzero!(8_u64),
            ..Config::minimal()
        };

        let mut state = test_utils::state(&config, 15, [32_000_000_000; 4]);

        state.latest_attestations = vec![matching_attestation(7)];

        let error = classify(&config, &state, AttestationBucket::PreviousEpochBoundary)
            .expect_err("block root of slot 0 is no longer retained");

        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::SlotOutOfRange {
                slot: 0,
                state_slot: 15,
            }),
        ));
    }
}
