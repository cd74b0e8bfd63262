use core::num::NonZeroU64;
use std::borrow::Cow;

use nonzero_ext::nonzero;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    nonstandard::ErrorKind,
    primitives::{Epoch, Gwei},
};

/// Chain constants consumed by epoch processing.
///
/// Unlike configurations used by node binaries, this has no `#[serde(default)]`.
/// A configuration file that omits a constant is rejected instead of silently falling back to
/// mainnet values, because nodes disagreeing on a constant disagree on every epoch.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    // Meta
    pub config_name: Cow<'static, str>,

    // Genesis
    pub genesis_epoch: Epoch,

    // Time parameters
    pub slots_per_epoch: NonZeroU64,

    // Committees and shuffling
    pub shard_count: NonZeroU64,
    pub target_committee_size: NonZeroU64,
    pub shuffle_round_count: u8,

    // Balances
    pub max_effective_balance: Gwei,

    // State list lengths
    pub slots_per_historical_root: NonZeroU64,
}

impl Config {
    #[must_use]
    pub const fn mainnet() -> Self {
        Self {
            config_name: Cow::Borrowed("mainnet"),
            genesis_epoch: 0,
            slots_per_epoch: nonzero!(64_u64),
            shard_count: nonzero!(1024_u64),
            target_committee_size: nonzero!(128_u64),
            shuffle_round_count: 90,
            max_effective_balance: 32_000_000_000,
            slots_per_historical_root: nonzero!(8192_u64),
        }
    }

    #[must_use]
    pub const fn minimal() -> Self {
        Self {
            config_name: Cow::Borrowed("minimal"),
            genesis_epoch: 0,
            slots_per_epoch: nonzero!(8_u64),
            shard_count: nonzero!(8_u64),
            target_committee_size: nonzero!(4_u64),
            shuffle_round_count: 10,
            max_effective_balance: 32_000_000_000,
            slots_per_historical_root: nonzero!(64_u64),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        let config = serde_yaml::from_str::<Self>(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.max_effective_balance == 0 {
            return Err(Error::ZeroMaxEffectiveBalance);
        }

        if self.slots_per_historical_root < self.slots_per_epoch {
            return Err(Error::HistoryShorterThanEpoch {
                slots_per_historical_root: self.slots_per_historical_root,
                slots_per_epoch: self.slots_per_epoch,
            });
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration is malformed or incomplete: {0}")]
    Malformed(#[from] serde_yaml::Error),
    #[error("MAX_EFFECTIVE_BALANCE is zero")]
    ZeroMaxEffectiveBalance,
    #[error(
        "SLOTS_PER_HISTORICAL_ROOT ({slots_per_historical_root}) \
         is shorter than SLOTS_PER_EPOCH ({slots_per_epoch})"
    )]
    HistoryShorterThanEpoch {
        slots_per_historical_root: NonZeroU64,
        slots_per_epoch: NonZeroU64,
    },
}

impl Error {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Configuration
    }
}
