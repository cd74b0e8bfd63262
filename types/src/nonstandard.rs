use derive_more::Display;
use enum_iterator::Sequence;
use enum_map::Enum;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Enum, Sequence)]
pub enum RelativeEpoch {
    Previous,
    Current,
    Next,
}

impl From<AttestationEpoch> for RelativeEpoch {
    fn from(attestation_epoch: AttestationEpoch) -> Self {
        match attestation_epoch {
            AttestationEpoch::Previous => Self::Previous,
            AttestationEpoch::Current => Self::Current,
        }
    }
}

/// Epochs for which the state retains enough data to compute committees.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Enum, Sequence)]
pub enum AttestationEpoch {
    Previous,
    Current,
}

/// Coarse classification of failures in epoch processing.
///
/// None of them are transient. Retrying with the same inputs produces the same error.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
pub enum ErrorKind {
    #[display("configuration error")]
    Configuration,
    #[display("lookup error")]
    Lookup,
    #[display("invariant violation")]
    InvariantViolation,
}
