use crate::primitives::Epoch;

pub const FAR_FUTURE_EPOCH: Epoch = Epoch::MAX;
