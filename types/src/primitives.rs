use bitvec::{order::Msb0, vec::BitVec};

pub use ethereum_types::H256;

pub type Epoch = u64;
pub type Gwei = u64;
pub type Shard = u64;
pub type Slot = u64;
pub type ValidatorIndex = u64;

/// One bit per committee seat, most significant bit of each byte first.
pub type AggregationBitfield = BitVec<u8, Msb0>;
