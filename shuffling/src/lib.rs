use core::{fmt::Debug, num::NonZeroU64};

use bit_field::BitArray as _;
use itertools::izip;
use sha2::{Digest as _, Sha256};
use tap::{Pipe as _, TryConv as _};
use types::{config::Config, primitives::H256};

const BITS_PER_HASH: usize = H256::len_bytes() * 8;

/// Returns the position that `index` is moved to by the swap-or-not shuffle.
///
/// See the following for an explanation of the algorithm:
/// - <https://link.springer.com/content/pdf/10.1007%2F978-3-642-32009-5_1.pdf>
/// - <https://github.com/protolambda/eth2-docs#shuffling>
#[must_use]
pub fn compute_shuffled_index(
    config: &Config,
    mut index: u64,
    index_count: NonZeroU64,
    seed: H256,
) -> u64 {
    assert!(index < index_count.get());

    for round in 0..config.shuffle_round_count {
        let pivot = compute_pivot(seed, round, index_count);
        let flip = (pivot + index_count.get() - index) % index_count;
        let position = index.max(flip);
        let source = compute_source(seed, round, position / BITS_PER_HASH as u64);
        let bit_index = position.to_le_bytes()[0].into();
        let bit = source.as_bytes().get_bit(bit_index);

        if bit {
            index = flip;
        }
    }

    index
}

/// Permutes `values` so that the element at position `i` of the result is
/// `values[compute_shuffled_index(i)]`.
#[must_use]
pub fn shuffle_list<T: Copy>(config: &Config, values: &[T], seed: H256) -> Vec<T> {
    let mut shuffled = values.to_vec();
    shuffle_slice(config, &mut shuffled, seed);
    shuffled
}

/// Shuffles `slice` in place. Same permutation as [`shuffle_list`].
///
/// Runs the rounds in reverse and swaps whole windows around each mirror point. Every source hash
/// covers up to 256 positions and every pivot is hashed once per round.
pub fn shuffle_slice<T>(config: &Config, slice: &mut [T], seed: H256) {
    let Some(length) = slice
        .len()
        .try_conv::<u64>()
        .expect("slice length fits in u64")
        .pipe(NonZeroU64::new)
    else {
        return;
    };

    for round in (0..config.shuffle_round_count).rev() {
        let pivot = compute_pivot(seed, round, length)
            .try_conv::<usize>()
            .expect("pivot is less than the slice length, so it fits in usize");

        let midpoint = pivot + 1;
        let (low, high) = slice.split_at_mut(midpoint);

        swap_around_mirror(seed, round, low, 0);
        swap_around_mirror(seed, round, high, midpoint);
    }
}

// `slice` starts at `offset` in the full list. Pairs mirrored around the middle of `slice` are
// swapped when the bit of the higher position is set.
fn swap_around_mirror<T>(seed: H256, round: u8, slice: &mut [T], offset: usize) {
    let mirror = slice.len() / 2;
    let offset_mirror = offset + mirror;
    let offset_length = offset + slice.len();
    let trailing = mirror.min(offset_length % BITS_PER_HASH);
    let leading = (mirror - trailing) % BITS_PER_HASH;

    let (low, mut high) = slice.split_at_mut(mirror);

    // The middle element of an odd-length slice is its own mirror.
    if low.len() < high.len() {
        high = &mut high[1..];
    }

    assert_eq!(low.len(), mirror);
    assert_eq!(high.len(), mirror);

    if trailing > 0 {
        let source = compute_source(seed, round, offset_length / BITS_PER_HASH);
        let bit_indices = (0..offset_length % BITS_PER_HASH).rev();
        let low_elements = low[..trailing].iter_mut();
        let high_elements = high[mirror - trailing..].iter_mut().rev();

        swap_using_source(source, bit_indices, low_elements, high_elements);
    }

    for (window, low_chunk, high_chunk) in izip!(
        (0..offset_length / BITS_PER_HASH).rev(),
        low[trailing..].chunks_exact_mut(BITS_PER_HASH),
        high[..mirror - trailing].rchunks_exact_mut(BITS_PER_HASH),
    ) {
        let source = compute_source(seed, round, window);
        let bit_indices = 0..BITS_PER_HASH;
        let low_elements = low_chunk.iter_mut().rev();
        let high_elements = high_chunk;

        swap_using_source(source, bit_indices, low_elements, high_elements);
    }

    if leading > 0 {
        let source = compute_source(seed, round, offset_mirror / BITS_PER_HASH);
        let bit_indices = (0..BITS_PER_HASH).rev();
        let low_elements = low[mirror - leading..].iter_mut();
        let high_elements = high[..leading].iter_mut().rev();

        swap_using_source(source, bit_indices, low_elements, high_elements);
    }
}

fn swap_using_source<'slice, T: 'slice>(
    source: H256,
    bit_indices: impl IntoIterator<Item = usize>,
    low: impl IntoIterator<Item = &'slice mut T>,
    high: impl IntoIterator<Item = &'slice mut T>,
) {
    for (bit_index, element, mirrored) in izip!(bit_indices, low, high) {
        if source.as_bytes().get_bit(bit_index) {
            core::mem::swap(element, mirrored);
        }
    }
}

fn compute_pivot(seed: H256, round: u8, index_count: NonZeroU64) -> u64 {
    let digest = Sha256::new()
        .chain_update(seed)
        .chain_update([round])
        .finalize();

    let mut bytes = [0; size_of::<u64>()];
    bytes.copy_from_slice(&digest[..size_of::<u64>()]);

    u64::from_le_bytes(bytes) % index_count
}

fn compute_source(
    seed: H256,
    round: u8,
    position_window: impl TryInto<u64, Error = impl Debug>,
) -> H256 {
    // Truncate to match the 4-byte window encoding used by the protocol.
    #[expect(clippy::cast_possible_truncation)]
    let position_window = position_window
        .try_into()
        .expect("position_window fits in u64") as u32;

    let digest = Sha256::new()
        .chain_update(seed)
        .chain_update([round])
        .chain_update(position_window.to_le_bytes())
        .finalize();

    H256::from_slice(&digest)
}
