use core::num::NonZeroU64;

use easy_ext::ext;

#[ext(U64Ext)]
pub impl u64 {
    /// Computes `self * numerator / denominator` without overflowing the intermediate product.
    ///
    /// Returns `None` only if the quotient itself does not fit in `u64`.
    #[inline]
    fn mul_div(self, numerator: Self, denominator: NonZeroU64) -> Option<u64> {
        let product = u128::from(self) * u128::from(numerator);
        let quotient = product / u128::from(denominator.get());
        quotient.try_into().ok()
    }

    #[inline]
    fn prev_multiple_of(self, factor: NonZeroU64) -> Self {
        self - self % factor
    }
}

#[ext(CheckedSumExt)]
pub impl<I: Iterator<Item = u64>> I {
    // `Iterator::sum` panics on overflow in debug builds and wraps in release builds without
    // `overflow-checks`. Balances must do neither.
    #[inline]
    fn checked_sum(mut self) -> Option<u64> {
        self.try_fold(0, u64::checked_add)
    }
}
