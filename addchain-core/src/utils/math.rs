use num::BigUint;
use num_traits::{One, Zero};

/// Bit-level helpers over [`BigUint`] used throughout the chain algorithms.
pub trait BigMath {
    /// Integer with the low `n` bits set, i.e. `2^n - 1`.
    fn ones(n: u64) -> Self;
    fn is_pow2(&self) -> bool;
    /// Bits `[lo, hi)` of `self`, shifted down to start at bit 0.
    fn extract(&self, lo: u64, hi: u64) -> Self;
    /// Indices of the set bits, ascending.
    fn bits_set(&self) -> Vec<u64>;
    /// The doubling ladder `1, 2, 4, ..., self`. Only meaningful for powers of two.
    fn pow2_ladder(&self) -> Vec<Self>
    where
        Self: Sized;
}

impl BigMath for BigUint {
    fn ones(n: u64) -> Self {
        (BigUint::one() << n) - BigUint::one()
    }

    fn is_pow2(&self) -> bool {
        !self.is_zero() && self.count_ones() == 1
    }

    fn extract(&self, lo: u64, hi: u64) -> Self {
        assert!(lo <= hi);
        (self >> lo) & BigUint::ones(hi - lo)
    }

    fn bits_set(&self) -> Vec<u64> {
        (0..self.bits()).filter(|&i| self.bit(i)).collect()
    }

    fn pow2_ladder(&self) -> Vec<Self> {
        debug_assert!(self.is_pow2());
        (0..self.bits())
            .map(|i| BigUint::one() << i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ones_and_pow2() {
        assert_eq!(BigUint::ones(0), BigUint::zero());
        assert_eq!(BigUint::ones(4), BigUint::from(15u32));
        assert!(BigUint::from(64u32).is_pow2());
        assert!(BigUint::one().is_pow2());
        assert!(!BigUint::zero().is_pow2());
        assert!(!BigUint::from(12u32).is_pow2());
    }

    #[test]
    fn extract_bits() {
        let x = BigUint::from(0xbeefu32);
        assert_eq!(x.extract(4, 8), BigUint::from(0xeu32));
        assert_eq!(x.extract(12, 20), BigUint::from(0xbu32));
        assert_eq!(x.extract(3, 3), BigUint::zero());
    }

    #[test]
    fn set_bits_and_ladder() {
        assert_eq!(BigUint::from(0b101001u32).bits_set(), vec![0, 3, 5]);
        assert_eq!(
            BigUint::from(16u32).pow2_ladder(),
            [1u32, 2, 4, 8, 16].map(BigUint::from).to_vec()
        );
    }
}
