use std::ops::Index;

use num::BigUint;
use num_traits::{One, Zero};

/// Dense vector of non-negative integer coefficients, indexed by chain position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BigVector {
    coeffs: Vec<BigUint>,
}

impl BigVector {
    pub fn zero(len: usize) -> Self {
        Self {
            coeffs: vec![BigUint::zero(); len],
        }
    }

    /// The `i`-th standard basis vector of dimension `len`.
    pub fn basis(len: usize, i: usize) -> Self {
        let mut v = Self::zero(len);
        v.coeffs[i] = BigUint::one();
        v
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn add(&self, other: &Self) -> Self {
        assert_eq!(self.len(), other.len());
        Self {
            coeffs: self
                .coeffs
                .iter()
                .zip(other.coeffs.iter())
                .map(|(a, b)| a + b)
                .collect(),
        }
    }

    pub fn add_assign(&mut self, other: &Self) {
        assert_eq!(self.len(), other.len());
        for (a, b) in self.coeffs.iter_mut().zip(other.coeffs.iter()) {
            *a += b;
        }
    }

    /// Multiplies every coefficient by `2^s`.
    pub fn shl(&self, s: u64) -> Self {
        Self {
            coeffs: self.coeffs.iter().map(|c| c << s).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &BigUint> {
        self.coeffs.iter()
    }
}

impl Index<usize> for BigVector {
    type Output = BigUint;

    fn index(&self, i: usize) -> &BigUint {
        &self.coeffs[i]
    }
}
