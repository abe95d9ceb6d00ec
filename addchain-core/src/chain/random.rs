//! Seeded random generation of chains and targets, for tests and benches.
use num::BigUint;
use num_traits::One;
use rand::Rng;

use super::Chain;

/// Builds ascending chains by repeatedly adding two uniformly chosen
/// existing elements.
#[derive(Clone, Copy, Debug)]
pub struct RandomAddGenerator {
    /// Number of elements appended after the initial 1.
    pub n: usize,
}

impl RandomAddGenerator {
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    pub fn generate<R: Rng>(&self, rng: &mut R) -> Chain {
        let mut xs = vec![BigUint::one()];
        while xs.len() < self.n + 1 {
            let i = rng.gen_range(0..xs.len());
            let j = rng.gen_range(0..xs.len());
            let x = &xs[i] + &xs[j];
            if !xs.contains(&x) {
                xs.push(x);
            }
        }
        xs.sort();
        Chain::from(xs)
    }
}

/// Uniformly random integer of exactly `bits` bits.
pub fn random_target<R: Rng>(rng: &mut R, bits: u64) -> BigUint {
    assert!(bits > 0);
    let mut bytes = vec![0u8; bits.div_ceil(8) as usize];
    rng.fill_bytes(&mut bytes);
    let x = BigUint::from_bytes_le(&bytes) % (BigUint::one() << (bits - 1));
    x | (BigUint::one() << (bits - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn generated_chains_are_valid() {
        let mut rng = ChaCha20Rng::seed_from_u64(0x61646463);
        for n in [1, 5, 20, 64] {
            let c = RandomAddGenerator::new(n).generate(&mut rng);
            assert_eq!(c.len(), n + 1);
            assert!(c.is_ascending());
            c.validate().unwrap();
        }
    }

    #[test]
    fn random_target_bit_length() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for bits in [1, 2, 9, 64, 255] {
            assert_eq!(random_target(&mut rng, bits).bits(), bits);
        }
    }
}
