//! Addition chains via continued fractions: the two largest targets are
//! reduced by Euclidean division and the chains for the quotient and the
//! remaining targets are composed.
use std::fmt::{self, Display};

use num::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

use super::{ChainAlgorithm, SequenceAlgorithm};
use crate::chain::Chain;
use crate::utils::errors::AddChainError;
use crate::utils::math::BigMath;
use crate::utils::sorted::{insert_sorted_unique, sort_unique};

/// Chooses the auxiliary values `k` used to split a target `n`.
pub trait ContinuedFractionStrategy: Display + Send + Sync {
    /// Candidate auxiliary values for `n`.
    fn k(&self, n: &BigUint) -> Vec<BigUint>;

    /// Whether `k` always proposes exactly one candidate.
    fn singleton(&self) -> bool;
}

/// `k = floor(n/2)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinaryStrategy;

impl ContinuedFractionStrategy for BinaryStrategy {
    fn k(&self, n: &BigUint) -> Vec<BigUint> {
        vec![n >> 1]
    }

    fn singleton(&self) -> bool {
        true
    }
}

impl Display for BinaryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binary")
    }
}

/// `k = floor(n/2)` for even `n`, `floor(n/2) + 1` for odd `n`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CoBinaryStrategy;

impl ContinuedFractionStrategy for CoBinaryStrategy {
    fn k(&self, n: &BigUint) -> Vec<BigUint> {
        let mut k = n >> 1;
        if n.bit(0) {
            k += 1u32;
        }
        vec![k]
    }

    fn singleton(&self) -> bool {
        true
    }
}

impl Display for CoBinaryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "co_binary")
    }
}

/// `k = floor(n / 2^floor(bitlen(n)/2))`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DichotomicStrategy;

impl ContinuedFractionStrategy for DichotomicStrategy {
    fn k(&self, n: &BigUint) -> Vec<BigUint> {
        vec![n >> (n.bits() / 2)]
    }

    fn singleton(&self) -> bool {
        true
    }
}

impl Display for DichotomicStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dichotomic")
    }
}

/// Every `k = floor(n / 2^j)` for `j >= 1`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DyadicStrategy;

impl ContinuedFractionStrategy for DyadicStrategy {
    fn k(&self, n: &BigUint) -> Vec<BigUint> {
        (1..n.bits()).map(|j| n >> j).collect()
    }

    fn singleton(&self) -> bool {
        false
    }
}

impl Display for DyadicStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dyadic")
    }
}

/// Every `k = floor(n / 2^(2^j))`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FermatStrategy;

impl ContinuedFractionStrategy for FermatStrategy {
    fn k(&self, n: &BigUint) -> Vec<BigUint> {
        let bits = n.bits();
        std::iter::successors(Some(1u64), |&s| s.checked_mul(2))
            .take_while(|&s| s < bits)
            .map(|s| n >> s)
            .collect()
    }

    fn singleton(&self) -> bool {
        false
    }
}

impl Display for FermatStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fermat")
    }
}

/// All built-in strategies.
pub fn strategies() -> Vec<Box<dyn ContinuedFractionStrategy>> {
    vec![
        Box::new(BinaryStrategy),
        Box::new(CoBinaryStrategy),
        Box::new(DichotomicStrategy),
        Box::new(DyadicStrategy),
        Box::new(FermatStrategy),
    ]
}

pub struct ContinuedFractions {
    strategy: Box<dyn ContinuedFractionStrategy>,
}

impl ContinuedFractions {
    pub fn new(strategy: Box<dyn ContinuedFractionStrategy>) -> Self {
        Self { strategy }
    }

    /// Chain containing every element of `s`, which must be sorted, unique
    /// and non-empty. The chain ends at the largest element.
    fn chain(&self, s: &[BigUint]) -> Chain {
        let m = s.len();
        let n = &s[m - 1];
        if m == 1 {
            return self.minchain(n);
        }

        let k = &s[m - 2];
        let (q, r) = n.div_rem(k);
        if r.is_zero() {
            return Chain::product(&self.chain(&s[..m - 1]), &self.minchain(&q));
        }

        let mut rest = s[..m - 1].to_vec();
        insert_sorted_unique(&mut rest, r.clone());
        Chain::plus(
            &Chain::product(&self.chain(&rest), &self.minchain(&q)),
            &r,
        )
    }

    fn minchain(&self, n: &BigUint) -> Chain {
        if n.is_pow2() {
            return Chain::from(n.pow2_ladder());
        }
        if *n == BigUint::from(3u32) {
            return Chain::from_u64s(&[1, 2, 3]);
        }

        let mut best: Option<Chain> = None;
        for k in self.candidates(n) {
            let c = self.chain(&[k, n.clone()]);
            if best.as_ref().map_or(true, |b| c.len() < b.len()) {
                best = Some(c);
            }
        }
        // candidates() is never empty
        best.unwrap_or_else(|| self.chain(&[n >> 1, n.clone()]))
    }

    /// Strategy proposals restricted to `1 < k < n`, falling back to `n/2`.
    fn candidates(&self, n: &BigUint) -> Vec<BigUint> {
        let one = BigUint::one();
        let mut ks: Vec<BigUint> = self
            .strategy
            .k(n)
            .into_iter()
            .filter(|k| *k > one && k < n)
            .collect();
        if ks.is_empty() {
            ks.push(n >> 1);
        }
        ks
    }
}

impl Display for ContinuedFractions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "continued_fractions({})", self.strategy)
    }
}

impl ChainAlgorithm for ContinuedFractions {
    #[tracing::instrument(skip_all, name = "ContinuedFractions::find_chain")]
    fn find_chain(&self, n: &BigUint) -> Result<Chain, AddChainError> {
        if n.is_zero() {
            return Err(AddChainError::ZeroTarget);
        }
        Ok(self.minchain(n))
    }
}

impl SequenceAlgorithm for ContinuedFractions {
    #[tracing::instrument(skip_all, name = "ContinuedFractions::find_sequence")]
    fn find_sequence(&self, targets: &[BigUint]) -> Result<Chain, AddChainError> {
        if targets.is_empty() {
            return Err(AddChainError::NoTargets);
        }
        if targets.iter().any(|t| t.is_zero()) {
            return Err(AddChainError::ZeroTarget);
        }
        let s = sort_unique(targets.to_vec());
        let c = self.chain(&s);
        tracing::trace!(targets = s.len(), length = c.len(), "continued fractions sequence");
        Ok(c)
    }
}
