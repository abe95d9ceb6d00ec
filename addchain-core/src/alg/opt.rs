//! Removal of redundant chain positions.
use std::fmt::{self, Display};

use num::BigUint;

use super::ChainAlgorithm;
use crate::chain::{program::Op, Chain};
use crate::utils::errors::AddChainError;

/// Drops positions that no later position needs.
///
/// Every position starts with all of its derivations. A position is required
/// once some later position has exactly one derivation left and that
/// derivation reads it. Positions are visited in ascending order; an
/// unrequired one is struck from every later derivation list, which can leave
/// a later position with a single derivation and so require its operands.
/// Unrequired positions are then deleted. The last position is always kept.
#[tracing::instrument(skip_all, name = "optimize")]
pub fn optimize(c: &Chain) -> Result<Chain, AddChainError> {
    c.validate()?;
    let n = c.len();

    let mut ops: Vec<Vec<Op>> = (0..n)
        .map(|k| if k == 0 { Vec::new() } else { c.ops(k) })
        .collect();

    let mut required = vec![0usize; n];
    for k in 1..n {
        if let [op] = ops[k].as_slice() {
            for i in op.operands() {
                required[i] += 1;
            }
        }
    }

    for i in 0..n.saturating_sub(1) {
        if required[i] > 0 {
            continue;
        }
        for k in i + 1..n {
            let before = ops[k].len();
            ops[k].retain(|op| !op.uses(i));
            if before > 1 {
                if let [op] = ops[k].as_slice() {
                    for j in op.operands() {
                        required[j] += 1;
                    }
                }
            }
            if ops[k].is_empty() {
                return Err(AddChainError::AssertionFailure(format!(
                    "position {k} lost every derivation"
                )));
            }
        }
    }

    let out: Chain = c
        .iter()
        .enumerate()
        .filter(|&(i, _)| i == 0 || i == n - 1 || required[i] > 0)
        .map(|(_, x)| x.clone())
        .collect();
    tracing::trace!(before = n, after = out.len(), "optimize");
    Ok(out)
}

/// Runs an algorithm and optimizes its result.
pub struct Optimized<A> {
    pub algorithm: A,
}

impl<A> Optimized<A> {
    pub fn new(algorithm: A) -> Self {
        Self { algorithm }
    }
}

impl<A: Display> Display for Optimized<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "opt({})", self.algorithm)
    }
}

impl<A: ChainAlgorithm> ChainAlgorithm for Optimized<A> {
    fn find_chain(&self, n: &BigUint) -> Result<Chain, AddChainError> {
        let c = self.algorithm.find_chain(n)?;
        optimize(&c)
    }
}
