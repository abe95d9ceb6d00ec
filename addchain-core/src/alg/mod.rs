use std::fmt::Display;
use std::sync::Arc;

use num::BigUint;

use crate::chain::Chain;
use crate::utils::errors::AddChainError;

pub mod contfrac;
pub mod dict;
pub mod ensemble;
pub mod heuristic;
pub mod opt;

/// Produces an addition chain ending at a single target.
pub trait ChainAlgorithm: Display + Send + Sync {
    fn find_chain(&self, n: &BigUint) -> Result<Chain, AddChainError>;
}

/// Produces an addition chain containing every one of a set of targets.
pub trait SequenceAlgorithm: Display + Send + Sync {
    fn find_sequence(&self, targets: &[BigUint]) -> Result<Chain, AddChainError>;
}

impl<A: ChainAlgorithm + ?Sized> ChainAlgorithm for Box<A> {
    fn find_chain(&self, n: &BigUint) -> Result<Chain, AddChainError> {
        (**self).find_chain(n)
    }
}

impl<A: SequenceAlgorithm + ?Sized> SequenceAlgorithm for Box<A> {
    fn find_sequence(&self, targets: &[BigUint]) -> Result<Chain, AddChainError> {
        (**self).find_sequence(targets)
    }
}

impl<A: ChainAlgorithm + ?Sized> ChainAlgorithm for Arc<A> {
    fn find_chain(&self, n: &BigUint) -> Result<Chain, AddChainError> {
        (**self).find_chain(n)
    }
}

impl<A: SequenceAlgorithm + ?Sized> SequenceAlgorithm for Arc<A> {
    fn find_sequence(&self, targets: &[BigUint]) -> Result<Chain, AddChainError> {
        (**self).find_sequence(targets)
    }
}

/// Adapts a sequence algorithm to the single-target interface.
pub struct AsChainAlgorithm<S>(pub S);

impl<S: SequenceAlgorithm> Display for AsChainAlgorithm<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<S: SequenceAlgorithm> ChainAlgorithm for AsChainAlgorithm<S> {
    fn find_chain(&self, n: &BigUint) -> Result<Chain, AddChainError> {
        self.0.find_sequence(std::slice::from_ref(n))
    }
}
