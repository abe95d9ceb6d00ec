use std::ops::Deref;

use derive_more::From;
use num::BigUint;
use num_traits::One;

use crate::utils::errors::AddChainError;

pub mod program;
pub mod random;

/// An addition chain: starts at 1 and every later element is the sum of two
/// earlier ones. Elements are appended, never modified in place.
#[derive(Clone, Debug, PartialEq, Eq, Hash, From)]
pub struct Chain(Vec<BigUint>);

impl Chain {
    /// The trivial chain `[1]`.
    pub fn new() -> Self {
        Self(vec![BigUint::one()])
    }

    pub fn from_u64s(xs: &[u64]) -> Self {
        Self(xs.iter().map(|&x| BigUint::from(x)).collect())
    }

    pub fn push(&mut self, x: BigUint) {
        self.0.push(x);
    }

    pub fn end(&self) -> Option<&BigUint> {
        self.0.last()
    }

    pub fn into_inner(self) -> Vec<BigUint> {
        self.0
    }

    pub fn validate(&self) -> Result<(), AddChainError> {
        self.program().map(|_| ())
    }

    /// Checks the chain is valid and ends at `target`.
    pub fn produces(&self, target: &BigUint) -> Result<(), AddChainError> {
        self.validate()?;
        match self.end() {
            Some(end) if end == target => Ok(()),
            Some(end) => Err(AddChainError::WrongEnd {
                expected: target.clone(),
                found: end.clone(),
            }),
            None => Err(AddChainError::EmptyChain),
        }
    }

    /// Checks the chain is valid and contains every element of `targets`.
    pub fn superset(&self, targets: &[BigUint]) -> Result<(), AddChainError> {
        self.validate()?;
        for t in targets {
            if !self.0.contains(t) {
                return Err(AddChainError::MissingTarget(t.clone()));
            }
        }
        Ok(())
    }

    pub fn is_ascending(&self) -> bool {
        self.0.windows(2).all(|w| w[0] < w[1])
    }

    /// Chain `a` followed by every non-initial element of `b` scaled by the
    /// end of `a`. Ends at `a.end() * b.end()`.
    pub fn product(a: &Chain, b: &Chain) -> Chain {
        let mut c = a.clone();
        if let Some(last) = a.end() {
            for x in b.0.iter().skip(1) {
                c.push(x * last);
            }
        }
        c
    }

    /// Chain `a` extended by `a.end() + x`, where `x` must already be in `a`.
    pub fn plus(a: &Chain, x: &BigUint) -> Chain {
        let mut c = a.clone();
        if let Some(last) = a.end() {
            c.push(last + x);
        }
        c
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Chain {
    type Target = [BigUint];

    fn deref(&self) -> &[BigUint] {
        &self.0
    }
}

impl FromIterator<BigUint> for Chain {
    fn from_iter<I: IntoIterator<Item = BigUint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
