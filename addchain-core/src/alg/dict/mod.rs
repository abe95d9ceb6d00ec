//! Dictionary methods: decompose the target into shifted dictionary terms,
//! solve an addition sequence for the dictionary, then rebuild the target.
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::sync::Arc;

use derive_more::From;
use num::BigUint;
use num_traits::{ToPrimitive, Zero};

use super::{ChainAlgorithm, SequenceAlgorithm};
use crate::chain::Chain;
use crate::utils::errors::AddChainError;
use crate::utils::math::BigMath;
use crate::utils::sorted::sort_unique;

pub mod decompose;
pub mod primitive;

use decompose::{Decomposer, RunLength};
use primitive::primitive;

/// The value `d * 2^e`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Term {
    pub d: BigUint,
    pub e: u64,
}

impl Term {
    pub fn new(d: BigUint, e: u64) -> Self {
        Self { d, e }
    }

    pub fn int(&self) -> BigUint {
        &self.d << self.e
    }
}

/// A list of terms, kept ordered by exponent once built.
#[derive(Clone, Debug, Default, PartialEq, Eq, From)]
pub struct Sum(Vec<Term>);

impl Sum {
    pub fn push(&mut self, t: Term) {
        self.0.push(t);
    }

    pub fn extend(&mut self, other: Sum) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn terms(&self) -> &[Term] {
        &self.0
    }

    pub fn sort_by_exponent(&mut self) {
        self.0.sort_by_key(|t| t.e);
    }

    pub fn int(&self) -> BigUint {
        self.0.iter().fold(BigUint::zero(), |acc, t| acc + t.int())
    }

    /// Distinct `d` values, ascending.
    pub fn dictionary(&self) -> Vec<BigUint> {
        sort_unique(self.0.iter().map(|t| t.d.clone()).collect())
    }
}

/// Chain steps that evaluate an exponent-ordered sum, assuming every `d` is
/// already available: start from the highest term, double across each
/// exponent gap and add in the next term.
pub fn sum_chain(sum: &Sum) -> Vec<BigUint> {
    let terms = sum.terms();
    let mut out = Vec::new();
    let Some(top) = terms.last() else {
        return out;
    };
    let mut cur = top.d.clone();
    for k in (1..terms.len()).rev() {
        for _ in terms[k - 1].e..terms[k].e {
            cur <<= 1;
            out.push(cur.clone());
        }
        cur += &terms[k - 1].d;
        out.push(cur.clone());
    }
    for _ in 0..terms[0].e {
        cur <<= 1;
        out.push(cur.clone());
    }
    out
}

/// Reduces `sum` against the dictionary chain `c` and appends the steps
/// rebuilding the target.
fn finish(sum: &Sum, c: &Chain) -> Result<Chain, AddChainError> {
    let (sum, c) = primitive(sum, c)?;
    let mut xs = c.into_inner();
    xs.extend(sum_chain(&sum));
    Ok(Chain::from(sort_unique(xs)))
}

pub struct DictAlgorithm {
    decomposer: Arc<dyn Decomposer>,
    seqalg: Arc<dyn SequenceAlgorithm>,
}

impl DictAlgorithm {
    pub fn new(decomposer: Arc<dyn Decomposer>, seqalg: Arc<dyn SequenceAlgorithm>) -> Self {
        Self { decomposer, seqalg }
    }
}

impl Display for DictAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dictionary({},{})", self.decomposer, self.seqalg)
    }
}

impl ChainAlgorithm for DictAlgorithm {
    #[tracing::instrument(skip_all, name = "DictAlgorithm::find_chain")]
    fn find_chain(&self, n: &BigUint) -> Result<Chain, AddChainError> {
        if n.is_zero() {
            return Err(AddChainError::ZeroTarget);
        }
        let mut sum = self.decomposer.decompose(n);
        sum.sort_by_exponent();
        let dict = sum.dictionary();
        let c = self.seqalg.find_sequence(&dict)?;
        tracing::debug!(
            terms = sum.len(),
            dictionary = dict.len(),
            sequence = c.len(),
            "{}",
            self
        );
        finish(&sum, &c)
    }
}

/// Dictionary of runs of ones, built from an addition sequence over the run
/// lengths.
pub struct RunsAlgorithm {
    seqalg: Arc<dyn SequenceAlgorithm>,
}

impl RunsAlgorithm {
    pub fn new(seqalg: Arc<dyn SequenceAlgorithm>) -> Self {
        Self { seqalg }
    }
}

impl Display for RunsAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "runs({})", self.seqalg)
    }
}

impl ChainAlgorithm for RunsAlgorithm {
    #[tracing::instrument(skip_all, name = "RunsAlgorithm::find_chain")]
    fn find_chain(&self, n: &BigUint) -> Result<Chain, AddChainError> {
        if n.is_zero() {
            return Err(AddChainError::ZeroTarget);
        }
        let sum = RunLength { t: 0 }.decompose(n);
        let lengths: Vec<BigUint> = sum
            .dictionary()
            .iter()
            .map(|run| BigUint::from(run.bits()))
            .collect();
        let lc = self.seqalg.find_sequence(&lengths)?;
        let c = runs_chain(&lc)?;
        finish(&sum, &c)
    }
}

/// Lifts a chain over run lengths `l` into a chain over runs `2^l - 1`,
/// using `r(a + b) = r(b) * 2^a + r(a)`.
pub fn runs_chain(lc: &Chain) -> Result<Chain, AddChainError> {
    let p = lc.program()?;
    let mut c = Chain::new();
    // Largest shift of each run emitted so far.
    let mut shifts: HashMap<u64, u64> = HashMap::new();
    for op in p.ops() {
        let (a, b) = if lc[op.i] <= lc[op.j] {
            (&lc[op.i], &lc[op.j])
        } else {
            (&lc[op.j], &lc[op.i])
        };
        let la = a
            .to_u64()
            .ok_or_else(|| AddChainError::LengthOverflow(a.clone()))?;
        let lb = b
            .to_u64()
            .ok_or_else(|| AddChainError::LengthOverflow(b.clone()))?;
        let rb = BigUint::ones(lb);
        let s = shifts.entry(lb).or_default();
        while *s < la {
            *s += 1;
            c.push(&rb << *s);
        }
        c.push(BigUint::ones(la + lb));
    }
    Ok(c)
}
