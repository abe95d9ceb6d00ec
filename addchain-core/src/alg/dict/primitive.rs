//! Primitive reduction of a dictionary chain.
//!
//! A dictionary value read only once does not need its own chain position:
//! it can be folded into the target reconstruction as the sum of the terms it
//! was built from. Positions read at least twice (by the dictionary program or
//! by the target sum) are "primitive"; everything they depend on is primitive
//! too. The target sum is rewritten over primitive positions only, by pushing
//! integer coefficient vectors through the dictionary program.
use std::collections::HashMap;

use fixedbitset::FixedBitSet;
use num::BigUint;

use super::{Sum, Term};
use crate::chain::Chain;
use crate::utils::errors::AddChainError;
use crate::utils::math::BigMath;
use crate::utils::vector::BigVector;

/// Rewrites `sum` over the primitive positions of the dictionary chain `c`
/// and prunes `c` down to those positions.
///
/// Every dictionary value of `sum` must appear in `c`. The rewritten sum is
/// checked to have exactly the same value as the input.
#[tracing::instrument(skip_all, name = "primitive")]
pub fn primitive(sum: &Sum, c: &Chain) -> Result<(Sum, Chain), AddChainError> {
    let n = c.len();
    let p = c.program()?;

    let mut index: HashMap<&BigUint, usize> = HashMap::with_capacity(n);
    for (i, x) in c.iter().enumerate() {
        index.entry(x).or_insert(i);
    }
    let positions = sum
        .terms()
        .iter()
        .map(|t| {
            index
                .get(&t.d)
                .copied()
                .ok_or_else(|| AddChainError::MissingDictionaryTerm(t.d.clone()))
        })
        .collect::<Result<Vec<usize>, _>>()?;

    let mut counts = p.read_counts();
    for &i in positions.iter() {
        counts[i] += 1;
    }

    let deps = p.dependencies();
    let mut marked = FixedBitSet::with_capacity(n);
    marked.insert(0);
    for i in 0..n {
        if counts[i] >= 2 {
            marked.union_with(&deps[i]);
        }
    }

    // Each position as a combination of primitive positions.
    let ops = p.ops();
    let mut vc: Vec<BigVector> = Vec::with_capacity(n);
    for i in 0..n {
        let v = if marked.contains(i) {
            BigVector::basis(n, i)
        } else {
            let op = ops[i - 1];
            vc[op.i].add(&vc[op.j])
        };
        vc.push(v);
    }

    let mut v = BigVector::zero(n);
    for (t, &i) in sum.terms().iter().zip(positions.iter()) {
        v.add_assign(&vc[i].shl(t.e));
    }

    let mut out = Sum::default();
    for (i, coeff) in v.iter().enumerate() {
        for e in coeff.bits_set() {
            out.push(Term::new(c[i].clone(), e));
        }
    }
    out.sort_by_exponent();

    if out.int() != sum.int() {
        return Err(AddChainError::AssertionFailure(
            "primitive reduction changed the value of the sum".to_string(),
        ));
    }

    let pruned: Chain = marked.ones().map(|i| c[i].clone()).collect();
    tracing::trace!(
        before = n,
        after = pruned.len(),
        terms = out.len(),
        "primitive reduction"
    );
    Ok((out, pruned))
}
