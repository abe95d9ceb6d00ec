//! The default collection of algorithms and the top-level search entry points.
use std::sync::Arc;

use num::BigUint;

use super::contfrac::{strategies, ContinuedFractions, DichotomicStrategy};
use super::dict::decompose::{Decomposer, Hybrid, RunLength, SlidingWindow};
use super::dict::{DictAlgorithm, RunsAlgorithm};
use super::heuristic::{Approximation, DeltaLargest, Halving, HeuristicAlgorithm, UseFirst};
use super::opt::Optimized;
use super::{ChainAlgorithm, SequenceAlgorithm};
use crate::chain::Chain;
use crate::exec::{best, ExecResult, Parallel};
use crate::utils::errors::AddChainError;

/// Default sequence algorithms: two heuristic combinations and every
/// single-candidate continued fraction strategy.
pub fn sequence_algorithms() -> Vec<Arc<dyn SequenceAlgorithm>> {
    let mut seqalgs: Vec<Arc<dyn SequenceAlgorithm>> = vec![
        Arc::new(HeuristicAlgorithm::new(Box::new(UseFirst::new(vec![
            Box::new(Halving),
            Box::new(DeltaLargest),
        ])))),
        Arc::new(HeuristicAlgorithm::new(Box::new(UseFirst::new(vec![
            Box::new(Halving),
            Box::new(Approximation::default()),
        ])))),
    ];
    for strategy in strategies() {
        if strategy.singleton() {
            seqalgs.push(Arc::new(ContinuedFractions::new(strategy)));
        }
    }
    seqalgs
}

/// Default decomposers.
pub fn decomposers() -> Vec<Arc<dyn Decomposer>> {
    let mut ds: Vec<Arc<dyn Decomposer>> = Vec::new();
    for k in [4, 8, 16, 32, 64, 128] {
        ds.push(Arc::new(SlidingWindow { k }));
    }
    for t in [0, 2, 4, 8] {
        ds.push(Arc::new(RunLength { t }));
    }
    for k in 2..=8 {
        ds.push(Arc::new(Hybrid::new(k + 1, 0)));
    }
    ds
}

/// Every default decomposer paired with every default sequence algorithm,
/// plus the runs algorithm, each followed by optimization.
pub fn ensemble() -> Vec<Box<dyn ChainAlgorithm>> {
    let seqalgs = sequence_algorithms();
    let mut algorithms: Vec<Box<dyn ChainAlgorithm>> = Vec::new();
    for decomposer in decomposers() {
        for seqalg in seqalgs.iter() {
            algorithms.push(Box::new(Optimized::new(DictAlgorithm::new(
                decomposer.clone(),
                seqalg.clone(),
            ))));
        }
    }
    algorithms.push(Box::new(Optimized::new(RunsAlgorithm::new(Arc::new(
        ContinuedFractions::new(Box::new(DichotomicStrategy)),
    )))));
    algorithms
}

fn shortest(results: Vec<ExecResult>) -> Result<Chain, AddChainError> {
    if let Some(c) = best(&results).and_then(|r| r.chain()) {
        return Ok(c.clone());
    }
    Err(AddChainError::NoResult(
        results.into_iter().filter_map(|r| r.result.err()).collect(),
    ))
}

/// Shortest chain for `n` found by the default ensemble.
#[tracing::instrument(skip_all, name = "find_chain")]
pub fn find_chain(n: &BigUint) -> Result<Chain, AddChainError> {
    shortest(Parallel::new().execute(n, &ensemble()))
}

/// Shortest chain containing every target found by the default sequence
/// algorithms.
#[tracing::instrument(skip_all, name = "find_sequence")]
pub fn find_sequence(targets: &[BigUint]) -> Result<Chain, AddChainError> {
    shortest(Parallel::new().execute_sequence(targets, &sequence_algorithms()))
}
