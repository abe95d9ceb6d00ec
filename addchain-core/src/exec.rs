//! Runs an ensemble of algorithms against one target and gathers the results
//! in input order.
use std::time::{Duration, Instant};

use num::BigUint;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::alg::{ChainAlgorithm, SequenceAlgorithm};
use crate::chain::{program::Program, Chain};
use crate::utils::errors::AddChainError;

/// Outcome of one algorithm on one target.
#[derive(Debug)]
pub struct ExecResult {
    pub targets: Vec<BigUint>,
    pub algorithm: String,
    pub result: Result<(Chain, Program), AddChainError>,
    pub elapsed: Duration,
}

impl ExecResult {
    pub fn chain(&self) -> Option<&Chain> {
        self.result.as_ref().ok().map(|(c, _)| c)
    }

    pub fn program(&self) -> Option<&Program> {
        self.result.as_ref().ok().map(|(_, p)| p)
    }

    pub fn error(&self) -> Option<&AddChainError> {
        self.result.as_ref().err()
    }
}

/// The shortest successful result, preferring the earliest on ties.
pub fn best(results: &[ExecResult]) -> Option<&ExecResult> {
    results
        .iter()
        .filter(|r| r.result.is_ok())
        .min_by_key(|r| r.chain().map_or(usize::MAX, |c| c.len()))
}

/// Fan-out/fan-in executor. Each algorithm runs as one task; results are
/// only returned once every task has finished.
#[derive(Clone, Copy, Debug, Default)]
pub struct Parallel {
    limit: Option<usize>,
}

impl Parallel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs at most `limit` algorithms at a time.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit.max(1)),
        }
    }

    #[tracing::instrument(skip_all, name = "Parallel::execute")]
    pub fn execute<A: ChainAlgorithm>(&self, n: &BigUint, algorithms: &[A]) -> Vec<ExecResult> {
        let results = self.run(algorithms, |a| {
            evaluate(std::slice::from_ref(n), a.to_string(), || {
                let c = a.find_chain(n)?;
                c.produces(n)?;
                Ok(c)
            })
        });
        summarize(&results);
        results
    }

    #[tracing::instrument(skip_all, name = "Parallel::execute_sequence")]
    pub fn execute_sequence<S: SequenceAlgorithm>(
        &self,
        targets: &[BigUint],
        algorithms: &[S],
    ) -> Vec<ExecResult> {
        let results = self.run(algorithms, |a| {
            evaluate(targets, a.to_string(), || {
                let c = a.find_sequence(targets)?;
                c.superset(targets)?;
                Ok(c)
            })
        });
        summarize(&results);
        results
    }

    #[cfg(feature = "parallel")]
    fn run<T, F>(&self, items: &[T], f: F) -> Vec<ExecResult>
    where
        T: Sync,
        F: Fn(&T) -> ExecResult + Sync + Send,
    {
        let Some(limit) = self.limit else {
            return items.par_iter().map(&f).collect();
        };
        match rayon::ThreadPoolBuilder::new().num_threads(limit).build() {
            Ok(pool) => pool.install(|| items.par_iter().map(&f).collect()),
            Err(err) => {
                tracing::warn!("falling back to the global pool: {err}");
                items.par_iter().map(&f).collect()
            }
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn run<T, F>(&self, items: &[T], f: F) -> Vec<ExecResult>
    where
        F: Fn(&T) -> ExecResult,
    {
        items.iter().map(f).collect()
    }
}

fn evaluate<F>(targets: &[BigUint], algorithm: String, f: F) -> ExecResult
where
    F: FnOnce() -> Result<Chain, AddChainError>,
{
    let start = Instant::now();
    let result = f().and_then(|c| {
        let p = c.program()?;
        Ok((c, p))
    });
    let elapsed = start.elapsed();
    match &result {
        Ok((c, p)) => tracing::debug!(
            length = c.len(),
            doubles = p.doubles(),
            adds = p.adds(),
            ?elapsed,
            "{algorithm}"
        ),
        Err(err) => tracing::debug!(?elapsed, "{algorithm} failed: {err}"),
    }
    ExecResult {
        targets: targets.to_vec(),
        algorithm,
        result,
        elapsed,
    }
}

fn summarize(results: &[ExecResult]) {
    let failed = results.iter().filter(|r| r.result.is_err()).count();
    match best(results) {
        Some(r) => tracing::info!(
            algorithms = results.len(),
            failed,
            best = r.chain().map_or(0, |c| c.len()),
            "best result from {}",
            r.algorithm
        ),
        None => tracing::info!(algorithms = results.len(), failed, "no successful result"),
    }
}
