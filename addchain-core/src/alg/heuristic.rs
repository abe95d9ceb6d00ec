//! Bos-Coster style addition sequences. A sorted protosequence is reduced by
//! repeatedly popping its largest element and asking a [`Heuristic`] which
//! smaller values to insert so that the popped element becomes reachable.
use std::fmt::{self, Display};

use itertools::Itertools;
use num::BigUint;
use num_traits::Zero;

use super::{ChainAlgorithm, SequenceAlgorithm};
use crate::chain::Chain;
use crate::utils::errors::AddChainError;
use crate::utils::sorted::{insert_sorted_unique, merge_unique, sort_unique};

/// Proposes insertions into the protosequence `f` that make `target`
/// reachable. `f` is sorted, duplicate-free and every element is below
/// `target`. An empty proposal means the heuristic does not apply.
pub trait Heuristic: Display + Send + Sync {
    fn suggest(&self, f: &[BigUint], target: &BigUint) -> Vec<BigUint>;
}

/// Tries each heuristic in order and returns the first non-empty proposal.
pub struct UseFirst(Vec<Box<dyn Heuristic>>);

impl UseFirst {
    pub fn new(heuristics: Vec<Box<dyn Heuristic>>) -> Self {
        Self(heuristics)
    }
}

impl Heuristic for UseFirst {
    fn suggest(&self, f: &[BigUint], target: &BigUint) -> Vec<BigUint> {
        self.0
            .iter()
            .map(|h| h.suggest(f, target))
            .find(|insert| !insert.is_empty())
            .unwrap_or_default()
    }
}

impl Display for UseFirst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "use_first({})", self.0.iter().join(","))
    }
}

/// Inserts `target - max(f)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeltaLargest;

impl Heuristic for DeltaLargest {
    fn suggest(&self, f: &[BigUint], target: &BigUint) -> Vec<BigUint> {
        match f.last() {
            Some(max) if max < target => vec![target - max],
            _ => Vec::new(),
        }
    }
}

impl Display for DeltaLargest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "delta_largest")
    }
}

/// Looks for pairs `a <= b` in the protosequence whose sum falls short of the
/// target by at most `target / ratio`, and inserts `a + delta` for each so
/// that `target = b + (a + delta)`. Without such a pair the closest
/// approximation is used.
#[derive(Clone, Copy, Debug)]
pub struct Approximation {
    pub ratio: u64,
}

impl Approximation {
    pub fn new(ratio: u64) -> Self {
        assert!(ratio > 0);
        Self { ratio }
    }
}

impl Default for Approximation {
    fn default() -> Self {
        Self::new(1 << 20)
    }
}

impl Heuristic for Approximation {
    fn suggest(&self, f: &[BigUint], target: &BigUint) -> Vec<BigUint> {
        let bound = target / self.ratio;
        let mut matches = Vec::new();
        // (delta, insertion) of the closest pair seen.
        let mut closest: Option<(BigUint, BigUint)> = None;
        for (i, a) in f.iter().enumerate() {
            for b in f[i..].iter() {
                let s = a + b;
                if s > *target {
                    break;
                }
                let delta = target - s;
                let insert = a + &delta;
                if delta <= bound {
                    matches.push(insert.clone());
                }
                if closest.as_ref().map_or(true, |(d, _)| delta < *d) {
                    closest = Some((delta, insert));
                }
            }
        }
        if !matches.is_empty() {
            return sort_unique(matches);
        }
        closest.map(|(_, insert)| vec![insert]).unwrap_or_default()
    }
}

impl Display for Approximation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "approximation({})", self.ratio)
    }
}

/// When the target is at least twice the largest element `m`, writes it as
/// `k * 2^u + d` with `2^u <= target / m` and inserts `d` together with the
/// doubling ladder `k, 2k, ..., k * 2^u`, sorted and without duplicates.
#[derive(Clone, Copy, Debug, Default)]
pub struct Halving;

impl Heuristic for Halving {
    fn suggest(&self, f: &[BigUint], target: &BigUint) -> Vec<BigUint> {
        let Some(max) = f.last() else {
            return Vec::new();
        };
        let r = target / max;
        if r.bits() < 2 {
            return Vec::new();
        }
        let u = r.bits() - 1;
        let k = target >> u;
        let d = target - (&k << u);

        let mut insert = Vec::with_capacity(u as usize + 2);
        for j in 0..=u {
            let x = &k << j;
            if x == *target {
                break;
            }
            insert.push(x);
        }
        if !d.is_zero() {
            insert_sorted_unique(&mut insert, d);
        }
        insert
    }
}

impl Display for Halving {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "halving")
    }
}

pub struct HeuristicAlgorithm {
    heuristic: Box<dyn Heuristic>,
}

impl HeuristicAlgorithm {
    pub fn new(heuristic: Box<dyn Heuristic>) -> Self {
        Self { heuristic }
    }
}

impl Display for HeuristicAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "heuristic({})", self.heuristic)
    }
}

impl SequenceAlgorithm for HeuristicAlgorithm {
    #[tracing::instrument(skip_all, name = "HeuristicAlgorithm::find_sequence")]
    fn find_sequence(&self, targets: &[BigUint]) -> Result<Chain, AddChainError> {
        if targets.is_empty() {
            return Err(AddChainError::NoTargets);
        }
        if targets.iter().any(|t| t.is_zero()) {
            return Err(AddChainError::ZeroTarget);
        }

        let leader = vec![BigUint::from(1u32), BigUint::from(2u32)];
        let mut proto = merge_unique(&leader, &sort_unique(targets.to_vec()));
        let mut popped: Vec<BigUint> = Vec::new();
        while proto.len() > 2 {
            let Some(target) = proto.pop() else {
                break;
            };
            let insert = self.heuristic.suggest(&proto, &target);
            if insert.is_empty() {
                return Err(AddChainError::NoSuggestion(target));
            }
            if let Some(bad) = insert.iter().find(|x| x.is_zero() || **x >= target) {
                return Err(AddChainError::InvalidSuggestion {
                    target: target.clone(),
                    value: bad.clone(),
                });
            }
            proto = merge_unique(&proto, &sort_unique(insert));
            insert_sorted_unique(&mut popped, target);
        }
        tracing::trace!(length = popped.len() + 2, "{}", self);
        Ok(Chain::from(merge_unique(&leader, &popped)))
    }
}

impl ChainAlgorithm for HeuristicAlgorithm {
    fn find_chain(&self, n: &BigUint) -> Result<Chain, AddChainError> {
        let c = self.find_sequence(std::slice::from_ref(n))?;
        // Only 1 and 2 can lie above the target.
        Ok(c.iter().filter(|x| *x <= n).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::random::random_target;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn ints(xs: &[u64]) -> Vec<BigUint> {
        xs.iter().map(|&x| BigUint::from(x)).collect()
    }

    fn big(x: u64) -> BigUint {
        BigUint::from(x)
    }

    #[test]
    fn halving() {
        assert_eq!(
            Halving.suggest(&ints(&[14]), &big(382)),
            ints(&[14, 23, 46, 92, 184, 368])
        );
        // Exact multiple: no residual and the ladder stops below the target.
        assert_eq!(Halving.suggest(&ints(&[3]), &big(24)), ints(&[3, 6, 12]));
        // The residual lands in order among the ladder.
        assert_eq!(
            Halving.suggest(&ints(&[1, 2]), &big(1000)),
            ints(&[3, 6, 12, 24, 48, 96, 192, 232, 384, 768])
        );
        // A residual equal to a ladder value is not repeated.
        assert_eq!(Halving.suggest(&ints(&[3]), &big(27)), ints(&[3, 6, 12, 24]));
        assert!(Halving.suggest(&ints(&[1, 2, 10]), &big(15)).is_empty());
    }

    #[test]
    fn delta_largest() {
        assert_eq!(DeltaLargest.suggest(&ints(&[1, 2, 7]), &big(19)), ints(&[12]));
    }

    #[test]
    fn approximation() {
        let f = ints(&[1, 2, 5, 9]);
        assert_eq!(Approximation::new(1000).suggest(&f, &big(20)), ints(&[11]));
        assert_eq!(Approximation::new(2).suggest(&f, &big(20)), ints(&[11, 15]));
        // An exact pair inserts a value already present.
        assert_eq!(Approximation::new(1000).suggest(&f, &big(14)), ints(&[5]));
    }

    #[test]
    fn use_first() {
        let h = UseFirst::new(vec![Box::new(Halving), Box::new(DeltaLargest)]);
        assert_eq!(h.suggest(&ints(&[1, 2, 10]), &big(15)), ints(&[5]));
        assert_eq!(h.suggest(&ints(&[14]), &big(382)).len(), 6);
        assert_eq!(h.to_string(), "use_first(halving,delta_largest)");
    }

    #[test]
    fn no_suggestion_is_an_error() {
        let a = HeuristicAlgorithm::new(Box::new(Halving));
        assert_eq!(
            a.find_sequence(&ints(&[3])),
            Err(AddChainError::NoSuggestion(big(3)))
        );
    }

    /// Always proposes the same fixed values.
    struct Fixed(Vec<BigUint>);

    impl Heuristic for Fixed {
        fn suggest(&self, _: &[BigUint], _: &BigUint) -> Vec<BigUint> {
            self.0.clone()
        }
    }

    impl Display for Fixed {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fixed")
        }
    }

    /// Proposes the target itself.
    struct Echo;

    impl Heuristic for Echo {
        fn suggest(&self, _: &[BigUint], target: &BigUint) -> Vec<BigUint> {
            vec![target.clone()]
        }
    }

    impl Display for Echo {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "echo")
        }
    }

    #[test]
    fn out_of_range_suggestions_are_rejected() {
        let a = HeuristicAlgorithm::new(Box::new(Echo));
        assert_eq!(
            a.find_sequence(&ints(&[10])),
            Err(AddChainError::InvalidSuggestion {
                target: big(10),
                value: big(10),
            })
        );

        let a = HeuristicAlgorithm::new(Box::new(Fixed(ints(&[0]))));
        assert_eq!(
            a.find_sequence(&ints(&[10])),
            Err(AddChainError::InvalidSuggestion {
                target: big(10),
                value: big(0),
            })
        );

        let a = HeuristicAlgorithm::new(Box::new(Fixed(ints(&[4, 12]))));
        assert_eq!(
            a.find_chain(&big(10)),
            Err(AddChainError::InvalidSuggestion {
                target: big(10),
                value: big(12),
            })
        );
    }

    #[test]
    fn small_targets() {
        let heuristics: Vec<Box<dyn Heuristic>> = vec![
            Box::new(DeltaLargest),
            Box::new(Approximation::default()),
            Box::new(Approximation::new(4)),
            Box::new(UseFirst::new(vec![Box::new(Halving), Box::new(DeltaLargest)])),
        ];
        for h in heuristics {
            let a = HeuristicAlgorithm::new(h);
            for n in 1..300u64 {
                let c = a.find_chain(&big(n)).unwrap();
                c.produces(&big(n)).unwrap_or_else(|e| panic!("{a} on {n}: {e}"));
            }
        }
    }

    #[test]
    fn large_targets_and_sequences() {
        let mut rng = ChaCha20Rng::seed_from_u64(0xb05c);
        let algorithms = [
            HeuristicAlgorithm::new(Box::new(UseFirst::new(vec![
                Box::new(Halving),
                Box::new(DeltaLargest),
            ]))),
            HeuristicAlgorithm::new(Box::new(UseFirst::new(vec![
                Box::new(Halving),
                Box::new(Approximation::default()),
            ]))),
        ];
        for a in algorithms.iter() {
            for bits in [64, 128, 255] {
                let n = random_target(&mut rng, bits);
                a.find_chain(&n).unwrap().produces(&n).unwrap();
            }
            let targets: Vec<BigUint> = (0..6).map(|_| random_target(&mut rng, 96)).collect();
            let c = a.find_sequence(&targets).unwrap();
            c.superset(&targets).unwrap();
            assert!(c.is_ascending());
        }
    }
}
