use derive_more::From;
use fixedbitset::FixedBitSet;
use num_traits::One;

use super::Chain;
use crate::utils::errors::AddChainError;

/// A single chain step: the new position is `chain[i] + chain[j]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Op {
    pub i: usize,
    pub j: usize,
}

impl Op {
    pub fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }

    pub fn is_double(&self) -> bool {
        self.i == self.j
    }

    /// Distinct positions read by this step.
    pub fn operands(&self) -> Vec<usize> {
        if self.is_double() {
            vec![self.i]
        } else {
            vec![self.i, self.j]
        }
    }

    pub fn uses(&self, k: usize) -> bool {
        self.i == k || self.j == k
    }
}

/// Sequence of steps building an addition chain from the implicit initial 1.
/// Step `s` produces position `s + 1`.
#[derive(Clone, Debug, Default, PartialEq, Eq, From)]
pub struct Program(pub Vec<Op>);

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn ops(&self) -> &[Op] {
        &self.0
    }

    pub fn double(&mut self, i: usize) -> Result<usize, AddChainError> {
        self.add(i, i)
    }

    pub fn add(&mut self, i: usize, j: usize) -> Result<usize, AddChainError> {
        self.boundscheck(i)?;
        self.boundscheck(j)?;
        self.0.push(Op::new(i.min(j), i.max(j)));
        Ok(self.0.len())
    }

    /// Appends `s` doublings starting from position `i`, returning the final position.
    pub fn shift(&mut self, i: usize, s: usize) -> Result<usize, AddChainError> {
        self.boundscheck(i)?;
        let mut pos = i;
        for _ in 0..s {
            pos = self.double(pos)?;
        }
        Ok(pos)
    }

    fn boundscheck(&self, i: usize) -> Result<(), AddChainError> {
        if i > self.0.len() {
            return Err(AddChainError::OutOfBounds(i));
        }
        Ok(())
    }

    pub fn doubles(&self) -> usize {
        self.0.iter().filter(|op| op.is_double()).count()
    }

    pub fn adds(&self) -> usize {
        self.len() - self.doubles()
    }

    pub fn evaluate(&self) -> Chain {
        let mut c = Chain::new();
        for op in self.0.iter() {
            let x = &c[op.i] + &c[op.j];
            c.push(x);
        }
        c
    }

    /// How many times each position is read as an operand.
    pub fn read_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.len() + 1];
        for op in self.0.iter() {
            for i in op.operands() {
                counts[i] += 1;
            }
        }
        counts
    }

    /// For every position, the set of positions it transitively depends on
    /// (including itself).
    pub fn dependencies(&self) -> Vec<FixedBitSet> {
        let n = self.len() + 1;
        let mut deps: Vec<FixedBitSet> = Vec::with_capacity(n);
        let mut root = FixedBitSet::with_capacity(n);
        root.insert(0);
        deps.push(root);
        for (s, op) in self.0.iter().enumerate() {
            let mut d = FixedBitSet::with_capacity(n);
            d.insert(s + 1);
            d.union_with(&deps[op.i]);
            d.union_with(&deps[op.j]);
            deps.push(d);
        }
        deps
    }
}

impl Chain {
    /// Every derivation of position `k` as an ordered pair `i <= j < k`.
    pub fn ops(&self, k: usize) -> Vec<Op> {
        let target = &self[k];
        let mut ops = Vec::new();
        for i in 0..k {
            if self[i] > *target {
                continue;
            }
            let need = target - &self[i];
            for j in i..k {
                if self[j] == need {
                    ops.push(Op::new(i, j));
                }
            }
        }
        ops
    }

    /// First derivation of position `k`, scanning `i` then `j` ascending.
    pub fn op(&self, k: usize) -> Result<Op, AddChainError> {
        let target = &self[k];
        for i in 0..k {
            if self[i] > *target {
                continue;
            }
            let need = target - &self[i];
            for j in i..k {
                if self[j] == need {
                    return Ok(Op::new(i, j));
                }
            }
        }
        Err(AddChainError::Unreachable(k))
    }

    /// Derives a program for this chain by exhaustive search. Cubic in the
    /// chain length; chains are at most a few hundred elements.
    pub fn program(&self) -> Result<Program, AddChainError> {
        if self.is_empty() {
            return Err(AddChainError::EmptyChain);
        }
        if !self[0].is_one() {
            return Err(AddChainError::InvalidStart);
        }
        let mut p = Program::new();
        for k in 1..self.len() {
            p.0.push(self.op(k)?);
        }
        Ok(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders() {
        let mut p = Program::new();
        let two = p.double(0).unwrap();
        let three = p.add(0, two).unwrap();
        let twelve = p.shift(three, 2).unwrap();
        assert_eq!(twelve, 4);
        assert_eq!(p.evaluate(), Chain::from_u64s(&[1, 2, 3, 6, 12]));
        assert_eq!(p.doubles(), 3);
        assert_eq!(p.adds(), 1);
        assert_eq!(p.add(0, 9), Err(AddChainError::OutOfBounds(9)));
    }

    #[test]
    fn derived_program_round_trips() {
        let c = Chain::from_u64s(&[1, 2, 3, 5, 10, 13]);
        let p = c.program().unwrap();
        assert_eq!(
            p.ops(),
            &[
                Op::new(0, 0),
                Op::new(0, 1),
                Op::new(1, 2),
                Op::new(3, 3),
                Op::new(2, 4),
            ]
        );
        assert_eq!(p.evaluate(), c);
    }

    #[test]
    fn first_derivation_wins() {
        // 4 = 1 + 3 = 2 + 2
        let c = Chain::from_u64s(&[1, 2, 3, 4]);
        assert_eq!(c.op(3).unwrap(), Op::new(0, 2));
        assert_eq!(c.ops(3), vec![Op::new(0, 2), Op::new(1, 1)]);
    }

    #[test]
    fn read_counts_and_dependencies() {
        let c = Chain::from_u64s(&[1, 2, 3, 6, 7]);
        let p = c.program().unwrap();
        // ops: (0,0) (0,1) (2,2) (0,3)
        assert_eq!(p.read_counts(), vec![3, 1, 1, 1, 0]);

        let deps = p.dependencies();
        assert_eq!(deps[0].ones().collect::<Vec<_>>(), vec![0]);
        assert_eq!(deps[3].ones().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(deps[4].ones().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }
}
