//! Schemes for writing an integer as a sum of shifted dictionary terms.
use std::fmt::{self, Display};
use std::sync::Arc;

use num::BigUint;

use super::{Sum, Term};
use crate::utils::math::BigMath;

/// Splits an integer into a [`Sum`] with `decompose(x).int() == x`.
pub trait Decomposer: Display + Send + Sync {
    fn decompose(&self, x: &BigUint) -> Sum;
}

/// Fixed `k`-bit windows aligned from the most significant bit. Zero windows
/// are dropped.
#[derive(Clone, Copy, Debug)]
pub struct FixedWindow {
    pub k: u64,
}

impl Decomposer for FixedWindow {
    fn decompose(&self, x: &BigUint) -> Sum {
        assert!(self.k > 0);
        let mut sum = Sum::default();
        let mut h = x.bits();
        while h > 0 {
            let l = h.saturating_sub(self.k);
            let d = x.extract(l, h);
            if d.bits() > 0 {
                sum.push(Term::new(d, l));
            }
            h = l;
        }
        sum.sort_by_exponent();
        sum
    }
}

impl Display for FixedWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fixed_window({})", self.k)
    }
}

/// Windows of at most `k` bits that start and end on a set bit, scanning
/// from the most significant end.
#[derive(Clone, Copy, Debug)]
pub struct SlidingWindow {
    pub k: u64,
}

impl Decomposer for SlidingWindow {
    fn decompose(&self, x: &BigUint) -> Sum {
        assert!(self.k > 0);
        let mut sum = Sum::default();
        let mut next = x.bits();
        while let Some(h) = highest_set_below(x, next) {
            let mut l = (h + 1).saturating_sub(self.k);
            while !x.bit(l) {
                l += 1;
            }
            sum.push(Term::new(x.extract(l, h + 1), l));
            next = l;
        }
        sum.sort_by_exponent();
        sum
    }
}

impl Display for SlidingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sliding_window({})", self.k)
    }
}

/// Sliding windows scanned from the least significant end.
#[derive(Clone, Copy, Debug)]
pub struct SlidingWindowRtl {
    pub k: u64,
}

impl Decomposer for SlidingWindowRtl {
    fn decompose(&self, x: &BigUint) -> Sum {
        assert!(self.k > 0);
        let mut sum = Sum::default();
        let n = x.bits();
        let mut l = 0;
        while l < n {
            if !x.bit(l) {
                l += 1;
                continue;
            }
            let mut h = (l + self.k - 1).min(n - 1);
            while !x.bit(h) {
                h -= 1;
            }
            sum.push(Term::new(x.extract(l, h + 1), l));
            l = h + 1;
        }
        sum
    }
}

impl Display for SlidingWindowRtl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sliding_window_rtl({})", self.k)
    }
}

/// Sliding windows of at most `k` bits containing at most `z` zero bits.
///
/// Scanning is from the most significant end. When a window contains a zero
/// and the bit just below it is set, the window gives up its lowest run of
/// ones (and the zeros above it) to the next window.
#[derive(Clone, Copy, Debug)]
pub struct SlidingWindowShort {
    pub k: u64,
    pub z: u64,
}

impl Decomposer for SlidingWindowShort {
    fn decompose(&self, x: &BigUint) -> Sum {
        assert!(self.k > 0);
        let mut sum = Sum::default();
        let mut next = x.bits();
        while let Some(h) = highest_set_below(x, next) {
            // Grow downwards within the size and zero limits.
            let mut l = h;
            let mut zeros = 0;
            while l > 0 && h - (l - 1) < self.k {
                if !x.bit(l - 1) {
                    if zeros == self.z {
                        break;
                    }
                    zeros += 1;
                }
                l -= 1;
            }
            while !x.bit(l) {
                l += 1;
            }

            // Donate the trailing run of ones if it continues below the window.
            if l > 0 && x.bit(l - 1) {
                if let Some(gap) = (l..h).find(|&i| !x.bit(i)) {
                    let mut m = gap;
                    while !x.bit(m) {
                        m += 1;
                    }
                    l = m;
                }
            }

            sum.push(Term::new(x.extract(l, h + 1), l));
            next = l;
        }
        sum.sort_by_exponent();
        sum
    }
}

impl Display for SlidingWindowShort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sliding_window_short({},{})", self.k, self.z)
    }
}

/// Maximal runs of ones, each at most `t` bits long (`t = 0` is unbounded).
#[derive(Clone, Copy, Debug)]
pub struct RunLength {
    pub t: u64,
}

impl Decomposer for RunLength {
    fn decompose(&self, x: &BigUint) -> Sum {
        let mut sum = Sum::default();
        for (l, len) in runs(x, self.t) {
            sum.push(Term::new(BigUint::ones(len), l));
        }
        sum.sort_by_exponent();
        sum
    }
}

impl Display for RunLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run_length({})", self.t)
    }
}

/// Extracts runs of ones with length in `[t_min, t_max]` (`t_max = 0` is
/// unbounded) and hands the remaining bits to an inner decomposer.
#[derive(Clone)]
pub struct Hybrid {
    pub t_min: u64,
    pub t_max: u64,
    pub inner: Arc<dyn Decomposer>,
}

impl Hybrid {
    /// Hybrid with a `SlidingWindow{k: t_min - 1}` for the remainder. With
    /// `t_min <= 1` every run is extracted and the remainder is always zero.
    pub fn new(t_min: u64, t_max: u64) -> Self {
        Self {
            t_min,
            t_max,
            inner: Arc::new(SlidingWindow {
                k: t_min.saturating_sub(1).max(1),
            }),
        }
    }

    pub fn with_inner(t_min: u64, t_max: u64, inner: Arc<dyn Decomposer>) -> Self {
        Self {
            t_min,
            t_max,
            inner,
        }
    }
}

impl Decomposer for Hybrid {
    fn decompose(&self, x: &BigUint) -> Sum {
        let mut rem = x.clone();
        let mut sum = Sum::default();
        for (l, len) in runs(x, self.t_max) {
            if len < self.t_min {
                continue;
            }
            let d = BigUint::ones(len);
            rem ^= &d << l;
            sum.push(Term::new(d, l));
        }
        sum.extend(self.inner.decompose(&rem));
        sum.sort_by_exponent();
        sum
    }
}

impl Display for Hybrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hybrid({},{},{})", self.t_min, self.t_max, self.inner)
    }
}

/// Highest set bit strictly below `bound`.
fn highest_set_below(x: &BigUint, bound: u64) -> Option<u64> {
    (0..bound).rev().find(|&i| x.bit(i))
}

/// Runs of ones as `(low bit, length)`, from the most significant end, split
/// so no run exceeds `t` bits unless `t = 0`.
fn runs(x: &BigUint, t: u64) -> Vec<(u64, u64)> {
    let mut out = Vec::new();
    let mut next = x.bits();
    while let Some(h) = highest_set_below(x, next) {
        let mut l = h;
        while l > 0 && x.bit(l - 1) && (t == 0 || h - l + 1 < t) {
            l -= 1;
        }
        out.push((l, h - l + 1));
        next = l;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::random::random_target;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn terms(xs: &[(u64, u64)]) -> Sum {
        Sum::from(
            xs.iter()
                .map(|&(d, e)| Term::new(BigUint::from(d), e))
                .collect::<Vec<_>>(),
        )
    }

    fn decomposers() -> Vec<Box<dyn Decomposer>> {
        let mut ds: Vec<Box<dyn Decomposer>> = Vec::new();
        for k in 1..=8 {
            ds.push(Box::new(FixedWindow { k }));
            ds.push(Box::new(SlidingWindow { k }));
            ds.push(Box::new(SlidingWindowRtl { k }));
            for z in 0..=3 {
                ds.push(Box::new(SlidingWindowShort { k, z }));
            }
        }
        for t in [0, 1, 2, 3, 7] {
            ds.push(Box::new(RunLength { t }));
        }
        for t_min in 1..=5 {
            for t_max in [0, t_min, t_min + 3] {
                ds.push(Box::new(Hybrid::new(t_min, t_max)));
            }
        }
        ds.push(Box::new(Hybrid::new(1, 2)));
        ds
    }

    #[test]
    fn fixed_window() {
        let x = BigUint::from(0xbeef0u64) << 3;
        let sum = FixedWindow { k: 4 }.decompose(&x);
        assert_eq!(sum, terms(&[(0xf, 7), (0xe, 11), (0xe, 15), (0xb, 19)]));
    }

    #[test]
    fn sliding_window() {
        let sum = SlidingWindow { k: 4 }.decompose(&BigUint::from(0xf143u64));
        assert_eq!(sum, terms(&[(0x3, 0), (0x5, 6), (0xf, 12)]));
    }

    #[test]
    fn sliding_window_rtl() {
        let sum = SlidingWindowRtl { k: 4 }.decompose(&BigUint::from(0xf143u64));
        assert_eq!(sum, terms(&[(0x3, 0), (0x5, 6), (0xf, 12)]));
        let sum = SlidingWindowRtl { k: 3 }.decompose(&BigUint::from(0b1111u64));
        assert_eq!(sum, terms(&[(0b111, 0), (0b1, 3)]));
    }

    #[test]
    fn sliding_window_short() {
        // 101 1111: the first window 1011 sits on a run of ones that continues
        // below it, so it shrinks to 1 and donates 011 to the next window.
        let x = BigUint::from(0b101_1111u64);
        let sum = SlidingWindowShort { k: 4, z: 1 }.decompose(&x);
        assert_eq!(sum, terms(&[(0b1, 0), (0b1111, 1), (0b1, 6)]));

        // Window 1011 followed by a zero keeps its shape.
        let x = BigUint::from(0b1011_0111u64);
        let sum = SlidingWindowShort { k: 4, z: 1 }.decompose(&x);
        assert_eq!(sum, terms(&[(0b111, 0), (0b1011, 4)]));

        // No zeros allowed: windows are runs of ones up to k bits.
        let x = BigUint::from(0b1101_1101u64);
        let sum = SlidingWindowShort { k: 4, z: 0 }.decompose(&x);
        assert_eq!(sum, terms(&[(0b1, 0), (0b111, 2), (0b11, 6)]));
    }

    #[test]
    fn run_length() {
        let x = BigUint::from(0b1110_0111_1101u64);
        assert_eq!(
            RunLength { t: 0 }.decompose(&x),
            terms(&[(0b1, 0), (0b11111, 2), (0b111, 9)])
        );
        assert_eq!(
            RunLength { t: 2 }.decompose(&x),
            terms(&[(0b1, 0), (0b1, 2), (0b11, 3), (0b11, 5), (0b1, 9), (0b11, 10)])
        );
    }

    #[test]
    fn hybrid() {
        let x = BigUint::from(0b1110_0101_1111u64);
        let sum = Hybrid::new(4, 0).decompose(&x);
        assert_eq!(sum, terms(&[(0b11111, 0), (0b1, 6), (0b111, 9)]));
    }

    #[test]
    fn hybrid_single_bit_runs() {
        let x = BigUint::from(0b1011_0110u64);
        assert_eq!(
            Hybrid::new(1, 0).decompose(&x),
            terms(&[(0b11, 1), (0b11, 4), (0b1, 7)])
        );
        assert_eq!(
            Hybrid::new(1, 1).decompose(&x),
            terms(&[(0b1, 1), (0b1, 2), (0b1, 4), (0b1, 5), (0b1, 7)])
        );
        assert_eq!(Hybrid::new(1, 0).to_string(), "hybrid(1,0,sliding_window(1))");
    }

    #[test]
    fn decompositions_preserve_value() {
        let mut rng = ChaCha20Rng::seed_from_u64(0xdec0);
        let mut xs: Vec<BigUint> = (0..256u64).map(BigUint::from).collect();
        for bits in [63, 64, 65, 127, 255, 256] {
            for _ in 0..8 {
                xs.push(random_target(&mut rng, bits));
            }
        }
        for d in decomposers() {
            for x in xs.iter() {
                let sum = d.decompose(x);
                assert_eq!(sum.int(), *x, "{d} failed on {x}");
                assert!(sum.terms().iter().all(|t| t.d.bits() > 0));
            }
        }
    }
}
