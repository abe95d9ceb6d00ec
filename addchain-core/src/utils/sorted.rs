//! Operations over ascending, duplicate-free lists of integers.
use itertools::Itertools;
use num::BigUint;

/// Sorts `xs` and removes duplicates.
pub fn sort_unique(mut xs: Vec<BigUint>) -> Vec<BigUint> {
    xs.sort();
    xs.dedup();
    xs
}

/// Merges two sorted lists into one sorted, duplicate-free list.
pub fn merge_unique(a: &[BigUint], b: &[BigUint]) -> Vec<BigUint> {
    a.iter().merge(b.iter()).dedup().cloned().collect()
}

/// Inserts `x` into the sorted list `xs` unless already present.
pub fn insert_sorted_unique(xs: &mut Vec<BigUint>, x: BigUint) {
    if let Err(i) = xs.binary_search(&x) {
        xs.insert(i, x);
    }
}

pub fn contains_sorted(xs: &[BigUint], x: &BigUint) -> bool {
    xs.binary_search(x).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(xs: &[u64]) -> Vec<BigUint> {
        xs.iter().map(|&x| BigUint::from(x)).collect()
    }

    #[test]
    fn merge() {
        let a = ints(&[1, 3, 5, 9]);
        let b = ints(&[2, 3, 9, 10]);
        assert_eq!(merge_unique(&a, &b), ints(&[1, 2, 3, 5, 9, 10]));
        assert_eq!(merge_unique(&a, &[]), a);
    }

    #[test]
    fn insert_and_contains() {
        let mut xs = sort_unique(ints(&[7, 1, 7, 4]));
        assert_eq!(xs, ints(&[1, 4, 7]));
        insert_sorted_unique(&mut xs, BigUint::from(5u64));
        insert_sorted_unique(&mut xs, BigUint::from(4u64));
        assert_eq!(xs, ints(&[1, 4, 5, 7]));
        assert!(contains_sorted(&xs, &BigUint::from(5u64)));
        assert!(!contains_sorted(&xs, &BigUint::from(6u64)));
    }
}
