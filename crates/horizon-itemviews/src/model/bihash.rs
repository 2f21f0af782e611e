//! Strict one-to-one bidirectional maps.
//!
//! - [`BiHash`] hashes both sides.
//! - [`BiMap`] hashes the left side and keeps the right side ordered, which
//!   adds bound and predecessor queries on right keys.
//!
//! Inserting a pair evicts any pair that shares either key, so every left key
//! maps to at most one right key and vice versa.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::ops::{Bound, RangeBounds};

/// Bidirectional map with both sides hashed.
#[derive(Debug, Clone)]
pub struct BiHash<L, R> {
    left: HashMap<L, R>,
    right: HashMap<R, L>,
}

impl<L, R> Default for BiHash<L, R> {
    fn default() -> Self {
        Self {
            left: HashMap::new(),
            right: HashMap::new(),
        }
    }
}

impl<L, R> BiHash<L, R>
where
    L: Eq + Hash + Clone,
    R: Eq + Hash + Clone,
{
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `l` to `r`, evicting any pair that already uses either key.
    pub fn insert(&mut self, l: L, r: R) {
        if let Some(old_r) = self.left.remove(&l) {
            self.right.remove(&old_r);
        }
        if let Some(old_l) = self.right.remove(&r) {
            self.left.remove(&old_l);
        }
        self.left.insert(l.clone(), r.clone());
        self.right.insert(r, l);
    }

    pub fn left_to_right(&self, l: &L) -> Option<&R> {
        self.left.get(l)
    }

    pub fn right_to_left(&self, r: &R) -> Option<&L> {
        self.right.get(r)
    }

    pub fn contains_left(&self, l: &L) -> bool {
        self.left.contains_key(l)
    }

    pub fn contains_right(&self, r: &R) -> bool {
        self.right.contains_key(r)
    }

    /// Removes the pair with left key `l`, returning its right key.
    pub fn remove_left(&mut self, l: &L) -> Option<R> {
        let r = self.left.remove(l)?;
        self.right.remove(&r);
        Some(r)
    }

    /// Removes the pair with right key `r`, returning its left key.
    pub fn remove_right(&mut self, r: &R) -> Option<L> {
        let l = self.right.remove(r)?;
        self.left.remove(&l);
        Some(l)
    }

    /// Keeps only the pairs for which `keep` returns `true`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&L, &R) -> bool,
    {
        let right = &mut self.right;
        self.left.retain(|l, r| {
            let kept = keep(l, r);
            if !kept {
                right.remove(&*r);
            }
            kept
        });
    }

    /// Iterates over all pairs in hash order.
    pub fn iter(&self) -> impl Iterator<Item = (&L, &R)> {
        self.left.iter()
    }

    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}

/// Bidirectional map whose right side is ordered.
#[derive(Debug, Clone)]
pub struct BiMap<L, R> {
    left: HashMap<L, R>,
    right: BTreeMap<R, L>,
}

impl<L, R> Default for BiMap<L, R> {
    fn default() -> Self {
        Self {
            left: HashMap::new(),
            right: BTreeMap::new(),
        }
    }
}

impl<L, R> BiMap<L, R>
where
    L: Eq + Hash + Clone,
    R: Ord + Clone,
{
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `l` to `r`, evicting any pair that already uses either key.
    pub fn insert(&mut self, l: L, r: R) {
        if let Some(old_r) = self.left.remove(&l) {
            self.right.remove(&old_r);
        }
        if let Some(old_l) = self.right.remove(&r) {
            self.left.remove(&old_l);
        }
        self.left.insert(l.clone(), r.clone());
        self.right.insert(r, l);
    }

    pub fn left_to_right(&self, l: &L) -> Option<&R> {
        self.left.get(l)
    }

    pub fn right_to_left(&self, r: &R) -> Option<&L> {
        self.right.get(r)
    }

    pub fn contains_left(&self, l: &L) -> bool {
        self.left.contains_key(l)
    }

    pub fn contains_right(&self, r: &R) -> bool {
        self.right.contains_key(r)
    }

    /// Removes the pair with left key `l`, returning its right key.
    pub fn remove_left(&mut self, l: &L) -> Option<R> {
        let r = self.left.remove(l)?;
        self.right.remove(&r);
        Some(r)
    }

    /// Removes the pair with right key `r`, returning its left key.
    pub fn remove_right(&mut self, r: &R) -> Option<L> {
        let l = self.right.remove(r)?;
        self.left.remove(&l);
        Some(l)
    }

    /// Keeps only the pairs for which `keep` returns `true`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&L, &R) -> bool,
    {
        let left = &mut self.left;
        self.right.retain(|r, l| {
            let kept = keep(l, r);
            if !kept {
                left.remove(&*l);
            }
            kept
        });
    }

    /// Smallest pair whose right key is `>= r`.
    pub fn right_lower_bound(&self, r: &R) -> Option<(&R, &L)> {
        self.right.range(r..).next()
    }

    /// Smallest pair whose right key is `> r`.
    pub fn right_upper_bound(&self, r: &R) -> Option<(&R, &L)> {
        self.right
            .range((Bound::Excluded(r), Bound::Unbounded))
            .next()
    }

    /// Largest pair whose right key is `<= r`.
    pub fn right_predecessor(&self, r: &R) -> Option<(&R, &L)> {
        self.right.range(..=r).next_back()
    }

    /// Iterates, in right-key order, over the pairs whose right key is in `range`.
    pub fn range_right<B>(&self, range: B) -> impl DoubleEndedIterator<Item = (&R, &L)>
    where
        B: RangeBounds<R>,
    {
        self.right.range(range)
    }

    /// Iterates over all pairs in right-key order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&R, &L)> {
        self.right.iter()
    }

    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}
