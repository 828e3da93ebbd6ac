//! One-to-one index that can be queried from either side.

use std::{collections::HashMap, fmt, hash::Hash};

use thiserror::Error;

/// Associates pairs of values so each can be looked up from the other.
///
/// Both sides are unique: a left value maps to exactly one right value and
/// vice versa. The two tables are only ever updated together.
#[derive(Clone)]
pub struct BidirectionalMap<L, R> {
    forward: HashMap<L, R>,
    reverse: HashMap<R, L>,
}

impl<L, R> BidirectionalMap<L, R>
where
    L: Eq + Hash + Clone,
    R: Eq + Hash + Clone,
{
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            forward: HashMap::new(),
            reverse: HashMap::new(),
        }
    }

    /// Creates an empty map with room for `capacity` pairs.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            forward: HashMap::with_capacity(capacity),
            reverse: HashMap::with_capacity(capacity),
        }
    }

    /// Associates `left` with `right`.
    ///
    /// Fails without modifying the map when either value is already part of
    /// another pair.
    pub fn insert(&mut self, left: L, right: R) -> Result<(), DuplicateKeyError> {
        if self.forward.contains_key(&left) {
            return Err(DuplicateKeyError { side: MapSide::Left });
        }
        if self.reverse.contains_key(&right) {
            return Err(DuplicateKeyError {
                side: MapSide::Right,
            });
        }

        let _ = self.forward.insert(left.clone(), right.clone());
        let _ = self.reverse.insert(right, left);
        Ok(())
    }

    /// Right value paired with `left`, if any.
    #[must_use]
    pub fn get_by_left(&self, left: &L) -> Option<&R> {
        self.forward.get(left)
    }

    /// Left value paired with `right`, if any.
    #[must_use]
    pub fn get_by_right(&self, right: &R) -> Option<&L> {
        self.reverse.get(right)
    }

    /// Right value paired with `left`, or `R::default()` when absent.
    ///
    /// A miss is indistinguishable from a pair holding the default value; use
    /// [`BidirectionalMap::get_by_left`] when the difference matters.
    #[must_use]
    pub fn right_or_default(&self, left: &L) -> R
    where
        R: Default,
    {
        self.forward.get(left).cloned().unwrap_or_default()
    }

    /// Left value paired with `right`, or `L::default()` when absent.
    #[must_use]
    pub fn left_or_default(&self, right: &R) -> L
    where
        L: Default,
    {
        self.reverse.get(right).cloned().unwrap_or_default()
    }

    /// Reports whether `left` is part of a pair.
    #[must_use]
    pub fn contains_left(&self, left: &L) -> bool {
        self.forward.contains_key(left)
    }

    /// Reports whether `right` is part of a pair.
    #[must_use]
    pub fn contains_right(&self, right: &R) -> bool {
        self.reverse.contains_key(right)
    }

    /// Number of stored pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Reports whether the map holds no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Drops every pair.
    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
    }

    /// Iterates over the stored pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&L, &R)> {
        self.forward.iter()
    }
}

impl<L, R> Default for BidirectionalMap<L, R>
where
    L: Eq + Hash + Clone,
    R: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<L, R> fmt::Debug for BidirectionalMap<L, R>
where
    L: fmt::Debug,
    R: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.forward.iter()).finish()
    }
}

/// Side of a [`BidirectionalMap`] on which a collision occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapSide {
    /// The left value was already paired.
    Left,
    /// The right value was already paired.
    Right,
}

impl fmt::Display for MapSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Raised when an insertion would break the one-to-one pairing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{side} key is already mapped")]
pub struct DuplicateKeyError {
    /// Side that already contained the offending value.
    pub side: MapSide,
}
