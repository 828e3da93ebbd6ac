//! Cube coordinates for the hexagonal board.

use std::{
    fmt,
    ops::{Add, Mul, Neg, Sub},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Position of a hexagon expressed in cube coordinates.
///
/// The three axes always satisfy `q + r + s == 0`. Equality and hashing are
/// structural.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "CubeTriple", into = "CubeTriple")]
pub struct HexCoord {
    q: i32,
    r: i32,
    s: i32,
}

impl HexCoord {
    /// Coordinate at the centre of every board.
    pub const ORIGIN: Self = Self { q: 0, r: 0, s: 0 };

    /// Unit offsets to the six adjacent hexagons, in neighbour order.
    pub const DIRECTIONS: [Self; 6] = [
        Self { q: 1, r: -1, s: 0 },
        Self { q: 1, r: 0, s: -1 },
        Self { q: 0, r: 1, s: -1 },
        Self { q: -1, r: 1, s: 0 },
        Self { q: -1, r: 0, s: 1 },
        Self { q: 0, r: -1, s: 1 },
    ];

    /// Creates a coordinate from its two axial components, deriving `s`.
    #[must_use]
    pub const fn axial(q: i32, r: i32) -> Self {
        Self { q, r, s: -q - r }
    }

    /// Creates a coordinate from all three cube components.
    ///
    /// Triples that do not lie on the `q + r + s == 0` plane are rejected.
    pub fn cube(q: i32, r: i32, s: i32) -> Result<Self, CoordError> {
        let sum = i64::from(q) + i64::from(r) + i64::from(s);
        if sum != 0 {
            return Err(CoordError::OffPlane { q, r, s });
        }
        Ok(Self { q, r, s })
    }

    /// The `q` axis component.
    #[must_use]
    pub const fn q(&self) -> i32 {
        self.q
    }

    /// The `r` axis component.
    #[must_use]
    pub const fn r(&self) -> i32 {
        self.r
    }

    /// The `s` axis component.
    #[must_use]
    pub const fn s(&self) -> i32 {
        self.s
    }

    /// Number of steps between this coordinate and the origin.
    ///
    /// Equal to `(|q| + |r| + |s|) / 2`, which on the cube plane is the largest
    /// absolute component.
    #[must_use]
    pub fn length(&self) -> u32 {
        self.q
            .unsigned_abs()
            .max(self.r.unsigned_abs())
            .max(self.s.unsigned_abs())
    }

    /// Number of steps between two coordinates.
    #[must_use]
    pub fn distance(a: Self, b: Self) -> u32 {
        (a - b).length()
    }

    /// The six adjacent coordinates in [`HexCoord::DIRECTIONS`] order.
    #[must_use]
    pub fn neighbors(&self) -> [Self; 6] {
        Self::DIRECTIONS.map(|direction| *self + direction)
    }

    /// Number of coordinates whose length is strictly below `radius`.
    ///
    /// This is `3R² − 3R + 1` for any positive radius and zero for an empty
    /// board.
    #[must_use]
    pub const fn count_within(radius: u32) -> u64 {
        if radius == 0 {
            return 0;
        }
        let radius = radius as u64;
        radius
            .saturating_mul(radius)
            .saturating_mul(3)
            .saturating_sub(3 * radius)
            .saturating_add(1)
    }
}

impl Add for HexCoord {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            q: self.q + other.q,
            r: self.r + other.r,
            s: self.s + other.s,
        }
    }
}

impl Sub for HexCoord {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            q: self.q - other.q,
            r: self.r - other.r,
            s: self.s - other.s,
        }
    }
}

impl Mul<i32> for HexCoord {
    type Output = Self;

    fn mul(self, factor: i32) -> Self {
        Self {
            q: self.q * factor,
            r: self.r * factor,
            s: self.s * factor,
        }
    }
}

impl Neg for HexCoord {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            q: -self.q,
            r: -self.r,
            s: -self.s,
        }
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {} {}]", self.q, self.r, self.s)
    }
}

impl TryFrom<(i32, i32, i32)> for HexCoord {
    type Error = CoordError;

    fn try_from((q, r, s): (i32, i32, i32)) -> Result<Self, Self::Error> {
        Self::cube(q, r, s)
    }
}

/// Errors raised when constructing a [`HexCoord`] from raw components.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CoordError {
    /// The components do not sum to zero.
    #[error("cube coordinate [{q} {r} {s}] does not satisfy q + r + s = 0")]
    OffPlane {
        /// Provided `q` component.
        q: i32,
        /// Provided `r` component.
        r: i32,
        /// Provided `s` component.
        s: i32,
    },
}

#[derive(Serialize, Deserialize)]
struct CubeTriple {
    q: i32,
    r: i32,
    s: i32,
}

impl TryFrom<CubeTriple> for HexCoord {
    type Error = CoordError;

    fn try_from(triple: CubeTriple) -> Result<Self, Self::Error> {
        Self::cube(triple.q, triple.r, triple.s)
    }
}

impl From<HexCoord> for CubeTriple {
    fn from(coord: HexCoord) -> Self {
        Self {
            q: coord.q,
            r: coord.r,
            s: coord.s,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    fn plane_coord() -> impl Strategy<Value = HexCoord> {
        (-10_000i32..10_000, -10_000i32..10_000).prop_map(|(q, r)| HexCoord::axial(q, r))
    }

    #[test]
    fn axial_derives_third_component() {
        let coord = HexCoord::axial(3, -5);
        assert_eq!(coord.s(), 2);
        assert_eq!(HexCoord::cube(3, -5, 2), Ok(coord));
    }

    #[test]
    fn cube_rejects_off_plane_triples() {
        assert_eq!(
            HexCoord::cube(1, 1, 1),
            Err(CoordError::OffPlane { q: 1, r: 1, s: 1 })
        );
        assert!(HexCoord::try_from((2, 0, -1)).is_err());
    }

    #[test]
    fn permuted_components_are_distinct_set_members() {
        let coord = HexCoord::axial(1, 2);
        let permuted = HexCoord::cube(coord.r(), coord.q(), coord.s()).expect("on plane");
        let set: HashSet<HexCoord> = [coord].into_iter().collect();

        assert_ne!(coord, permuted);
        assert!(set.contains(&HexCoord::axial(1, 2)));
        assert!(!set.contains(&permuted));
    }

    #[test]
    fn display_lists_all_components() {
        assert_eq!(HexCoord::axial(2, -1).to_string(), "[2 -1 -1]");
    }

    #[test]
    fn scalar_multiplication_scales_every_axis() {
        let scaled = HexCoord::axial(1, -2) * 3;
        assert_eq!(scaled, HexCoord::axial(3, -6));
        assert_eq!(scaled.length(), 6);
    }

    #[test]
    fn count_within_matches_closed_form() {
        assert_eq!(HexCoord::count_within(0), 0);
        assert_eq!(HexCoord::count_within(1), 1);
        assert_eq!(HexCoord::count_within(2), 7);
        assert_eq!(HexCoord::count_within(3), 19);
        assert_eq!(HexCoord::count_within(8), 169);
    }

    proptest! {
        #[test]
        fn length_is_half_the_component_sum(coord in plane_coord()) {
            let sum = coord.q().unsigned_abs() + coord.r().unsigned_abs() + coord.s().unsigned_abs();
            prop_assert_eq!(coord.length(), sum / 2);
        }

        #[test]
        fn cube_accepts_what_axial_builds(q in -10_000i32..10_000, r in -10_000i32..10_000) {
            let derived = HexCoord::axial(q, r);
            prop_assert_eq!(HexCoord::cube(q, r, -q - r), Ok(derived));
        }

        #[test]
        fn neighbors_are_one_step_away(coord in plane_coord()) {
            let neighbors = coord.neighbors();
            prop_assert_eq!(neighbors.len(), 6);
            for neighbor in neighbors {
                prop_assert_eq!(HexCoord::distance(coord, neighbor), 1);
                prop_assert_eq!(neighbor.q() + neighbor.r() + neighbor.s(), 0);
            }
        }

        #[test]
        fn distance_is_symmetric(a in plane_coord(), b in plane_coord()) {
            prop_assert_eq!(HexCoord::distance(a, b), HexCoord::distance(b, a));
            prop_assert_eq!(HexCoord::distance(a, a), 0);
        }
    }

    #[test]
    fn opposite_directions_cancel_out() {
        for (index, direction) in HexCoord::DIRECTIONS.iter().enumerate() {
            let opposite = HexCoord::DIRECTIONS[(index + 3) % 6];
            assert_eq!(*direction + opposite, HexCoord::ORIGIN);
            assert_eq!(-*direction, opposite);
        }
    }
}
