//! Chunk coordinate type shared by window-local and world space.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Integer chunk coordinate.
///
/// The same type addresses a slot inside the streaming window (a *relative*
/// coordinate, each component within `[-view_distance, view_distance]`) and a
/// chunk in the unbounded world (a *global* coordinate).
///
/// Hashing and ordering go through [`ChunkOrigin::id`], which packs `x` into
/// the high 32 bits and `y` into the low 32 bits.
///
/// Arithmetic wraps at the `i32` boundary, so the world is a torus of
/// `2^32` chunks per axis and moving past the edge never panics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct ChunkOrigin {
    /// X coordinate in chunk space
    pub x: i32,
    /// Y coordinate in chunk space
    pub y: i32,
}

impl ChunkOrigin {
    /// The origin `(0, 0)`.
    pub const ZERO: Self = Self::new(0, 0);

    /// Unit step towards +X.
    pub const RIGHT: Self = Self::new(1, 0);

    /// Unit step towards -X.
    pub const LEFT: Self = Self::new(-1, 0);

    /// Unit step towards +Y.
    pub const DOWN: Self = Self::new(0, 1);

    /// Unit step towards -Y.
    pub const UP: Self = Self::new(0, -1);

    /// Creates a new chunk origin.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Packed 64-bit identifier: high 32 bits are `x`, low 32 bits are `y`.
    ///
    /// Each component is reinterpreted as `u32` before packing, so negative
    /// values never sign-extend into the other half and the mapping is
    /// injective over all `i32` pairs.
    #[must_use]
    pub const fn id(self) -> u64 {
        ((self.x as u32 as u64) << 32) | (self.y as u32 as u64)
    }

    /// Inverse of [`ChunkOrigin::id`].
    #[must_use]
    pub const fn from_id(id: u64) -> Self {
        Self {
            x: (id >> 32) as u32 as i32,
            y: id as u32 as i32,
        }
    }

    /// Chebyshev (max-norm) length, i.e. the index of the ring this relative
    /// coordinate lies on.
    #[must_use]
    pub const fn chebyshev_len(self) -> u32 {
        let ax = self.x.unsigned_abs();
        let ay = self.y.unsigned_abs();
        if ax > ay {
            ax
        } else {
            ay
        }
    }
}

impl Hash for ChunkOrigin {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.id());
    }
}

impl PartialOrd for ChunkOrigin {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChunkOrigin {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(&other.id())
    }
}

impl fmt::Display for ChunkOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for ChunkOrigin {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x.wrapping_add(rhs.x), self.y.wrapping_add(rhs.y))
    }
}

impl Sub for ChunkOrigin {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x.wrapping_sub(rhs.x), self.y.wrapping_sub(rhs.y))
    }
}

impl Mul<i32> for ChunkOrigin {
    type Output = Self;

    fn mul(self, scalar: i32) -> Self {
        Self::new(self.x.wrapping_mul(scalar), self.y.wrapping_mul(scalar))
    }
}

/// Truncating integer division of both components.
///
/// # Panics
///
/// Panics if `scalar` is zero.
impl Div<i32> for ChunkOrigin {
    type Output = Self;

    fn div(self, scalar: i32) -> Self {
        Self::new(self.x.wrapping_div(scalar), self.y.wrapping_div(scalar))
    }
}

impl Neg for ChunkOrigin {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(self.x.wrapping_neg(), self.y.wrapping_neg())
    }
}

impl AddAssign for ChunkOrigin {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for ChunkOrigin {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign<i32> for ChunkOrigin {
    fn mul_assign(&mut self, scalar: i32) {
        *self = *self * scalar;
    }
}

impl DivAssign<i32> for ChunkOrigin {
    fn div_assign(&mut self, scalar: i32) {
        *self = *self / scalar;
    }
}

impl From<(i32, i32)> for ChunkOrigin {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_arithmetic() {
        let a = ChunkOrigin::new(3, -4);
        let b = ChunkOrigin::new(-1, 2);

        assert_eq!(a + b, ChunkOrigin::new(2, -2));
        assert_eq!(a - b, ChunkOrigin::new(4, -6));
        assert_eq!(a * 2, ChunkOrigin::new(6, -8));
        assert_eq!(a / 2, ChunkOrigin::new(1, -2));
        assert_eq!(-a, ChunkOrigin::new(-3, 4));

        let mut c = a;
        c += b;
        c -= ChunkOrigin::RIGHT;
        c *= 3;
        c /= 2;
        assert_eq!(c, ChunkOrigin::new(1, -3));
    }

    #[test]
    fn test_arithmetic_wraps_at_bounds() {
        let edge = ChunkOrigin::new(i32::MAX, i32::MIN);

        assert_eq!(edge + ChunkOrigin::RIGHT, ChunkOrigin::new(i32::MIN, i32::MIN));
        assert_eq!(edge + ChunkOrigin::UP, ChunkOrigin::new(i32::MAX, i32::MAX));
        assert_eq!(edge - ChunkOrigin::LEFT, ChunkOrigin::new(i32::MIN, i32::MIN));
        assert_eq!(-edge, ChunkOrigin::new(-i32::MAX, i32::MIN));
        assert_eq!(edge * 2, ChunkOrigin::new(-2, 0));
        assert_eq!(edge / -1, ChunkOrigin::new(-i32::MAX, i32::MIN));

        // round trip across the seam
        let mut c = edge;
        c += ChunkOrigin::new(3, -3);
        c -= ChunkOrigin::new(3, -3);
        assert_eq!(c, edge);
    }

    #[test]
    fn test_id_packing() {
        assert_eq!(ChunkOrigin::new(0, 0).id(), 0);
        assert_eq!(ChunkOrigin::new(1, 0).id(), 1 << 32);
        assert_eq!(ChunkOrigin::new(0, 1).id(), 1);
        // -1 in y must not bleed into the x half
        assert_eq!(ChunkOrigin::new(0, -1).id(), 0x0000_0000_FFFF_FFFF);
        assert_ne!(ChunkOrigin::new(0, -1).id(), ChunkOrigin::new(-1, -1).id());
    }

    #[test]
    fn test_window_ids_unique() {
        let mut ids = HashSet::new();
        for x in -8..=8 {
            for y in -8..=8 {
                assert!(ids.insert(ChunkOrigin::new(x, y).id()));
            }
        }
    }

    #[test]
    fn test_ordering_follows_id() {
        let mut cells = vec![
            ChunkOrigin::new(1, 0),
            ChunkOrigin::new(0, 5),
            ChunkOrigin::new(0, 1),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![
                ChunkOrigin::new(0, 1),
                ChunkOrigin::new(0, 5),
                ChunkOrigin::new(1, 0)
            ]
        );
    }

    #[test]
    fn test_chebyshev_len() {
        assert_eq!(ChunkOrigin::ZERO.chebyshev_len(), 0);
        assert_eq!(ChunkOrigin::new(-3, 2).chebyshev_len(), 3);
        assert_eq!(ChunkOrigin::new(1, -4).chebyshev_len(), 4);
    }

    proptest! {
        #[test]
        fn prop_id_round_trips(x in any::<i32>(), y in any::<i32>()) {
            let origin = ChunkOrigin::new(x, y);
            prop_assert_eq!(ChunkOrigin::from_id(origin.id()), origin);
        }
    }
}
