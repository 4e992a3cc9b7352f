use crate::math::Vector2;
use crate::traits::Real;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A polyline vertex holding an `x`, `y`, and `bulge` value.
///
/// `x` and `y` position the vertex, `bulge` encodes the arc for the polyline
/// segment that starts at this vertex: `bulge = tan(arc_sweep_angle / 4)`.
/// A bulge of 0 is a line segment, positive sweeps counter clockwise, negative
/// clockwise, and magnitude 1 is a half circle. Note an arc segment can never
/// sweep more than PI.
///
/// See [angle_from_bulge](crate::math::angle_from_bulge) and
/// [bulge_from_angle](crate::math::bulge_from_angle) to convert between bulge
/// and sweep angle.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlineVertex<T = f64> {
    pub x: T,
    pub y: T,
    pub bulge: T,
}

impl<T> PlineVertex<T>
where
    T: Real,
{
    #[inline]
    pub fn new(x: T, y: T, bulge: T) -> Self {
        PlineVertex { x, y, bulge }
    }

    /// Construct a vertex from a `[x, y, bulge]` slice.
    ///
    /// Returns `None` if the slice does not hold exactly 3 elements.
    #[inline]
    pub fn from_slice(slice: &[T]) -> Option<Self> {
        if let [x, y, bulge] = *slice {
            Some(PlineVertex::new(x, y, bulge))
        } else {
            None
        }
    }

    /// Construct a vertex using a 2D vector as the position.
    #[inline]
    pub fn from_vector2(pos: Vector2<T>, bulge: T) -> Self {
        PlineVertex::new(pos.x, pos.y, bulge)
    }

    /// The position as a 2D vector.
    #[inline]
    pub fn pos(&self) -> Vector2<T> {
        Vector2::new(self.x, self.y)
    }

    /// Copy of the vertex with the bulge replaced by the value given.
    #[inline]
    pub fn with_bulge(&self, bulge: T) -> Self {
        PlineVertex::new(self.x, self.y, bulge)
    }

    /// True if the bulge is fuzzy equal to zero (vertex starts a line segment).
    #[inline]
    pub fn bulge_is_zero(&self) -> bool {
        self.bulge.fuzzy_eq_zero()
    }

    /// True if the bulge is positive (vertex starts a counter clockwise arc).
    #[inline]
    pub fn bulge_is_pos(&self) -> bool {
        self.bulge > T::zero()
    }

    /// True if the bulge is negative (vertex starts a clockwise arc).
    #[inline]
    pub fn bulge_is_neg(&self) -> bool {
        self.bulge < T::zero()
    }

    /// Fuzzy equal comparison with another vertex using the `fuzzy_epsilon` given.
    #[inline]
    pub fn fuzzy_eq_eps(&self, other: Self, fuzzy_epsilon: T) -> bool {
        self.x.fuzzy_eq_eps(other.x, fuzzy_epsilon)
            && self.y.fuzzy_eq_eps(other.y, fuzzy_epsilon)
            && self.bulge.fuzzy_eq_eps(other.bulge, fuzzy_epsilon)
    }

    /// Fuzzy equal comparison with another vertex using `T::fuzzy_epsilon()`.
    #[inline]
    pub fn fuzzy_eq(&self, other: Self) -> bool {
        self.fuzzy_eq_eps(other, T::fuzzy_epsilon())
    }
}
