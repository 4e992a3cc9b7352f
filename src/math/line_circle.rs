use super::base::{min_max, parametric_from_point};
use super::Vector2;
use crate::traits::Real;

/// Result of finding the intersect between a line segment and a circle.
#[derive(Debug, Copy, Clone)]
pub enum LineCircleIntr<T>
where
    T: Real,
{
    /// No intersects found.
    NoIntersect,
    /// One tangent intersect point found.
    TangentIntersect {
        /// Line segment parametric value at the intersect point.
        t0: T,
    },
    /// Two intersect points found.
    TwoIntersects {
        /// Line segment parametric value at the first intersect point.
        t0: T,
        /// Line segment parametric value at the second intersect point.
        t1: T,
    },
}

/// Finds the intersects between a line segment going from `p0` to `p1` and a
/// circle with `radius` and `circle_center`.
///
/// Parametric solutions are for the equation `P(t) = p0 + t * (p1 - p0)` and
/// are not clamped: `t < 0` means the intersect lies before `p0`, `t > 1`
/// beyond `p1`. Near-tangency "snaps" to a single tangent point within
/// `epsilon`.
///
/// Precision note: the solutions are recovered from cartesian intersect points
/// of the shifted line equation `Ax + By + C = 0` against the circle (more
/// stable than the direct quadratic in `t`), but a segment much longer than the
/// circle radius still loses absolute precision in the computed points; the
/// error grows with the length/radius ratio and is not compensated here.
pub fn line_circle_intr<T>(
    p0: Vector2<T>,
    p1: Vector2<T>,
    radius: T,
    circle_center: Vector2<T>,
    epsilon: T,
) -> LineCircleIntr<T>
where
    T: Real,
{
    use LineCircleIntr::*;

    let dx = p1.x - p0.x;
    let dy = p1.y - p0.y;
    let h = circle_center.x;
    let k = circle_center.y;

    let eps = epsilon;

    if p0.fuzzy_eq_eps(p1, eps) {
        // p0 == p1, test if the point lies on the circle, averaging the point
        // positions for fuzziness
        let xh = (p0.x + p1.x) / T::two() - h;
        let yk = (p0.y + p1.y) / T::two() - k;
        if (xh * xh + yk * yk).fuzzy_eq_eps(radius * radius, eps) {
            return TangentIntersect { t0: T::zero() };
        }

        return NoIntersect;
    }

    let p0_shifted = p0 - circle_center;
    let p1_shifted = p1 - circle_center;

    // note: default epsilon here, this branch only avoids division by a number
    // too small and does not determine the result case returned
    let (a, b, c) = if dx.fuzzy_eq_zero() {
        // vertical line: x - x_pos = 0
        let x_pos = (p1_shifted.x + p0_shifted.x) / T::two();
        (T::one(), T::zero(), -x_pos)
    } else {
        // (y - y1) = m(x - x1) rearranged to mx - y + (y1 - m*x1) = 0
        let m = dy / dx;
        (m, -T::one(), p1_shifted.y - m * p1_shifted.x)
    };

    let a2 = a * a;
    let b2 = b * b;
    let c2 = c * c;
    let r2 = radius * radius;
    let a2_b2 = a2 + b2;

    // shortest distance from the line to the origin (circle center)
    let shortest_dist = c.abs() / a2_b2.sqrt();

    if shortest_dist > radius + eps {
        return NoIntersect;
    }

    // foot of the perpendicular, shifted back to real coordinates
    let x0 = -a * c / a2_b2 + h;
    let y0 = -b * c / a2_b2 + k;

    if shortest_dist.fuzzy_eq_eps(radius, eps) {
        let t = parametric_from_point(p0, p1, Vector2::new(x0, y0), eps);
        return TangentIntersect { t0: t };
    }

    let d = r2 - c2 / a2_b2;
    // abs to avoid NaN from a very small negative sqrt input
    let mult = (d / a2_b2).abs().sqrt();

    let x_sol1 = x0 + b * mult;
    let x_sol2 = x0 - b * mult;
    let y_sol1 = y0 - a * mult;
    let y_sol2 = y0 + a * mult;
    let sol1 = parametric_from_point(p0, p1, Vector2::new(x_sol1, y_sol1), eps);
    let sol2 = parametric_from_point(p0, p1, Vector2::new(x_sol2, y_sol2), eps);
    let (t0, t1) = min_max(sol1, sol2);
    TwoIntersects { t0, t1 }
}
