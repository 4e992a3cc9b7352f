use super::seg::seg_arc_radius_and_center;
use super::PlineVertex;
use crate::math::{
    angle, angle_from_bulge, angle_is_within_sweep, circle_circle_intr, delta_angle, dist_squared,
    line_circle_intr, line_line_intr, normalize_radians, point_from_parametric,
    point_within_arc_sweep, CircleCircleIntr, LineCircleIntr, LineLineIntr, Vector2,
};
use crate::traits::Real;

/// Result of finding the intersect between two polyline segments.
#[derive(Debug, Copy, Clone)]
pub enum PlineSegIntr<T>
where
    T: Real,
{
    /// No intersects found.
    NoIntersect,
    /// One tangent intersect point found.
    ///
    /// Note: consumers treat this the same as [PlineSegIntr::OneIntersect],
    /// the variant exists to preserve the tangency classification when the
    /// underlying primitives detect it.
    TangentIntersect {
        /// The tangent intersect point.
        point: Vector2<T>,
    },
    /// One non-tangent intersect point found.
    OneIntersect {
        /// The intersect point.
        point: Vector2<T>,
    },
    /// Two intersect points found.
    TwoIntersects {
        /// First intersect point (ordered along the second segment direction).
        point1: Vector2<T>,
        /// Second intersect point (ordered along the second segment direction).
        point2: Vector2<T>,
    },
    /// Both segments are lines and they are collinear and overlapping.
    OverlappingLines {
        /// Start point of the overlap (along the second segment direction).
        point1: Vector2<T>,
        /// End point of the overlap (along the second segment direction).
        point2: Vector2<T>,
    },
    /// Both segments are arcs and they are coincident and overlapping.
    OverlappingArcs {
        /// Start point of the overlap (along the second segment direction).
        point1: Vector2<T>,
        /// End point of the overlap (along the second segment direction).
        point2: Vector2<T>,
    },
}

/// Finds the intersects between the polyline segments `v1->v2` and `u1->u2`.
///
/// Dispatches on the segment kinds: line/line goes to
/// [line_line_intr](crate::math::line_line_intr), line/arc to
/// [line_circle_intr](crate::math::line_circle_intr) with hits filtered to the
/// arc sweep, arc/arc to [circle_circle_intr](crate::math::circle_circle_intr)
/// with hits filtered to both sweeps and coincident circles resolved by
/// angular overlap.
pub fn pline_seg_intr<T>(
    v1: PlineVertex<T>,
    v2: PlineVertex<T>,
    u1: PlineVertex<T>,
    u2: PlineVertex<T>,
    pos_equal_eps: T,
) -> PlineSegIntr<T>
where
    T: Real,
{
    use PlineSegIntr::*;
    let v_is_line = v1.bulge_is_zero();
    let u_is_line = u1.bulge_is_zero();

    if v_is_line && u_is_line {
        match line_line_intr(v1.pos(), v2.pos(), u1.pos(), u2.pos(), pos_equal_eps) {
            LineLineIntr::NoIntersect | LineLineIntr::FalseIntersect { .. } => {
                return NoIntersect;
            }
            LineLineIntr::TrueIntersect { seg1_t, .. } => {
                return OneIntersect {
                    point: point_from_parametric(v1.pos(), v2.pos(), seg1_t),
                };
            }
            LineLineIntr::Overlapping { seg2_t0, seg2_t1 } => {
                return OverlappingLines {
                    point1: point_from_parametric(u1.pos(), u2.pos(), seg2_t0),
                    point2: point_from_parametric(u1.pos(), u2.pos(), seg2_t1),
                };
            }
        }
    }

    let process_line_arc_intr = |p0: Vector2<T>,
                                 p1: Vector2<T>,
                                 a1: PlineVertex<T>,
                                 a2: PlineVertex<T>|
     -> PlineSegIntr<T> {
        let (arc_radius, arc_center) = seg_arc_radius_and_center(a1, a2);

        // retain only hits within the line parametric range and the arc sweep
        let point_in_sweep = |t: T| -> Option<Vector2<T>> {
            if !t.fuzzy_in_range_eps(T::zero(), T::one(), pos_equal_eps) {
                return None;
            }

            let p = point_from_parametric(p0, p1, t);
            let within_sweep =
                point_within_arc_sweep(arc_center, a1.pos(), a2.pos(), a1.bulge_is_neg(), p);
            if within_sweep {
                Some(p)
            } else {
                None
            }
        };

        match line_circle_intr(p0, p1, arc_radius, arc_center, pos_equal_eps) {
            LineCircleIntr::NoIntersect => NoIntersect,
            LineCircleIntr::TangentIntersect { t0 } => {
                if let Some(point) = point_in_sweep(t0) {
                    TangentIntersect { point }
                } else {
                    NoIntersect
                }
            }
            LineCircleIntr::TwoIntersects { t0, t1 } => {
                let t0_point = point_in_sweep(t0);
                let t1_point = point_in_sweep(t1);
                match (t0_point, t1_point) {
                    (None, None) => NoIntersect,
                    (None, Some(point)) | (Some(point), None) => OneIntersect { point },
                    (Some(point1), Some(point2)) => {
                        // order points according to the second segment direction
                        if u_is_line
                            || (dist_squared(point1, a1.pos()) < dist_squared(point2, a1.pos()))
                        {
                            TwoIntersects { point1, point2 }
                        } else {
                            TwoIntersects {
                                point1: point2,
                                point2: point1,
                            }
                        }
                    }
                }
            }
        }
    };

    if v_is_line {
        return process_line_arc_intr(v1.pos(), v2.pos(), u1, u2);
    }

    if u_is_line {
        return process_line_arc_intr(u1.pos(), u2.pos(), v1, v2);
    }

    // both v and u are arcs
    let (arc1_radius, arc1_center) = seg_arc_radius_and_center(v1, v2);
    let (arc2_radius, arc2_center) = seg_arc_radius_and_center(u1, u2);

    let start_and_sweep_angle = |sp: Vector2<T>, center: Vector2<T>, bulge: T| -> (T, T) {
        let start_angle = normalize_radians(angle(center, sp));
        let sweep_angle = angle_from_bulge(bulge);
        (start_angle, sweep_angle)
    };

    let both_arcs_sweep_point = |pt: Vector2<T>| -> bool {
        point_within_arc_sweep(arc1_center, v1.pos(), v2.pos(), v1.bulge_is_neg(), pt)
            && point_within_arc_sweep(arc2_center, u1.pos(), u2.pos(), u1.bulge_is_neg(), pt)
    };

    match circle_circle_intr(arc1_radius, arc1_center, arc2_radius, arc2_center, pos_equal_eps) {
        CircleCircleIntr::NoIntersect => NoIntersect,
        CircleCircleIntr::TangentIntersect { point } => {
            if both_arcs_sweep_point(point) {
                TangentIntersect { point }
            } else {
                NoIntersect
            }
        }
        CircleCircleIntr::TwoIntersects { point1, point2 } => {
            let pt1_in_sweep = both_arcs_sweep_point(point1);
            let pt2_in_sweep = both_arcs_sweep_point(point2);
            if pt1_in_sweep && pt2_in_sweep {
                TwoIntersects { point1, point2 }
            } else if pt1_in_sweep {
                OneIntersect { point: point1 }
            } else if pt2_in_sweep {
                OneIntersect { point: point2 }
            } else {
                NoIntersect
            }
        }
        CircleCircleIntr::Overlapping => {
            // coincident circles, find the angular overlap of the two sweeps,
            // normalizing both sweeps to go the same direction (the second arc
            // is traversed from its end with negated bulge when the bulge
            // signs differ) so the overlap comparisons hold
            let same_direction_arcs = v1.bulge_is_neg() == u1.bulge_is_neg();
            let (arc1_start, arc1_sweep) = start_and_sweep_angle(v1.pos(), arc1_center, v1.bulge);
            let (arc2_start, arc2_sweep) = if same_direction_arcs {
                start_and_sweep_angle(u1.pos(), arc2_center, u1.bulge)
            } else {
                start_and_sweep_angle(u2.pos(), arc2_center, -u1.bulge)
            };

            let arc1_end = arc1_start + arc1_sweep;
            let arc2_end = arc2_start + arc2_sweep;

            // check if only end points touch (since sweeps go the same
            // direction only the start/end delta angles need testing)
            match (
                delta_angle(arc1_start, arc2_end).fuzzy_eq_zero(),
                delta_angle(arc2_start, arc1_end).fuzzy_eq_zero(),
            ) {
                (true, true) => {
                    // two half circle arcs touching at both end points
                    // note: points ordered along the second segment direction
                    TwoIntersects {
                        point1: u1.pos(),
                        point2: u2.pos(),
                    }
                }
                (true, false) => {
                    // touch only at the start of arc1
                    OneIntersect { point: v1.pos() }
                }
                (false, true) => {
                    // touch only at the start of arc2
                    OneIntersect { point: u1.pos() }
                }
                (false, false) => {
                    // more than the end points may touch, determine the overlap
                    let arc2_starts_in_arc1 =
                        angle_is_within_sweep(arc2_start, arc1_start, arc1_sweep);
                    let arc2_ends_in_arc1 = angle_is_within_sweep(arc2_end, arc1_start, arc1_sweep);
                    if arc2_starts_in_arc1 && arc2_ends_in_arc1 {
                        // arc2 fully overlapped by arc1
                        OverlappingArcs {
                            point1: u1.pos(),
                            point2: u2.pos(),
                        }
                    } else if arc2_starts_in_arc1 {
                        if same_direction_arcs {
                            OverlappingArcs {
                                point1: u1.pos(),
                                point2: v2.pos(),
                            }
                        } else {
                            OverlappingArcs {
                                point1: v2.pos(),
                                point2: u2.pos(),
                            }
                        }
                    } else if arc2_ends_in_arc1 {
                        if same_direction_arcs {
                            OverlappingArcs {
                                point1: v1.pos(),
                                point2: u2.pos(),
                            }
                        } else {
                            OverlappingArcs {
                                point1: u1.pos(),
                                point2: v1.pos(),
                            }
                        }
                    } else {
                        let arc1_starts_in_arc2 =
                            angle_is_within_sweep(arc1_start, arc2_start, arc2_sweep);
                        if arc1_starts_in_arc2 {
                            // arc1 fully overlapped by arc2
                            if same_direction_arcs {
                                OverlappingArcs {
                                    point1: v1.pos(),
                                    point2: v2.pos(),
                                }
                            } else {
                                OverlappingArcs {
                                    point1: v2.pos(),
                                    point2: v1.pos(),
                                }
                            }
                        } else {
                            NoIntersect
                        }
                    }
                }
            }
        }
    }
}
