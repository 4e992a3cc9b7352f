//! Parallel offset generation: per-segment raw offset, joins, self intersect
//! trimming, distance validation against the source polyline, and slice
//! stitching into the final offset polylines.

use super::intersects::{all_self_intersects_as_basic, find_intersects, seg_intersects_polyline};
use super::seg::{
    seg_arc_radius_and_center, seg_closest_point, seg_midpoint, seg_split_at_point,
};
use super::{PlineVertex, Polyline};
use crate::index::{StaticSpatialIndex, StaticSpatialIndexBuilder, AABB};
use crate::math::{
    angle, bulge_from_angle, circle_circle_intr, delta_angle, dist_squared, line_circle_intr,
    line_line_intr, point_from_parametric, point_within_arc_sweep, CircleCircleIntr,
    LineCircleIntr, LineLineIntr, Vector2,
};
use crate::traits::Real;
use std::collections::BTreeMap;

/// Options for [Polyline::parallel_offset_opt].
#[derive(Debug, Clone)]
pub struct PlineOffsetOptions<'a, T>
where
    T: Real,
{
    /// Spatial index of the source polyline's segment bounding boxes (or boxes
    /// no smaller). Computed internally if `None`.
    pub aabb_index: Option<&'a StaticSpatialIndex<T>>,
    /// If true then self intersects in the source polyline are handled by the
    /// offset algorithm (requires more work), if false a self intersecting
    /// source may not offset correctly.
    pub handle_self_intersects: bool,
    /// Fuzzy comparison epsilon used for determining if two positions are equal.
    pub pos_equal_eps: T,
    /// Fuzzy comparison epsilon used when stitching slices together.
    pub slice_join_eps: T,
    /// Fuzzy comparison epsilon used when testing slice distance to the source
    /// polyline for validity.
    pub offset_dist_eps: T,
}

impl<T> PlineOffsetOptions<'_, T>
where
    T: Real,
{
    pub fn new() -> Self {
        Self {
            aabb_index: None,
            handle_self_intersects: false,
            pos_equal_eps: T::from(1e-5).unwrap(),
            slice_join_eps: T::from(1e-4).unwrap(),
            offset_dist_eps: T::from(1e-4).unwrap(),
        }
    }
}

impl<T> Default for PlineOffsetOptions<'_, T>
where
    T: Real,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Polyline<T>
where
    T: Real,
{
    /// Compute the parallel offset polylines of this polyline using default
    /// options.
    ///
    /// Positive `offset` goes to the left of segment direction, negative to
    /// the right. Returns an empty `Vec` if the polyline fully collapses under
    /// the offset distance; never panics.
    ///
    /// # Examples
    /// ```
    /// # use plinekit::polyline::*;
    /// # use plinekit::pline_closed;
    /// // counter clockwise circle with radius 1 centered at (0.5, 0)
    /// let pline = pline_closed![(0.0, 0.0, 1.0), (1.0, 0.0, 1.0)];
    /// let offset_plines = pline.parallel_offset(0.2);
    /// assert_eq!(offset_plines.len(), 1);
    /// assert!(offset_plines[0][0].fuzzy_eq(PlineVertex::new(0.2, 0.0, 1.0)));
    /// assert!(offset_plines[0][1].fuzzy_eq(PlineVertex::new(0.8, 0.0, 1.0)));
    /// ```
    #[inline]
    pub fn parallel_offset(&self, offset: T) -> Vec<Polyline<T>> {
        self.parallel_offset_opt(offset, &Default::default())
    }

    /// Compute the parallel offset polylines of this polyline with the options
    /// given.
    #[inline]
    pub fn parallel_offset_opt(
        &self,
        offset: T,
        options: &PlineOffsetOptions<T>,
    ) -> Vec<Polyline<T>> {
        parallel_offset(self, offset, options)
    }
}

/// Raw offset segment: the source segment pushed over by the offset distance
/// before any joining or trimming.
#[derive(Debug, Copy, Clone)]
struct OffsetSeg<T>
where
    T: Real,
{
    start: PlineVertex<T>,
    end: PlineVertex<T>,
    /// Source segment end position (the joint bridging arcs swing around).
    joint: Vector2<T>,
    /// Source arc whose radius collapsed through zero (emitted as a line).
    collapsed: bool,
}

fn raw_offset_segs<T>(source: &Polyline<T>, offset: T) -> Vec<OffsetSeg<T>>
where
    T: Real,
{
    let mut segs = Vec::with_capacity(source.segment_count());

    for (v1, v2) in source.iter_segments() {
        if v1.bulge_is_zero() {
            let shift = (v2.pos() - v1.pos()).unit_perp().scale(offset);
            segs.push(OffsetSeg {
                start: PlineVertex::from_vector2(v1.pos() + shift, T::zero()),
                end: PlineVertex::from_vector2(v2.pos() + shift, T::zero()),
                joint: v2.pos(),
                collapsed: false,
            });
            continue;
        }

        // arcs grow or shrink along their radial direction, collapsing to a
        // line when the radius passes through zero
        let (radius, center) = seg_arc_radius_and_center(v1, v2);
        let radial = if v1.bulge_is_pos() { -offset } else { offset };
        let collapsed = (radius + radial).fuzzy_lt(T::zero());
        let pushed = |p: Vector2<T>| p + (p - center).normalize().scale(radial);
        segs.push(OffsetSeg {
            start: PlineVertex::from_vector2(
                pushed(v1.pos()),
                if collapsed { T::zero() } else { v1.bulge },
            ),
            end: PlineVertex::from_vector2(pushed(v2.pos()), v2.bulge),
            joint: v2.pos(),
            collapsed,
        });
    }

    segs
}

/// How a pair of adjacent raw offset segments connect.
enum JoinAction<T> {
    /// Segments reach each other, trim both back to the point given.
    Trim(Vector2<T>),
    /// Segments pull apart, bridge the gap with an arc swung around the
    /// original joint vertex.
    Bridge,
    /// Keep both raw end points (parallel or already touching segments).
    Butt,
}

fn plan_join<T>(prev: &OffsetSeg<T>, next: &OffsetSeg<T>, pos_equal_eps: T) -> JoinAction<T>
where
    T: Real,
{
    use JoinAction::*;

    let in_seg = |t: T| t >= T::zero() && t <= T::one();

    match (prev.start.bulge_is_zero(), next.start.bulge_is_zero()) {
        (true, true) => {
            if prev.collapsed && next.collapsed {
                // collapsed arcs never extend to meet
                return Bridge;
            }

            match line_line_intr(
                prev.start.pos(),
                prev.end.pos(),
                next.start.pos(),
                next.end.pos(),
                pos_equal_eps,
            ) {
                LineLineIntr::TrueIntersect { seg1_t, .. } => Trim(point_from_parametric(
                    prev.start.pos(),
                    prev.end.pos(),
                    seg1_t,
                )),
                LineLineIntr::Overlapping { .. } => Trim(prev.end.pos()),
                LineLineIntr::FalseIntersect { seg1_t, seg2_t } => {
                    if seg1_t > T::one() && !in_seg(seg2_t) {
                        Bridge
                    } else {
                        Butt
                    }
                }
                LineLineIntr::NoIntersect => Butt,
            }
        }
        (true, false) => {
            // line into arc
            let (arc_radius, arc_center) = seg_arc_radius_and_center(next.start, next.end);
            let (t0, t1) = match line_circle_intr(
                prev.start.pos(),
                prev.end.pos(),
                arc_radius,
                arc_center,
                pos_equal_eps,
            ) {
                LineCircleIntr::NoIntersect => return Bridge,
                LineCircleIntr::TangentIntersect { t0 } => (t0, None),
                LineCircleIntr::TwoIntersects { t0, t1 } => (t0, Some(t1)),
            };

            let point_at = |t: T| point_from_parametric(prev.start.pos(), prev.end.pos(), t);
            let t = match t1 {
                Some(t1)
                    if dist_squared(point_at(t1), prev.joint)
                        < dist_squared(point_at(t0), prev.joint) =>
                {
                    t1
                }
                _ => t0,
            };
            let point = point_at(t);
            let on_arc = point_within_arc_sweep(
                arc_center,
                next.start.pos(),
                next.end.pos(),
                next.start.bulge_is_neg(),
                point,
            );

            if in_seg(t) && on_arc {
                Trim(point)
            } else if (t > T::one() && !on_arc) || prev.collapsed {
                Bridge
            } else {
                Butt
            }
        }
        (false, true) => {
            // arc into line
            let (arc_radius, arc_center) = seg_arc_radius_and_center(prev.start, prev.end);
            let (t0, t1) = match line_circle_intr(
                next.start.pos(),
                next.end.pos(),
                arc_radius,
                arc_center,
                pos_equal_eps,
            ) {
                LineCircleIntr::NoIntersect => return Bridge,
                LineCircleIntr::TangentIntersect { t0 } => (t0, None),
                LineCircleIntr::TwoIntersects { t0, t1 } => (t0, Some(t1)),
            };

            // a collapsed arc ahead pulls the pick toward its own start
            let anchor = if next.collapsed {
                next.start.pos()
            } else {
                prev.joint
            };
            let point_at = |t: T| point_from_parametric(next.start.pos(), next.end.pos(), t);
            let t = match t1 {
                Some(t1)
                    if dist_squared(point_at(t1), anchor) < dist_squared(point_at(t0), anchor) =>
                {
                    t1
                }
                _ => t0,
            };
            let point = point_at(t);
            let on_arc = point_within_arc_sweep(
                arc_center,
                prev.start.pos(),
                prev.end.pos(),
                prev.start.bulge_is_neg(),
                point,
            );

            if in_seg(t) && on_arc {
                Trim(point)
            } else {
                Bridge
            }
        }
        (false, false) => {
            let (prev_radius, prev_center) = seg_arc_radius_and_center(prev.start, prev.end);
            let (next_radius, next_center) = seg_arc_radius_and_center(next.start, next.end);

            let within_both = |p: Vector2<T>| {
                point_within_arc_sweep(
                    prev_center,
                    prev.start.pos(),
                    prev.end.pos(),
                    prev.start.bulge_is_neg(),
                    p,
                ) && point_within_arc_sweep(
                    next_center,
                    next.start.pos(),
                    next.end.pos(),
                    next.start.bulge_is_neg(),
                    p,
                )
            };

            let point = match circle_circle_intr(
                prev_radius,
                prev_center,
                next_radius,
                next_center,
                pos_equal_eps,
            ) {
                CircleCircleIntr::NoIntersect => return Bridge,
                // concentric arcs already share their raw end points
                CircleCircleIntr::Overlapping => return Butt,
                CircleCircleIntr::TangentIntersect { point } => point,
                CircleCircleIntr::TwoIntersects { point1, point2 } => {
                    if dist_squared(point1, prev.joint) < dist_squared(point2, prev.joint) {
                        point1
                    } else {
                        point2
                    }
                }
            };

            if within_both(point) {
                Trim(point)
            } else {
                Bridge
            }
        }
    }
}

/// Vertex placed at `point` spanning the remainder of `seg` out to its end.
fn resume_vertex<T>(seg: &OffsetSeg<T>, point: Vector2<T>) -> PlineVertex<T>
where
    T: Real,
{
    if seg.start.bulge_is_zero() {
        return PlineVertex::from_vector2(point, T::zero());
    }

    let (_, center) = seg_arc_radius_and_center(seg.start, seg.end);
    let sweep = delta_angle(angle(center, point), angle(center, seg.end.pos()));
    // a point at the very end of the arc can flip the sweep sign, keep the
    // original bulge in that case
    if (sweep > T::zero()) == seg.start.bulge_is_pos() {
        PlineVertex::from_vector2(point, bulge_from_angle(sweep))
    } else {
        PlineVertex::from_vector2(point, seg.start.bulge)
    }
}

/// Re-trims the bulge of the last vertex in `result` so its arc ends at
/// `point` instead of running out to the end of `seg`.
fn pull_back_vertex<T>(
    result: &mut Polyline<T>,
    seg: &OffsetSeg<T>,
    point: Vector2<T>,
    pos_equal_eps: T,
) where
    T: Real,
{
    if seg.start.bulge_is_zero() {
        return;
    }

    let last = *result.last().unwrap();
    if last.bulge_is_zero() || last.pos().fuzzy_eq_eps(seg.end.pos(), pos_equal_eps) {
        return;
    }

    let (_, center) = seg_arc_radius_and_center(last, seg.end);
    let sweep = delta_angle(angle(center, last.pos()), angle(center, point));
    // same sign guard as resume_vertex
    if (sweep > T::zero()) == last.bulge_is_pos() {
        result.last_mut().unwrap().bulge = bulge_from_angle(sweep);
    }
}

fn apply_join<T>(
    result: &mut Polyline<T>,
    prev: &OffsetSeg<T>,
    next: &OffsetSeg<T>,
    arcs_ccw: bool,
    pos_equal_eps: T,
) where
    T: Real,
{
    match plan_join(prev, next, pos_equal_eps) {
        JoinAction::Trim(point) => {
            pull_back_vertex(result, prev, point, pos_equal_eps);
            result.add_or_replace_vertex(resume_vertex(next, point), pos_equal_eps);
        }
        JoinAction::Bridge => {
            let from = prev.end.pos();
            let to = next.start.pos();
            let sweep = delta_angle(angle(prev.joint, from), angle(prev.joint, to)).abs();
            let bulge = if arcs_ccw {
                bulge_from_angle(sweep)
            } else {
                -bulge_from_angle(sweep)
            };
            result.add_or_replace(from.x, from.y, bulge, pos_equal_eps);
            result.add_or_replace_vertex(next.start, pos_equal_eps);
        }
        JoinAction::Butt => {
            result.add_or_replace_vertex(prev.end.with_bulge(T::zero()), pos_equal_eps);
            result.add_or_replace_vertex(next.start, pos_equal_eps);
        }
    }
}

/// Rewrites the start vertex of `result` to sit at `new_start`, re-trimming
/// its arc bulge to still end on the second vertex.
fn restart_first_vertex<T>(result: &mut Polyline<T>, new_start: Vector2<T>)
where
    T: Real,
{
    let first = result[0];
    if !first.bulge_is_zero() && result.len() > 1 {
        let (_, center) = seg_arc_radius_and_center(first, result[1]);
        let sweep = delta_angle(angle(center, new_start), angle(center, result[1].pos()));
        if (sweep > T::zero()) == first.bulge_is_pos() {
            result[0] = PlineVertex::from_vector2(new_start, bulge_from_angle(sweep));
            return;
        }
        // sweep direction flipped, position update only (pruned later)
    }

    result[0].x = new_start.x;
    result[0].y = new_start.y;
}

/// Create the raw offset polyline: every segment offset by `offset` with
/// consecutive raw segments joined by trimming at their intersect or bridging
/// with an arc around the original joint vertex.
pub(crate) fn create_raw_offset_polyline<T>(
    source: &Polyline<T>,
    offset: T,
    pos_equal_eps: T,
) -> Polyline<T>
where
    T: Real,
{
    if source.len() < 2 {
        return Polyline::new();
    }

    let segs = raw_offset_segs(source, offset);
    if segs.is_empty() || (segs.len() == 1 && segs[0].collapsed) {
        return Polyline::new();
    }

    // bridging arcs bow away from the source polyline
    let arcs_ccw = offset < T::zero();

    let mut result = Polyline::with_capacity(source.len(), source.is_closed());
    result.add_vertex(segs[0].start);

    let mut pairs = segs.windows(2);
    if let Some(pair) = pairs.next() {
        apply_join(&mut result, &pair[0], &pair[1], arcs_ccw, pos_equal_eps);
    }
    // whether the first join swallowed the start vertex decides the seam fix
    // up below
    let start_vertex_replaced = result.len() == 1;

    for pair in pairs {
        apply_join(&mut result, &pair[0], &pair[1], arcs_ccw, pos_equal_eps);
    }

    if source.is_closed() && result.len() > 1 {
        // join across the seam from the last segment back to the first
        apply_join(
            &mut result,
            segs.last().unwrap(),
            &segs[0],
            arcs_ccw,
            pos_equal_eps,
        );

        if !start_vertex_replaced {
            // the seam join lands on the true start position, carry it over
            // to the start vertex
            let new_start = result.last().unwrap().pos();
            restart_first_vertex(&mut result, new_start);
        }

        // drop repeat positions the seam join may have introduced around the
        // wrap
        if result.len() > 1
            && result[0]
                .pos()
                .fuzzy_eq_eps(result.last().unwrap().pos(), pos_equal_eps)
        {
            result.remove_last();
        }
        if result.len() > 1 && result[0].pos().fuzzy_eq_eps(result[1].pos(), pos_equal_eps) {
            result.remove(0);
        }
    } else {
        result.add_or_replace_vertex(segs.last().unwrap().end, pos_equal_eps);
    }

    // joining may have reduced everything down to a single vertex
    if result.len() == 1 {
        result.clear();
    }

    result
}

/// True if `point` keeps at least the offset distance (within `dist_eps`) to
/// every source polyline segment near it.
fn point_is_at_offset_dist<T>(
    point: Vector2<T>,
    source: &Polyline<T>,
    source_index: &StaticSpatialIndex<T>,
    offset: T,
    dist_eps: T,
    query_stack: &mut Vec<usize>,
) -> bool
where
    T: Real,
{
    let required = offset.abs() - dist_eps;
    let required_sq = required * required;
    let query_box = AABB::new(point.x, point.y, point.x, point.y).expanded(required);

    let mut far_enough = true;
    source_index.visit_query_with_stack(
        query_box.min_x,
        query_box.min_y,
        query_box.max_x,
        query_box.max_y,
        &mut |i: usize| {
            let near = seg_closest_point(source[i], source[source.next_wrapping_index(i)], point);
            far_enough = dist_squared(near, point) > required_sq;
            far_enough
        },
        query_stack,
    );

    far_enough
}

/// Validity checks shared by the slice dicing: every kept slice point must
/// stay at the offset distance from the source polyline and no kept slice
/// segment may touch it.
struct SliceValidator<'a, T>
where
    T: Real,
{
    source: &'a Polyline<T>,
    source_index: &'a StaticSpatialIndex<T>,
    offset: T,
    pos_equal_eps: T,
    offset_dist_eps: T,
    query_stack: Vec<usize>,
}

impl<'a, T> SliceValidator<'a, T>
where
    T: Real,
{
    fn new(
        source: &'a Polyline<T>,
        source_index: &'a StaticSpatialIndex<T>,
        offset: T,
        options: &PlineOffsetOptions<T>,
    ) -> Self {
        Self {
            source,
            source_index,
            offset,
            pos_equal_eps: options.pos_equal_eps,
            offset_dist_eps: options.offset_dist_eps,
            query_stack: Vec::with_capacity(8),
        }
    }

    fn point_ok(&mut self, point: Vector2<T>) -> bool {
        point_is_at_offset_dist(
            point,
            self.source,
            self.source_index,
            self.offset,
            self.offset_dist_eps,
            &mut self.query_stack,
        )
    }

    fn clear_of_source(&mut self, v1: PlineVertex<T>, v2: PlineVertex<T>) -> bool {
        !seg_intersects_polyline(
            v1,
            v2,
            self.source,
            self.source_index,
            self.pos_equal_eps,
            &mut self.query_stack,
        )
    }

    /// Full check for a standalone two vertex slice.
    fn two_vertex_slice_ok(&mut self, a: PlineVertex<T>, b: PlineVertex<T>) -> bool {
        self.point_ok(a.pos())
            && self.point_ok(b.pos())
            && self.point_ok(seg_midpoint(a, b))
            && self.clear_of_source(a, b)
    }
}

/// Open fragment of the raw offset polyline produced by dicing it at its
/// intersect points, tagged with the raw offset segment it starts on for
/// stitch ordering.
#[derive(Debug, Clone)]
struct RawOffsetSlice<T> {
    start_seg: usize,
    polyline: Polyline<T>,
}

impl<T> RawOffsetSlice<T> {
    fn new(start_seg: usize, polyline: Polyline<T>) -> Self {
        RawOffsetSlice {
            start_seg,
            polyline,
        }
    }
}

fn sort_sites_along_segments<T>(sites: &mut BTreeMap<usize, Vec<Vector2<T>>>, raw: &Polyline<T>)
where
    T: Real,
{
    for (&s, points) in sites.iter_mut() {
        let from = raw[s].pos();
        points.sort_unstable_by(|&a, &b| {
            dist_squared(a, from)
                .partial_cmp(&dist_squared(b, from))
                .unwrap()
        });
    }
}

/// Collects intersect sites between the raw offset and a circle positioned at
/// a source polyline end point, skipping hits at segment start vertexes.
fn add_cap_circle_sites<T>(
    raw: &Polyline<T>,
    raw_index: &StaticSpatialIndex<T>,
    center: Vector2<T>,
    radius: T,
    pos_equal_eps: T,
    sites: &mut BTreeMap<usize, Vec<Vector2<T>>>,
) where
    T: Real,
{
    let query_box = AABB::new(center.x, center.y, center.x, center.y).expanded(radius);
    let mut stack = Vec::with_capacity(8);
    let hits = raw_index.query_with_stack(
        query_box.min_x,
        query_box.min_y,
        query_box.max_x,
        query_box.max_y,
        &mut stack,
    );

    for s in hits {
        let v1 = raw[s];
        let v2 = raw[raw.next_wrapping_index(s)];
        if v1.bulge_is_zero() {
            let ts = match line_circle_intr(v1.pos(), v2.pos(), radius, center, pos_equal_eps) {
                LineCircleIntr::NoIntersect => continue,
                LineCircleIntr::TangentIntersect { t0 } => [Some(t0), None],
                LineCircleIntr::TwoIntersects { t0, t1 } => [Some(t0), Some(t1)],
            };
            for t in ts.into_iter().flatten() {
                if t >= T::zero() && t <= T::one() && t.abs() > pos_equal_eps {
                    sites
                        .entry(s)
                        .or_default()
                        .push(point_from_parametric(v1.pos(), v2.pos(), t));
                }
            }
        } else {
            let (seg_radius, seg_center) = seg_arc_radius_and_center(v1, v2);
            let points =
                match circle_circle_intr(seg_radius, seg_center, radius, center, pos_equal_eps) {
                    CircleCircleIntr::NoIntersect | CircleCircleIntr::Overlapping => continue,
                    CircleCircleIntr::TangentIntersect { point } => [Some(point), None],
                    CircleCircleIntr::TwoIntersects { point1, point2 } => {
                        [Some(point1), Some(point2)]
                    }
                };
            for p in points.into_iter().flatten() {
                if !p.fuzzy_eq_eps(v1.pos(), pos_equal_eps)
                    && point_within_arc_sweep(seg_center, v1.pos(), v2.pos(), v1.bulge_is_neg(), p)
                {
                    sites.entry(s).or_default().push(p);
                }
            }
        }
    }
}

/// Dice the raw offset polyline at the intersect `sites` given, keeping only
/// the fragments that pass the validator. `wrap` controls whether traversal
/// wraps past the last vertex (raw offset of a closed source).
fn dice_raw_offset<T>(
    raw: &Polyline<T>,
    sites: &BTreeMap<usize, Vec<Vector2<T>>>,
    wrap: bool,
    validator: &mut SliceValidator<'_, T>,
    pos_equal_eps: T,
    out: &mut Vec<RawOffsetSlice<T>>,
) where
    T: Real,
{
    if raw.len() < 2 {
        return;
    }

    if sites.is_empty() {
        // nothing to dice, the whole raw offset stands or falls on the
        // distance check of a single sample point
        if !validator.point_ok(raw[0].pos()) {
            return;
        }

        let mut whole = raw.clone();
        whole.set_is_closed(false);
        if wrap {
            let start = whole[0];
            whole.add(start.x, start.y, T::zero());
        }
        out.push(RawOffsetSlice::new(usize::MAX, whole));
        return;
    }

    if !wrap {
        // the tail walks below never wrap back around to the raw offset
        // start, so the stretch from the start to the first site forms its
        // own slice
        let mut head = Polyline::new();
        for idx in 0..raw.len() {
            if let Some(points) = sites.get(&idx) {
                let end_point = points[0];
                let split = seg_split_at_point(raw[idx], raw[idx + 1], end_point, pos_equal_eps);
                let end_vertex = PlineVertex::from_vector2(end_point, T::zero());
                if validator.point_ok(end_point)
                    && validator.point_ok(seg_midpoint(split.updated_start, end_vertex))
                    && validator.clear_of_source(split.updated_start, end_vertex)
                {
                    head.add_or_replace_vertex(split.updated_start, pos_equal_eps);
                    head.add_or_replace_vertex(end_vertex, pos_equal_eps);
                    if head.len() > 1 {
                        out.push(RawOffsetSlice::new(0, head));
                    }
                }
                break;
            }

            if !validator.point_ok(raw[idx].pos()) {
                break;
            }
            if idx != 0 && !validator.clear_of_source(*head.last().unwrap(), raw[idx]) {
                break;
            }
            head.add_or_replace_vertex(raw[idx], pos_equal_eps);
        }
    }

    for (&s, points) in sites.iter() {
        let seg_v1 = raw[s];
        let seg_v2 = raw[raw.next_wrapping_index(s)];

        // slices lying between consecutive sites on this segment
        if points.len() > 1 {
            let mut cursor =
                seg_split_at_point(seg_v1, seg_v2, points[0], pos_equal_eps).split_vertex;
            for pair in points.windows(2) {
                let split = seg_split_at_point(cursor, seg_v2, pair[1], pos_equal_eps);
                cursor = split.split_vertex;
                let (a, b) = (split.updated_start, split.split_vertex);
                if a.pos().fuzzy_eq_eps(b.pos(), pos_equal_eps) {
                    continue;
                }
                if !validator.two_vertex_slice_ok(a, b) {
                    continue;
                }

                let mut between = Polyline::with_capacity(2, false);
                between.add_vertex(a);
                between.add_vertex(b);
                out.push(RawOffsetSlice::new(s, between));
            }
        }

        // tail slice walking forward from the last site on this segment to
        // the first site of the next intersected segment
        let tail_start = *points.last().unwrap();
        if !validator.point_ok(tail_start) {
            continue;
        }

        let mut slice = Polyline::new();
        slice.add_vertex(seg_split_at_point(seg_v1, seg_v2, tail_start, pos_equal_eps).split_vertex);

        let mut idx = raw.next_wrapping_index(s);
        let mut ok = true;
        let mut terminated = false;
        for _ in 0..raw.len() {
            let v = raw[idx];
            if !validator.point_ok(v.pos())
                || !validator.clear_of_source(*slice.last().unwrap(), v)
            {
                ok = false;
                break;
            }
            slice.add_or_replace_vertex(v, pos_equal_eps);

            if let Some(ahead) = sites.get(&idx) {
                let end_point = ahead[0];
                let split = seg_split_at_point(
                    v,
                    raw[raw.next_wrapping_index(idx)],
                    end_point,
                    pos_equal_eps,
                );
                let end_vertex = PlineVertex::from_vector2(end_point, T::zero());
                if !validator.point_ok(end_point)
                    || !validator.point_ok(seg_midpoint(split.updated_start, end_vertex))
                {
                    ok = false;
                } else {
                    *slice.last_mut().unwrap() = split.updated_start;
                    slice.add_or_replace_vertex(end_vertex, pos_equal_eps);
                }
                terminated = true;
                break;
            }

            if !wrap && idx == raw.len() - 1 {
                terminated = true;
                break;
            }
            idx = raw.next_wrapping_index(idx);
        }

        if !ok || !terminated || slice.len() < 2 {
            continue;
        }

        // discard closed sliver loops left behind by the distance threshold
        if slice[0].pos().fuzzy_eq(slice.last().unwrap().pos())
            && slice.path_length() <= T::from(1e-2).unwrap()
        {
            continue;
        }

        out.push(RawOffsetSlice::new(s, slice));
    }
}

/// Dice the raw offset of a closed source polyline at its self intersects.
fn slices_from_raw_offset<T>(
    source: &Polyline<T>,
    raw: &Polyline<T>,
    source_index: &StaticSpatialIndex<T>,
    offset: T,
    options: &PlineOffsetOptions<T>,
) -> Vec<RawOffsetSlice<T>>
where
    T: Real,
{
    debug_assert!(source.is_closed(), "expected closed source polyline");

    let mut out = Vec::new();
    if raw.len() < 2 {
        return out;
    }

    let raw_index = raw.create_approx_spatial_index();
    let mut sites = BTreeMap::<usize, Vec<Vector2<T>>>::new();
    for intr in all_self_intersects_as_basic(raw, &raw_index, options.pos_equal_eps) {
        sites.entry(intr.start_index1).or_default().push(intr.point);
        sites.entry(intr.start_index2).or_default().push(intr.point);
    }
    sort_sites_along_segments(&mut sites, raw);

    let mut validator = SliceValidator::new(source, source_index, offset, options);
    dice_raw_offset(raw, &sites, true, &mut validator, options.pos_equal_eps, &mut out);
    out
}

/// Dice the raw offset using both its self intersects and its intersects with
/// the dual (opposite direction) raw offset, required for open sources and
/// for closed sources with self intersects.
fn slices_from_dual_raw_offsets<T>(
    source: &Polyline<T>,
    raw: &Polyline<T>,
    dual: &Polyline<T>,
    source_index: &StaticSpatialIndex<T>,
    offset: T,
    options: &PlineOffsetOptions<T>,
) -> Vec<RawOffsetSlice<T>>
where
    T: Real,
{
    let mut out = Vec::new();
    if raw.len() < 2 {
        return out;
    }

    let pos_equal_eps = options.pos_equal_eps;
    let raw_index = raw.create_approx_spatial_index();
    let mut sites = BTreeMap::<usize, Vec<Vector2<T>>>::new();

    if !source.is_closed() {
        // circles at the source end points cap the offset at full distance
        let cap_radius = offset.abs();
        add_cap_circle_sites(
            raw,
            &raw_index,
            source[0].pos(),
            cap_radius,
            pos_equal_eps,
            &mut sites,
        );
        add_cap_circle_sites(
            raw,
            &raw_index,
            source.last().unwrap().pos(),
            cap_radius,
            pos_equal_eps,
            &mut sites,
        );
    }

    for intr in all_self_intersects_as_basic(raw, &raw_index, pos_equal_eps) {
        sites.entry(intr.start_index1).or_default().push(intr.point);
        sites.entry(intr.start_index2).or_default().push(intr.point);
    }

    // only the first index of the dual intersects maps onto the raw offset
    let dual_intrs = find_intersects(raw, dual, &raw_index, pos_equal_eps);
    for intr in dual_intrs.basic_intersects {
        sites.entry(intr.start_index1).or_default().push(intr.point);
    }
    for intr in dual_intrs.overlapping_intersects {
        sites
            .entry(intr.start_index1)
            .or_default()
            .extend([intr.point1, intr.point2]);
    }

    sort_sites_along_segments(&mut sites, raw);

    let mut validator = SliceValidator::new(source, source_index, offset, options);
    dice_raw_offset(
        raw,
        &sites,
        source.is_closed(),
        &mut validator,
        pos_equal_eps,
        &mut out,
    );
    out
}

/// Stitch diced slices back together into the final offset polylines by
/// joining endpoints that coincide within the slice join epsilon.
fn stitch_offset_slices<T>(
    slices: &[RawOffsetSlice<T>],
    close_loops: bool,
    wrap_span: usize,
    options: &PlineOffsetOptions<T>,
) -> Vec<Polyline<T>>
where
    T: Real,
{
    let join_eps = options.slice_join_eps;
    let pos_equal_eps = options.pos_equal_eps;

    match slices {
        [] => Vec::new(),
        [single] => {
            let mut pline = single.polyline.clone();
            if close_loops
                && pline[0]
                    .pos()
                    .fuzzy_eq_eps(pline.last().unwrap().pos(), join_eps)
            {
                pline.remove_last();
                pline.set_is_closed(true);
            }
            vec![pline]
        }
        _ => {
            let start_point_index = {
                let mut builder = StaticSpatialIndexBuilder::new(slices.len());
                for slice in slices {
                    let sp = slice.polyline[0].pos();
                    let sp_box = AABB::new(sp.x, sp.y, sp.x, sp.y).expanded(join_eps);
                    builder.add(sp_box.min_x, sp_box.min_y, sp_box.max_x, sp_box.max_y);
                }
                builder.build().expect("all slice boxes added")
            };

            let mut consumed = vec![false; slices.len()];
            let mut results = Vec::new();
            let mut candidates = Vec::new();
            let mut stack = Vec::with_capacity(8);

            for first in 0..slices.len() {
                if consumed[first] {
                    continue;
                }
                consumed[first] = true;

                let chain_start = slices[first].polyline[0].pos();
                let mut chain = slices[first].polyline.clone();
                let mut anchor = slices[first].start_seg;

                for _ in 0..slices.len() {
                    let tail = chain.last().unwrap().pos();
                    let tail_box = AABB::new(tail.x, tail.y, tail.x, tail.y).expanded(join_eps);
                    candidates.clear();
                    start_point_index.visit_query_with_stack(
                        tail_box.min_x,
                        tail_box.min_y,
                        tail_box.max_x,
                        tail_box.max_y,
                        &mut |c: usize| {
                            if !consumed[c] {
                                candidates.push(c);
                            }
                            true
                        },
                        &mut stack,
                    );

                    // continue onto the slice whose source segment follows
                    // soonest along the raw offset, preferring slices that do
                    // not immediately rejoin the chain start (retains
                    // overlapping slices through stitching)
                    let span_dist = |c: usize| {
                        let s = slices[c].start_seg;
                        if anchor <= s {
                            s - anchor
                        } else {
                            wrap_span - anchor + s
                        }
                    };
                    let rejoins_start = |c: usize| {
                        slices[c]
                            .polyline
                            .last()
                            .unwrap()
                            .pos()
                            .fuzzy_eq_eps(chain_start, pos_equal_eps)
                    };

                    match candidates
                        .iter()
                        .copied()
                        .min_by_key(|&c| (span_dist(c), rejoins_start(c)))
                    {
                        Some(next) => {
                            consumed[next] = true;
                            chain.remove_last();
                            chain.extend_vertexes(slices[next].polyline.iter().copied());
                            anchor = slices[next].start_seg;
                        }
                        None => break,
                    }
                }

                if chain.len() < 2 {
                    continue;
                }

                if close_loops
                    && chain[0]
                        .pos()
                        .fuzzy_eq_eps(chain.last().unwrap().pos(), pos_equal_eps)
                {
                    chain.remove_last();
                    chain.set_is_closed(true);
                }

                results.push(chain);
            }

            results
        }
    }
}

/// Compute the parallel offset polylines of `polyline` by `offset`.
///
/// Positive `offset` goes to the left of segment direction, negative to the
/// right. Returns an empty Vec if the polyline fully collapses under the
/// offset distance.
pub(crate) fn parallel_offset<T>(
    polyline: &Polyline<T>,
    offset: T,
    options: &PlineOffsetOptions<T>,
) -> Vec<Polyline<T>>
where
    T: Real,
{
    if polyline.len() < 2 {
        return Vec::new();
    }

    let owned_index;
    let source_index = match options.aabb_index {
        Some(index) => index,
        None => {
            owned_index = polyline.create_approx_spatial_index();
            &owned_index
        }
    };

    let raw = create_raw_offset_polyline(polyline, offset, options.pos_equal_eps);

    if polyline.is_closed() && !options.handle_self_intersects {
        let slices = slices_from_raw_offset(polyline, &raw, source_index, offset, options);
        stitch_offset_slices(&slices, true, raw.len().saturating_sub(1), options)
    } else {
        // the dual (opposite direction) raw offset caps the offset at the
        // ends of an open polyline and rejects inverted loops of a self
        // intersecting source
        let dual = create_raw_offset_polyline(polyline, -offset, options.pos_equal_eps);
        let slices =
            slices_from_dual_raw_offsets(polyline, &raw, &dual, source_index, offset, options);
        stitch_offset_slices(&slices, polyline.is_closed(), raw.len(), options)
    }
}
