use super::seg::{
    arc_seg_bounding_box, seg_arc_radius_and_center, seg_bounding_box, seg_closest_point,
    seg_fast_approx_bounding_box, seg_length, seg_tangent_vector,
};
use super::PlineVertex;
use crate::index::{StaticSpatialIndex, StaticSpatialIndexBuilder, AABB};
use crate::math::{angle, angle_from_bulge, point_on_circle, point_within_arc_sweep, Vector2};
use crate::traits::Real;
use num_traits::NumCast;
use std::ops::{Index, IndexMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Orientation of a polyline.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlineOrientation {
    /// Polyline is open.
    Open,
    /// Polyline is closed and directionally clockwise.
    Clockwise,
    /// Polyline is closed and directionally counter clockwise.
    CounterClockwise,
}

/// Result from calling [Polyline::closest_point].
#[derive(Debug, Copy, Clone)]
pub struct ClosestPointResult<T>
where
    T: Real,
{
    /// Start vertex index of the closest segment.
    pub seg_start_index: usize,
    /// Closest point on the closest segment.
    pub seg_point: Vector2<T>,
    /// Distance between the input point and [ClosestPointResult::seg_point].
    pub distance: T,
}

/// Polyline represented by a contiguous sequence of [PlineVertex] and an
/// `is_closed` flag.
///
/// Each vertex's bulge parameterizes the segment going out of it; for a closed
/// polyline the last vertex's segment wraps back to the first vertex, for an
/// open polyline the last vertex's bulge is unused.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polyline<T = f64> {
    /// Contiguous sequence of vertexes.
    pub vertex_data: Vec<PlineVertex<T>>,
    /// Whether the polyline is closed or open.
    pub is_closed: bool,
}

impl<T> Index<usize> for Polyline<T> {
    type Output = PlineVertex<T>;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.vertex_data[index]
    }
}

impl<T> IndexMut<usize> for Polyline<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.vertex_data[index]
    }
}

impl<T> Polyline<T>
where
    T: Real,
{
    /// Create a new empty open polyline.
    #[inline]
    pub fn new() -> Self {
        Polyline {
            vertex_data: Vec::new(),
            is_closed: false,
        }
    }

    /// Create a new empty closed polyline.
    #[inline]
    pub fn new_closed() -> Self {
        Polyline {
            vertex_data: Vec::new(),
            is_closed: true,
        }
    }

    /// Create a new empty polyline with `capacity` reserved.
    #[inline]
    pub fn with_capacity(capacity: usize, is_closed: bool) -> Self {
        Polyline {
            vertex_data: Vec::with_capacity(capacity),
            is_closed,
        }
    }

    /// Create a polyline collecting vertexes from an iterator.
    #[inline]
    pub fn from_iter<I>(iter: I, is_closed: bool) -> Self
    where
        I: IntoIterator<Item = PlineVertex<T>>,
    {
        Polyline {
            vertex_data: iter.into_iter().collect(),
            is_closed,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertex_data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertex_data.is_empty()
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    #[inline]
    pub fn set_is_closed(&mut self, is_closed: bool) {
        self.is_closed = is_closed;
    }

    /// Number of segments formed by the vertexes (`len` if closed, `len - 1`
    /// if open, 0 if fewer than 2 vertexes).
    #[inline]
    pub fn segment_count(&self) -> usize {
        let ln = self.len();
        if ln < 2 {
            return 0;
        }

        if self.is_closed {
            ln
        } else {
            ln - 1
        }
    }

    /// Add a vertex to the end of the polyline.
    #[inline]
    pub fn add(&mut self, x: T, y: T, bulge: T) {
        self.vertex_data.push(PlineVertex::new(x, y, bulge));
    }

    /// Add a vertex to the end of the polyline.
    #[inline]
    pub fn add_vertex(&mut self, vertex: PlineVertex<T>) {
        self.vertex_data.push(vertex);
    }

    /// Add a vertex, replacing the last vertex instead if its position is
    /// fuzzy equal to the new vertex position (the new bulge wins).
    #[inline]
    pub fn add_or_replace(&mut self, x: T, y: T, bulge: T, pos_equal_eps: T) {
        self.add_or_replace_vertex(PlineVertex::new(x, y, bulge), pos_equal_eps);
    }

    /// Same as [Polyline::add_or_replace] accepting a vertex.
    pub fn add_or_replace_vertex(&mut self, vertex: PlineVertex<T>, pos_equal_eps: T) {
        match self.vertex_data.last_mut() {
            Some(last) if last.pos().fuzzy_eq_eps(vertex.pos(), pos_equal_eps) => {
                *last = vertex;
            }
            _ => self.vertex_data.push(vertex),
        }
    }

    #[inline]
    pub fn last(&self) -> Option<&PlineVertex<T>> {
        self.vertex_data.last()
    }

    #[inline]
    pub fn last_mut(&mut self) -> Option<&mut PlineVertex<T>> {
        self.vertex_data.last_mut()
    }

    #[inline]
    pub fn remove(&mut self, index: usize) -> PlineVertex<T> {
        self.vertex_data.remove(index)
    }

    #[inline]
    pub fn remove_last(&mut self) -> PlineVertex<T> {
        self.vertex_data
            .pop()
            .expect("cannot remove from empty polyline")
    }

    #[inline]
    pub fn clear(&mut self) {
        self.vertex_data.clear();
    }

    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.vertex_data.reserve(additional);
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, PlineVertex<T>> {
        self.vertex_data.iter()
    }

    #[inline]
    pub fn extend_vertexes<I>(&mut self, vertexes: I)
    where
        I: IntoIterator<Item = PlineVertex<T>>,
    {
        self.vertex_data.extend(vertexes);
    }

    /// Index of the vertex after `i` (wrapping to 0 at the end).
    #[inline]
    pub fn next_wrapping_index(&self, i: usize) -> usize {
        let next = i + 1;
        if next >= self.len() {
            0
        } else {
            next
        }
    }

    /// Index of the vertex before `i` (wrapping to the last at 0).
    #[inline]
    pub fn prev_wrapping_index(&self, i: usize) -> usize {
        if i == 0 {
            self.len() - 1
        } else {
            i - 1
        }
    }

    /// Iterate the polyline segments as vertex pairs.
    #[inline]
    pub fn iter_segments(&self) -> SegmentIter<'_, T> {
        SegmentIter {
            polyline: self,
            pos: 0,
            remaining: self.segment_count(),
        }
    }

    /// Iterate the polyline segment vertex index pairs.
    #[inline]
    pub fn iter_segment_indexes(&self) -> SegmentIndexIter {
        SegmentIndexIter {
            pos: 0,
            remaining: self.segment_count(),
            vertex_count: self.len(),
        }
    }

    /// Fuzzy equal comparison with another polyline using the `eps` given
    /// (same closed flag, same vertex count, all vertexes fuzzy equal).
    pub fn fuzzy_eq_eps(&self, other: &Polyline<T>, eps: T) -> bool {
        self.is_closed == other.is_closed
            && self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(v1, v2)| v1.fuzzy_eq_eps(*v2, eps))
    }

    /// Same as [Polyline::fuzzy_eq_eps] using `T::fuzzy_epsilon()`.
    #[inline]
    pub fn fuzzy_eq(&self, other: &Polyline<T>) -> bool {
        self.fuzzy_eq_eps(other, T::fuzzy_epsilon())
    }

    /// Extents (axis aligned bounding box) of the polyline formed by the union
    /// of the exact segment bounding boxes.
    ///
    /// An empty polyline returns the inverted infinities box ([AABB::empty]);
    /// a single vertex polyline collapses to the vertex point.
    pub fn extents(&self) -> AABB<T> {
        let mut result = AABB::empty();
        if self.is_empty() {
            return result;
        }

        let v1 = self[0];
        result = AABB::new(v1.x, v1.y, v1.x, v1.y);

        for (v1, v2) in self.iter_segments() {
            if v1.bulge_is_zero() {
                // line segment, only the end point can extend the box
                result.expand_to_include_point(v2.x, v2.y);
            } else {
                result.expand_to_include(&arc_seg_bounding_box(v1, v2));
            }
        }

        result
    }

    /// Total path length of the polyline.
    #[inline]
    pub fn path_length(&self) -> T {
        self.iter_segments()
            .fold(T::zero(), |acc, (v1, v2)| acc + seg_length(v1, v2))
    }

    /// Signed area of a closed polyline (always 0 for an open polyline).
    ///
    /// Counter clockwise direction yields positive area, clockwise negative.
    pub fn area(&self) -> T {
        if !self.is_closed {
            return T::zero();
        }

        // shoelace formula over the segment chords, plus the signed circular
        // segment area (radius^2 / 2) * (sweep - sin(sweep)) bowed out by
        // each arc (the sweep sign carries the arc direction through)
        // https://en.wikipedia.org/wiki/Shoelace_formula
        // https://en.wikipedia.org/wiki/Circular_segment
        let two = T::two();
        let mut total = T::zero();

        for (v1, v2) in self.iter_segments() {
            total = total + v1.pos().perp_dot(v2.pos()) / two;
            if !v1.bulge_is_zero() {
                let sweep = angle_from_bulge(v1.bulge);
                let (radius, _) = seg_arc_radius_and_center(v1, v2);
                total = total + radius * radius * (sweep - sweep.sin()) / two;
            }
        }

        total
    }

    /// Orientation of the polyline derived from its signed area.
    ///
    /// May not be meaningful if the polyline has self intersects.
    pub fn orientation(&self) -> PlineOrientation {
        if !self.is_closed {
            return PlineOrientation::Open;
        }

        if self.area() < T::zero() {
            PlineOrientation::Clockwise
        } else {
            PlineOrientation::CounterClockwise
        }
    }

    /// Winding number of the polyline path around `point`.
    ///
    /// Always 0 for an open polyline. For a closed polyline without self
    /// intersects the result is -1 (wraps clockwise), 0 (point outside), or 1
    /// (wraps counter clockwise); self intersecting polylines may wind more
    /// than once. The result is not defined if the point lies on the polyline
    /// (use [Polyline::closest_point] to detect that case).
    pub fn winding_number(&self, point: Vector2<T>) -> i32 {
        if !self.is_closed || self.len() < 2 {
            return 0;
        }

        // Cast a horizontal ray from the point toward +x and sum signed
        // crossings of the path: +1 where it passes upward through the ray,
        // -1 where it passes downward. A crossing landing exactly on a vertex
        // is claimed by at most one of the two segments sharing it (ascending
        // runs own their bottom end point, descending runs own theirs), which
        // counts a pass-through once and cancels a touch.

        let line_crossing = |p0: Vector2<T>, p1: Vector2<T>| -> i32 {
            let (going_up, bottom_y, top_y) = if p1.y > p0.y {
                (true, p0.y, p1.y)
            } else {
                (false, p1.y, p0.y)
            };

            // half open range excludes the top end point (and horizontal
            // segments entirely)
            if point.y < bottom_y || point.y >= top_y {
                return 0;
            }

            let t = (point.y - p0.y) / (p1.y - p0.y);
            if p0.x + t * (p1.x - p0.x) <= point.x {
                return 0;
            }

            if going_up {
                1
            } else {
                -1
            }
        };

        let arc_crossing = |v1: PlineVertex<T>, v2: PlineVertex<T>| -> i32 {
            let (radius, center) = seg_arc_radius_and_center(v1, v2);
            let dy = point.y - center.y;
            let half_chord_sq = radius * radius - dy * dy;
            if half_chord_sq <= T::zero() {
                // ray line misses the circle (or only grazes it)
                return 0;
            }

            // the ray line cuts the full circle at two points, test each for
            // lying on the arc sweep past the ray origin
            let half_chord = half_chord_sq.sqrt();
            let mut crossings = 0;
            for x in [center.x + half_chord, center.x - half_chord] {
                let q = Vector2::new(x, point.y);
                if q.x <= point.x
                    || !point_within_arc_sweep(center, v1.pos(), v2.pos(), v1.bulge_is_neg(), q)
                {
                    continue;
                }

                let going_up = seg_tangent_vector(v1, v2, q).y > T::zero();
                // same vertex convention as for line segments
                if q.fuzzy_eq(v1.pos()) {
                    if going_up {
                        crossings += 1;
                    }
                } else if q.fuzzy_eq(v2.pos()) {
                    if !going_up {
                        crossings -= 1;
                    }
                } else if going_up {
                    crossings += 1;
                } else {
                    crossings -= 1;
                }
            }

            crossings
        };

        let mut winding = 0;
        for (v1, v2) in self.iter_segments() {
            winding += if v1.bulge_is_zero() {
                line_crossing(v1.pos(), v2.pos())
            } else {
                arc_crossing(v1, v2)
            };
        }

        winding
    }

    /// Closest point on the polyline to the `point` given.
    ///
    /// Returns `None` if the polyline is empty.
    pub fn closest_point(&self, point: Vector2<T>) -> Option<ClosestPointResult<T>> {
        if self.is_empty() {
            return None;
        }

        let mut result = ClosestPointResult {
            seg_start_index: 0,
            seg_point: self[0].pos(),
            distance: <T as Real>::max_value(),
        };

        if self.len() == 1 {
            result.distance = (result.seg_point - point).length();
            return Some(result);
        }

        let mut best_dist_squared = <T as Real>::max_value();

        for (i, j) in self.iter_segment_indexes() {
            let cp = seg_closest_point(self[i], self[j], point);
            let dist2 = (point - cp).length_squared();
            if dist2 < best_dist_squared {
                result.seg_start_index = i;
                result.seg_point = cp;
                best_dist_squared = dist2;
            }
        }

        result.distance = best_dist_squared.sqrt();

        Some(result)
    }

    /// Uniformly scale all vertex positions by `scale_factor` (bulge values
    /// are angle encodings and are unchanged).
    pub fn scale_mut(&mut self, scale_factor: T) {
        for v in self.vertex_data.iter_mut() {
            v.x = scale_factor * v.x;
            v.y = scale_factor * v.y;
        }
    }

    /// Translate all vertex positions by `(x, y)`.
    pub fn translate_mut(&mut self, x: T, y: T) {
        for v in self.vertex_data.iter_mut() {
            v.x = v.x + x;
            v.y = v.y + y;
        }
    }

    /// Invert/reverse the direction of the polyline in place.
    ///
    /// Vertex order is reversed and bulge values shift back by one position
    /// with their sign negated, so each segment keeps its shape with opposite
    /// traversal. A closed counter clockwise polyline becomes clockwise and
    /// vice versa.
    pub fn invert_direction_mut(&mut self) {
        let vc = self.len();
        if vc < 2 {
            return;
        }

        self.vertex_data.reverse();

        let first_bulge = self[0].bulge;
        for i in 1..vc {
            let b = -self[i].bulge;
            self[i - 1].bulge = b;
        }

        if self.is_closed {
            self[vc - 1].bulge = -first_bulge;
        } else {
            self[vc - 1].bulge = T::zero();
        }
    }

    /// Remove all repeat position (singular) vertexes, keeping the later
    /// vertex's bulge at each collapse.
    ///
    /// For a closed polyline a trailing vertex on top of the first vertex is
    /// also removed. This operation is idempotent.
    pub fn remove_repeat_pos(&self, pos_equal_eps: T) -> Polyline<T> {
        let mut result = Polyline::with_capacity(self.len(), self.is_closed);
        for &v in self.iter() {
            result.add_or_replace_vertex(v, pos_equal_eps);
        }

        if self.is_closed && result.len() > 1 {
            let first_pos = result[0].pos();
            if result
                .last()
                .unwrap()
                .pos()
                .fuzzy_eq_eps(first_pos, pos_equal_eps)
            {
                result.remove_last();
            }
        }

        result
    }

    /// Tessellate all arc segments into line segments such that the distance
    /// from any line to the arc it approximates is no more than
    /// `error_distance`.
    ///
    /// Line end points are circumscribed (they lie on the arc path). An empty
    /// polyline returns an empty polyline preserving `is_closed`. Returns
    /// `None` only if the numeric type fails to cast the segment count.
    pub fn arcs_to_approx_lines(&self, error_distance: T) -> Option<Polyline<T>> {
        let mut result = Polyline::with_capacity(self.len(), self.is_closed);

        if self.is_empty() {
            return Some(result);
        }

        let abs_error = error_distance.abs();

        for (v1, v2) in self.iter_segments() {
            if v1.bulge_is_zero() {
                result.add_vertex(v1);
                continue;
            }

            let (radius, center) = seg_arc_radius_and_center(v1, v2);
            if radius.fuzzy_lt(abs_error) {
                result.add(v1.x, v1.y, T::zero());
                continue;
            }

            // a chord subtending sweep phi has sagitta radius * (1 - cos(phi / 2)),
            // bounding that by the error distance gives the widest chord allowed
            let sweep = angle_from_bulge(v1.bulge);
            let max_chord_sweep = T::two() * (T::one() - abs_error / radius).acos();
            let chord_count = (sweep.abs() / max_chord_sweep).ceil();
            // stepping by the signed sweep fraction walks the arc in its own
            // direction
            let chord_sweep = sweep / chord_count;

            let start_angle = angle(center, v1.pos());
            result.add(v1.x, v1.y, T::zero());
            let count = chord_count.to_usize()?;
            for i in 1..count {
                let step = <T as NumCast>::from(i)?;
                let p = point_on_circle(radius, center, start_angle + step * chord_sweep);
                result.add(p.x, p.y, T::zero());
            }
        }

        if !self.is_closed {
            // add back the final vertex dropped by segment iteration
            result.add_vertex(*self.last().unwrap());
        }

        Some(result)
    }

    /// Create a spatial index of approximate segment bounding boxes (boxes are
    /// never smaller than the true segment bounds).
    ///
    /// The segment's start vertex index keys the box in the index.
    pub fn create_approx_spatial_index(&self) -> StaticSpatialIndex<T> {
        let mut builder = StaticSpatialIndexBuilder::new(self.segment_count());

        for (v1, v2) in self.iter_segments() {
            let bb = seg_fast_approx_bounding_box(v1, v2);
            builder.add(bb.min_x, bb.min_y, bb.max_x, bb.max_y);
        }

        builder
            .build()
            .expect("added box count always matches segment count")
    }

    /// Create a spatial index of exact segment bounding boxes.
    ///
    /// Slower to build than [Polyline::create_approx_spatial_index] when arcs
    /// are present.
    pub fn create_spatial_index(&self) -> StaticSpatialIndex<T> {
        let mut builder = StaticSpatialIndexBuilder::new(self.segment_count());

        for (v1, v2) in self.iter_segments() {
            let bb = seg_bounding_box(v1, v2);
            builder.add(bb.min_x, bb.min_y, bb.max_x, bb.max_y);
        }

        builder
            .build()
            .expect("added box count always matches segment count")
    }
}

/// Iterator over polyline segments as `(start_vertex, end_vertex)` pairs.
#[derive(Debug, Clone)]
pub struct SegmentIter<'a, T> {
    polyline: &'a Polyline<T>,
    pos: usize,
    remaining: usize,
}

impl<T> Iterator for SegmentIter<'_, T>
where
    T: Real,
{
    type Item = (PlineVertex<T>, PlineVertex<T>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let i = self.pos;
        let j = self.polyline.next_wrapping_index(i);
        self.pos = j;
        self.remaining -= 1;
        Some((self.polyline[i], self.polyline[j]))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for SegmentIter<'_, T> where T: Real {}

/// Iterator over polyline segment vertex indexes as `(start, end)` pairs.
#[derive(Debug, Clone)]
pub struct SegmentIndexIter {
    pos: usize,
    remaining: usize,
    vertex_count: usize,
}

impl Iterator for SegmentIndexIter {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let i = self.pos;
        let j = if i + 1 >= self.vertex_count { 0 } else { i + 1 };
        self.pos = j;
        self.remaining -= 1;
        Some((i, j))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for SegmentIndexIter {}
