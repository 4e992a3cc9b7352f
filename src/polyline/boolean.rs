//! Boolean combine operations (union, intersect, exclude, xor) between two
//! closed polylines: intersect site enumeration, slicing, winding number
//! classification of slices, and stitching the kept slices into closed result
//! polylines.

use super::intersects::find_intersects;
use super::seg::{seg_midpoint, seg_split_at_point, seg_tangent_vector};
use super::{PlineVertex, Polyline};
use crate::index::{StaticSpatialIndex, StaticSpatialIndexBuilder};
use crate::math::{dist_squared, Vector2};
use crate::traits::Real;
use std::collections::BTreeMap;

/// Boolean operation to apply to a pair of closed polylines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BooleanOp {
    /// Union of the two polylines.
    Union,
    /// Intersection of the two polylines.
    Intersect,
    /// First polyline excluding the second (A - B).
    Exclude,
    /// Exclusive OR of the two polylines.
    Xor,
}

/// Options for [Polyline::boolean_opt].
#[derive(Debug)]
pub struct PlineBooleanOptions<'a, T>
where
    T: Real,
{
    /// Spatial index of the first polyline's segment bounding boxes. Computed
    /// internally if `None`.
    pub pline1_aabb_index: Option<&'a StaticSpatialIndex<T>>,
    /// Fuzzy comparison epsilon used for determining if two positions are equal.
    pub pos_equal_eps: T,
    /// Fuzzy comparison epsilon used when stitching slices together.
    pub slice_join_eps: T,
}

impl<T> PlineBooleanOptions<'_, T>
where
    T: Real,
{
    pub fn new() -> Self {
        Self {
            pline1_aabb_index: None,
            pos_equal_eps: T::from(1e-5).unwrap(),
            slice_join_eps: T::from(1e-4).unwrap(),
        }
    }
}

impl<T> Default for PlineBooleanOptions<'_, T>
where
    T: Real,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Result of performing a boolean operation between two polylines.
#[derive(Debug, Clone, Default)]
pub struct BooleanResult<T>
where
    T: Real,
{
    /// Positive remaining space polylines.
    pub pos_plines: Vec<Polyline<T>>,
    /// Negative (subtracted island) space polylines.
    pub neg_plines: Vec<Polyline<T>>,
}

impl<T> BooleanResult<T>
where
    T: Real,
{
    pub fn empty() -> Self {
        Self {
            pos_plines: Vec::new(),
            neg_plines: Vec::new(),
        }
    }

    pub fn from_whole_plines<I>(pos_plines: I, neg_plines: I) -> Self
    where
        I: IntoIterator<Item = Polyline<T>>,
    {
        Self {
            pos_plines: pos_plines.into_iter().collect(),
            neg_plines: neg_plines.into_iter().collect(),
        }
    }
}

/// Tests if two closed polylines are coincident: same vertex sequence within
/// `pos_equal_eps` up to rotation and/or reversal of direction.
fn closed_plines_coincident<T>(pline1: &Polyline<T>, pline2: &Polyline<T>, pos_equal_eps: T) -> bool
where
    T: Real,
{
    let n = pline1.len();
    if n != pline2.len() || n < 2 {
        return false;
    }

    let same_with_rotation = |a: &Polyline<T>, b: &Polyline<T>| -> bool {
        'rotation: for r in 0..n {
            if !a[0].pos().fuzzy_eq_eps(b[r].pos(), pos_equal_eps) {
                continue;
            }

            for i in 0..n {
                let av = a[i];
                let bv = b[(i + r) % n];
                if !av.pos().fuzzy_eq_eps(bv.pos(), pos_equal_eps)
                    || !av.bulge.fuzzy_eq_eps(bv.bulge, pos_equal_eps)
                {
                    continue 'rotation;
                }
            }
            return true;
        }
        false
    };

    if same_with_rotation(pline1, pline2) {
        return true;
    }

    let mut reversed = pline2.clone();
    reversed.invert_direction_mut();
    same_with_rotation(pline1, &reversed)
}

/// Classification of a slice relative to the other polyline, sampled at the
/// slice's first segment midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SliceClass {
    Inside,
    Outside,
    /// Midpoint lies on the other polyline's boundary and the local traversal
    /// directions agree.
    OnBoundarySameDir,
    /// Midpoint lies on the other polyline's boundary and the local traversal
    /// directions oppose.
    OnBoundaryOppositeDir,
}

fn classify_seg_against<T>(
    v1: PlineVertex<T>,
    v2: PlineVertex<T>,
    other: &Polyline<T>,
    boundary_eps: T,
) -> SliceClass
where
    T: Real,
{
    let midpoint = seg_midpoint(v1, v2);
    // other is closed with at least 2 vertexes so closest_point always exists
    let cp = other.closest_point(midpoint).unwrap();
    if cp.distance < boundary_eps {
        let this_tangent = seg_tangent_vector(v1, v2, midpoint);
        let i = cp.seg_start_index;
        let j = other.next_wrapping_index(i);
        let other_tangent = seg_tangent_vector(other[i], other[j], cp.seg_point);
        if this_tangent.dot(other_tangent) > T::zero() {
            SliceClass::OnBoundarySameDir
        } else {
            SliceClass::OnBoundaryOppositeDir
        }
    } else if other.winding_number(midpoint) != 0 {
        SliceClass::Inside
    } else {
        SliceClass::Outside
    }
}

/// Open polyline slice tagged with the polyline it came from for stitch
/// ordering.
#[derive(Debug, Clone)]
struct BooleanSlice<T> {
    from_pline1: bool,
    pline: Polyline<T>,
}

/// Slice `pline` at the intersect sites in `intersects_lookup` keeping only
/// the slices passing `keep_pred` (called with the slice's first segment).
fn collect_slices<T, F>(
    pline: &Polyline<T>,
    intersects_lookup: &BTreeMap<usize, Vec<Vector2<T>>>,
    from_pline1: bool,
    keep_pred: &mut F,
    pos_equal_eps: T,
    output: &mut Vec<BooleanSlice<T>>,
) where
    T: Real,
    F: FnMut(PlineVertex<T>, PlineVertex<T>) -> bool,
{
    for (&start_index, intr_list) in intersects_lookup.iter() {
        let next_index = pline.next_wrapping_index(start_index);
        let start_vertex = pline[start_index];
        let end_vertex = pline[next_index];

        if intr_list.len() != 1 {
            // build all the slices between the N intersects on this segment
            // (N > 1), skipping the first slice (processed at the end)
            let first_split =
                seg_split_at_point(start_vertex, end_vertex, intr_list[0], pos_equal_eps);
            let mut prev_vertex = first_split.split_vertex;
            for i in 1..intr_list.len() {
                let split = seg_split_at_point(prev_vertex, end_vertex, intr_list[i], pos_equal_eps);
                prev_vertex = split.split_vertex;
                if split
                    .updated_start
                    .pos()
                    .fuzzy_eq_eps(split.split_vertex.pos(), pos_equal_eps)
                {
                    // collapsed slice
                    continue;
                }

                if !keep_pred(split.updated_start, split.split_vertex) {
                    continue;
                }

                let mut slice = Polyline::new();
                slice.add_vertex(split.updated_start);
                slice.add_vertex(split.split_vertex.with_bulge(T::zero()));
                output.push(BooleanSlice {
                    from_pline1,
                    pline: slice,
                });
            }
        }

        // build the slice going from the last intersect on this segment to the
        // next intersect site found along the polyline
        let slice_start_point = *intr_list.last().unwrap();
        let split = seg_split_at_point(start_vertex, end_vertex, slice_start_point, pos_equal_eps);
        let mut slice = Polyline::new();
        slice.add_vertex(split.split_vertex);

        let mut index = next_index;
        let mut loop_count = 0;
        let max_loop_count = pline.len();
        loop {
            if loop_count > max_loop_count {
                // degenerate intersect sites, give up on this slice
                debug_assert!(false, "loop count exceeded visiting polyline vertexes");
                slice.clear();
                break;
            }
            loop_count += 1;

            let current_vertex = pline[index];
            slice.add_or_replace_vertex(current_vertex, pos_equal_eps);

            if let Some(next_intr_list) = intersects_lookup.get(&index) {
                // intersect site on this segment ends the slice
                let intersect_point = next_intr_list[0];
                let next_i = pline.next_wrapping_index(index);
                let split = seg_split_at_point(
                    current_vertex,
                    pline[next_i],
                    intersect_point,
                    pos_equal_eps,
                );

                *slice.last_mut().unwrap() = split.updated_start;
                slice.add_or_replace_vertex(
                    PlineVertex::from_vector2(intersect_point, T::zero()),
                    pos_equal_eps,
                );
                break;
            }

            index = pline.next_wrapping_index(index);
        }

        if slice.len() < 2 {
            continue;
        }

        if keep_pred(slice[0], slice[1]) {
            output.push(BooleanSlice {
                from_pline1,
                pline: slice,
            });
        }
    }
}

/// Stitch kept slices end to end into closed polylines, preferring to
/// alternate between the two source polylines when multiple slices share an
/// endpoint. Chains that fail to close are discarded (degenerate input).
fn stitch_boolean_slices<T>(
    slices: Vec<BooleanSlice<T>>,
    slice_join_eps: T,
    pos_equal_eps: T,
) -> Vec<Polyline<T>>
where
    T: Real,
{
    let mut result = Vec::new();
    if slices.is_empty() {
        return result;
    }

    let spatial_index = {
        let mut builder = StaticSpatialIndexBuilder::new(slices.len());
        for slice in slices.iter() {
            let sp = slice.pline[0].pos();
            builder.add(
                sp.x - slice_join_eps,
                sp.y - slice_join_eps,
                sp.x + slice_join_eps,
                sp.y + slice_join_eps,
            );
        }
        builder.build().expect("all slice boxes added")
    };

    let mut visited = vec![false; slices.len()];
    let mut query_results = Vec::new();
    let mut query_stack = Vec::with_capacity(8);

    for i in 0..slices.len() {
        if visited[i] {
            continue;
        }
        visited[i] = true;

        let beginning_idx = i;
        let mut current_pline = slices[i].pline.clone();
        let mut current_from_pline1 = slices[i].from_pline1;

        let mut loop_count = 0;
        let max_loop_count = slices.len();
        loop {
            if loop_count > max_loop_count {
                // degenerate join graph, discard the chain
                debug_assert!(false, "loop count exceeded stitching slices");
                current_pline.clear();
                break;
            }
            loop_count += 1;

            let ep = current_pline.last().unwrap().pos();
            query_results.clear();
            let mut query_visitor = |idx: usize| -> bool {
                if idx == beginning_idx || !visited[idx] {
                    query_results.push(idx);
                }
                true
            };
            spatial_index.visit_query_with_stack(
                ep.x - slice_join_eps,
                ep.y - slice_join_eps,
                ep.x + slice_join_eps,
                ep.y + slice_join_eps,
                &mut query_visitor,
                &mut query_stack,
            );

            if query_results.is_empty() {
                // failed to close the chain, discard it
                current_pline.clear();
                break;
            }

            // prefer stitching onto a slice from the other polyline
            let selected = query_results
                .iter()
                .copied()
                .find(|&idx| slices[idx].from_pline1 != current_from_pline1)
                .unwrap_or(query_results[0]);

            if selected == beginning_idx {
                break;
            }

            visited[selected] = true;
            current_pline.remove_last();
            for &v in slices[selected].pline.iter() {
                current_pline.add_or_replace_vertex(v, pos_equal_eps);
            }
            current_from_pline1 = slices[selected].from_pline1;
        }

        if current_pline.len() < 2 {
            continue;
        }

        // close the chain (start should connect back with the end)
        if !current_pline[0]
            .pos()
            .fuzzy_eq_eps(current_pline.last().unwrap().pos(), slice_join_eps)
        {
            continue;
        }

        current_pline.set_is_closed(true);
        let cleaned = current_pline.remove_repeat_pos(pos_equal_eps);
        if cleaned.len() >= 3 {
            result.push(cleaned);
        }
    }

    result
}

struct IntersectLookups<T> {
    lookup1: BTreeMap<usize, Vec<Vector2<T>>>,
    lookup2: BTreeMap<usize, Vec<Vector2<T>>>,
}

fn build_intersect_lookups<T>(
    pline1: &Polyline<T>,
    pline2: &Polyline<T>,
    pline1_spatial_index: &StaticSpatialIndex<T>,
    pos_equal_eps: T,
) -> IntersectLookups<T>
where
    T: Real,
{
    let intrs = find_intersects(pline1, pline2, pline1_spatial_index, pos_equal_eps);

    let mut lookup1 = BTreeMap::<usize, Vec<Vector2<T>>>::new();
    let mut lookup2 = BTreeMap::<usize, Vec<Vector2<T>>>::new();

    for intr in intrs.basic_intersects.iter() {
        lookup1
            .entry(intr.start_index1)
            .or_default()
            .push(intr.point);
        lookup2
            .entry(intr.start_index2)
            .or_default()
            .push(intr.point);
    }

    // overlapping runs contribute their two end points as slice sites on both
    // polylines
    for intr in intrs.overlapping_intersects.iter() {
        for point in [intr.point1, intr.point2] {
            lookup1.entry(intr.start_index1).or_default().push(point);
            lookup2.entry(intr.start_index2).or_default().push(point);
        }
    }

    // sort sites by distance from their segment start vertex
    let sort_lookup = |lookup: &mut BTreeMap<usize, Vec<Vector2<T>>>, pline: &Polyline<T>| {
        for (&i, intr_list) in lookup.iter_mut() {
            let start_pos = pline[i].pos();
            intr_list.sort_unstable_by(|&si1, &si2| {
                let dist1 = dist_squared(si1, start_pos);
                let dist2 = dist_squared(si2, start_pos);
                dist1.partial_cmp(&dist2).unwrap()
            });
            intr_list.dedup_by(|a, b| a.fuzzy_eq_eps(*b, pos_equal_eps));
        }
    };

    sort_lookup(&mut lookup1, pline1);
    sort_lookup(&mut lookup2, pline2);

    IntersectLookups { lookup1, lookup2 }
}

/// Collect and stitch the slices for `first - second` (the Exclude operation,
/// also used twice to form Xor).
fn exclude_slices_stitched<T>(
    first: &Polyline<T>,
    second: &Polyline<T>,
    first_is_pline1: bool,
    lookup_first: &BTreeMap<usize, Vec<Vector2<T>>>,
    lookup_second: &BTreeMap<usize, Vec<Vector2<T>>>,
    pos_equal_eps: T,
    slice_join_eps: T,
) -> Vec<Polyline<T>>
where
    T: Real,
{
    use SliceClass::*;
    let mut slices = Vec::new();

    let mut first_pred = |v1: PlineVertex<T>, v2: PlineVertex<T>| {
        matches!(
            classify_seg_against(v1, v2, second, pos_equal_eps),
            Outside | OnBoundaryOppositeDir
        )
    };
    collect_slices(
        first,
        lookup_first,
        first_is_pline1,
        &mut first_pred,
        pos_equal_eps,
        &mut slices,
    );

    let second_slices_start = slices.len();
    let mut second_pred = |v1: PlineVertex<T>, v2: PlineVertex<T>| {
        classify_seg_against(v1, v2, first, pos_equal_eps) == Inside
    };
    collect_slices(
        second,
        lookup_second,
        !first_is_pline1,
        &mut second_pred,
        pos_equal_eps,
        &mut slices,
    );

    // the subtracted polyline's kept slices are traversed in reverse so all
    // slices stitch head to tail (only needed when the input orientations
    // match)
    if first.orientation() == second.orientation() {
        for slice in slices[second_slices_start..].iter_mut() {
            slice.pline.invert_direction_mut();
        }
    }

    stitch_boolean_slices(slices, slice_join_eps, pos_equal_eps)
}

impl<T> Polyline<T>
where
    T: Real,
{
    /// Perform a boolean `operation` between this polyline and another using
    /// default options.
    ///
    /// Both polylines must be closed (open input is a programming error and
    /// panics). An empty result is a legitimate outcome, not an error.
    ///
    /// # Examples
    /// ```
    /// # use plinekit::polyline::*;
    /// # use plinekit::pline_closed;
    /// # use plinekit::traits::*;
    /// let rectangle = pline_closed![
    ///     (-1.0, -2.0, 0.0),
    ///     (3.0, -2.0, 0.0),
    ///     (3.0, 2.0, 0.0),
    ///     (-1.0, 2.0, 0.0),
    /// ];
    /// let circle = pline_closed![(0.0, 0.0, 1.0), (2.0, 0.0, 1.0)];
    /// // circle is inside the rectangle so excluding it produces the
    /// // rectangle with the circle as a negative space island
    /// let result = rectangle.boolean(&circle, BooleanOp::Exclude);
    /// assert_eq!(result.pos_plines.len(), 1);
    /// assert_eq!(result.neg_plines.len(), 1);
    /// assert!(result.pos_plines[0].area().fuzzy_eq(rectangle.area()));
    /// assert!(result.neg_plines[0].area().fuzzy_eq(circle.area()));
    /// ```
    #[inline]
    pub fn boolean(&self, other: &Polyline<T>, operation: BooleanOp) -> BooleanResult<T> {
        self.boolean_opt(other, operation, &Default::default())
    }

    /// Perform a boolean `operation` between this polyline and another with
    /// the options given.
    #[inline]
    pub fn boolean_opt(
        &self,
        other: &Polyline<T>,
        operation: BooleanOp,
        options: &PlineBooleanOptions<T>,
    ) -> BooleanResult<T> {
        polyline_boolean(self, other, operation, options)
    }
}

/// Perform the boolean `operation` between two closed polylines.
pub(crate) fn polyline_boolean<T>(
    pline1: &Polyline<T>,
    pline2: &Polyline<T>,
    operation: BooleanOp,
    options: &PlineBooleanOptions<T>,
) -> BooleanResult<T>
where
    T: Real,
{
    assert!(
        pline1.is_closed() && pline2.is_closed(),
        "boolean operations require closed polylines"
    );

    if pline1.len() < 2 || pline2.len() < 2 {
        return BooleanResult::empty();
    }

    let pos_equal_eps = options.pos_equal_eps;
    let slice_join_eps = options.slice_join_eps;

    if closed_plines_coincident(pline1, pline2, pos_equal_eps) {
        // Union/Intersect of a polyline with itself is itself, Exclude/Xor is
        // nothing
        return match operation {
            BooleanOp::Union | BooleanOp::Intersect => {
                BooleanResult::from_whole_plines(vec![pline1.clone()], Vec::new())
            }
            BooleanOp::Exclude | BooleanOp::Xor => BooleanResult::empty(),
        };
    }

    let constructed_index;
    let pline1_spatial_index = if let Some(x) = options.pline1_aabb_index {
        x
    } else {
        constructed_index = pline1.create_approx_spatial_index();
        &constructed_index
    };

    let lookups = build_intersect_lookups(pline1, pline2, pline1_spatial_index, pos_equal_eps);

    if lookups.lookup1.is_empty() {
        // no intersects, dispatch on containment/disjoint by winding sampling
        let pline1_in_pline2 = pline2.winding_number(pline1[0].pos()) != 0;
        let pline2_in_pline1 = pline1.winding_number(pline2[0].pos()) != 0;

        return match operation {
            BooleanOp::Union => {
                if pline1_in_pline2 {
                    BooleanResult::from_whole_plines(vec![pline2.clone()], Vec::new())
                } else if pline2_in_pline1 {
                    BooleanResult::from_whole_plines(vec![pline1.clone()], Vec::new())
                } else {
                    BooleanResult::from_whole_plines(
                        vec![pline1.clone(), pline2.clone()],
                        Vec::new(),
                    )
                }
            }
            BooleanOp::Intersect => {
                if pline1_in_pline2 {
                    BooleanResult::from_whole_plines(vec![pline1.clone()], Vec::new())
                } else if pline2_in_pline1 {
                    BooleanResult::from_whole_plines(vec![pline2.clone()], Vec::new())
                } else {
                    BooleanResult::empty()
                }
            }
            BooleanOp::Exclude => {
                if pline1_in_pline2 {
                    // everything is subtracted
                    BooleanResult::empty()
                } else if pline2_in_pline1 {
                    // negative space island inside pline1
                    BooleanResult::from_whole_plines(vec![pline1.clone()], vec![pline2.clone()])
                } else {
                    BooleanResult::from_whole_plines(vec![pline1.clone()], Vec::new())
                }
            }
            BooleanOp::Xor => {
                if pline1_in_pline2 {
                    BooleanResult::from_whole_plines(vec![pline2.clone()], vec![pline1.clone()])
                } else if pline2_in_pline1 {
                    BooleanResult::from_whole_plines(vec![pline1.clone()], vec![pline2.clone()])
                } else {
                    BooleanResult::from_whole_plines(
                        vec![pline1.clone(), pline2.clone()],
                        Vec::new(),
                    )
                }
            }
        };
    }

    use SliceClass::*;
    match operation {
        BooleanOp::Union => {
            let mut slices = Vec::new();
            let mut pred1 = |v1: PlineVertex<T>, v2: PlineVertex<T>| {
                matches!(
                    classify_seg_against(v1, v2, pline2, pos_equal_eps),
                    Outside | OnBoundarySameDir
                )
            };
            collect_slices(
                pline1,
                &lookups.lookup1,
                true,
                &mut pred1,
                pos_equal_eps,
                &mut slices,
            );

            let pline2_slices_start = slices.len();
            let mut pred2 = |v1: PlineVertex<T>, v2: PlineVertex<T>| {
                classify_seg_against(v1, v2, pline1, pos_equal_eps) == Outside
            };
            collect_slices(
                pline2,
                &lookups.lookup2,
                false,
                &mut pred2,
                pos_equal_eps,
                &mut slices,
            );

            if pline1.orientation() != pline2.orientation() {
                for slice in slices[pline2_slices_start..].iter_mut() {
                    slice.pline.invert_direction_mut();
                }
            }

            let stitched = stitch_boolean_slices(slices, slice_join_eps, pos_equal_eps);

            // loops that inverted orientation relative to pline1 enclose
            // negative space
            let pline1_orientation = pline1.orientation();
            let mut result = BooleanResult::empty();
            for pline in stitched {
                if pline.orientation() == pline1_orientation {
                    result.pos_plines.push(pline);
                } else {
                    result.neg_plines.push(pline);
                }
            }
            result
        }
        BooleanOp::Intersect => {
            let mut slices = Vec::new();
            let mut pred1 = |v1: PlineVertex<T>, v2: PlineVertex<T>| {
                matches!(
                    classify_seg_against(v1, v2, pline2, pos_equal_eps),
                    Inside | OnBoundarySameDir
                )
            };
            collect_slices(
                pline1,
                &lookups.lookup1,
                true,
                &mut pred1,
                pos_equal_eps,
                &mut slices,
            );

            let pline2_slices_start = slices.len();
            let mut pred2 = |v1: PlineVertex<T>, v2: PlineVertex<T>| {
                classify_seg_against(v1, v2, pline1, pos_equal_eps) == Inside
            };
            collect_slices(
                pline2,
                &lookups.lookup2,
                false,
                &mut pred2,
                pos_equal_eps,
                &mut slices,
            );

            if pline1.orientation() != pline2.orientation() {
                for slice in slices[pline2_slices_start..].iter_mut() {
                    slice.pline.invert_direction_mut();
                }
            }

            BooleanResult {
                pos_plines: stitch_boolean_slices(slices, slice_join_eps, pos_equal_eps),
                neg_plines: Vec::new(),
            }
        }
        BooleanOp::Exclude => BooleanResult {
            pos_plines: exclude_slices_stitched(
                pline1,
                pline2,
                true,
                &lookups.lookup1,
                &lookups.lookup2,
                pos_equal_eps,
                slice_join_eps,
            ),
            neg_plines: Vec::new(),
        },
        BooleanOp::Xor => {
            // A xor B = (A - B) union (B - A)
            let mut pos_plines = exclude_slices_stitched(
                pline1,
                pline2,
                true,
                &lookups.lookup1,
                &lookups.lookup2,
                pos_equal_eps,
                slice_join_eps,
            );
            pos_plines.extend(exclude_slices_stitched(
                pline2,
                pline1,
                false,
                &lookups.lookup2,
                &lookups.lookup1,
                pos_equal_eps,
                slice_join_eps,
            ));

            BooleanResult {
                pos_plines,
                neg_plines: Vec::new(),
            }
        }
    }
}
