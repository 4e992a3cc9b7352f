//! Enumeration of intersects within a polyline (self intersects) and between
//! two polylines, accelerated by segment spatial indexes. These drive the
//! offset and boolean pipelines and are not part of the public API.

use super::seg::seg_fast_approx_bounding_box;
use super::seg_intersect::{pline_seg_intr, PlineSegIntr};
use super::{PlineVertex, Polyline};
use crate::index::StaticSpatialIndex;
use crate::math::Vector2;
use crate::traits::Real;
use std::collections::HashSet;

/// A single point intersect between two polyline segments.
#[derive(Debug, Clone, Copy)]
pub struct PlineBasicIntersect<T> {
    /// Start vertex index of the first polyline segment involved.
    pub start_index1: usize,
    /// Start vertex index of the second polyline segment involved.
    pub start_index2: usize,
    /// Point at which the intersect occurs.
    pub point: Vector2<T>,
}

impl<T> PlineBasicIntersect<T> {
    pub fn new(start_index1: usize, start_index2: usize, point: Vector2<T>) -> Self {
        Self {
            start_index1,
            start_index2,
            point,
        }
    }
}

/// An overlapping (collinear lines or coincident arcs) intersect between two
/// polyline segments.
#[derive(Debug, Clone, Copy)]
pub struct PlineOverlappingIntersect<T> {
    /// Start vertex index of the first polyline segment involved.
    pub start_index1: usize,
    /// Start vertex index of the second polyline segment involved.
    pub start_index2: usize,
    /// First end point of the overlap (closest to the second segment start).
    pub point1: Vector2<T>,
    /// Second end point of the overlap (furthest from the second segment start).
    pub point2: Vector2<T>,
}

impl<T> PlineOverlappingIntersect<T> {
    pub fn new(
        start_index1: usize,
        start_index2: usize,
        point1: Vector2<T>,
        point2: Vector2<T>,
    ) -> Self {
        Self {
            start_index1,
            start_index2,
            point1,
            point2,
        }
    }
}

/// Collection of basic and overlapping intersects.
#[derive(Debug, Clone)]
pub struct PlineIntersectsCollection<T> {
    pub basic_intersects: Vec<PlineBasicIntersect<T>>,
    pub overlapping_intersects: Vec<PlineOverlappingIntersect<T>>,
}

impl<T> PlineIntersectsCollection<T> {
    pub fn new_empty() -> Self {
        Self {
            basic_intersects: Vec::new(),
            overlapping_intersects: Vec::new(),
        }
    }
}

/// Visits all local self intersects of the polyline, defined as intersects
/// between two adjacent (vertex sharing) segments.
///
/// Visitors return false to stop visiting.
pub fn visit_local_self_intersects<T, F, G>(
    polyline: &Polyline<T>,
    visitor: &mut F,
    overlap_visitor: &mut G,
    pos_equal_eps: T,
) where
    T: Real,
    F: FnMut(PlineBasicIntersect<T>) -> bool,
    G: FnMut(PlineOverlappingIntersect<T>) -> bool,
{
    let ln = polyline.len();
    if ln < 2 {
        return;
    }

    if ln == 2 {
        if polyline.is_closed() && polyline[0].bulge.fuzzy_eq(-polyline[1].bulge) {
            // closed two vertex polyline that overlaps itself entirely
            overlap_visitor(PlineOverlappingIntersect::new(
                0,
                1,
                polyline[0].pos(),
                polyline[1].pos(),
            ));
        }
        return;
    }

    let mut visit_indexes = |i: usize, j: usize, k: usize| {
        let v1 = polyline[i];
        let v2 = polyline[j];
        let v3 = polyline[k];

        let mut continue_visiting = true;

        // test for intersects between v1->v2 and v2->v3
        if v1.pos().fuzzy_eq_eps(v2.pos(), pos_equal_eps) {
            // singularity
            continue_visiting =
                overlap_visitor(PlineOverlappingIntersect::new(i, j, v1.pos(), v2.pos()));
        } else {
            match pline_seg_intr(v1, v2, v2, v3, pos_equal_eps) {
                PlineSegIntr::NoIntersect => {}
                PlineSegIntr::TangentIntersect { point } | PlineSegIntr::OneIntersect { point } => {
                    if !point.fuzzy_eq_eps(v2.pos(), pos_equal_eps) {
                        continue_visiting = visitor(PlineBasicIntersect::new(i, j, point));
                    }
                }
                PlineSegIntr::TwoIntersects { point1, point2 } => {
                    if !point1.fuzzy_eq_eps(v2.pos(), pos_equal_eps) {
                        continue_visiting = visitor(PlineBasicIntersect::new(i, j, point1));
                    }

                    if continue_visiting && !point2.fuzzy_eq_eps(v2.pos(), pos_equal_eps) {
                        continue_visiting = visitor(PlineBasicIntersect::new(i, j, point2));
                    }
                }
                PlineSegIntr::OverlappingLines { point1, point2 }
                | PlineSegIntr::OverlappingArcs { point1, point2 } => {
                    continue_visiting =
                        overlap_visitor(PlineOverlappingIntersect::new(i, j, point1, point2));
                }
            }
        }

        continue_visiting
    };

    let mut continue_visiting = true;
    for i in 2..ln {
        continue_visiting = visit_indexes(i - 2, i - 1, i);
        if !continue_visiting {
            break;
        }
    }

    if continue_visiting && polyline.is_closed() {
        // wrap around pairs: [(n-2)->(n-1), (n-1)->0] and [(n-1)->0, 0->1]
        if visit_indexes(ln - 2, ln - 1, 0) {
            visit_indexes(ln - 1, 0, 1);
        }
    }
}

/// Visits all global self intersects of the polyline, defined as intersects
/// between two non-adjacent segments, using the `spatial_index` of the
/// polyline's segment bounding boxes.
///
/// Visitors return false to stop visiting.
pub fn visit_global_self_intersects<T, F, G>(
    polyline: &Polyline<T>,
    spatial_index: &StaticSpatialIndex<T>,
    visitor: &mut F,
    overlap_visitor: &mut G,
    pos_equal_eps: T,
) where
    T: Real,
    F: FnMut(PlineBasicIntersect<T>) -> bool,
    G: FnMut(PlineOverlappingIntersect<T>) -> bool,
{
    let ln = polyline.len();

    if ln < 3 {
        return;
    }

    let mut visited_pairs = HashSet::with_capacity(ln);
    let mut query_stack = Vec::with_capacity(8);
    let fuzz = T::fuzzy_epsilon();

    // iterate all segment boxes querying the index against itself
    let mut break_loop = false;
    for (box_pos, aabb) in spatial_index.item_boxes().iter().enumerate() {
        let i = spatial_index.item_index(box_pos);
        let j = polyline.next_wrapping_index(i);
        let v1 = polyline[i];
        let v2 = polyline[j];
        let mut query_visitor = |hit_i: usize| -> bool {
            let hit_j = polyline.next_wrapping_index(hit_i);
            // skip adjacent segments (local self intersects)
            if i == hit_i || i == hit_j || j == hit_i || j == hit_j {
                return true;
            }

            // skip already visited pairs (reversed index order for lookup)
            if visited_pairs.contains(&(hit_i, i)) {
                return true;
            }

            visited_pairs.insert((i, hit_i));

            let u1 = polyline[hit_i];
            let u2 = polyline[hit_j];
            let intr_at_start =
                |intr: Vector2<T>| -> bool { v1.pos().fuzzy_eq(intr) || u1.pos().fuzzy_eq(intr) };

            let mut continue_visiting = true;
            match pline_seg_intr(v1, v2, u1, u2, pos_equal_eps) {
                PlineSegIntr::NoIntersect => {}
                PlineSegIntr::TangentIntersect { point } | PlineSegIntr::OneIntersect { point } => {
                    if !intr_at_start(point) {
                        continue_visiting = visitor(PlineBasicIntersect::new(i, hit_i, point));
                    }
                }
                PlineSegIntr::TwoIntersects { point1, point2 } => {
                    if !intr_at_start(point1) {
                        continue_visiting = visitor(PlineBasicIntersect::new(i, hit_i, point1));
                    }

                    if continue_visiting && !intr_at_start(point2) {
                        continue_visiting = visitor(PlineBasicIntersect::new(i, hit_i, point2));
                    }
                }
                PlineSegIntr::OverlappingLines { point1, point2 }
                | PlineSegIntr::OverlappingArcs { point1, point2 } => {
                    if !intr_at_start(point1) {
                        continue_visiting = overlap_visitor(PlineOverlappingIntersect::new(
                            i, hit_i, point1, point2,
                        ));
                    }
                }
            };
            break_loop = !continue_visiting;
            continue_visiting
        };

        spatial_index.visit_query_with_stack(
            aabb.min_x - fuzz,
            aabb.min_y - fuzz,
            aabb.max_x + fuzz,
            aabb.max_y + fuzz,
            &mut query_visitor,
            &mut query_stack,
        );

        if break_loop {
            break;
        }
    }
}

/// Collects all (local and global) self intersects of the polyline, expanding
/// overlapping intersects into their two end points.
pub fn all_self_intersects_as_basic<T>(
    polyline: &Polyline<T>,
    spatial_index: &StaticSpatialIndex<T>,
    pos_equal_eps: T,
) -> Vec<PlineBasicIntersect<T>>
where
    T: Real,
{
    let mut intrs = Vec::new();
    let mut overlapping_intrs = Vec::new();
    let mut visitor = |intr: PlineBasicIntersect<T>| {
        intrs.push(intr);
        true
    };
    let mut overlap_visitor = |overlapping_intr: PlineOverlappingIntersect<T>| {
        overlapping_intrs.push(overlapping_intr);
        true
    };

    visit_local_self_intersects(polyline, &mut visitor, &mut overlap_visitor, pos_equal_eps);

    visit_global_self_intersects(
        polyline,
        spatial_index,
        &mut visitor,
        &mut overlap_visitor,
        pos_equal_eps,
    );

    intrs.reserve(2 * overlapping_intrs.len());
    for overlapping_intr in &overlapping_intrs {
        intrs.push(PlineBasicIntersect::new(
            overlapping_intr.start_index1,
            overlapping_intr.start_index2,
            overlapping_intr.point1,
        ));
        intrs.push(PlineBasicIntersect::new(
            overlapping_intr.start_index1,
            overlapping_intr.start_index2,
            overlapping_intr.point2,
        ));
    }

    intrs
}

/// Find all intersects between two polylines using `pline1_spatial_index` to
/// accelerate the pairing (index built over `pline1`'s segments).
///
/// For overlapping intersects `point1` is always closest to the start of the
/// second segment. Intersects landing exactly on a segment end point are
/// recorded under the next segment's start index (skipped here and found again
/// by the following segment), unless at the very end of an open polyline.
pub fn find_intersects<T>(
    pline1: &Polyline<T>,
    pline2: &Polyline<T>,
    pline1_spatial_index: &StaticSpatialIndex<T>,
    pos_equal_eps: T,
) -> PlineIntersectsCollection<T>
where
    T: Real,
{
    let mut result = PlineIntersectsCollection::new_empty();
    if pline1.len() < 2 || pline2.len() < 2 {
        return result;
    }

    // track possible duplicate intersects arising from overlapping segments
    // touching segment end points
    let mut possible_duplicates1 = HashSet::<usize>::new();
    let mut possible_duplicates2 = HashSet::<usize>::new();

    // last segment start indexes for open polylines (end point intersects at
    // the very end of an open polyline are not skipped)
    let open1_last_idx = pline1.len() - 2;
    let open2_last_idx = pline2.len() - 2;

    let mut query_stack = Vec::with_capacity(8);
    for (i2, j2) in pline2.iter_segment_indexes() {
        let p2v1 = pline2[i2];
        let p2v2 = pline2[j2];
        let mut query_visitor = |i1: usize| -> bool {
            let j1 = pline1.next_wrapping_index(i1);
            let p1v1 = pline1[i1];
            let p1v2 = pline1[j1];

            let skip_intr_at_end = |intr: Vector2<T>| -> bool {
                (p1v2.pos().fuzzy_eq_eps(intr, pos_equal_eps)
                    && (pline1.is_closed() || i1 != open1_last_idx))
                    || (p2v2.pos().fuzzy_eq_eps(intr, pos_equal_eps)
                        && (pline2.is_closed() || i2 != open2_last_idx))
            };

            match pline_seg_intr(p1v1, p1v2, p2v1, p2v2, pos_equal_eps) {
                PlineSegIntr::NoIntersect => {}
                PlineSegIntr::TangentIntersect { point } | PlineSegIntr::OneIntersect { point } => {
                    if !skip_intr_at_end(point) {
                        result
                            .basic_intersects
                            .push(PlineBasicIntersect::new(i1, i2, point));
                    }
                }
                PlineSegIntr::TwoIntersects { point1, point2 } => {
                    if !skip_intr_at_end(point1) {
                        result
                            .basic_intersects
                            .push(PlineBasicIntersect::new(i1, i2, point1));
                    }
                    if !skip_intr_at_end(point2) {
                        result
                            .basic_intersects
                            .push(PlineBasicIntersect::new(i1, i2, point2));
                    }
                }
                PlineSegIntr::OverlappingLines { point1, point2 }
                | PlineSegIntr::OverlappingArcs { point1, point2 } => {
                    result
                        .overlapping_intersects
                        .push(PlineOverlappingIntersect::new(i1, i2, point1, point2));

                    if p1v2.pos().fuzzy_eq_eps(point1, pos_equal_eps)
                        || p1v2.pos().fuzzy_eq_eps(point2, pos_equal_eps)
                    {
                        possible_duplicates1.insert(pline1.next_wrapping_index(i1));
                    }
                    if p2v2.pos().fuzzy_eq_eps(point1, pos_equal_eps)
                        || p2v2.pos().fuzzy_eq_eps(point2, pos_equal_eps)
                    {
                        possible_duplicates2.insert(pline2.next_wrapping_index(i2));
                    }
                }
            }
            true
        };

        let bb = seg_fast_approx_bounding_box(p2v1, p2v2);
        pline1_spatial_index.visit_query_with_stack(
            bb.min_x - pos_equal_eps,
            bb.min_y - pos_equal_eps,
            bb.max_x + pos_equal_eps,
            bb.max_y + pos_equal_eps,
            &mut query_visitor,
            &mut query_stack,
        );
    }

    if possible_duplicates1.is_empty() && possible_duplicates2.is_empty() {
        return result;
    }

    // drop basic intersects duplicated by an overlapping run touching the
    // start of a segment
    let mut final_basic_intrs = Vec::with_capacity(result.basic_intersects.len());

    for intr in result.basic_intersects.iter() {
        if possible_duplicates1.contains(&intr.start_index1) {
            let start_pt1 = pline1[intr.start_index1].pos();
            if intr.point.fuzzy_eq_eps(start_pt1, pos_equal_eps) {
                continue;
            }
        }

        if possible_duplicates2.contains(&intr.start_index2) {
            let start_pt2 = pline2[intr.start_index2].pos();
            if intr.point.fuzzy_eq_eps(start_pt2, pos_equal_eps) {
                continue;
            }
        }

        final_basic_intrs.push(*intr);
    }

    result.basic_intersects = final_basic_intrs;
    result
}

// used by boolean and offset to test a pair of vertexes against a whole
// polyline through its spatial index
pub fn seg_intersects_polyline<T>(
    v1: PlineVertex<T>,
    v2: PlineVertex<T>,
    polyline: &Polyline<T>,
    polyline_spatial_index: &StaticSpatialIndex<T>,
    pos_equal_eps: T,
    query_stack: &mut Vec<usize>,
) -> bool
where
    T: Real,
{
    let approx_bb = seg_fast_approx_bounding_box(v1, v2);
    let mut has_intersect = false;
    let mut visitor = |i: usize| -> bool {
        let j = polyline.next_wrapping_index(i);
        has_intersect = !matches!(
            pline_seg_intr(v1, v2, polyline[i], polyline[j], pos_equal_eps),
            PlineSegIntr::NoIntersect
        );
        !has_intersect
    };

    let fuzz = T::fuzzy_epsilon();
    polyline_spatial_index.visit_query_with_stack(
        approx_bb.min_x - fuzz,
        approx_bb.min_y - fuzz,
        approx_bb.max_x + fuzz,
        approx_bb.max_y + fuzz,
        &mut visitor,
        query_stack,
    );
    has_intersect
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::FuzzyEq;

    fn local_self_intersects(
        polyline: &Polyline<f64>,
        pos_equal_eps: f64,
    ) -> (
        Vec<PlineBasicIntersect<f64>>,
        Vec<PlineOverlappingIntersect<f64>>,
    ) {
        let mut intrs = Vec::new();
        let mut overlapping_intrs = Vec::new();
        let mut intr_visitor = |intr: PlineBasicIntersect<f64>| {
            intrs.push(intr);
            true
        };
        let mut overlapping_visitor = |overlapping_intr: PlineOverlappingIntersect<f64>| {
            overlapping_intrs.push(overlapping_intr);
            true
        };

        visit_local_self_intersects(
            polyline,
            &mut intr_visitor,
            &mut overlapping_visitor,
            pos_equal_eps,
        );

        (intrs, overlapping_intrs)
    }

    #[test]
    fn local_self_intersect_cases() {
        {
            // empty polyline
            let pline = Polyline::<f64>::new();
            let (intrs, overlapping_intrs) = local_self_intersects(&pline, 1e-5);
            assert_eq!(intrs.len(), 0);
            assert_eq!(overlapping_intrs.len(), 0);
        }

        {
            // circle formed by two arcs has no self intersects
            let mut pline = Polyline::new_closed();
            pline.add(0.0, 0.0, 1.0);
            pline.add(2.0, 0.0, 1.0);
            let (intrs, overlapping_intrs) = local_self_intersects(&pline, 1e-5);
            assert_eq!(intrs.len(), 0);
            assert_eq!(overlapping_intrs.len(), 0);
        }

        {
            // half circle overlapping itself
            let mut pline = Polyline::new_closed();
            pline.add(0.0, 0.0, 1.0);
            pline.add(2.0, 0.0, -1.0);
            let (intrs, overlapping_intrs) = local_self_intersects(&pline, 1e-5);
            assert_eq!(intrs.len(), 0);
            assert_eq!(overlapping_intrs.len(), 1);
            assert_eq!(overlapping_intrs[0].start_index1, 0);
            assert_eq!(overlapping_intrs[0].start_index2, 1);
        }

        {
            // circle with line back to start
            let mut pline = Polyline::new();
            pline.add(0.0, 0.0, 1.0);
            pline.add(2.0, 0.0, 1.0);
            pline.add(0.0, 0.0, 0.0);
            let (intrs, overlapping_intrs) = local_self_intersects(&pline, 1e-5);
            assert_eq!(intrs.len(), 1);
            assert_eq!(overlapping_intrs.len(), 0);
            assert_eq!(intrs[0].start_index1, 0);
            assert_eq!(intrs[0].start_index2, 1);
            assert!(intrs[0].point.fuzzy_eq(pline[2].pos()));
        }
    }

    #[test]
    fn find_intersects_between_circles() {
        // two circles crossing at two points
        let mut pline1: Polyline<f64> = Polyline::new_closed();
        pline1.add(0.0, 0.0, 1.0);
        pline1.add(2.0, 0.0, 1.0);
        let mut pline2 = Polyline::new_closed();
        pline2.add(1.0, 0.0, 1.0);
        pline2.add(3.0, 0.0, 1.0);

        let index = pline1.create_approx_spatial_index();
        let intrs = find_intersects(&pline1, &pline2, &index, 1e-5);
        assert_eq!(intrs.basic_intersects.len(), 2);
        assert_eq!(intrs.overlapping_intersects.len(), 0);
        for intr in intrs.basic_intersects.iter() {
            assert!(intr.point.x.fuzzy_eq(1.5));
            assert!(intr.point.y.abs().fuzzy_eq(3.0f64.sqrt() / 2.0));
        }
    }
}
