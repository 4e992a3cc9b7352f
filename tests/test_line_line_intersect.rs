use plinekit::math::{line_line_intr, LineLineIntr, Vector2};
use plinekit::traits::FuzzyEq;

const EPS: f64 = 1e-5;

fn v(x: f64, y: f64) -> Vector2<f64> {
    Vector2::new(x, y)
}

#[test]
fn true_intersect_perpendicular() {
    // horizontal line (0,0)->(2,0) vs vertical line (0,0)->(0,2) touch at (0,0)
    let result = line_line_intr(v(0.0, 0.0), v(2.0, 0.0), v(0.0, 0.0), v(0.0, 2.0), EPS);
    match result {
        LineLineIntr::TrueIntersect { seg1_t, seg2_t } => {
            assert!(seg1_t.fuzzy_eq(0.0));
            assert!(seg2_t.fuzzy_eq(0.0));
        }
        _ => panic!("expected true intersect, got {:?}", result),
    }
}

#[test]
fn true_intersect_crossing() {
    let result = line_line_intr(v(0.0, 0.0), v(2.0, 2.0), v(0.0, 2.0), v(2.0, 0.0), EPS);
    match result {
        LineLineIntr::TrueIntersect { seg1_t, seg2_t } => {
            assert!(seg1_t.fuzzy_eq(0.5));
            assert!(seg2_t.fuzzy_eq(0.5));
        }
        _ => panic!("expected true intersect, got {:?}", result),
    }
}

#[test]
fn false_intersect_requires_extension() {
    // lines cross at (3,3) beyond the end of the first segment
    let result = line_line_intr(v(0.0, 0.0), v(1.0, 1.0), v(2.0, 4.0), v(4.0, 2.0), EPS);
    match result {
        LineLineIntr::FalseIntersect { seg1_t, .. } => {
            assert!(seg1_t.fuzzy_eq(3.0));
        }
        _ => panic!("expected false intersect, got {:?}", result),
    }
}

#[test]
fn parallel_not_collinear() {
    let result = line_line_intr(v(0.0, 0.0), v(2.0, 0.0), v(0.0, 1.0), v(2.0, 1.0), EPS);
    assert!(matches!(result, LineLineIntr::NoIntersect));
}

#[test]
fn collinear_not_overlapping() {
    let result = line_line_intr(v(0.0, 0.0), v(1.0, 0.0), v(2.0, 0.0), v(3.0, 0.0), EPS);
    assert!(matches!(result, LineLineIntr::NoIntersect));
}

#[test]
fn collinear_overlapping() {
    let result = line_line_intr(v(0.0, 0.0), v(2.0, 0.0), v(1.0, 0.0), v(3.0, 0.0), EPS);
    match result {
        LineLineIntr::Overlapping { seg2_t0, seg2_t1 } => {
            // overlap from (1,0) to (2,0) in the second segment's parameter
            assert!(seg2_t0.fuzzy_eq(0.0));
            assert!(seg2_t1.fuzzy_eq(0.5));
        }
        _ => panic!("expected overlapping, got {:?}", result),
    }
}

#[test]
fn collinear_end_to_end_is_single_point() {
    let result = line_line_intr(v(0.0, 0.0), v(1.0, 0.0), v(1.0, 0.0), v(2.0, 0.0), EPS);
    match result {
        LineLineIntr::TrueIntersect { seg1_t, seg2_t } => {
            assert!(seg1_t.fuzzy_eq(1.0));
            assert!(seg2_t.fuzzy_eq(0.0));
        }
        _ => panic!("expected true intersect, got {:?}", result),
    }
}

#[test]
fn point_degenerate_segments() {
    // both segments points on top of each other
    let result = line_line_intr(v(1.0, 1.0), v(1.0, 1.0), v(1.0, 1.0), v(1.0, 1.0), EPS);
    assert!(matches!(result, LineLineIntr::TrueIntersect { .. }));

    // both segments points and distinct
    let result = line_line_intr(v(1.0, 1.0), v(1.0, 1.0), v(2.0, 2.0), v(2.0, 2.0), EPS);
    assert!(matches!(result, LineLineIntr::NoIntersect));

    // zero length segment lying on the other segment is a true intersect,
    // never treated as overlapping
    let result = line_line_intr(v(1.0, 0.0), v(1.0, 0.0), v(0.0, 0.0), v(2.0, 0.0), EPS);
    match result {
        LineLineIntr::TrueIntersect { seg2_t, .. } => {
            assert!(seg2_t.fuzzy_eq(0.5));
        }
        _ => panic!("expected true intersect, got {:?}", result),
    }

    // zero length segment off of the other segment
    let result = line_line_intr(v(1.0, 1.0), v(1.0, 1.0), v(0.0, 0.0), v(2.0, 0.0), EPS);
    assert!(matches!(result, LineLineIntr::NoIntersect));
}
