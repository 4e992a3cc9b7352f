use plinekit::assert_fuzzy_eq;
use plinekit::math::Vector2;
use plinekit::polyline::{
    seg_arc_radius_and_center, seg_bounding_box, seg_closest_point, seg_fast_approx_bounding_box,
    seg_length, seg_midpoint, seg_split_at_point, seg_tangent_vector, PlineVertex,
};
use plinekit::traits::FuzzyEq;
use std::f64::consts::PI;

#[test]
fn arc_radius_and_center_half_circle() {
    // half circle from (0,0) to (1,0) counter clockwise
    let v1 = PlineVertex::new(0.0, 0.0, 1.0);
    let v2 = PlineVertex::new(1.0, 0.0, 0.0);
    let (radius, center) = seg_arc_radius_and_center(v1, v2);
    assert_fuzzy_eq!(radius, 0.5);
    assert!(center.fuzzy_eq(Vector2::new(0.5, 0.0)));
}

#[test]
fn arc_radius_and_center_equidistant_from_end_points() {
    let cases = [
        (PlineVertex::new(0.0, 0.0, 0.3), PlineVertex::new(2.0, 1.0, 0.0)),
        (PlineVertex::new(-1.0, 2.0, -0.8), PlineVertex::new(3.0, -2.0, 0.0)),
        (PlineVertex::new(5.0, 5.0, 1.0), PlineVertex::new(6.0, 5.0, 0.0)),
        (PlineVertex::new(0.0, 0.0, -1.0), PlineVertex::new(0.0, 4.0, 0.0)),
    ];

    for &(v1, v2) in cases.iter() {
        let (radius, center) = seg_arc_radius_and_center(v1, v2);
        assert!(radius > 0.0);
        let dist1 = (v1.pos() - center).length();
        let dist2 = (v2.pos() - center).length();
        assert_fuzzy_eq!(dist1, radius, 1e-8);
        assert_fuzzy_eq!(dist2, radius, 1e-8);
    }
}

#[test]
fn split_half_circle_at_quarter_point() {
    let v1 = PlineVertex::new(0.0, 0.0, 1.0);
    let v2 = PlineVertex::new(1.0, 0.0, 0.0);
    let point = Vector2::new(0.5, -0.5);
    let result = seg_split_at_point(v1, v2, point, 1e-5);
    let quarter_circle_bulge = (PI / 8.0).tan();
    assert!(result
        .updated_start
        .fuzzy_eq(PlineVertex::new(0.0, 0.0, quarter_circle_bulge)));
    assert!(result
        .split_vertex
        .fuzzy_eq(PlineVertex::new(0.5, -0.5, quarter_circle_bulge)));
}

#[test]
fn split_reproduces_original_segment() {
    // concatenating the two sub-segments preserves end points, total length,
    // and orientation
    let cases = [
        (
            PlineVertex::new(0.0, 0.0, 1.0),
            PlineVertex::new(1.0, 0.0, 0.0),
            Vector2::new(0.5, -0.5),
        ),
        (
            PlineVertex::new(2.0, 2.0, -0.45),
            PlineVertex::new(5.0, 1.0, 0.0),
            seg_midpoint(
                PlineVertex::new(2.0, 2.0, -0.45),
                PlineVertex::new(5.0, 1.0, 0.0),
            ),
        ),
        (
            PlineVertex::new(0.0, 0.0, 0.0),
            PlineVertex::new(4.0, 4.0, 0.0),
            Vector2::new(1.0, 1.0),
        ),
    ];

    for &(v1, v2, point) in cases.iter() {
        let split = seg_split_at_point(v1, v2, point, 1e-5);
        assert!(split.updated_start.pos().fuzzy_eq(v1.pos()));
        assert!(split.split_vertex.pos().fuzzy_eq(point));

        let length1 = seg_length(split.updated_start, split.split_vertex);
        let length2 = seg_length(split.split_vertex, v2);
        assert_fuzzy_eq!(length1 + length2, seg_length(v1, v2), 1e-8);

        // sub-segment bulges preserve the original sweep direction
        if !v1.bulge_is_zero() {
            assert_eq!(split.updated_start.bulge_is_neg(), v1.bulge_is_neg());
            assert_eq!(split.split_vertex.bulge_is_neg(), v1.bulge_is_neg());
        }
    }
}

#[test]
fn tangent_vector_on_arc() {
    // counter clockwise half circle from (2,2) to (4,2) bowed down through (3,1)
    let v1 = PlineVertex::new(2.0, 2.0, 1.0);
    let v2 = PlineVertex::new(4.0, 2.0, 0.0);
    let midpoint = Vector2::new(3.0, 1.0);
    assert!(seg_tangent_vector(v1, v2, midpoint)
        .normalize()
        .fuzzy_eq(Vector2::new(1.0, 0.0)));
    assert!(seg_tangent_vector(v1, v2, v1.pos())
        .normalize()
        .fuzzy_eq(Vector2::new(0.0, -1.0)));
    assert!(seg_tangent_vector(v1, v2, v2.pos())
        .normalize()
        .fuzzy_eq(Vector2::new(0.0, 1.0)));
}

#[test]
fn tangent_vector_on_line() {
    let v1 = PlineVertex::new(0.0, 0.0, 0.0);
    let v2 = PlineVertex::new(3.0, 4.0, 0.0);
    assert!(seg_tangent_vector(v1, v2, Vector2::new(1.5, 2.0))
        .normalize()
        .fuzzy_eq(Vector2::new(0.6, 0.8)));
}

#[test]
fn length_of_segments() {
    // line segment
    let v1 = PlineVertex::new(2.0, 2.0, 0.0);
    let v2 = PlineVertex::new(4.0, 4.0, 0.0);
    assert_fuzzy_eq!(seg_length(v1, v2), 2.0 * 2.0f64.sqrt());

    // half circle arc with radius 1
    let v1 = PlineVertex::new(2.0, 2.0, 1.0);
    let v2 = PlineVertex::new(4.0, 2.0, 0.0);
    assert_fuzzy_eq!(seg_length(v1, v2), PI);

    // coincident vertexes
    let v1 = PlineVertex::new(2.0, 2.0, 1.0);
    let v2 = PlineVertex::new(2.0, 2.0, 0.0);
    assert_fuzzy_eq!(seg_length(v1, v2), 0.0);
}

#[test]
fn midpoint_of_segments() {
    let v1 = PlineVertex::new(2.0, 2.0, 0.0);
    let v2 = PlineVertex::new(4.0, 4.0, 0.0);
    assert!(seg_midpoint(v1, v2).fuzzy_eq(Vector2::new(3.0, 3.0)));

    let v1 = PlineVertex::new(2.0, 2.0, 1.0);
    let v2 = PlineVertex::new(4.0, 2.0, 0.0);
    assert!(seg_midpoint(v1, v2).fuzzy_eq(Vector2::new(3.0, 1.0)));
}

#[test]
fn closest_point_on_segments() {
    // line segment clamps to end points
    let v1 = PlineVertex::new(0.0, 0.0, 0.0);
    let v2 = PlineVertex::new(2.0, 0.0, 0.0);
    assert!(seg_closest_point(v1, v2, Vector2::new(1.0, 1.0)).fuzzy_eq(Vector2::new(1.0, 0.0)));
    assert!(seg_closest_point(v1, v2, Vector2::new(-1.0, 1.0)).fuzzy_eq(v1.pos()));

    // arc projects onto the arc within the sweep
    let v1 = PlineVertex::new(2.0, 2.0, 1.0);
    let v2 = PlineVertex::new(4.0, 2.0, 0.0);
    assert!(seg_closest_point(v1, v2, Vector2::new(3.0, 0.0)).fuzzy_eq(Vector2::new(3.0, 1.0)));
    assert!(seg_closest_point(v1, v2, Vector2::new(3.0, 1.2)).fuzzy_eq(Vector2::new(3.0, 1.0)));
    // outside the sweep the nearest end point wins
    assert!(seg_closest_point(v1, v2, Vector2::new(1.8, 2.5)).fuzzy_eq(v1.pos()));
    // point at arc center returns a point on the arc
    let cp = seg_closest_point(v1, v2, Vector2::new(3.0, 2.0));
    assert!((cp - Vector2::new(3.0, 2.0)).length().fuzzy_eq(1.0));
}

#[test]
fn bounding_boxes() {
    // line segment
    let v1 = PlineVertex::new(3.0, 1.0, 0.0);
    let v2 = PlineVertex::new(0.0, 4.0, 0.0);
    let bb = seg_bounding_box(v1, v2);
    assert_fuzzy_eq!(bb.min_x, 0.0);
    assert_fuzzy_eq!(bb.min_y, 1.0);
    assert_fuzzy_eq!(bb.max_x, 3.0);
    assert_fuzzy_eq!(bb.max_y, 4.0);

    // half circle arc from (0,0) to (2,0) bowed down through (1,-1)
    let v1 = PlineVertex::new(0.0, 0.0, 1.0);
    let v2 = PlineVertex::new(2.0, 0.0, 0.0);
    let bb = seg_bounding_box(v1, v2);
    assert_fuzzy_eq!(bb.min_x, 0.0);
    assert_fuzzy_eq!(bb.min_y, -1.0);
    assert_fuzzy_eq!(bb.max_x, 2.0);
    assert_fuzzy_eq!(bb.max_y, 0.0);

    // fast approx box always contains the exact box
    let cases = [
        (PlineVertex::new(0.0, 0.0, 1.0), PlineVertex::new(2.0, 0.0, 0.0)),
        (PlineVertex::new(1.0, 1.0, -0.6), PlineVertex::new(4.0, 3.0, 0.0)),
        (PlineVertex::new(-2.0, 5.0, 0.2), PlineVertex::new(3.0, -1.0, 0.0)),
    ];
    for &(v1, v2) in cases.iter() {
        let exact = seg_bounding_box(v1, v2);
        let approx = seg_fast_approx_bounding_box(v1, v2);
        assert!(approx.min_x <= exact.min_x + 1e-8);
        assert!(approx.min_y <= exact.min_y + 1e-8);
        assert!(approx.max_x >= exact.max_x - 1e-8);
        assert!(approx.max_y >= exact.max_y - 1e-8);
    }
}
