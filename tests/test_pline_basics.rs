use plinekit::assert_fuzzy_eq;
use plinekit::math::Vector2;
use plinekit::polyline::{PlineOrientation, PlineVertex, Polyline};
use plinekit::{pline_closed, pline_open};
use std::f64::consts::PI;

#[test]
fn vertex_bulge_classification() {
    assert!(PlineVertex::new(0.0, 0.0, 0.0).bulge_is_zero());
    assert!(PlineVertex::new(0.0, 0.0, 1e-9).bulge_is_zero());
    assert!(!PlineVertex::new(0.0, 0.0, 1e-7).bulge_is_zero());
    assert!(PlineVertex::new(0.0, 0.0, 0.5).bulge_is_pos());
    assert!(PlineVertex::new(0.0, 0.0, -0.5).bulge_is_neg());
}

#[test]
fn unit_square_queries() {
    let square = pline_closed![
        (0.0, 0.0, 0.0),
        (1.0, 0.0, 0.0),
        (1.0, 1.0, 0.0),
        (0.0, 1.0, 0.0),
    ];

    assert_fuzzy_eq!(square.area(), 1.0);
    assert_fuzzy_eq!(square.path_length(), 4.0);
    assert_eq!(square.orientation(), PlineOrientation::CounterClockwise);

    let extents = square.extents();
    assert_fuzzy_eq!(extents.min_x, 0.0);
    assert_fuzzy_eq!(extents.min_y, 0.0);
    assert_fuzzy_eq!(extents.max_x, 1.0);
    assert_fuzzy_eq!(extents.max_y, 1.0);

    assert_eq!(square.winding_number(Vector2::new(0.5, 0.5)), 1);
    assert_eq!(square.winding_number(Vector2::new(2.0, 2.0)), 0);
}

#[test]
fn circle_queries() {
    // counter clockwise circle with radius 5 centered at (5, 0)
    let circle = pline_closed![(0.0, 0.0, 1.0), (10.0, 0.0, 1.0)];

    assert_fuzzy_eq!(circle.area(), 25.0 * PI);
    assert_fuzzy_eq!(circle.path_length(), 10.0 * PI);

    let extents = circle.extents();
    assert_fuzzy_eq!(extents.min_x, 0.0);
    assert_fuzzy_eq!(extents.min_y, -5.0);
    assert_fuzzy_eq!(extents.max_x, 10.0);
    assert_fuzzy_eq!(extents.max_y, 5.0);

    assert_eq!(circle.winding_number(Vector2::new(5.0, 0.0)), 1);
    assert_eq!(circle.winding_number(Vector2::new(12.0, 0.0)), 0);

    let mut cw_circle = circle.clone();
    cw_circle.invert_direction_mut();
    assert_fuzzy_eq!(cw_circle.area(), -25.0 * PI);
    assert_eq!(cw_circle.winding_number(Vector2::new(5.0, 0.0)), -1);
    assert_eq!(cw_circle.orientation(), PlineOrientation::Clockwise);
}

#[test]
fn quarter_arc_queries() {
    // clockwise quarter arc from (1, 0) to (0, -1) centered at the origin
    let arc = pline_open![(1.0, 0.0, -(PI / 8.0).tan()), (0.0, -1.0, 0.0)];

    assert_fuzzy_eq!(arc.path_length(), PI / 2.0);
    // open polylines have zero area and winding number
    assert_fuzzy_eq!(arc.area(), 0.0);
    assert_eq!(arc.winding_number(Vector2::new(0.5, -0.5)), 0);
    assert_eq!(arc.orientation(), PlineOrientation::Open);

    let extents = arc.extents();
    assert_fuzzy_eq!(extents.min_x, 0.0);
    assert_fuzzy_eq!(extents.min_y, -1.0);
    assert_fuzzy_eq!(extents.max_x, 1.0);
    assert_fuzzy_eq!(extents.max_y, 0.0);
}

#[test]
fn empty_polyline_behaviors() {
    let mut empty = Polyline::<f64>::new();
    assert_fuzzy_eq!(empty.area(), 0.0);
    assert_fuzzy_eq!(empty.path_length(), 0.0);
    assert_eq!(empty.winding_number(Vector2::new(0.0, 0.0)), 0);
    assert!(empty.extents().is_empty());
    assert!(empty.closest_point(Vector2::new(1.0, 1.0)).is_none());

    // transforms are no-ops
    empty.scale_mut(2.0);
    empty.translate_mut(1.0, 1.0);
    empty.invert_direction_mut();
    assert!(empty.is_empty());

    // arc to line conversion preserves emptiness and closedness
    let empty_closed = Polyline::<f64>::new_closed();
    let converted = empty_closed.arcs_to_approx_lines(0.01).unwrap();
    assert!(converted.is_empty());
    assert!(converted.is_closed());
}

#[test]
fn single_vertex_polyline_behaviors() {
    let mut pline = Polyline::new();
    pline.add(2.0, 3.0, 0.5);

    assert_fuzzy_eq!(pline.area(), 0.0);
    assert_fuzzy_eq!(pline.path_length(), 0.0);

    // extents collapse to the point
    let extents = pline.extents();
    assert_fuzzy_eq!(extents.min_x, 2.0);
    assert_fuzzy_eq!(extents.min_y, 3.0);
    assert_fuzzy_eq!(extents.max_x, 2.0);
    assert_fuzzy_eq!(extents.max_y, 3.0);

    let cp = pline.closest_point(Vector2::new(2.0, 4.0)).unwrap();
    assert_eq!(cp.seg_start_index, 0);
    assert!(cp.seg_point.fuzzy_eq(Vector2::new(2.0, 3.0)));
    assert_fuzzy_eq!(cp.distance, 1.0);
}

#[test]
fn closest_point_queries() {
    let square = pline_closed![
        (0.0, 0.0, 0.0),
        (4.0, 0.0, 0.0),
        (4.0, 4.0, 0.0),
        (0.0, 4.0, 0.0),
    ];

    // closest to bottom edge
    let cp = square.closest_point(Vector2::new(2.0, -1.0)).unwrap();
    assert_eq!(cp.seg_start_index, 0);
    assert!(cp.seg_point.fuzzy_eq(Vector2::new(2.0, 0.0)));
    assert_fuzzy_eq!(cp.distance, 1.0);

    // closest to right edge from inside
    let cp = square.closest_point(Vector2::new(3.5, 2.0)).unwrap();
    assert_eq!(cp.seg_start_index, 1);
    assert!(cp.seg_point.fuzzy_eq(Vector2::new(4.0, 2.0)));
    assert_fuzzy_eq!(cp.distance, 0.5);
}

#[test]
fn scale_and_translate_invariants() {
    let circle = pline_closed![(0.0, 0.0, 1.0), (10.0, 0.0, 1.0)];
    let area = circle.area();
    let path_length = circle.path_length();

    let mut scaled = circle.clone();
    scaled.scale_mut(2.0);
    assert_fuzzy_eq!(scaled.area(), 4.0 * area, 1e-8);
    assert_fuzzy_eq!(scaled.path_length(), 2.0 * path_length, 1e-8);

    // negative scale is a point reflection, area scales by s^2 and length by |s|
    let mut neg_scaled = circle.clone();
    neg_scaled.scale_mut(-1.5);
    assert_fuzzy_eq!(neg_scaled.area(), 2.25 * area, 1e-8);
    assert_fuzzy_eq!(neg_scaled.path_length(), 1.5 * path_length, 1e-8);

    let mut translated = circle.clone();
    translated.translate_mut(-13.0, 27.0);
    assert_fuzzy_eq!(translated.area(), area, 1e-8);
    assert_fuzzy_eq!(translated.path_length(), path_length, 1e-8);

    let extents = translated.extents();
    assert_fuzzy_eq!(extents.min_x, -13.0);
    assert_fuzzy_eq!(extents.min_y, 22.0);
}

#[test]
fn invert_direction_round_trip() {
    let pline = pline_closed![
        (0.0, 0.0, 0.5),
        (4.0, 0.0, 0.0),
        (4.0, 4.0, -0.3),
        (0.0, 4.0, 0.0),
    ];

    let mut inverted = pline.clone();
    inverted.invert_direction_mut();
    assert_fuzzy_eq!(inverted.area(), -pline.area(), 1e-8);
    assert_fuzzy_eq!(inverted.path_length(), pline.path_length(), 1e-8);

    inverted.invert_direction_mut();
    assert!(inverted.fuzzy_eq(&pline));

    // open polyline round trip
    let open = pline_open![(1.0, 1.0, 0.4), (3.0, 2.0, -0.2), (5.0, 0.0, 0.0)];
    let mut open_inverted = open.clone();
    open_inverted.invert_direction_mut();
    assert!(open_inverted[0].pos().fuzzy_eq(Vector2::new(5.0, 0.0)));
    assert_fuzzy_eq!(open_inverted[0].bulge, 0.2);
    assert_fuzzy_eq!(open_inverted.last().unwrap().bulge, 0.0);
    open_inverted.invert_direction_mut();
    assert!(open_inverted.fuzzy_eq(&open));
}

#[test]
fn remove_repeat_pos_is_idempotent() {
    let mut pline = Polyline::new_closed();
    pline.add(2.0, 2.0, 0.5);
    pline.add(2.0, 2.0, 1.0);
    pline.add(3.0, 3.0, 1.0);
    pline.add(3.0, 3.0, 0.5);
    // trailing vertex on top of the first
    pline.add(2.0, 2.0, 0.0);

    let pruned = pline.remove_repeat_pos(1e-5);
    assert_eq!(pruned.len(), 2);
    assert!(pruned[0].fuzzy_eq(PlineVertex::new(2.0, 2.0, 1.0)));
    assert!(pruned[1].fuzzy_eq(PlineVertex::new(3.0, 3.0, 0.5)));

    let pruned_again = pruned.remove_repeat_pos(1e-5);
    assert!(pruned_again.fuzzy_eq(&pruned));
}

#[test]
fn arcs_to_approx_lines_converges_to_arc_length() {
    // circle with radius 5, circumference 10 PI
    let circle = pline_closed![(0.0, 0.0, 1.0), (10.0, 0.0, 1.0)];
    let true_length = circle.path_length();

    let mut prev_error = f64::INFINITY;
    for &max_error in &[0.1, 0.01, 0.001] {
        let lines = circle.arcs_to_approx_lines(max_error).unwrap();
        assert!(lines.is_closed());
        assert!(lines.iter().all(|v| v.bulge_is_zero()));
        // circumscribed chords always measure shorter than the arc
        let error = true_length - lines.path_length();
        assert!(error > 0.0);
        assert!(error < prev_error);
        prev_error = error;
    }

    assert!(prev_error < 0.01);
}

#[test]
fn add_or_replace_vertex() {
    let mut pline = Polyline::new();
    pline.add(0.0, 0.0, 0.0);
    // same position, bulge replaced
    pline.add_or_replace(0.0, 0.0, 0.5, 1e-5);
    assert_eq!(pline.len(), 1);
    assert_fuzzy_eq!(pline[0].bulge, 0.5);

    pline.add_or_replace(1.0, 0.0, 0.0, 1e-5);
    assert_eq!(pline.len(), 2);
}
