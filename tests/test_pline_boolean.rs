use plinekit::assert_fuzzy_eq;
use plinekit::pline_closed;
use plinekit::polyline::{BooleanOp, Polyline};
use std::f64::consts::PI;

fn total_area(plines: &[Polyline<f64>]) -> f64 {
    plines.iter().map(|p| p.area().abs()).sum()
}

fn overlapping_squares() -> (Polyline<f64>, Polyline<f64>) {
    let a = pline_closed![
        (0.0, 0.0, 0.0),
        (2.0, 0.0, 0.0),
        (2.0, 2.0, 0.0),
        (0.0, 2.0, 0.0),
    ];
    let b = pline_closed![
        (1.0, 1.0, 0.0),
        (3.0, 1.0, 0.0),
        (3.0, 3.0, 0.0),
        (1.0, 3.0, 0.0),
    ];
    (a, b)
}

fn overlapping_circles() -> (Polyline<f64>, Polyline<f64>) {
    // unit circles centered at (0, 0) and (1, 0)
    let a = pline_closed![(-1.0, 0.0, 1.0), (1.0, 0.0, 1.0)];
    let b = pline_closed![(0.0, 0.0, 1.0), (2.0, 0.0, 1.0)];
    (a, b)
}

/// Area of the lens formed by two unit circles with centers distance 1 apart.
fn unit_circle_lens_area() -> f64 {
    2.0 * (0.5f64).acos() - 0.5 * (4.0f64 - 1.0).sqrt()
}

#[test]
fn combine_with_self_identities() {
    let square = pline_closed![
        (0.0, 0.0, 0.0),
        (2.0, 0.0, 0.0),
        (2.0, 2.0, 0.0),
        (0.0, 2.0, 0.0),
    ];

    for &op in [BooleanOp::Union, BooleanOp::Intersect].iter() {
        let result = square.boolean(&square, op);
        assert_eq!(result.pos_plines.len(), 1);
        assert!(result.neg_plines.is_empty());
        assert_fuzzy_eq!(result.pos_plines[0].area(), square.area());
    }

    for &op in [BooleanOp::Exclude, BooleanOp::Xor].iter() {
        let result = square.boolean(&square, op);
        assert!(result.pos_plines.is_empty());
        assert!(result.neg_plines.is_empty());
    }
}

#[test]
fn combine_with_rotated_and_reversed_self() {
    let square = pline_closed![
        (0.0, 0.0, 0.0),
        (2.0, 0.0, 0.0),
        (2.0, 2.0, 0.0),
        (0.0, 2.0, 0.0),
    ];

    // same square with the vertex sequence rotated
    let rotated = pline_closed![
        (2.0, 2.0, 0.0),
        (0.0, 2.0, 0.0),
        (0.0, 0.0, 0.0),
        (2.0, 0.0, 0.0),
    ];

    // same square traversed in the opposite direction
    let mut reversed = square.clone();
    reversed.invert_direction_mut();

    for other in [&rotated, &reversed] {
        let union = square.boolean(other, BooleanOp::Union);
        assert_eq!(union.pos_plines.len(), 1);
        assert_fuzzy_eq!(union.pos_plines[0].area(), square.area());

        let xor = square.boolean(other, BooleanOp::Xor);
        assert!(xor.pos_plines.is_empty());
        assert!(xor.neg_plines.is_empty());
    }
}

#[test]
fn disjoint_polylines() {
    let a = pline_closed![(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.0), (0.0, 1.0, 0.0)];
    let b = pline_closed![(5.0, 5.0, 0.0), (6.0, 5.0, 0.0), (6.0, 6.0, 0.0), (5.0, 6.0, 0.0)];

    let union = a.boolean(&b, BooleanOp::Union);
    assert_eq!(union.pos_plines.len(), 2);
    assert!(union.neg_plines.is_empty());
    assert_fuzzy_eq!(total_area(&union.pos_plines), 2.0);

    let intersect = a.boolean(&b, BooleanOp::Intersect);
    assert!(intersect.pos_plines.is_empty());

    let exclude = a.boolean(&b, BooleanOp::Exclude);
    assert_eq!(exclude.pos_plines.len(), 1);
    assert_fuzzy_eq!(exclude.pos_plines[0].area(), 1.0);

    let xor = a.boolean(&b, BooleanOp::Xor);
    assert_eq!(xor.pos_plines.len(), 2);
}

#[test]
fn contained_polylines() {
    let rectangle = pline_closed![
        (-3.0, -3.0, 0.0),
        (3.0, -3.0, 0.0),
        (3.0, 3.0, 0.0),
        (-3.0, 3.0, 0.0),
    ];
    let circle = pline_closed![(-1.0, 0.0, 1.0), (1.0, 0.0, 1.0)];

    let union = rectangle.boolean(&circle, BooleanOp::Union);
    assert_eq!(union.pos_plines.len(), 1);
    assert_fuzzy_eq!(union.pos_plines[0].area(), 36.0);

    let intersect = rectangle.boolean(&circle, BooleanOp::Intersect);
    assert_eq!(intersect.pos_plines.len(), 1);
    assert_fuzzy_eq!(intersect.pos_plines[0].area(), PI);

    // subtracting the contained circle produces a negative space island
    let exclude = rectangle.boolean(&circle, BooleanOp::Exclude);
    assert_eq!(exclude.pos_plines.len(), 1);
    assert_eq!(exclude.neg_plines.len(), 1);
    assert_fuzzy_eq!(exclude.pos_plines[0].area(), 36.0);
    assert_fuzzy_eq!(exclude.neg_plines[0].area(), PI);

    // subtracting the container from the contained leaves nothing
    let exclude = circle.boolean(&rectangle, BooleanOp::Exclude);
    assert!(exclude.pos_plines.is_empty());
    assert!(exclude.neg_plines.is_empty());

    let xor = rectangle.boolean(&circle, BooleanOp::Xor);
    assert_eq!(xor.pos_plines.len(), 1);
    assert_eq!(xor.neg_plines.len(), 1);
}

#[test]
fn overlapping_squares_all_ops() {
    let (a, b) = overlapping_squares();

    let union = a.boolean(&b, BooleanOp::Union);
    assert_eq!(union.pos_plines.len(), 1);
    assert!(union.neg_plines.is_empty());
    assert_fuzzy_eq!(union.pos_plines[0].area(), 7.0, 1e-5);

    let intersect = a.boolean(&b, BooleanOp::Intersect);
    assert_eq!(intersect.pos_plines.len(), 1);
    assert_fuzzy_eq!(intersect.pos_plines[0].area(), 1.0, 1e-5);

    let exclude = a.boolean(&b, BooleanOp::Exclude);
    assert_eq!(exclude.pos_plines.len(), 1);
    assert_fuzzy_eq!(exclude.pos_plines[0].area(), 3.0, 1e-5);

    let exclude_rev = b.boolean(&a, BooleanOp::Exclude);
    assert_eq!(exclude_rev.pos_plines.len(), 1);
    assert_fuzzy_eq!(exclude_rev.pos_plines[0].area(), 3.0, 1e-5);

    let xor = a.boolean(&b, BooleanOp::Xor);
    assert_fuzzy_eq!(total_area(&xor.pos_plines), 6.0, 1e-5);
}

#[test]
fn overlapping_circles_all_ops() {
    let (a, b) = overlapping_circles();
    let lens_area = unit_circle_lens_area();

    let union = a.boolean(&b, BooleanOp::Union);
    assert_eq!(union.pos_plines.len(), 1);
    assert_fuzzy_eq!(union.pos_plines[0].area(), 2.0 * PI - lens_area, 1e-5);

    let intersect = a.boolean(&b, BooleanOp::Intersect);
    assert_eq!(intersect.pos_plines.len(), 1);
    assert_fuzzy_eq!(intersect.pos_plines[0].area(), lens_area, 1e-5);

    let exclude = a.boolean(&b, BooleanOp::Exclude);
    assert_eq!(exclude.pos_plines.len(), 1);
    assert_fuzzy_eq!(exclude.pos_plines[0].area(), PI - lens_area, 1e-5);

    let xor = a.boolean(&b, BooleanOp::Xor);
    assert_fuzzy_eq!(total_area(&xor.pos_plines), 2.0 * (PI - lens_area), 1e-5);
}

#[test]
fn union_is_commutative_by_area() {
    let (a, b) = overlapping_squares();
    let ab = a.boolean(&b, BooleanOp::Union);
    let ba = b.boolean(&a, BooleanOp::Union);
    assert_fuzzy_eq!(
        total_area(&ab.pos_plines),
        total_area(&ba.pos_plines),
        1e-5
    );

    let (a, b) = overlapping_circles();
    let ab = a.boolean(&b, BooleanOp::Union);
    let ba = b.boolean(&a, BooleanOp::Union);
    assert_fuzzy_eq!(
        total_area(&ab.pos_plines),
        total_area(&ba.pos_plines),
        1e-5
    );
}

#[test]
fn opposing_direction_inputs() {
    // second polyline wound clockwise still combines correctly
    let (a, mut b) = overlapping_squares();
    b.invert_direction_mut();

    let union = a.boolean(&b, BooleanOp::Union);
    assert_eq!(union.pos_plines.len(), 1);
    assert_fuzzy_eq!(union.pos_plines[0].area().abs(), 7.0, 1e-5);

    let intersect = a.boolean(&b, BooleanOp::Intersect);
    assert_eq!(intersect.pos_plines.len(), 1);
    assert_fuzzy_eq!(intersect.pos_plines[0].area().abs(), 1.0, 1e-5);

    let exclude = a.boolean(&b, BooleanOp::Exclude);
    assert_eq!(exclude.pos_plines.len(), 1);
    assert_fuzzy_eq!(exclude.pos_plines[0].area().abs(), 3.0, 1e-5);
}

#[test]
fn circle_cut_by_rectangle() {
    // rectangle covering the right half of the circle
    let circle = pline_closed![(-2.0, 0.0, 1.0), (2.0, 0.0, 1.0)];
    let rectangle = pline_closed![
        (0.0, -3.0, 0.0),
        (3.0, -3.0, 0.0),
        (3.0, 3.0, 0.0),
        (0.0, 3.0, 0.0),
    ];

    // circle minus rectangle leaves the left half disc
    let exclude = circle.boolean(&rectangle, BooleanOp::Exclude);
    assert_eq!(exclude.pos_plines.len(), 1);
    assert_fuzzy_eq!(exclude.pos_plines[0].area(), 2.0 * PI, 1e-5);

    // intersect keeps the right half disc
    let intersect = circle.boolean(&rectangle, BooleanOp::Intersect);
    assert_eq!(intersect.pos_plines.len(), 1);
    assert_fuzzy_eq!(intersect.pos_plines[0].area(), 2.0 * PI, 1e-5);
}

#[test]
fn adjacent_squares_sharing_an_edge() {
    let a = pline_closed![(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.0), (0.0, 1.0, 0.0)];
    let b = pline_closed![(1.0, 0.0, 0.0), (2.0, 0.0, 0.0), (2.0, 1.0, 0.0), (1.0, 1.0, 0.0)];

    // the shared edge is interior to the union and dropped
    let union = a.boolean(&b, BooleanOp::Union);
    assert_eq!(union.pos_plines.len(), 1);
    assert!(union.neg_plines.is_empty());
    assert_fuzzy_eq!(union.pos_plines[0].area(), 2.0, 1e-5);

    // subtracting the neighbor leaves the square untouched (shared edge kept)
    let exclude = a.boolean(&b, BooleanOp::Exclude);
    assert_eq!(exclude.pos_plines.len(), 1);
    assert_fuzzy_eq!(exclude.pos_plines[0].area(), 1.0, 1e-5);

    // intersection is the zero area shared edge, reported as empty
    let intersect = a.boolean(&b, BooleanOp::Intersect);
    assert!(intersect.pos_plines.is_empty());
}

#[test]
#[should_panic(expected = "closed")]
fn boolean_on_open_polyline_panics() {
    let mut open = Polyline::new();
    open.add(0.0, 0.0, 0.0);
    open.add(1.0, 0.0, 0.0);
    let closed = pline_closed![(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.0)];
    let _ = open.boolean(&closed, BooleanOp::Union);
}
