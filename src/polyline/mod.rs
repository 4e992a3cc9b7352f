//! Polyline types and operations: the [Polyline] container, segment geometry
//! functions, segment intersects, queries, transforms, parallel offsetting,
//! and boolean operations.
mod boolean;
pub(crate) mod intersects;
mod offset;
mod pline;
mod seg;
mod seg_intersect;
mod vertex;

pub use boolean::{BooleanOp, BooleanResult, PlineBooleanOptions};
pub use offset::PlineOffsetOptions;
pub use pline::{
    ClosestPointResult, PlineOrientation, Polyline, SegmentIndexIter, SegmentIter,
};
pub use seg::{
    seg_arc_radius_and_center, seg_bounding_box, seg_closest_point, seg_fast_approx_bounding_box,
    seg_length, seg_midpoint, seg_split_at_point, seg_tangent_vector, SplitResult,
};
pub use seg_intersect::{pline_seg_intr, PlineSegIntr};
pub use vertex::PlineVertex;
