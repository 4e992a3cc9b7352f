//! Math functions for working with angles, 2D vectors, and the circle/line
//! intersection primitives the polyline algorithms are built from.
mod base;
mod circle_circle;
mod line_circle;
mod line_line;
mod vector2;

pub use base::*;
pub use circle_circle::{circle_circle_intr, CircleCircleIntr};
pub use line_circle::{line_circle_intr, LineCircleIntr};
pub use line_line::{line_line_intr, LineLineIntr};
pub use vector2::Vector2;
