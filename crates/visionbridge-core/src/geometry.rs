// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Small computational-geometry helpers.

use crate::types::{Point, Segment};

/// Strict orientation test: true when `a -> b -> c` turns counter-clockwise
/// in a y-up frame (clockwise on screen, where y grows downwards).
///
/// Products are computed in `i128` so full-range `i32` coordinates cannot
/// overflow.
pub fn ccw(a: Point, b: Point, c: Point) -> bool {
    let lhs = (c.y as i128 - a.y as i128) * (b.x as i128 - a.x as i128);
    let rhs = (b.y as i128 - a.y as i128) * (c.x as i128 - a.x as i128);
    lhs > rhs
}

/// Whether two segments properly cross each other.
///
/// Collinear and endpoint-touching configurations are not special-cased;
/// they fall out of the strict `ccw` comparisons and usually report `false`.
pub fn segments_cross(first: &Segment, second: &Segment) -> bool {
    let (p1, p2) = (first.start, first.end);
    let (p3, p4) = (second.start, second.end);

    ccw(p1, p3, p4) != ccw(p2, p3, p4) && ccw(p1, p2, p3) != ccw(p1, p2, p4)
}
