// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for VisionBridge.

use serde::{Deserialize, Serialize};

/// A circle found by the detector, in image pixel coordinates.
///
/// Layout is `{ float x; float y; float radius; }`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Circle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }

    /// Convert to the integer record handed across the C boundary.
    ///
    /// Coordinates are truncated toward zero.
    pub fn to_record(&self) -> DetectionRecord {
        DetectionRecord {
            x: self.x as i32,
            y: self.y as i32,
            radius: self.radius as i32,
        }
    }
}

impl From<Circle> for DetectionRecord {
    fn from(circle: Circle) -> Self {
        circle.to_record()
    }
}

/// Fixed-size detection record shared with C callers.
///
/// Layout is `{ int x; int y; int radius; }`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DetectionRecord {
    /// Center x.
    pub x: i32,
    /// Center y.
    pub y: i32,
    pub radius: i32,
}

/// Integer point in image coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Line segment between two integer points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Build a segment from `[x1, y1, x2, y2]`.
    pub const fn from_coords(coords: [i32; 4]) -> Self {
        Self {
            start: Point::new(coords[0], coords[1]),
            end: Point::new(coords[2], coords[3]),
        }
    }
}
