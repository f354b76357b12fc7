//! Geometric primitives for the translation pipeline.
//!
//! This module provides the point and box types the pipeline reasons about,
//! plus the overlap algebra (intersection, union, IoU) used to reconcile
//! detections produced independently on overlapping tiles. Boxes are always
//! axis-aligned rectangles stored as an ordered four-corner polygon, matching
//! the persisted JSON form.

use serde::{Deserialize, Serialize};

/// A 2D point with integer pixel coordinates.
///
/// Serializes as a `[x, y]` pair so that a box round-trips through JSON as a
/// flat list of corner pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "[i32; 2]", from = "[i32; 2]")]
pub struct Point {
    /// X-coordinate of the point.
    pub x: i32,
    /// Y-coordinate of the point.
    pub y: i32,
}

impl Point {
    /// Creates a new point with the given coordinates.
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<[i32; 2]> for Point {
    fn from(p: [i32; 2]) -> Self {
        Self { x: p[0], y: p[1] }
    }
}

impl From<Point> for [i32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// An axis-aligned rectangle stored as an ordered four-corner polygon:
/// top-left, top-right, bottom-right, bottom-left.
///
/// Degenerate (zero-area) quads are permitted; they produce an IoU of 0.0
/// against any other quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quad {
    /// The corner points, in top-left, top-right, bottom-right, bottom-left order.
    pub points: [Point; 4],
}

impl Quad {
    /// Creates a quad from scalar rectangle coordinates.
    ///
    /// # Arguments
    ///
    /// * `xmin` - The x-coordinate of the left edge.
    /// * `ymin` - The y-coordinate of the top edge.
    /// * `xmax` - The x-coordinate of the right edge.
    /// * `ymax` - The y-coordinate of the bottom edge.
    pub fn from_rect(xmin: i32, ymin: i32, xmax: i32, ymax: i32) -> Self {
        Self {
            points: [
                Point::new(xmin, ymin),
                Point::new(xmax, ymin),
                Point::new(xmax, ymax),
                Point::new(xmin, ymax),
            ],
        }
    }

    /// Gets the minimum x-coordinate of all corners.
    pub fn x_min(&self) -> i32 {
        self.points.iter().map(|p| p.x).min().unwrap_or(0)
    }

    /// Gets the minimum y-coordinate of all corners.
    pub fn y_min(&self) -> i32 {
        self.points.iter().map(|p| p.y).min().unwrap_or(0)
    }

    /// Gets the maximum x-coordinate of all corners.
    pub fn x_max(&self) -> i32 {
        self.points.iter().map(|p| p.x).max().unwrap_or(0)
    }

    /// Gets the maximum y-coordinate of all corners.
    pub fn y_max(&self) -> i32 {
        self.points.iter().map(|p| p.y).max().unwrap_or(0)
    }

    /// Width of the bounding rectangle.
    pub fn width(&self) -> i32 {
        self.x_max() - self.x_min()
    }

    /// Height of the bounding rectangle.
    pub fn height(&self) -> i32 {
        self.y_max() - self.y_min()
    }

    /// Area of the bounding rectangle.
    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    /// Vertical center of the quad.
    pub fn center_y(&self) -> f32 {
        (self.y_min() + self.y_max()) as f32 / 2.0
    }

    /// Returns a new quad translated by `(dx, dy)`.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::from_rect(
            self.x_min() + dx,
            self.y_min() + dy,
            self.x_max() + dx,
            self.y_max() + dy,
        )
    }

    /// Computes the area of intersection between this quad and another.
    ///
    /// # Returns
    ///
    /// The area of the intersection. Returns 0 if there is no overlap.
    pub fn intersection_area(&self, other: &Quad) -> i64 {
        let inter_xmin = self.x_min().max(other.x_min());
        let inter_ymin = self.y_min().max(other.y_min());
        let inter_xmax = self.x_max().min(other.x_max());
        let inter_ymax = self.y_max().min(other.y_max());

        let inter_width = (inter_xmax - inter_xmin).max(0) as i64;
        let inter_height = (inter_ymax - inter_ymin).max(0) as i64;
        inter_width * inter_height
    }

    /// Computes the 2-D Intersection over Union (IoU) between this quad and another.
    ///
    /// Overlap is required on both axes; detections duplicated across tile
    /// boundaries can be offset diagonally, so a vertical-only overlap test
    /// is not sufficient here.
    ///
    /// # Returns
    ///
    /// The IoU value between 0.0 and 1.0. Returns 0.0 when the union area is
    /// zero (both quads degenerate).
    pub fn iou(&self, other: &Quad) -> f64 {
        let inter_area = self.intersection_area(other);
        let union_area = self.area() + other.area() - inter_area;

        if union_area == 0 {
            return 0.0;
        }

        inter_area as f64 / union_area as f64
    }

    /// Computes the union (minimum enclosing rectangle) of this quad and another.
    pub fn union(&self, other: &Quad) -> Self {
        Self::from_rect(
            self.x_min().min(other.x_min()),
            self.y_min().min(other.y_min()),
            self.x_max().max(other.x_max()),
            self.y_max().max(other.y_max()),
        )
    }
}
