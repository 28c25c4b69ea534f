//! Axis-aligned geometry for actors and tiles
//!
//! Screen space: x grows to the right, y grows downward. A box is described by
//! its top-left corner and its size.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A sample point on an actor's bounding box
pub type Point = Vec2;

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Point, b: Point) -> f32 {
    a.distance(b)
}

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    /// Top-left corner
    pub pos: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Center point of the box
    #[inline]
    pub fn center(&self) -> Point {
        self.pos + self.size / 2.0
    }

    /// Inclusive overlap test; boxes that merely touch on an edge overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() <= other.right()
            && self.right() >= other.left()
            && self.top() <= other.bottom()
            && self.bottom() >= other.top()
    }

    /// Move the box by the given offset
    #[inline]
    pub fn translate(&mut self, delta: Vec2) {
        self.pos += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let d = distance(Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_edges_and_center() {
        let b = Aabb::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(b.left(), 10.0);
        assert_eq!(b.right(), 40.0);
        assert_eq!(b.top(), 20.0);
        assert_eq!(b.bottom(), 60.0);
        assert_eq!(b.center(), Vec2::new(25.0, 40.0));
    }

    #[test]
    fn test_touching_edges_overlap() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::new(10.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&b));

        let c = Aabb::new(10.1, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&c));
    }
}
