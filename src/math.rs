/// World-space math primitives for the sector simulation
///
/// Everything in the sector works in floating-point world units
/// (32 units = one tile). This module provides the two types every
/// entity carries - a position vector and an axis-aligned bounding
/// rectangle - plus the overlap predicate used by the collision
/// resolver.
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};

/// A 2D position or movement in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
}

impl Vector {
    pub const fn new(x: f32, y: f32) -> Self {
        Vector { x, y }
    }

    pub const fn zero() -> Self {
        Vector { x: 0.0, y: 0.0 }
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, other: Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, other: Vector) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, other: Vector) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y)
    }
}

/// Axis-aligned bounding rectangle.
///
/// Every interactive entity keeps two of these: `base` (the current
/// frame) and `previous_base` (last frame), which the collision
/// resolver compares to classify downward motion.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rectangle {
            x,
            y,
            width,
            height,
        }
    }

    pub fn position(&self) -> Vector {
        Vector::new(self.x, self.y)
    }

    /// Y coordinate of the bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Y coordinate of the vertical midpoint, used by the squish
    /// tie-break rule.
    pub fn mid_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// Axis-aligned overlap test.
///
/// Rectangles that merely touch along an edge (sharing exactly one
/// coordinate line) do NOT collide; all comparisons are strict.
pub fn rect_collision(a: &Rectangle, b: &Rectangle) -> bool {
    a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
}

/// Overlap test with `a` shifted by `(off_x, off_y)` before testing.
///
/// The collision resolver uses this with a zero offset for the
/// enemy-versus-player pass; non-zero offsets let callers test a
/// slightly displaced hitbox without copying the rectangle.
pub fn rect_collision_offset(a: &Rectangle, b: &Rectangle, off_x: f32, off_y: f32) -> bool {
    let shifted = Rectangle::new(a.x + off_x, a.y + off_y, a.width, a.height);
    rect_collision(&shifted, b)
}
