//! Geometry primitives shared by layout and hit-testing.
//!
//! Overlay space follows screen conventions (y grows downward). Angles are
//! measured counter-clockwise from 3 o'clock, so the y axis is flipped
//! whenever a screen vector is converted to an angle.

mod anchor;
mod rect;
mod sector;

pub use anchor::TouchAnchor;
pub(crate) use anchor::nearest;
pub use rect::Rect;
pub use sector::Sector;

use std::f32::consts::PI;

pub const TAU: f32 = 2.0 * PI;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        distance(self.x, self.y, other.x, other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

pub fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    ((x2 - x1) * (x2 - x1) + (y2 - y1) * (y2 - y1)).sqrt()
}

/// Angle of the screen vector going from (x1, y1) to (x2, y2), in [0, 2π).
pub fn screen_angle(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let a = (-(y2 - y1)).atan2(x2 - x1).rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU { 0.0 } else { a }
}

/// True when `x` lies in [min, max] modulo one full turn.
pub fn is_angle_in_range(x: f32, min: f32, max: f32) -> bool {
    let range = min..=max;
    range.contains(&x) || range.contains(&(x - TAU)) || range.contains(&(x + TAU))
}

pub fn lerp(t: f32, a: f32, b: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Point at `angle` and `magnitude` from the origin, y-up.
pub fn polar_to_point(angle: f32, magnitude: f32) -> Point {
    Point::new(magnitude * angle.cos(), magnitude * angle.sin())
}

/// Maps a polar value on the unit disk onto the unit square.
///
/// Uses the elliptical grid mapping, so strength 1.0 reaches the square's
/// boundary along every angle instead of the inscribed circle.
pub fn polar_to_square(angle: f32, strength: f32) -> Point {
    let u = strength * angle.cos();
    let v = strength * angle.sin();
    disk_to_square(u, v)
}

fn disk_to_square(u: f32, v: f32) -> Point {
    let u2 = u * u;
    let v2 = v * v;
    let two_sqrt2 = 2.0 * 2.0f32.sqrt();
    let sub_x = 2.0 + u2 - v2;
    let sub_y = 2.0 - u2 + v2;

    // terms can dip a hair below zero on the boundary diagonals
    let root = |t: f32| t.max(0.0).sqrt();

    let x = 0.5 * root(sub_x + u * two_sqrt2) - 0.5 * root(sub_x - u * two_sqrt2);
    let y = 0.5 * root(sub_y + v * two_sqrt2) - 0.5 * root(sub_y - v * two_sqrt2);

    Point::new(x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0))
}
