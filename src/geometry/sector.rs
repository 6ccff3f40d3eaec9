use super::{Point, is_angle_in_range, screen_angle};

/// Annular wedge around `center`.
///
/// `min_angle..=max_angle` is taken modulo one turn, so a sector may start
/// below zero or end past 2π.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub center: Point,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_angle: f32,
    pub max_angle: f32,
}

impl Sector {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        if !(x.is_finite() && y.is_finite()) {
            return false;
        }
        let d = self.center.distance_to(Point::new(x, y));
        if d < self.min_radius || d > self.max_radius {
            return false;
        }
        let angle = screen_angle(self.center.x, self.center.y, x, y);
        is_angle_in_range(angle, self.min_angle, self.max_angle)
    }

    pub fn middle_angle(&self) -> f32 {
        (self.min_angle + self.max_angle) * 0.5
    }
}
