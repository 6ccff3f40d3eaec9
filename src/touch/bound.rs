use crate::geometry::{Point, Sector};

/// Input region of a dial, in overlay space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TouchBound {
    Circle {
        center: Point,
        radius: f32,
    },
    Sector(Sector),
    #[default]
    Empty,
}

impl TouchBound {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        match self {
            TouchBound::Circle { center, radius } => {
                x.is_finite() && y.is_finite() && center.distance_to(Point::new(x, y)) <= *radius
            }
            TouchBound::Sector(sector) => sector.contains(x, y),
            TouchBound::Empty => false,
        }
    }
}
