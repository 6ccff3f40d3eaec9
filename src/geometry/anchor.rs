use super::{Point, polar_to_point};

/// Weighted reference point for nearest-anchor classification.
///
/// The effective distance of a point is its euclidean distance divided by
/// `strength`, so stronger anchors capture touches from farther away.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchAnchor {
    pub point: Point,
    pub strength: f32,
    pub ids: Vec<i32>,
}

impl TouchAnchor {
    pub fn from_coordinates(x: f32, y: f32, strength: f32, ids: Vec<i32>) -> Self {
        Self {
            point: Point::new(x, y),
            strength,
            ids,
        }
    }

    pub fn from_polar(angle: f32, length: f32, strength: f32, ids: Vec<i32>) -> Self {
        Self {
            point: polar_to_point(angle, length),
            strength,
            ids,
        }
    }

    pub fn normalized_distance(&self, x: f32, y: f32) -> f32 {
        self.point.distance_to(Point::new(x, y)) / self.strength
    }

    pub fn is_composite(&self) -> bool {
        self.ids.len() > 1
    }
}

/// Index of the anchor with the smallest effective distance; lower index wins ties.
pub(crate) fn nearest<'a>(
    anchors: impl IntoIterator<Item = &'a TouchAnchor>,
    x: f32,
    y: f32,
) -> Option<(usize, f32)> {
    anchors
        .into_iter()
        .enumerate()
        .map(|(i, a)| (i, a.normalized_distance(x, y)))
        .filter(|(_, d)| !d.is_nan())
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_scales_distance() {
        let weak = TouchAnchor::from_coordinates(0.0, 0.0, 1.0, vec![1]);
        let strong = TouchAnchor::from_coordinates(1.0, 0.0, 4.0, vec![2]);
        // 0.4 away from the weak anchor, 0.6 / 4 from the strong one
        let (idx, _) = nearest([&weak, &strong], 0.4, 0.0).unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn ties_go_to_lower_index() {
        let a = TouchAnchor::from_coordinates(-1.0, 0.0, 1.0, vec![1]);
        let b = TouchAnchor::from_coordinates(1.0, 0.0, 1.0, vec![2]);
        assert_eq!(nearest([&a, &b], 0.0, 0.0).unwrap().0, 0);
    }
}
