use super::Point;

/// Axis-aligned rectangle in overlay space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn square(center: Point, half: f32) -> Self {
        Self::new(
            center.x - half,
            center.y - half,
            center.x + half,
            center.y + half,
        )
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    pub fn scale(&self, factor: f32) -> Self {
        Self::new(
            self.left * factor,
            self.top * factor,
            self.right * factor,
            self.bottom * factor,
        )
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.left + dx, self.top + dy, self.right + dx, self.bottom + dy)
    }

    pub fn scale_centered(&self, factor: f32) -> Self {
        let dw = self.width() * (1.0 - factor) * 0.5;
        let dh = self.height() * (1.0 - factor) * 0.5;
        Self::new(self.left + dw, self.top + dh, self.right - dw, self.bottom - dh)
    }

    pub fn union(&self, other: &Rect) -> Self {
        Self::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Smallest rectangle enclosing every input, or `None` for an empty list.
    pub fn merge<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        rects.into_iter().fold(None, |acc, r| match acc {
            None => Some(*r),
            Some(a) => Some(a.union(r)),
        })
    }

    /// Position of (x, y) relative to this box, 0..1 on each axis inside it.
    ///
    /// Returns `None` for a degenerate box or non-finite input.
    pub fn relative(&self, x: f32, y: f32) -> Option<Point> {
        let (w, h) = (self.width(), self.height());
        if !(w > 0.0 && h > 0.0) {
            return None;
        }
        let p = Point::new((x - self.left) / w, (y - self.top) / h);
        p.is_finite().then_some(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_encloses_all() {
        let a = Rect::new(-1.0, -1.0, 1.0, 1.0);
        let b = Rect::new(0.5, -3.0, 2.0, 0.0);
        let m = Rect::merge([&a, &b]).unwrap();
        assert_eq!(m, Rect::new(-1.0, -3.0, 2.0, 1.0));
        assert!(Rect::merge(std::iter::empty()).is_none());
    }

    #[test]
    fn relative_rejects_degenerate_boxes() {
        let r = Rect::new(10.0, 10.0, 30.0, 50.0);
        let p = r.relative(20.0, 30.0).unwrap();
        assert_eq!(p, Point::new(0.5, 0.5));
        assert!(Rect::default().relative(0.0, 0.0).is_none());
        assert!(r.relative(f32::NAN, 1.0).is_none());
    }

    #[test]
    fn scale_centered_keeps_center() {
        let r = Rect::new(0.0, 0.0, 10.0, 20.0);
        let s = r.scale_centered(0.5);
        assert_eq!(s.center(), r.center());
        assert_eq!(s.width(), 5.0);
        assert_eq!(s.height(), 10.0);
    }
}
