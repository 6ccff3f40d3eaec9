//! Placement of the primary dial and the secondary ring.
//!
//! Secondary boxes are first computed in primary-radius units around the
//! origin, then scaled by the final primary radius and moved to the pad
//! center.

use std::f32::consts::FRAC_PI_2;

use crate::config::LayoutConfig;
use crate::geometry::{Point, Rect, Sector, TAU};

/// Secondary dial diameter, in primary radii, at scale 1.
pub const SECONDARY_DIAL_SCALE: f32 = 0.75;

/// Where a secondary dial sits on the ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Socket {
    pub index: u32,
    pub spread: u32,
    pub scale: f32,
    pub distance: f32,
    /// Ring rotation after remapping, radians.
    pub rotation: f32,
}

impl Socket {
    fn dial_size(&self) -> f32 {
        SECONDARY_DIAL_SCALE * self.scale
    }

    fn distance_to_center(&self, dial_angle: f32) -> f32 {
        let dial_size = self.dial_size();
        let min_distance = 1.0 + dial_size / 2.0;
        let half = dial_angle * self.spread as f32 / 2.0;
        let fitted = if half >= FRAC_PI_2 {
            min_distance
        } else {
            (0.5 * dial_size / half.tan()).max(min_distance)
        };
        fitted + self.distance
    }

    /// Box in primary-radius units relative to the pad center.
    pub fn unit_box(&self, sockets: u32) -> Rect {
        let dial_angle = TAU / sockets as f32;
        let distance = self.distance_to_center(dial_angle);
        let position = self.index as f32 + (self.spread as f32 - 1.0) * 0.5;
        let angle = self.rotation + position * dial_angle;

        let center = Point::new(angle.cos() * distance, -angle.sin() * distance);
        Rect::square(center, self.dial_size() / 2.0)
    }

    /// Box used when sizing the pad; wide dials count as the union of the
    /// single sockets they cover.
    pub fn extent(&self, sockets: u32) -> Rect {
        if self.spread <= 1 {
            return self.unit_box(sockets);
        }
        let singles: Vec<Rect> = (self.index..self.index + self.spread)
            .map(|index| {
                Socket {
                    index,
                    spread: 1,
                    ..*self
                }
                .unit_box(sockets)
            })
            .collect();
        Rect::merge(&singles).unwrap_or_else(|| self.unit_box(sockets))
    }

    /// Annular touch region in overlay space for a primary of radius `size`.
    pub fn sector(&self, sockets: u32, center: Point, size: f32) -> Sector {
        let dial_angle = TAU / sockets as f32;
        let distance = self.distance_to_center(dial_angle);
        Sector {
            center,
            min_radius: size,
            max_radius: size * (distance + self.dial_size() / 2.0),
            min_angle: self.rotation + self.index as f32 * dial_angle - dial_angle / 2.0,
            max_angle: self.rotation
                + (self.index + self.spread - 1) as f32 * dial_angle
                + dial_angle / 2.0,
        }
    }
}

/// Result of fitting a pad into its viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PadGeometry {
    pub center: Point,
    /// Primary dial radius in pixels.
    pub size: f32,
    /// Union of every box in primary-radius units.
    pub extent: Rect,
}

impl PadGeometry {
    pub fn primary_box(&self) -> Rect {
        Rect::square(self.center, self.size)
    }

    /// Scales a unit box to overlay space.
    pub fn place(&self, unit: Rect) -> Rect {
        unit.scale(self.size).offset(self.center.x, self.center.y)
    }

    /// Bounding rectangle of the whole pad in overlay space.
    pub fn bounds(&self) -> Rect {
        self.place(self.extent)
    }
}

/// Fits a pad whose boxes span `extent` into `viewport`.
pub fn fit(viewport: Rect, extent: Rect, layout: &LayoutConfig) -> PadGeometry {
    let usable_w = (viewport.width() - 2.0 * layout.margin).max(0.0);
    let usable_h = (viewport.height() - 2.0 * layout.margin).max(0.0);

    let size = (usable_w / extent.width())
        .min(usable_h / extent.height())
        .min(layout.max_primary_radius.unwrap_or(f32::INFINITY))
        .max(0.0);

    let slack_x = ((usable_w - size * extent.width()) / 2.0).max(0.0);
    let slack_y = ((usable_h - size * extent.height()) / 2.0).max(0.0);
    let dx = (layout.gravity_x * slack_x + layout.offset_x).clamp(-slack_x, slack_x);
    let dy = (layout.gravity_y * slack_y + layout.offset_y).clamp(-slack_y, slack_y);

    let base = viewport.center();
    let center = Point::new(
        base.x + dx - (extent.left + extent.right) * size * 0.5,
        base.y + dy - (extent.top + extent.bottom) * size * 0.5,
    );

    PadGeometry {
        center,
        size,
        extent,
    }
}
