use super::button::{PressState, button_accessibility, gesture_event};
use super::{AccessibilityBox, Dial, PressLevel};
use crate::config::ButtonConfig;
use crate::event::{GestureKind, TouchOutcome};
use crate::geometry::{Point, Rect, Sector, lerp};
use crate::touch::FingerPosition;

const MARGIN: f32 = 0.1;

/// Bean-shaped button stretched over several sockets.
///
/// Touch handling matches [`super::ButtonDial`]; the extra state is the
/// sector the bean follows.
#[derive(Debug)]
pub struct DoubleButtonDial {
    config: ButtonConfig,
    state: PressState,
    drawing_box: Rect,
    sector: Option<Sector>,
}

impl DoubleButtonDial {
    pub fn new(config: ButtonConfig) -> Self {
        Self {
            config,
            state: PressState::default(),
            drawing_box: Rect::default(),
            sector: None,
        }
    }

    pub fn level(&self) -> PressLevel {
        self.state.level()
    }

    /// Centers of the two round ends of the bean, in overlay space.
    pub fn bean_ends(&self) -> Option<(Point, Point)> {
        let sector = self.sector?;
        let radius = self.drawing_box.width().min(self.drawing_box.height()) / 2.0;
        let bean_radius = radius * (1.0 - 2.0 * MARGIN);
        let middle_radius = lerp(0.5, sector.min_radius, sector.max_radius);
        if middle_radius <= 0.0 {
            return None;
        }

        let spread_margin = 2.0 * (radius * MARGIN / middle_radius).clamp(-1.0, 1.0).asin();
        let spread_angle = 2.0 * (bean_radius / middle_radius).clamp(-1.0, 1.0).asin();
        let start = sector.min_angle + spread_angle / 2.0 + spread_margin;
        let end = sector.max_angle - spread_angle / 2.0 - spread_margin;

        let at = |angle: f32| {
            Point::new(
                sector.center.x + angle.cos() * middle_radius,
                sector.center.y - angle.sin() * middle_radius,
            )
        };
        Some((at(start), at(end)))
    }
}

impl Dial for DoubleButtonDial {
    fn drawing_box(&self) -> Rect {
        self.drawing_box
    }

    fn tracked_pointer_ids(&self) -> &[i32] {
        &[]
    }

    fn measure(&mut self, drawing_box: Rect, sector: Option<Sector>) {
        self.drawing_box = drawing_box;
        self.sector = sector;
    }

    fn touch(&mut self, fingers: &[FingerPosition]) -> TouchOutcome {
        let simulated = self.state.simulated();
        self.state.update(
            self.config.id,
            !fingers.is_empty(),
            simulated,
            self.config.supports_buttons,
        )
    }

    fn gesture(&mut self, _x: f32, _y: f32, kind: GestureKind) -> TouchOutcome {
        gesture_event(&self.config, kind)
    }

    fn accessibility_boxes(&self) -> Vec<AccessibilityBox> {
        button_accessibility(&self.config, self.drawing_box)
    }

    fn simulate_key_press(&mut self, id: i32, pressed: bool) -> Option<TouchOutcome> {
        if id != self.config.id {
            return None;
        }
        let real = self.state.pressed();
        Some(
            self.state
                .update(id, real, Some(pressed), self.config.supports_buttons),
        )
    }

    fn clear_simulated_key_press(&mut self, id: i32) -> Option<TouchOutcome> {
        if id != self.config.id {
            return None;
        }
        let real = self.state.pressed();
        Some(self.state.update(id, real, None, self.config.supports_buttons))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dials::test_support::finger;
    use std::f32::consts::PI;

    #[test]
    fn gesture_only_button_emits_no_presses() {
        let mut cfg = ButtonConfig::new(3).with_gestures(&[GestureKind::SingleTap]);
        cfg.supports_buttons = false;
        let mut d = DoubleButtonDial::new(cfg);

        let out = d.touch(&[finger(1, 0.5, 0.5)]);
        assert!(out.changed);
        assert!(out.events.is_empty());
        assert_eq!(d.level(), PressLevel::Pressed);

        assert_eq!(d.gesture(0.5, 0.5, GestureKind::SingleTap).events.len(), 1);
    }

    #[test]
    fn bean_ends_are_symmetric_around_sector_middle() {
        let mut d = DoubleButtonDial::new(ButtonConfig::new(1));
        let sector = Sector {
            center: Point::new(0.0, 0.0),
            min_radius: 100.0,
            max_radius: 140.0,
            min_angle: PI / 4.0,
            max_angle: 3.0 * PI / 4.0,
        };
        d.measure(Rect::new(-30.0, -150.0, 30.0, -90.0), Some(sector));
        let (a, b) = d.bean_ends().unwrap();
        assert!((a.x + b.x).abs() < 1e-3);
        assert!((a.y - b.y).abs() < 1e-3);
        assert!(a.y < 0.0);
    }
}
