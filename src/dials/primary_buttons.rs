use std::collections::{BTreeMap, BTreeSet};

use super::{AccessibilityBox, Dial};
use crate::config::{ButtonConfig, PrimaryButtonsConfig};
use crate::event::{ButtonAction, Event, GestureKind, TouchOutcome};
use crate::geometry::{Point, Rect, Sector, TAU, TouchAnchor, nearest, screen_angle};
use crate::touch::FingerPosition;

const BUTTON_SCALING: f32 = 0.8;
const BUTTON_STRENGTH: f32 = 1.0;
const COMPOSITE_STRENGTH: f32 = 0.5;

/// Ring of face buttons with an optional center button.
///
/// Every finger is mapped independently, so several buttons can be held at
/// once. With `allow_multiple_presses_single_finger` a finger resting between
/// two neighbours presses both.
#[derive(Debug)]
pub struct PrimaryButtonsDial {
    buttons: Vec<ButtonConfig>,
    center: Option<ButtonConfig>,
    rotation: f32,
    action_angle: f32,
    composite: bool,
    /// Geometry for a unit box, computed once.
    button_radius: f32,
    distance_to_center: f32,
    button_anchors: Vec<TouchAnchor>,
    composite_anchors: Vec<TouchAnchor>,
    pressed: BTreeSet<i32>,
    touch_pressed: BTreeSet<i32>,
    simulated: BTreeMap<i32, bool>,
    drawing_box: Rect,
}

impl PrimaryButtonsDial {
    pub fn new(config: PrimaryButtonsConfig) -> Self {
        let PrimaryButtonsConfig {
            buttons,
            center,
            rotation_degrees,
            allow_multiple_presses_single_finger,
        } = config;

        let rotation = rotation_degrees.to_radians();
        let action_angle = TAU / buttons.len().max(1) as f32;
        let has_ring_and_center = center.is_some() && !buttons.is_empty();

        let mut button_radius = compute_button_radius(1.0, buttons.len(), has_ring_and_center);
        let mut distance_to_center = 0.25;
        if has_ring_and_center {
            distance_to_center += button_radius * 0.5;
        } else {
            button_radius *= BUTTON_SCALING;
        }

        let button_anchors: Vec<TouchAnchor> = buttons
            .iter()
            .enumerate()
            .map(|(i, b)| {
                TouchAnchor::from_polar(
                    action_angle * i as f32 + rotation,
                    distance_to_center,
                    BUTTON_STRENGTH,
                    vec![b.id],
                )
            })
            .collect();

        let pairs = match buttons.len() {
            0 | 1 => 0,
            2 => 1,
            n => n,
        };
        let composite_anchors = (0..pairs)
            .map(|i| {
                let a = &button_anchors[i];
                let b = &button_anchors[(i + 1) % buttons.len()];
                TouchAnchor::from_coordinates(
                    (a.point.x + b.point.x) / 2.0,
                    (a.point.y + b.point.y) / 2.0,
                    COMPOSITE_STRENGTH,
                    vec![a.ids[0], b.ids[0]],
                )
            })
            .collect();

        Self {
            buttons,
            center,
            rotation,
            action_angle,
            composite: allow_multiple_presses_single_finger,
            button_radius,
            distance_to_center,
            button_anchors,
            composite_anchors,
            pressed: BTreeSet::new(),
            touch_pressed: BTreeSet::new(),
            simulated: BTreeMap::new(),
            drawing_box: Rect::default(),
        }
    }

    /// Ids currently pressed, simulation applied.
    pub fn pressed(&self) -> &BTreeSet<i32> {
        &self.pressed
    }

    /// Ids a point in box-relative coordinates maps to.
    pub fn ids_at(&self, x: f32, y: f32) -> Vec<i32> {
        if !(x.is_finite() && y.is_finite()) {
            return Vec::new();
        }
        if let Some(center) = &self.center {
            if Point::new(x, y).distance_to(Point::new(0.5, 0.5)) < self.button_radius {
                return vec![center.id];
            }
        }
        if self.buttons.is_empty() {
            return Vec::new();
        }
        if self.composite {
            self.composite_ids_at(x, y)
        } else {
            vec![self.buttons[self.slice_at(x, y)].id]
        }
    }

    fn slice_at(&self, x: f32, y: f32) -> usize {
        let angle = screen_angle(0.5, 0.5, x, y);
        let shifted = (angle + self.action_angle / 2.0 - self.rotation).rem_euclid(TAU);
        let index = (shifted / self.action_angle).floor() as usize;
        index.min(self.buttons.len() - 1)
    }

    fn composite_ids_at(&self, x: f32, y: f32) -> Vec<i32> {
        let (ax, ay) = (x - 0.5, 0.5 - y);
        let button = nearest(&self.button_anchors, ax, ay);
        let composite = nearest(&self.composite_anchors, ax, ay);

        match (button, composite) {
            (Some((_, bd)), Some((ci, cd))) if cd < bd => self.composite_anchors[ci].ids.clone(),
            (Some((bi, _)), _) => self.button_anchors[bi].ids.clone(),
            (None, _) => Vec::new(),
        }
    }

    fn config_for(&self, id: i32) -> Option<&ButtonConfig> {
        self.buttons
            .iter()
            .chain(self.center.as_ref())
            .find(|b| b.id == id)
    }

    fn knows(&self, id: i32) -> bool {
        self.config_for(id).is_some()
    }

    fn effective(&self) -> BTreeSet<i32> {
        let mut effective: BTreeSet<i32> = self
            .touch_pressed
            .iter()
            .copied()
            .filter(|id| self.simulated.get(id) != Some(&false))
            .collect();
        effective.extend(
            self.simulated
                .iter()
                .filter(|(_, pressed)| **pressed)
                .map(|(id, _)| *id),
        );
        effective
    }

    fn apply(&mut self) -> TouchOutcome {
        let next = self.effective();
        if next == self.pressed {
            return TouchOutcome::unchanged();
        }

        let emits = |id: &i32| self.config_for(*id).is_some_and(|b| b.supports_buttons);
        let downs = next
            .difference(&self.pressed)
            .filter(|id| emits(*id))
            .map(|id| Event::button(*id, ButtonAction::Down));
        let ups = self
            .pressed
            .difference(&next)
            .filter(|id| emits(*id))
            .map(|id| Event::button(*id, ButtonAction::Up));
        let events = downs.chain(ups).collect();

        self.pressed = next;
        TouchOutcome::new(true, events)
    }

    /// Rectangle of the button at `angle`, in overlay space.
    fn button_rect(&self, angle: f32) -> Rect {
        let size = self.drawing_box.width().min(self.drawing_box.height());
        let center = self.drawing_box.center();
        let at = Point::new(
            center.x + angle.cos() * self.distance_to_center * size,
            center.y - angle.sin() * self.distance_to_center * size,
        );
        Rect::square(at, self.button_radius * size)
    }
}

fn compute_button_radius(dial_diameter: f32, buttons: usize, has_ring_and_center: bool) -> f32 {
    let count = buttons.max(2) as f32;
    let radial_max = dial_diameter * (std::f32::consts::PI / count).sin() / 4.0;
    let linear_max = if has_ring_and_center {
        BUTTON_SCALING * dial_diameter / 6.0
    } else {
        f32::MAX
    };
    radial_max.min(linear_max)
}

impl Dial for PrimaryButtonsDial {
    fn drawing_box(&self) -> Rect {
        self.drawing_box
    }

    fn tracked_pointer_ids(&self) -> &[i32] {
        &[]
    }

    fn measure(&mut self, drawing_box: Rect, _sector: Option<Sector>) {
        self.drawing_box = drawing_box;
    }

    fn touch(&mut self, fingers: &[FingerPosition]) -> TouchOutcome {
        self.touch_pressed = fingers
            .iter()
            .flat_map(|f| self.ids_at(f.x, f.y))
            .collect();
        self.apply()
    }

    fn gesture(&mut self, x: f32, y: f32, kind: GestureKind) -> TouchOutcome {
        let events = self
            .ids_at(x, y)
            .into_iter()
            .filter(|id| {
                self.config_for(*id)
                    .is_some_and(|b| b.supports_gestures.contains(&kind))
            })
            .map(|id| Event::Gesture { id, kind })
            .collect();
        TouchOutcome::new(false, events)
    }

    fn accessibility_boxes(&self) -> Vec<AccessibilityBox> {
        let ring = self.buttons.iter().enumerate().filter_map(|(i, b)| {
            let text = b.description().filter(|_| b.visible)?;
            let angle = self.action_angle * i as f32 + self.rotation;
            Some(AccessibilityBox {
                rect: self.button_rect(angle),
                text: text.to_string(),
            })
        });
        let center = self.center.iter().filter_map(|b| {
            let text = b.description().filter(|_| b.visible)?;
            let size = self.drawing_box.width().min(self.drawing_box.height());
            Some(AccessibilityBox {
                rect: Rect::square(self.drawing_box.center(), self.button_radius * size),
                text: text.to_string(),
            })
        });
        ring.chain(center).collect()
    }

    fn simulate_key_press(&mut self, id: i32, pressed: bool) -> Option<TouchOutcome> {
        if !self.knows(id) {
            return None;
        }
        self.simulated.insert(id, pressed);
        Some(self.apply())
    }

    fn clear_simulated_key_press(&mut self, id: i32) -> Option<TouchOutcome> {
        if !self.knows(id) {
            return None;
        }
        self.simulated.remove(&id);
        Some(self.apply())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dials::test_support::finger;
    use crate::event::HapticEffect;

    // A at 3 o'clock, B at 12, C at 9, D at 6
    fn config(composite: bool) -> PrimaryButtonsConfig {
        PrimaryButtonsConfig {
            buttons: vec![
                ButtonConfig::new(10).with_label("A"),
                ButtonConfig::new(11).with_label("B"),
                ButtonConfig::new(12).with_label("C"),
                ButtonConfig::new(13).with_label("D"),
            ],
            center: None,
            rotation_degrees: 0.0,
            allow_multiple_presses_single_finger: composite,
        }
    }

    fn down(id: i32) -> Event {
        Event::Button {
            id,
            action: ButtonAction::Down,
            haptic: HapticEffect::Press,
        }
    }

    fn up(id: i32) -> Event {
        Event::Button {
            id,
            action: ButtonAction::Up,
            haptic: HapticEffect::Release,
        }
    }

    #[test]
    fn slices_follow_angle() {
        let d = PrimaryButtonsDial::new(config(false));
        assert_eq!(d.ids_at(0.9, 0.5), vec![10]);
        assert_eq!(d.ids_at(0.5, 0.1), vec![11]);
        assert_eq!(d.ids_at(0.1, 0.5), vec![12]);
        assert_eq!(d.ids_at(0.5, 0.9), vec![13]);
        // just below 3 o'clock still belongs to A
        assert_eq!(d.ids_at(0.9, 0.55), vec![10]);
    }

    #[test]
    fn rotation_shifts_slices() {
        let mut cfg = config(false);
        cfg.rotation_degrees = 90.0;
        let d = PrimaryButtonsDial::new(cfg);
        assert_eq!(d.ids_at(0.5, 0.1), vec![10]);
        assert_eq!(d.ids_at(0.9, 0.5), vec![13]);
    }

    #[test]
    fn center_button_wins_near_middle() {
        let mut cfg = config(false);
        cfg.center = Some(ButtonConfig::new(20));
        let d = PrimaryButtonsDial::new(cfg);
        assert_eq!(d.ids_at(0.5, 0.5), vec![20]);
        assert_eq!(d.ids_at(0.95, 0.5), vec![10]);
    }

    #[test]
    fn composite_mode_presses_both_neighbours_between_them() {
        let d = PrimaryButtonsDial::new(config(true));
        let mut ids = d.ids_at(0.5 + 0.12, 0.5 - 0.12);
        ids.sort();
        assert_eq!(ids, vec![10, 11]);
        assert_eq!(d.ids_at(0.5 + 0.3, 0.5), vec![10]);
    }

    #[test]
    fn normal_mode_never_presses_two_with_one_finger() {
        let d = PrimaryButtonsDial::new(config(false));
        for i in 0..100 {
            let a = i as f32 * TAU / 100.0;
            assert_eq!(d.ids_at(0.5 + 0.2 * a.cos(), 0.5 - 0.2 * a.sin()).len(), 1);
        }
    }

    #[test]
    fn downs_then_ups_in_id_order() {
        let mut d = PrimaryButtonsDial::new(config(false));
        let out = d.touch(&[finger(0, 0.5, 0.9), finger(1, 0.9, 0.5)]);
        assert_eq!(out.events, vec![down(10), down(13)]);

        let out = d.touch(&[finger(1, 0.1, 0.5)]);
        assert_eq!(out.events, vec![down(12), up(10), up(13)]);

        let out = d.touch(&[finger(1, 0.1, 0.5)]);
        assert!(!out.changed);
    }

    #[test]
    fn two_fingers_on_one_button_press_once() {
        let mut d = PrimaryButtonsDial::new(config(false));
        let out = d.touch(&[finger(0, 0.9, 0.5), finger(1, 0.85, 0.45)]);
        assert_eq!(out.events, vec![down(10)]);
    }

    #[test]
    fn simulation_overrides_touch_per_button() {
        let mut d = PrimaryButtonsDial::new(config(false));
        d.touch(&[finger(0, 0.9, 0.5)]);

        let out = d.simulate_key_press(10, false).unwrap();
        assert_eq!(out.events, vec![up(10)]);
        let out = d.simulate_key_press(11, true).unwrap();
        assert_eq!(out.events, vec![down(11)]);

        let out = d.clear_simulated_key_press(10).unwrap();
        assert_eq!(out.events, vec![down(10)]);
        assert!(d.simulate_key_press(99, true).is_none());
    }

    #[test]
    fn gestures_go_to_the_touched_button() {
        let mut cfg = config(false);
        cfg.buttons[1] = ButtonConfig::new(11).with_gestures(&[GestureKind::TripleTap]);
        let mut d = PrimaryButtonsDial::new(cfg);
        assert_eq!(
            d.gesture(0.5, 0.1, GestureKind::TripleTap).events,
            vec![Event::Gesture {
                id: 11,
                kind: GestureKind::TripleTap
            }]
        );
        assert!(d.gesture(0.9, 0.5, GestureKind::TripleTap).events.is_empty());
    }

    #[test]
    fn accessibility_boxes_sit_on_the_ring() {
        let mut d = PrimaryButtonsDial::new(config(false));
        d.measure(Rect::new(0.0, 0.0, 200.0, 200.0), None);
        let boxes = d.accessibility_boxes();
        assert_eq!(boxes.len(), 4);
        assert_eq!(boxes[0].text, "A");
        assert!(boxes[0].rect.center().x > 100.0);
        assert!((boxes[1].rect.center().y - 50.0).abs() < 1e-3);
    }
}
