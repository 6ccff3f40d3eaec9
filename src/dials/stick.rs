use super::{AccessibilityBox, Dial};
use crate::config::StickConfig;
use crate::event::{ButtonAction, Event, GestureKind, HapticEffect, TouchOutcome};
use crate::geometry::{Point, Rect, Sector, polar_to_square, screen_angle};
use crate::touch::FingerPosition;

const ACQUIRE_RADIUS: f32 = 0.6;
const CENTER: Point = Point::new(0.5, 0.5);

/// Analog stick anchored where the finger first lands.
#[derive(Debug)]
pub struct StickDial {
    config: StickConfig,
    first_touch: Option<Point>,
    simulated_first_touch: Option<Point>,
    tracked: Option<i32>,
    angle: f32,
    strength: f32,
    button_pressed: bool,
    drawing_box: Rect,
}

impl StickDial {
    pub fn new(config: StickConfig) -> Self {
        Self {
            config,
            first_touch: None,
            simulated_first_touch: None,
            tracked: None,
            angle: 0.0,
            strength: 0.0,
            button_pressed: false,
            drawing_box: Rect::default(),
        }
    }

    pub fn id(&self) -> i32 {
        self.config.id
    }

    /// Counter-clockwise from 3 o'clock.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn is_active(&self) -> bool {
        self.first_touch.is_some() || self.simulated_first_touch.is_some()
    }

    pub fn is_button_pressed(&self) -> bool {
        self.button_pressed
    }

    fn origin(&self) -> Option<Point> {
        self.simulated_first_touch.or(self.first_touch)
    }

    fn handle_position(&mut self, x: f32, y: f32, events: &mut Vec<Event>) {
        let Some(origin) = self.origin() else {
            return;
        };
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        self.angle = screen_angle(origin.x, origin.y, x, y);
        self.strength = (origin.distance_to(Point::new(x, y)) * 2.0).clamp(0.0, 1.0);

        let mapped = polar_to_square(self.angle, self.strength);
        events.push(Event::direction(
            self.config.id,
            mapped.x,
            mapped.y,
            HapticEffect::None,
        ));
    }

    fn reset(&mut self) -> TouchOutcome {
        let was_active = self.is_active();
        let was_pressed = self.button_pressed;

        self.angle = 0.0;
        self.strength = 0.0;
        self.first_touch = None;
        self.simulated_first_touch = None;
        self.tracked = None;
        self.button_pressed = false;

        let mut events = Vec::new();
        if was_active {
            events.push(Event::direction(
                self.config.id,
                0.0,
                0.0,
                HapticEffect::Release,
            ));
        }
        if let (Some(press_id), true) = (self.config.button_press_id, was_pressed) {
            events.push(Event::button(press_id, ButtonAction::Up));
        }
        TouchOutcome::new(was_active || was_pressed, events)
    }
}

impl Dial for StickDial {
    fn drawing_box(&self) -> Rect {
        self.drawing_box
    }

    fn tracked_pointer_ids(&self) -> &[i32] {
        self.tracked.as_slice()
    }

    fn measure(&mut self, drawing_box: Rect, _sector: Option<Sector>) {
        self.drawing_box = drawing_box;
    }

    fn touch(&mut self, fingers: &[FingerPosition]) -> TouchOutcome {
        if self.simulated_first_touch.is_some() {
            if self.tracked.is_some_and(|id| !fingers.iter().any(|f| f.pointer_id == id)) {
                self.tracked = None;
                self.first_touch = None;
            }
            return TouchOutcome::unchanged();
        }

        let Some(first) = fingers.first() else {
            return self.reset();
        };

        let mut events = Vec::new();
        match self.tracked {
            None => {
                let start = Point::new(first.x, first.y);
                if !(start.distance_to(CENTER) < ACQUIRE_RADIUS) {
                    return TouchOutcome::unchanged();
                }
                self.tracked = Some(first.pointer_id);
                self.first_touch = Some(start);
                events.push(Event::direction(
                    self.config.id,
                    0.0,
                    0.0,
                    HapticEffect::Press,
                ));
                self.handle_position(first.x, first.y, &mut events);
            }
            Some(id) => match fingers.iter().find(|f| f.pointer_id == id) {
                Some(f) => self.handle_position(f.x, f.y, &mut events),
                None => return self.reset(),
            },
        }
        TouchOutcome::new(true, events)
    }

    fn gesture(&mut self, _x: f32, _y: f32, kind: GestureKind) -> TouchOutcome {
        match self.config.button_press_id {
            Some(press_id) if kind == GestureKind::SingleTap && self.first_touch.is_some() => {
                self.button_pressed = true;
                TouchOutcome::new(true, vec![Event::button(press_id, ButtonAction::Down)])
            }
            _ if self.config.supports_gestures.contains(&kind) => {
                let gesture = Event::Gesture {
                    id: self.config.id,
                    kind,
                };
                TouchOutcome::new(false, vec![gesture])
            }
            _ => TouchOutcome::unchanged(),
        }
    }

    fn accessibility_boxes(&self) -> Vec<AccessibilityBox> {
        if self.config.content_description.is_empty() {
            return Vec::new();
        }
        vec![AccessibilityBox {
            rect: self.drawing_box,
            text: self.config.content_description.clone(),
        }]
    }

    fn simulate_motion(&mut self, id: i32, x: f32, y: f32) -> Option<TouchOutcome> {
        if id != self.config.id {
            return None;
        }
        self.simulated_first_touch = Some(CENTER);
        let mut events = Vec::new();
        self.handle_position(x, y, &mut events);
        Some(TouchOutcome::new(true, events))
    }

    fn clear_simulated_motion(&mut self, id: i32) -> Option<TouchOutcome> {
        if id != self.config.id {
            return None;
        }
        Some(self.reset())
    }
}
