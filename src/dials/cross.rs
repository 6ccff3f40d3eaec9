use std::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_4};

use super::{AccessibilityBox, Dial};
use crate::config::CrossConfig;
use crate::event::{Event, GestureKind, HapticEffect, TouchOutcome};
use crate::geometry::{Rect, Sector, TouchAnchor, nearest};
use crate::touch::FingerPosition;

const ANCHOR_DISTANCE: f32 = 0.5;
const MAIN_STRENGTH: f32 = 2.0;
const DIAGONAL_STRENGTH: f32 = 1.25;
const ACCESSIBILITY_BOX_SCALE: f32 = 0.33;

/// Position of the pad. Directions are listed counter-clockwise from 3 o'clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrossState {
    Center,
    Right,
    UpRight,
    Up,
    UpLeft,
    Left,
    DownLeft,
    Down,
    DownRight,
}

impl CrossState {
    pub const DIRECTIONS: [CrossState; 8] = [
        CrossState::Right,
        CrossState::UpRight,
        CrossState::Up,
        CrossState::UpLeft,
        CrossState::Left,
        CrossState::DownLeft,
        CrossState::Down,
        CrossState::DownRight,
    ];

    /// Number of arms pressed: 0 at center, 1 cardinal, 2 diagonal.
    pub fn multiplicity(&self) -> u8 {
        match self {
            CrossState::Center => 0,
            CrossState::Right | CrossState::Up | CrossState::Left | CrossState::Down => 1,
            _ => 2,
        }
    }

    pub fn is_diagonal(&self) -> bool {
        self.multiplicity() == 2
    }

    /// Unit vector (y up), zero at center.
    pub fn vector(&self) -> (f32, f32) {
        const D: f32 = FRAC_1_SQRT_2;
        match self {
            CrossState::Center => (0.0, 0.0),
            CrossState::Right => (1.0, 0.0),
            CrossState::UpRight => (D, D),
            CrossState::Up => (0.0, 1.0),
            CrossState::UpLeft => (-D, D),
            CrossState::Left => (-1.0, 0.0),
            CrossState::DownLeft => (-D, -D),
            CrossState::Down => (0.0, -1.0),
            CrossState::DownRight => (D, -D),
        }
    }
}

/// Eight-way directional pad.
#[derive(Debug)]
pub struct CrossDial {
    config: CrossConfig,
    anchors: Vec<(CrossState, TouchAnchor)>,
    tracked: Option<i32>,
    touch_state: Option<CrossState>,
    simulated_state: Option<CrossState>,
    drawing_box: Rect,
}

impl CrossDial {
    pub fn new(config: CrossConfig) -> Self {
        let anchors = CrossState::DIRECTIONS
            .iter()
            .enumerate()
            .map(|(i, state)| {
                let strength = if state.is_diagonal() {
                    DIAGONAL_STRENGTH * config.diagonal_ratio
                } else {
                    MAIN_STRENGTH
                };
                let anchor = TouchAnchor::from_polar(
                    i as f32 * FRAC_PI_4,
                    ANCHOR_DISTANCE,
                    strength,
                    Vec::new(),
                );
                (*state, anchor)
            })
            .collect();

        Self {
            config,
            anchors,
            tracked: None,
            touch_state: None,
            simulated_state: None,
            drawing_box: Rect::default(),
        }
    }

    pub fn id(&self) -> i32 {
        self.config.id
    }

    /// Effective state, simulated first.
    pub fn state(&self) -> Option<CrossState> {
        self.simulated_state.or(self.touch_state)
    }

    pub fn is_simulated(&self) -> bool {
        self.simulated_state.is_some()
    }

    /// Classifies an offset from the pad center (screen axes, box-relative).
    pub fn compute_state_for_position(&self, x: f32, y: f32) -> CrossState {
        if !(x.is_finite() && y.is_finite()) || self.is_inside_dead_zone(x, y) {
            return CrossState::Center;
        }
        let use_diagonals = self.config.use_diagonals;
        let candidates: Vec<&(CrossState, TouchAnchor)> = self
            .anchors
            .iter()
            .filter(|(state, _)| use_diagonals || !state.is_diagonal())
            .collect();

        nearest(candidates.iter().map(|(_, a)| a), x, -y)
            .map(|(i, _)| candidates[i].0)
            .unwrap_or(CrossState::Center)
    }

    fn is_inside_dead_zone(&self, x: f32, y: f32) -> bool {
        x.abs() < self.config.dead_zone && y.abs() < self.config.dead_zone
    }

    fn update_state(
        &mut self,
        touch_state: Option<CrossState>,
        simulated_state: Option<CrossState>,
    ) -> TouchOutcome {
        let start = self.state();
        self.touch_state = touch_state;
        self.simulated_state = simulated_state;
        let end = self.state();

        if end == start {
            return TouchOutcome::unchanged();
        }
        let events = end
            .map(|end| self.transition_event(start, end))
            .into_iter()
            .collect();
        TouchOutcome::new(true, events)
    }

    fn transition_event(&self, start: Option<CrossState>, end: CrossState) -> Event {
        let from = start.map_or(0, |s| s.multiplicity());
        let to = end.multiplicity();
        let haptic = if end == CrossState::Center {
            if from > 0 {
                HapticEffect::Release
            } else {
                HapticEffect::None
            }
        } else if to > from {
            HapticEffect::Press
        } else if to == from {
            HapticEffect::Tick
        } else {
            HapticEffect::Release
        };
        let (x, y) = end.vector();
        Event::direction(self.config.id, x, y, haptic)
    }

    fn reset(&mut self) -> TouchOutcome {
        let was_set = self.state().is_some();
        self.touch_state = None;
        self.simulated_state = None;
        self.tracked = None;

        if was_set {
            let release = Event::direction(self.config.id, 0.0, 0.0, HapticEffect::Release);
            TouchOutcome::new(true, vec![release])
        } else {
            TouchOutcome::unchanged()
        }
    }

    fn description(&self, direction: &str) -> String {
        format!("{} {}", self.config.content_description, direction)
    }
}

impl Dial for CrossDial {
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
        // touch is disabled while an external source drives the pad
        if self.is_simulated() {
            // a lifted finger still releases its pointer id
            if self.tracked.is_some_and(|id| !fingers.iter().any(|f| f.pointer_id == id)) {
                self.tracked = None;
                self.touch_state = None;
            }
            return TouchOutcome::unchanged();
        }

        let Some(first) = fingers.first() else {
            return self.reset();
        };

        let state = match self.tracked {
            None => {
                self.tracked = Some(first.pointer_id);
                self.compute_state_for_position(
                    (first.x - 0.5).clamp(-0.5, 0.5),
                    (first.y - 0.5).clamp(-0.5, 0.5),
                )
            }
            Some(id) => match fingers.iter().find(|f| f.pointer_id == id) {
                Some(f) => self.compute_state_for_position(f.x - 0.5, f.y - 0.5),
                None => return self.reset(),
            },
        };

        self.update_state(Some(state), None)
    }

    fn gesture(&mut self, x: f32, y: f32, kind: GestureKind) -> TouchOutcome {
        // taps while steering would fire constantly, only accept them at rest
        let at_rest = !self.state().is_some_and(|s| s != CrossState::Center)
            || self.is_inside_dead_zone(x - 0.5, y - 0.5);

        if at_rest && self.config.supports_gestures.contains(&kind) {
            let gesture = Event::Gesture {
                id: self.config.id,
                kind,
            };
            return TouchOutcome::new(false, vec![gesture]);
        }
        TouchOutcome::unchanged()
    }

    fn accessibility_boxes(&self) -> Vec<AccessibilityBox> {
        let offset = self.drawing_box.width() * 0.25;
        let base = self.drawing_box.scale_centered(ACCESSIBILITY_BOX_SCALE);
        if self.config.content_description.is_empty() {
            return Vec::new();
        }
        [
            ("up", 0.0, -offset),
            ("left", -offset, 0.0),
            ("right", offset, 0.0),
            ("down", 0.0, offset),
        ]
        .into_iter()
        .map(|(dir, dx, dy)| AccessibilityBox {
            rect: base.offset(dx, dy),
            text: self.description(dir),
        })
        .collect()
    }

    fn simulate_motion(&mut self, id: i32, x: f32, y: f32) -> Option<TouchOutcome> {
        if id != self.config.id {
            return None;
        }
        let simulated = self.compute_state_for_position(x - 0.5, y - 0.5);
        let touch_state = self.touch_state;
        Some(self.update_state(touch_state, Some(simulated)))
    }

    fn clear_simulated_motion(&mut self, id: i32) -> Option<TouchOutcome> {
        if id != self.config.id {
            return None;
        }
        let was_active = self.state().is_some_and(|s| s != CrossState::Center);
        let was_set = self.state().is_some();
        self.touch_state = None;
        self.simulated_state = None;
        self.tracked = None;

        let mut events = Vec::new();
        if was_active {
            events.push(Event::direction(id, 0.0, 0.0, HapticEffect::Release));
        }
        Some(TouchOutcome::new(was_set, events))
    }
}
