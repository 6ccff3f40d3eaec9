use super::{AccessibilityBox, Dial};
use crate::config::ButtonConfig;
use crate::event::{ButtonAction, Event, GestureKind, TouchOutcome};
use crate::geometry::{Rect, Sector};
use crate::touch::FingerPosition;

/// What a renderer shows for a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PressLevel {
    Released,
    /// Simulation forces the button up while it is not touched.
    SemiPressed,
    Pressed,
}

/// Real press flag plus a tri-state simulated override.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PressState {
    pressed: bool,
    simulated: Option<bool>,
}

impl PressState {
    pub(crate) fn level(&self) -> PressLevel {
        match (self.pressed, self.simulated) {
            (true, _) | (_, Some(true)) => PressLevel::Pressed,
            (false, Some(false)) => PressLevel::SemiPressed,
            (false, None) => PressLevel::Released,
        }
    }

    pub(crate) fn is_pressed(&self) -> bool {
        self.simulated.unwrap_or(self.pressed)
    }

    pub(crate) fn pressed(&self) -> bool {
        self.pressed
    }

    pub(crate) fn simulated(&self) -> Option<bool> {
        self.simulated
    }

    /// Applies new flags; a Button event is produced only when the
    /// effective state flips and `emit` is set.
    pub(crate) fn update(
        &mut self,
        id: i32,
        pressed: bool,
        simulated: Option<bool>,
        emit: bool,
    ) -> TouchOutcome {
        let old_level = self.level();
        let old_effective = self.is_pressed();

        self.pressed = pressed;
        self.simulated = simulated;

        let mut events = Vec::new();
        let effective = self.is_pressed();
        if emit && effective != old_effective {
            let action = if effective {
                ButtonAction::Down
            } else {
                ButtonAction::Up
            };
            events.push(Event::button(id, action));
        }

        TouchOutcome::new(old_level != self.level(), events)
    }
}

pub(crate) fn gesture_event(config: &ButtonConfig, kind: GestureKind) -> TouchOutcome {
    if config.supports_gestures.contains(&kind) {
        TouchOutcome::new(false, vec![Event::Gesture { id: config.id, kind }])
    } else {
        TouchOutcome::unchanged()
    }
}

pub(crate) fn button_accessibility(config: &ButtonConfig, rect: Rect) -> Vec<AccessibilityBox> {
    match config.description() {
        Some(text) if config.visible => vec![AccessibilityBox {
            rect,
            text: text.to_string(),
        }],
        _ => Vec::new(),
    }
}

/// Single round button mounted on a secondary socket.
#[derive(Debug)]
pub struct ButtonDial {
    config: ButtonConfig,
    state: PressState,
    drawing_box: Rect,
}

impl ButtonDial {
    pub fn new(config: ButtonConfig) -> Self {
        Self {
            config,
            state: PressState::default(),
            drawing_box: Rect::default(),
        }
    }

    pub fn id(&self) -> i32 {
        self.config.id
    }

    pub fn level(&self) -> PressLevel {
        self.state.level()
    }

    pub fn is_pressed(&self) -> bool {
        self.state.is_pressed()
    }
}

impl Dial for ButtonDial {
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
    use crate::event::HapticEffect;

    fn dial() -> ButtonDial {
        ButtonDial::new(ButtonConfig::new(7).with_gestures(&[GestureKind::DoubleTap]))
    }

    #[test]
    fn press_and_release() {
        let mut d = dial();
        let out = d.touch(&[finger(0, 0.5, 0.5)]);
        assert!(out.changed);
        assert_eq!(
            out.events,
            vec![Event::Button {
                id: 7,
                action: ButtonAction::Down,
                haptic: HapticEffect::Press
            }]
        );

        let out = d.touch(&[finger(0, 0.5, 0.5)]);
        assert!(!out.changed);
        assert!(out.events.is_empty());

        let out = d.touch(&[]);
        assert_eq!(
            out.events,
            vec![Event::Button {
                id: 7,
                action: ButtonAction::Up,
                haptic: HapticEffect::Release
            }]
        );
    }

    #[test]
    fn simulated_state_wins_over_touch() {
        let mut d = dial();
        let out = d.simulate_key_press(7, true).unwrap();
        assert_eq!(out.events.len(), 1);

        // a real finger landing and lifting does not change the effective state
        assert!(d.touch(&[finger(0, 0.5, 0.5)]).events.is_empty());
        assert!(d.touch(&[]).events.is_empty());
        assert!(d.is_pressed());

        let out = d.clear_simulated_key_press(7).unwrap();
        assert!(matches!(
            out.events.as_slice(),
            [Event::Button {
                action: ButtonAction::Up,
                ..
            }]
        ));
    }

    #[test]
    fn simulated_release_shows_semi_pressed() {
        let mut d = dial();
        let out = d.simulate_key_press(7, false).unwrap();
        assert!(out.changed);
        assert!(out.events.is_empty());
        assert_eq!(d.level(), PressLevel::SemiPressed);
    }

    #[test]
    fn unknown_id_is_ignored() {
        let mut d = dial();
        assert!(d.simulate_key_press(8, true).is_none());
        assert!(d.clear_simulated_key_press(8).is_none());
    }

    #[test]
    fn only_enabled_gestures_fire() {
        let mut d = dial();
        assert!(d.gesture(0.5, 0.5, GestureKind::SingleTap).events.is_empty());
        assert_eq!(
            d.gesture(0.5, 0.5, GestureKind::DoubleTap).events,
            vec![Event::Gesture {
                id: 7,
                kind: GestureKind::DoubleTap
            }]
        );
    }
}
