//! Pad events to a virtual gamepad.
//!
//! [`GamepadMapper`] turns pad events into gamepad outputs using the profile
//! bindings; [`UinputSink`] writes those outputs to `/dev/uinput`.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use log::{debug, info, warn};

use radialpad::config::{Binding, Bindings, GamepadButton};
use radialpad::event::{ButtonAction, Event};

/// Full deflection on the virtual sticks.
pub const AXIS_MAX: i32 = 32767;

/// Direction component past which a d-pad button counts as held.
const DPAD_THRESHOLD: f32 = 0.38;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Button(GamepadButton, bool),
    Axis(Axis, i32),
    Sync,
}

const DPAD_BUTTONS: [GamepadButton; 4] = [
    GamepadButton::DpadUp,
    GamepadButton::DpadDown,
    GamepadButton::DpadLeft,
    GamepadButton::DpadRight,
];

fn dpad_state(x: f32, y: f32) -> [bool; 4] {
    [
        y > DPAD_THRESHOLD,
        y < -DPAD_THRESHOLD,
        x < -DPAD_THRESHOLD,
        x > DPAD_THRESHOLD,
    ]
}

fn axis_value(v: f32) -> i32 {
    (v.clamp(-1.0, 1.0) * AXIS_MAX as f32).round() as i32
}

#[derive(Debug, Default)]
pub struct GamepadMapper {
    bindings: Bindings,
    dpad: HashMap<i32, [bool; 4]>,
    held: HashSet<GamepadButton>,
    moved: HashSet<Axis>,
}

impl GamepadMapper {
    pub fn new(bindings: Bindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    /// Releases everything, then switches to `bindings`.
    pub fn rebind(&mut self, bindings: Bindings) -> Vec<Output> {
        let out = self.release_all();
        self.bindings = bindings;
        out
    }

    fn binding(&self, id: i32) -> Option<Binding> {
        self.bindings.controls.get(&id).copied()
    }

    fn set_button(&mut self, out: &mut Vec<Output>, button: GamepadButton, pressed: bool) {
        let changed = if pressed {
            self.held.insert(button)
        } else {
            self.held.remove(&button)
        };
        if changed {
            out.push(Output::Button(button, pressed));
        }
    }

    fn set_stick(&mut self, out: &mut Vec<Output>, x_axis: Axis, y_axis: Axis, x: f32, y: f32) {
        // evdev sticks grow downward, pad directions grow upward
        for (axis, value) in [(x_axis, axis_value(x)), (y_axis, axis_value(-y))] {
            if value == 0 {
                self.moved.remove(&axis);
            } else {
                self.moved.insert(axis);
            }
            out.push(Output::Axis(axis, value));
        }
    }

    pub fn map(&mut self, events: &[Event]) -> Vec<Output> {
        let mut out = Vec::new();
        for event in events {
            match *event {
                Event::Button { id, action, .. } => match self.binding(id) {
                    Some(Binding::Button(b)) => {
                        self.set_button(&mut out, b, action == ButtonAction::Down)
                    }
                    Some(other) => debug!("control {id}: {other:?} ignores button events"),
                    None => debug!("control {id} is unbound"),
                },
                Event::Direction { id, x, y, .. } => match self.binding(id) {
                    Some(Binding::LeftStick) => {
                        self.set_stick(&mut out, Axis::LeftX, Axis::LeftY, x, y)
                    }
                    Some(Binding::RightStick) => {
                        self.set_stick(&mut out, Axis::RightX, Axis::RightY, x, y)
                    }
                    Some(Binding::Dpad) => {
                        let next = dpad_state(x, y);
                        let prev = self.dpad.insert(id, next).unwrap_or_default();
                        for (i, button) in DPAD_BUTTONS.iter().enumerate() {
                            if prev[i] != next[i] {
                                self.set_button(&mut out, *button, next[i]);
                            }
                        }
                    }
                    Some(other) => debug!("control {id}: {other:?} ignores directions"),
                    None => debug!("control {id} is unbound"),
                },
                Event::Gesture { id, kind } => {
                    let target = self.bindings.gestures.get(&(id, kind)).copied();
                    if let Some(Binding::Button(b)) = target {
                        // a pulse: press and release in separate reports
                        self.set_button(&mut out, b, true);
                        out.push(Output::Sync);
                        self.set_button(&mut out, b, false);
                    }
                }
            }
        }
        if !out.is_empty() {
            out.push(Output::Sync);
        }
        out
    }

    /// Outputs that return the gamepad to rest.
    pub fn release_all(&mut self) -> Vec<Output> {
        let mut out: Vec<Output> = self
            .held
            .drain()
            .map(|b| Output::Button(b, false))
            .collect();
        out.extend(self.moved.drain().map(|a| Output::Axis(a, 0)));
        self.dpad.clear();
        if !out.is_empty() {
            out.push(Output::Sync);
        }
        out
    }
}

pub struct UinputSink {
    #[allow(dead_code)]
    linux: Option<Box<LinuxUinput>>,
}

impl UinputSink {
    pub fn new() -> Result<Self> {
        #[cfg(target_os = "linux")]
        {
            let dev = LinuxUinput::create()?;
            return Ok(Self {
                linux: Some(Box::new(dev)),
            });
        }
        #[allow(unreachable_code)]
        {
            warn!("uinput not available; running in NO-OP mode");
            Ok(Self::noop())
        }
    }

    pub fn noop() -> Self {
        Self { linux: None }
    }

    pub fn write(&mut self, outputs: &[Output]) -> Result<()> {
        #[cfg(target_os = "linux")]
        if let Some(dev) = self.linux.as_mut() {
            for o in outputs {
                match *o {
                    Output::Button(b, pressed) => dev.button(b, pressed)?,
                    Output::Axis(a, value) => dev.axis(a, value)?,
                    Output::Sync => dev.sync()?,
                }
            }
        }
        #[cfg(not(target_os = "linux"))]
        let _ = outputs;
        Ok(())
    }
}

#[cfg(target_os = "linux")]
fn map_button(b: GamepadButton) -> uinput::event::Controller {
    use uinput::event::Controller;
    use uinput::event::controller::{DPad, GamePad};
    match b {
        GamepadButton::South => Controller::GamePad(GamePad::A),
        GamepadButton::East => Controller::GamePad(GamePad::B),
        GamepadButton::North => Controller::GamePad(GamePad::X),
        GamepadButton::West => Controller::GamePad(GamePad::Y),
        GamepadButton::Tl => Controller::GamePad(GamePad::TL),
        GamepadButton::Tr => Controller::GamePad(GamePad::TR),
        GamepadButton::Tl2 => Controller::GamePad(GamePad::TL2),
        GamepadButton::Tr2 => Controller::GamePad(GamePad::TR2),
        GamepadButton::Select => Controller::GamePad(GamePad::Select),
        GamepadButton::Start => Controller::GamePad(GamePad::Start),
        GamepadButton::Mode => Controller::GamePad(GamePad::Mode),
        GamepadButton::ThumbL => Controller::GamePad(GamePad::ThumbL),
        GamepadButton::ThumbR => Controller::GamePad(GamePad::ThumbR),
        GamepadButton::DpadUp => Controller::DPad(DPad::Up),
        GamepadButton::DpadDown => Controller::DPad(DPad::Down),
        GamepadButton::DpadLeft => Controller::DPad(DPad::Left),
        GamepadButton::DpadRight => Controller::DPad(DPad::Right),
    }
}

#[cfg(target_os = "linux")]
fn map_axis(a: Axis) -> uinput::event::absolute::Position {
    use uinput::event::absolute::Position;
    match a {
        Axis::LeftX => Position::X,
        Axis::LeftY => Position::Y,
        Axis::RightX => Position::RX,
        Axis::RightY => Position::RY,
    }
}

#[cfg(target_os = "linux")]
struct LinuxUinput {
    dev: uinput::device::Device,
}

#[cfg(target_os = "linux")]
impl LinuxUinput {
    fn create() -> Result<Self> {
        let mut builder = uinput::default()?.name("Radialpad Virtual Gamepad")?;
        for b in GamepadButton::ALL {
            builder = builder.event(map_button(b))?;
        }
        for a in [Axis::LeftX, Axis::LeftY, Axis::RightX, Axis::RightY] {
            builder = builder
                .event(map_axis(a))?
                .min(-AXIS_MAX)
                .max(AXIS_MAX)
                .fuzz(0)
                .flat(0);
        }
        let dev = builder.create()?;

        info!("uinput: created virtual gamepad");
        Ok(Self { dev })
    }

    fn sync(&mut self) -> Result<()> {
        self.dev.synchronize()?;
        Ok(())
    }

    fn button(&mut self, b: GamepadButton, pressed: bool) -> Result<()> {
        self.dev.send(map_button(b), i32::from(pressed))?;
        Ok(())
    }

    fn axis(&mut self, a: Axis, value: i32) -> Result<()> {
        self.dev.send(map_axis(a), value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radialpad::event::{GestureKind, HapticEffect};

    fn mapper() -> GamepadMapper {
        let mut b = Bindings::default();
        b.controls.insert(0, Binding::LeftStick);
        b.controls.insert(1, Binding::Dpad);
        b.controls.insert(30, Binding::Button(GamepadButton::South));
        b.gestures
            .insert((0, GestureKind::DoubleTap), Binding::Button(GamepadButton::Mode));
        GamepadMapper::new(b)
    }

    fn dir(id: i32, x: f32, y: f32) -> Event {
        Event::Direction {
            id,
            x,
            y,
            haptic: HapticEffect::None,
        }
    }

    fn button(id: i32, action: ButtonAction) -> Event {
        Event::Button {
            id,
            action,
            haptic: HapticEffect::None,
        }
    }

    #[test]
    fn buttons_follow_down_and_up() {
        let mut m = mapper();
        assert_eq!(
            m.map(&[button(30, ButtonAction::Down)]),
            vec![Output::Button(GamepadButton::South, true), Output::Sync]
        );
        // repeated down is not resent
        assert!(m.map(&[button(30, ButtonAction::Down)]).is_empty());
        assert_eq!(
            m.map(&[button(30, ButtonAction::Up)]),
            vec![Output::Button(GamepadButton::South, false), Output::Sync]
        );
    }

    #[test]
    fn stick_flips_y_for_evdev() {
        let mut m = mapper();
        assert_eq!(
            m.map(&[dir(0, 1.0, 0.5)]),
            vec![
                Output::Axis(Axis::LeftX, AXIS_MAX),
                Output::Axis(Axis::LeftY, -16384),
                Output::Sync
            ]
        );
    }

    #[test]
    fn dpad_snaps_diagonals_to_two_buttons() {
        let mut m = mapper();
        let d = std::f32::consts::FRAC_1_SQRT_2;
        let out = m.map(&[dir(1, d, -d)]);
        assert!(out.contains(&Output::Button(GamepadButton::DpadDown, true)));
        assert!(out.contains(&Output::Button(GamepadButton::DpadRight, true)));

        let out = m.map(&[dir(1, 1.0, 0.0)]);
        assert_eq!(
            out,
            vec![Output::Button(GamepadButton::DpadDown, false), Output::Sync]
        );
        let out = m.map(&[dir(1, 0.0, 0.0)]);
        assert_eq!(
            out,
            vec![Output::Button(GamepadButton::DpadRight, false), Output::Sync]
        );
    }

    #[test]
    fn gestures_pulse_their_button() {
        let mut m = mapper();
        assert_eq!(
            m.map(&[Event::Gesture {
                id: 0,
                kind: GestureKind::DoubleTap
            }]),
            vec![
                Output::Button(GamepadButton::Mode, true),
                Output::Sync,
                Output::Button(GamepadButton::Mode, false),
                Output::Sync
            ]
        );
        assert!(
            m.map(&[Event::Gesture {
                id: 0,
                kind: GestureKind::SingleTap
            }])
            .is_empty()
        );
    }

    #[test]
    fn release_all_returns_to_rest() {
        let mut m = mapper();
        m.map(&[button(30, ButtonAction::Down), dir(0, 0.5, 0.0)]);
        let out = m.release_all();
        assert!(out.contains(&Output::Button(GamepadButton::South, false)));
        assert!(out.contains(&Output::Axis(Axis::LeftX, 0)));
        assert_eq!(out.last(), Some(&Output::Sync));
        assert!(m.release_all().is_empty());
    }
}
