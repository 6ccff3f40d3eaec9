//! Per-control touch state machines.
//!
//! Every dial receives the fingers the router assigned to it, already
//! normalized to its own box (0..1 on both axes), and answers with a
//! [`TouchOutcome`]. Dials never see each other.

mod button;
mod cross;
mod double_button;
mod empty;
mod primary_buttons;
mod stick;

pub use button::{ButtonDial, PressLevel};
pub use cross::{CrossDial, CrossState};
pub use double_button::DoubleButtonDial;
pub use empty::EmptyDial;
pub use primary_buttons::PrimaryButtonsDial;
pub use stick::StickDial;

use std::fmt::Debug;

use crate::event::{GestureKind, TouchOutcome};
use crate::geometry::{Rect, Sector};
use crate::touch::FingerPosition;

/// Label and screen rectangle describing one control for screen readers.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessibilityBox {
    pub rect: Rect,
    pub text: String,
}

pub trait Dial: Debug {
    fn drawing_box(&self) -> Rect;

    /// Pointers this dial currently owns.
    fn tracked_pointer_ids(&self) -> &[i32];

    fn measure(&mut self, drawing_box: Rect, sector: Option<Sector>);

    fn touch(&mut self, fingers: &[FingerPosition]) -> TouchOutcome;

    /// `x`, `y` are relative to the drawing box.
    fn gesture(&mut self, x: f32, y: f32, kind: GestureKind) -> TouchOutcome;

    fn accessibility_boxes(&self) -> Vec<AccessibilityBox>;

    /// `None` when `id` does not belong to this dial.
    fn simulate_motion(&mut self, _id: i32, _x: f32, _y: f32) -> Option<TouchOutcome> {
        None
    }

    fn clear_simulated_motion(&mut self, _id: i32) -> Option<TouchOutcome> {
        None
    }

    fn simulate_key_press(&mut self, _id: i32, _pressed: bool) -> Option<TouchOutcome> {
        None
    }

    fn clear_simulated_key_press(&mut self, _id: i32) -> Option<TouchOutcome> {
        None
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::touch::FingerPosition;

    pub fn finger(id: i32, x: f32, y: f32) -> FingerPosition {
        FingerPosition::new(id, x, y)
    }

    pub fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }
}
