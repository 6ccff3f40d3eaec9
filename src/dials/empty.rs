use super::{AccessibilityBox, Dial};
use crate::event::{GestureKind, TouchOutcome};
use crate::geometry::{Rect, Sector};
use crate::touch::FingerPosition;

/// Placeholder occupying a socket without reacting to anything.
#[derive(Debug, Default)]
pub struct EmptyDial {
    drawing_box: Rect,
}

impl EmptyDial {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Dial for EmptyDial {
    fn drawing_box(&self) -> Rect {
        self.drawing_box
    }

    fn tracked_pointer_ids(&self) -> &[i32] {
        &[]
    }

    fn measure(&mut self, drawing_box: Rect, _sector: Option<Sector>) {
        self.drawing_box = drawing_box;
    }

    fn touch(&mut self, _fingers: &[FingerPosition]) -> TouchOutcome {
        TouchOutcome::unchanged()
    }

    fn gesture(&mut self, _x: f32, _y: f32, _kind: GestureKind) -> TouchOutcome {
        TouchOutcome::unchanged()
    }

    fn accessibility_boxes(&self) -> Vec<AccessibilityBox> {
        Vec::new()
    }
}
