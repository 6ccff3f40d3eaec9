//! Events emitted by the pad toward the controller-mapping consumer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HapticEffect {
    #[default]
    None,
    Release,
    Tick,
    Press,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    FirstTouch,
    SingleTap,
    DoubleTap,
    TripleTap,
}

impl GestureKind {
    /// Maps a tap count to a gesture; 0 is the first touch of a sequence.
    pub fn from_taps(taps: u32) -> Option<Self> {
        match taps {
            0 => Some(Self::FirstTouch),
            1 => Some(Self::SingleTap),
            2 => Some(Self::DoubleTap),
            3 => Some(Self::TripleTap),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstTouch => "first_touch",
            Self::SingleTap => "single_tap",
            Self::DoubleTap => "double_tap",
            Self::TripleTap => "triple_tap",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "first_touch" => Some(Self::FirstTouch),
            "single_tap" => Some(Self::SingleTap),
            "double_tap" => Some(Self::DoubleTap),
            "triple_tap" => Some(Self::TripleTap),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Button {
        id: i32,
        action: ButtonAction,
        haptic: HapticEffect,
    },
    /// Direction vector, x right-positive and y up-positive.
    Direction {
        id: i32,
        x: f32,
        y: f32,
        haptic: HapticEffect,
    },
    Gesture {
        id: i32,
        kind: GestureKind,
    },
}

impl Event {
    pub fn id(&self) -> i32 {
        match self {
            Event::Button { id, .. } | Event::Direction { id, .. } | Event::Gesture { id, .. } => {
                *id
            }
        }
    }

    pub fn haptic(&self) -> HapticEffect {
        match self {
            Event::Button { haptic, .. } | Event::Direction { haptic, .. } => *haptic,
            Event::Gesture { .. } => HapticEffect::None,
        }
    }

    pub(crate) fn button(id: i32, action: ButtonAction) -> Self {
        let haptic = match action {
            ButtonAction::Down => HapticEffect::Press,
            ButtonAction::Up => HapticEffect::Release,
        };
        Event::Button { id, action, haptic }
    }

    pub(crate) fn direction(id: i32, x: f32, y: f32, haptic: HapticEffect) -> Self {
        Event::Direction { id, x, y, haptic }
    }
}

/// Result of feeding input to a dial.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TouchOutcome {
    /// Observable dial state changed (a redraw would be needed).
    pub changed: bool,
    pub events: Vec<Event>,
}

impl TouchOutcome {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn new(changed: bool, events: Vec<Event>) -> Self {
        Self { changed, events }
    }
}
