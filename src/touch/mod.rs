//! Touch input: batches, per-frame pointer tracking and hit-test bounds.

mod bound;
pub mod slots;
mod tracker;

pub use bound::TouchBound;
pub use tracker::TouchTracker;

use serde::Deserialize;

/// One finger in the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerPosition {
    pub pointer_id: i32,
    pub x: f32,
    pub y: f32,
}

impl FingerPosition {
    pub const fn new(pointer_id: i32, x: f32, y: f32) -> Self {
        Self { pointer_id, x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TouchSample {
    #[serde(rename = "id")]
    pub pointer_id: i32,
    pub x: f32,
    pub y: f32,
    pub action: TouchAction,
}

impl TouchSample {
    pub const fn new(pointer_id: i32, x: f32, y: f32, action: TouchAction) -> Self {
        Self {
            pointer_id,
            x,
            y,
            action,
        }
    }

    pub fn is_lift(&self) -> bool {
        matches!(self.action, TouchAction::Up | TouchAction::Cancel)
    }
}

/// Everything the platform delivered for one frame.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TouchBatch {
    #[serde(rename = "t", default)]
    pub time_ms: u64,
    #[serde(rename = "touches", default)]
    pub samples: Vec<TouchSample>,
}

impl TouchBatch {
    pub fn new(time_ms: u64, samples: Vec<TouchSample>) -> Self {
        Self { time_ms, samples }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
