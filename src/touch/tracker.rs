use super::{FingerPosition, TouchAction, TouchBatch};

/// Keeps the set of fingers currently down, ordered by first appearance.
#[derive(Debug, Default, Clone)]
pub struct TouchTracker {
    positions: Vec<FingerPosition>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, batch: &TouchBatch) -> Vec<FingerPosition> {
        for s in &batch.samples {
            match s.action {
                TouchAction::Down | TouchAction::Move => {
                    if s.x.is_finite() && s.y.is_finite() {
                        self.upsert(FingerPosition::new(s.pointer_id, s.x, s.y));
                    } else {
                        self.remove(s.pointer_id);
                    }
                }
                TouchAction::Up | TouchAction::Cancel => self.remove(s.pointer_id),
            }
        }
        self.positions.clone()
    }

    pub fn positions(&self) -> &[FingerPosition] {
        &self.positions
    }

    pub fn reset(&mut self) {
        self.positions.clear();
    }

    fn upsert(&mut self, finger: FingerPosition) {
        match self
            .positions
            .iter_mut()
            .find(|p| p.pointer_id == finger.pointer_id)
        {
            Some(p) => *p = finger,
            None => self.positions.push(finger),
        }
    }

    fn remove(&mut self, pointer_id: i32) {
        self.positions.retain(|p| p.pointer_id != pointer_id);
    }
}
