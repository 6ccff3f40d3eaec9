//! Multitouch slot protocol adapter.
//!
//! Collects `ABS_MT_*` updates per slot and turns each `SYN_REPORT` into a
//! [`TouchBatch`] in screen pixels.

use std::time::Instant;

use super::{TouchAction, TouchBatch, TouchSample};

#[derive(Debug, Clone, Default)]
struct SlotState {
    tracking_id: i32, // -1 = inactive
    x_norm: f32,
    y_norm: f32,
    active: bool,
    // tracking id last reported in a batch, -1 if none
    reported_id: i32,
}

#[derive(Debug)]
pub struct SlotTracker {
    slots: Vec<SlotState>,
    cur_slot: i32,
    // normalization
    x_min: i32,
    x_max: i32,
    y_min: i32,
    y_max: i32,
    screen_w: f32,
    screen_h: f32,
    start_instant: Instant,
}

impl Default for SlotTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotTracker {
    pub fn new() -> Self {
        let idle = SlotState {
            tracking_id: -1,
            reported_id: -1,
            ..SlotState::default()
        };
        Self {
            slots: vec![idle; 10],
            cur_slot: 0,
            x_min: 0,
            x_max: 4096,
            y_min: 0,
            y_max: 4096,
            screen_w: 1.0,
            screen_h: 1.0,
            start_instant: Instant::now(),
        }
    }

    pub fn set_norm_ranges(&mut self, x_min: i32, x_max: i32, y_min: i32, y_max: i32) {
        self.x_min = x_min;
        self.x_max = x_max.max(x_min + 1);
        self.y_min = y_min;
        self.y_max = y_max.max(y_min + 1);
    }

    pub fn set_screen_size(&mut self, width: f32, height: f32) {
        self.screen_w = width.max(1.0);
        self.screen_h = height.max(1.0);
    }

    /// Milliseconds since the tracker was created, the clock of every batch.
    pub fn now_ms(&self) -> u64 {
        self.start_instant.elapsed().as_millis() as u64
    }

    pub fn on_slot(&mut self, slot: i32) {
        self.cur_slot = slot.clamp(0, (self.slots.len() as i32) - 1);
    }

    pub fn on_tracking_id(&mut self, tracking_id: i32) {
        let s = &mut self.slots[self.cur_slot as usize];
        if tracking_id < 0 {
            s.tracking_id = -1;
            s.active = false;
        } else {
            // the kernel only resends axes that changed, keep the last position
            s.tracking_id = tracking_id;
            s.active = true;
        }
    }

    pub fn on_pos_x(&mut self, raw: i32) {
        let nx = ((raw - self.x_min) as f32 / (self.x_max - self.x_min) as f32).clamp(0.0, 1.0);
        self.slots[self.cur_slot as usize].x_norm = nx;
    }

    pub fn on_pos_y(&mut self, raw: i32) {
        let ny = ((raw - self.y_min) as f32 / (self.y_max - self.y_min) as f32).clamp(0.0, 1.0);
        self.slots[self.cur_slot as usize].y_norm = ny;
    }

    pub fn on_syn_report(&mut self) -> TouchBatch {
        self.report(self.now_ms())
    }

    fn report(&mut self, time_ms: u64) -> TouchBatch {
        let (w, h) = (self.screen_w, self.screen_h);
        let mut samples = Vec::new();

        for s in self.slots.iter_mut() {
            let x = s.x_norm * w;
            let y = s.y_norm * h;

            // a slot may switch contacts between two reports
            if s.reported_id >= 0 && (!s.active || s.reported_id != s.tracking_id) {
                samples.push(TouchSample::new(s.reported_id, x, y, TouchAction::Up));
                s.reported_id = -1;
            }

            if s.active && s.tracking_id >= 0 {
                let action = if s.reported_id == s.tracking_id {
                    TouchAction::Move
                } else {
                    TouchAction::Down
                };
                samples.push(TouchSample::new(s.tracking_id, x, y, action));
                s.reported_id = s.tracking_id;
            }
        }

        TouchBatch::new(time_ms, samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> SlotTracker {
        let mut t = SlotTracker::new();
        t.set_norm_ranges(0, 1000, 0, 1000);
        t.set_screen_size(200.0, 100.0);
        t
    }

    #[test]
    fn down_move_up_sequence() {
        let mut t = tracker();
        t.on_slot(0);
        t.on_tracking_id(7);
        t.on_pos_x(500);
        t.on_pos_y(250);
        let b = t.report(0);
        assert_eq!(b.samples, vec![TouchSample::new(7, 100.0, 25.0, TouchAction::Down)]);

        t.on_pos_x(1000);
        let b = t.report(1);
        assert_eq!(b.samples[0].action, TouchAction::Move);
        assert_eq!(b.samples[0].x, 200.0);

        t.on_tracking_id(-1);
        let b = t.report(2);
        assert_eq!(b.samples[0].action, TouchAction::Up);
        assert_eq!(b.samples[0].pointer_id, 7);

        assert!(t.report(3).is_empty());
    }

    #[test]
    fn slot_reuse_within_one_report_lifts_old_contact() {
        let mut t = tracker();
        t.on_tracking_id(1);
        t.report(0);
        t.on_tracking_id(-1);
        t.on_tracking_id(2);
        let b = t.report(1);
        let actions: Vec<_> = b.samples.iter().map(|s| (s.pointer_id, s.action)).collect();
        assert_eq!(actions, vec![(1, TouchAction::Up), (2, TouchAction::Down)]);
    }

    #[test]
    fn raw_values_are_clamped() {
        let mut t = tracker();
        t.on_tracking_id(3);
        t.on_pos_x(5000);
        t.on_pos_y(-20);
        let b = t.report(0);
        assert_eq!((b.samples[0].x, b.samples[0].y), (200.0, 0.0));
    }
}
