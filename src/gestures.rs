use serde::Deserialize;

use crate::event::GestureKind;
use crate::touch::{TouchAction, TouchBatch};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TapThresholds {
    /// A move past the slop within this window turns the touch into a drag.
    pub tap_timeout_ms: u64,
    /// Touches held this long are not taps.
    pub long_press_timeout_ms: u64,
    /// Max gap between taps of one sequence; also the confirmation delay.
    pub double_tap_timeout_ms: u64,
    pub touch_slop: f32,
    pub double_tap_slop: f32,
}

impl Default for TapThresholds {
    fn default() -> Self {
        Self {
            tap_timeout_ms: 100,
            long_press_timeout_ms: 400,
            double_tap_timeout_ms: 300,
            touch_slop: 16.0,
            double_tap_slop: 100.0,
        }
    }
}

/// A recognized gesture at a position in overlay space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapGesture {
    pub x: f32,
    pub y: f32,
    pub kind: GestureKind,
}

#[derive(Debug, Clone, Copy)]
struct Contact {
    pointer_id: i32,
    time_ms: u64,
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy)]
struct PendingTap {
    due_ms: u64,
    sequence: u64,
    x: f32,
    y: f32,
    taps: u32,
}

/// Counts consecutive taps and reports a sequence once no further tap can
/// extend it.
///
/// The first finger landing while no sequence is running is reported right
/// away as [`GestureKind::FirstTouch`].
#[derive(Debug)]
pub struct MultiTapDetector {
    th: TapThresholds,
    down: Option<Contact>,
    last_tap_up: Option<Contact>,
    taps: u32,
    sequence: u64,
    pending: Vec<PendingTap>,
}

impl MultiTapDetector {
    pub fn new(th: TapThresholds) -> Self {
        Self {
            th,
            down: None,
            last_tap_up: None,
            taps: 0,
            sequence: 0,
            pending: Vec::new(),
        }
    }

    pub fn thresholds(&self) -> &TapThresholds {
        &self.th
    }

    /// Feeds one batch; returns first touches and any sequence confirmed by
    /// the batch's timestamp.
    pub fn update(&mut self, batch: &TouchBatch) -> Vec<TapGesture> {
        let now = batch.time_ms;
        let mut out = self.poll(now);

        for s in &batch.samples {
            if !(s.x.is_finite() && s.y.is_finite()) {
                continue;
            }
            match s.action {
                TouchAction::Down => {
                    self.down = Some(Contact {
                        pointer_id: s.pointer_id,
                        time_ms: now,
                        x: s.x,
                        y: s.y,
                    });
                    if self.taps == 0 {
                        out.push(TapGesture {
                            x: s.x,
                            y: s.y,
                            kind: GestureKind::FirstTouch,
                        });
                    }
                }
                TouchAction::Move => {
                    let Some(down) = self.down else { continue };
                    if down.pointer_id != s.pointer_id {
                        continue;
                    }
                    let early = now.saturating_sub(down.time_ms) < self.th.tap_timeout_ms;
                    let moved = (s.x - down.x).abs() > self.th.touch_slop
                        || (s.y - down.y).abs() > self.th.touch_slop;
                    if early && moved {
                        self.down = None;
                    }
                }
                TouchAction::Up => self.on_up(s.pointer_id, now, s.x, s.y),
                TouchAction::Cancel => {
                    if self.down.is_some_and(|d| d.pointer_id == s.pointer_id) {
                        self.down = None;
                    }
                }
            }
        }
        out
    }

    fn on_up(&mut self, pointer_id: i32, now: u64, x: f32, y: f32) {
        let Some(down) = self.down.filter(|d| d.pointer_id == pointer_id) else {
            return;
        };
        self.down = None;
        if now.saturating_sub(down.time_ms) >= self.th.long_press_timeout_ms {
            return;
        }

        let continues = self.last_tap_up.is_some_and(|last| {
            now.saturating_sub(last.time_ms) < self.th.double_tap_timeout_ms
                && (x - last.x).abs() < self.th.double_tap_slop
                && (y - last.y).abs() < self.th.double_tap_slop
        });
        if continues {
            self.taps += 1;
        } else {
            self.taps = 1;
            self.sequence += 1;
        }
        self.last_tap_up = Some(Contact {
            pointer_id,
            time_ms: now,
            x,
            y,
        });
        self.pending.push(PendingTap {
            due_ms: now + self.th.double_tap_timeout_ms,
            sequence: self.sequence,
            x: down.x,
            y: down.y,
            taps: self.taps,
        });
    }

    /// Confirms taps whose sequence can no longer grow by `now`.
    pub fn poll(&mut self, now: u64) -> Vec<TapGesture> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due_ms > now {
                i += 1;
                continue;
            }
            let tap = self.pending.remove(i);
            let extended = self
                .pending
                .iter()
                .any(|p| p.sequence == tap.sequence && p.taps > tap.taps);
            if extended {
                continue;
            }
            if tap.sequence == self.sequence {
                // sequence over, the next finger starts a new one
                self.taps = 0;
            }
            if let Some(kind) = GestureKind::from_taps(tap.taps) {
                out.push(TapGesture {
                    x: tap.x,
                    y: tap.y,
                    kind,
                });
            }
        }
        out
    }

    /// Earliest time at which [`MultiTapDetector::poll`] may report something.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.iter().map(|p| p.due_ms).min()
    }

    pub fn reset(&mut self) {
        self.down = None;
        self.last_tap_up = None;
        self.taps = 0;
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::touch::TouchSample;

    fn batch(t: u64, id: i32, x: f32, y: f32, action: TouchAction) -> TouchBatch {
        TouchBatch::new(t, vec![TouchSample::new(id, x, y, action)])
    }

    fn kinds(g: &[TapGesture]) -> Vec<GestureKind> {
        g.iter().map(|g| g.kind).collect()
    }

    fn tap(d: &mut MultiTapDetector, t: u64, x: f32) -> Vec<TapGesture> {
        let mut out = d.update(&batch(t, 0, x, 10.0, TouchAction::Down));
        out.extend(d.update(&batch(t + 50, 0, x, 10.0, TouchAction::Up)));
        out
    }

    #[test]
    fn single_tap_confirms_after_timeout() {
        let mut d = MultiTapDetector::new(TapThresholds::default());
        assert_eq!(kinds(&tap(&mut d, 0, 10.0)), vec![GestureKind::FirstTouch]);
        assert!(d.poll(300).is_empty());
        assert_eq!(d.next_deadline(), Some(350));
        let g = d.poll(350);
        assert_eq!(kinds(&g), vec![GestureKind::SingleTap]);
        assert_eq!((g[0].x, g[0].y), (10.0, 10.0));
    }

    #[test]
    fn double_tap_reports_only_the_final_count() {
        let mut d = MultiTapDetector::new(TapThresholds::default());
        tap(&mut d, 0, 10.0);
        assert!(tap(&mut d, 200, 12.0).is_empty());
        assert_eq!(kinds(&d.poll(1000)), vec![GestureKind::DoubleTap]);
    }

    #[test]
    fn triple_tap_then_new_sequence() {
        let mut d = MultiTapDetector::new(TapThresholds::default());
        tap(&mut d, 0, 10.0);
        tap(&mut d, 150, 10.0);
        tap(&mut d, 300, 10.0);
        assert_eq!(kinds(&d.poll(1000)), vec![GestureKind::TripleTap]);
        assert_eq!(kinds(&tap(&mut d, 2000, 10.0)), vec![GestureKind::FirstTouch]);
    }

    #[test]
    fn four_taps_report_nothing() {
        let mut d = MultiTapDetector::new(TapThresholds::default());
        for i in 0..4 {
            tap(&mut d, i * 150, 10.0);
        }
        assert!(d.poll(5000).is_empty());
    }

    #[test]
    fn far_second_tap_restarts_the_count() {
        let mut d = MultiTapDetector::new(TapThresholds::default());
        tap(&mut d, 0, 10.0);
        tap(&mut d, 150, 500.0);
        let g = d.poll(1000);
        assert_eq!(kinds(&g), vec![GestureKind::SingleTap, GestureKind::SingleTap]);
        assert_eq!((g[0].x, g[1].x), (10.0, 500.0));
    }

    #[test]
    fn long_press_is_not_a_tap() {
        let mut d = MultiTapDetector::new(TapThresholds::default());
        d.update(&batch(0, 0, 10.0, 10.0, TouchAction::Down));
        d.update(&batch(600, 0, 10.0, 10.0, TouchAction::Up));
        assert!(d.poll(2000).is_empty());
    }

    #[test]
    fn early_drag_is_not_a_tap() {
        let mut d = MultiTapDetector::new(TapThresholds::default());
        d.update(&batch(0, 0, 10.0, 10.0, TouchAction::Down));
        d.update(&batch(30, 0, 60.0, 10.0, TouchAction::Move));
        d.update(&batch(60, 0, 60.0, 10.0, TouchAction::Up));
        assert!(d.poll(2000).is_empty());
    }
}
