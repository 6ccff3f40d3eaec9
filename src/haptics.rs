//! Picks one haptic effect per frame and hands it to an actuator.

use log::debug;
use serde::Deserialize;

use crate::event::{Event, HapticEffect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HapticMode {
    #[default]
    Advanced,
    Simple,
    Off,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HapticsConfig {
    pub mode: HapticMode,
    /// Ticks closer than this to the last press are dropped.
    pub short_timeout_ms: u64,
    /// Releases closer than this to the last press are dropped.
    pub long_timeout_ms: u64,
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            mode: HapticMode::Advanced,
            short_timeout_ms: 100,
            long_timeout_ms: 300,
        }
    }
}

impl HapticsConfig {
    pub fn selector(&self) -> Box<dyn HapticSelector> {
        match self.mode {
            HapticMode::Advanced => Box::new(AdvancedHapticSelector::new(
                self.short_timeout_ms,
                self.long_timeout_ms,
            )),
            HapticMode::Simple => Box::new(SimpleHapticSelector),
            HapticMode::Off => Box::new(NoEffectHapticSelector),
        }
    }
}

pub trait HapticSelector {
    fn select(&mut self, events: &[Event], now_ms: u64) -> HapticEffect;
}

pub trait HapticActuator {
    fn perform(&mut self, effect: HapticEffect);
}

fn contains(events: &[Event], effect: HapticEffect) -> bool {
    events.iter().any(|e| e.haptic() == effect)
}

/// Press always wins; ticks and releases right after a press are swallowed
/// so a fast gesture does not buzz several times.
#[derive(Debug, Clone)]
pub struct AdvancedHapticSelector {
    short_timeout_ms: u64,
    long_timeout_ms: u64,
    last_press_ms: Option<u64>,
}

impl AdvancedHapticSelector {
    pub fn new(short_timeout_ms: u64, long_timeout_ms: u64) -> Self {
        Self {
            short_timeout_ms,
            long_timeout_ms,
            last_press_ms: None,
        }
    }

    fn since_press(&self, now_ms: u64) -> u64 {
        self.last_press_ms
            .map_or(u64::MAX, |t| now_ms.saturating_sub(t))
    }
}

impl HapticSelector for AdvancedHapticSelector {
    fn select(&mut self, events: &[Event], now_ms: u64) -> HapticEffect {
        if contains(events, HapticEffect::Press) {
            self.last_press_ms = Some(now_ms);
            HapticEffect::Press
        } else if contains(events, HapticEffect::Tick)
            && self.since_press(now_ms) > self.short_timeout_ms
        {
            self.last_press_ms = Some(now_ms);
            HapticEffect::Tick
        } else if contains(events, HapticEffect::Release)
            && self.since_press(now_ms) > self.long_timeout_ms
        {
            HapticEffect::Release
        } else {
            HapticEffect::None
        }
    }
}

/// Strongest effect of the frame, unthrottled.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleHapticSelector;

impl HapticSelector for SimpleHapticSelector {
    fn select(&mut self, events: &[Event], _now_ms: u64) -> HapticEffect {
        [HapticEffect::Press, HapticEffect::Tick, HapticEffect::Release]
            .into_iter()
            .find(|effect| contains(events, *effect))
            .unwrap_or(HapticEffect::None)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoEffectHapticSelector;

impl HapticSelector for NoEffectHapticSelector {
    fn select(&mut self, _events: &[Event], _now_ms: u64) -> HapticEffect {
        HapticEffect::None
    }
}

/// Writes effects to the log; used where no vibration motor exists.
#[derive(Debug, Default)]
pub struct LogActuator;

impl HapticActuator for LogActuator {
    fn perform(&mut self, effect: HapticEffect) {
        debug!("haptic: {effect:?}");
    }
}

#[derive(Debug, Default)]
pub struct NoopActuator;

impl HapticActuator for NoopActuator {
    fn perform(&mut self, _effect: HapticEffect) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ButtonAction;

    fn with(haptic: HapticEffect) -> Event {
        Event::Direction {
            id: 0,
            x: 1.0,
            y: 0.0,
            haptic,
        }
    }

    #[test]
    fn press_beats_everything() {
        let mut s = AdvancedHapticSelector::new(100, 300);
        let events = [with(HapticEffect::Release), with(HapticEffect::Press)];
        assert_eq!(s.select(&events, 0), HapticEffect::Press);
    }

    #[test]
    fn tick_right_after_press_is_dropped() {
        let mut s = AdvancedHapticSelector::new(100, 300);
        s.select(&[with(HapticEffect::Press)], 1000);
        assert_eq!(s.select(&[with(HapticEffect::Tick)], 1050), HapticEffect::None);
        assert_eq!(s.select(&[with(HapticEffect::Tick)], 1200), HapticEffect::Tick);
    }

    #[test]
    fn release_waits_for_long_timeout() {
        let mut s = AdvancedHapticSelector::new(100, 300);
        let release = [Event::Button {
            id: 1,
            action: ButtonAction::Up,
            haptic: HapticEffect::Release,
        }];
        s.select(&[with(HapticEffect::Press)], 0);
        assert_eq!(s.select(&release, 200), HapticEffect::None);
        assert_eq!(s.select(&release, 301), HapticEffect::Release);
    }

    #[test]
    fn first_release_without_press_fires() {
        let mut s = AdvancedHapticSelector::new(100, 300);
        assert_eq!(s.select(&[with(HapticEffect::Release)], 5), HapticEffect::Release);
    }

    #[test]
    fn simple_and_off_modes() {
        let events = [with(HapticEffect::Tick), with(HapticEffect::Release)];
        assert_eq!(SimpleHapticSelector.select(&events, 0), HapticEffect::Tick);
        assert_eq!(NoEffectHapticSelector.select(&events, 0), HapticEffect::None);
        assert_eq!(SimpleHapticSelector.select(&[], 0), HapticEffect::None);
    }
}
