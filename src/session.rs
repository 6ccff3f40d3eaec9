use crate::event::{Event, HapticEffect};
use crate::gestures::{MultiTapDetector, TapGesture, TapThresholds};
use crate::haptics::{HapticActuator, HapticSelector, NoopActuator, SimpleHapticSelector};
use crate::pad::RadialPad;
use crate::touch::{TouchBatch, TouchTracker};

/// One pad's whole input path: tracking, routing, taps and haptics.
pub struct PadSession {
    pad: RadialPad,
    tracker: TouchTracker,
    taps: MultiTapDetector,
    selector: Box<dyn HapticSelector>,
    actuator: Box<dyn HapticActuator>,
    last_time_ms: u64,
}

impl PadSession {
    pub fn new(pad: RadialPad, thresholds: TapThresholds) -> Self {
        Self {
            pad,
            tracker: TouchTracker::new(),
            taps: MultiTapDetector::new(thresholds),
            selector: Box::new(SimpleHapticSelector),
            actuator: Box::new(NoopActuator),
            last_time_ms: 0,
        }
    }

    pub fn with_haptics(
        mut self,
        selector: Box<dyn HapticSelector>,
        actuator: Box<dyn HapticActuator>,
    ) -> Self {
        self.selector = selector;
        self.actuator = actuator;
        self
    }

    pub fn pad(&self) -> &RadialPad {
        &self.pad
    }

    pub fn pad_mut(&mut self) -> &mut RadialPad {
        &mut self.pad
    }

    /// Processes one frame and returns every event it produced, in order:
    /// gestures first, then touch routing.
    pub fn process(&mut self, batch: &TouchBatch) -> Vec<Event> {
        self.last_time_ms = self.last_time_ms.max(batch.time_ms);

        let gestures = self.taps.update(batch);
        let mut events = self.dispatch_gestures(&gestures);

        let fingers = self.tracker.update(batch);
        events.extend(self.pad.dispatch_touch(&fingers));

        self.feedback(&events, batch.time_ms);
        events
    }

    /// Confirms pending taps when no input arrives.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        self.last_time_ms = self.last_time_ms.max(now_ms);
        let gestures = self.taps.poll(now_ms);
        let events = self.dispatch_gestures(&gestures);
        self.feedback(&events, now_ms);
        events
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.taps.next_deadline()
    }

    pub fn simulate_motion(&mut self, id: i32, x: f32, y: f32) -> Option<Vec<Event>> {
        let events = self.pad.simulate_motion(id, x, y)?;
        self.feedback(&events, self.last_time_ms);
        Some(events)
    }

    pub fn clear_simulated_motion(&mut self, id: i32) -> Option<Vec<Event>> {
        let events = self.pad.clear_simulated_motion(id)?;
        self.feedback(&events, self.last_time_ms);
        Some(events)
    }

    pub fn simulate_key_press(&mut self, id: i32, pressed: bool) -> Option<Vec<Event>> {
        let events = self.pad.simulate_key_press(id, pressed)?;
        self.feedback(&events, self.last_time_ms);
        Some(events)
    }

    pub fn clear_simulated_key_press(&mut self, id: i32) -> Option<Vec<Event>> {
        let events = self.pad.clear_simulated_key_press(id)?;
        self.feedback(&events, self.last_time_ms);
        Some(events)
    }

    /// Forgets every finger, e.g. after the input device was lost.
    pub fn reset_touch(&mut self, now_ms: u64) -> Vec<Event> {
        self.tracker.reset();
        self.taps.reset();
        let events = self.pad.dispatch_touch(&[]);
        self.feedback(&events, now_ms);
        events
    }

    fn dispatch_gestures(&mut self, gestures: &[TapGesture]) -> Vec<Event> {
        gestures
            .iter()
            .flat_map(|g| self.pad.dispatch_gesture(g.x, g.y, g.kind))
            .collect()
    }

    fn feedback(&mut self, events: &[Event], now_ms: u64) {
        if events.is_empty() {
            return;
        }
        let effect = self.selector.select(events, now_ms);
        if effect != HapticEffect::None {
            self.actuator.perform(effect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PadConfig, PrimaryDialConfig, StickConfig};
    use crate::event::{ButtonAction, GestureKind};
    use crate::geometry::Rect;
    use crate::touch::{TouchAction, TouchSample};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<HapticEffect>>>);

    impl HapticActuator for Recorder {
        fn perform(&mut self, effect: HapticEffect) {
            self.0.borrow_mut().push(effect);
        }
    }

    fn stick_session() -> (PadSession, Rc<RefCell<Vec<HapticEffect>>>) {
        let mut stick = StickConfig::new(3);
        stick.button_press_id = Some(30);
        let mut cfg = PadConfig::new(4, PrimaryDialConfig::Stick(stick));
        cfg.layout.margin = 0.0;
        let mut pad = RadialPad::new(cfg).unwrap();
        pad.layout(Rect::new(0.0, 0.0, 200.0, 200.0));

        let log = Rc::new(RefCell::new(Vec::new()));
        let session = PadSession::new(pad, TapThresholds::default())
            .with_haptics(Box::new(SimpleHapticSelector), Box::new(Recorder(log.clone())));
        (session, log)
    }

    fn batch(t: u64, action: TouchAction, x: f32) -> TouchBatch {
        TouchBatch::new(t, vec![TouchSample::new(0, x, 100.0, action)])
    }

    #[test]
    fn drag_produces_directions_and_a_press_haptic() {
        let (mut s, log) = stick_session();
        let events = s.process(&batch(0, TouchAction::Down, 100.0));
        assert!(matches!(
            events[0],
            Event::Direction {
                id: 3,
                haptic: HapticEffect::Press,
                ..
            }
        ));
        let events = s.process(&batch(16, TouchAction::Move, 140.0));
        match events.as_slice() {
            [Event::Direction { x, .. }] => assert!((x - 0.4).abs() < 1e-3),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(log.borrow().as_slice(), &[HapticEffect::Press]);
    }

    #[test]
    fn tap_on_held_stick_presses_companion_button() {
        let (mut s, _) = stick_session();
        // first finger holds the stick, second finger taps elsewhere on it
        s.process(&batch(0, TouchAction::Down, 100.0));
        s.process(&TouchBatch::new(
            500,
            vec![TouchSample::new(1, 110.0, 100.0, TouchAction::Down)],
        ));
        s.process(&TouchBatch::new(
            550,
            vec![TouchSample::new(1, 110.0, 100.0, TouchAction::Up)],
        ));
        let events = s.tick(900);
        assert_eq!(
            events,
            vec![Event::Button {
                id: 30,
                action: ButtonAction::Down,
                haptic: HapticEffect::Press
            }]
        );

        let events = s.process(&batch(1000, TouchAction::Up, 100.0));
        assert!(events.contains(&Event::Button {
            id: 30,
            action: ButtonAction::Up,
            haptic: HapticEffect::Release
        }));
    }

    #[test]
    fn first_touch_reaches_gesture_enabled_dials() {
        let mut stick = StickConfig::new(3);
        stick.supports_gestures = vec![GestureKind::FirstTouch];
        let mut cfg = PadConfig::new(4, PrimaryDialConfig::Stick(stick));
        cfg.layout.margin = 0.0;
        let mut pad = RadialPad::new(cfg).unwrap();
        pad.layout(Rect::new(0.0, 0.0, 200.0, 200.0));
        let mut s = PadSession::new(pad, TapThresholds::default());

        let events = s.process(&batch(0, TouchAction::Down, 100.0));
        assert_eq!(
            events[0],
            Event::Gesture {
                id: 3,
                kind: GestureKind::FirstTouch
            }
        );
    }
}
