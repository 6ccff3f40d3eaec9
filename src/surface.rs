//! Several pads sharing one touchscreen.
//!
//! Each pad owns a normalized viewport. A pointer belongs to the pad whose
//! viewport it lands in and stays there until it lifts, wherever it moves.

use std::collections::HashMap;

use log::debug;

use crate::config::{Profile, ProfileError};
use crate::event::Event;
use crate::geometry::Rect;
use crate::haptics::HapticActuator;
use crate::pad::RadialPad;
use crate::session::PadSession;
use crate::touch::{TouchBatch, TouchSample};

pub struct SurfacePad {
    pub session: PadSession,
    /// `[x, y, width, height]`, fractions of the screen.
    pub viewport: [f32; 4],
    screen_rect: Rect,
}

impl SurfacePad {
    pub fn new(session: PadSession, viewport: [f32; 4]) -> Self {
        Self {
            session,
            viewport,
            screen_rect: Rect::default(),
        }
    }

    pub fn screen_rect(&self) -> Rect {
        self.screen_rect
    }
}

#[derive(Default)]
pub struct Surface {
    pads: Vec<SurfacePad>,
    owners: HashMap<i32, usize>,
}

impl Surface {
    pub fn new(pads: Vec<SurfacePad>) -> Self {
        Self {
            pads,
            owners: HashMap::new(),
        }
    }

    /// Builds every pad of `profile` and lays them out on its screen.
    pub fn from_profile(
        profile: &Profile,
        mut actuator: impl FnMut() -> Box<dyn HapticActuator>,
    ) -> Result<Self, ProfileError> {
        let mut pads = Vec::with_capacity(profile.pads.len());
        for (index, cfg) in profile.pads.iter().enumerate() {
            let pad = RadialPad::new(cfg.clone())
                .map_err(|source| ProfileError::Pad { index, source })?;
            let session = PadSession::new(pad, profile.gestures.clone())
                .with_haptics(profile.haptics.selector(), actuator());
            pads.push(SurfacePad::new(session, cfg.viewport));
        }
        let mut surface = Self::new(pads);
        surface.layout(profile.device.screen_width, profile.device.screen_height);
        Ok(surface)
    }

    pub fn pads(&self) -> &[SurfacePad] {
        &self.pads
    }

    pub fn pads_mut(&mut self) -> &mut [SurfacePad] {
        &mut self.pads
    }

    /// Lays every pad out for a screen of `width` x `height` pixels.
    pub fn layout(&mut self, width: f32, height: f32) {
        for p in &mut self.pads {
            let [x, y, w, h] = p.viewport;
            let rect = Rect::new(x * width, y * height, (x + w) * width, (y + h) * height);
            p.screen_rect = rect;
            p.session.pad_mut().layout(rect);
        }
    }

    fn owner_for(&mut self, sample: &TouchSample) -> Option<usize> {
        if let Some(&owner) = self.owners.get(&sample.pointer_id) {
            return Some(owner);
        }
        if sample.is_lift() {
            return None;
        }
        let owner = self
            .pads
            .iter()
            .position(|p| p.screen_rect.contains(sample.x, sample.y))?;
        debug!("pointer {} -> pad #{owner}", sample.pointer_id);
        self.owners.insert(sample.pointer_id, owner);
        Some(owner)
    }

    /// Splits the batch between pads and returns their events in pad order.
    pub fn process(&mut self, batch: &TouchBatch) -> Vec<Event> {
        let mut split: Vec<Vec<TouchSample>> = vec![Vec::new(); self.pads.len()];
        for sample in &batch.samples {
            let Some(owner) = self.owner_for(sample) else {
                continue;
            };
            split[owner].push(*sample);
            if sample.is_lift() {
                self.owners.remove(&sample.pointer_id);
            }
        }

        self.pads
            .iter_mut()
            .zip(split)
            .flat_map(|(p, samples)| {
                p.session
                    .process(&TouchBatch::new(batch.time_ms, samples))
            })
            .collect()
    }

    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        self.pads
            .iter_mut()
            .flat_map(|p| p.session.tick(now_ms))
            .collect()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.pads
            .iter()
            .filter_map(|p| p.session.next_deadline())
            .min()
    }

    /// Runs `f` on every pad until one recognizes the control id.
    pub fn simulate(
        &mut self,
        mut f: impl FnMut(&mut PadSession) -> Option<Vec<Event>>,
    ) -> Option<Vec<Event>> {
        self.pads.iter_mut().find_map(|p| f(&mut p.session))
    }

    /// Lifts every finger on every pad.
    pub fn reset_touch(&mut self, now_ms: u64) -> Vec<Event> {
        self.owners.clear();
        self.pads
            .iter_mut()
            .flat_map(|p| p.session.reset_touch(now_ms))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ButtonConfig, PadConfig, PrimaryDialConfig, PrimaryButtonsConfig};
    use crate::event::ButtonAction;
    use crate::config::default_profile_text;
    use crate::gestures::TapThresholds;
    use crate::haptics::NoopActuator;
    use crate::touch::TouchAction;

    fn buttons_pad(id: i32) -> PadSession {
        let mut cfg = PadConfig::new(
            4,
            PrimaryDialConfig::PrimaryButtons(PrimaryButtonsConfig {
                buttons: vec![ButtonConfig::new(id)],
                center: None,
                rotation_degrees: 0.0,
                allow_multiple_presses_single_finger: false,
            }),
        );
        cfg.layout.margin = 0.0;
        PadSession::new(RadialPad::new(cfg).unwrap(), TapThresholds::default())
    }

    fn surface() -> Surface {
        let mut s = Surface::new(vec![
            SurfacePad::new(buttons_pad(1), [0.0, 0.0, 0.5, 1.0]),
            SurfacePad::new(buttons_pad(2), [0.5, 0.0, 0.5, 1.0]),
        ]);
        s.layout(200.0, 100.0);
        s
    }

    fn sample(id: i32, x: f32, action: TouchAction) -> TouchSample {
        TouchSample::new(id, x, 50.0, action)
    }

    fn downs(events: &[Event]) -> Vec<i32> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Button {
                    id,
                    action: ButtonAction::Down,
                    ..
                } => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn pointers_go_to_the_pad_they_land_in() {
        let mut s = surface();
        let events = s.process(&TouchBatch::new(
            0,
            vec![sample(0, 50.0, TouchAction::Down), sample(1, 150.0, TouchAction::Down)],
        ));
        assert_eq!(downs(&events), vec![1, 2]);
    }

    #[test]
    fn pointer_keeps_its_pad_while_moving_away() {
        let mut s = surface();
        s.process(&TouchBatch::new(0, vec![sample(0, 50.0, TouchAction::Down)]));
        let events = s.process(&TouchBatch::new(16, vec![sample(0, 150.0, TouchAction::Move)]));
        assert!(downs(&events).is_empty());
        assert_eq!(s.owners.get(&0), Some(&0));

        s.process(&TouchBatch::new(32, vec![sample(0, 150.0, TouchAction::Up)]));
        assert!(s.owners.is_empty());
    }

    #[test]
    fn screen_rects_follow_viewports() {
        let s = surface();
        assert_eq!(s.pads()[1].screen_rect(), Rect::new(100.0, 0.0, 200.0, 100.0));
    }

    #[test]
    fn default_profile_builds_a_surface() {
        let profile = Profile::parse(default_profile_text()).unwrap();
        let s = Surface::from_profile(&profile, || Box::new(NoopActuator)).unwrap();
        assert_eq!(s.pads().len(), 2);
        assert_eq!(s.pads()[0].screen_rect(), Rect::new(0.0, 0.0, 960.0, 1080.0));
        assert!(s.pads().iter().all(|p| p.session.pad().geometry().is_some()));
    }
}
