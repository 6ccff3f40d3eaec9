//! The dial router: one primary dial surrounded by a ring of secondaries.
//!
//! `RadialPad` owns every dial of a pad, lays them out inside a viewport,
//! splits each frame's fingers between them and merges what they emit.

pub mod layout;

use std::collections::HashSet;
use std::fmt;

use log::debug;

use crate::config::{
    LayoutConfig, PadConfig, PrimaryDialConfig, SecondaryDialConfig, SecondaryDialKind,
};
use crate::dials::{
    AccessibilityBox, ButtonDial, CrossDial, Dial, DoubleButtonDial, EmptyDial,
    PrimaryButtonsDial, StickDial,
};
use crate::error::Result;
use crate::event::{Event, GestureKind, TouchOutcome};
use crate::geometry::{Rect, Sector};
use crate::touch::{FingerPosition, TouchBound};
use layout::{PadGeometry, Socket};

/// Maps the pad rotation (radians) to the rotation used for one secondary dial.
pub type RotationRemap = Box<dyn Fn(f32) -> f32>;

struct DialSlot {
    dial: Box<dyn Dial>,
    bound: TouchBound,
    /// Last Button or Direction event, for suppressing repeats.
    last_event: Option<Event>,
}

impl DialSlot {
    fn new(dial: Box<dyn Dial>) -> Self {
        Self {
            dial,
            bound: TouchBound::Empty,
            last_event: None,
        }
    }

    fn relative(&self, fingers: &[FingerPosition]) -> Vec<FingerPosition> {
        let drawing_box = self.dial.drawing_box();
        fingers
            .iter()
            .filter_map(|f| {
                drawing_box
                    .relative(f.x, f.y)
                    .map(|p| FingerPosition::new(f.pointer_id, p.x, p.y))
            })
            .collect()
    }

    /// Appends the outcome's events to `out`, dropping consecutive repeats.
    fn emit(&mut self, outcome: TouchOutcome, out: &mut Vec<Event>) -> bool {
        for event in outcome.events {
            if matches!(event, Event::Gesture { .. }) {
                out.push(event);
                continue;
            }
            if self.last_event == Some(event) {
                continue;
            }
            self.last_event = Some(event);
            out.push(event);
        }
        outcome.changed
    }
}

struct SecondarySocket {
    config: SecondaryDialConfig,
    remap: RotationRemap,
}

impl SecondarySocket {
    fn socket(&self, pad_rotation: f32) -> Socket {
        Socket {
            index: self.config.index,
            spread: self.config.spread,
            scale: self.config.scale,
            distance: self.config.distance,
            rotation: (self.remap)(pad_rotation),
        }
    }
}

pub struct RadialPad {
    name: String,
    sockets: u32,
    rotation: f32,
    layout_config: LayoutConfig,
    /// Primary first, then secondaries in declaration order.
    slots: Vec<DialSlot>,
    secondary: Vec<SecondarySocket>,
    viewport: Option<Rect>,
    geometry: Option<PadGeometry>,
    needs_redraw: bool,
}

impl fmt::Debug for RadialPad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RadialPad")
            .field("name", &self.name)
            .field("sockets", &self.sockets)
            .field("dials", &self.slots.len())
            .field("geometry", &self.geometry)
            .finish()
    }
}

impl RadialPad {
    pub fn new(config: PadConfig) -> Result<Self> {
        config.validate()?;

        let primary: Box<dyn Dial> = match config.primary {
            PrimaryDialConfig::Cross(c) => Box::new(CrossDial::new(c)),
            PrimaryDialConfig::Stick(s) => Box::new(StickDial::new(s)),
            PrimaryDialConfig::PrimaryButtons(b) => Box::new(PrimaryButtonsDial::new(b)),
        };

        let mut slots = vec![DialSlot::new(primary)];
        let mut secondary = Vec::with_capacity(config.secondary.len());
        for s in config.secondary {
            let dial: Box<dyn Dial> = match &s.kind {
                SecondaryDialKind::SingleButton(b) => Box::new(ButtonDial::new(b.clone())),
                SecondaryDialKind::DoubleButton(b) => Box::new(DoubleButtonDial::new(b.clone())),
                SecondaryDialKind::Stick(st) => Box::new(StickDial::new(st.clone())),
                SecondaryDialKind::Cross(c) => Box::new(CrossDial::new(c.clone())),
                SecondaryDialKind::Empty => Box::new(EmptyDial::new()),
            };
            slots.push(DialSlot::new(dial));

            let offset = s.rotation_offset_degrees.to_radians();
            secondary.push(SecondarySocket {
                config: s,
                remap: Box::new(move |rotation| rotation + offset),
            });
        }

        let name = config.name.unwrap_or_else(|| "pad".to_string());
        debug!(
            "pad '{}': {} sockets, {} secondary dials",
            name,
            config.sockets,
            secondary.len()
        );

        Ok(Self {
            name,
            sockets: config.sockets,
            rotation: config.rotation_degrees.to_radians(),
            layout_config: config.layout,
            slots,
            secondary,
            viewport: None,
            geometry: None,
            needs_redraw: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Layout from the last call to [`RadialPad::layout`].
    pub fn geometry(&self) -> Option<&PadGeometry> {
        self.geometry.as_ref()
    }

    pub fn dials(&self) -> impl Iterator<Item = &dyn Dial> {
        self.slots.iter().map(|s| s.dial.as_ref())
    }

    pub fn bounds(&self) -> impl Iterator<Item = &TouchBound> {
        self.slots.iter().map(|s| &s.bound)
    }

    /// True when some dial changed state since the last call.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Replaces how the pad rotation maps to the rotation of the secondary
    /// dial at `position`. Returns false for an unknown position.
    pub fn set_rotation_remap(&mut self, position: usize, remap: RotationRemap) -> bool {
        let Some(socket) = self.secondary.get_mut(position) else {
            return false;
        };
        socket.remap = remap;
        if let Some(viewport) = self.viewport {
            self.layout(viewport);
        }
        true
    }

    /// Measures every dial inside `viewport` (overlay pixels).
    pub fn layout(&mut self, viewport: Rect) {
        let sockets: Vec<Socket> = self
            .secondary
            .iter()
            .map(|s| s.socket(self.rotation))
            .collect();

        let primary_extent = Rect::new(-1.0, -1.0, 1.0, 1.0);
        let boxes: Vec<Rect> = sockets.iter().map(|s| s.extent(self.sockets)).collect();
        let extent = Rect::merge(boxes.iter().chain([&primary_extent])).unwrap_or(primary_extent);

        let geometry = layout::fit(viewport, extent, &self.layout_config);
        debug!(
            "pad '{}': radius {:.1} at ({:.1}, {:.1})",
            self.name, geometry.size, geometry.center.x, geometry.center.y
        );

        let (primary, secondaries) = self.slots.split_at_mut(1);
        primary[0].dial.measure(geometry.primary_box(), None);
        primary[0].bound = TouchBound::Circle {
            center: geometry.center,
            radius: geometry.size,
        };

        for ((slot, socket), secondary) in secondaries.iter_mut().zip(&sockets).zip(&self.secondary) {
            let rect = geometry.place(socket.unit_box(self.sockets));
            let sector: Sector = socket.sector(self.sockets, geometry.center, geometry.size);
            slot.dial.measure(rect, Some(sector));
            slot.bound = match secondary.config.kind {
                SecondaryDialKind::Empty => TouchBound::Empty,
                _ => TouchBound::Sector(sector),
            };
        }

        self.viewport = Some(viewport);
        self.geometry = Some(geometry);
        self.needs_redraw = true;
    }

    /// Routes the current frame's fingers (overlay space) to the dials.
    pub fn dispatch_touch(&mut self, fingers: &[FingerPosition]) -> Vec<Event> {
        let fingers: Vec<FingerPosition> = fingers
            .iter()
            .copied()
            .filter(|f| f.x.is_finite() && f.y.is_finite())
            .collect();

        let mut claimed: HashSet<i32> = self
            .slots
            .iter()
            .flat_map(|s| s.dial.tracked_pointer_ids().iter().copied())
            .collect();

        let mut events = Vec::new();
        for slot in &mut self.slots {
            let tracked = slot.dial.tracked_pointer_ids();
            let assigned: Vec<FingerPosition> = if tracked.is_empty() {
                fingers
                    .iter()
                    .copied()
                    .filter(|f| !claimed.contains(&f.pointer_id) && slot.bound.contains(f.x, f.y))
                    .collect()
            } else {
                fingers
                    .iter()
                    .copied()
                    .filter(|f| tracked.contains(&f.pointer_id))
                    .collect()
            };

            let relative = slot.relative(&assigned);
            let outcome = slot.dial.touch(&relative);
            // fingers used this frame are spent, even by dials that keep no ids
            claimed.extend(assigned.iter().map(|f| f.pointer_id));
            claimed.extend(slot.dial.tracked_pointer_ids().iter().copied());
            self.needs_redraw |= slot.emit(outcome, &mut events);
        }
        events
    }

    /// Sends a confirmed gesture at (x, y) to the first dial containing it.
    pub fn dispatch_gesture(&mut self, x: f32, y: f32, kind: GestureKind) -> Vec<Event> {
        let mut events = Vec::new();
        let Some(slot) = self.slots.iter_mut().find(|s| s.bound.contains(x, y)) else {
            return events;
        };
        if let Some(p) = slot.dial.drawing_box().relative(x, y) {
            let outcome = slot.dial.gesture(p.x, p.y, kind);
            self.needs_redraw |= slot.emit(outcome, &mut events);
        }
        events
    }

    pub fn accessibility_boxes(&self) -> Vec<AccessibilityBox> {
        self.slots
            .iter()
            .flat_map(|s| s.dial.accessibility_boxes())
            .collect()
    }

    /// Drives the dial owning `id` as if a finger were at (x, y), relative
    /// to its box. Touch input on that dial is ignored until cleared.
    pub fn simulate_motion(&mut self, id: i32, x: f32, y: f32) -> Option<Vec<Event>> {
        self.simulate(id, "motion", |d| d.simulate_motion(id, x, y))
    }

    pub fn clear_simulated_motion(&mut self, id: i32) -> Option<Vec<Event>> {
        self.simulate(id, "clear motion", |d| d.clear_simulated_motion(id))
    }

    pub fn simulate_key_press(&mut self, id: i32, pressed: bool) -> Option<Vec<Event>> {
        self.simulate(id, "key press", |d| d.simulate_key_press(id, pressed))
    }

    pub fn clear_simulated_key_press(&mut self, id: i32) -> Option<Vec<Event>> {
        self.simulate(id, "clear key press", |d| d.clear_simulated_key_press(id))
    }

    fn simulate(
        &mut self,
        id: i32,
        what: &str,
        mut apply: impl FnMut(&mut dyn Dial) -> Option<TouchOutcome>,
    ) -> Option<Vec<Event>> {
        let mut events = Vec::new();
        let mut matched = false;
        for slot in &mut self.slots {
            if let Some(outcome) = apply(slot.dial.as_mut()) {
                matched = true;
                self.needs_redraw |= slot.emit(outcome, &mut events);
            }
        }
        if !matched {
            debug!("pad '{}': simulated {what} for unknown id {id}", self.name);
            return None;
        }
        Some(events)
    }
}
