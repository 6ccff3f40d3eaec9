//! Radial touch gamepad: turns multitouch frames into controller events.
//!
//! A [`pad::RadialPad`] holds one primary dial surrounded by a ring of
//! secondary dials. [`session::PadSession`] adds tap recognition and haptic
//! feedback on top, and [`surface::Surface`] splits one touchscreen between
//! several pads.

pub mod config;
pub mod dials;
pub mod error;
pub mod event;
pub mod geometry;
pub mod gestures;
pub mod haptics;
pub mod pad;
pub mod session;
pub mod surface;
pub mod touch;

pub use config::{PadConfig, Profile, ProfileError};
pub use error::PadError;
pub use event::{ButtonAction, Event, GestureKind, HapticEffect};
pub use pad::RadialPad;
pub use session::PadSession;
pub use surface::{Surface, SurfacePad};
pub use touch::{TouchAction, TouchBatch, TouchSample};
