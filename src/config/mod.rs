//! Profiles: everything needed to run a set of pads on one device.

mod bindings;
mod pad;
mod store;

pub use bindings::{Binding, Bindings, GamepadButton};
pub use pad::{
    ButtonConfig, CrossConfig, LayoutConfig, PadConfig, PrimaryButtonsConfig, PrimaryDialConfig,
    SecondaryDialConfig, SecondaryDialKind, StickConfig,
};
pub use store::{ProfileStore, default_profile_text};

use std::collections::{HashMap, HashSet};

use log::warn;
use serde::Deserialize;
use thiserror::Error;

use crate::error::PadError;
use crate::gestures::TapThresholds;
use crate::haptics::HapticsConfig;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("invalid profile: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("profile declares no pads")]
    NoPads,

    #[error("pad #{index}: {source}")]
    Pad {
        index: usize,
        #[source]
        source: PadError,
    },

    #[error("pad #{index}: viewport {viewport:?} is outside the screen")]
    Viewport { index: usize, viewport: [f32; 4] },

    #[error("device: {0}")]
    Device(String),

    #[error("binding '{key}': {reason}")]
    Binding { key: String, reason: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// `/dev/input/eventN`; the first multitouch device when unset.
    pub path: Option<String>,
    /// Raw ABS_MT_POSITION_X range reported by the panel.
    pub x_range: [i32; 2],
    pub y_range: [i32; 2],
    pub screen_width: f32,
    pub screen_height: f32,
    /// Take exclusive access so the desktop does not see the touches.
    pub grab: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: None,
            x_range: [0, 4095],
            y_range: [0, 4095],
            screen_width: 1920.0,
            screen_height: 1080.0,
            grab: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub haptics: HapticsConfig,
    #[serde(default)]
    pub gestures: TapThresholds,
    #[serde(default)]
    pub pads: Vec<PadConfig>,

    #[serde(default, deserialize_with = "bindings::deserialize_bindings_flat")]
    pub bindings: HashMap<String, String>,
}

impl Profile {
    /// Parses and validates a profile.
    pub fn parse(text: &str) -> Result<Self, ProfileError> {
        let profile: Profile = toml::from_str(text)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.pads.is_empty() {
            return Err(ProfileError::NoPads);
        }

        let d = &self.device;
        if d.x_range[0] >= d.x_range[1] || d.y_range[0] >= d.y_range[1] {
            return Err(ProfileError::Device("axis ranges must be increasing".into()));
        }
        if !(d.screen_width > 0.0 && d.screen_height > 0.0) {
            return Err(ProfileError::Device("screen size must be positive".into()));
        }

        let mut seen = HashSet::new();
        for (index, pad) in self.pads.iter().enumerate() {
            pad.validate()
                .map_err(|source| ProfileError::Pad { index, source })?;

            let [x, y, w, h] = pad.viewport;
            let inside = x >= 0.0 && y >= 0.0 && w > 0.0 && h > 0.0 && x + w <= 1.0 && y + h <= 1.0;
            if !inside {
                return Err(ProfileError::Viewport {
                    index,
                    viewport: pad.viewport,
                });
            }

            for id in pad.control_ids() {
                if !seen.insert(id) {
                    warn!("control id {id} is declared more than once");
                }
            }
        }

        self.resolve_bindings().map(|_| ())
    }

    pub fn control_ids(&self) -> HashSet<i32> {
        self.pads.iter().flat_map(|p| p.control_ids()).collect()
    }

    pub fn resolve_bindings(&self) -> Result<Bindings, ProfileError> {
        Bindings::resolve(&self.bindings, &self.control_ids())
    }

    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.meta.name.as_deref().unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_valid() {
        let p = Profile::parse(default_profile_text()).unwrap();
        assert!(!p.pads.is_empty());
        assert!(!p.resolve_bindings().unwrap().controls.is_empty());
    }

    #[test]
    fn profile_without_pads_is_rejected() {
        assert!(matches!(
            Profile::parse("[meta]\nname = \"x\"\n"),
            Err(ProfileError::NoPads)
        ));
    }

    #[test]
    fn pad_errors_carry_the_pad_index() {
        let text = r#"
            [[pads]]
            sockets = 0
            [pads.primary]
            kind = "cross"
            id = 0
        "#;
        match Profile::parse(text) {
            Err(ProfileError::Pad { index: 0, source }) => assert_eq!(source, PadError::NoSockets),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn viewport_must_fit_the_screen() {
        let text = r#"
            [[pads]]
            sockets = 4
            viewport = [0.6, 0.0, 0.5, 1.0]
            [pads.primary]
            kind = "cross"
            id = 0
        "#;
        assert!(matches!(
            Profile::parse(text),
            Err(ProfileError::Viewport { index: 0, .. })
        ));
    }

    #[test]
    fn bindings_must_name_declared_controls() {
        let text = r#"
            [[pads]]
            sockets = 4
            [pads.primary]
            kind = "cross"
            id = 0

            [bindings]
            5 = "dpad"
        "#;
        assert!(matches!(
            Profile::parse(text),
            Err(ProfileError::Binding { .. })
        ));
    }
}
