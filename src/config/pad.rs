//! Declarative description of one radial pad.

use serde::Deserialize;

use crate::error::{PadError, Result};
use crate::event::GestureKind;

#[derive(Debug, Clone, Deserialize)]
pub struct ButtonConfig {
    pub id: i32,
    pub label: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    pub content_description: Option<String>,
    #[serde(default)]
    pub supports_gestures: Vec<GestureKind>,
    #[serde(default = "default_true")]
    pub supports_buttons: bool,
}

impl ButtonConfig {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            label: None,
            visible: true,
            content_description: None,
            supports_gestures: Vec::new(),
            supports_buttons: true,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_gestures(mut self, gestures: &[GestureKind]) -> Self {
        self.supports_gestures = gestures.to_vec();
        self
    }

    /// Screen-reader text, falling back to the label.
    pub fn description(&self) -> Option<&str> {
        self.content_description
            .as_deref()
            .or(self.label.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrossConfig {
    pub id: i32,
    #[serde(default = "default_true")]
    pub use_diagonals: bool,
    #[serde(default = "default_dead_zone")]
    pub dead_zone: f32,
    /// Multiplies the pull of diagonal anchors.
    #[serde(default = "default_one")]
    pub diagonal_ratio: f32,
    #[serde(default)]
    pub supports_gestures: Vec<GestureKind>,
    #[serde(default = "default_cross_description")]
    pub content_description: String,
}

impl CrossConfig {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            use_diagonals: true,
            dead_zone: default_dead_zone(),
            diagonal_ratio: 1.0,
            supports_gestures: Vec::new(),
            content_description: default_cross_description(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StickConfig {
    pub id: i32,
    /// Companion button raised by a tap on an active stick.
    pub button_press_id: Option<i32>,
    #[serde(default)]
    pub supports_gestures: Vec<GestureKind>,
    #[serde(default = "default_stick_description")]
    pub content_description: String,
}

impl StickConfig {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            button_press_id: None,
            supports_gestures: Vec::new(),
            content_description: default_stick_description(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrimaryButtonsConfig {
    pub buttons: Vec<ButtonConfig>,
    pub center: Option<ButtonConfig>,
    #[serde(default)]
    pub rotation_degrees: f32,
    /// Let one finger between two adjacent buttons press both.
    #[serde(default)]
    pub allow_multiple_presses_single_finger: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrimaryDialConfig {
    Cross(CrossConfig),
    Stick(StickConfig),
    PrimaryButtons(PrimaryButtonsConfig),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SecondaryDialKind {
    SingleButton(ButtonConfig),
    DoubleButton(ButtonConfig),
    Stick(StickConfig),
    Cross(CrossConfig),
    Empty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecondaryDialConfig {
    /// Socket, counter-clockwise from 3 o'clock.
    pub index: u32,
    #[serde(default = "default_spread")]
    pub spread: u32,
    #[serde(default = "default_one")]
    pub scale: f32,
    /// Extra distance from the primary dial, in primary radii.
    #[serde(default)]
    pub distance: f32,
    /// Added to the pad rotation for this dial only.
    #[serde(default)]
    pub rotation_offset_degrees: f32,
    #[serde(flatten)]
    pub kind: SecondaryDialKind,
}

impl SecondaryDialConfig {
    pub fn new(index: u32, kind: SecondaryDialKind) -> Self {
        Self {
            index,
            spread: 1,
            scale: 1.0,
            distance: 0.0,
            rotation_offset_degrees: 0.0,
            kind,
        }
    }

    pub fn with_spread(mut self, spread: u32) -> Self {
        self.spread = spread;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = distance;
        self
    }
}

/// Placement of the pad inside its viewport.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    /// -1..1, shifts the pad inside the slack left by sizing.
    #[serde(default)]
    pub gravity_x: f32,
    #[serde(default)]
    pub gravity_y: f32,
    /// Pixels, capped so the pad is never cropped.
    #[serde(default)]
    pub offset_x: f32,
    #[serde(default)]
    pub offset_y: f32,
    #[serde(default = "default_margin")]
    pub margin: f32,
    pub max_primary_radius: Option<f32>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            gravity_x: 0.0,
            gravity_y: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            margin: default_margin(),
            max_primary_radius: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PadConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub sockets: u32,
    /// Rotation of the secondary ring, degrees counter-clockwise.
    #[serde(default)]
    pub rotation_degrees: f32,
    /// Normalized screen rectangle `[x, y, width, height]`.
    #[serde(default = "default_viewport")]
    pub viewport: [f32; 4],
    #[serde(default)]
    pub layout: LayoutConfig,
    pub primary: PrimaryDialConfig,
    #[serde(default)]
    pub secondary: Vec<SecondaryDialConfig>,
}

impl PadConfig {
    pub fn new(sockets: u32, primary: PrimaryDialConfig) -> Self {
        Self {
            name: None,
            sockets,
            rotation_degrees: 0.0,
            viewport: default_viewport(),
            layout: LayoutConfig::default(),
            primary,
            secondary: Vec::new(),
        }
    }

    pub fn with_secondary(mut self, dial: SecondaryDialConfig) -> Self {
        self.secondary.push(dial);
        self
    }

    /// Rejects configurations that cannot be laid out.
    pub fn validate(&self) -> Result<()> {
        if self.sockets == 0 {
            return Err(PadError::NoSockets);
        }
        finite("rotation_degrees", self.rotation_degrees)?;
        let l = &self.layout;
        for (what, value) in [
            ("layout.gravity_x", l.gravity_x),
            ("layout.gravity_y", l.gravity_y),
            ("layout.offset_x", l.offset_x),
            ("layout.offset_y", l.offset_y),
            ("layout.margin", l.margin),
        ] {
            finite(what, value)?;
        }
        match &self.primary {
            PrimaryDialConfig::Cross(c) => validate_cross(c)?,
            PrimaryDialConfig::PrimaryButtons(b) => {
                if b.buttons.is_empty() && b.center.is_none() {
                    return Err(PadError::NoButtons);
                }
                finite("primary buttons rotation_degrees", b.rotation_degrees)?;
            }
            PrimaryDialConfig::Stick(_) => {}
        }
        for (position, s) in self.secondary.iter().enumerate() {
            if s.index >= self.sockets {
                return Err(PadError::IndexOutOfRange {
                    position,
                    index: s.index,
                    sockets: self.sockets,
                });
            }
            if s.spread == 0 {
                return Err(PadError::ZeroSpread { position });
            }
            if !(s.scale > 0.0 && s.scale.is_finite()) {
                return Err(PadError::BadScale {
                    position,
                    scale: s.scale,
                });
            }
            finite(&format!("secondary dial #{position}: distance"), s.distance)?;
            finite(
                &format!("secondary dial #{position}: rotation_offset_degrees"),
                s.rotation_offset_degrees,
            )?;
            if let SecondaryDialKind::Cross(c) = &s.kind {
                validate_cross(c)?;
            }
        }
        Ok(())
    }

    /// Every control id the pad can emit, in declaration order.
    pub fn control_ids(&self) -> Vec<i32> {
        let mut ids = Vec::new();
        match &self.primary {
            PrimaryDialConfig::Cross(c) => ids.push(c.id),
            PrimaryDialConfig::Stick(s) => {
                ids.push(s.id);
                ids.extend(s.button_press_id);
            }
            PrimaryDialConfig::PrimaryButtons(b) => {
                ids.extend(b.buttons.iter().map(|b| b.id));
                ids.extend(b.center.as_ref().map(|c| c.id));
            }
        }
        for s in &self.secondary {
            match &s.kind {
                SecondaryDialKind::SingleButton(b) | SecondaryDialKind::DoubleButton(b) => {
                    ids.push(b.id)
                }
                SecondaryDialKind::Stick(st) => {
                    ids.push(st.id);
                    ids.extend(st.button_press_id);
                }
                SecondaryDialKind::Cross(c) => ids.push(c.id),
                SecondaryDialKind::Empty => {}
            }
        }
        ids
    }
}

fn finite(what: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PadError::NotFinite {
            what: what.to_string(),
            value,
        })
    }
}

fn validate_cross(c: &CrossConfig) -> Result<()> {
    if !(0.0..0.5).contains(&c.dead_zone) {
        return Err(PadError::BadDeadZone {
            id: c.id,
            dead_zone: c.dead_zone,
        });
    }
    if !(c.diagonal_ratio > 0.0 && c.diagonal_ratio.is_finite()) {
        return Err(PadError::Invalid(format!(
            "cross dial {}: diagonal_ratio must be positive",
            c.id
        )));
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

fn default_one() -> f32 {
    1.0
}

fn default_spread() -> u32 {
    1
}

fn default_dead_zone() -> f32 {
    0.1
}

fn default_margin() -> f32 {
    16.0
}

fn default_viewport() -> [f32; 4] {
    [0.0, 0.0, 1.0, 1.0]
}

fn default_cross_description() -> String {
    "D-Pad".to_string()
}

fn default_stick_description() -> String {
    "Stick".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAD: &str = r#"
        sockets = 12
        rotation_degrees = 15

        [primary]
        kind = "primary_buttons"
        rotation_degrees = 30
        buttons = [{ id = 96, label = "A" }, { id = 97, label = "B" }]

        [[secondary]]
        kind = "single_button"
        index = 8
        id = 108
        label = "START"

        [[secondary]]
        kind = "stick"
        index = 9
        spread = 2
        scale = 2.2
        distance = 0.1
        id = 1
        button_press_id = 106
        supports_gestures = ["double_tap"]

        [[secondary]]
        kind = "empty"
        index = 4
    "#;

    #[test]
    fn parses_tagged_dials() {
        let cfg: PadConfig = toml::from_str(PAD).unwrap();
        assert_eq!(cfg.sockets, 12);
        assert!(matches!(cfg.primary, PrimaryDialConfig::PrimaryButtons(_)));
        assert_eq!(cfg.secondary.len(), 3);
        assert_eq!(cfg.secondary[1].spread, 2);
        match &cfg.secondary[1].kind {
            SecondaryDialKind::Stick(s) => {
                assert_eq!(s.button_press_id, Some(106));
                assert_eq!(s.supports_gestures, vec![GestureKind::DoubleTap]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(cfg.secondary[2].kind, SecondaryDialKind::Empty));
        cfg.validate().unwrap();
        assert_eq!(cfg.control_ids(), vec![96, 97, 108, 1, 106]);
    }

    #[test]
    fn zero_sockets_is_fatal() {
        let cfg = PadConfig::new(0, PrimaryDialConfig::Cross(CrossConfig::new(0)));
        assert_eq!(cfg.validate(), Err(PadError::NoSockets));
    }

    #[test]
    fn index_outside_ring_is_rejected() {
        let cfg = PadConfig::new(4, PrimaryDialConfig::Cross(CrossConfig::new(0)))
            .with_secondary(SecondaryDialConfig::new(4, SecondaryDialKind::Empty));
        assert!(matches!(
            cfg.validate(),
            Err(PadError::IndexOutOfRange { index: 4, .. })
        ));
    }

    #[test]
    fn nan_placement_is_rejected() {
        let cfg = PadConfig::new(4, PrimaryDialConfig::Cross(CrossConfig::new(0)))
            .with_secondary(
                SecondaryDialConfig::new(1, SecondaryDialKind::Empty).with_distance(f32::NAN),
            );
        assert!(matches!(
            cfg.validate(),
            Err(PadError::NotFinite { ref what, .. }) if what.contains("distance")
        ));

        let mut cfg = PadConfig::new(4, PrimaryDialConfig::Cross(CrossConfig::new(0)));
        cfg.rotation_degrees = f32::INFINITY;
        assert!(matches!(cfg.validate(), Err(PadError::NotFinite { .. })));
    }

    #[test]
    fn nan_from_toml_is_rejected() {
        let cfg: PadConfig = toml::from_str(
            r#"
            sockets = 4
            rotation_degrees = nan
            [primary]
            kind = "cross"
            id = 0
            "#,
        )
        .unwrap();
        assert!(cfg.validate().is_err());
    }
}
