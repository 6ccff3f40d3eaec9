//! What each pad control drives on the virtual gamepad.
//!
//! Keys are control ids (`"96"`) or gesture keys (`gesture.96.double_tap`),
//! values are targets such as `button:south`, `dpad` or `stick:left`.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer};

use super::ProfileError;
use crate::event::GestureKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadButton {
    South,
    East,
    North,
    West,
    Tl,
    Tr,
    Tl2,
    Tr2,
    Select,
    Start,
    Mode,
    ThumbL,
    ThumbR,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
}

impl GamepadButton {
    pub const ALL: [GamepadButton; 17] = [
        Self::South,
        Self::East,
        Self::North,
        Self::West,
        Self::Tl,
        Self::Tr,
        Self::Tl2,
        Self::Tr2,
        Self::Select,
        Self::Start,
        Self::Mode,
        Self::ThumbL,
        Self::ThumbR,
        Self::DpadUp,
        Self::DpadDown,
        Self::DpadLeft,
        Self::DpadRight,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        let b = match name.to_ascii_lowercase().as_str() {
            "south" | "a" => Self::South,
            "east" | "b" => Self::East,
            "north" | "x" => Self::North,
            "west" | "y" => Self::West,
            "tl" | "l1" => Self::Tl,
            "tr" | "r1" => Self::Tr,
            "tl2" | "l2" => Self::Tl2,
            "tr2" | "r2" => Self::Tr2,
            "select" => Self::Select,
            "start" => Self::Start,
            "mode" => Self::Mode,
            "thumbl" | "l3" => Self::ThumbL,
            "thumbr" | "r3" => Self::ThumbR,
            "dpad_up" => Self::DpadUp,
            "dpad_down" => Self::DpadDown,
            "dpad_left" => Self::DpadLeft,
            "dpad_right" => Self::DpadRight,
            _ => return None,
        };
        Some(b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Button(GamepadButton),
    /// Direction vector snapped onto the four d-pad buttons.
    Dpad,
    LeftStick,
    RightStick,
}

impl Binding {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "dpad" => Some(Self::Dpad),
            "stick:left" => Some(Self::LeftStick),
            "stick:right" => Some(Self::RightStick),
            v => v
                .strip_prefix("button:")
                .and_then(GamepadButton::parse)
                .map(Self::Button),
        }
    }
}

/// Bindings after validation against the profile's pads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    pub controls: HashMap<i32, Binding>,
    pub gestures: HashMap<(i32, GestureKind), Binding>,
}

impl Bindings {
    pub fn resolve(
        raw: &HashMap<String, String>,
        known_ids: &HashSet<i32>,
    ) -> Result<Self, ProfileError> {
        let mut out = Bindings::default();
        for (key, value) in raw {
            let bad = |reason: &str| ProfileError::Binding {
                key: key.clone(),
                reason: reason.to_string(),
            };

            let target = Binding::parse(value)
                .ok_or_else(|| bad(&format!("unknown target '{value}'")))?;

            if let Some(rest) = key.strip_prefix("gesture.") {
                let (id, kind) = rest
                    .split_once('.')
                    .ok_or_else(|| bad("expected gesture.<id>.<kind>"))?;
                let id: i32 = id.parse().map_err(|_| bad("control id must be an integer"))?;
                let kind = GestureKind::parse(kind)
                    .ok_or_else(|| bad(&format!("unknown gesture '{kind}'")))?;
                if !known_ids.contains(&id) {
                    return Err(bad("no pad declares this control id"));
                }
                if !matches!(target, Binding::Button(_)) {
                    return Err(bad("gestures can only pulse a button"));
                }
                out.gestures.insert((id, kind), target);
            } else {
                let id: i32 = key
                    .parse()
                    .map_err(|_| bad("expected a control id or gesture.<id>.<kind>"))?;
                if !known_ids.contains(&id) {
                    return Err(bad("no pad declares this control id"));
                }
                out.controls.insert(id, target);
            }
        }
        Ok(out)
    }
}

// nested or dotted tables collapse into "a.b" -> "value"
pub(crate) fn deserialize_bindings_flat<'de, D>(
    de: D,
) -> std::result::Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let val = toml::Value::deserialize(de)?;
    let table = match val {
        toml::Value::Table(t) => t,
        other => {
            return Err(serde::de::Error::custom(format!(
                "bindings must be a table, got {}",
                other.type_str()
            )));
        }
    };

    let mut out = HashMap::new();
    flatten_table("", &table, &mut out).map_err(serde::de::Error::custom)?;
    Ok(out)
}

fn flatten_table(
    prefix: &str,
    table: &toml::value::Table,
    out: &mut HashMap<String, String>,
) -> std::result::Result<(), String> {
    for (k, v) in table {
        let key = if prefix.is_empty() {
            k.clone()
        } else {
            format!("{prefix}.{k}")
        };
        match v {
            toml::Value::String(s) => {
                out.insert(key, s.clone());
            }
            toml::Value::Table(sub) => flatten_table(&key, sub, out)?,
            other => {
                return Err(format!(
                    "binding '{key}' value must be a string, got {}",
                    other.type_str()
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn known() -> HashSet<i32> {
        [0, 1, 96].into_iter().collect()
    }

    #[test]
    fn parses_targets() {
        assert_eq!(
            Binding::parse("button:A"),
            Some(Binding::Button(GamepadButton::South))
        );
        assert_eq!(Binding::parse("stick:right"), Some(Binding::RightStick));
        assert_eq!(Binding::parse("dpad"), Some(Binding::Dpad));
        assert_eq!(Binding::parse("key:ctrl"), None);
    }

    #[test]
    fn resolves_controls_and_gestures() {
        let b = Bindings::resolve(
            &raw(&[
                ("0", "dpad"),
                ("96", "button:south"),
                ("gesture.1.double_tap", "button:thumbl"),
            ]),
            &known(),
        )
        .unwrap();
        assert_eq!(b.controls[&0], Binding::Dpad);
        assert_eq!(
            b.gestures[&(1, GestureKind::DoubleTap)],
            Binding::Button(GamepadButton::ThumbL)
        );
    }

    #[test]
    fn rejects_unknown_ids_and_gesture_sticks() {
        assert!(matches!(
            Bindings::resolve(&raw(&[("7", "dpad")]), &known()),
            Err(ProfileError::Binding { .. })
        ));
        assert!(Bindings::resolve(&raw(&[("gesture.0.single_tap", "dpad")]), &known()).is_err());
        assert!(Bindings::resolve(&raw(&[("gesture.0.swipe", "button:a")]), &known()).is_err());
    }

    #[test]
    fn flattens_nested_tables() {
        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(deserialize_with = "deserialize_bindings_flat")]
            bindings: HashMap<String, String>,
        }
        let w: Wrapper = toml::from_str(
            r#"
            [bindings]
            96 = "button:a"
            [bindings.gesture.1]
            single_tap = "button:start"
            "#,
        )
        .unwrap();
        assert_eq!(w.bindings["96"], "button:a");
        assert_eq!(w.bindings["gesture.1.single_tap"], "button:start");
    }
}
