use std::{fs, path::Path};

use serde_json::{Value, json};

use radialpad::config::ProfileStore;
use radialpad::dials::Dial;
use radialpad::surface::Surface;
use radialpad::touch::TouchBound;

use crate::input;

pub fn doctor_report(store: &ProfileStore) -> Value {
    let uinput_ok = Path::new("/dev/uinput").exists();
    let devices: Vec<String> = input::discover_multitouch()
        .into_iter()
        .map(|d| format!("{} ({})", d.name, d.path))
        .collect();
    let active = store.active_name().unwrap_or_default();
    let active_valid = store.load(&active).is_ok();
    json!({
        "uinput_present": uinput_ok,
        "input_group_member": check_in_input_group(),
        "profiles_dir": store.profiles_dir(),
        "active_profile": active,
        "active_profile_valid": active_valid,
        "devices": devices,
        "hints": {
            "udev_rule": "/etc/udev/rules.d/80-uinput.rules",
            "add_user_to_input_group": "sudo usermod -aG input $USER && newgrp input"
        }
    })
}

fn check_in_input_group() -> bool {
    let Ok(s) = fs::read_to_string("/etc/group") else {
        return false;
    };
    let user = whoami::username();
    s.lines()
        .filter(|line| line.starts_with("input:"))
        .any(|line| {
            line.split(':')
                .nth(3)
                .unwrap_or("")
                .split(',')
                .any(|u| u == user)
        })
}

fn bound_json(bound: &TouchBound) -> Value {
    match bound {
        TouchBound::Circle { center, radius } => json!({
            "circle": { "x": center.x, "y": center.y, "radius": radius }
        }),
        TouchBound::Sector(s) => json!({
            "sector": {
                "x": s.center.x,
                "y": s.center.y,
                "min_radius": s.min_radius,
                "max_radius": s.max_radius,
                "min_angle_deg": s.min_angle.to_degrees(),
                "max_angle_deg": s.max_angle.to_degrees(),
            }
        }),
        TouchBound::Empty => Value::Null,
    }
}

/// Where every pad and dial of a laid-out surface ended up, in pixels.
pub fn layout_report(surface: &Surface) -> Value {
    let pads: Vec<Value> = surface
        .pads()
        .iter()
        .map(|p| {
            let pad = p.session.pad();
            let r = p.screen_rect();
            let dials: Vec<Value> = pad
                .dials()
                .zip(pad.bounds())
                .map(|(d, b)| {
                    let bx = d.drawing_box();
                    json!({
                        "box": [bx.left, bx.top, bx.right, bx.bottom],
                        "bound": bound_json(b),
                    })
                })
                .collect();
            let controls: Vec<Value> = pad
                .accessibility_boxes()
                .into_iter()
                .map(|a| {
                    json!({
                        "text": a.text,
                        "rect": [a.rect.left, a.rect.top, a.rect.right, a.rect.bottom],
                    })
                })
                .collect();
            json!({
                "name": pad.name(),
                "screen_rect": [r.left, r.top, r.right, r.bottom],
                "center": pad.geometry().map(|g| [g.center.x, g.center.y]),
                "radius": pad.geometry().map(|g| g.size),
                "dials": dials,
                "accessibility": controls,
            })
        })
        .collect();
    json!({ "pads": pads })
}
