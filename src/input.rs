//! Touch device discovery (evdev 0.13.2 compatible)

use anyhow::{Context, Result, anyhow};
use evdev::{AbsoluteAxisCode, Device, EventType};
use log::info;

#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: String,
    pub name: String,
}

fn is_multitouch(dev: &Device) -> bool {
    let has_abs = dev.supported_events().contains(EventType::ABSOLUTE);
    let has_mt = dev.supported_absolute_axes().is_some_and(|a| {
        a.contains(AbsoluteAxisCode::ABS_MT_SLOT)
            && a.contains(AbsoluteAxisCode::ABS_MT_POSITION_X)
            && a.contains(AbsoluteAxisCode::ABS_MT_POSITION_Y)
    });
    has_abs && has_mt
}

pub fn discover_multitouch() -> Vec<DeviceInfo> {
    let mut out = vec![];
    if let Ok(rd) = std::fs::read_dir("/dev/input") {
        for e in rd.flatten() {
            let p = e.path();
            let is_event_node = p
                .file_name()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s.starts_with("event"));
            if !is_event_node {
                continue;
            }
            if let Ok(dev) = Device::open(&p) {
                if is_multitouch(&dev) {
                    out.push(DeviceInfo {
                        path: p.display().to_string(),
                        name: dev.name().unwrap_or("unknown").to_string(),
                    });
                }
            }
        }
    }
    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}

/// Opens `path`, or the first multitouch device found when `None`.
pub fn open_touch_device(path: Option<&str>) -> Result<(DeviceInfo, Device)> {
    let path = match path {
        Some(p) => p.to_string(),
        None => discover_multitouch()
            .into_iter()
            .next()
            .map(|d| d.path)
            .ok_or_else(|| anyhow!("no multitouch device found under /dev/input"))?,
    };

    let dev = Device::open(&path).with_context(|| format!("failed to open {path}"))?;
    if !is_multitouch(&dev) {
        return Err(anyhow!("{path} does not report multitouch slots"));
    }
    let info = DeviceInfo {
        name: dev.name().unwrap_or("unknown").to_string(),
        path,
    };
    info!("touch device: {} ({})", info.name, info.path);
    Ok((info, dev))
}
