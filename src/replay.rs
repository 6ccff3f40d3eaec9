//! Offline driver: feeds recorded frames and simulation commands through a
//! surface and prints every event as a JSON line.
//!
//! Input lines are either touch batches,
//! `{"t": 16, "touches": [{"id": 0, "x": 120.0, "y": 900.0, "action": "down"}]}`,
//! or commands tagged with `op`, e.g. `{"op": "simulate_key", "id": 30, "pressed": true}`.
//! Blank lines and lines starting with `#` are skipped.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::Deserialize;

use radialpad::event::Event;
use radialpad::surface::Surface;
use radialpad::touch::TouchBatch;

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Command {
    SimulateMotion { id: i32, x: f32, y: f32 },
    ClearMotion { id: i32 },
    SimulateKey { id: i32, pressed: bool },
    ClearKey { id: i32 },
    /// Advance the clock without input.
    Tick { t: u64 },
    /// Lift every finger.
    Reset { t: u64 },
}

enum Line {
    Command(Command),
    Batch(TouchBatch),
}

impl Line {
    /// Lines carrying `op` are commands, anything else is a touch batch.
    fn parse(text: &str) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if value.get("op").is_some() {
            serde_json::from_value(value).map(Line::Command)
        } else {
            serde_json::from_value(value).map(Line::Batch)
        }
    }
}

fn emit(out: &mut impl Write, line: usize, events: &[Event]) -> Result<usize> {
    for e in events {
        let v = serde_json::json!({ "line": line, "event": e });
        writeln!(out, "{v}")?;
    }
    Ok(events.len())
}

fn simulate(surface: &mut Surface, line: usize, cmd: &Command) -> Vec<Event> {
    let (id, res) = match *cmd {
        Command::SimulateMotion { id, x, y } => (id, surface.simulate(|s| s.simulate_motion(id, x, y))),
        Command::ClearMotion { id } => (id, surface.simulate(|s| s.clear_simulated_motion(id))),
        Command::SimulateKey { id, pressed } => {
            (id, surface.simulate(|s| s.simulate_key_press(id, pressed)))
        }
        Command::ClearKey { id } => (id, surface.simulate(|s| s.clear_simulated_key_press(id))),
        Command::Tick { t } => return surface.tick(t),
        Command::Reset { t } => return surface.reset_touch(t),
    };
    res.unwrap_or_else(|| {
        warn!("line {line}: no dial handles control {id}");
        Vec::new()
    })
}

/// Runs every line of `input` and returns the number of events written.
/// Taps still pending at the end are flushed.
pub fn run(surface: &mut Surface, input: impl BufRead, mut out: impl Write) -> Result<usize> {
    let mut written = 0;
    let mut last = 0;

    for (idx, text) in input.lines().enumerate() {
        let line = idx + 1;
        let text = text.with_context(|| format!("failed to read line {line}"))?;
        let text = text.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        last = line;

        let parsed = Line::parse(text).map_err(|e| anyhow!("line {line}: {e}"))?;
        let events = match parsed {
            Line::Batch(batch) => surface.process(&batch),
            Line::Command(cmd) => simulate(surface, line, &cmd),
        };
        written += emit(&mut out, line, &events)?;
    }

    while let Some(deadline) = surface.next_deadline() {
        let events = surface.tick(deadline);
        written += emit(&mut out, last, &events)?;
    }
    out.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use radialpad::config::{Profile, default_profile_text};
    use radialpad::haptics::NoopActuator;

    fn surface() -> Surface {
        let profile = Profile::parse(default_profile_text()).unwrap();
        Surface::from_profile(&profile, || Box::new(NoopActuator)).unwrap()
    }

    fn lines(out: &[u8]) -> Vec<serde_json::Value> {
        std::str::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn simulation_commands_produce_events() {
        let mut s = surface();
        let input = "# press A\n{\"op\":\"simulate_key\",\"id\":30,\"pressed\":true}\n\n{\"op\":\"simulate_key\",\"id\":999,\"pressed\":true}\n";
        let mut out = Vec::new();
        assert_eq!(run(&mut s, input.as_bytes(), &mut out).unwrap(), 1);

        let v = lines(&out);
        assert_eq!(v[0]["line"], 2);
        assert_eq!(v[0]["event"]["type"], "button");
        assert_eq!(v[0]["event"]["id"], 30);
        assert_eq!(v[0]["event"]["action"], "down");
    }

    #[test]
    fn touch_on_the_stick_moves_it() {
        let mut s = surface();
        let c = s.pads()[0].session.pad().geometry().unwrap().center;
        let input = format!(
            "{{\"t\":0,\"touches\":[{{\"id\":0,\"x\":{},\"y\":{},\"action\":\"down\"}}]}}\n\
             {{\"t\":16,\"touches\":[{{\"id\":0,\"x\":{},\"y\":{},\"action\":\"up\"}}]}}\n",
            c.x, c.y, c.x, c.y
        );
        let mut out = Vec::new();
        run(&mut s, input.as_bytes(), &mut out).unwrap();

        let v = lines(&out);
        let stick: Vec<_> = v
            .iter()
            .filter(|l| l["event"]["type"] == "direction" && l["event"]["id"] == 0)
            .collect();
        assert!(!stick.is_empty());
        assert_eq!(stick[0]["event"]["haptic"], "press");
    }

    #[test]
    fn malformed_lines_are_errors() {
        let mut s = surface();
        let err = run(&mut s, "{not json}\n".as_bytes(), Vec::new()).unwrap_err();
        assert!(err.to_string().starts_with("line 1:"));
    }

    #[test]
    fn incomplete_commands_are_errors() {
        let mut s = surface();
        let input = "{\"op\":\"simulate_key\",\"id\":30}\n";
        let err = run(&mut s, input.as_bytes(), Vec::new()).unwrap_err();
        assert!(err.to_string().contains("pressed"), "{err}");

        let err = run(&mut s, "{\"time\":5}\n".as_bytes(), Vec::new()).unwrap_err();
        assert!(err.to_string().starts_with("line 1:"));
    }
}
