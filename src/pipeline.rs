use anyhow::{Context, Result, anyhow};
use log::{debug, error, info, warn};
use std::{
    io,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread,
    time::Duration,
};

use evdev::{AbsoluteAxisCode, EventType, InputEvent, SynchronizationCode};
use notify::{RecursiveMode, Watcher};

use radialpad::config::{Profile, ProfileStore};
use radialpad::event::Event;
use radialpad::haptics::{HapticActuator, LogActuator};
use radialpad::surface::Surface;
use radialpad::touch::slots::SlotTracker;

use crate::input;
use crate::sink::{GamepadMapper, Output, UinputSink};

fn actuator() -> Box<dyn HapticActuator> {
    Box::new(LogActuator)
}

/// Everything between the raw slot stream and the virtual gamepad.
struct Runtime {
    slots: SlotTracker,
    surface: Surface,
    mapper: GamepadMapper,
    sink: UinputSink,
}

impl Runtime {
    fn new(profile: &Profile, sink: UinputSink) -> Result<Self> {
        let mut rt = Self {
            slots: SlotTracker::new(),
            surface: Surface::from_profile(profile, actuator)?,
            mapper: GamepadMapper::new(profile.resolve_bindings()?),
            sink,
        };
        rt.configure_slots(profile);
        Ok(rt)
    }

    fn configure_slots(&mut self, profile: &Profile) {
        let d = &profile.device;
        self.slots
            .set_norm_ranges(d.x_range[0], d.x_range[1], d.y_range[0], d.y_range[1]);
        self.slots.set_screen_size(d.screen_width, d.screen_height);
    }

    /// Swaps in a new profile. Fingers on the old pads are lifted first.
    fn apply_profile(&mut self, profile: &Profile) -> Result<()> {
        let surface = Surface::from_profile(profile, actuator)?;
        let bindings = profile.resolve_bindings()?;

        let lifted = self.surface.reset_touch(self.slots.now_ms());
        self.send(&lifted);
        let released = self.mapper.rebind(bindings);
        self.write(&released);

        self.surface = surface;
        self.configure_slots(profile);
        Ok(())
    }

    fn write(&mut self, outputs: &[Output]) {
        if outputs.is_empty() {
            return;
        }
        if let Err(e) = self.sink.write(outputs) {
            error!("uinput write failed: {e}");
        }
    }

    fn send(&mut self, events: &[Event]) {
        if events.is_empty() {
            return;
        }
        debug!("{} events", events.len());
        let outputs = self.mapper.map(events);
        self.write(&outputs);
    }

    fn on_input(&mut self, ev: InputEvent) {
        if ev.event_type() == EventType::ABSOLUTE {
            match ev.code() {
                c if c == AbsoluteAxisCode::ABS_MT_SLOT.0 => self.slots.on_slot(ev.value()),
                c if c == AbsoluteAxisCode::ABS_MT_TRACKING_ID.0 => {
                    self.slots.on_tracking_id(ev.value())
                }
                c if c == AbsoluteAxisCode::ABS_MT_POSITION_X.0 => self.slots.on_pos_x(ev.value()),
                c if c == AbsoluteAxisCode::ABS_MT_POSITION_Y.0 => self.slots.on_pos_y(ev.value()),
                _ => {}
            }
        } else if ev.event_type() == EventType::SYNCHRONIZATION
            && ev.code() == SynchronizationCode::SYN_REPORT.0
        {
            let batch = self.slots.on_syn_report();
            if !batch.is_empty() {
                let events = self.surface.process(&batch);
                self.send(&events);
            }
        }
    }

    fn on_idle(&mut self) {
        let now = self.slots.now_ms();
        if self.surface.next_deadline().is_some_and(|d| d <= now) {
            let events = self.surface.tick(now);
            self.send(&events);
        }
    }

    fn shutdown(&mut self) {
        let lifted = self.surface.reset_touch(self.slots.now_ms());
        self.send(&lifted);
        let released = self.mapper.release_all();
        self.write(&released);
    }
}

fn watch_profile(path: PathBuf, tx: mpsc::Sender<()>) -> Result<notify::RecommendedWatcher> {
    let dir = path
        .parent()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("profile path has no parent: {}", path.display()))?;

    // editors often replace the file, so watch the directory
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(ev) if ev.kind.is_modify() || ev.kind.is_create() => {
                if ev.paths.iter().any(|p| p == &path) {
                    let _ = tx.send(());
                }
            }
            Ok(_) => {}
            Err(e) => warn!("profile watcher: {e}"),
        }
    })?;
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", dir.display()))?;
    Ok(watcher)
}

/// Runs profile `name` until SIGINT/SIGTERM or until the device goes away.
pub fn run(store: &ProfileStore, name: &str) -> Result<()> {
    let profile = store.load(name)?;
    let (info, mut dev) = input::open_touch_device(profile.device.path.as_deref())?;
    dev.set_nonblocking(true)
        .with_context(|| format!("failed to set {} non-blocking", info.path))?;

    let grabbed = profile.device.grab;
    if grabbed {
        dev.grab()
            .with_context(|| format!("failed to grab {}", info.path))?;
        info!("grabbed {}", info.path);
    }

    let sink = UinputSink::new().unwrap_or_else(|e| {
        warn!("uinput unavailable ({e}); events are only logged");
        UinputSink::noop()
    });
    let mut rt = Runtime::new(&profile, sink)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    for sig in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(sig, Arc::clone(&shutdown))?;
    }

    let (tx, rx) = mpsc::channel();
    let _watcher = watch_profile(store.path_of(name), tx)?;
    info!(
        "running profile '{}' with {} pads",
        profile.display_name(name),
        rt.surface.pads().len()
    );

    let mut result = Ok(());
    while !shutdown.load(Ordering::Relaxed) {
        let mut any_event = false;
        match dev.fetch_events() {
            Ok(events) => {
                for ev in events {
                    any_event = true;
                    rt.on_input(ev);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => {
                let e = anyhow::Error::new(e).context(format!("lost touch device {}", info.path));
                result = Err(e);
                break;
            }
        }

        if rx.try_recv().is_ok() {
            // coalesce bursts of writes
            while rx.try_recv().is_ok() {}
            match store.load(name) {
                Ok(p) => match rt.apply_profile(&p) {
                    Ok(()) => info!("reloaded profile '{name}'"),
                    Err(e) => warn!("reload failed, keeping last good profile: {e}"),
                },
                Err(e) => warn!("reload failed, keeping last good profile: {e}"),
            }
        }

        rt.on_idle();
        if !any_event {
            thread::sleep(Duration::from_millis(4));
        }
    }

    rt.shutdown();
    if grabbed {
        if let Err(e) = dev.ungrab() {
            warn!("failed to release {}: {e}", info.path);
        }
    }
    info!("pipeline stopped");
    result
}
