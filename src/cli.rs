use anyhow::{Context, Result, anyhow};
use pico_args::Arguments;
use std::{
    env,
    fs::File,
    io::{self, BufReader},
};

use radialpad::config::{Profile, ProfileStore};
use radialpad::haptics::{LogActuator, NoopActuator};
use radialpad::surface::Surface;

use crate::{pipeline, replay, report};

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    let profile: Option<String> = pargs.opt_value_from_str("--profile")?;

    // First free arg is the subcommand
    let subcmd: Option<String> = pargs.free_from_str().ok();

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.free_from_str().ok();
            if let Some(t) = topic {
                print_subcmd_help(&t);
            } else {
                print_help();
            }
            Ok(())
        }

        Some("run") => {
            let store = ProfileStore::open()?;
            let name = match profile {
                Some(n) => n,
                None => store.active_name()?,
            };
            pipeline::run(&store, &name)
        }

        Some("replay") => {
            let file: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: radialpad replay <file> [--profile NAME]"))?;
            let store = ProfileStore::open()?;
            let (_, p) = store.load_named_or_active(profile.as_deref())?;
            let mut surface = Surface::from_profile(&p, || Box::new(LogActuator))?;

            let input = File::open(&file).with_context(|| format!("failed to open {file}"))?;
            let n = replay::run(&mut surface, BufReader::new(input), io::stdout().lock())?;
            eprintln!("replayed {file}: {n} events");
            Ok(())
        }

        Some("check") => {
            let target: Option<String> = pargs.free_from_str().ok();
            let p = match target {
                // a path to a file, or the name of a stored profile
                Some(t) if t.ends_with(".toml") => {
                    let txt = std::fs::read_to_string(&t)
                        .with_context(|| format!("failed to read {t}"))?;
                    Profile::parse(&txt).map_err(|e| anyhow!("{t}: {e}"))?
                }
                other => ProfileStore::open()?
                    .load_named_or_active(other.as_deref().or(profile.as_deref()))?
                    .1,
            };
            let b = p.resolve_bindings()?;
            println!(
                "ok: {} pads, {} control bindings, {} gesture bindings",
                p.pads.len(),
                b.controls.len(),
                b.gestures.len()
            );
            Ok(())
        }

        Some("layout") => {
            let target: Option<String> = pargs.free_from_str().ok();
            let store = ProfileStore::open()?;
            let (_, p) = store.load_named_or_active(target.as_deref().or(profile.as_deref()))?;
            let surface = Surface::from_profile(&p, || Box::new(NoopActuator))?;
            print_response(&report::layout_report(&surface));
            Ok(())
        }

        Some("use") => {
            let name: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: radialpad use <profile_name>"))?;
            ProfileStore::open()?.set_active(&name)?;
            println!("ok: active profile is {name}");
            Ok(())
        }

        Some("list") => {
            let store = ProfileStore::open()?;
            let active = store.active_name().unwrap_or_default();
            for name in store.list() {
                let mark = if name == active { '*' } else { ' ' };
                println!("{mark} {name}");
            }
            Ok(())
        }

        Some("doctor") => {
            let store = ProfileStore::open()?;
            print_response(&report::doctor_report(&store));
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!(
        r#"radialpad - radial touch gamepad for Linux

USAGE:
  radialpad help [command]                  Show general or command-specific help
  radialpad run [--profile NAME]            Drive the virtual gamepad from the touchscreen
  radialpad replay <file> [--profile NAME]  Replay recorded touches, print events as JSON
  radialpad check [NAME|file.toml]          Validate a profile
  radialpad layout [NAME]                   Print where every pad and dial lands
  radialpad use <name>                      Switch active profile
  radialpad list                            List profiles
  radialpad doctor                          Diagnose permissions/devices

TIPS:
  - Profiles: ~/.config/radialpad/profiles
  - Active profile pointer: ~/.config/radialpad/active
  - Editing the running profile reloads it
  - RUST_LOG=debug shows every routed event
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "run" => println!(
            "usage: radialpad run [--profile NAME]\nReads the touch device and drives a uinput gamepad until Ctrl+C."
        ),
        "replay" => println!(
            "usage: radialpad replay <file> [--profile NAME]\nEach line is a touch batch {{\"t\",\"touches\"}} or a command with \"op\":\nsimulate_motion, clear_motion, simulate_key, clear_key, tick, reset."
        ),
        "check" => println!(
            "usage: radialpad check [NAME|file.toml]\nParses and validates a profile and its bindings."
        ),
        "layout" => println!(
            "usage: radialpad layout [NAME]\nPrints pad geometry, dial bounds and accessibility boxes as JSON."
        ),
        "use" => println!("usage: radialpad use <name>\nSwitches the active profile."),
        "list" => {
            println!("usage: radialpad list\nLists available profiles; marks active with '*'.")
        }
        "doctor" => println!(
            "usage: radialpad doctor\nChecks permissions and lists detected multitouch devices."
        ),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}

fn print_response(v: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(v).unwrap_or_default());
}
