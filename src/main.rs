//! ringmod CLI: live duplex ring modulation and offline WAV rendering.
//!
//! Usage:
//!   ringmod render <in.wav> <out.wav> [--freq HZ] [--amp A] [--waveform NAME] [--bypass] [--config FILE]
//!   ringmod live [--freq HZ] [--amp A] [--waveform NAME] [--config FILE]
//!
//! In live mode, type `f <hz>` (or just a number) to retune, `b` to toggle
//! bypass, `q` to quit. Set `RUST_LOG` to change log verbosity.

#[cfg(feature = "alloc_check")]
#[global_allocator]
static A: assert_no_alloc::AllocDisabler = assert_no_alloc::AllocDisabler;

use anyhow::{bail, Context, Result};
use rm_dsp::Waveform;
use rm_host::{clamp_frequency, ActivityMeter, Controller, Settings, METER_RATE_HZ};
use std::io::{BufRead, Write};
use std::path::Path;
use std::{env, io};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage:
  ringmod render <in.wav> <out.wav> [--freq HZ] [--amp A] [--waveform NAME] [--bypass] [--config FILE]
  ringmod live [--freq HZ] [--amp A] [--waveform NAME] [--config FILE]";

/// Width of the activity bar in live mode.
const METER_WIDTH: usize = 20;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    };

    match command.as_str() {
        "render" => {
            let (positional, settings) = parse_options(&args[1..])?;
            let [input, output] = positional.as_slice() else {
                bail!("render needs an input and an output path\n{}", USAGE);
            };
            render(settings, Path::new(input), Path::new(output))
        }
        "live" => {
            let (positional, settings) = parse_options(&args[1..])?;
            if !positional.is_empty() {
                bail!("unexpected argument {:?}\n{}", positional[0], USAGE);
            }
            live(settings)
        }
        "-h" | "--help" | "help" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => bail!("unknown command {:?}\n{}", other, USAGE),
    }
}

/// Split arguments into positionals and settings. `--config` is applied
/// first wherever it appears so that flags override the file.
fn parse_options(args: &[String]) -> Result<(Vec<String>, Settings)> {
    let mut settings = match flag_value(args, "--config") {
        Some(path) => Settings::load(Path::new(path))
            .with_context(|| format!("loading settings from {}", path))?,
        None => Settings::default(),
    };

    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                iter.next();
            }
            "--freq" => {
                let v = next_value(&mut iter, arg)?;
                settings.frequency = v.parse().with_context(|| format!("bad frequency {:?}", v))?;
            }
            "--amp" => {
                let v = next_value(&mut iter, arg)?;
                settings.amplitude = v.parse().with_context(|| format!("bad amplitude {:?}", v))?;
            }
            "--waveform" => {
                let v = next_value(&mut iter, arg)?;
                settings.waveform = parse_waveform(v)?;
            }
            "--bypass" => settings.enabled = false,
            flag if flag.starts_with("--") => bail!("unknown option {}\n{}", flag, USAGE),
            _ => positional.push(arg.clone()),
        }
    }
    Ok((positional, settings))
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn next_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a str> {
    iter.next()
        .map(String::as_str)
        .with_context(|| format!("{} needs a value", flag))
}

fn parse_waveform(name: &str) -> Result<Waveform> {
    Waveform::from_name(name).with_context(|| {
        let names: Vec<&str> = Waveform::ALL.iter().map(|w| w.name()).collect();
        format!("unknown waveform {:?} (expected one of {})", name, names.join(", "))
    })
}

fn render(settings: Settings, input: &Path, output: &Path) -> Result<()> {
    let ctrl = Controller::new(settings);
    let settings = ctrl.settings();
    println!(
        "Rendering {} -> {} ({} Hz {} carrier{})",
        input.display(),
        output.display(),
        clamp_frequency(settings.frequency),
        settings.waveform.name(),
        if settings.enabled { "" } else { ", bypassed" }
    );
    ctrl.render_file(input, output)
        .with_context(|| format!("rendering {}", input.display()))?;
    println!("Done.");
    Ok(())
}

fn live(settings: Settings) -> Result<()> {
    let mut ctrl = Controller::new(settings);
    let params = ctrl.start_live().context("starting live session")?;
    if !ctrl.is_live() {
        bail!("audio stream did not start");
    }
    println!("Live. `f <hz>` retunes, `b` toggles bypass, `q` quits.");

    let view = params.clone();
    let mut meter = ActivityMeter::spawn(params.clone(), METER_RATE_HZ, move |level| {
        let lit = (level.clamp(0.0, 1.0) * METER_WIDTH as f32).round() as usize;
        print!(
            "\r[{}{}] {:7.1} Hz {} ",
            "#".repeat(lit),
            " ".repeat(METER_WIDTH - lit),
            view.frequency(),
            if view.is_enabled() { "on " } else { "off" }
        );
        let _ = io::stdout().flush();
    });

    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        match line.trim() {
            "" => {}
            "q" | "quit" => break,
            "b" | "bypass" => params.set_enabled(!params.is_enabled()),
            cmd => match cmd.trim_start_matches("f ").trim().parse::<f32>() {
                Ok(hz) => {
                    let hz = clamp_frequency(hz);
                    params.set_frequency(hz);
                    info!(frequency = hz, "retuned");
                }
                Err(_) => warn!(command = cmd, "ignored unknown command"),
            },
        }
    }

    meter.stop();
    println!();
    if let Some(stats) = ctrl.stop_live()? {
        println!("Stopped ({} overruns, {} underruns).", stats.overruns, stats.underruns);
    }
    Ok(())
}
