use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use scrollweave_core::{DeviceSignals, EngineConfig};
use scrollweave_web::{HostFrame, WebHost};
use tracing::info;

use crate::error::{DemoError, Result};
use crate::scene::Scene;
use crate::script::ScrollScript;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One header line per frame, one line per patch.
    Text,
    /// One JSON object per frame.
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "scrollweave-demo",
    about = "Replay a scroll script over the portfolio scene and print style patches",
    version
)]
pub struct Args {
    /// Engine config (TOML).
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = 1440.0)]
    pub width: f64,

    #[arg(long, default_value_t = 900.0)]
    pub height: f64,

    /// Simulate a touch device (reveal-only topology).
    #[arg(long)]
    pub touch: bool,

    /// Report a reduced-motion preference; honored when the config says so.
    #[arg(long = "reduced-motion")]
    pub reduced_motion: bool,

    /// Keyframes as `<ms>:<scroll_y>,...`; defaults to a full page tour.
    #[arg(long)]
    pub script: Option<String>,

    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also print frames with nothing to apply.
    #[arg(long = "all-frames")]
    pub all_frames: bool,
}

/// Totals for one replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub frames: u64,
    pub printed: u64,
    pub gate_opened_at: Option<u64>,
}

pub fn run_from_env() -> Result<()> {
    let args = Args::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&args, &mut out)?;
    Ok(())
}

pub fn run(args: &Args, out: &mut impl Write) -> Result<Summary> {
    if !(args.width.is_finite() && args.height.is_finite() && args.width > 0.0 && args.height > 0.0) {
        return Err(DemoError::Viewport {
            width: args.width,
            height: args.height,
        });
    }
    let config = match &args.config {
        Some(path) => EngineConfig::from_toml_file(path)?,
        None => EngineConfig::default(),
    };
    let signals = DeviceSignals::new(args.width)
        .coarse_pointer(args.touch)
        .reduced_motion(args.reduced_motion);

    let scene = Scene::portfolio(args.width, args.height);
    let script = match &args.script {
        Some(text) => text.parse::<ScrollScript>()?,
        None => ScrollScript::tour(scene.max_scroll()),
    };

    let mut host = WebHost::new(scene.layout.clone(), args.width, args.height).with_config(config);
    let mounted = scene.mount(&mut host, signals)?;
    info!(
        topology = ?host.engine().topology(mounted.scope),
        triggers = host.engine().trigger_count(),
        timelines = host.engine().active_timelines(),
        "scene mounted"
    );

    let frame_dt = Duration::from_secs(1) / args.fps.max(1);
    // Extra second so transitions started near the end settle.
    let end = script.duration() + Duration::from_secs(1);
    let started = web_time::Instant::now();

    let mut summary = Summary {
        frames: 0,
        printed: 0,
        gate_opened_at: None,
    };
    let mut last_y = None;
    let mut dt = Duration::ZERO;
    loop {
        let t = host.clock().now() + dt;
        let y = script.scroll_at(t);
        if last_y != Some(y) {
            host.push_scroll(y);
            last_y = Some(y);
        }
        let frame = host.step(dt);
        summary.frames += 1;
        if frame.gate_open && summary.gate_opened_at.is_none() {
            summary.gate_opened_at = Some(frame.frame);
        }
        if args.all_frames || !frame.is_idle() {
            write_frame(out, &frame, args.format)?;
            summary.printed += 1;
        }
        if t >= end {
            break;
        }
        dt = frame_dt;
    }

    info!(
        frames = summary.frames,
        printed = summary.printed,
        boot_done = mounted.boot.is_completed(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "replay finished"
    );
    Ok(summary)
}

fn write_frame(out: &mut impl Write, frame: &HostFrame, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => writeln!(out, "{}", frame.to_json()?)?,
        OutputFormat::Text => {
            writeln!(
                out,
                "#{} t={}ms y={} gate={} pad={}",
                frame.frame,
                frame.time_ms,
                frame.scroll_y,
                if frame.gate_open { "open" } else { "closed" },
                frame.reserved_padding
            )?;
            for patch in &frame.patches {
                writeln!(out, "  {} | {}", patch.element, patch.to_css())?;
            }
            for change in &frame.classes {
                let sign = if change.added { '+' } else { '-' };
                writeln!(out, "  {} {sign}{}", change.element, change.class)?;
            }
        }
    }
    Ok(())
}
