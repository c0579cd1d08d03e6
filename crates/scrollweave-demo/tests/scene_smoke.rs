#![forbid(unsafe_code)]

//! Full replays of the portfolio scene.
//!
//! Run:
//!   cargo test -p scrollweave-demo --test scene_smoke

use std::io::Write;

use clap::Parser;
use pretty_assertions::assert_eq;
use scrollweave_demo::scene::{HEADINGS, ids};
use scrollweave_demo::{Args, DemoError, run};
use serde_json::Value;

fn args(extra: &[&str]) -> Args {
    let mut argv = vec!["scrollweave-demo", "--format", "json"];
    argv.extend_from_slice(extra);
    Args::parse_from(argv)
}

fn replay(extra: &[&str]) -> (scrollweave_demo::Summary, Vec<Value>) {
    let mut out = Vec::new();
    let summary = run(&args(extra), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let frames = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    (summary, frames)
}

fn class_changes(frames: &[Value], added: bool) -> Vec<u64> {
    frames
        .iter()
        .flat_map(|f| f["classes"].as_array().cloned().unwrap_or_default())
        .filter(|c| c["added"] == Value::Bool(added))
        .filter_map(|c| c["element"].as_u64())
        .collect()
}

fn fixed_elements(frames: &[Value]) -> Vec<u64> {
    frames
        .iter()
        .flat_map(|f| f["patches"].as_array().cloned().unwrap_or_default())
        .filter(|p| p["position"] == "fixed")
        .filter_map(|p| p["element"].as_u64())
        .collect()
}

#[test]
fn desktop_tour() {
    let (summary, frames) = replay(&[]);
    assert_eq!(summary.printed as usize, frames.len());

    // Loader is 3.8s; at 60 fps the gate opens around frame 229.
    let opened = summary.gate_opened_at.unwrap();
    assert!((225..=235).contains(&opened), "gate opened at frame {opened}");
    for f in frames.iter().take_while(|f| f["gate_open"] == false) {
        assert!(f["classes"].as_array().unwrap().is_empty());
    }

    let mut added = class_changes(&frames, true);
    added.sort_unstable();
    let mut expected: Vec<u64> = HEADINGS.iter().map(|h| h.0).collect();
    expected.sort_unstable();
    assert_eq!(added, expected);
    // Returning to the top removes every heading's class again.
    assert_eq!(class_changes(&frames, false).len(), HEADINGS.len());

    assert!(fixed_elements(&frames).contains(&ids::PROJECTS.0));
    let max_pad = frames
        .iter()
        .filter_map(|f| f["reserved_padding"].as_f64())
        .fold(0.0, f64::max);
    assert_eq!(max_pad, 1440.0 * 2.0);
    assert_eq!(frames.last().unwrap()["reserved_padding"], 0.0);
}

#[test]
fn touch_device_never_pins() {
    let (_, frames) = replay(&["--touch"]);
    assert!(fixed_elements(&frames).is_empty());
    assert!(frames.iter().all(|f| f["reserved_padding"] == 0.0));
    assert_eq!(class_changes(&frames, true).len(), HEADINGS.len());
}

#[test]
fn narrow_viewport_from_config() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"mobile_breakpoint = 2000.0\n").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let (_, frames) = replay(&["--config", &path, "--script", "0:0,4000:0,6000:6000"]);
    assert!(fixed_elements(&frames).is_empty());
}

#[test]
fn text_output_names_elements() {
    let mut out = Vec::new();
    let a = Args::parse_from(["scrollweave-demo", "--script", "0:0,4000:0,4500:1200"]);
    run(&a, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("#1 t=0ms y=0 gate=closed pad=0\n"), "{text}");
    assert!(text.contains(&format!("  {} +in-view", ids::ABOUT_HEADING)));
    assert!(text.contains("visibility: hidden"));
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = run(&args(&["--config", path.to_str().unwrap()]), &mut Vec::<u8>::new()).unwrap_err();
    assert!(matches!(err, DemoError::Config(_)), "{err}");
    assert_eq!(err.exit_code(), 2);
}
