#![forbid(unsafe_code)]

//! End-to-end page flow through the host adapter: boot intro, reveals,
//! a pinned gallery, remount.
//!
//! Run:
//!   cargo test -p scrollweave-web --test host_flow

use core::time::Duration;

use pretty_assertions::assert_eq;
use scrollweave_core::{
    AnimatedProperties, DeviceSignals, Easing, ElementBox, ElementId, LayoutSnapshot, ListenerKind, PinOptions,
    RevealOptions, ScrubBoundaries, Timeline, TimelineStep,
};
use scrollweave_web::{IN_VIEW, PositionMode, Visibility, WebHost};

const LOADER: ElementId = ElementId(1);
const HEADING: ElementId = ElementId(2);
const SECTION: ElementId = ElementId(3);
const TRACK: ElementId = ElementId(4);
const BAR: ElementId = ElementId(5);
const PROGRESS: ElementId = ElementId(6);

const FRAME: Duration = Duration::from_millis(16);

fn layout() -> LayoutSnapshot {
    let mut l = LayoutSnapshot::new(8000.0);
    l.insert(HEADING, ElementBox::new(1640.0, 0.0, 1200.0, 160.0));
    l.insert(SECTION, ElementBox::new(3000.0, 0.0, 1200.0, 800.0));
    l.insert(
        TRACK,
        ElementBox::new(3000.0, 0.0, 1200.0, 800.0).with_scroll_width(3200.0),
    );
    l.insert(BAR, ElementBox::new(3000.0, 0.0, 1200.0, 4.0));
    l.insert(PROGRESS, ElementBox::new(0.0, 0.0, 1200.0, 3.0));
    l
}

fn loader() -> Timeline {
    Timeline::new().add(
        Duration::ZERO,
        TimelineStep::new(LOADER, Duration::from_millis(480))
            .from(AnimatedProperties::default().y_percent(0.0))
            .to(AnimatedProperties::default().y_percent(-100.0))
            .easing(Easing::PowerInOut(4)),
    )
}

fn mount_page(host: &mut WebHost, signals: DeviceSignals) -> scrollweave_core::ScopeHandle {
    let scope = host.mount(signals);
    let engine = host.engine_mut();
    let heading = engine
        .register_reveal_trigger(scope, HEADING, RevealOptions::default())
        .unwrap();
    engine
        .register_pin_region(
            scope,
            TRACK,
            PinOptions::new(SECTION).progress_bar(BAR).fallback_reveal(SECTION),
        )
        .unwrap();
    engine
        .register_scrub_animation(
            scope,
            PROGRESS,
            AnimatedProperties::default().scale_x(0.0),
            AnimatedProperties::default().scale_x(1.0),
            ScrubBoundaries::document(),
        )
        .unwrap();
    engine.play_boot_timeline(scope, loader()).unwrap();
    host.bind_class(heading, HEADING, IN_VIEW);
    scope
}

#[test]
fn boot_hides_scroll_output_until_loader_finishes() {
    let mut host = WebHost::new(layout(), 1200.0, 800.0);
    mount_page(&mut host, DeviceSignals::new(1200.0));

    host.push_scroll(1400.0);
    let first = host.step(Duration::ZERO);
    assert!(!first.gate_open);
    assert!(first.patches.iter().all(|p| p.element == LOADER));
    assert!(first.classes.is_empty());

    let mut opened = None;
    for _ in 0..40 {
        let f = host.step(FRAME);
        if f.gate_open {
            opened = Some(f);
            break;
        }
        assert!(f.patches.iter().all(|p| p.element == LOADER));
    }
    let opened = opened.expect("loader finishes within 40 frames");
    // Controllers first see the page on the open frame, already scrolled past the heading.
    assert_eq!(opened.classes.len(), 1);
    assert!(opened.classes[0].added);
    assert!(opened.patches.iter().any(|p| p.element == HEADING));
    assert!(opened.patches.iter().any(|p| p.element == PROGRESS));

    let loader_style = host.styles().computed(LOADER).unwrap();
    assert_eq!(loader_style.transform.as_deref(), Some("translate(0%, -100%)"));
}

#[test]
fn scroll_through_page_on_desktop() {
    let mut host = WebHost::new(layout(), 1200.0, 800.0);
    mount_page(&mut host, DeviceSignals::new(1200.0));
    // Let the loader finish at the top of the page.
    for _ in 0..40 {
        host.step(FRAME);
    }
    assert!(host.engine().is_gate_open());

    host.push_scroll(1200.0);
    let f = host.step(FRAME);
    assert_eq!(f.classes.len(), 1);
    assert!(f.classes[0].added);

    host.push_scroll(3500.0);
    let f = host.step(FRAME);
    assert_eq!(f.reserved_padding, 2000.0);
    let section = host.styles().computed(SECTION).unwrap();
    assert_eq!(section.position, Some(PositionMode::Fixed));
    let bar = host.styles().get(BAR).unwrap();
    assert_eq!(bar.scale_x, Some(0.25));

    host.push_scroll(6000.0);
    let f = host.step(FRAME);
    assert_eq!(f.reserved_padding, 0.0);
    let section = host.styles().computed(SECTION).unwrap();
    assert_eq!(section.position, Some(PositionMode::Static));
    assert!(host.classes().has_class(HEADING, IN_VIEW));
}

#[test]
fn touch_device_reveals_section_instead_of_pinning() {
    let mut host = WebHost::new(layout(), 1200.0, 800.0);
    mount_page(&mut host, DeviceSignals::new(1200.0).coarse_pointer(true));
    for _ in 0..40 {
        host.step(FRAME);
    }

    host.push_scroll(3500.0);
    let f = host.step(FRAME);
    assert_eq!(f.reserved_padding, 0.0);
    assert!(f.patches.iter().all(|p| p.position.is_none()));
    for _ in 0..80 {
        host.step(FRAME);
    }
    let section = host.styles().computed(SECTION).unwrap();
    assert_eq!(section.visibility, Some(Visibility::Visible));
    assert_eq!(section.opacity, Some(1.0));
}

#[test]
fn remount_after_unmount_replays_from_scratch() {
    let mut host = WebHost::new(layout(), 1200.0, 800.0);
    let scope = mount_page(&mut host, DeviceSignals::new(1200.0));
    for _ in 0..40 {
        host.step(FRAME);
    }
    host.push_scroll(3500.0);
    host.step(FRAME);

    let restore = host.unmount(scope).unwrap();
    assert_eq!(restore.released_padding, 2000.0);
    assert_eq!(host.listeners().count(ListenerKind::Scroll), 0);
    assert_eq!(host.engine().trigger_count(), 0);

    host.push_scroll(100.0);
    assert_eq!(host.step(FRAME).dropped_inputs, 1);

    mount_page(&mut host, DeviceSignals::new(1200.0));
    assert_eq!(host.listeners().count(ListenerKind::Scroll), 1);
    assert!(!host.engine().is_gate_open());
    host.push_scroll(100.0);
    let f = host.step(FRAME);
    assert_eq!(f.dropped_inputs, 0);
    assert!(!f.gate_open);
}
