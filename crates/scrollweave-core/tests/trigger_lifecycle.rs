#![forbid(unsafe_code)]

//! Registration, hook ordering and scope teardown.
//!
//! Run:
//!   cargo test -p scrollweave-core --test trigger_lifecycle

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use scrollweave_core::{
    AnimatedProperties, Crossing, DeviceSignals, Direction, ElementBox, ElementId, Engine, EngineError,
    LayoutSnapshot, ListenerHost, ListenerKind, ListenerLedger, PinOptions, RevealOptions, ScrubBoundaries,
    Timeline, TimelineStep, TriggerHooks, TriggerMode,
};

const CARD: ElementId = ElementId(10);
const STAT: ElementId = ElementId(11);
const SECTION: ElementId = ElementId(12);
const TRACK: ElementId = ElementId(13);
const PULSE: ElementId = ElementId(14);

fn layout() -> LayoutSnapshot {
    let mut l = LayoutSnapshot::new(9000.0);
    // Card latch at 1640 - 640 = 1000.
    l.insert(CARD, ElementBox::new(1640.0, 0.0, 600.0, 160.0));
    l.insert(STAT, ElementBox::new(2640.0, 0.0, 300.0, 100.0));
    l.insert(SECTION, ElementBox::new(4000.0, 0.0, 1200.0, 800.0));
    l.insert(
        TRACK,
        ElementBox::new(4000.0, 0.0, 1200.0, 800.0).with_scroll_width(2400.0),
    );
    l.insert(PULSE, ElementBox::new(700.0, 0.0, 2.0, 60.0));
    l
}

fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, TriggerHooks) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let (enter, leave) = (Rc::clone(&log), Rc::clone(&log));
    let hooks = TriggerHooks::new()
        .on_enter(move |_| enter.borrow_mut().push("enter"))
        .on_leave(move |_| leave.borrow_mut().push("leave"));
    (log, hooks)
}

fn drive(engine: &mut Engine, ys: &[f64]) -> Vec<scrollweave_core::FrameOutput> {
    let mut t = Duration::ZERO;
    ys.iter()
        .map(|y| {
            engine.notify_scroll(*y);
            t += Duration::from_millis(16);
            engine.tick(t)
        })
        .collect()
}

#[test]
fn toggle_forward_backward_forward() {
    let mut host = ListenerLedger::new();
    let mut engine = Engine::new(layout(), 1200.0, 800.0);
    let scope = engine.create_scope(&mut host, DeviceSignals::new(1200.0));
    let (log, hooks) = recorder();
    engine
        .register_reveal_trigger(scope, CARD, RevealOptions::default().hooks(hooks))
        .unwrap();

    let frames = drive(&mut engine, &[0.0, 1200.0, 900.0, 1100.0]);
    assert_eq!(*log.borrow(), vec!["enter", "leave", "enter"]);

    let crossings: Vec<_> = frames
        .iter()
        .flat_map(|f| f.events.iter().map(|e| e.crossing))
        .collect();
    assert_eq!(
        crossings,
        vec![
            Crossing::Entered(Direction::Forward),
            Crossing::Left(Direction::Backward),
            Crossing::Entered(Direction::Forward),
        ]
    );
}

#[test]
fn micro_scrolls_on_one_side_fire_nothing() {
    let mut host = ListenerLedger::new();
    let mut engine = Engine::new(layout(), 1200.0, 800.0);
    let scope = engine.create_scope(&mut host, DeviceSignals::new(1200.0));
    let (log, hooks) = recorder();
    engine
        .register_reveal_trigger(scope, CARD, RevealOptions::default().hooks(hooks))
        .unwrap();

    drive(&mut engine, &[1001.0, 1002.0, 1000.5, 1003.0, 1000.0]);
    assert_eq!(*log.borrow(), vec!["enter"]);
}

#[test]
fn same_boundary_in_both_directions() {
    // Crossing the single latch line back and forth flips every time.
    let mut host = ListenerLedger::new();
    let mut engine = Engine::new(layout(), 1200.0, 800.0);
    let scope = engine.create_scope(&mut host, DeviceSignals::new(1200.0));
    let (log, hooks) = recorder();
    engine
        .register_reveal_trigger(scope, CARD, RevealOptions::default().hooks(hooks))
        .unwrap();

    drive(&mut engine, &[1000.0, 999.9, 1000.0, 999.9]);
    assert_eq!(*log.borrow(), vec!["enter", "leave", "enter", "leave"]);
}

#[test]
fn double_teardown_returns_listener_count_to_baseline() {
    let mut host = ListenerLedger::new();
    let baseline = host.len();
    let mut engine = Engine::new(layout(), 1200.0, 800.0);
    let scope = engine.create_scope(&mut host, DeviceSignals::new(1200.0));
    assert_eq!(host.len(), baseline + 2);

    engine
        .register_reveal_trigger(scope, CARD, RevealOptions::default())
        .unwrap();
    engine
        .register_pin_region(scope, TRACK, PinOptions::new(SECTION))
        .unwrap();
    engine
        .play_timeline(
            scope,
            Timeline::new().add(
                Duration::ZERO,
                TimelineStep::new(PULSE, Duration::from_secs(2))
                    .to(AnimatedProperties::default().scale_y(0.0)),
            ),
        )
        .unwrap();
    drive(&mut engine, &[4600.0, 4700.0]);

    let first = engine.teardown_scope(&mut host, scope).unwrap();
    assert_eq!(first.triggers, 2);
    assert_eq!(first.timelines, 1);
    assert_eq!(first.listeners, 2);
    assert_eq!(first.released_extent, 1200.0);
    assert!(first.writes.iter().any(|w| w.element == SECTION && w.props.pinned == Some(false)));
    assert!(first.writes.iter().any(|w| w.element == TRACK && w.props.x == Some(0.0)));
    assert!(first.writes.iter().any(|w| w.element == PULSE && w.props.scale_y == Some(1.0)));

    let second = engine.teardown_scope(&mut host, scope).unwrap();
    assert!(second.is_empty());
    assert_eq!(host.len(), baseline);
    assert_eq!(host.count(ListenerKind::Scroll), 0);
    assert_eq!(engine.trigger_count(), 0);
    assert_eq!(engine.reserved_extent(), 0.0);
}

#[test]
fn remount_after_teardown_registers_same_elements() {
    let mut host = ListenerLedger::new();
    let mut engine = Engine::new(layout(), 1200.0, 800.0);
    let scope = engine.create_scope(&mut host, DeviceSignals::new(1200.0));
    engine
        .register_reveal_trigger(scope, CARD, RevealOptions::default())
        .unwrap();
    engine.teardown_scope(&mut host, scope).unwrap();

    let remount = engine.create_scope(&mut host, DeviceSignals::new(1200.0));
    assert_ne!(scope, remount);
    assert!(engine
        .register_reveal_trigger(remount, CARD, RevealOptions::default())
        .is_ok());
}

#[test]
fn scopes_do_not_cross_talk() {
    let mut host = ListenerLedger::new();
    let mut engine = Engine::new(layout(), 1200.0, 800.0);
    let a = engine.create_scope(&mut host, DeviceSignals::new(1200.0));
    let b = engine.create_scope(&mut host, DeviceSignals::new(1200.0));
    let ha = engine
        .register_reveal_trigger(a, CARD, RevealOptions::default())
        .unwrap();
    let hb = engine
        .register_reveal_trigger(b, STAT, RevealOptions::default())
        .unwrap();
    assert_eq!(ha.scope(), a);
    assert_eq!(hb.scope(), b);

    drive(&mut engine, &[3000.0]);
    let report = engine.teardown_scope(&mut host, a).unwrap();
    assert!(report.writes.iter().all(|w| w.element == CARD));
    assert_eq!(engine.is_entered(ha), None);
    assert_eq!(engine.is_entered(hb), Some(true));
    assert_eq!(host.len(), 2);
}

#[test]
fn separate_engines_are_independent() {
    let mut host = ListenerLedger::new();
    let mut one = Engine::new(layout(), 1200.0, 800.0);
    let mut two = Engine::new(layout(), 1200.0, 800.0);
    let s1 = one.create_scope(&mut host, DeviceSignals::new(1200.0));
    let s2 = two.create_scope(&mut host, DeviceSignals::new(1200.0));
    one.register_reveal_trigger(s1, CARD, RevealOptions::default())
        .unwrap();
    two.register_reveal_trigger(s2, CARD, RevealOptions::default())
        .unwrap();
    drive(&mut one, &[1500.0]);
    drive(&mut two, &[0.0]);
    assert_eq!(one.trigger_count(), 1);
    assert_eq!(two.trigger_count(), 1);
}

#[test]
fn layout_inversion_holds_trigger_inactive() {
    let mut host = ListenerLedger::new();
    let mut engine = Engine::new(layout(), 1200.0, 800.0);
    let scope = engine.create_scope(&mut host, DeviceSignals::new(1200.0));
    let h = engine
        .register_scrub_animation(
            scope,
            STAT,
            AnimatedProperties::default().opacity(0.0),
            AnimatedProperties::default().opacity(1.0),
            ScrubBoundaries::between("top top", "bottom top").unwrap(),
        )
        .unwrap();
    drive(&mut engine, &[2700.0]);
    assert!(engine.trigger_progress(h).is_some());

    // Collapsed to zero height: start == end.
    engine
        .layout_mut()
        .insert(STAT, ElementBox::new(2640.0, 0.0, 300.0, 0.0));
    engine.invalidate();
    let frames = drive(&mut engine, &[2800.0, 2900.0]);
    assert_eq!(engine.trigger_progress(h), None);
    assert!(frames.iter().all(|f| f.writes.is_empty() && f.events.is_empty()));

    engine
        .layout_mut()
        .insert(STAT, ElementBox::new(2640.0, 0.0, 300.0, 400.0));
    engine.invalidate();
    drive(&mut engine, &[2840.0]);
    assert_eq!(engine.trigger_progress(h), Some(0.5));
}

#[test]
fn reveal_without_geometry_leaves_element_alone() {
    let mut host = ListenerLedger::new();
    let mut missing = layout();
    missing.remove(CARD);
    let mut engine = Engine::new(missing, 1200.0, 800.0);
    let scope = engine.create_scope(&mut host, DeviceSignals::new(1200.0));
    let h = engine
        .register_reveal_trigger(scope, CARD, RevealOptions::default())
        .unwrap();

    let frames = drive(&mut engine, &[0.0, 1200.0]);
    assert!(frames.iter().all(|f| f.writes.is_empty() && f.events.is_empty()));
    assert_eq!(engine.is_entered(h), Some(false));

    // Laid out late: the latch resolves and the reveal plays.
    engine
        .layout_mut()
        .insert(CARD, ElementBox::new(1640.0, 0.0, 600.0, 160.0));
    engine.invalidate();
    let frames = drive(&mut engine, &[1200.0]);
    assert_eq!(frames[0].events.len(), 1);
    assert!(frames[0].writes.iter().any(|w| w.element == CARD));
    engine.tick(Duration::from_secs(2));
    assert_eq!(engine.is_entered(h), Some(true));

    // Gone again: held inactive with no further writes or hooks.
    engine.layout_mut().remove(CARD);
    engine.invalidate();
    let frames = drive(&mut engine, &[0.0, 1400.0]);
    assert_eq!(engine.trigger_progress(h), None);
    assert!(frames.iter().all(|f| f.writes.is_empty() && f.events.is_empty()));
}

#[test]
fn duplicate_target_error_names_existing_handle() {
    let mut host = ListenerLedger::new();
    let mut engine = Engine::new(layout(), 1200.0, 800.0);
    let scope = engine.create_scope(&mut host, DeviceSignals::new(1200.0));
    let pin = engine
        .register_pin_region(scope, TRACK, PinOptions::new(SECTION))
        .unwrap();
    // The pinned section is owned by the pin.
    let err = engine
        .register_reveal_trigger(scope, SECTION, RevealOptions::default())
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::DuplicateTarget {
            target: SECTION,
            existing: pin
        }
    );
    assert!(err.to_string().contains("element#12"));
    assert_eq!(engine.trigger_mode(pin), Some(TriggerMode::Pin));
}

#[test]
fn registration_order_is_evaluation_order() {
    let mut host = ListenerLedger::new();
    let mut engine = Engine::new(layout(), 1200.0, 800.0);
    let scope = engine.create_scope(&mut host, DeviceSignals::new(1200.0));
    let first = engine
        .register_reveal_trigger(scope, STAT, RevealOptions::default())
        .unwrap();
    let second = engine
        .register_reveal_trigger(scope, CARD, RevealOptions::default())
        .unwrap();
    let order: Vec<_> = engine.trigger_handles().collect();
    assert_eq!(order, vec![first, second]);

    let f = drive(&mut engine, &[3000.0]).remove(0);
    let handles: Vec<_> = f.events.iter().map(|e| e.handle).collect();
    assert_eq!(handles, vec![first, second]);
}

#[test]
fn listener_ledger_is_a_listener_host() {
    fn add_twice<H: ListenerHost + ?Sized>(host: &mut H) {
        let opts = scrollweave_core::ListenerOptions::PASSIVE;
        host.add_listener(ListenerKind::Scroll, opts);
        host.add_listener(ListenerKind::Scroll, opts);
    }
    let mut ledger = ListenerLedger::new();
    add_twice(&mut ledger);
    assert_eq!(ledger.count(ListenerKind::Scroll), 2);
}
