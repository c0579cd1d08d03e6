//! Property-based invariants for progress mapping, pin extents and toggles.
//!
//! 1. **Bounded, monotonic progress**: for any interval and any `s1 <= s2`,
//!    `0 <= progress(s1) <= progress(s2) <= 1`.
//!
//! 2. **Engine progress agrees**: a resolved trigger reports the same
//!    progress as its interval for every scroll position.
//!
//! 3. **Pin extent exactness**: across arbitrary scroll sequences the
//!    reserved extent is `track - viewport` while pinned and `0` otherwise.
//!
//! 4. **Toggle alternation**: enter/leave hooks strictly alternate, start
//!    with enter, and the count matches latch flips.
//!
//! 5. **Smoothing convergence**: smoothed progress never overshoots and
//!    reaches a held target.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use proptest::prelude::*;
use scrollweave_core::progress::ScrubSmoother;
use scrollweave_core::{
    DeviceSignals, ElementBox, ElementId, Engine, Interval, LayoutSnapshot, ListenerLedger, PinOptions,
    PinState, RevealOptions, TriggerHooks,
};

const SECTION: ElementId = ElementId(1);
const TRACK: ElementId = ElementId(2);
const CARD: ElementId = ElementId(3);

fn interval_strategy() -> impl Strategy<Value = Interval> {
    (-5_000.0f64..5_000.0, 1e-3f64..10_000.0)
        .prop_filter_map("non-empty interval", |(start, len)| Interval::new(start, start + len))
}

fn scroll_strategy() -> impl Strategy<Value = f64> {
    -20_000.0f64..20_000.0
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Progress mapping
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn progress_bounded_and_monotonic(
        interval in interval_strategy(),
        a in scroll_strategy(),
        b in scroll_strategy(),
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (p_lo, p_hi) = (interval.progress(lo), interval.progress(hi));
        prop_assert!((0.0..=1.0).contains(&p_lo), "progress {} out of range", p_lo);
        prop_assert!((0.0..=1.0).contains(&p_hi), "progress {} out of range", p_hi);
        prop_assert!(p_lo <= p_hi, "non-monotonic: p({})={} > p({})={}", lo, p_lo, hi, p_hi);
    }

    #[test]
    fn progress_clamps_outside(interval in interval_strategy(), d in 0.0f64..1e6) {
        prop_assert_eq!(interval.progress(interval.start() - d), 0.0);
        prop_assert_eq!(interval.progress(interval.end() + d), 1.0);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2-4. Engine-level invariants
// ═══════════════════════════════════════════════════════════════════════

fn pin_engine(track_width: f64) -> (Engine, scrollweave_core::TriggerHandle) {
    let mut layout = LayoutSnapshot::new(20_000.0);
    layout.insert(SECTION, ElementBox::new(3000.0, 0.0, 1200.0, 800.0));
    layout.insert(
        TRACK,
        ElementBox::new(3000.0, 0.0, 1200.0, 800.0).with_scroll_width(track_width),
    );
    let mut host = ListenerLedger::new();
    let mut engine = Engine::new(layout, 1200.0, 800.0);
    let scope = engine.create_scope(&mut host, DeviceSignals::new(1200.0));
    let h = engine
        .register_pin_region(scope, TRACK, PinOptions::new(SECTION))
        .unwrap();
    (engine, h)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn engine_progress_matches_interval(ys in prop::collection::vec(0.0f64..6000.0, 1..40)) {
        let (mut engine, h) = pin_engine(3200.0);
        let interval = Interval::new(3000.0, 5000.0).unwrap();
        for (i, y) in ys.iter().enumerate() {
            engine.notify_scroll(*y);
            engine.tick(Duration::from_millis(16 * i as u64));
            prop_assert_eq!(engine.trigger_progress(h), Some(interval.progress(*y)));
        }
    }

    #[test]
    fn pin_reserved_extent_exact(
        track in 1300u32..8000,
        ys in prop::collection::vec(0u32..12_000, 1..60),
    ) {
        // Whole pixels keep the extent arithmetic exact.
        let track = f64::from(track);
        let ys: Vec<f64> = ys.into_iter().map(f64::from).collect();
        let (mut engine, h) = pin_engine(track);
        let extent = track - 1200.0;
        for (i, y) in ys.iter().enumerate() {
            engine.notify_scroll(*y);
            let f = engine.tick(Duration::from_millis(16 * i as u64));
            let inside = *y >= 3000.0 && *y <= 3000.0 + extent;
            if inside {
                prop_assert_eq!(engine.pin_state(h), Some(PinState::Pinned));
                prop_assert_eq!(f.reserved_extent, extent);
            } else {
                prop_assert_eq!(engine.pin_state(h), Some(PinState::Inactive));
                prop_assert_eq!(f.reserved_extent, 0.0);
            }
        }
    }

    #[test]
    fn toggle_hooks_alternate(ys in prop::collection::vec(0.0f64..3000.0, 1..80)) {
        let mut layout = LayoutSnapshot::new(8000.0);
        layout.insert(CARD, ElementBox::new(1640.0, 0.0, 600.0, 160.0));
        let mut host = ListenerLedger::new();
        let mut engine = Engine::new(layout, 1200.0, 800.0);
        let scope = engine.create_scope(&mut host, DeviceSignals::new(1200.0));

        let log = Rc::new(RefCell::new(Vec::new()));
        let (enter, leave) = (Rc::clone(&log), Rc::clone(&log));
        let hooks = TriggerHooks::new()
            .on_enter(move |_| enter.borrow_mut().push(true))
            .on_leave(move |_| leave.borrow_mut().push(false));
        engine
            .register_reveal_trigger(scope, CARD, RevealOptions::default().hooks(hooks))
            .unwrap();

        let mut flips = 0;
        let mut entered = false;
        for (i, y) in ys.iter().enumerate() {
            engine.notify_scroll(*y);
            engine.tick(Duration::from_millis(16 * i as u64));
            let now = *y >= 1000.0;
            if now != entered {
                flips += 1;
                entered = now;
            }
        }

        let log = log.borrow();
        prop_assert_eq!(log.len(), flips);
        for (i, is_enter) in log.iter().enumerate() {
            prop_assert_eq!(*is_enter, i % 2 == 0, "hook {} out of order: {:?}", i, &*log);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Smoothing
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn smoothing_never_overshoots(
        start in 0.0f64..=1.0,
        target in 0.0f64..=1.0,
        lag_ms in 50u64..2000,
        dts in prop::collection::vec(1u64..100, 1..200),
    ) {
        let mut s = ScrubSmoother::new(Some(Duration::from_millis(lag_ms)));
        s.step(start, Duration::ZERO);
        let (lo, hi) = if start <= target { (start, target) } else { (target, start) };
        for dt in dts {
            let v = s.step(target, Duration::from_millis(dt));
            prop_assert!(v >= lo - 1e-12 && v <= hi + 1e-12, "{} escaped [{}, {}]", v, lo, hi);
        }
    }

    #[test]
    fn smoothing_reaches_held_target(target in 0.0f64..=1.0, lag_ms in 50u64..1000) {
        let mut s = ScrubSmoother::new(Some(Duration::from_millis(lag_ms)));
        s.step(0.0, Duration::ZERO);
        let mut v = 0.0;
        for _ in 0..2000 {
            v = s.step(target, Duration::from_millis(16));
        }
        prop_assert_eq!(v, target);
    }
}
