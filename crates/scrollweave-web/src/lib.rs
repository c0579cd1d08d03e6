#![forbid(unsafe_code)]

//! `scrollweave-web` adapts the engine to a browser-like host.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding page pushes scroll and resize input
//!   and keeps the layout snapshot measured.
//! - **Deterministic time**: the host advances a monotonic clock explicitly.
//! - **No rendering API**: output is plain CSS declarations ([`StylePatch`])
//!   and class toggles ([`ClassChange`]) the page applies itself.
//!
//! Input only reaches the engine while a listener for it is live, exactly as
//! a DOM event with no subscribed handler goes nowhere; after a scope is torn
//! down, scroll notifications are dropped until the next mount.

pub mod class_hooks;
pub mod style;

use core::time::Duration;
use std::collections::VecDeque;

use scrollweave_core::{
    DeviceSignals, ElementId, Engine, EngineConfig, LayoutSnapshot, ListenerKind, ListenerLedger, PropertyWrite,
    Result, ScopeHandle, TriggerHandle,
};

pub use class_hooks::{ClassBindings, ClassChange, IN_VIEW};
pub use style::{PositionMode, StylePatch, StyleSheet, Visibility};

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }
}

/// Raw input the page forwards from its event handlers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostInput {
    Scroll(f64),
    Resize { width: f64, height: f64 },
}

impl HostInput {
    fn kind(&self) -> ListenerKind {
        match self {
            Self::Scroll(_) => ListenerKind::Scroll,
            Self::Resize { .. } => ListenerKind::Resize,
        }
    }
}

/// Everything the page applies after one step.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HostFrame {
    pub frame: u64,
    /// Host clock at this frame, milliseconds.
    pub time_ms: u64,
    pub scroll_y: f64,
    pub patches: Vec<StylePatch>,
    pub classes: Vec<ClassChange>,
    /// Extra bottom padding to reserve for live pins, pixels.
    pub reserved_padding: f64,
    pub gate_open: bool,
    /// Input discarded because no listener was live.
    pub dropped_inputs: usize,
}

impl HostFrame {
    /// Nothing to apply.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.patches.is_empty() && self.classes.is_empty()
    }

    /// One JSON object, suitable for JSON-lines output.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Patches and class removals produced outside the frame loop
/// (unregister, unmount).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Restore {
    pub patches: Vec<StylePatch>,
    pub classes: Vec<ClassChange>,
    pub released_padding: f64,
}

/// A minimal, host-driven page backend.
///
/// - push input via [`push_scroll`](Self::push_scroll) / [`push_resize`](Self::push_resize)
/// - keep geometry current via [`layout_mut`](Self::layout_mut) and
///   [`invalidate`](Self::invalidate)
/// - advance time and collect output via [`step`](Self::step)
#[derive(Debug)]
pub struct WebHost {
    clock: DeterministicClock,
    queue: VecDeque<HostInput>,
    listeners: ListenerLedger,
    engine: Engine<LayoutSnapshot>,
    styles: StyleSheet,
    classes: ClassBindings,
}

impl WebHost {
    #[must_use]
    pub fn new(layout: LayoutSnapshot, viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            clock: DeterministicClock::new(),
            queue: VecDeque::new(),
            listeners: ListenerLedger::new(),
            engine: Engine::new(layout, viewport_width, viewport_height),
            styles: StyleSheet::new(),
            classes: ClassBindings::new(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.engine = self.engine.with_config(config);
        self
    }

    pub fn engine(&self) -> &Engine<LayoutSnapshot> {
        &self.engine
    }

    /// Register triggers and timelines here.
    pub fn engine_mut(&mut self) -> &mut Engine<LayoutSnapshot> {
        &mut self.engine
    }

    pub fn listeners(&self) -> &ListenerLedger {
        &self.listeners
    }

    pub fn clock(&self) -> &DeterministicClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut DeterministicClock {
        &mut self.clock
    }

    pub fn layout_mut(&mut self) -> &mut LayoutSnapshot {
        self.engine.layout_mut()
    }

    /// Re-resolve all triggers on the next step.
    pub fn invalidate(&mut self) {
        self.engine.invalidate();
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    pub fn classes(&self) -> &ClassBindings {
        &self.classes
    }

    /// Create a scope, subscribing its listeners on this host.
    pub fn mount(&mut self, signals: DeviceSignals) -> ScopeHandle {
        self.engine.create_scope(&mut self.listeners, signals)
    }

    /// Tear a scope down and compute what the page must restore.
    pub fn unmount(&mut self, scope: ScopeHandle) -> Result<Restore> {
        let report = self.engine.teardown_scope(&mut self.listeners, scope)?;
        Ok(Restore {
            patches: self.styles.apply(&report.writes),
            classes: self.classes.release_scope(scope),
            released_padding: report.released_extent,
        })
    }

    /// Unregister one trigger and compute what the page must restore.
    pub fn unregister(&mut self, trigger: TriggerHandle) -> Restore {
        let writes = self.engine.unregister(trigger);
        Restore {
            patches: self.styles.apply(&writes),
            classes: self.classes.release_trigger(trigger),
            released_padding: 0.0,
        }
    }

    /// Toggle `class` on `element` when `trigger` is entered.
    pub fn bind_class(&mut self, trigger: TriggerHandle, element: ElementId, class: impl Into<String>) {
        self.classes.bind(trigger, element, class);
    }

    pub fn push_input(&mut self, input: HostInput) {
        self.queue.push_back(input);
    }

    pub fn push_scroll(&mut self, scroll_y: f64) {
        self.push_input(HostInput::Scroll(scroll_y));
    }

    pub fn push_resize(&mut self, width: f64, height: f64) {
        self.push_input(HostInput::Resize { width, height });
    }

    #[must_use]
    pub fn pending_inputs(&self) -> usize {
        self.queue.len()
    }

    /// Advance the clock by `dt`, deliver queued input and run one frame.
    pub fn step(&mut self, dt: Duration) -> HostFrame {
        self.clock.advance(dt);

        let mut dropped = 0;
        for input in self.queue.drain(..) {
            if self.listeners.count(input.kind()) == 0 {
                dropped += 1;
                continue;
            }
            match input {
                HostInput::Scroll(y) => self.engine.notify_scroll(y),
                HostInput::Resize { width, height } => self.engine.notify_resize(width, height),
            }
        }
        #[cfg(feature = "tracing")]
        if dropped > 0 {
            tracing::debug!(target: "scrollweave.web", dropped, "input with no live listener dropped");
        }

        let out = self.engine.tick(self.clock.now());
        let patches = self.styles.apply(&out.writes);
        let classes = self.classes.observe(&out.events);
        #[cfg(feature = "tracing")]
        for c in &classes {
            tracing::debug!(
                target: "scrollweave.web",
                element = %c.element,
                class = %c.class,
                added = c.added,
                "class toggled"
            );
        }

        HostFrame {
            frame: out.frame,
            time_ms: u64::try_from(self.clock.now().as_millis()).unwrap_or(u64::MAX),
            scroll_y: out.scroll.scroll_y,
            patches,
            classes,
            reserved_padding: out.reserved_extent,
            gate_open: out.gate_open,
            dropped_inputs: dropped,
        }
    }

    /// Apply writes produced outside the frame loop, e.g. by a timeline the
    /// page drives itself.
    pub fn apply_writes(&mut self, writes: &[PropertyWrite]) -> Vec<StylePatch> {
        self.styles.apply(writes)
    }
}
