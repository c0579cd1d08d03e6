#![forbid(unsafe_code)]

//! The engine: caller-owned root of all scroll orchestration state.
//!
//! # Frame order
//!
//! Each [`Engine::tick`] runs, in order:
//!
//! 1. apply coalesced scroll/resize input to [`ScrollState`];
//! 2. re-resolve trigger geometry (all triggers after an invalidation or
//!    resize, otherwise only triggers not currently active);
//! 3. advance timelines; completion of the boot timeline opens the gate;
//! 4. evaluate triggers in registration order, when the gate is open.
//!
//! Nothing else writes [`ScrollState`], so every trigger in a frame sees the
//! same scroll offset and resolved geometry.
//!
//! # Boot gate
//!
//! Until the latest boot timeline completes, triggers keep resolving and
//! their progress stays queryable, but they produce no writes and fire no
//! hooks. The first frame after completion is the first visible evaluation;
//! controllers start from their initial state, so a reveal already scrolled
//! past during the intro enters on that frame.
//!
//! ```
//! use std::time::Duration;
//! use scrollweave_core::*;
//!
//! let heading = ElementId(1);
//! let mut layout = LayoutSnapshot::new(4000.0);
//! layout.insert(heading, ElementBox::new(1640.0, 0.0, 1200.0, 160.0));
//!
//! let mut host = ListenerLedger::new();
//! let mut engine = Engine::new(layout, 1200.0, 800.0);
//! let scope = engine.create_scope(&mut host, DeviceSignals::new(1200.0));
//! let reveal = engine
//!     .register_reveal_trigger(scope, heading, RevealOptions::default())
//!     .unwrap();
//!
//! engine.notify_scroll(1400.0);
//! let frame = engine.tick(Duration::ZERO);
//! assert_eq!(engine.trigger_progress(reveal), Some(0.5));
//! assert_eq!(engine.is_entered(reveal), Some(true));
//! assert_eq!(frame.events.len(), 1);
//! ```

use std::time::Duration;

use ahash::{AHashMap, AHashSet};
use tracing::{debug, trace, warn};

use crate::config::EngineConfig;
use crate::device::{DeviceSignals, Topology};
use crate::error::{EngineError, Result};
use crate::geometry::{Anchor, Boundary, ElementId, GeometryResolver, LayoutSnapshot, LayoutSource};
use crate::host::{ListenerHost, ListenerKind, ListenerOptions};
use crate::pin::{PinController, PinOptions, PinSession, PinState};
use crate::props::{AnimatedProperties, PropertyWrite};
use crate::reveal::{RevealController, RevealOptions};
use crate::scope::{Scope, ScopeHandle, TeardownReport};
use crate::scroll::{InputCoalescer, ScrollState};
use crate::timeline::{Completion, LoopCount, PlaybackState, Timeline};
use crate::trigger::{
    Behavior, Crossing, Direction, ScrubBinding, ScrubBoundaries, Status, TriggerHandle, TriggerMode,
    TriggerRecord,
};

/// A trigger state change observed during a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    pub handle: TriggerHandle,
    pub target: ElementId,
    pub mode: TriggerMode,
    pub crossing: Crossing,
}

/// Everything one frame produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    /// 1-based frame counter.
    pub frame: u64,
    pub scroll: ScrollState,
    /// Property writes in evaluation order: timelines first, then triggers.
    pub writes: Vec<PropertyWrite>,
    pub events: Vec<TriggerEvent>,
    pub gate_open: bool,
    /// Extra scroll height currently reserved by live pin sessions.
    pub reserved_extent: f64,
}

#[derive(Debug)]
struct TimelineEntry {
    scope: ScopeHandle,
    timeline: Timeline,
}

/// Scroll-synchronized motion engine.
///
/// Single-threaded: hooks are `FnMut` without `Send`, so the engine stays on
/// the thread that drives frames.
#[derive(Debug)]
pub struct Engine<L: LayoutSource = LayoutSnapshot> {
    layout: L,
    config: EngineConfig,
    scroll: ScrollState,
    input: InputCoalescer,
    resolver: GeometryResolver,
    scopes: AHashMap<ScopeHandle, Scope>,
    next_scope: u64,
    next_trigger: u64,
    triggers: Vec<TriggerRecord>,
    /// Live trigger owning each written element.
    owners: AHashMap<ElementId, TriggerHandle>,
    timelines: Vec<TimelineEntry>,
    boot: Option<(ScopeHandle, Completion)>,
    gate_was_open: bool,
    /// Union of every property written per element, for reverting.
    touched: AHashMap<ElementId, AnimatedProperties>,
    last_now: Option<Duration>,
    frame: u64,
}

// ---------------------------------------------------------------------------
// Construction and input
// ---------------------------------------------------------------------------

impl<L: LayoutSource> Engine<L> {
    /// An engine over `layout` with a viewport of the given size.
    pub fn new(layout: L, viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            layout,
            config: EngineConfig::default(),
            scroll: ScrollState::new(0.0, viewport_width, viewport_height),
            input: InputCoalescer::new(),
            resolver: GeometryResolver::new(),
            scopes: AHashMap::new(),
            next_scope: 0,
            next_trigger: 0,
            triggers: Vec::new(),
            owners: AHashMap::new(),
            timelines: Vec::new(),
            boot: None,
            gate_was_open: true,
            touched: AHashMap::new(),
            last_now: None,
            frame: 0,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Record a scroll offset; applied on the next tick.
    pub fn notify_scroll(&mut self, scroll_y: f64) {
        self.input.push_scroll(scroll_y);
    }

    /// Record a viewport resize; applied and re-resolved on the next tick.
    pub fn notify_resize(&mut self, width: f64, height: f64) {
        self.input.push_resize(width, height);
    }

    /// Re-resolve every trigger on the next tick, e.g. after content
    /// changed size.
    pub fn invalidate(&mut self) {
        self.resolver.invalidate();
    }

    #[must_use]
    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// Mutable layout access. Call [`invalidate`](Self::invalidate) after
    /// changing measurements that live triggers depend on.
    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    #[must_use]
    pub fn scroll_state(&self) -> ScrollState {
        self.scroll
    }
}

// ---------------------------------------------------------------------------
// Scopes
// ---------------------------------------------------------------------------

impl<L: LayoutSource> Engine<L> {
    /// Create a scope and register its passive scroll and resize listeners.
    ///
    /// The trigger topology is chosen here, once, from `signals`.
    pub fn create_scope<H: ListenerHost + ?Sized>(
        &mut self,
        host: &mut H,
        signals: DeviceSignals,
    ) -> ScopeHandle {
        self.next_scope += 1;
        let handle = ScopeHandle(self.next_scope);
        let topology = Topology::select(&signals, &self.config);
        let mut scope = Scope::new(handle, topology, signals.wants_reduced_motion(&self.config));
        for kind in [ListenerKind::Scroll, ListenerKind::Resize] {
            scope
                .listeners
                .push(host.add_listener(kind, ListenerOptions::PASSIVE));
        }
        debug!(
            target: "scrollweave.scope",
            scope = %handle,
            ?topology,
            viewport_width = signals.viewport_width,
            coarse_pointer = signals.coarse_pointer,
            "scope created"
        );
        self.scopes.insert(handle, scope);
        handle
    }

    /// Topology chosen for a live scope.
    #[must_use]
    pub fn topology(&self, scope: ScopeHandle) -> Option<Topology> {
        self.scopes.get(&scope).map(|s| s.topology)
    }

    /// Tear down a scope: unregister its triggers, cancel its timelines,
    /// remove its listeners and restore every element it wrote to.
    ///
    /// Idempotent: tearing down an already torn-down scope returns an empty
    /// report.
    pub fn teardown_scope<H: ListenerHost + ?Sized>(
        &mut self,
        host: &mut H,
        scope: ScopeHandle,
    ) -> Result<TeardownReport> {
        if scope.0 == 0 || scope.0 > self.next_scope {
            return Err(EngineError::UnknownScope(scope));
        }
        let Some(state) = self.scopes.remove(&scope) else {
            return Ok(TeardownReport::default());
        };

        let mut report = TeardownReport::default();
        for id in &state.listeners {
            if host.remove_listener(*id) {
                report.listeners += 1;
            }
        }

        let mut elements = Vec::new();
        for handle in &state.triggers {
            if let Some((released, written)) = self.evict(*handle) {
                report.triggers += 1;
                report.released_extent += released;
                elements.extend(written);
            }
        }

        let mut discarded = Vec::new();
        let before = self.timelines.len();
        self.timelines.retain_mut(|entry| {
            if entry.scope == scope {
                entry.timeline.cancel(&mut discarded);
                false
            } else {
                true
            }
        });
        report.timelines = before - self.timelines.len();
        elements.extend(state.timeline_targets.iter().copied());

        if self.boot.as_ref().is_some_and(|(s, _)| *s == scope) {
            self.boot = None;
        }

        report.writes = self.revert(elements);
        debug!(
            target: "scrollweave.scope",
            scope = %state.handle,
            triggers = report.triggers,
            timelines = report.timelines,
            listeners = report.listeners,
            reverted = report.writes.len(),
            "scope torn down"
        );
        Ok(report)
    }

    fn live_scope(&self, scope: ScopeHandle) -> Result<&Scope> {
        self.scopes.get(&scope).ok_or(EngineError::UnknownScope(scope))
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

impl<L: LayoutSource> Engine<L> {
    /// Reveal options pre-filled from this engine's config.
    #[must_use]
    pub fn reveal_options(&self) -> RevealOptions {
        RevealOptions::from_config(&self.config)
    }

    /// Register a reveal toggle on `element`.
    pub fn register_reveal_trigger(
        &mut self,
        scope: ScopeHandle,
        element: ElementId,
        options: RevealOptions,
    ) -> Result<TriggerHandle> {
        let snap = self.live_scope(scope)?.snap_reveals;
        require_absolute_start(&options.start)?;
        let handle = self.next_handle(scope);
        let controller = RevealController::new(element, &options, snap);
        let record = TriggerRecord::new(
            handle,
            element,
            TriggerMode::Toggle,
            options.trigger.unwrap_or(Anchor::Element(element)),
            options.start,
            options.end,
            Behavior::Reveal(controller),
            options.hooks,
        );
        self.insert(record)
    }

    /// Register a pinned region translating `track`.
    ///
    /// In a reveal-only scope this registers a reveal toggle on the
    /// fallback element (the track by default) instead: no pin, no extra
    /// scroll height.
    pub fn register_pin_region(
        &mut self,
        scope: ScopeHandle,
        track: ElementId,
        options: PinOptions,
    ) -> Result<TriggerHandle> {
        if self.live_scope(scope)?.topology == Topology::RevealOnly {
            let element = options.fallback_reveal.unwrap_or(track);
            debug!(
                target: "scrollweave.pin",
                scope = %scope,
                element = %element,
                "reveal-only topology; registering reveal instead of pin"
            );
            let reveal = self
                .reveal_options()
                .trigger(options.section)
                .hooks(options.hooks);
            return self.register_reveal_trigger(scope, element, reveal);
        }

        require_absolute_start(&options.start)?;
        let axis = options.axis.unwrap_or(self.config.pin_axis);
        let handle = self.next_handle(scope);
        let controller = PinController::new(track, &options, axis);
        let record = TriggerRecord::new(
            handle,
            track,
            TriggerMode::Pin,
            Anchor::Element(options.section),
            options.start,
            // Pins derive their end from the measured track.
            Boundary::Relative(0.0),
            Behavior::Pin(controller),
            options.hooks,
        );
        self.insert(record)
    }

    /// Register a scrubbed `from → to` animation on `element`.
    pub fn register_scrub_animation(
        &mut self,
        scope: ScopeHandle,
        element: ElementId,
        from: AnimatedProperties,
        to: AnimatedProperties,
        boundaries: ScrubBoundaries,
    ) -> Result<TriggerHandle> {
        self.live_scope(scope)?;
        require_absolute_start(&boundaries.start)?;
        let handle = self.next_handle(scope);
        let smoothing = boundaries.smoothing.or(self.config.scrub_smoothing());
        let record = TriggerRecord::new(
            handle,
            element,
            TriggerMode::Scrub,
            boundaries.trigger.unwrap_or(Anchor::Element(element)),
            boundaries.start,
            boundaries.end,
            Behavior::Scrub(ScrubBinding::new(element, from, to, smoothing)),
            boundaries.hooks,
        );
        self.insert(record)
    }

    /// Play the boot intro. Its completion gates every trigger's output.
    ///
    /// A later boot timeline supersedes an earlier one.
    pub fn play_boot_timeline(&mut self, scope: ScopeHandle, timeline: Timeline) -> Result<Completion> {
        if timeline.loop_count() == LoopCount::Infinite {
            return Err(EngineError::InvalidTimeline(
                "boot timeline loops forever and can never open the gate".into(),
            ));
        }
        let completion = self.start_timeline(scope, timeline)?;
        self.boot = Some((scope, completion.clone()));
        self.gate_was_open = false;
        Ok(completion)
    }

    /// Play a fixed-duration effect that gates nothing.
    pub fn play_timeline(&mut self, scope: ScopeHandle, timeline: Timeline) -> Result<Completion> {
        self.start_timeline(scope, timeline)
    }

    /// Remove a trigger, cancel what it has in flight and restore its
    /// elements. A stale handle is a no-op returning no writes.
    pub fn unregister(&mut self, handle: TriggerHandle) -> Vec<PropertyWrite> {
        let Some((_, written)) = self.evict(handle) else {
            return Vec::new();
        };
        if let Some(scope) = self.scopes.get_mut(&handle.scope) {
            scope.triggers.retain(|h| *h != handle);
        }
        self.revert(written)
    }

    fn start_timeline(&mut self, scope: ScopeHandle, mut timeline: Timeline) -> Result<Completion> {
        let state = self
            .scopes
            .get_mut(&scope)
            .ok_or(EngineError::UnknownScope(scope))?;
        state.timeline_targets.extend(timeline.targets());
        timeline.play();
        let completion = timeline.completion();
        debug!(
            target: "scrollweave.timeline",
            scope = %scope,
            steps = timeline.step_count(),
            duration = ?timeline.duration(),
            "timeline started"
        );
        self.timelines.push(TimelineEntry { scope, timeline });
        Ok(completion)
    }

    fn next_handle(&mut self, scope: ScopeHandle) -> TriggerHandle {
        self.next_trigger += 1;
        TriggerHandle {
            scope,
            id: self.next_trigger,
        }
    }

    fn insert(&mut self, mut record: TriggerRecord) -> Result<TriggerHandle> {
        let written = record.written_elements();
        for element in &written {
            if let Some(existing) = self.owners.get(element) {
                return Err(EngineError::DuplicateTarget {
                    target: *element,
                    existing: *existing,
                });
            }
        }

        let status = record.resolve(&self.layout, &self.scroll);
        if let Status::HeldInactive { start, end } = status {
            warn!(
                target: "scrollweave.registry",
                target_element = %record.target,
                start,
                end,
                "rejected trigger with inverted boundaries"
            );
            return Err(EngineError::InvalidBoundaryOrder {
                target: record.target,
                start,
                end,
            });
        }
        record.status = status;

        let handle = record.handle;
        for element in written {
            self.owners.insert(element, handle);
        }
        if let Some(scope) = self.scopes.get_mut(&handle.scope) {
            scope.triggers.push(handle);
        }
        debug!(
            target: "scrollweave.registry",
            trigger = %handle,
            target_element = %record.target,
            mode = ?record.mode,
            resolved = matches!(status, Status::Active(_)),
            "trigger registered"
        );
        self.triggers.push(record);
        Ok(handle)
    }

    /// Remove a record. Returns the extent released and the elements it wrote.
    fn evict(&mut self, handle: TriggerHandle) -> Option<(f64, Vec<ElementId>)> {
        let idx = self.triggers.iter().position(|r| r.handle == handle)?;
        let mut record = self.triggers.remove(idx);
        let released = record.release();
        let written = record.written_elements();
        for element in &written {
            if self.owners.get(element) == Some(&handle) {
                self.owners.remove(element);
            }
        }
        debug!(
            target: "scrollweave.registry",
            trigger = %handle,
            released,
            "trigger unregistered"
        );
        Some((released, written))
    }

    /// Identity writes for every touched property of `elements`.
    fn revert(&mut self, elements: Vec<ElementId>) -> Vec<PropertyWrite> {
        let mut seen = AHashSet::new();
        elements
            .into_iter()
            .filter(|e| seen.insert(*e))
            .filter_map(|e| {
                self.touched
                    .remove(&e)
                    .map(|props| PropertyWrite::new(e, props.reverted()))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Frame loop
// ---------------------------------------------------------------------------

impl<L: LayoutSource> Engine<L> {
    /// Run one frame at host time `now`.
    pub fn tick(&mut self, now: Duration) -> FrameOutput {
        let dt = self.last_now.map_or(Duration::ZERO, |last| now.saturating_sub(last));
        self.last_now = Some(now);
        self.frame += 1;

        let span = tracing::debug_span!(
            target: "scrollweave.frame",
            "frame.tick",
            frame = self.frame,
            scroll_y = tracing::field::Empty,
            writes = tracing::field::Empty,
        )
        .entered();

        // 1. input
        let previous_y = self.scroll.scroll_y;
        let applied = self.input.drain_into(&mut self.scroll);
        if applied.resized {
            self.resolver.invalidate();
        }
        span.record("scroll_y", self.scroll.scroll_y);
        let direction = if self.scroll.scroll_y < previous_y {
            Direction::Backward
        } else {
            Direction::Forward
        };

        // 2. geometry
        let full_pass = self.resolver.begin_pass();
        for record in &mut self.triggers {
            if full_pass || !matches!(record.status, Status::Active(_)) {
                record.refresh(&self.layout, &self.scroll);
            }
        }

        // 3. timelines
        let mut writes = Vec::new();
        for entry in &mut self.timelines {
            entry.timeline.tick(dt, &mut writes);
        }
        self.timelines
            .retain(|e| e.timeline.state() != PlaybackState::Finished);

        let gate_open = self.is_gate_open();
        if gate_open && !self.gate_was_open {
            debug!(target: "scrollweave.timeline", frame = self.frame, "boot gate opened");
        }
        self.gate_was_open = gate_open;

        // 4. triggers
        let mut events = Vec::new();
        let mut resolved = 0usize;
        if gate_open {
            for record in &mut self.triggers {
                let eval = record.evaluate(&self.scroll, direction, dt, &mut writes);
                if eval.progress.is_some() {
                    resolved += 1;
                }
                if let Some(crossing) = eval.crossing {
                    events.push(TriggerEvent {
                        handle: record.handle,
                        target: record.target,
                        mode: record.mode,
                        crossing,
                    });
                }
            }
        }

        for w in &writes {
            self.touched.entry(w.element).or_default().merge(&w.props);
        }
        span.record("writes", writes.len());
        trace!(
            target: "scrollweave.frame",
            frame = self.frame,
            events = events.len(),
            resolved,
            gate_open,
            "frame evaluated"
        );

        FrameOutput {
            frame: self.frame,
            scroll: self.scroll,
            writes,
            events,
            gate_open,
            reserved_extent: self.reserved_extent(),
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

impl<L: LayoutSource> Engine<L> {
    /// Open when no boot timeline is in play or the latest one completed.
    #[must_use]
    pub fn is_gate_open(&self) -> bool {
        self.boot.as_ref().is_none_or(|(_, c)| c.is_completed())
    }

    /// Mapped progress of a live, resolved trigger.
    #[must_use]
    pub fn trigger_progress(&self, handle: TriggerHandle) -> Option<f64> {
        self.record(handle)?.progress(self.scroll.scroll_y)
    }

    /// Latch state of a reveal trigger.
    #[must_use]
    pub fn is_entered(&self, handle: TriggerHandle) -> Option<bool> {
        match &self.record(handle)?.behavior {
            Behavior::Reveal(r) => Some(r.is_entered()),
            _ => None,
        }
    }

    #[must_use]
    pub fn pin_state(&self, handle: TriggerHandle) -> Option<PinState> {
        match &self.record(handle)?.behavior {
            Behavior::Pin(p) => Some(p.state()),
            _ => None,
        }
    }

    #[must_use]
    pub fn pin_session(&self, handle: TriggerHandle) -> Option<PinSession> {
        match &self.record(handle)?.behavior {
            Behavior::Pin(p) => p.session().copied(),
            _ => None,
        }
    }

    /// Mode a live trigger was registered with.
    #[must_use]
    pub fn trigger_mode(&self, handle: TriggerHandle) -> Option<TriggerMode> {
        self.record(handle).map(|r| r.mode)
    }

    /// Total extra scroll height reserved by live pin sessions.
    #[must_use]
    pub fn reserved_extent(&self) -> f64 {
        self.triggers
            .iter()
            .filter_map(|r| match &r.behavior {
                Behavior::Pin(p) => p.session().map(PinSession::reserved_extent),
                _ => None,
            })
            .sum()
    }

    #[must_use]
    pub fn trigger_count(&self) -> usize {
        self.triggers.len()
    }

    /// Timelines still playing.
    #[must_use]
    pub fn active_timelines(&self) -> usize {
        self.timelines.len()
    }

    /// Triggers in evaluation order.
    pub fn trigger_handles(&self) -> impl Iterator<Item = TriggerHandle> + '_ {
        self.triggers.iter().map(|r| r.handle)
    }

    fn record(&self, handle: TriggerHandle) -> Option<&TriggerRecord> {
        self.triggers.iter().find(|r| r.handle == handle)
    }
}

fn require_absolute_start(start: &Boundary) -> Result<()> {
    match start {
        Boundary::Expr(_) => Ok(()),
        Boundary::Relative(_) => Err(EngineError::InvalidBoundary(format!(
            "relative boundary `{start}` cannot be used as a start"
        ))),
    }
}
