#![forbid(unsafe_code)]

//! Trigger registry entries.
//!
//! A trigger binds one target element to a scroll interval resolved from
//! boundary expressions. Three modes share the registry:
//!
//! - **Scrub**: target properties interpolate linearly with progress.
//! - **Pin**: a section is held in the viewport while its track translates.
//! - **Toggle**: a reveal latch flips on crossing the start boundary.
//!
//! # Invariants
//!
//! 1. Handles are never reused: ids come from a per-engine monotonic counter.
//! 2. A trigger whose interval resolves with `start >= end` after
//!    registration is held inactive (no writes, no hooks) until a later
//!    resolution is valid again.
//! 3. Hooks fire only on state changes, never on repeated frames in the same
//!    state.

use std::fmt;
use std::time::Duration;

use tracing::{trace, warn};

use crate::error::BoundaryParseError;
use crate::geometry::{Anchor, Boundary, BoundaryExpr, ElementId, GeometryResolver, LayoutSource, Resolution};
use crate::pin::{PinController, PinMeasure};
use crate::progress::{Interval, ScrubSmoother};
use crate::props::{AnimatedProperties, PropertyWrite};
use crate::reveal::RevealController;
use crate::scope::ScopeHandle;
use crate::scroll::ScrollState;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Identity of a registered trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerHandle {
    pub(crate) scope: ScopeHandle,
    pub(crate) id: u64,
}

impl TriggerHandle {
    /// The scope that owns this trigger.
    #[must_use]
    pub fn scope(&self) -> ScopeHandle {
        self.scope
    }
}

impl fmt::Display for TriggerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trigger#{}@{}", self.id, self.scope)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerMode {
    Scrub,
    Pin,
    Toggle,
}

/// Which way scroll was moving when a crossing happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Scrolling down the document.
    Forward,
    /// Scrolling back up.
    Backward,
}

/// A state change reported by a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    Entered(Direction),
    Left(Direction),
}

type HandleHook = Box<dyn FnMut(TriggerHandle)>;
type ProgressHook = Box<dyn FnMut(TriggerHandle, f64)>;

/// Callbacks content code attaches to a trigger.
#[derive(Default)]
pub struct TriggerHooks {
    on_enter: Option<HandleHook>,
    on_leave: Option<HandleHook>,
    on_progress: Option<ProgressHook>,
}

impl fmt::Debug for TriggerHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerHooks")
            .field("on_enter", &self.on_enter.is_some())
            .field("on_leave", &self.on_leave.is_some())
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl TriggerHooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per entry into the active state.
    #[must_use]
    pub fn on_enter(mut self, hook: impl FnMut(TriggerHandle) + 'static) -> Self {
        self.on_enter = Some(Box::new(hook));
        self
    }

    /// Called once per exit from the active state.
    #[must_use]
    pub fn on_leave(mut self, hook: impl FnMut(TriggerHandle) + 'static) -> Self {
        self.on_leave = Some(Box::new(hook));
        self
    }

    /// Called whenever mapped progress changes.
    #[must_use]
    pub fn on_progress(mut self, hook: impl FnMut(TriggerHandle, f64) + 'static) -> Self {
        self.on_progress = Some(Box::new(hook));
        self
    }

    fn fire(&mut self, handle: TriggerHandle, crossing: Crossing) {
        let hook = match crossing {
            Crossing::Entered(_) => self.on_enter.as_mut(),
            Crossing::Left(_) => self.on_leave.as_mut(),
        };
        if let Some(hook) = hook {
            hook(handle);
        }
    }

    fn progress(&mut self, handle: TriggerHandle, progress: f64) {
        if let Some(hook) = self.on_progress.as_mut() {
            hook(handle, progress);
        }
    }
}

/// Reference and boundaries for a scrubbed animation.
#[derive(Debug)]
pub struct ScrubBoundaries {
    /// Measured element; `None` measures the animated element itself.
    pub trigger: Option<Anchor>,
    pub start: Boundary,
    pub end: Boundary,
    /// Applied progress lag; `None` follows scroll exactly.
    pub smoothing: Option<Duration>,
    pub hooks: TriggerHooks,
}

impl Default for ScrubBoundaries {
    fn default() -> Self {
        Self {
            trigger: None,
            start: Boundary::Expr(BoundaryExpr::TOP_BOTTOM),
            end: Boundary::Expr(BoundaryExpr::BOTTOM_TOP),
            smoothing: None,
            hooks: TriggerHooks::default(),
        }
    }
}

impl ScrubBoundaries {
    /// `top bottom` → `bottom top` of the animated element.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whole-document progress: `top top` → `bottom bottom`.
    #[must_use]
    pub fn document() -> Self {
        Self {
            trigger: Some(Anchor::Document),
            start: Boundary::Expr(BoundaryExpr::TOP_TOP),
            end: Boundary::Expr(BoundaryExpr::BOTTOM_BOTTOM),
            ..Self::default()
        }
    }

    /// Parse both boundaries from text, e.g. `("top top", "bottom top")`.
    pub fn between(start: &str, end: &str) -> Result<Self, BoundaryParseError> {
        Ok(Self {
            start: start.parse()?,
            end: end.parse()?,
            ..Self::default()
        })
    }

    /// Measure boundaries against another element.
    #[must_use]
    pub fn trigger(mut self, anchor: impl Into<Anchor>) -> Self {
        self.trigger = Some(anchor.into());
        self
    }

    #[must_use]
    pub fn start(mut self, start: impl Into<Boundary>) -> Self {
        self.start = start.into();
        self
    }

    #[must_use]
    pub fn end(mut self, end: impl Into<Boundary>) -> Self {
        self.end = end.into();
        self
    }

    #[must_use]
    pub fn smoothing(mut self, lag: Duration) -> Self {
        self.smoothing = Some(lag);
        self
    }

    #[must_use]
    pub fn hooks(mut self, hooks: TriggerHooks) -> Self {
        self.hooks = hooks;
        self
    }
}

// ---------------------------------------------------------------------------
// Scrub binding
// ---------------------------------------------------------------------------

/// Linear `from → to` interpolation driven by (optionally smoothed) progress.
#[derive(Debug)]
pub(crate) struct ScrubBinding {
    target: ElementId,
    from: AnimatedProperties,
    to: AnimatedProperties,
    smoother: ScrubSmoother,
    inside: bool,
    last_written: Option<f64>,
}

impl ScrubBinding {
    pub(crate) fn new(
        target: ElementId,
        from: AnimatedProperties,
        to: AnimatedProperties,
        smoothing: Option<Duration>,
    ) -> Self {
        Self {
            target,
            from,
            to,
            smoother: ScrubSmoother::new(smoothing),
            inside: false,
            last_written: None,
        }
    }

    /// Pure evaluation: properties at `progress`.
    #[must_use]
    pub(crate) fn properties_at(&self, progress: f64) -> AnimatedProperties {
        AnimatedProperties::lerp(&self.from, &self.to, progress)
    }

    fn evaluate(
        &mut self,
        interval: Option<Interval>,
        scroll_y: f64,
        direction: Direction,
        dt: Duration,
        out: &mut Vec<PropertyWrite>,
    ) -> Option<Crossing> {
        let interval = interval?;
        let applied = self.smoother.step(interval.progress(scroll_y), dt);
        if self.last_written != Some(applied) {
            self.last_written = Some(applied);
            out.push(PropertyWrite::new(self.target, self.properties_at(applied)));
        }

        let inside = interval.contains(scroll_y);
        if inside == self.inside {
            return None;
        }
        self.inside = inside;
        Some(if inside {
            Crossing::Entered(direction)
        } else {
            Crossing::Left(direction)
        })
    }
}

// ---------------------------------------------------------------------------
// Registry record
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) enum Behavior {
    Scrub(ScrubBinding),
    Pin(PinController),
    Reveal(RevealController),
}

/// Resolution status of a trigger's interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Status {
    Active(Interval),
    Unresolved,
    /// Resolved with `start >= end`; no output until fixed.
    HeldInactive { start: f64, end: f64 },
    /// Pin whose track fits in the viewport.
    Degenerate,
}

/// Outcome of one frame's evaluation of a trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Evaluation {
    pub(crate) crossing: Option<Crossing>,
    pub(crate) progress: Option<f64>,
}

#[derive(Debug)]
pub(crate) struct TriggerRecord {
    pub(crate) handle: TriggerHandle,
    pub(crate) target: ElementId,
    pub(crate) mode: TriggerMode,
    anchor: Anchor,
    start: Boundary,
    end: Boundary,
    pub(crate) behavior: Behavior,
    hooks: TriggerHooks,
    pub(crate) status: Status,
    /// Last progress reported to `on_progress`.
    reported: Option<f64>,
}

impl TriggerRecord {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        handle: TriggerHandle,
        target: ElementId,
        mode: TriggerMode,
        anchor: Anchor,
        start: Boundary,
        end: Boundary,
        behavior: Behavior,
        hooks: TriggerHooks,
    ) -> Self {
        Self {
            handle,
            target,
            mode,
            anchor,
            start,
            end,
            behavior,
            hooks,
            status: Status::Unresolved,
            reported: None,
        }
    }

    /// Every element this trigger writes to.
    pub(crate) fn written_elements(&self) -> Vec<ElementId> {
        match &self.behavior {
            Behavior::Pin(pin) => pin.elements(),
            Behavior::Scrub(_) | Behavior::Reveal(_) => vec![self.target],
        }
    }

    /// Resolve the interval against current layout.
    pub(crate) fn resolve<L: LayoutSource + ?Sized>(&self, layout: &L, scroll: &ScrollState) -> Status {
        let end = match &self.behavior {
            Behavior::Pin(pin) => match pin.measure(layout, scroll) {
                PinMeasure::Unmounted => return Status::Unresolved,
                PinMeasure::Degenerate => return Status::Degenerate,
                PinMeasure::Extent(extent) => Boundary::Relative(extent),
            },
            Behavior::Scrub(_) | Behavior::Reveal(_) => self.end,
        };
        match GeometryResolver::resolve_interval(layout, self.anchor, &self.start, &end, scroll) {
            Resolution::Resolved(interval) => Status::Active(interval),
            Resolution::Unresolved => Status::Unresolved,
            Resolution::Inverted { start, end } => Status::HeldInactive { start, end },
        }
    }

    /// Re-resolve and store the status, warning on a fresh inversion.
    pub(crate) fn refresh<L: LayoutSource + ?Sized>(&mut self, layout: &L, scroll: &ScrollState) {
        let status = self.resolve(layout, scroll);
        if let Status::HeldInactive { start, end } = status {
            if !matches!(self.status, Status::HeldInactive { .. }) {
                warn!(
                    target: "scrollweave.geometry",
                    trigger = %self.handle,
                    target_element = %self.target,
                    start,
                    end,
                    "boundaries inverted after layout change; trigger held inactive"
                );
            }
        }
        self.status = status;
    }

    /// Interval while active.
    pub(crate) fn interval(&self) -> Option<Interval> {
        match self.status {
            Status::Active(interval) => Some(interval),
            _ => None,
        }
    }

    /// Mapped progress at `scroll_y`, if resolved.
    pub(crate) fn progress(&self, scroll_y: f64) -> Option<f64> {
        self.interval().map(|i| i.progress(scroll_y))
    }

    /// Run the controller and fire hooks.
    pub(crate) fn evaluate(
        &mut self,
        scroll: &ScrollState,
        direction: Direction,
        dt: Duration,
        writes: &mut Vec<PropertyWrite>,
    ) -> Evaluation {
        let interval = self.interval();
        let scroll_y = scroll.scroll_y;
        let crossing = match &mut self.behavior {
            Behavior::Scrub(scrub) => scrub.evaluate(interval, scroll_y, direction, dt, writes),
            Behavior::Pin(pin) => pin.evaluate(self.handle, interval, scroll, direction, dt, writes),
            Behavior::Reveal(reveal) => {
                reveal.evaluate(self.handle, interval.map(|i| i.start()), scroll_y, direction, dt, writes)
            }
        };

        if let Some(crossing) = crossing {
            self.hooks.fire(self.handle, crossing);
        }

        let progress = self.progress(scroll_y);
        if let Some(p) = progress {
            if self.reported != Some(p) {
                self.reported = Some(p);
                self.hooks.progress(self.handle, p);
            }
        }

        trace!(
            target: "scrollweave.registry",
            trigger = %self.handle,
            progress = progress.unwrap_or(-1.0),
            "evaluated"
        );
        Evaluation { crossing, progress }
    }

    /// Stop everything in flight. Returns the reserved extent released.
    pub(crate) fn release(&mut self) -> f64 {
        match &mut self.behavior {
            Behavior::Pin(pin) => pin.release(self.handle),
            Behavior::Reveal(reveal) => {
                reveal.cancel();
                0.0
            }
            Behavior::Scrub(_) => 0.0,
        }
    }
}
