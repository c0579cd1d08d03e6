#![forbid(unsafe_code)]

//! Pin region controller.
//!
//! While scroll is inside a pin interval the section is held at the viewport
//! top and its track translates along the pin axis in proportion to progress,
//! so a wide horizontal track is walked through by vertical scrolling.
//!
//! ```text
//!   Inactive ──(scroll enters [start, end])──▶ Pinned
//!      ▲                                         │
//!      └────────(scroll leaves, either way)──────┘
//! ```
//!
//! # Invariants
//!
//! 1. `extent = max(track_total − viewport, 0)`; the interval is
//!    `[start, start + extent]`.
//! 2. Track offset on the axis is `−progress × extent`.
//! 3. Reserved extent equals `extent` while pinned and `0` otherwise.
//!
//! # Failure Modes
//!
//! - Track fits in the viewport (`extent == 0`): no-op pin. The section is
//!   never pinned and the track offset stays at zero.
//! - Track or section unmounted: the pin releases and stays inactive until
//!   geometry resolves again.

use std::time::Duration;

use tracing::debug;

use crate::geometry::{Boundary, BoundaryExpr, ElementBox, ElementId, LayoutSource};
use crate::progress::{Interval, ScrubSmoother};
use crate::props::{AnimatedProperties, PropertyWrite};
use crate::scroll::ScrollState;
use crate::trigger::{Crossing, Direction, TriggerHandle, TriggerHooks};

/// Axis the track translates along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum PinAxis {
    #[default]
    Horizontal,
    Vertical,
}

impl PinAxis {
    fn extents(self, track: &ElementBox, scroll: &ScrollState) -> (f64, f64) {
        match self {
            Self::Horizontal => (track.scroll_width, scroll.viewport_width),
            Self::Vertical => (track.scroll_height, scroll.viewport_height),
        }
    }

    fn offset(self, value: f64) -> AnimatedProperties {
        match self {
            Self::Horizontal => AnimatedProperties::default().x(value),
            Self::Vertical => AnimatedProperties::default().y(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    Inactive,
    Pinned,
}

/// A live pin: exists only between entering and leaving the interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinSession {
    pub trigger: TriggerHandle,
    pub track_total_extent: f64,
    pub viewport_extent: f64,
}

impl PinSession {
    /// Extra scroll height the host must reserve while pinned.
    #[must_use]
    pub fn reserved_extent(&self) -> f64 {
        (self.track_total_extent - self.viewport_extent).max(0.0)
    }
}

/// Options for [`Engine::register_pin_region`](crate::Engine::register_pin_region).
#[derive(Debug)]
pub struct PinOptions {
    /// Element held in the viewport; also the boundary reference.
    pub section: ElementId,
    /// `None` uses the engine's configured axis.
    pub axis: Option<PinAxis>,
    /// Where pinning begins; defaults to `top top` of the section.
    pub start: Boundary,
    /// Element scaled along X by progress.
    pub progress_bar: Option<ElementId>,
    /// Lag applied to the track translation.
    pub smoothing: Option<Duration>,
    /// Lag applied to the progress bar.
    pub bar_smoothing: Option<Duration>,
    /// Element revealed instead when the scope has no pin topology;
    /// defaults to the track.
    pub fallback_reveal: Option<ElementId>,
    pub hooks: TriggerHooks,
}

impl PinOptions {
    #[must_use]
    pub fn new(section: ElementId) -> Self {
        Self {
            section,
            axis: None,
            start: Boundary::Expr(BoundaryExpr::TOP_TOP),
            progress_bar: None,
            smoothing: None,
            bar_smoothing: None,
            fallback_reveal: None,
            hooks: TriggerHooks::default(),
        }
    }

    #[must_use]
    pub fn axis(mut self, axis: PinAxis) -> Self {
        self.axis = Some(axis);
        self
    }

    #[must_use]
    pub fn start(mut self, start: impl Into<Boundary>) -> Self {
        self.start = start.into();
        self
    }

    #[must_use]
    pub fn progress_bar(mut self, bar: ElementId) -> Self {
        self.progress_bar = Some(bar);
        self
    }

    #[must_use]
    pub fn smoothing(mut self, lag: Duration) -> Self {
        self.smoothing = Some(lag);
        self
    }

    #[must_use]
    pub fn bar_smoothing(mut self, lag: Duration) -> Self {
        self.bar_smoothing = Some(lag);
        self
    }

    #[must_use]
    pub fn fallback_reveal(mut self, element: ElementId) -> Self {
        self.fallback_reveal = Some(element);
        self
    }

    #[must_use]
    pub fn hooks(mut self, hooks: TriggerHooks) -> Self {
        self.hooks = hooks;
        self
    }
}

/// Track measurement outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PinMeasure {
    Unmounted,
    Degenerate,
    Extent(f64),
}

#[derive(Debug)]
pub(crate) struct PinController {
    section: ElementId,
    track: ElementId,
    bar: Option<ElementId>,
    axis: PinAxis,
    session: Option<PinSession>,
    smoother: ScrubSmoother,
    bar_smoother: ScrubSmoother,
    last_offset: Option<f64>,
    last_bar: Option<f64>,
}

impl PinController {
    pub(crate) fn new(track: ElementId, options: &PinOptions, axis: PinAxis) -> Self {
        Self {
            section: options.section,
            track,
            bar: options.progress_bar,
            axis,
            session: None,
            smoother: ScrubSmoother::new(options.smoothing),
            bar_smoother: ScrubSmoother::new(options.bar_smoothing),
            last_offset: None,
            last_bar: None,
        }
    }

    /// Elements this pin writes: section, track, optional bar.
    pub(crate) fn elements(&self) -> Vec<ElementId> {
        let mut v = vec![self.track, self.section];
        v.extend(self.bar);
        v
    }

    pub(crate) fn session(&self) -> Option<&PinSession> {
        self.session.as_ref()
    }

    pub(crate) fn state(&self) -> PinState {
        if self.session.is_some() {
            PinState::Pinned
        } else {
            PinState::Inactive
        }
    }

    pub(crate) fn measure<L: LayoutSource + ?Sized>(&self, layout: &L, scroll: &ScrollState) -> PinMeasure {
        let Some(track) = layout.element_box(self.track) else {
            return PinMeasure::Unmounted;
        };
        let (total, viewport) = self.axis.extents(&track, scroll);
        let extent = total - viewport;
        if !extent.is_finite() {
            PinMeasure::Unmounted
        } else if extent <= 0.0 {
            PinMeasure::Degenerate
        } else {
            PinMeasure::Extent(extent)
        }
    }

    pub(crate) fn evaluate(
        &mut self,
        handle: TriggerHandle,
        interval: Option<Interval>,
        scroll: &ScrollState,
        direction: Direction,
        dt: Duration,
        out: &mut Vec<PropertyWrite>,
    ) -> Option<Crossing> {
        let Some(interval) = interval else {
            let crossing = self.unpin(handle, direction, out);
            if self.last_offset.is_some_and(|o| o != 0.0) {
                self.write_offset(0.0, out);
            }
            return crossing;
        };

        let extent = interval.length();
        let viewport_extent = match self.axis {
            PinAxis::Horizontal => scroll.viewport_width,
            PinAxis::Vertical => scroll.viewport_height,
        };
        let mut crossing = None;
        if interval.contains(scroll.scroll_y) {
            let session = PinSession {
                trigger: handle,
                track_total_extent: extent + viewport_extent,
                viewport_extent,
            };
            if self.session.is_none() {
                out.push(PropertyWrite::new(
                    self.section,
                    AnimatedProperties::default().pinned(true),
                ));
                debug!(
                    target: "scrollweave.pin",
                    trigger = %handle,
                    reserved = session.reserved_extent(),
                    "pinned"
                );
                crossing = Some(Crossing::Entered(direction));
            }
            self.session = Some(session);
        } else {
            crossing = self.unpin(handle, direction, out);
        }

        let target = interval.progress(scroll.scroll_y);
        let applied = self.smoother.step(target, dt);
        let offset = 0.0 - applied * extent;
        if self.last_offset != Some(offset) {
            self.write_offset(offset, out);
        }
        if let Some(bar) = self.bar {
            let scale = self.bar_smoother.step(target, dt);
            if self.last_bar != Some(scale) {
                self.last_bar = Some(scale);
                out.push(PropertyWrite::new(bar, AnimatedProperties::default().scale_x(scale)));
            }
        }
        crossing
    }

    fn write_offset(&mut self, offset: f64, out: &mut Vec<PropertyWrite>) {
        self.last_offset = Some(offset);
        out.push(PropertyWrite::new(self.track, self.axis.offset(offset)));
    }

    fn unpin(
        &mut self,
        handle: TriggerHandle,
        direction: Direction,
        out: &mut Vec<PropertyWrite>,
    ) -> Option<Crossing> {
        let session = self.session.take()?;
        out.push(PropertyWrite::new(
            self.section,
            AnimatedProperties::default().pinned(false),
        ));
        debug!(
            target: "scrollweave.pin",
            trigger = %handle,
            released = session.reserved_extent(),
            "unpinned"
        );
        Some(Crossing::Left(direction))
    }

    /// Destroy any live session. Returns the extent released.
    pub(crate) fn release(&mut self, handle: TriggerHandle) -> f64 {
        match self.session.take() {
            Some(session) => {
                debug!(
                    target: "scrollweave.pin",
                    trigger = %handle,
                    released = session.reserved_extent(),
                    "pin session destroyed"
                );
                session.reserved_extent()
            }
            None => 0.0,
        }
    }
}
