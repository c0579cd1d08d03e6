#![forbid(unsafe_code)]

//! Reveal toggle controller.
//!
//! A binary latch per trigger on the single `start` boundary:
//! `entered = scroll_y >= start`. Crossing it forward plays the reveal
//! transition from its hidden starting state to rest; crossing back plays it
//! in reverse from wherever it currently is, so re-entry replays identically.
//!
//! # Invariants
//!
//! 1. The latch flips only when `scroll_y >= start` changes value; repeated
//!    frames in the same state fire nothing.
//! 2. Forward delay applies only when starting from the fully hidden state.
//! 3. The first evaluation writes the current visual state, so a reveal that
//!    starts below the fold is hidden before it is ever shown.

use std::time::Duration;

use tracing::debug;

use crate::config::EngineConfig;
use crate::easing::Easing;
use crate::geometry::{Anchor, Boundary, BoundaryExpr, ElementId};
use crate::props::{AnimatedProperties, PropertyWrite};
use crate::trigger::{Crossing, Direction, TriggerHandle, TriggerHooks};

/// Options for [`Engine::register_reveal_trigger`](crate::Engine::register_reveal_trigger).
#[derive(Debug)]
pub struct RevealOptions {
    /// Measured element; `None` measures the revealed element itself.
    pub trigger: Option<Anchor>,
    /// The latch threshold.
    pub start: Boundary,
    /// Only used for progress reporting.
    pub end: Boundary,
    /// Hidden starting state; the resting state is identity.
    pub from: AnimatedProperties,
    pub duration: Duration,
    pub easing: Easing,
    pub delay: Duration,
    pub hooks: TriggerHooks,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl RevealOptions {
    /// Options carrying the configured reveal defaults.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            trigger: None,
            start: Boundary::Expr(config.reveal.start),
            end: Boundary::Expr(BoundaryExpr::BOTTOM_TOP),
            from: config.reveal.initial(),
            duration: config.reveal.duration(),
            easing: config.reveal.easing,
            delay: Duration::ZERO,
            hooks: TriggerHooks::default(),
        }
    }

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
    pub fn from(mut self, props: AnimatedProperties) -> Self {
        self.from = props;
        self
    }

    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn hooks(mut self, hooks: TriggerHooks) -> Self {
        self.hooks = hooks;
        self
    }
}

/// Per-item delays for a group: `index × each`.
///
/// ```
/// use std::time::Duration;
/// use scrollweave_core::stagger;
///
/// let d = stagger(3, Duration::from_millis(150));
/// assert_eq!(d, [Duration::ZERO, Duration::from_millis(150), Duration::from_millis(300)]);
/// ```
#[must_use]
pub fn stagger(count: u32, each: Duration) -> Vec<Duration> {
    (0..count).map(|i| each.saturating_mul(i)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Motion {
    Idle,
    Forward { delay_left: Duration },
    Reverse,
}

#[derive(Debug)]
pub(crate) struct RevealController {
    target: ElementId,
    from: AnimatedProperties,
    duration: Duration,
    easing: Easing,
    delay: Duration,
    entered: bool,
    /// Linear transition time in `[0, 1]`: 0 hidden, 1 at rest.
    position: f64,
    motion: Motion,
    last_written: Option<f64>,
}

impl RevealController {
    pub(crate) fn new(target: ElementId, options: &RevealOptions, snap: bool) -> Self {
        let (duration, delay) = if snap {
            (Duration::ZERO, Duration::ZERO)
        } else {
            (options.duration, options.delay)
        };
        Self {
            target,
            from: options.from,
            duration,
            easing: options.easing,
            delay,
            entered: false,
            position: 0.0,
            motion: Motion::Idle,
            last_written: None,
        }
    }

    pub(crate) fn is_entered(&self) -> bool {
        self.entered
    }

    pub(crate) fn evaluate(
        &mut self,
        handle: TriggerHandle,
        start: Option<f64>,
        scroll_y: f64,
        direction: Direction,
        dt: Duration,
        out: &mut Vec<PropertyWrite>,
    ) -> Option<Crossing> {
        let in_flight = self.motion != Motion::Idle;
        self.advance(dt);
        // Unresolved: finish a running transition, otherwise leave the element untouched.
        if start.is_none() && !in_flight {
            return None;
        }

        let mut crossing = None;
        if let Some(start) = start {
            let entered = scroll_y >= start;
            if entered != self.entered {
                self.entered = entered;
                if entered {
                    let delay_left = if self.position == 0.0 { self.delay } else { Duration::ZERO };
                    self.motion = Motion::Forward { delay_left };
                    crossing = Some(Crossing::Entered(direction));
                } else {
                    self.motion = Motion::Reverse;
                    crossing = Some(Crossing::Left(direction));
                }
                debug!(
                    target: "scrollweave.reveal",
                    trigger = %handle,
                    entered,
                    start,
                    scroll_y,
                    "reveal latch flipped"
                );
                self.advance(Duration::ZERO);
            }
        }

        let eased = self.easing.apply(self.position);
        if self.last_written != Some(eased) {
            self.last_written = Some(eased);
            out.push(PropertyWrite::new(
                self.target,
                AnimatedProperties::lerp(&self.from, &AnimatedProperties::default(), eased),
            ));
        }
        crossing
    }

    fn advance(&mut self, dt: Duration) {
        let duration = self.duration;
        let step = move |dt: Duration| {
            if duration.is_zero() {
                f64::INFINITY
            } else {
                dt.as_secs_f64() / duration.as_secs_f64()
            }
        };
        match self.motion {
            Motion::Idle => {}
            Motion::Forward { delay_left } => {
                if dt < delay_left {
                    self.motion = Motion::Forward {
                        delay_left: delay_left - dt,
                    };
                    return;
                }
                let run = dt - delay_left;
                self.position = (self.position + step(run)).min(1.0);
                self.motion = if self.position >= 1.0 {
                    Motion::Idle
                } else {
                    Motion::Forward {
                        delay_left: Duration::ZERO,
                    }
                };
            }
            Motion::Reverse => {
                self.position = (self.position - step(dt)).max(0.0);
                if self.position <= 0.0 {
                    self.motion = Motion::Idle;
                }
            }
        }
    }

    /// Stop any in-flight transition where it is.
    pub(crate) fn cancel(&mut self) {
        self.motion = Motion::Idle;
    }

    pub(crate) fn is_animating(&self) -> bool {
        self.motion != Motion::Idle
    }
}
