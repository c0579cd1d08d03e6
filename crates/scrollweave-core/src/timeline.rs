#![forbid(unsafe_code)]

//! Timeline: time-based property sequences.
//!
//! A [`Timeline`] schedules [`TimelineStep`]s at offsets from one logical
//! start. Each step interpolates its target's properties from `from` to `to`
//! over its duration with its own easing; overlapping steps are independent.
//! The boot intro is a timeline whose [`Completion`] gates scroll output.
//!
//! # Usage
//!
//! ```
//! use std::time::Duration;
//! use scrollweave_core::{AnimatedProperties, ElementId, Easing, Timeline, TimelineStep};
//!
//! let wipe = ElementId(1);
//! let mut tl = Timeline::new()
//!     .add(Duration::ZERO, TimelineStep::new(wipe, Duration::from_millis(500))
//!         .to(AnimatedProperties::default().y_percent(-100.0))
//!         .easing(Easing::PowerInOut(4)));
//! tl.play();
//!
//! let mut writes = Vec::new();
//! tl.tick(Duration::from_millis(500), &mut writes);
//! assert!(tl.completion().is_completed());
//! assert_eq!(writes.last().unwrap().props.y_percent, Some(-100.0));
//! ```
//!
//! # Invariants
//!
//! 1. Steps are always sorted by offset (stable for equal offsets).
//! 2. Total duration is `max(offset + duration)` over all steps.
//! 3. The first tick after `play()` writes every step's starting values, so a
//!    delayed step never shows its resting state early.
//! 4. A step writes only when its eased progress changed since its last write.
//! 5. The [`Completion`] settles exactly once: `Completed` on natural end,
//!    `Cancelled` on [`cancel`](Timeline::cancel).
//!
//! # Failure Modes
//!
//! - Empty or zero-length timeline: completes on its first tick.
//! - Infinite loop: never completes; such a timeline must not gate anything.
//! - Seek past end: clamps to the total duration.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use crate::easing::Easing;
use crate::geometry::ElementId;
use crate::props::{AnimatedProperties, PropertyWrite};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How many times to play the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopCount {
    /// Play once.
    Once,
    /// Repeat a fixed number of times (total plays = times + 1).
    Times(u32),
    /// Loop forever.
    Infinite,
}

/// Playback state of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
    /// All loops exhausted, or cancelled.
    Finished,
}

/// Settlement of a timeline's completion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionState {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

/// Shared, observable completion signal.
///
/// Clones observe the same state. Only the owning timeline settles it.
#[derive(Debug, Clone, Default)]
pub struct Completion(Rc<Cell<CompletionState>>);

impl Completion {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> CompletionState {
        self.0.get()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state() == CompletionState::Completed
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state() == CompletionState::Pending
    }

    /// Settle from `Pending`; later calls are ignored.
    fn settle(&self, state: CompletionState) -> bool {
        if self.is_pending() {
            self.0.set(state);
            true
        } else {
            false
        }
    }
}

/// One interpolated property change on one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineStep {
    pub target: ElementId,
    pub from: AnimatedProperties,
    pub to: AnimatedProperties,
    pub duration: Duration,
    pub easing: Easing,
}

impl TimelineStep {
    /// A linear step that changes nothing until `from`/`to` are set.
    #[must_use]
    pub fn new(target: ElementId, duration: Duration) -> Self {
        Self {
            target,
            from: AnimatedProperties::default(),
            to: AnimatedProperties::default(),
            duration,
            easing: Easing::Linear,
        }
    }

    #[must_use]
    pub fn from(mut self, props: AnimatedProperties) -> Self {
        self.from = props;
        self
    }

    #[must_use]
    pub fn to(mut self, props: AnimatedProperties) -> Self {
        self.to = props;
        self
    }

    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Eased progress of this step at `local` time since its own start.
    fn eased_at(&self, local: Option<Duration>) -> f64 {
        match local {
            None => 0.0,
            Some(_) if self.duration.is_zero() => 1.0,
            Some(t) => self
                .easing
                .apply(t.as_secs_f64() / self.duration.as_secs_f64()),
        }
    }
}

#[derive(Debug)]
struct ScheduledStep {
    offset: Duration,
    step: TimelineStep,
    /// Eased progress at the last write, `None` before the first write.
    written: Option<f64>,
}

impl ScheduledStep {
    fn end(&self) -> Duration {
        self.offset.saturating_add(self.step.duration)
    }
}

type CompleteHook = Box<dyn FnOnce()>;

/// A sequence of steps sharing one logical start.
pub struct Timeline {
    steps: Vec<ScheduledStep>,
    labels: Vec<(String, Duration)>,
    total_duration: Duration,
    /// End of the most recently added step, used by [`then`](Self::then).
    last_end: Duration,
    loop_count: LoopCount,
    yoyo: bool,
    iteration: u32,
    state: PlaybackState,
    current_time: Duration,
    completion: Completion,
    on_complete: Option<CompleteHook>,
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("step_count", &self.steps.len())
            .field("total_duration", &self.total_duration)
            .field("loop_count", &self.loop_count)
            .field("yoyo", &self.yoyo)
            .field("state", &self.state)
            .field("current_time", &self.current_time)
            .field("completion", &self.completion.state())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Timeline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            labels: Vec::new(),
            total_duration: Duration::ZERO,
            last_end: Duration::ZERO,
            loop_count: LoopCount::Once,
            yoyo: false,
            iteration: 0,
            state: PlaybackState::Idle,
            current_time: Duration::ZERO,
            completion: Completion::new(),
            on_complete: None,
        }
    }

    /// Add a step at an absolute offset.
    #[must_use]
    pub fn add(mut self, offset: Duration, step: TimelineStep) -> Self {
        self.push_step(offset, step);
        self
    }

    /// Add a step at an absolute offset and label that offset.
    #[must_use]
    pub fn add_labeled(mut self, label: &str, offset: Duration, step: TimelineStep) -> Self {
        self.labels.push((label.to_string(), offset));
        self.push_step(offset, step);
        self
    }

    /// Add a step starting when the previously added step ends.
    #[must_use]
    pub fn then(self, step: TimelineStep) -> Self {
        let offset = self.last_end;
        self.add(offset, step)
    }

    /// Name the current end of the timeline for [`seek_label`](Self::seek_label).
    #[must_use]
    pub fn label(mut self, label: &str) -> Self {
        self.labels.push((label.to_string(), self.last_end));
        self
    }

    #[must_use]
    pub fn set_loop_count(mut self, count: LoopCount) -> Self {
        self.loop_count = count;
        self
    }

    /// Alternate direction on every repeat.
    #[must_use]
    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    /// Run `hook` once when the timeline completes naturally.
    #[must_use]
    pub fn on_complete(mut self, hook: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }

    fn push_step(&mut self, offset: Duration, step: TimelineStep) {
        let scheduled = ScheduledStep {
            offset,
            step,
            written: None,
        };
        self.last_end = scheduled.end();
        self.total_duration = self.total_duration.max(scheduled.end());
        let pos = self.steps.partition_point(|s| s.offset <= offset);
        self.steps.insert(pos, scheduled);
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Playback control
// ---------------------------------------------------------------------------

impl Timeline {
    /// Start or restart playback from the beginning.
    pub fn play(&mut self) {
        self.current_time = Duration::ZERO;
        self.iteration = 0;
        for s in &mut self.steps {
            s.written = None;
        }
        self.state = PlaybackState::Playing;
    }

    /// Pause playback. No-op unless playing.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Resume from pause. No-op unless paused.
    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.state = PlaybackState::Playing;
        }
    }

    /// Jump to `time` (clamped) within the current iteration.
    ///
    /// Values are written on the next tick. An idle or finished timeline
    /// becomes paused at the seek point.
    pub fn seek(&mut self, time: Duration) {
        self.current_time = time.min(self.total_duration);
        if matches!(self.state, PlaybackState::Idle | PlaybackState::Finished)
            && self.completion.is_pending()
        {
            self.state = PlaybackState::Paused;
        }
    }

    /// Seek to a label. Returns `false` (no-op) if the label is unknown.
    pub fn seek_label(&mut self, label: &str) -> bool {
        let offset = self
            .labels
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, t)| *t);
        match offset {
            Some(t) => {
                self.seek(t);
                true
            }
            None => false,
        }
    }

    /// Advance by `dt`, appending changed step values to `out`.
    ///
    /// Paused timelines still flush a pending seek. Returns `true` on the tick
    /// the timeline completes.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<PropertyWrite>) -> bool {
        match self.state {
            PlaybackState::Playing => {}
            PlaybackState::Paused => {
                self.write_at(self.local_time(), out);
                return false;
            }
            PlaybackState::Idle | PlaybackState::Finished => return false,
        }

        let mut time = self.current_time.saturating_add(dt);
        let mut finished = false;
        if time >= self.total_duration {
            if self.total_duration.is_zero() {
                finished = true;
            } else {
                while time >= self.total_duration {
                    if !self.may_repeat() {
                        finished = true;
                        break;
                    }
                    time -= self.total_duration;
                    self.iteration = self.iteration.saturating_add(1);
                }
            }
        }

        if finished {
            self.current_time = self.total_duration;
            self.state = PlaybackState::Finished;
        } else {
            self.current_time = time;
        }
        self.write_at(self.local_time(), out);

        if finished && self.completion.settle(CompletionState::Completed) {
            debug!(
                target: "scrollweave.timeline",
                steps = self.steps.len(),
                iterations = self.iteration + 1,
                "timeline completed"
            );
            if let Some(hook) = self.on_complete.take() {
                hook();
            }
        }
        finished
    }

    /// Stop mid-flight: every written step returns to its starting values and
    /// the completion settles as `Cancelled`. No-op once settled.
    pub fn cancel(&mut self, out: &mut Vec<PropertyWrite>) {
        if !self.completion.settle(CompletionState::Cancelled) {
            return;
        }
        for s in &mut self.steps {
            if s.written.is_some_and(|p| p != 0.0) {
                out.push(PropertyWrite::new(
                    s.step.target,
                    AnimatedProperties::lerp(&s.step.from, &s.step.to, 0.0),
                ));
                s.written = Some(0.0);
            }
        }
        self.state = PlaybackState::Finished;
        self.on_complete = None;
        debug!(target: "scrollweave.timeline", at = ?self.current_time, "timeline cancelled");
    }

    fn may_repeat(&self) -> bool {
        match self.loop_count {
            LoopCount::Once => false,
            LoopCount::Times(n) => self.iteration < n,
            LoopCount::Infinite => true,
        }
    }

    /// Playhead position after applying yoyo direction.
    fn local_time(&self) -> Duration {
        if self.yoyo && self.iteration % 2 == 1 {
            self.total_duration.saturating_sub(self.current_time)
        } else {
            self.current_time
        }
    }

    fn write_at(&mut self, time: Duration, out: &mut Vec<PropertyWrite>) {
        for s in &mut self.steps {
            let local = time.checked_sub(s.offset);
            let eased = s.step.eased_at(local.map(|t| t.min(s.step.duration)));
            if s.written != Some(eased) {
                s.written = Some(eased);
                out.push(PropertyWrite::new(
                    s.step.target,
                    AnimatedProperties::lerp(&s.step.from, &s.step.to, eased),
                ));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

impl Timeline {
    /// Overall progress of the current iteration in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.total_duration.is_zero() {
            return if self.state == PlaybackState::Idle { 0.0 } else { 1.0 };
        }
        (self.current_time.as_secs_f64() / self.total_duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn current_time(&self) -> Duration {
        self.current_time
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.total_duration
    }

    #[inline]
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn loop_count(&self) -> LoopCount {
        self.loop_count
    }

    /// A handle that observes this timeline's settlement.
    #[must_use]
    pub fn completion(&self) -> Completion {
        self.completion.clone()
    }

    /// Elements this timeline writes to.
    pub fn targets(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.steps.iter().map(|s| s.step.target)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
