#![forbid(unsafe_code)]

//! Core: scroll-synchronized motion orchestration.
//!
//! # Role in scrollweave
//! `scrollweave-core` is the engine. It turns a one-dimensional document
//! scroll coordinate plus element geometry into per-element animated
//! properties, frame by frame, with no dependency on any rendering API.
//!
//! # Primary responsibilities
//! - **Geometry**: resolve boundary expressions (`"top 80%"`) to document
//!   coordinates against the current viewport.
//! - **Triggers**: scrub, pin, and toggle bindings evaluated in registration
//!   order every frame.
//! - **Timelines**: time-based sequences, including the boot intro whose
//!   completion gates all scroll-driven output.
//! - **Lifecycle**: scopes own their triggers, listeners, and timelines and
//!   tear them down idempotently.
//!
//! # How it fits in the system
//! A host adapter (`scrollweave-web`) pushes scroll/resize input and layout
//! measurements into an [`Engine`], calls [`Engine::tick`] once per frame, and
//! applies the returned [`PropertyWrite`]s to its rendering target.

pub mod config;
pub mod device;
pub mod easing;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod host;
pub mod pin;
pub mod pointer;
pub mod progress;
pub mod props;
pub mod reveal;
pub mod scope;
pub mod scroll;
pub mod timeline;
pub mod trigger;

#[cfg(feature = "config")]
pub use config::ConfigError;
pub use config::{EngineConfig, RevealDefaults};
pub use device::{DeviceSignals, Topology};
pub use easing::Easing;
pub use engine::{Engine, FrameOutput, TriggerEvent};
pub use error::{BoundaryParseError, EngineError, Result};
pub use geometry::{Anchor, Boundary, BoundaryExpr, ElementBox, ElementId, LayoutSnapshot, LayoutSource, Position};
pub use host::{ListenerHost, ListenerId, ListenerKind, ListenerLedger, ListenerOptions};
pub use pin::{PinAxis, PinOptions, PinSession, PinState};
pub use progress::Interval;
pub use props::{AnimatedProperties, PropertyWrite};
pub use reveal::{RevealOptions, stagger};
pub use scope::{ScopeHandle, TeardownReport};
pub use scroll::ScrollState;
pub use pointer::{PointerFollower, tilt_target};
pub use timeline::{Completion, CompletionState, LoopCount, PlaybackState, Timeline, TimelineStep};
pub use trigger::{Crossing, Direction, ScrubBoundaries, TriggerHandle, TriggerHooks, TriggerMode};
