#![forbid(unsafe_code)]

//! Device-mode selection.
//!
//! Chosen once per scope from the viewport width and input capability. A
//! resize never switches topology mid-session; a new scope re-evaluates.

use crate::config::EngineConfig;

/// Input and viewport facts sampled when a scope is created.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeviceSignals {
    pub viewport_width: f64,
    /// Touch or other coarse pointer is the primary input.
    pub coarse_pointer: bool,
    /// The user asked the platform to reduce motion.
    pub reduced_motion: bool,
}

impl DeviceSignals {
    #[must_use]
    pub const fn new(viewport_width: f64) -> Self {
        Self {
            viewport_width,
            coarse_pointer: false,
            reduced_motion: false,
        }
    }

    #[must_use]
    pub const fn coarse_pointer(mut self, coarse: bool) -> Self {
        self.coarse_pointer = coarse;
        self
    }

    #[must_use]
    pub const fn reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    /// Whether reduced motion is requested and the config honors it.
    #[must_use]
    pub fn wants_reduced_motion(&self, config: &EngineConfig) -> bool {
        self.reduced_motion && config.honor_reduced_motion
    }
}

/// Trigger topology for a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Scroll-scrub plus pinned regions (wide viewport, fine pointer).
    PinRegions,
    /// Vertical reveal toggles only; no pinning, no extra scroll height.
    RevealOnly,
}

impl Topology {
    /// Pick the topology for `signals`.
    ///
    /// Narrow (`width <= mobile_breakpoint`) or touch devices get
    /// [`RevealOnly`](Self::RevealOnly), as do reduced-motion users when the
    /// config honors that preference.
    #[must_use]
    pub fn select(signals: &DeviceSignals, config: &EngineConfig) -> Self {
        if signals.viewport_width <= config.mobile_breakpoint
            || signals.coarse_pointer
            || signals.wants_reduced_motion(config)
        {
            Self::RevealOnly
        } else {
            Self::PinRegions
        }
    }
}
