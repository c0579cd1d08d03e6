#![forbid(unsafe_code)]

//! Policy-as-data engine configuration.
//!
//! Every tunable default lives in one [`EngineConfig`] that can be loaded from
//! TOML or JSON (feature `config`), so a page can adjust breakpoints and
//! reveal styling without recompiling.
//!
//! ```toml
//! mobile_breakpoint = 768.0
//! honor_reduced_motion = true
//!
//! [reveal]
//! start = "top 85%"
//! duration_secs = 0.8
//! easing = "power3.out"
//! offset_y = 40.0
//! ```
//!
//! # Defaults
//!
//! `EngineConfig::default()` reproduces the stock page: 768px breakpoint,
//! reveals starting at `top 80%` that rise 60px and fade in over one second
//! with `power3.out`, unsmoothed scrubbing, horizontal pins.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use std::time::Duration;

use crate::easing::Easing;
use crate::geometry::{BoundaryExpr, Position};
use crate::pin::PinAxis;
use crate::props::AnimatedProperties;

/// Engine-wide defaults.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct EngineConfig {
    /// Viewports at or below this width get the reveal-only topology.
    pub mobile_breakpoint: f64,

    /// Treat a reduced-motion preference as a request for reveal-only
    /// topology with instant reveals.
    pub honor_reduced_motion: bool,

    /// Default scrub lag in seconds; `None` applies progress directly.
    pub scrub_smoothing_secs: Option<f64>,

    /// Default pin translation axis.
    pub pin_axis: PinAxis,

    /// Defaults for reveal toggles. Kept last so TOML output places the
    /// table after plain values.
    pub reveal: RevealDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint: 768.0,
            honor_reduced_motion: false,
            scrub_smoothing_secs: None,
            pin_axis: PinAxis::Horizontal,
            reveal: RevealDefaults::default(),
        }
    }
}

/// Reveal styling defaults.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct RevealDefaults {
    /// Threshold the reference's edge must cross.
    pub start: BoundaryExpr,
    pub duration_secs: f64,
    pub easing: Easing,
    /// Initial vertical offset in pixels.
    pub offset_y: f64,
    /// Initial opacity.
    pub opacity: f64,
}

impl Default for RevealDefaults {
    fn default() -> Self {
        Self {
            start: BoundaryExpr::new(Position::TOP, Position::Fraction(0.8)),
            duration_secs: 1.0,
            easing: Easing::PowerOut(3),
            offset_y: 60.0,
            opacity: 0.0,
        }
    }
}

impl RevealDefaults {
    /// Hidden starting state of a reveal.
    #[must_use]
    pub fn initial(&self) -> AnimatedProperties {
        AnimatedProperties::default()
            .y(self.offset_y)
            .opacity(self.opacity)
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        secs(self.duration_secs)
    }
}

impl EngineConfig {
    /// Default scrub lag as a duration.
    #[must_use]
    pub fn scrub_smoothing(&self) -> Option<Duration> {
        self.scrub_smoothing_secs.map(secs)
    }

    /// Check every parameter. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.mobile_breakpoint.is_finite() || self.mobile_breakpoint < 0.0 {
            errors.push(format!(
                "mobile_breakpoint must be a non-negative number, got {}",
                self.mobile_breakpoint
            ));
        }
        if !self.reveal.duration_secs.is_finite() || self.reveal.duration_secs < 0.0 {
            errors.push(format!(
                "reveal.duration_secs must be >= 0, got {}",
                self.reveal.duration_secs
            ));
        }
        if !(0.0..=1.0).contains(&self.reveal.opacity) {
            errors.push(format!(
                "reveal.opacity must be in [0, 1], got {}",
                self.reveal.opacity
            ));
        }
        if !self.reveal.offset_y.is_finite() {
            errors.push("reveal.offset_y must be finite".into());
        }
        if let Some(lag) = self.scrub_smoothing_secs {
            if !lag.is_finite() || lag < 0.0 {
                errors.push(format!("scrub_smoothing_secs must be >= 0, got {lag}"));
            }
        }

        errors
    }
}

/// Non-negative finite seconds to a duration; anything else is zero.
fn secs(s: f64) -> Duration {
    Duration::try_from_secs_f64(s).unwrap_or(Duration::ZERO)
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[cfg(feature = "config")]
impl EngineConfig {
    /// Parse and validate TOML.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str::<Self>(s)
            .map_err(ConfigError::Toml)?
            .validated()
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate JSON.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Self>(s)
            .map_err(ConfigError::Json)?
            .validated()
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::TomlSer)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Config loading failures.
#[cfg(feature = "config")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
