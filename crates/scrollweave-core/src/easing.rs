#![forbid(unsafe_code)]

//! Easing curves for time-based transitions.
//!
//! Scrubbed triggers never ease: scroll velocity already shapes their motion.
//! Easing applies only to timeline steps and reveal transitions.
//!
//! Names follow the `family.direction` convention (`"power3.out"`,
//! `"sine.inOut"`, `"none"`), so configuration files can name curves as text.
//!
//! # Invariants
//!
//! 1. `apply(0.0) == 0.0` and `apply(1.0) == 1.0` for every curve.
//! 2. Input is clamped to `[0, 1]` before evaluation.

use std::fmt;
use std::str::FromStr;

/// An easing curve mapping linear time `t ∈ [0, 1]` to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(try_from = "String", into = "String"))]
pub enum Easing {
    #[default]
    Linear,
    /// `t^(n+1)`, slow start. `n` in `1..=4`.
    PowerIn(u8),
    /// Mirror of [`PowerIn`](Self::PowerIn), slow finish.
    PowerOut(u8),
    /// Slow start and finish.
    PowerInOut(u8),
    SineInOut,
}

impl Easing {
    /// Evaluate the curve at `t` (clamped to `[0, 1]`).
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::PowerIn(n) => t.powi(exponent(n)),
            Self::PowerOut(n) => 1.0 - (1.0 - t).powi(exponent(n)),
            Self::PowerInOut(n) => {
                let e = exponent(n);
                if t < 0.5 {
                    (2.0 * t).powi(e) / 2.0
                } else {
                    1.0 - (2.0 * (1.0 - t)).powi(e) / 2.0
                }
            }
            Self::SineInOut => -((std::f64::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }
}

fn exponent(power: u8) -> i32 {
    i32::from(power.clamp(1, 4)) + 1
}

/// Error for unknown easing names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown easing `{0}`")]
pub struct UnknownEasing(pub String);

impl FromStr for Easing {
    type Err = UnknownEasing;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownEasing(s.to_string());
        match s {
            "none" | "linear" => return Ok(Self::Linear),
            "sine.inOut" => return Ok(Self::SineInOut),
            _ => {}
        }
        let (family, direction) = s.split_once('.').unwrap_or((s, "out"));
        let power = match family {
            "power1" | "quad" => 1,
            "power2" | "cubic" => 2,
            "power3" | "quart" => 3,
            "power4" | "quint" => 4,
            _ => return Err(unknown()),
        };
        match direction {
            "in" => Ok(Self::PowerIn(power)),
            "out" => Ok(Self::PowerOut(power)),
            "inOut" => Ok(Self::PowerInOut(power)),
            _ => Err(unknown()),
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Linear => f.write_str("none"),
            Self::PowerIn(n) => write!(f, "power{}.in", n.clamp(1, 4)),
            Self::PowerOut(n) => write!(f, "power{}.out", n.clamp(1, 4)),
            Self::PowerInOut(n) => write!(f, "power{}.inOut", n.clamp(1, 4)),
            Self::SineInOut => f.write_str("sine.inOut"),
        }
    }
}

impl TryFrom<String> for Easing {
    type Error = UnknownEasing;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Easing> for String {
    fn from(e: Easing) -> Self {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 7] = [
        Easing::Linear,
        Easing::PowerIn(2),
        Easing::PowerOut(3),
        Easing::PowerInOut(2),
        Easing::PowerInOut(4),
        Easing::PowerOut(1),
        Easing::SineInOut,
    ];

    #[test]
    fn endpoints_are_fixed() {
        for e in ALL {
            assert!((e.apply(0.0)).abs() < 1e-12, "{e}");
            assert!((e.apply(1.0) - 1.0).abs() < 1e-12, "{e}");
        }
    }

    #[test]
    fn input_is_clamped() {
        assert_eq!(Easing::PowerOut(3).apply(-1.0), 0.0);
        assert_eq!(Easing::PowerOut(3).apply(2.0), 1.0);
        assert_eq!(Easing::Linear.apply(f64::NAN), 0.0);
    }

    #[test]
    fn out_is_ahead_of_linear_midway() {
        assert!(Easing::PowerOut(3).apply(0.5) > 0.5);
        assert!(Easing::PowerIn(3).apply(0.5) < 0.5);
        assert!((Easing::PowerInOut(2).apply(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn power3_out_matches_closed_form() {
        let t: f64 = 0.3;
        assert!((Easing::PowerOut(3).apply(t) - (1.0 - (1.0 - t).powi(4))).abs() < 1e-12);
    }

    #[test]
    fn parses_names() {
        assert_eq!("power3.out".parse(), Ok(Easing::PowerOut(3)));
        assert_eq!("power2.inOut".parse(), Ok(Easing::PowerInOut(2)));
        assert_eq!("power4.inOut".parse(), Ok(Easing::PowerInOut(4)));
        assert_eq!("none".parse(), Ok(Easing::Linear));
        assert_eq!("sine.inOut".parse(), Ok(Easing::SineInOut));
        assert_eq!("power2".parse(), Ok(Easing::PowerOut(2)));
        assert!("elastic.out".parse::<Easing>().is_err());
        assert!("power2.sideways".parse::<Easing>().is_err());
    }

    #[test]
    fn display_parses_back() {
        for e in ALL {
            assert_eq!(e.to_string().parse::<Easing>(), Ok(e));
        }
    }
}
