#![forbid(unsafe_code)]

//! Scroll scripts: timed scroll positions with linear motion between them.
//!
//! Text form is a comma-separated list of `<ms>:<scroll_y>` keyframes in
//! non-decreasing time order, e.g. `0:0,4000:0,9000:3600,12000:0`.

use std::str::FromStr;
use std::time::Duration;

use crate::error::DemoError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub at: Duration,
    pub scroll_y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollScript {
    keyframes: Vec<Keyframe>,
}

impl ScrollScript {
    /// At least one keyframe, times non-decreasing, positions finite and >= 0.
    pub fn new(keyframes: Vec<Keyframe>) -> Result<Self, DemoError> {
        if keyframes.is_empty() {
            return Err(DemoError::Script("no keyframes".into()));
        }
        for pair in keyframes.windows(2) {
            if pair[1].at < pair[0].at {
                return Err(DemoError::Script(format!(
                    "keyframe at {}ms comes after {}ms",
                    pair[1].at.as_millis(),
                    pair[0].at.as_millis()
                )));
            }
        }
        if let Some(k) = keyframes
            .iter()
            .find(|k| !k.scroll_y.is_finite() || k.scroll_y < 0.0)
        {
            return Err(DemoError::Script(format!("bad scroll position {}", k.scroll_y)));
        }
        Ok(Self { keyframes })
    }

    /// Wait out the intro, scroll to `bottom`, then back to the top.
    #[must_use]
    pub fn tour(bottom: f64) -> Self {
        let bottom = bottom.max(0.0);
        Self {
            keyframes: vec![
                Keyframe { at: Duration::ZERO, scroll_y: 0.0 },
                Keyframe { at: Duration::from_millis(4_500), scroll_y: 0.0 },
                Keyframe { at: Duration::from_millis(14_500), scroll_y: bottom },
                Keyframe { at: Duration::from_millis(15_500), scroll_y: bottom },
                Keyframe { at: Duration::from_millis(18_500), scroll_y: 0.0 },
            ],
        }
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.keyframes.last().map_or(Duration::ZERO, |k| k.at)
    }

    /// Scroll position at `t`, held constant outside the keyframe range.
    #[must_use]
    pub fn scroll_at(&self, t: Duration) -> f64 {
        let Some(first) = self.keyframes.first() else {
            return 0.0;
        };
        if t <= first.at {
            return first.scroll_y;
        }
        for pair in self.keyframes.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.at {
                let span = (b.at - a.at).as_secs_f64();
                if span == 0.0 {
                    return b.scroll_y;
                }
                let f = (t - a.at).as_secs_f64() / span;
                return a.scroll_y + (b.scroll_y - a.scroll_y) * f;
            }
        }
        self.keyframes.last().map_or(0.0, |k| k.scroll_y)
    }
}

impl FromStr for ScrollScript {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut keyframes = Vec::new();
        for item in s.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            let (ms, y) = item
                .split_once(':')
                .ok_or_else(|| DemoError::Script(format!("expected <ms>:<scroll_y>, got {item:?}")))?;
            let ms: u64 = ms
                .trim()
                .parse()
                .map_err(|_| DemoError::Script(format!("bad time {ms:?}")))?;
            let scroll_y: f64 = y
                .trim()
                .parse()
                .map_err(|_| DemoError::Script(format!("bad scroll position {y:?}")))?;
            keyframes.push(Keyframe {
                at: Duration::from_millis(ms),
                scroll_y,
            });
        }
        Self::new(keyframes)
    }
}
