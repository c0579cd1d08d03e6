//! Error types for registration and boundary parsing.
//!
//! Only configuration mistakes are errors. Unresolved geometry, degenerate pin
//! extents, and repeated teardown are normal runtime conditions and never
//! surface here.

use thiserror::Error;

use crate::geometry::ElementId;
use crate::scope::ScopeHandle;
use crate::trigger::TriggerHandle;

/// Registration-time failures. Raised synchronously, never deferred.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Start boundary resolved at or after the end boundary.
    #[error("trigger on {target} has start {start} >= end {end}")]
    InvalidBoundaryOrder {
        target: ElementId,
        start: f64,
        end: f64,
    },

    /// The target already has a live trigger; unregister it first.
    #[error("{target} already has a live trigger ({existing})")]
    DuplicateTarget {
        target: ElementId,
        existing: TriggerHandle,
    },

    /// A boundary that cannot be used in this position (e.g. `+=n` as a start).
    #[error("invalid boundary: {0}")]
    InvalidBoundary(String),

    /// The scope was never created or has already been torn down.
    #[error("unknown or torn-down scope {0}")]
    UnknownScope(ScopeHandle),

    /// A timeline that can never complete was offered as the boot gate.
    #[error("invalid timeline: {0}")]
    InvalidTimeline(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Syntax errors in boundary expressions such as `"top 80%"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundaryParseError {
    #[error("empty boundary expression")]
    Empty,
    #[error("unrecognized position `{0}`")]
    UnknownPosition(String),
    #[error("malformed number `{0}`")]
    BadNumber(String),
    #[error("too many terms in `{0}`")]
    TooManyTerms(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_target_and_values() {
        let err = EngineError::InvalidBoundaryOrder {
            target: ElementId(7),
            start: 1800.0,
            end: 1000.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("element#7"), "{msg}");
        assert!(msg.contains("1800"), "{msg}");
    }

    #[test]
    fn parse_error_display_is_stable() {
        assert_eq!(
            BoundaryParseError::UnknownPosition("middle".into()).to_string(),
            "unrecognized position `middle`"
        );
    }
}
