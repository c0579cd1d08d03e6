#![forbid(unsafe_code)]

//! Lifecycle scopes.
//!
//! A scope is what a mounted page region owns: its triggers, its timelines
//! and the host listeners registered for it. Teardown evicts all of them
//! synchronously and restores every element they wrote to, so a remount of
//! the same region can register again immediately.

use std::fmt;

use crate::device::Topology;
use crate::geometry::ElementId;
use crate::host::ListenerId;
use crate::props::PropertyWrite;
use crate::trigger::TriggerHandle;

/// Identity of a lifecycle scope. Never reused within an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeHandle(pub(crate) u64);

impl fmt::Display for ScopeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// What a teardown removed.
///
/// A second teardown of the same scope returns an empty report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeardownReport {
    /// Writes restoring every touched element to its resting values.
    pub writes: Vec<PropertyWrite>,
    pub triggers: usize,
    pub timelines: usize,
    pub listeners: usize,
    /// Pin extent released by destroyed sessions.
    pub released_extent: f64,
}

impl TeardownReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.triggers == 0 && self.timelines == 0 && self.listeners == 0
    }
}

/// Live state of a scope inside the engine.
#[derive(Debug)]
pub(crate) struct Scope {
    pub(crate) handle: ScopeHandle,
    pub(crate) topology: Topology,
    /// Reveals snap instead of animating.
    pub(crate) snap_reveals: bool,
    pub(crate) listeners: Vec<ListenerId>,
    pub(crate) triggers: Vec<TriggerHandle>,
    /// Elements written by this scope's timelines.
    pub(crate) timeline_targets: Vec<ElementId>,
}

impl Scope {
    pub(crate) fn new(handle: ScopeHandle, topology: Topology, snap_reveals: bool) -> Self {
        Self {
            handle,
            topology,
            snap_reveals,
            listeners: Vec::new(),
            triggers: Vec::new(),
            timeline_targets: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::AnimatedProperties;

    #[test]
    fn display() {
        assert_eq!(ScopeHandle(3).to_string(), "scope#3");
    }

    #[test]
    fn empty_report() {
        assert!(TeardownReport::default().is_empty());
        let r = TeardownReport {
            writes: vec![PropertyWrite::new(ElementId(1), AnimatedProperties::default().x(0.0))],
            ..TeardownReport::default()
        };
        assert!(!r.is_empty());
    }
}
