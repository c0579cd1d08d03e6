#![forbid(unsafe_code)]

//! CSS class toggles driven by trigger crossings.
//!
//! Content adds a state class when its trigger is entered and removes it
//! only when scroll leaves back above the start (`onEnter` / `onLeaveBack`),
//! so a heading keeps `in-view` once the reader has scrolled past it.

use scrollweave_core::{Crossing, Direction, ElementId, ScopeHandle, TriggerEvent, TriggerHandle};

/// The state class section headings receive.
pub const IN_VIEW: &str = "in-view";

/// One class added to or removed from an element.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClassChange {
    #[cfg_attr(feature = "serde", serde(serialize_with = "ser_element"))]
    pub element: ElementId,
    pub class: String,
    pub added: bool,
}

#[cfg(feature = "serde")]
fn ser_element<S: serde::Serializer>(id: &ElementId, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(id.0)
}

#[derive(Debug, Clone)]
struct Binding {
    trigger: TriggerHandle,
    element: ElementId,
    class: String,
    applied: bool,
}

/// Trigger → class bindings with applied state.
#[derive(Debug, Default, Clone)]
pub struct ClassBindings {
    bindings: Vec<Binding>,
}

impl ClassBindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle `class` on `element` from `trigger`'s crossings.
    pub fn bind(&mut self, trigger: TriggerHandle, element: ElementId, class: impl Into<String>) {
        self.bindings.push(Binding {
            trigger,
            element,
            class: class.into(),
            applied: false,
        });
    }

    /// Apply one frame's crossings.
    pub fn observe(&mut self, events: &[TriggerEvent]) -> Vec<ClassChange> {
        let mut changes = Vec::new();
        for event in events {
            for b in self.bindings.iter_mut().filter(|b| b.trigger == event.handle) {
                let want = match event.crossing {
                    Crossing::Entered(_) => true,
                    Crossing::Left(Direction::Backward) => false,
                    Crossing::Left(Direction::Forward) => continue,
                };
                if want != b.applied {
                    b.applied = want;
                    changes.push(ClassChange {
                        element: b.element,
                        class: b.class.clone(),
                        added: want,
                    });
                }
            }
        }
        changes
    }

    /// Drop the bindings of a torn-down scope, removing applied classes.
    pub fn release_scope(&mut self, scope: ScopeHandle) -> Vec<ClassChange> {
        self.release_where(|b| b.trigger.scope() == scope)
    }

    /// Drop the bindings of one trigger, removing applied classes.
    pub fn release_trigger(&mut self, trigger: TriggerHandle) -> Vec<ClassChange> {
        self.release_where(|b| b.trigger == trigger)
    }

    fn release_where(&mut self, pred: impl Fn(&Binding) -> bool) -> Vec<ClassChange> {
        let mut changes = Vec::new();
        self.bindings.retain(|b| {
            if !pred(b) {
                return true;
            }
            if b.applied {
                changes.push(ClassChange {
                    element: b.element,
                    class: b.class.clone(),
                    added: false,
                });
            }
            false
        });
        changes
    }

    /// Whether `class` is currently applied to `element` by any binding.
    #[must_use]
    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.bindings
            .iter()
            .any(|b| b.applied && b.element == element && b.class == class)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
