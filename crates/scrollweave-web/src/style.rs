#![forbid(unsafe_code)]

//! CSS style patches.
//!
//! The engine writes sparse [`AnimatedProperties`]; CSS needs whole
//! declarations (a `transform` is one property no matter how many of its
//! functions changed). [`StyleSheet`] keeps the merged state per element and
//! renders a [`StylePatch`] for each element written in a frame.
//!
//! Opacity follows auto-alpha semantics: an element at opacity `0` is also
//! `visibility: hidden`, so fully faded content stops receiving pointer
//! events.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use scrollweave_core::{AnimatedProperties, ElementId, PropertyWrite};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Visibility {
    Visible,
    Hidden,
}

/// CSS `position` for pinned sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PositionMode {
    /// Held at the viewport top while pinned.
    Fixed,
    /// Back in normal flow.
    Static,
}

/// Declarations to apply to one element.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StylePatch {
    #[cfg_attr(feature = "serde", serde(serialize_with = "ser_element"))]
    pub element: ElementId,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub transform: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub opacity: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub visibility: Option<Visibility>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub position: Option<PositionMode>,
}

#[cfg(feature = "serde")]
fn ser_element<S: serde::Serializer>(id: &ElementId, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(id.0)
}

impl StylePatch {
    /// Render the full style of an element from its merged properties.
    #[must_use]
    pub fn render(element: ElementId, props: &AnimatedProperties) -> Self {
        let opacity = props.opacity;
        Self {
            element,
            transform: transform(props),
            opacity,
            visibility: opacity.map(|o| {
                if o <= 0.0 {
                    Visibility::Hidden
                } else {
                    Visibility::Visible
                }
            }),
            position: props.pinned.map(|p| {
                if p {
                    PositionMode::Fixed
                } else {
                    PositionMode::Static
                }
            }),
        }
    }

    /// Inline style text, e.g. `transform: translate3d(0px, 60px, 0px); opacity: 0; visibility: hidden`.
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut decls = Vec::new();
        if let Some(t) = &self.transform {
            decls.push(format!("transform: {t}"));
        }
        if let Some(o) = self.opacity {
            decls.push(format!("opacity: {o}"));
        }
        if let Some(v) = self.visibility {
            decls.push(
                match v {
                    Visibility::Visible => "visibility: visible",
                    Visibility::Hidden => "visibility: hidden",
                }
                .to_string(),
            );
        }
        match self.position {
            Some(PositionMode::Fixed) => decls.push("position: fixed; top: 0px".to_string()),
            Some(PositionMode::Static) => decls.push("position: static".to_string()),
            None => {}
        }
        decls.join("; ")
    }
}

/// CSS transform for the set transform fields, in a fixed function order.
fn transform(p: &AnimatedProperties) -> Option<String> {
    let mut out = String::new();
    if p.x_percent.is_some() || p.y_percent.is_some() {
        let _ = write!(
            out,
            "translate({}%, {}%) ",
            p.x_percent.unwrap_or(0.0),
            p.y_percent.unwrap_or(0.0)
        );
    }
    if p.x.is_some() || p.y.is_some() {
        let _ = write!(
            out,
            "translate3d({}px, {}px, 0px) ",
            p.x.unwrap_or(0.0),
            p.y.unwrap_or(0.0)
        );
    }
    if let Some(r) = p.rotate_x {
        let _ = write!(out, "rotateX({r}rad) ");
    }
    if let Some(r) = p.rotate_y {
        let _ = write!(out, "rotateY({r}rad) ");
    }
    if p.scale_x.is_some() || p.scale_y.is_some() {
        let _ = write!(
            out,
            "scale({}, {}) ",
            p.scale_x.unwrap_or(1.0),
            p.scale_y.unwrap_or(1.0)
        );
    }
    let trimmed = out.trim_end();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Merged per-element state.
#[derive(Debug, Default, Clone)]
pub struct StyleSheet {
    elements: BTreeMap<ElementId, AnimatedProperties>,
}

impl StyleSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `writes` and return one patch per element touched, in first-write
    /// order.
    pub fn apply(&mut self, writes: &[PropertyWrite]) -> Vec<StylePatch> {
        let mut order: Vec<ElementId> = Vec::new();
        for w in writes {
            self.elements.entry(w.element).or_default().merge(&w.props);
            if !order.contains(&w.element) {
                order.push(w.element);
            }
        }
        order
            .into_iter()
            .filter_map(|e| self.elements.get(&e).map(|p| StylePatch::render(e, p)))
            .collect()
    }

    /// Merged properties of an element.
    #[must_use]
    pub fn get(&self, element: ElementId) -> Option<&AnimatedProperties> {
        self.elements.get(&element)
    }

    /// Current rendered style of an element.
    #[must_use]
    pub fn computed(&self, element: ElementId) -> Option<StylePatch> {
        self.get(element).map(|p| StylePatch::render(element, p))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
