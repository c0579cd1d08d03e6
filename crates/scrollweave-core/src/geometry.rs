#![forbid(unsafe_code)]

//! Geometry: element boxes, boundary expressions, and their resolution.
//!
//! All coordinates are **document space**: `0` is the top of the document and
//! values are directly comparable with `scroll_y`. A boundary expression names
//! an edge of a reference element and a position in the viewport; it resolves
//! to the scroll offset at which that edge meets that viewport position.
//!
//! ```
//! use scrollweave_core::geometry::{BoundaryExpr, ElementBox};
//!
//! let expr: BoundaryExpr = "top 80%".parse().unwrap();
//! let heading = ElementBox::new(1640.0, 0.0, 1200.0, 120.0);
//! // Top of the heading reaches 80% of an 800px viewport at scroll 1000.
//! assert_eq!(expr.resolve(heading, 800.0), 1000.0);
//! ```
//!
//! # Failure Modes
//!
//! - Unmounted or unmeasured reference element: resolution yields `None`
//!   ("unresolved"). Callers keep the trigger inactive; this is not an error.
//! - Non-finite measurements are treated as unresolved.

use std::fmt;
use std::str::FromStr;

use ahash::AHashMap;

use crate::error::BoundaryParseError;
use crate::progress::Interval;
use crate::scroll::ScrollState;

/// Opaque identity of a host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Measured box of an element in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    /// Full horizontal content extent (e.g. a horizontally scrolling track).
    pub scroll_width: f64,
    /// Full vertical content extent.
    pub scroll_height: f64,
}

impl ElementBox {
    /// A box whose content extent equals its layout size.
    #[must_use]
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
            scroll_width: width,
            scroll_height: height,
        }
    }

    #[must_use]
    pub const fn with_scroll_width(mut self, scroll_width: f64) -> Self {
        self.scroll_width = scroll_width;
        self
    }

    #[must_use]
    pub const fn with_scroll_height(mut self, scroll_height: f64) -> Self {
        self.scroll_height = scroll_height;
        self
    }

    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    fn is_finite(&self) -> bool {
        self.top.is_finite()
            && self.left.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.scroll_width.is_finite()
            && self.scroll_height.is_finite()
    }
}

/// Read access to host layout. Implemented by hosts; [`LayoutSnapshot`] is a
/// ready-made map the host fills with measurements.
pub trait LayoutSource {
    /// Box of a mounted, laid-out element; `None` when unmounted.
    fn element_box(&self, id: ElementId) -> Option<ElementBox>;

    /// Total document height (scrollable extent plus one viewport).
    fn document_height(&self) -> f64;
}

/// Host-filled layout measurements.
#[derive(Debug, Clone, Default)]
pub struct LayoutSnapshot {
    boxes: AHashMap<ElementId, ElementBox>,
    document_height: f64,
}

impl LayoutSnapshot {
    #[must_use]
    pub fn new(document_height: f64) -> Self {
        Self {
            boxes: AHashMap::new(),
            document_height,
        }
    }

    /// Record (or replace) an element's measured box.
    pub fn insert(&mut self, id: ElementId, element_box: ElementBox) {
        self.boxes.insert(id, element_box);
    }

    /// Forget an element, as when it unmounts.
    pub fn remove(&mut self, id: ElementId) -> Option<ElementBox> {
        self.boxes.remove(&id)
    }

    pub fn set_document_height(&mut self, height: f64) {
        self.document_height = height;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

impl LayoutSource for LayoutSnapshot {
    fn element_box(&self, id: ElementId) -> Option<ElementBox> {
        self.boxes.get(&id).copied()
    }

    fn document_height(&self) -> f64 {
        self.document_height
    }
}

/// What a trigger measures its boundaries against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    Element(ElementId),
    /// The whole document: top at 0, height = document height.
    Document,
}

impl From<ElementId> for Anchor {
    fn from(id: ElementId) -> Self {
        Self::Element(id)
    }
}

// ---------------------------------------------------------------------------
// Boundary expressions
// ---------------------------------------------------------------------------

/// A position along an extent: a fraction of it, or a pixel distance from its
/// start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Fraction(f64),
    Pixels(f64),
}

impl Position {
    pub const TOP: Self = Self::Fraction(0.0);
    pub const CENTER: Self = Self::Fraction(0.5);
    pub const BOTTOM: Self = Self::Fraction(1.0);

    #[inline]
    #[must_use]
    pub fn offset_within(self, extent: f64) -> f64 {
        match self {
            Self::Fraction(f) => f * extent,
            Self::Pixels(px) => px,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Fraction(v) if v == 0.0 => f.write_str("top"),
            Self::Fraction(v) if v == 0.5 => f.write_str("center"),
            Self::Fraction(v) if v == 1.0 => f.write_str("bottom"),
            Self::Fraction(v) => write!(f, "{}%", v * 100.0),
            Self::Pixels(px) => write!(f, "{px}px"),
        }
    }
}

impl FromStr for Position {
    type Err = BoundaryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(BoundaryParseError::Empty),
            "top" => Ok(Self::TOP),
            "center" => Ok(Self::CENTER),
            "bottom" => Ok(Self::BOTTOM),
            _ => {
                if let Some(pct) = s.strip_suffix('%') {
                    parse_number(pct).map(|v| Self::Fraction(v / 100.0))
                } else if let Some(px) = s.strip_suffix("px") {
                    parse_number(px).map(Self::Pixels)
                } else if s.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.') {
                    parse_number(s).map(Self::Pixels)
                } else {
                    Err(BoundaryParseError::UnknownPosition(s.to_string()))
                }
            }
        }
    }
}

fn parse_number(s: &str) -> Result<f64, BoundaryParseError> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| BoundaryParseError::BadNumber(s.to_string()))
}

/// `(element edge [± offset], viewport position)`.
///
/// Resolves to the scroll offset at which the element edge sits at the
/// viewport position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryExpr {
    pub element: Position,
    /// Extra pixels added to the element edge (`top+=100`).
    pub element_offset: f64,
    pub viewport: Position,
}

impl BoundaryExpr {
    #[must_use]
    pub const fn new(element: Position, viewport: Position) -> Self {
        Self {
            element,
            element_offset: 0.0,
            viewport,
        }
    }

    /// `top top`: the reference reaches the top of the viewport.
    pub const TOP_TOP: Self = Self::new(Position::TOP, Position::TOP);
    /// `top bottom`: the reference starts to enter the viewport.
    pub const TOP_BOTTOM: Self = Self::new(Position::TOP, Position::BOTTOM);
    /// `bottom top`: the reference has fully left through the top.
    pub const BOTTOM_TOP: Self = Self::new(Position::BOTTOM, Position::TOP);
    /// `bottom bottom`: the reference's bottom reaches the viewport bottom.
    pub const BOTTOM_BOTTOM: Self = Self::new(Position::BOTTOM, Position::BOTTOM);

    #[must_use]
    pub const fn with_element_offset(mut self, px: f64) -> Self {
        self.element_offset = px;
        self
    }

    /// Document-space scroll offset for this expression.
    #[inline]
    #[must_use]
    pub fn resolve(&self, reference: ElementBox, viewport_height: f64) -> f64 {
        let edge = reference.top + self.element.offset_within(reference.height) + self.element_offset;
        edge - self.viewport.offset_within(viewport_height)
    }
}

impl fmt::Display for BoundaryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.element)?;
        if self.element_offset > 0.0 {
            write!(f, "+={}", self.element_offset)?;
        } else if self.element_offset < 0.0 {
            write!(f, "-={}", -self.element_offset)?;
        }
        write!(f, " {}", self.viewport)
    }
}

impl FromStr for BoundaryExpr {
    type Err = BoundaryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut terms = s.split_whitespace();
        let element_term = terms.next().ok_or(BoundaryParseError::Empty)?;
        let viewport = match terms.next() {
            Some(term) => term.parse()?,
            None => Position::TOP,
        };
        if terms.next().is_some() {
            return Err(BoundaryParseError::TooManyTerms(s.to_string()));
        }

        let (edge, offset) = split_offset(element_term)?;
        Ok(Self {
            element: edge.parse()?,
            element_offset: offset,
            viewport,
        })
    }
}

fn split_offset(term: &str) -> Result<(&str, f64), BoundaryParseError> {
    if let Some((edge, n)) = term.split_once("+=") {
        Ok((edge, parse_number(n.trim_end_matches("px"))?))
    } else if let Some((edge, n)) = term.split_once("-=") {
        Ok((edge, -parse_number(n.trim_end_matches("px"))?))
    } else {
        Ok((term, 0.0))
    }
}

/// A start or end boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Boundary {
    Expr(BoundaryExpr),
    /// `+=n`: the resolved start plus `n` pixels. Only valid as an end.
    Relative(f64),
}

impl From<BoundaryExpr> for Boundary {
    fn from(expr: BoundaryExpr) -> Self {
        Self::Expr(expr)
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expr(expr) => expr.fmt(f),
            Self::Relative(n) if *n < 0.0 => write!(f, "-={}", -n),
            Self::Relative(n) => write!(f, "+={n}"),
        }
    }
}

impl FromStr for Boundary {
    type Err = BoundaryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(n) = s.strip_prefix("+=") {
            parse_number(n.trim_end_matches("px")).map(Self::Relative)
        } else if let Some(n) = s.strip_prefix("-=") {
            parse_number(n.trim_end_matches("px")).map(|v| Self::Relative(-v))
        } else {
            s.parse().map(Self::Expr)
        }
    }
}

#[cfg(feature = "config")]
mod serde_impls {
    use super::{Boundary, BoundaryExpr};

    impl serde::Serialize for Boundary {
        fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.collect_str(self)
        }
    }

    impl<'de> serde::Deserialize<'de> for Boundary {
        fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            let s = String::deserialize(d)?;
            s.parse().map_err(serde::de::Error::custom)
        }
    }

    impl serde::Serialize for BoundaryExpr {
        fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.collect_str(self)
        }
    }

    impl<'de> serde::Deserialize<'de> for BoundaryExpr {
        fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            let s = String::deserialize(d)?;
            s.parse().map_err(serde::de::Error::custom)
        }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Outcome of resolving a start/end pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Resolved(Interval),
    /// Reference unmounted or not laid out yet.
    Unresolved,
    /// Both ends resolved but `start >= end`.
    Inverted { start: f64, end: f64 },
}

/// Resolves boundaries against layout and tracks whether cached resolutions
/// are stale.
///
/// Resolutions are invalidated on viewport resize and by explicit
/// [`invalidate`](Self::invalidate) calls after layout-affecting mutations.
#[derive(Debug, Default)]
pub struct GeometryResolver {
    dirty: bool,
    passes: u64,
}

impl GeometryResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark every cached resolution stale; recomputed on the next frame.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of full re-resolution passes performed.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Consume the dirty flag, counting a pass when it was set.
    pub(crate) fn begin_pass(&mut self) -> bool {
        let dirty = std::mem::take(&mut self.dirty);
        if dirty {
            self.passes += 1;
        }
        dirty
    }

    /// Box of the anchor, or `None` when unresolved.
    pub fn reference_box<L: LayoutSource + ?Sized>(
        layout: &L,
        anchor: Anchor,
        scroll: &ScrollState,
    ) -> Option<ElementBox> {
        let b = match anchor {
            Anchor::Element(id) => layout.element_box(id)?,
            Anchor::Document => ElementBox::new(0.0, 0.0, scroll.viewport_width, layout.document_height()),
        };
        b.is_finite().then_some(b)
    }

    /// Resolve one expression to a document coordinate.
    pub fn resolve<L: LayoutSource + ?Sized>(
        layout: &L,
        anchor: Anchor,
        expr: &BoundaryExpr,
        scroll: &ScrollState,
    ) -> Option<f64> {
        let reference = Self::reference_box(layout, anchor, scroll)?;
        let v = expr.resolve(reference, scroll.viewport_height);
        v.is_finite().then_some(v)
    }

    /// Resolve a start/end pair. A relative start is treated as unresolved.
    pub fn resolve_interval<L: LayoutSource + ?Sized>(
        layout: &L,
        anchor: Anchor,
        start: &Boundary,
        end: &Boundary,
        scroll: &ScrollState,
    ) -> Resolution {
        let Boundary::Expr(start_expr) = start else {
            return Resolution::Unresolved;
        };
        let Some(start) = Self::resolve(layout, anchor, start_expr, scroll) else {
            return Resolution::Unresolved;
        };
        let end = match end {
            Boundary::Expr(expr) => match Self::resolve(layout, anchor, expr, scroll) {
                Some(v) => v,
                None => return Resolution::Unresolved,
            },
            Boundary::Relative(n) => start + n,
        };
        match Interval::new(start, end) {
            Some(interval) => Resolution::Resolved(interval),
            None => Resolution::Inverted { start, end },
        }
    }
}
