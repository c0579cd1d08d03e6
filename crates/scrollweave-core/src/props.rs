#![forbid(unsafe_code)]

//! Animated properties: the only output the engine produces.
//!
//! Every field is optional; `None` means "not touched by this write". When
//! interpolating, a side that leaves a field unset contributes the field's
//! identity value (`0` for translations and rotations, `1` for scale and
//! opacity), so `from = {y: 60, opacity: 0}` with `to = {}` animates back to
//! the resting state.

use crate::geometry::ElementId;

macro_rules! animated_properties {
    ($( $(#[$doc:meta])* $field:ident = $identity:expr ),+ $(,)?) => {
        /// Per-element transform, opacity and pin inputs.
        #[derive(Debug, Clone, Copy, PartialEq, Default)]
        pub struct AnimatedProperties {
            $( $(#[$doc])* pub $field: Option<f64>, )+
            /// Pinned regions: while `true` the host fixes the element to the
            /// viewport top.
            pub pinned: Option<bool>,
        }

        impl AnimatedProperties {
            $(
                #[must_use]
                pub fn $field(mut self, value: f64) -> Self {
                    self.$field = Some(value);
                    self
                }
            )+

            #[must_use]
            pub fn pinned(mut self, pinned: bool) -> Self {
                self.pinned = Some(pinned);
                self
            }

            /// Linear interpolation by `t ∈ [0, 1]`; no easing.
            ///
            /// Fields set on neither side stay `None`. `pinned` is never
            /// interpolated and is always `None` in the result.
            #[must_use]
            pub fn lerp(from: &Self, to: &Self, t: f64) -> Self {
                let t = t.clamp(0.0, 1.0);
                Self {
                    $(
                        $field: match (from.$field, to.$field) {
                            (None, None) => None,
                            (a, b) => {
                                let a = a.unwrap_or($identity);
                                let b = b.unwrap_or($identity);
                                Some(a + (b - a) * t)
                            }
                        },
                    )+
                    pinned: None,
                }
            }

            /// Overlay `other`'s set fields onto `self`.
            pub fn merge(&mut self, other: &Self) {
                $( if other.$field.is_some() { self.$field = other.$field; } )+
                if other.pinned.is_some() {
                    self.pinned = other.pinned;
                }
            }

            /// Identity values for every field this write touches, used to
            /// restore an element on teardown.
            #[must_use]
            pub fn reverted(&self) -> Self {
                Self {
                    $( $field: self.$field.map(|_| $identity), )+
                    pinned: self.pinned.map(|_| false),
                }
            }

            /// No field is set.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                $( self.$field.is_none() && )+ self.pinned.is_none()
            }
        }
    };
}

animated_properties! {
    /// Horizontal translation in pixels.
    x = 0.0,
    /// Vertical translation in pixels.
    y = 0.0,
    /// Horizontal translation as a percentage of the element's width.
    x_percent = 0.0,
    /// Vertical translation as a percentage of the element's height.
    y_percent = 0.0,
    scale_x = 1.0,
    scale_y = 1.0,
    /// Rotation about the X axis, radians.
    rotate_x = 0.0,
    /// Rotation about the Y axis, radians.
    rotate_y = 0.0,
    opacity = 1.0,
}

/// One element's property update for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyWrite {
    pub element: ElementId,
    pub props: AnimatedProperties,
}

impl PropertyWrite {
    #[must_use]
    pub const fn new(element: ElementId, props: AnimatedProperties) -> Self {
        Self { element, props }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_midpoint() {
        let from = AnimatedProperties::default().y(0.0);
        let to = AnimatedProperties::default().y(-400.0);
        assert_eq!(AnimatedProperties::lerp(&from, &to, 0.5).y, Some(-200.0));
    }

    #[test]
    fn missing_side_uses_identity() {
        let from = AnimatedProperties::default().y(60.0).opacity(0.0);
        let to = AnimatedProperties::default();
        let mid = AnimatedProperties::lerp(&from, &to, 0.5);
        assert_eq!(mid.y, Some(30.0));
        assert_eq!(mid.opacity, Some(0.5));
        assert_eq!(mid.x, None);

        let end = AnimatedProperties::lerp(&from, &to, 1.0);
        assert_eq!(end.y, Some(0.0));
        assert_eq!(end.opacity, Some(1.0));
    }

    #[test]
    fn lerp_clamps_t() {
        let from = AnimatedProperties::default().scale_x(0.0);
        let to = AnimatedProperties::default().scale_x(1.0);
        assert_eq!(AnimatedProperties::lerp(&from, &to, 3.0).scale_x, Some(1.0));
        assert_eq!(AnimatedProperties::lerp(&from, &to, -1.0).scale_x, Some(0.0));
    }

    #[test]
    fn merge_overlays_set_fields() {
        let mut a = AnimatedProperties::default().x(5.0).y(1.0);
        a.merge(&AnimatedProperties::default().y(2.0).pinned(true));
        assert_eq!(a.x, Some(5.0));
        assert_eq!(a.y, Some(2.0));
        assert_eq!(a.pinned, Some(true));
    }

    #[test]
    fn reverted_restores_identity_for_touched_fields() {
        let p = AnimatedProperties::default()
            .x(-500.0)
            .scale_x(0.3)
            .opacity(0.0)
            .pinned(true);
        let r = p.reverted();
        assert_eq!(r.x, Some(0.0));
        assert_eq!(r.scale_x, Some(1.0));
        assert_eq!(r.opacity, Some(1.0));
        assert_eq!(r.pinned, Some(false));
        assert_eq!(r.y, None);
    }

    #[test]
    fn empty_detection() {
        assert!(AnimatedProperties::default().is_empty());
        assert!(!AnimatedProperties::default().pinned(false).is_empty());
    }
}
