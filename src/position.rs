//! Viewport-overflow check for open dropdown panels.
//!
//! The host measures the panel after it becomes visible and hands the rect to
//! [`place_panel`]. A panel that would cross the right edge is anchored to the
//! right of its toggle, one that would cross the left edge is anchored left,
//! and one that would run off the bottom opens upward instead.

#[cfg(test)]
#[path = "position_test.rs"]
mod position_test;

/// Bounding rect in CSS pixels, viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, right: left + width, bottom: top + height }
    }
}

/// Visible viewport size in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Horizontal {
    #[default]
    Natural,
    /// Pin the panel's right edge to its toggle's right edge.
    AnchorRight,
    /// Pin the panel's left edge to its toggle's left edge.
    AnchorLeft,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Vertical {
    #[default]
    Below,
    /// Open upward, above the toggle.
    Above,
}

/// Repositioning applied to an open panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Placement {
    pub horizontal: Horizontal,
    pub vertical: Vertical,
}

/// Inline style properties a [`Placement`] may set; closing clears them all.
pub const PLACEMENT_PROPERTIES: [&str; 7] = ["left", "right", "transform", "top", "bottom", "margin-top", "margin-bottom"];

impl Placement {
    #[must_use]
    pub fn is_natural(self) -> bool {
        self == Self::default()
    }

    /// Inline styles implementing this placement.
    #[must_use]
    pub fn style_overrides(self) -> Vec<(&'static str, &'static str)> {
        let mut styles = Vec::new();
        match self.horizontal {
            Horizontal::Natural => {}
            Horizontal::AnchorRight => styles.extend([("left", "auto"), ("right", "0"), ("transform", "none")]),
            Horizontal::AnchorLeft => styles.extend([("left", "0"), ("right", "auto"), ("transform", "none")]),
        }
        if self.vertical == Vertical::Above {
            styles.extend([("top", "auto"), ("bottom", "100%"), ("margin-top", "0"), ("margin-bottom", "0.5rem")]);
        }
        styles
    }
}

/// Choose a placement keeping `panel` at least `margin` inside `viewport`.
#[must_use]
pub fn place_panel(panel: Rect, viewport: Viewport, margin: f64) -> Placement {
    let horizontal = if panel.right > viewport.width - margin {
        Horizontal::AnchorRight
    } else if panel.left < margin {
        Horizontal::AnchorLeft
    } else {
        Horizontal::Natural
    };
    let vertical = if panel.bottom > viewport.height - margin { Vertical::Above } else { Vertical::Below };
    Placement { horizontal, vertical }
}
