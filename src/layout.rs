//! Desktop/mobile layout selection and the mobile collapse state.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

/// Which presentation the navbar uses, derived from viewport width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutMode {
    /// Persistent horizontal menu; dropdowns open on hover and click.
    #[default]
    Desktop,
    /// Collapsible vertical menu; dropdowns open on click/tap only.
    Mobile,
}

impl LayoutMode {
    /// Desktop iff `width >= breakpoint`.
    #[must_use]
    pub fn for_width(width: f64, breakpoint: f64) -> Self {
        if width >= breakpoint { Self::Desktop } else { Self::Mobile }
    }

    #[must_use]
    pub fn is_desktop(self) -> bool {
        self == Self::Desktop
    }
}

/// Whether the collapsible mobile panel is visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MobileMenuState {
    pub is_expanded: bool,
}
