//! Shared constants for the navbar crate.

// ── Layout ──────────────────────────────────────────────────────

/// Viewport width (CSS px) at and above which the desktop layout applies.
pub const DESKTOP_BREAKPOINT_PX: f64 = 992.0;

/// Minimum distance a dropdown panel keeps from the viewport edges.
pub const VIEWPORT_MARGIN_PX: f64 = 20.0;

/// Vertical scroll offset past which the navbars get the scrolled style.
pub const SCROLLED_THRESHOLD_PX: f64 = 10.0;

// ── Timing ──────────────────────────────────────────────────────

/// Grace period before a hovered dropdown closes after the pointer leaves.
pub const HOVER_CLOSE_DELAY_MS: f64 = 150.0;

/// Quiet period after the last resize event before the layout is recomputed.
pub const RESIZE_DEBOUNCE_MS: f64 = 250.0;

/// Minimum spacing between handled scroll events (about one frame).
pub const SCROLL_THROTTLE_MS: f64 = 16.0;

/// Delay between clicking a navigable entry and closing its panel.
pub const ENTRY_CLOSE_DELAY_MS: f64 = 100.0;

/// How long an announcement stays in the live region.
pub const ANNOUNCE_CLEAR_MS: f64 = 1000.0;

/// How long an empty search input keeps its invalid marker.
pub const SEARCH_INVALID_MS: f64 = 3000.0;

// ── Markup contract ─────────────────────────────────────────────

pub const DESKTOP_NAVBAR_ID: &str = "desktopNavbar";
/// Id used by the older single-navbar template for the desktop bar.
pub const MAIN_NAVBAR_ID: &str = "mainNavbar";
pub const MOBILE_NAVBAR_ID: &str = "mobileNavbar";
pub const MOBILE_CONTENT_ID: &str = "mobileNavbarContent";
pub const LIVE_REGION_ID: &str = "navbar-announcements";

pub const DROPDOWN_CLASS: &str = "dropdown";
pub const TOGGLE_CLASS: &str = "dropdown-toggle";
pub const PANEL_CLASS: &str = "dropdown-menu";
pub const ENTRY_CLASS: &str = "dropdown-item";
pub const NAV_LINK_CLASS: &str = "nav-link";
pub const NAV_LIST_CLASS: &str = "navbar-nav";
pub const MOBILE_TOGGLER_CLASS: &str = "navbar-toggler";

/// Attribute carrying the JSON [`crate::config::NavConfig`] on the root element.
pub const CONFIG_ATTRIBUTE: &str = "data-navbar-config";

// ── Output classes ──────────────────────────────────────────────

pub const SHOW_CLASS: &str = "show";
pub const ACTIVE_CLASS: &str = "active";
pub const GLOW_CLASS: &str = "nav-link-glow";
pub const SCROLLED_CLASS: &str = "navbar-scrolled";
pub const FADE_IN_CLASS: &str = "navbar-fade-in";
pub const HIDDEN_ON_DESKTOP_CLASS: &str = "d-lg-none";
pub const LOADING_CLASS: &str = "loading";
pub const INVALID_CLASS: &str = "is-invalid";
pub const HIGH_CONTRAST_CLASS: &str = "high-contrast";
