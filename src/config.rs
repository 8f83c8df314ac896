//! Runtime tuning for the navigation controller.
//!
//! The server template may embed a JSON object in the root element's
//! `data-navbar-config` attribute. Every field is optional; missing fields
//! take the defaults from [`crate::consts`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::consts::{
    ANNOUNCE_CLEAR_MS, DESKTOP_BREAKPOINT_PX, ENTRY_CLOSE_DELAY_MS, HOVER_CLOSE_DELAY_MS, RESIZE_DEBOUNCE_MS,
    SCROLL_THROTTLE_MS, SCROLLED_THRESHOLD_PX, SEARCH_INVALID_MS, VIEWPORT_MARGIN_PX,
};

/// Error returned by [`NavConfig::from_json`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The attribute value is not valid JSON for [`NavConfig`].
    #[error("failed to parse navbar config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field parsed but holds a value the controller cannot use.
    #[error("invalid navbar config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct NavConfig {
    pub breakpoint_px: f64,
    pub hover_close_delay_ms: f64,
    pub resize_debounce_ms: f64,
    pub scroll_throttle_ms: f64,
    pub entry_close_delay_ms: f64,
    pub announce_clear_ms: f64,
    pub search_invalid_ms: f64,
    pub viewport_margin_px: f64,
    pub scrolled_threshold_px: f64,
    /// Push "menu opened: <label>" into the live region when a panel opens.
    pub announce_on_open: bool,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            breakpoint_px: DESKTOP_BREAKPOINT_PX,
            hover_close_delay_ms: HOVER_CLOSE_DELAY_MS,
            resize_debounce_ms: RESIZE_DEBOUNCE_MS,
            scroll_throttle_ms: SCROLL_THROTTLE_MS,
            entry_close_delay_ms: ENTRY_CLOSE_DELAY_MS,
            announce_clear_ms: ANNOUNCE_CLEAR_MS,
            search_invalid_ms: SEARCH_INVALID_MS,
            viewport_margin_px: VIEWPORT_MARGIN_PX,
            scrolled_threshold_px: SCROLLED_THRESHOLD_PX,
            announce_on_open: true,
        }
    }
}

impl NavConfig {
    /// Parse and validate a config from its JSON attribute value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown fields and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve an optional attribute value, falling back to defaults with a
    /// warning when it does not parse.
    #[must_use]
    pub fn from_attribute(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Self::default();
        };
        match Self::from_json(raw) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("navbar: {err}; using default config");
                Self::default()
            }
        }
    }

    /// Check that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns the first field found out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.breakpoint_px.is_finite() && self.breakpoint_px > 0.0) {
            return Err(ConfigError::Invalid { field: "breakpointPx", reason: "must be a positive number" });
        }
        let delays = [
            ("hoverCloseDelayMs", self.hover_close_delay_ms),
            ("resizeDebounceMs", self.resize_debounce_ms),
            ("scrollThrottleMs", self.scroll_throttle_ms),
            ("entryCloseDelayMs", self.entry_close_delay_ms),
            ("announceClearMs", self.announce_clear_ms),
            ("searchInvalidMs", self.search_invalid_ms),
            ("viewportMarginPx", self.viewport_margin_px),
            ("scrolledThresholdPx", self.scrolled_threshold_px),
        ];
        for (field, value) in delays {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid { field, reason: "must be a non-negative number" });
            }
        }
        Ok(())
    }
}
