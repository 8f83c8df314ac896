//! Error taxonomy for the navigation controller.
//!
//! Nothing here is fatal. Scan errors skip one malformed menu entry; handler
//! errors are logged at the event boundary and the rest of the page keeps
//! working.

#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// A `.dropdown` container has no `.dropdown-toggle` inside it.
    #[error("dropdown container at node {container} has no toggle")]
    MissingToggle { container: usize },
    /// A toggle is not followed by a `.dropdown-menu` panel.
    #[error("dropdown toggle {label:?} has no panel")]
    MissingPanel { label: String },
    /// An event or call referenced a node outside the scanned markup.
    #[error("node {0} is not part of the scanned navigation markup")]
    UnknownNode(usize),
    /// A dropdown index outside the controller's table.
    #[error("no dropdown with index {0}")]
    UnknownDropdown(usize),
    /// A browser DOM call failed.
    #[error("dom call failed: {0}")]
    Dom(String),
}
