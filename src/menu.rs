//! Menu model and the markup scan.
//!
//! [`NavMarkup::scan`] walks a [`MarkupTree`] once at initialize and pulls out
//! everything the controller needs: dropdown parts, the desktop/mobile bars,
//! mobile collapse pieces, search forms, and the [`MenuItem`] tree. A dropdown
//! missing its toggle or panel is skipped with a warning so one malformed entry
//! never takes the rest of the navigation down with it.

#[cfg(test)]
#[path = "menu_test.rs"]
mod menu_test;

use crate::consts::{
    DESKTOP_NAVBAR_ID, DROPDOWN_CLASS, ENTRY_CLASS, LIVE_REGION_ID, MAIN_NAVBAR_ID, MOBILE_CONTENT_ID,
    MOBILE_NAVBAR_ID, MOBILE_TOGGLER_CLASS, NAV_LINK_CLASS, NAV_LIST_CLASS, PANEL_CLASS, TOGGLE_CLASS,
};
use crate::error::NavError;
use crate::markup::{FlatNode, MarkupTree, NodeId};

/// Where a navigation entry points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkTarget {
    /// Same-site path or in-page anchor.
    Internal(String),
    /// Absolute URL or other scheme (`mailto:`, `tel:`).
    External(String),
    /// No real destination: missing href, `""`, `"#"` or `javascript:`.
    Placeholder,
}

impl LinkTarget {
    #[must_use]
    pub fn from_href(href: Option<&str>) -> Self {
        let Some(href) = href.map(str::trim) else {
            return Self::Placeholder;
        };
        let lower = href.to_ascii_lowercase();
        if href.is_empty() || href == "#" || lower.starts_with("javascript:") {
            return Self::Placeholder;
        }
        let external = ["http://", "https://", "//", "mailto:", "tel:"]
            .iter()
            .any(|prefix| lower.starts_with(prefix));
        if external { Self::External(href.to_owned()) } else { Self::Internal(href.to_owned()) }
    }

    #[must_use]
    pub fn is_navigable(&self) -> bool {
        !matches!(self, Self::Placeholder)
    }

    /// Whether this target is the page at `current_path`.
    #[must_use]
    pub fn matches_path(&self, current_path: &str) -> bool {
        match self {
            Self::Internal(href) if !href.starts_with('#') => normalize_path(href) == normalize_path(current_path),
            _ => false,
        }
    }
}

fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// A labeled navigational entry, optionally with children.
#[derive(Clone, Debug, PartialEq)]
pub struct MenuItem {
    pub label: String,
    pub target: LinkTarget,
    /// The current page is this entry (or, for a parent, one of its children).
    pub active: bool,
    pub node: NodeId,
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    fn leaf(tree: &MarkupTree, node: NodeId, current_path: &str) -> Self {
        let target = LinkTarget::from_href(tree.get(node).and_then(|n| n.attr("href")));
        let active = target.matches_path(current_path);
        Self { label: tree.text_content(node), target, active, node, children: Vec::new() }
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Nodes in this subtree whose own target is `current_path`.
    #[must_use]
    pub fn matching_nodes(&self, current_path: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.target.matches_path(current_path) {
            out.push(self.node);
        }
        for child in &self.children {
            out.extend(child.matching_nodes(current_path));
        }
        out
    }
}

/// The pieces of one well-formed dropdown.
#[derive(Clone, Debug, PartialEq)]
pub struct DropdownParts {
    pub container: NodeId,
    pub toggle: NodeId,
    pub panel: NodeId,
    pub entries: Vec<NodeId>,
    pub label: String,
}

/// A `form[role=search]`, its query input and submit button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchForm {
    pub form: NodeId,
    pub input: NodeId,
    pub submit: Option<NodeId>,
}

/// Everything the controller needs from the page markup.
#[derive(Debug, Default)]
pub struct NavMarkup {
    pub dropdowns: Vec<DropdownParts>,
    pub items: Vec<MenuItem>,
    pub desktop_navbar: Option<NodeId>,
    pub mobile_navbar: Option<NodeId>,
    pub mobile_content: Option<NodeId>,
    pub mobile_toggler: Option<NodeId>,
    /// Non-toggle `.nav-link`s inside the mobile collapse.
    pub mobile_links: Vec<NodeId>,
    /// Focusable elements inside the mobile collapse, document order.
    pub mobile_focusables: Vec<NodeId>,
    pub search_forms: Vec<SearchForm>,
    pub live_region: Option<NodeId>,
    /// Malformed structures that were skipped.
    pub skipped: Vec<NavError>,
}

impl NavMarkup {
    #[must_use]
    pub fn scan(tree: &MarkupTree, current_path: &str) -> Self {
        let mut markup = Self {
            desktop_navbar: tree.find_by_dom_id(DESKTOP_NAVBAR_ID).or_else(|| tree.find_by_dom_id(MAIN_NAVBAR_ID)),
            mobile_navbar: tree.find_by_dom_id(MOBILE_NAVBAR_ID),
            mobile_content: tree.find_by_dom_id(MOBILE_CONTENT_ID),
            live_region: tree.find_by_dom_id(LIVE_REGION_ID),
            ..Self::default()
        };

        for container in tree.find_all_class(DROPDOWN_CLASS) {
            match dropdown_parts(tree, container) {
                Ok(parts) => markup.dropdowns.push(parts),
                Err(err) => {
                    log::warn!("navbar: skipping dropdown: {err}");
                    markup.skipped.push(err);
                }
            }
        }

        markup.mobile_toggler = markup
            .mobile_navbar
            .and_then(|bar| tree.find_class_within(bar, MOBILE_TOGGLER_CLASS));

        if let Some(content) = markup.mobile_content {
            let inside = tree.descendants(content);
            markup.mobile_links = inside
                .iter()
                .copied()
                .filter(|id| tree.get(*id).is_some_and(|n| n.has_class(NAV_LINK_CLASS) && !n.has_class(TOGGLE_CLASS)))
                .collect();
            markup.mobile_focusables = inside
                .into_iter()
                .filter(|id| tree.get(*id).is_some_and(is_focusable))
                .collect();
        }

        markup.search_forms = tree
            .ids()
            .filter(|id| tree.get(*id).is_some_and(|n| n.tag == "form" && n.attr("role") == Some("search")))
            .filter_map(|form| {
                let input = tree.descendants(form).into_iter().find(|d| {
                    tree.get(*d)
                        .is_some_and(|n| n.tag == "input" && (n.attr("type") == Some("search") || n.attr("name") == Some("q")))
                });
                if input.is_none() {
                    log::debug!("navbar: search form at node {} has no query input", form.0);
                }
                let submit = tree.descendants(form).into_iter().find(|d| {
                    tree.get(*d)
                        .is_some_and(|n| n.tag == "button" && n.attr("type") == Some("submit"))
                });
                input.map(|input| SearchForm { form, input, submit })
            })
            .collect();

        markup.items = menu_items(tree, &markup.dropdowns, current_path);
        markup
    }

    /// Index of the dropdown whose container, toggle or panel is `node`.
    #[must_use]
    pub fn dropdown_of(&self, node: NodeId) -> Option<usize> {
        self.dropdowns
            .iter()
            .position(|d| d.container == node || d.toggle == node || d.panel == node)
    }
}

fn dropdown_parts(tree: &MarkupTree, container: NodeId) -> Result<DropdownParts, NavError> {
    let toggle = tree
        .find_class_within(container, TOGGLE_CLASS)
        .ok_or(NavError::MissingToggle { container: container.0 })?;
    let label = tree.text_content(toggle);
    let panel = tree
        .next_sibling(toggle)
        .filter(|sibling| tree.get(*sibling).is_some_and(|n| n.has_class(PANEL_CLASS)))
        .or_else(|| tree.find_class_within(container, PANEL_CLASS))
        .ok_or_else(|| NavError::MissingPanel { label: label.clone() })?;
    let entries = tree
        .descendants(panel)
        .into_iter()
        .filter(|id| tree.get(*id).is_some_and(|n| n.has_class(ENTRY_CLASS)))
        .collect();
    Ok(DropdownParts { container, toggle, panel, entries, label })
}

fn is_focusable(node: &FlatNode) -> bool {
    if node.attr("tabindex") == Some("-1") {
        return false;
    }
    match node.tag.as_str() {
        "a" => node.attr("href").is_some(),
        "button" | "input" | "select" | "textarea" => true,
        _ => node.attr("tabindex").is_some(),
    }
}

/// Top-level `.navbar-nav` links and dropdown toggles, with dropdown entries as
/// children. Links inside a panel only appear as children.
fn menu_items(tree: &MarkupTree, dropdowns: &[DropdownParts], current_path: &str) -> Vec<MenuItem> {
    tree.ids()
        .filter(|id| {
            tree.get(*id).is_some_and(|n| n.has_class(NAV_LINK_CLASS) || n.has_class(TOGGLE_CLASS))
                && tree.closest(*id, |n| n.has_class(PANEL_CLASS)).is_none()
                && tree.closest(*id, |n| n.has_class(NAV_LIST_CLASS)).is_some()
        })
        .map(|id| {
            let mut item = MenuItem::leaf(tree, id, current_path);
            if let Some(parts) = dropdowns.iter().find(|d| d.toggle == id) {
                item.label.clone_from(&parts.label);
                item.children = parts
                    .entries
                    .iter()
                    .map(|entry| MenuItem::leaf(tree, *entry, current_path))
                    .collect();
                item.active = item.active || item.children.iter().any(|c| c.active);
            }
            item
        })
        .collect()
}
