use crate::config::NavConfig;
use crate::consts::{
    ACTIVE_CLASS, DROPDOWN_CLASS, FADE_IN_CLASS, GLOW_CLASS, HIDDEN_ON_DESKTOP_CLASS, INVALID_CLASS, LOADING_CLASS,
    SCROLLED_CLASS, SHOW_CLASS,
};
use crate::error::NavError;
use crate::input::{Binding, EventKind, Key, ListenerKind, NavEvent, Scope};
use crate::layout::{LayoutMode, MobileMenuState};
use crate::markup::{MarkupNode, MarkupTree, NodeId};
use crate::menu::{DropdownParts, LinkTarget, MenuItem, NavMarkup, SearchForm};
use crate::position::{PLACEMENT_PROPERTIES, Placement, Rect, Viewport, place_panel};
use crate::timing::{Debounce, Throttle, TimerKey, TimerQueue, earliest};

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

/// DOM mutations returned from the controller for the host to apply, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Listen(Binding),
    Unlisten(Binding),
    AddClass { node: NodeId, class: &'static str },
    RemoveClass { node: NodeId, class: &'static str },
    SetStyle { node: NodeId, property: &'static str, value: &'static str },
    ClearStyle { node: NodeId, property: &'static str },
    SetAttribute { node: NodeId, name: &'static str, value: &'static str },
    Focus(NodeId),
    /// Measure the now-visible panel and hand its rect to [`NavController::place_panel`].
    MeasurePanel { dropdown: usize, panel: NodeId },
    /// Create the off-screen live region; the page markup has none.
    EnsureLiveRegion,
    Announce(String),
    ClearAnnouncement,
    /// Add the high-contrast class to the document root.
    MarkHighContrast,
    /// Cancel the default action of the DOM event being handled.
    PreventDefault,
}

/// Page facts read once by the host at initialize.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageEnv {
    pub viewport: Viewport,
    pub current_path: String,
    pub scroll_y: f64,
    pub prefers_high_contrast: bool,
}

/// Transient state of one dropdown.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DropdownState {
    pub is_open: bool,
    /// Pointer is over the dropdown item (toggle + container).
    pub over_item: bool,
    /// Pointer is over the panel.
    pub over_panel: bool,
    pub placement: Placement,
    /// Entry marked as loading after a navigating click.
    pub loading_entry: Option<NodeId>,
}

/// Navigation controller: all state and logic, no browser dependency.
///
/// At most one dropdown is open at any time. Every handler runs to completion
/// synchronously and returns the effects it wants applied; timers live in the
/// controller and fire from [`NavController::advance`].
pub struct NavController {
    config: NavConfig,
    tree: MarkupTree,
    markup: NavMarkup,
    dropdowns: Vec<DropdownState>,
    layout: LayoutMode,
    viewport: Viewport,
    mobile: MobileMenuState,
    bindings: Vec<Binding>,
    timers: TimerQueue,
    resize: Debounce<Viewport>,
    scroll: Throttle,
    scrolled: bool,
    initialized: bool,
}

impl Default for NavController {
    fn default() -> Self {
        Self::new(NavConfig::default())
    }
}

impl NavController {
    #[must_use]
    pub fn new(config: NavConfig) -> Self {
        Self {
            resize: Debounce::new(config.resize_debounce_ms),
            scroll: Throttle::new(config.scroll_throttle_ms),
            config,
            tree: MarkupTree::default(),
            markup: NavMarkup::default(),
            dropdowns: Vec::new(),
            layout: LayoutMode::default(),
            viewport: Viewport::default(),
            mobile: MobileMenuState::default(),
            bindings: Vec::new(),
            timers: TimerQueue::new(),
            scrolled: false,
            initialized: false,
        }
    }

    // --- Lifecycle ---

    /// Scan `root`, register listeners and compute the initial layout.
    ///
    /// Calling this on an initialized controller does nothing.
    pub fn initialize(&mut self, root: &MarkupNode, env: &PageEnv) -> Vec<Effect> {
        let mut out = Vec::new();
        if self.initialized {
            log::debug!("navbar: already initialized");
            return out;
        }

        self.tree = MarkupTree::from_root(root);
        self.markup = NavMarkup::scan(&self.tree, &env.current_path);
        self.dropdowns = vec![DropdownState::default(); self.markup.dropdowns.len()];
        self.viewport = env.viewport;
        self.layout = LayoutMode::for_width(env.viewport.width, self.config.breakpoint_px);
        self.mobile = MobileMenuState::default();
        self.timers.clear();
        self.resize.cancel();
        self.scroll.reset();
        self.scrolled = false;

        // Item listeners go first so document-level handlers always run after them.
        for binding in self.item_bindings() {
            self.listen(binding, &mut out);
        }
        if self.layout.is_desktop() {
            for binding in self.hover_bindings() {
                self.listen(binding, &mut out);
            }
        }
        for binding in [
            Binding::window(ListenerKind::Resize),
            Binding::window(ListenerKind::Scroll),
            Binding::document(ListenerKind::Click),
            Binding::document(ListenerKind::KeyDown),
            Binding::document(ListenerKind::VisibilityChange),
        ] {
            self.listen(binding, &mut out);
        }

        self.apply_layout_visibility(&mut out);
        for item in &self.markup.items {
            for node in item.matching_nodes(&env.current_path) {
                out.push(Effect::AddClass { node, class: ACTIVE_CLASS });
            }
        }
        if self.markup.live_region.is_none() {
            out.push(Effect::EnsureLiveRegion);
        }
        if env.prefers_high_contrast {
            out.push(Effect::MarkHighContrast);
        }
        for bar in self.navbars() {
            out.push(Effect::AddClass { node: bar, class: FADE_IN_CLASS });
        }
        self.apply_scroll(env.scroll_y, &mut out);

        self.initialized = true;
        log::debug!(
            "navbar: initialized with {} dropdowns ({} skipped), layout {:?}",
            self.dropdowns.len(),
            self.markup.skipped.len(),
            self.layout
        );
        out
    }

    /// Tear down and initialize again against fresh markup.
    pub fn reinitialize(&mut self, root: &MarkupNode, env: &PageEnv) -> Vec<Effect> {
        let mut out = self.destroy();
        out.extend(self.initialize(root, env));
        out
    }

    /// Close everything, drop every listener and timer.
    pub fn destroy(&mut self) -> Vec<Effect> {
        let mut out = Vec::new();
        if !self.initialized {
            return out;
        }
        self.close_all(&mut out);
        while let Some(binding) = self.bindings.pop() {
            out.push(Effect::Unlisten(binding));
        }
        self.timers.clear();
        self.resize.cancel();
        self.scroll.reset();
        self.initialized = false;
        out
    }

    // --- Events and time ---

    /// Handle one event delivered on a binding.
    ///
    /// Timers due at `now_ms` fire first. Events for bindings the controller
    /// does not hold are ignored; handler failures are logged, never raised.
    pub fn dispatch(&mut self, event: NavEvent, now_ms: f64) -> Vec<Effect> {
        let mut out = self.advance(now_ms);
        if !self.initialized {
            return out;
        }
        let binding = event.binding();
        if !self.bindings.contains(&binding) {
            log::debug!("navbar: ignoring event on unbound {binding:?}");
            return out;
        }
        if let Err(err) = self.handle(event, now_ms, &mut out) {
            log::warn!("navbar: event handler failed: {err}");
        }
        out
    }

    /// Fire every timer due at `now_ms`.
    pub fn advance(&mut self, now_ms: f64) -> Vec<Effect> {
        let mut out = Vec::new();
        if let Some(viewport) = self.resize.take_ready(now_ms) {
            self.resize_to(viewport, &mut out);
        }
        for key in self.timers.take_due(now_ms) {
            self.fire(key, now_ms, &mut out);
        }
        out
    }

    /// When [`NavController::advance`] next has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<f64> {
        earliest([self.timers.next_deadline(), self.resize.deadline()])
    }

    // --- Public operations ---

    /// Open dropdown `index`, closing any other first.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::UnknownDropdown`] for an index outside the table.
    pub fn open_dropdown(&mut self, index: usize, now_ms: f64) -> Result<Vec<Effect>, NavError> {
        self.check_dropdown(index)?;
        let mut out = Vec::new();
        self.open(index, now_ms, &mut out);
        Ok(out)
    }

    /// Close dropdown `index` and cancel its pending timers.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::UnknownDropdown`] for an index outside the table.
    pub fn close_dropdown(&mut self, index: usize) -> Result<Vec<Effect>, NavError> {
        self.check_dropdown(index)?;
        let mut out = Vec::new();
        self.close(index, &mut out);
        Ok(out)
    }

    pub fn close_all_dropdowns(&mut self) -> Vec<Effect> {
        let mut out = Vec::new();
        self.close_all(&mut out);
        out
    }

    /// Flip the mobile collapse. Does nothing in desktop layout.
    pub fn toggle_mobile_menu(&mut self) -> Vec<Effect> {
        let mut out = Vec::new();
        self.toggle_mobile(&mut out);
        out
    }

    /// Push `message` to the live region; it clears itself later.
    pub fn announce(&mut self, message: &str, now_ms: f64) -> Vec<Effect> {
        let mut out = Vec::new();
        self.announce_into(message.to_owned(), now_ms, &mut out);
        out
    }

    /// Recompute the layout for `viewport` right away, bypassing the debounce.
    pub fn handle_resize(&mut self, viewport: Viewport) -> Vec<Effect> {
        let mut out = Vec::new();
        if self.initialized {
            self.resize.cancel();
            self.resize_to(viewport, &mut out);
        }
        out
    }

    /// Reposition an open panel measured at `rect` so it stays on screen.
    pub fn place_panel(&mut self, index: usize, rect: Rect) -> Vec<Effect> {
        let mut out = Vec::new();
        let Some(panel) = self.markup.dropdowns.get(index).map(|p| p.panel) else {
            return out;
        };
        let Some(state) = self.dropdowns.get_mut(index).filter(|s| s.is_open) else {
            return out;
        };
        let placement = place_panel(rect, self.viewport, self.config.viewport_margin_px);
        if placement == state.placement {
            return out;
        }
        if !state.placement.is_natural() {
            out.extend(PLACEMENT_PROPERTIES.into_iter().map(|property| Effect::ClearStyle { node: panel, property }));
        }
        out.extend(
            placement
                .style_overrides()
                .into_iter()
                .map(|(property, value)| Effect::SetStyle { node: panel, property, value }),
        );
        state.placement = placement;
        out
    }

    // --- Queries ---

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[must_use]
    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn is_mobile_expanded(&self) -> bool {
        self.mobile.is_expanded
    }

    #[must_use]
    pub fn tree(&self) -> &MarkupTree {
        &self.tree
    }

    #[must_use]
    pub fn markup(&self) -> &NavMarkup {
        &self.markup
    }

    #[must_use]
    pub fn items(&self) -> &[MenuItem] {
        &self.markup.items
    }

    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    #[must_use]
    pub fn dropdown_count(&self) -> usize {
        self.dropdowns.len()
    }

    #[must_use]
    pub fn dropdown(&self, index: usize) -> Option<&DropdownState> {
        self.dropdowns.get(index)
    }

    /// Index of the first dropdown whose toggle reads `label`.
    #[must_use]
    pub fn find_dropdown(&self, label: &str) -> Option<usize> {
        self.markup.dropdowns.iter().position(|d| d.label == label)
    }

    #[must_use]
    pub fn open_dropdown_index(&self) -> Option<usize> {
        self.dropdowns.iter().position(|d| d.is_open)
    }

    #[must_use]
    pub fn open_count(&self) -> usize {
        self.dropdowns.iter().filter(|d| d.is_open).count()
    }

    /// Deadline of the hover-close timer for `index`, if armed.
    #[must_use]
    pub fn pending_close(&self, index: usize) -> Option<f64> {
        self.timers.deadline(TimerKey::HoverClose(index))
    }

    // --- Handlers ---

    fn handle(&mut self, event: NavEvent, now_ms: f64, out: &mut Vec<Effect>) -> Result<(), NavError> {
        match (event.scope, event.kind) {
            (Scope::Node(node), EventKind::PointerEnter) => self.on_pointer_enter(node, now_ms, out),
            (Scope::Node(node), EventKind::PointerLeave) => self.on_pointer_leave(node, now_ms),
            (Scope::Node(node), EventKind::Click { target }) => self.on_node_click(node, target, now_ms, out),
            (Scope::Document, EventKind::Click { target }) => {
                self.on_document_click(target, out);
                Ok(())
            }
            (Scope::Node(node), EventKind::KeyDown { target, key, shift }) => {
                self.on_node_key(node, target, &key, shift, now_ms, out)
            }
            (Scope::Document, EventKind::KeyDown { key: Key::Escape, .. }) => {
                self.on_escape(out);
                Ok(())
            }
            (Scope::Node(node), EventKind::Submit { query }) => self.on_submit(node, &query, now_ms, out),
            (_, EventKind::Resize(viewport)) => {
                self.resize.push(viewport, now_ms);
                Ok(())
            }
            (_, EventKind::Scroll { y }) => {
                if self.scroll.try_acquire(now_ms) {
                    self.apply_scroll(y, out);
                }
                Ok(())
            }
            (_, EventKind::VisibilityChange { hidden: true }) => {
                self.close_all(out);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn on_pointer_enter(&mut self, node: NodeId, now_ms: f64, out: &mut Vec<Effect>) -> Result<(), NavError> {
        if !self.layout.is_desktop() {
            return Ok(());
        }
        let index = self.markup.dropdown_of(node).ok_or(NavError::UnknownNode(node.0))?;
        self.timers.cancel(TimerKey::HoverClose(index));
        if node == self.markup.dropdowns[index].panel {
            self.dropdowns[index].over_panel = true;
            return Ok(());
        }
        self.dropdowns[index].over_item = true;
        self.open(index, now_ms, out);
        Ok(())
    }

    fn on_pointer_leave(&mut self, node: NodeId, now_ms: f64) -> Result<(), NavError> {
        let index = self.markup.dropdown_of(node).ok_or(NavError::UnknownNode(node.0))?;
        let is_panel = node == self.markup.dropdowns[index].panel;
        let state = &mut self.dropdowns[index];
        if is_panel {
            state.over_panel = false;
        } else {
            state.over_item = false;
        }
        if state.is_open && !state.over_item && !state.over_panel {
            self.timers
                .arm(TimerKey::HoverClose(index), now_ms, self.config.hover_close_delay_ms);
        }
        Ok(())
    }

    fn on_node_click(
        &mut self,
        node: NodeId,
        target: Option<NodeId>,
        now_ms: f64,
        out: &mut Vec<Effect>,
    ) -> Result<(), NavError> {
        if let Some(index) = self.markup.dropdowns.iter().position(|d| d.toggle == node) {
            out.push(Effect::PreventDefault);
            if self.dropdowns[index].is_open {
                self.close(index, out);
            } else {
                self.open(index, now_ms, out);
            }
            return Ok(());
        }
        if let Some(index) = self.markup.dropdowns.iter().position(|d| d.panel == node) {
            self.on_panel_click(index, target, now_ms, out);
            return Ok(());
        }
        if self.markup.mobile_toggler == Some(node) {
            out.push(Effect::PreventDefault);
            self.toggle_mobile(out);
            return Ok(());
        }
        if self.markup.mobile_links.contains(&node) {
            if !self.layout.is_desktop() {
                self.collapse_mobile(out);
            }
            return Ok(());
        }
        Err(NavError::UnknownNode(node.0))
    }

    fn on_panel_click(&mut self, index: usize, target: Option<NodeId>, now_ms: f64, out: &mut Vec<Effect>) {
        let Some(target) = target else {
            return;
        };
        let Some(entry) = self.markup.dropdowns[index]
            .entries
            .iter()
            .copied()
            .find(|entry| self.tree.is_within(target, *entry))
        else {
            return;
        };
        let href = LinkTarget::from_href(self.tree.get(entry).and_then(|n| n.attr("href")));
        if !href.is_navigable() || !self.dropdowns[index].is_open {
            return;
        }
        // The browser follows the link; the panel closes shortly after.
        out.push(Effect::AddClass { node: entry, class: LOADING_CLASS });
        self.dropdowns[index].loading_entry = Some(entry);
        self.timers
            .arm(TimerKey::EntryClose(index), now_ms, self.config.entry_close_delay_ms);
    }

    fn on_document_click(&mut self, target: Option<NodeId>, out: &mut Vec<Effect>) {
        let inside_dropdown = target.is_some_and(|t| self.tree.closest(t, |n| n.has_class(DROPDOWN_CLASS)).is_some());
        if !inside_dropdown {
            self.close_all(out);
        }
    }

    fn on_node_key(
        &mut self,
        node: NodeId,
        target: Option<NodeId>,
        key: &Key,
        shift: bool,
        now_ms: f64,
        out: &mut Vec<Effect>,
    ) -> Result<(), NavError> {
        if let Some(index) = self.markup.dropdowns.iter().position(|d| d.container == node) {
            self.on_dropdown_key(index, target, key, now_ms, out);
            return Ok(());
        }
        if self.markup.mobile_content == Some(node) {
            self.on_mobile_key(target, key, shift, out);
            return Ok(());
        }
        Err(NavError::UnknownNode(node.0))
    }

    fn on_dropdown_key(&mut self, index: usize, target: Option<NodeId>, key: &Key, now_ms: f64, out: &mut Vec<Effect>) {
        let Some(target) = target else {
            return;
        };
        let parts = self.markup.dropdowns[index].clone();
        let on_toggle = self.tree.is_within(target, parts.toggle);
        match key {
            Key::Enter | Key::Space if on_toggle => {
                out.push(Effect::PreventDefault);
                self.open(index, now_ms, out);
                if let Some(first) = parts.entries.first() {
                    out.push(Effect::Focus(*first));
                }
            }
            Key::ArrowDown | Key::ArrowUp if self.dropdowns[index].is_open => {
                if on_toggle {
                    if *key == Key::ArrowDown {
                        out.push(Effect::PreventDefault);
                        if let Some(first) = parts.entries.first() {
                            out.push(Effect::Focus(*first));
                        }
                    }
                    return;
                }
                self.move_focus(&parts, target, key, out);
            }
            _ => {}
        }
    }

    fn move_focus(&self, parts: &DropdownParts, target: NodeId, key: &Key, out: &mut Vec<Effect>) {
        let Some(current) = parts.entries.iter().position(|e| self.tree.is_within(target, *e)) else {
            return;
        };
        out.push(Effect::PreventDefault);
        let next = match key {
            Key::ArrowDown => Some(current + 1).filter(|n| *n < parts.entries.len()),
            Key::ArrowUp => current.checked_sub(1),
            _ => None,
        };
        if let Some(next) = next {
            out.push(Effect::Focus(parts.entries[next]));
        }
    }

    fn on_escape(&mut self, out: &mut Vec<Effect>) {
        let return_to = self.open_dropdown_index().map(|index| self.markup.dropdowns[index].toggle);
        self.close_all(out);
        self.collapse_mobile(out);
        if let Some(toggle) = return_to {
            out.push(Effect::Focus(toggle));
        }
    }

    fn on_mobile_key(&mut self, target: Option<NodeId>, key: &Key, shift: bool, out: &mut Vec<Effect>) {
        if *key != Key::Tab || !self.mobile.is_expanded {
            return;
        }
        let (Some(first), Some(last)) = (
            self.markup.mobile_focusables.first().copied(),
            self.markup.mobile_focusables.last().copied(),
        ) else {
            return;
        };
        if shift && target == Some(first) {
            out.push(Effect::PreventDefault);
            out.push(Effect::Focus(last));
        } else if !shift && target == Some(last) {
            out.push(Effect::PreventDefault);
            out.push(Effect::Focus(first));
        }
    }

    fn on_submit(&mut self, form: NodeId, query: &str, now_ms: f64, out: &mut Vec<Effect>) -> Result<(), NavError> {
        let index = self
            .markup
            .search_forms
            .iter()
            .position(|f| f.form == form)
            .ok_or(NavError::UnknownNode(form.0))?;
        let SearchForm { input, submit, .. } = self.markup.search_forms[index];
        if !query.trim().is_empty() {
            // The browser submits; the button stays busy until the page unloads.
            if let Some(button) = submit {
                out.push(Effect::SetAttribute { node: button, name: "disabled", value: "disabled" });
                out.push(Effect::SetAttribute { node: button, name: "aria-busy", value: "true" });
                out.push(Effect::AddClass { node: button, class: LOADING_CLASS });
            }
            return Ok(());
        }
        out.push(Effect::PreventDefault);
        out.push(Effect::Focus(input));
        out.push(Effect::AddClass { node: input, class: INVALID_CLASS });
        self.timers
            .arm(TimerKey::SearchInvalid(index), now_ms, self.config.search_invalid_ms);
        Ok(())
    }

    fn fire(&mut self, key: TimerKey, now_ms: f64, out: &mut Vec<Effect>) {
        match key {
            TimerKey::HoverClose(index) => {
                if self
                    .dropdowns
                    .get(index)
                    .is_some_and(|s| s.is_open && !s.over_item && !s.over_panel)
                {
                    self.close(index, out);
                }
            }
            TimerKey::EntryClose(index) => {
                if index < self.dropdowns.len() {
                    self.close(index, out);
                }
            }
            TimerKey::AnnounceClear => out.push(Effect::ClearAnnouncement),
            TimerKey::SearchInvalid(index) => {
                if let Some(form) = self.markup.search_forms.get(index) {
                    out.push(Effect::RemoveClass { node: form.input, class: INVALID_CLASS });
                }
            }
        }
        log::trace!("navbar: timer {key:?} fired at {now_ms}");
    }

    // --- State transitions ---

    fn open(&mut self, index: usize, now_ms: f64, out: &mut Vec<Effect>) {
        if self.dropdowns[index].is_open {
            return;
        }
        if let Some(other) = self.open_dropdown_index() {
            self.close(other, out);
        }
        self.dropdowns[index].is_open = true;

        let DropdownParts { toggle, panel, label, .. } = &self.markup.dropdowns[index];
        let (toggle, panel) = (*toggle, *panel);
        let label = label.clone();
        out.extend([
            Effect::AddClass { node: panel, class: SHOW_CLASS },
            Effect::AddClass { node: toggle, class: SHOW_CLASS },
            Effect::SetAttribute { node: toggle, name: "aria-expanded", value: "true" },
            Effect::SetStyle { node: panel, property: "display", value: "block" },
            Effect::SetStyle { node: panel, property: "visibility", value: "visible" },
            Effect::SetStyle { node: panel, property: "opacity", value: "1" },
            Effect::AddClass { node: toggle, class: GLOW_CLASS },
            Effect::MeasurePanel { dropdown: index, panel },
        ]);
        if self.config.announce_on_open {
            self.announce_into(format!("menu opened: {label}"), now_ms, out);
        }
    }

    fn close(&mut self, index: usize, out: &mut Vec<Effect>) {
        self.timers.cancel(TimerKey::HoverClose(index));
        self.timers.cancel(TimerKey::EntryClose(index));
        let state = &mut self.dropdowns[index];
        if !state.is_open {
            return;
        }
        state.is_open = false;
        let placement = std::mem::take(&mut state.placement);
        let loading = state.loading_entry.take();

        let DropdownParts { toggle, panel, .. } = &self.markup.dropdowns[index];
        let (toggle, panel) = (*toggle, *panel);
        out.extend([
            Effect::RemoveClass { node: panel, class: SHOW_CLASS },
            Effect::RemoveClass { node: toggle, class: SHOW_CLASS },
            Effect::SetAttribute { node: toggle, name: "aria-expanded", value: "false" },
            Effect::SetStyle { node: panel, property: "display", value: "none" },
            Effect::ClearStyle { node: panel, property: "visibility" },
            Effect::ClearStyle { node: panel, property: "opacity" },
            Effect::RemoveClass { node: toggle, class: GLOW_CLASS },
        ]);
        if !placement.is_natural() {
            out.extend(PLACEMENT_PROPERTIES.into_iter().map(|property| Effect::ClearStyle { node: panel, property }));
        }
        if let Some(entry) = loading {
            out.push(Effect::RemoveClass { node: entry, class: LOADING_CLASS });
        }
    }

    fn close_all(&mut self, out: &mut Vec<Effect>) {
        for index in 0..self.dropdowns.len() {
            self.close(index, out);
        }
    }

    fn toggle_mobile(&mut self, out: &mut Vec<Effect>) {
        if !self.initialized || self.layout.is_desktop() {
            return;
        }
        if self.mobile.is_expanded {
            self.collapse_mobile(out);
            return;
        }
        self.mobile.is_expanded = true;
        if let Some(content) = self.markup.mobile_content {
            out.push(Effect::AddClass { node: content, class: SHOW_CLASS });
        }
        if let Some(toggler) = self.markup.mobile_toggler {
            out.push(Effect::SetAttribute { node: toggler, name: "aria-expanded", value: "true" });
        }
    }

    fn collapse_mobile(&mut self, out: &mut Vec<Effect>) {
        if !self.mobile.is_expanded {
            return;
        }
        self.mobile.is_expanded = false;
        if let Some(content) = self.markup.mobile_content {
            out.push(Effect::RemoveClass { node: content, class: SHOW_CLASS });
        }
        if let Some(toggler) = self.markup.mobile_toggler {
            out.push(Effect::SetAttribute { node: toggler, name: "aria-expanded", value: "false" });
        }
    }

    fn resize_to(&mut self, viewport: Viewport, out: &mut Vec<Effect>) {
        self.viewport = viewport;
        let next = LayoutMode::for_width(viewport.width, self.config.breakpoint_px);
        if next == self.layout {
            return;
        }
        log::debug!("navbar: layout {:?} -> {next:?} at {}px", self.layout, viewport.width);
        self.close_all(out);
        self.layout = next;
        if next.is_desktop() {
            self.collapse_mobile(out);
            for binding in self.hover_bindings() {
                self.listen(binding, out);
            }
        } else {
            for binding in self.hover_bindings() {
                self.unlisten(binding, out);
            }
            for (index, state) in self.dropdowns.iter_mut().enumerate() {
                state.over_item = false;
                state.over_panel = false;
                self.timers.cancel(TimerKey::HoverClose(index));
            }
        }
        self.apply_layout_visibility(out);
    }

    fn apply_layout_visibility(&self, out: &mut Vec<Effect>) {
        let (shown, hidden) = if self.layout.is_desktop() {
            (self.markup.desktop_navbar, self.markup.mobile_navbar)
        } else {
            (self.markup.mobile_navbar, self.markup.desktop_navbar)
        };
        if let Some(node) = shown {
            out.push(Effect::SetStyle { node, property: "display", value: "block" });
            out.push(Effect::RemoveClass { node, class: HIDDEN_ON_DESKTOP_CLASS });
        }
        if let Some(node) = hidden {
            out.push(Effect::SetStyle { node, property: "display", value: "none" });
            out.push(Effect::AddClass { node, class: HIDDEN_ON_DESKTOP_CLASS });
        }
    }

    fn apply_scroll(&mut self, scroll_y: f64, out: &mut Vec<Effect>) {
        let scrolled = scroll_y > self.config.scrolled_threshold_px;
        if scrolled == self.scrolled {
            return;
        }
        self.scrolled = scrolled;
        for node in self.navbars() {
            out.push(if scrolled {
                Effect::AddClass { node, class: SCROLLED_CLASS }
            } else {
                Effect::RemoveClass { node, class: SCROLLED_CLASS }
            });
        }
    }

    fn announce_into(&mut self, message: String, now_ms: f64, out: &mut Vec<Effect>) {
        out.push(Effect::Announce(message));
        self.timers
            .arm(TimerKey::AnnounceClear, now_ms, self.config.announce_clear_ms);
    }

    // --- Bindings ---

    fn item_bindings(&self) -> Vec<Binding> {
        let mut bindings = Vec::new();
        for parts in &self.markup.dropdowns {
            bindings.push(Binding::node(parts.toggle, ListenerKind::Click));
            bindings.push(Binding::node(parts.panel, ListenerKind::Click));
            bindings.push(Binding::node(parts.container, ListenerKind::KeyDown));
        }
        if let Some(toggler) = self.markup.mobile_toggler {
            bindings.push(Binding::node(toggler, ListenerKind::Click));
        }
        for link in &self.markup.mobile_links {
            bindings.push(Binding::node(*link, ListenerKind::Click));
        }
        if let Some(content) = self.markup.mobile_content {
            bindings.push(Binding::node(content, ListenerKind::KeyDown));
        }
        for form in &self.markup.search_forms {
            bindings.push(Binding::node(form.form, ListenerKind::Submit));
        }
        bindings
    }

    fn hover_bindings(&self) -> Vec<Binding> {
        self.markup
            .dropdowns
            .iter()
            .flat_map(|parts| {
                [
                    Binding::node(parts.container, ListenerKind::PointerEnter),
                    Binding::node(parts.container, ListenerKind::PointerLeave),
                    Binding::node(parts.panel, ListenerKind::PointerEnter),
                    Binding::node(parts.panel, ListenerKind::PointerLeave),
                ]
            })
            .collect()
    }

    fn listen(&mut self, binding: Binding, out: &mut Vec<Effect>) {
        if !self.bindings.contains(&binding) {
            self.bindings.push(binding);
            out.push(Effect::Listen(binding));
        }
    }

    fn unlisten(&mut self, binding: Binding, out: &mut Vec<Effect>) {
        if let Some(pos) = self.bindings.iter().position(|b| *b == binding) {
            self.bindings.remove(pos);
            out.push(Effect::Unlisten(binding));
        }
    }

    fn navbars(&self) -> impl Iterator<Item = NodeId> + use<> {
        [self.markup.desktop_navbar, self.markup.mobile_navbar].into_iter().flatten()
    }

    fn check_dropdown(&self, index: usize) -> Result<(), NavError> {
        if index < self.dropdowns.len() { Ok(()) } else { Err(NavError::UnknownDropdown(index)) }
    }
}
