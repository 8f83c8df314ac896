//! Browser host: the only module that touches the DOM.
//!
//! The host snapshots `document.body` into a [`MarkupNode`] tree, keeping a
//! parallel list of the real elements so a [`NodeId`] maps straight back to
//! its [`Element`]. Each element is tagged with a `data-nav-node` attribute so
//! event targets can be resolved to the nearest scanned node. Listeners are
//! added and removed exactly as the controller's `Listen`/`Unlisten` effects
//! say, and the controller's timers are driven by a single `gloo` timeout set
//! to [`NavController::next_deadline`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{JsCast, closure::Closure};
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, HtmlInputElement, KeyboardEvent, Node, Window};

use crate::config::NavConfig;
use crate::consts::{CONFIG_ATTRIBUTE, HIGH_CONTRAST_CLASS, LIVE_REGION_ID};
use crate::controller::{Effect, NavController, PageEnv};
use crate::error::NavError;
use crate::input::{Binding, EventKind, Key, ListenerKind, NavEvent, Scope};
use crate::markup::{MarkupNode, NodeId};
use crate::position::{Rect, Viewport};

const NODE_ATTRIBUTE: &str = "data-nav-node";
const HIGH_CONTRAST_QUERY: &str = "(prefers-contrast: more)";

type Listener = Closure<dyn FnMut(Event)>;

fn now() -> f64 {
    js_sys::Date::now()
}

fn dom_error(err: JsValue) -> NavError {
    NavError::Dom(format!("{err:?}"))
}

struct Host {
    window: Window,
    document: Document,
    controller: RefCell<NavController>,
    /// Real element for each `NodeId` of the current snapshot.
    elements: RefCell<Vec<Element>>,
    listeners: RefCell<HashMap<Binding, Listener>>,
    /// Listeners removed from the DOM; dropped on the next timer tick so a
    /// running closure is never freed under itself.
    retired: RefCell<Vec<Listener>>,
    timer: RefCell<Option<Timeout>>,
    fired: RefCell<Option<Timeout>>,
    live_region: RefCell<Option<Element>>,
    this: Weak<Host>,
}

impl Host {
    fn new(window: Window, document: Document, config: NavConfig) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            window,
            document,
            controller: RefCell::new(NavController::new(config)),
            elements: RefCell::new(Vec::new()),
            listeners: RefCell::new(HashMap::new()),
            retired: RefCell::new(Vec::new()),
            timer: RefCell::new(None),
            fired: RefCell::new(None),
            live_region: RefCell::new(None),
            this: this.clone(),
        })
    }

    // --- Lifecycle ---

    fn initialize(&self) {
        if self.controller.borrow().is_initialized() {
            log::debug!("navbar: initialize skipped, already running");
            return;
        }
        let Some(body) = self.document.body() else {
            log::warn!("navbar: document has no body");
            return;
        };
        let mut elements = Vec::new();
        let root = snapshot(&body, &mut elements);
        *self.elements.borrow_mut() = elements;
        *self.live_region.borrow_mut() = self.document.get_element_by_id(LIVE_REGION_ID);

        let env = self.page_env();
        let effects = self.controller.borrow_mut().initialize(&root, &env);
        self.apply(effects, None);
    }

    fn destroy(&self) {
        let effects = self.controller.borrow_mut().destroy();
        self.apply(effects, None);
        self.timer.borrow_mut().take();
    }

    fn page_env(&self) -> PageEnv {
        PageEnv {
            viewport: self.viewport(),
            current_path: self.window.location().pathname().unwrap_or_else(|_| "/".to_owned()),
            scroll_y: self.window.scroll_y().unwrap_or_default(),
            prefers_high_contrast: matches!(
                self.window.match_media(HIGH_CONTRAST_QUERY),
                Ok(Some(list)) if list.matches()
            ),
        }
    }

    fn viewport(&self) -> Viewport {
        let px = |value: Result<JsValue, JsValue>| value.map(|v| v.as_f64().unwrap_or_default()).unwrap_or_default();
        Viewport::new(px(self.window.inner_width()), px(self.window.inner_height()))
    }

    // --- Events and timers ---

    fn on_event(&self, binding: Binding, event: &Event) {
        let Some(nav_event) = self.translate(binding, event) else {
            return;
        };
        let effects = self.controller.borrow_mut().dispatch(nav_event, now());
        self.apply(effects, Some(event));
    }

    fn on_timer(&self) {
        // The timeout running now moves aside; the one parked last tick is freed.
        let running = self.timer.borrow_mut().take();
        *self.fired.borrow_mut() = running;
        self.retired.borrow_mut().clear();

        let effects = self.controller.borrow_mut().advance(now());
        self.apply(effects, None);
    }

    fn translate(&self, binding: Binding, event: &Event) -> Option<NavEvent> {
        let kind = match binding.kind {
            ListenerKind::PointerEnter => EventKind::PointerEnter,
            ListenerKind::PointerLeave => EventKind::PointerLeave,
            ListenerKind::Click => EventKind::Click { target: self.target_node(event) },
            ListenerKind::KeyDown => {
                let key = event.dyn_ref::<KeyboardEvent>()?;
                EventKind::KeyDown {
                    target: self.target_node(event),
                    key: Key::from_dom(&key.key()),
                    shift: key.shift_key(),
                }
            }
            ListenerKind::Submit => EventKind::Submit { query: self.search_query(binding.scope) },
            ListenerKind::Resize => EventKind::Resize(self.viewport()),
            ListenerKind::Scroll => EventKind::Scroll { y: self.window.scroll_y().unwrap_or_default() },
            ListenerKind::VisibilityChange => EventKind::VisibilityChange { hidden: self.document.hidden() },
        };
        Some(NavEvent::new(binding.scope, kind))
    }

    /// Nearest scanned node at or above the event target.
    fn target_node(&self, event: &Event) -> Option<NodeId> {
        let target = event.target()?.dyn_into::<Element>();
        let Ok(Ok(Some(tagged))) = target.map(|el| el.closest(&format!("[{NODE_ATTRIBUTE}]"))) else {
            return None;
        };
        match tagged.get_attribute(NODE_ATTRIBUTE)?.parse::<usize>() {
            Ok(index) => Some(NodeId(index)),
            Err(_) => None,
        }
    }

    fn search_query(&self, scope: Scope) -> String {
        let Scope::Node(form) = scope else {
            return String::new();
        };
        let input = self
            .controller
            .borrow()
            .markup()
            .search_forms
            .iter()
            .find(|f| f.form == form)
            .map(|f| f.input);
        input
            .and_then(|input| self.elements.borrow().get(input.0).cloned())
            .and_then(|el| el.dyn_ref::<HtmlInputElement>().map(HtmlInputElement::value))
            .unwrap_or_default()
    }

    fn schedule(&self) {
        self.timer.borrow_mut().take();
        let Some(deadline) = self.controller.borrow().next_deadline() else {
            return;
        };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let delay = (deadline - now()).max(0.0).ceil() as u32;
        let host = self.this.clone();
        let timeout = Timeout::new(delay, move || {
            if let Some(host) = host.upgrade() {
                host.on_timer();
            }
        });
        *self.timer.borrow_mut() = Some(timeout);
    }

    // --- Effects ---

    fn apply(&self, effects: Vec<Effect>, event: Option<&Event>) {
        for effect in effects {
            if let Err(err) = self.apply_one(effect, event) {
                log::warn!("navbar: failed to apply effect: {err}");
            }
        }
        self.schedule();
    }

    fn apply_one(&self, effect: Effect, event: Option<&Event>) -> Result<(), NavError> {
        match effect {
            Effect::Listen(binding) => self.listen(binding),
            Effect::Unlisten(binding) => self.unlisten(binding),
            Effect::AddClass { node, class } => self.element(node)?.class_list().add_1(class).map_err(dom_error),
            Effect::RemoveClass { node, class } => self.element(node)?.class_list().remove_1(class).map_err(dom_error),
            Effect::SetStyle { node, property, value } => {
                self.html_element(node)?.style().set_property(property, value).map_err(dom_error)
            }
            Effect::ClearStyle { node, property } => self
                .html_element(node)?
                .style()
                .remove_property(property)
                .map(drop)
                .map_err(dom_error),
            Effect::SetAttribute { node, name, value } => self.element(node)?.set_attribute(name, value).map_err(dom_error),
            Effect::Focus(node) => self.html_element(node)?.focus().map_err(dom_error),
            Effect::MeasurePanel { dropdown, panel } => {
                let bounds = self.element(panel)?.get_bounding_client_rect();
                let rect = Rect { left: bounds.left(), top: bounds.top(), right: bounds.right(), bottom: bounds.bottom() };
                let placed = self.controller.borrow_mut().place_panel(dropdown, rect);
                placed.into_iter().try_for_each(|effect| self.apply_one(effect, event))
            }
            Effect::EnsureLiveRegion => self.ensure_live_region(),
            Effect::Announce(message) => {
                self.live_text(&message);
                Ok(())
            }
            Effect::ClearAnnouncement => {
                self.live_text("");
                Ok(())
            }
            Effect::MarkHighContrast => match self.document.document_element() {
                Some(root) => root.class_list().add_1(HIGH_CONTRAST_CLASS).map_err(dom_error),
                None => Err(NavError::Dom("document has no root element".to_owned())),
            },
            Effect::PreventDefault => {
                if let Some(event) = event {
                    event.prevent_default();
                }
                Ok(())
            }
        }
    }

    fn element(&self, node: NodeId) -> Result<Element, NavError> {
        self.elements
            .borrow()
            .get(node.0)
            .cloned()
            .ok_or(NavError::UnknownNode(node.0))
    }

    fn html_element(&self, node: NodeId) -> Result<HtmlElement, NavError> {
        self.element(node)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| NavError::Dom(format!("node {} is not an html element", node.0)))
    }

    fn event_target(&self, scope: Scope) -> Result<EventTarget, NavError> {
        match scope {
            Scope::Window => Ok(self.window.clone().into()),
            Scope::Document => Ok(self.document.clone().into()),
            Scope::Node(node) => self.element(node).map(Into::into),
        }
    }

    fn listen(&self, binding: Binding) -> Result<(), NavError> {
        let target = self.event_target(binding.scope)?;
        let host = self.this.clone();
        let listener: Listener = Closure::wrap(Box::new(move |event: Event| {
            if let Some(host) = host.upgrade() {
                host.on_event(binding, &event);
            }
        }) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(binding.kind.dom_event(), listener.as_ref().unchecked_ref())
            .map_err(dom_error)?;
        if let Some(stale) = self.listeners.borrow_mut().insert(binding, listener) {
            self.retired.borrow_mut().push(stale);
        }
        Ok(())
    }

    fn unlisten(&self, binding: Binding) -> Result<(), NavError> {
        let Some(listener) = self.listeners.borrow_mut().remove(&binding) else {
            return Ok(());
        };
        let removed = self
            .event_target(binding.scope)
            .and_then(|target| {
                target
                    .remove_event_listener_with_callback(binding.kind.dom_event(), listener.as_ref().unchecked_ref())
                    .map_err(dom_error)
            });
        self.retired.borrow_mut().push(listener);
        removed
    }

    fn ensure_live_region(&self) -> Result<(), NavError> {
        if self.live_region.borrow().is_some() {
            return Ok(());
        }
        let body = self
            .document
            .body()
            .ok_or_else(|| NavError::Dom("document has no body".to_owned()))?;
        let region = self.document.create_element("div").map_err(dom_error)?;
        region.set_id(LIVE_REGION_ID);
        region.set_class_name("visually-hidden");
        for (name, value) in [("aria-live", "polite"), ("aria-atomic", "true"), ("role", "status")] {
            region.set_attribute(name, value).map_err(dom_error)?;
        }
        body.append_child(&region).map_err(dom_error)?;
        *self.live_region.borrow_mut() = Some(region);
        Ok(())
    }

    fn live_text(&self, text: &str) {
        match self.live_region.borrow().as_ref() {
            Some(region) => region.set_text_content(Some(text)),
            None => log::debug!("navbar: no live region for announcement"),
        }
    }
}

/// Pre-order copy of `element` and its element children. Pushes each element
/// onto `elements` so its index is its [`NodeId`].
fn snapshot(element: &Element, elements: &mut Vec<Element>) -> MarkupNode {
    let index = elements.len();
    elements.push(element.clone());

    let mut node = MarkupNode::element(&element.tag_name()).with_class(&element.class_name());
    let id = element.id();
    if !id.is_empty() {
        node.id = Some(id);
    }
    for name in element.get_attribute_names().iter().filter_map(|name| name.as_string()) {
        if name == NODE_ATTRIBUTE {
            continue;
        }
        if let Some(value) = element.get_attribute(&name) {
            node.attrs.insert(name.to_ascii_lowercase(), value);
        }
    }
    let nodes = element.child_nodes();
    for i in 0..nodes.length() {
        if let Some(child) = nodes.item(i).filter(|child| child.node_type() == Node::TEXT_NODE) {
            node.text.push_str(&child.text_content().unwrap_or_default());
        }
    }
    if let Err(err) = element.set_attribute(NODE_ATTRIBUTE, &index.to_string()) {
        log::warn!("navbar: cannot tag node {index}: {err:?}");
    }

    let children = element.children();
    for i in 0..children.length() {
        if let Some(child) = children.item(i) {
            node.children.push(snapshot(&child, elements));
        }
    }
    node
}

/// Handle returned to page scripts by [`mount_navbar`].
#[wasm_bindgen]
pub struct NavbarApi {
    host: Rc<Host>,
}

#[wasm_bindgen]
impl NavbarApi {
    /// Scan the page and start listening. No-op when already running.
    pub fn initialize(&self) {
        self.host.initialize();
    }

    /// Tear down and scan the page again, e.g. after markup was replaced.
    pub fn reinitialize(&self) {
        self.host.destroy();
        self.host.initialize();
    }

    #[wasm_bindgen(js_name = closeAllDropdowns)]
    pub fn close_all_dropdowns(&self) {
        let effects = self.host.controller.borrow_mut().close_all_dropdowns();
        self.host.apply(effects, None);
    }

    #[wasm_bindgen(js_name = toggleMobileMenu)]
    pub fn toggle_mobile_menu(&self) {
        let effects = self.host.controller.borrow_mut().toggle_mobile_menu();
        self.host.apply(effects, None);
    }

    pub fn announce(&self, message: &str) {
        let effects = self.host.controller.borrow_mut().announce(message, now());
        self.host.apply(effects, None);
    }

    pub fn destroy(&self) {
        self.host.destroy();
    }
}

impl Drop for NavbarApi {
    fn drop(&mut self) {
        self.host.destroy();
    }
}

/// Install logging, read the page config and start the controller.
///
/// # Errors
///
/// Fails when there is no `window` or `document`.
#[wasm_bindgen(js_name = mountNavbar)]
pub fn mount_navbar() -> Result<NavbarApi, JsValue> {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("navbar: logger already installed");
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("navbar: no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("navbar: no document"))?;
    let raw_config = document.body().and_then(|body| body.get_attribute(CONFIG_ATTRIBUTE));
    let config = NavConfig::from_attribute(raw_config.as_deref());

    let host = Host::new(window, document, config);
    host.initialize();
    Ok(NavbarApi { host })
}
