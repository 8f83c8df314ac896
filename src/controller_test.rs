#![allow(clippy::float_cmp)]

use super::*;
use crate::fixture::{dropdown, link, node_by_dom_id, node_by_text, page};

const WIDE: Viewport = Viewport { width: 1200.0, height: 800.0 };
const NARROW: Viewport = Viewport { width: 480.0, height: 800.0 };

fn env(viewport: Viewport) -> PageEnv {
    PageEnv { viewport, current_path: "/academics/programs/".to_owned(), ..PageEnv::default() }
}

fn setup(viewport: Viewport) -> NavController {
    let mut nav = NavController::default();
    nav.initialize(&page(), &env(viewport));
    nav
}

fn index(nav: &NavController, label: &str) -> usize {
    nav.find_dropdown(label).unwrap()
}

fn parts<'a>(nav: &'a NavController, label: &str) -> &'a DropdownParts {
    &nav.markup().dropdowns[index(nav, label)]
}

fn is_open(nav: &NavController, label: &str) -> bool {
    nav.dropdown(index(nav, label)).unwrap().is_open
}

fn click(node: NodeId, target: NodeId) -> NavEvent {
    NavEvent::new(Scope::Node(node), EventKind::Click { target: Some(target) })
}

fn document_click(target: Option<NodeId>) -> NavEvent {
    NavEvent::new(Scope::Document, EventKind::Click { target })
}

fn enter(node: NodeId) -> NavEvent {
    NavEvent::new(Scope::Node(node), EventKind::PointerEnter)
}

fn leave(node: NodeId) -> NavEvent {
    NavEvent::new(Scope::Node(node), EventKind::PointerLeave)
}

fn key_on(scope: Scope, target: NodeId, key: Key, shift: bool) -> NavEvent {
    NavEvent::new(scope, EventKind::KeyDown { target: Some(target), key, shift })
}

fn resize(viewport: Viewport) -> NavEvent {
    NavEvent::new(Scope::Window, EventKind::Resize(viewport))
}

// =============================================================
// Initialize
// =============================================================

#[test]
fn item_listeners_register_before_document_listeners() {
    let nav = setup(WIDE);
    let bindings = nav.bindings();
    let last_node = bindings.iter().rposition(|b| matches!(b.scope, Scope::Node(_))).unwrap();
    let first_global = bindings.iter().position(|b| !matches!(b.scope, Scope::Node(_))).unwrap();
    assert!(last_node < first_global);
    assert!(bindings.contains(&Binding::document(ListenerKind::Click)));
    assert!(bindings.contains(&Binding::window(ListenerKind::Resize)));
}

#[test]
fn initialize_twice_changes_nothing() {
    let mut nav = setup(WIDE);
    let before = nav.bindings().len();
    assert!(nav.initialize(&page(), &env(WIDE)).is_empty());
    assert_eq!(nav.bindings().len(), before);
}

#[test]
fn initialize_marks_current_page_active() {
    let mut nav = NavController::default();
    let effects = nav.initialize(&page(), &env(WIDE));
    let programs = node_by_text(nav.tree(), "Programs");
    assert!(effects.contains(&Effect::AddClass { node: programs, class: ACTIVE_CLASS }));

    let academics = nav.items().iter().find(|item| item.label == "Academics").unwrap();
    assert!(academics.active);
    // The parent toggle is active in the model only.
    assert!(!effects.contains(&Effect::AddClass { node: academics.node, class: ACTIVE_CLASS }));
}

#[test]
fn initialize_requests_live_region_and_fade_in() {
    let mut nav = NavController::default();
    let effects = nav.initialize(&page(), &env(WIDE));
    let desktop = node_by_dom_id(nav.tree(), "desktopNavbar");
    assert!(effects.contains(&Effect::EnsureLiveRegion));
    assert!(effects.contains(&Effect::AddClass { node: desktop, class: FADE_IN_CLASS }));
    assert!(!effects.contains(&Effect::MarkHighContrast));
}

#[test]
fn high_contrast_preference_is_applied() {
    let mut nav = NavController::default();
    let env = PageEnv { prefers_high_contrast: true, ..env(WIDE) };
    assert!(nav.initialize(&page(), &env).contains(&Effect::MarkHighContrast));
}

#[test]
fn narrow_initialize_hides_desktop_bar_without_hover_listeners() {
    let mut nav = NavController::default();
    let effects = nav.initialize(&page(), &env(NARROW));
    let desktop = node_by_dom_id(nav.tree(), "desktopNavbar");
    assert_eq!(nav.layout(), LayoutMode::Mobile);
    assert!(effects.contains(&Effect::SetStyle { node: desktop, property: "display", value: "none" }));
    assert!(!nav.bindings().iter().any(|b| b.kind.is_hover()));
}

#[test]
fn malformed_dropdown_is_skipped() {
    let broken = MarkupNode::element("li")
        .with_class("nav-item dropdown")
        .with_child(link("nav-link dropdown-toggle", "#", "Broken"));
    let root = MarkupNode::element("nav").with_id("desktopNavbar").with_child(
        MarkupNode::element("ul")
            .with_class("navbar-nav")
            .with_children([broken, dropdown("Working", &[("One", "/one/")])]),
    );
    let mut nav = NavController::default();
    nav.initialize(&root, &env(WIDE));
    assert_eq!(nav.dropdown_count(), 1);
    assert_eq!(nav.markup().skipped.len(), 1);

    let toggle = parts(&nav, "Working").toggle;
    nav.dispatch(click(toggle, toggle), 0.0);
    assert!(is_open(&nav, "Working"));
}

// =============================================================
// Single open
// =============================================================

#[test]
fn click_opens_and_closes_others() {
    let mut nav = setup(WIDE);
    let academics = parts(&nav, "Academics").toggle;
    let research = parts(&nav, "Research").toggle;

    let effects = nav.dispatch(click(academics, academics), 0.0);
    assert!(effects.contains(&Effect::PreventDefault));
    assert!(effects.contains(&Effect::SetAttribute { node: academics, name: "aria-expanded", value: "true" }));
    assert!(is_open(&nav, "Academics"));

    nav.dispatch(click(research, research), 10.0);
    assert!(!is_open(&nav, "Academics"));
    assert!(is_open(&nav, "Research"));
    assert_eq!(nav.open_count(), 1);
}

#[test]
fn click_toggles_closed() {
    let mut nav = setup(WIDE);
    let toggle = parts(&nav, "Academics").toggle;
    nav.dispatch(click(toggle, toggle), 0.0);
    nav.dispatch(click(toggle, toggle), 10.0);
    assert_eq!(nav.open_count(), 0);
}

#[test]
fn open_dropdown_rejects_unknown_index() {
    let mut nav = setup(WIDE);
    assert!(matches!(nav.open_dropdown(99, 0.0), Err(NavError::UnknownDropdown(99))));
    assert!(matches!(nav.close_dropdown(99), Err(NavError::UnknownDropdown(99))));
}

#[test]
fn open_announces_label() {
    let mut nav = setup(WIDE);
    let effects = nav.open_dropdown(index(&nav, "Research"), 0.0).unwrap();
    assert!(effects.contains(&Effect::Announce("menu opened: Research".to_owned())));
    assert!(effects.iter().any(|e| matches!(e, Effect::MeasurePanel { .. })));
}

// =============================================================
// Hover
// =============================================================

#[test]
fn hover_close_waits_for_grace_period() {
    let mut nav = setup(WIDE);
    let d = index(&nav, "Academics");
    let container = parts(&nav, "Academics").container;

    nav.dispatch(enter(container), 0.0);
    assert!(is_open(&nav, "Academics"));

    nav.dispatch(leave(container), 10.0);
    assert_eq!(nav.pending_close(d), Some(160.0));
    assert_eq!(nav.next_deadline(), Some(160.0));

    nav.advance(159.0);
    assert!(is_open(&nav, "Academics"));
    nav.advance(160.0);
    assert!(!is_open(&nav, "Academics"));
    assert_eq!(nav.pending_close(d), None);
}

#[test]
fn reentering_panel_cancels_close() {
    let mut nav = setup(WIDE);
    let d = index(&nav, "Academics");
    let DropdownParts { container, panel, .. } = parts(&nav, "Academics").clone();

    nav.dispatch(enter(container), 0.0);
    nav.dispatch(leave(container), 10.0);
    nav.dispatch(enter(panel), 100.0);
    assert_eq!(nav.pending_close(d), None);

    nav.advance(500.0);
    assert!(is_open(&nav, "Academics"));
}

#[test]
fn hover_is_inert_in_mobile_layout() {
    let mut nav = setup(NARROW);
    let container = parts(&nav, "Academics").container;
    assert!(nav.dispatch(enter(container), 0.0).is_empty());
    assert_eq!(nav.open_count(), 0);
}

// =============================================================
// Outside click
// =============================================================

#[test]
fn outside_click_closes_once() {
    let mut nav = setup(WIDE);
    nav.initialize(&page(), &env(WIDE));
    let toggle = parts(&nav, "Academics").toggle;
    nav.dispatch(click(toggle, toggle), 0.0);

    let welcome = node_by_text(nav.tree(), "Welcome");
    let effects = nav.dispatch(document_click(Some(welcome)), 10.0);
    let closes = effects
        .iter()
        .filter(|e| **e == Effect::SetAttribute { node: toggle, name: "aria-expanded", value: "false" })
        .count();
    assert_eq!(closes, 1);
    assert_eq!(nav.open_count(), 0);
}

#[test]
fn click_inside_dropdown_is_left_to_item_handlers() {
    let mut nav = setup(WIDE);
    let toggle = parts(&nav, "Academics").toggle;
    nav.dispatch(click(toggle, toggle), 0.0);

    let soon = node_by_text(nav.tree(), "Coming soon");
    nav.dispatch(document_click(Some(soon)), 10.0);
    assert!(is_open(&nav, "Academics"));
}

// =============================================================
// Entries
// =============================================================

#[test]
fn navigating_entry_closes_after_delay() {
    let mut nav = setup(WIDE);
    let DropdownParts { toggle, panel, .. } = parts(&nav, "Academics").clone();
    let programs = node_by_text(nav.tree(), "Programs");
    nav.dispatch(click(toggle, toggle), 0.0);

    let effects = nav.dispatch(click(panel, programs), 10.0);
    assert!(effects.contains(&Effect::AddClass { node: programs, class: LOADING_CLASS }));
    assert!(is_open(&nav, "Academics"));

    let effects = nav.advance(110.0);
    assert!(!is_open(&nav, "Academics"));
    assert!(effects.contains(&Effect::RemoveClass { node: programs, class: LOADING_CLASS }));
}

#[test]
fn placeholder_entry_keeps_panel_open() {
    let mut nav = setup(WIDE);
    let DropdownParts { toggle, panel, .. } = parts(&nav, "Academics").clone();
    let soon = node_by_text(nav.tree(), "Coming soon");
    nav.dispatch(click(toggle, toggle), 0.0);

    assert!(nav.dispatch(click(panel, soon), 10.0).is_empty());
    nav.advance(500.0);
    assert!(is_open(&nav, "Academics"));
}

// =============================================================
// Keyboard
// =============================================================

#[test]
fn enter_opens_and_focuses_first_entry() {
    let mut nav = setup(WIDE);
    let DropdownParts { container, toggle, entries, .. } = parts(&nav, "Academics").clone();
    let effects = nav.dispatch(key_on(Scope::Node(container), toggle, Key::Enter, false), 0.0);
    assert!(is_open(&nav, "Academics"));
    assert!(effects.contains(&Effect::Focus(entries[0])));

    // Enter on an open dropdown keeps it open.
    nav.dispatch(key_on(Scope::Node(container), toggle, Key::Space, false), 10.0);
    assert!(is_open(&nav, "Academics"));
}

#[test]
fn arrows_move_without_wrapping() {
    let mut nav = setup(WIDE);
    let d = index(&nav, "Academics");
    let DropdownParts { container, entries, .. } = parts(&nav, "Academics").clone();
    let scope = Scope::Node(container);
    nav.open_dropdown(d, 0.0).unwrap();

    let effects = nav.dispatch(key_on(scope, entries[0], Key::ArrowDown, false), 10.0);
    assert!(effects.contains(&Effect::Focus(entries[1])));

    let effects = nav.dispatch(key_on(scope, entries[2], Key::ArrowDown, false), 20.0);
    assert!(!effects.iter().any(|e| matches!(e, Effect::Focus(_))));

    let effects = nav.dispatch(key_on(scope, entries[0], Key::ArrowUp, false), 30.0);
    assert!(!effects.iter().any(|e| matches!(e, Effect::Focus(_))));

    let effects = nav.dispatch(key_on(scope, entries[2], Key::ArrowUp, false), 40.0);
    assert!(effects.contains(&Effect::Focus(entries[1])));
}

#[test]
fn arrows_ignored_while_closed() {
    let mut nav = setup(WIDE);
    let DropdownParts { container, entries, .. } = parts(&nav, "Academics").clone();
    let effects = nav.dispatch(key_on(Scope::Node(container), entries[0], Key::ArrowDown, false), 0.0);
    assert!(effects.is_empty());
}

#[test]
fn escape_closes_and_returns_focus() {
    let mut nav = setup(WIDE);
    let DropdownParts { toggle, entries, .. } = parts(&nav, "Research").clone();
    nav.dispatch(click(toggle, toggle), 0.0);

    let effects = nav.dispatch(key_on(Scope::Document, entries[1], Key::Escape, false), 10.0);
    assert_eq!(nav.open_count(), 0);
    assert_eq!(effects.last(), Some(&Effect::Focus(toggle)));
}

#[test]
fn tab_wraps_inside_expanded_mobile_menu() {
    let mut nav = setup(NARROW);
    nav.toggle_mobile_menu();
    let content = Scope::Node(node_by_dom_id(nav.tree(), "mobileNavbarContent"));
    let first = node_by_text(nav.tree(), "Start");
    let last = node_by_text(nav.tree(), "Go");

    let effects = nav.dispatch(key_on(content, last, Key::Tab, false), 0.0);
    assert_eq!(effects, vec![Effect::PreventDefault, Effect::Focus(first)]);

    let effects = nav.dispatch(key_on(content, first, Key::Tab, true), 10.0);
    assert_eq!(effects, vec![Effect::PreventDefault, Effect::Focus(last)]);

    let effects = nav.dispatch(key_on(content, first, Key::Tab, false), 20.0);
    assert!(effects.is_empty());
}

// =============================================================
// Layout
// =============================================================

#[test]
fn resize_to_mobile_is_debounced_and_drops_hover() {
    let mut nav = setup(WIDE);
    let container = parts(&nav, "Academics").container;
    nav.open_dropdown(index(&nav, "Academics"), 0.0).unwrap();

    nav.dispatch(resize(Viewport::new(700.0, 800.0)), 0.0);
    nav.dispatch(resize(NARROW), 100.0);
    assert_eq!(nav.next_deadline(), Some(350.0));
    nav.advance(349.0);
    assert!(nav.layout().is_desktop());

    let effects = nav.advance(350.0);
    assert_eq!(nav.layout(), LayoutMode::Mobile);
    assert_eq!(nav.open_count(), 0);
    assert!(effects.contains(&Effect::Unlisten(Binding::node(container, ListenerKind::PointerEnter))));
    assert!(nav.dispatch(enter(container), 400.0).is_empty());
}

#[test]
fn resize_to_desktop_collapses_mobile_menu() {
    let mut nav = setup(NARROW);
    nav.toggle_mobile_menu();
    assert!(nav.is_mobile_expanded());

    let effects = nav.handle_resize(WIDE);
    let container = parts(&nav, "Academics").container;
    let mobile = node_by_dom_id(nav.tree(), "mobileNavbar");
    assert!(!nav.is_mobile_expanded());
    assert!(effects.contains(&Effect::Listen(Binding::node(container, ListenerKind::PointerEnter))));
    assert!(effects.contains(&Effect::AddClass { node: mobile, class: HIDDEN_ON_DESKTOP_CLASS }));
}

#[test]
fn resize_within_layout_keeps_state() {
    let mut nav = setup(WIDE);
    nav.open_dropdown(index(&nav, "Academics"), 0.0).unwrap();
    assert!(nav.handle_resize(Viewport::new(1000.0, 700.0)).is_empty());
    assert!(is_open(&nav, "Academics"));
}

#[test]
fn mobile_toggle_only_works_in_mobile_layout() {
    let mut nav = setup(WIDE);
    assert!(nav.toggle_mobile_menu().is_empty());
    assert!(!nav.is_mobile_expanded());

    let mut nav = setup(NARROW);
    let content = node_by_dom_id(nav.tree(), "mobileNavbarContent");
    assert!(nav.toggle_mobile_menu().contains(&Effect::AddClass { node: content, class: SHOW_CLASS }));
    assert!(nav.toggle_mobile_menu().contains(&Effect::RemoveClass { node: content, class: SHOW_CLASS }));
}

#[test]
fn mobile_toggler_and_links_drive_collapse() {
    let mut nav = setup(NARROW);
    let toggler = nav.markup().mobile_toggler.unwrap();
    let start = node_by_text(nav.tree(), "Start");

    nav.dispatch(click(toggler, toggler), 0.0);
    assert!(nav.is_mobile_expanded());
    nav.dispatch(click(start, start), 10.0);
    assert!(!nav.is_mobile_expanded());
}

#[test]
fn panel_placement_flips_and_clears_on_close() {
    let mut nav = setup(WIDE);
    let d = index(&nav, "Research");
    let panel = parts(&nav, "Research").panel;
    assert!(nav.place_panel(d, Rect::new(1100.0, 60.0, 200.0, 300.0)).is_empty());

    nav.open_dropdown(d, 0.0).unwrap();
    let effects = nav.place_panel(d, Rect::new(1100.0, 60.0, 200.0, 300.0));
    assert!(effects.contains(&Effect::SetStyle { node: panel, property: "right", value: "0" }));

    let effects = nav.close_dropdown(d).unwrap();
    for property in PLACEMENT_PROPERTIES {
        assert!(effects.contains(&Effect::ClearStyle { node: panel, property }));
    }
}

// =============================================================
// Page state
// =============================================================

#[test]
fn scroll_marks_navbars_with_throttle() {
    let mut nav = setup(WIDE);
    let desktop = node_by_dom_id(nav.tree(), "desktopNavbar");
    let scroll = |y| NavEvent::new(Scope::Window, EventKind::Scroll { y });

    let effects = nav.dispatch(scroll(50.0), 0.0);
    assert!(effects.contains(&Effect::AddClass { node: desktop, class: SCROLLED_CLASS }));
    assert!(nav.dispatch(scroll(0.0), 5.0).is_empty());
    let effects = nav.dispatch(scroll(0.0), 20.0);
    assert!(effects.contains(&Effect::RemoveClass { node: desktop, class: SCROLLED_CLASS }));
}

#[test]
fn hidden_page_closes_dropdowns() {
    let mut nav = setup(WIDE);
    nav.open_dropdown(index(&nav, "Academics"), 0.0).unwrap();
    let visible = NavEvent::new(Scope::Document, EventKind::VisibilityChange { hidden: false });
    nav.dispatch(visible, 5.0);
    assert_eq!(nav.open_count(), 1);
    let hidden = NavEvent::new(Scope::Document, EventKind::VisibilityChange { hidden: true });
    nav.dispatch(hidden, 10.0);
    assert_eq!(nav.open_count(), 0);
}

#[test]
fn empty_search_is_flagged_then_cleared() {
    let mut nav = setup(NARROW);
    let form = nav.markup().search_forms[0];
    let submit = |query: &str| NavEvent::new(Scope::Node(form.form), EventKind::Submit { query: query.to_owned() });

    let effects = nav.dispatch(submit("   "), 0.0);
    assert!(effects.contains(&Effect::PreventDefault));
    assert!(effects.contains(&Effect::AddClass { node: form.input, class: INVALID_CLASS }));

    let effects = nav.advance(3000.0);
    assert!(effects.contains(&Effect::RemoveClass { node: form.input, class: INVALID_CLASS }));
}

#[test]
fn search_submit_marks_button_busy() {
    let mut nav = setup(NARROW);
    let form = nav.markup().search_forms[0];
    let button = form.submit.unwrap();
    let submit = NavEvent::new(Scope::Node(form.form), EventKind::Submit { query: "physics".to_owned() });

    let effects = nav.dispatch(submit, 0.0);
    assert!(!effects.contains(&Effect::PreventDefault));
    assert!(effects.contains(&Effect::SetAttribute { node: button, name: "disabled", value: "disabled" }));
    assert!(effects.contains(&Effect::AddClass { node: button, class: LOADING_CLASS }));
    assert!(!effects.iter().any(|e| matches!(e, Effect::AddClass { class: INVALID_CLASS, .. })));
}

#[test]
fn announcement_clears_later() {
    let mut nav = setup(WIDE);
    assert_eq!(nav.announce("saved", 0.0), vec![Effect::Announce("saved".to_owned())]);
    assert!(nav.advance(999.0).is_empty());
    assert_eq!(nav.advance(1000.0), vec![Effect::ClearAnnouncement]);
}

// =============================================================
// Teardown
// =============================================================

#[test]
fn reinitialize_resets_state() {
    let mut nav = setup(WIDE);
    let fresh = nav.bindings().len();
    nav.open_dropdown(index(&nav, "Academics"), 0.0).unwrap();

    let effects = nav.reinitialize(&page(), &env(WIDE));
    assert_eq!(nav.open_count(), 0);
    assert_eq!(nav.bindings().len(), fresh);
    let first_listen = effects.iter().position(|e| matches!(e, Effect::Listen(_))).unwrap();
    let last_unlisten = effects.iter().rposition(|e| matches!(e, Effect::Unlisten(_))).unwrap();
    assert!(last_unlisten < first_listen);
}

#[test]
fn destroyed_controller_ignores_events() {
    let mut nav = setup(WIDE);
    let toggle = parts(&nav, "Academics").toggle;
    let effects = nav.destroy();
    assert!(nav.bindings().is_empty());
    assert!(effects.iter().any(|e| matches!(e, Effect::Unlisten(_))));
    assert!(!nav.is_initialized());
    assert!(nav.dispatch(click(toggle, toggle), 0.0).is_empty());
}
