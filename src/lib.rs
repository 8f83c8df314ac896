//! Responsive navigation bar controller.
//!
//! This crate is compiled to WebAssembly and drives the server-rendered
//! navbar of a multi-page site: dropdown panels that open on hover or click,
//! keyboard navigation, a collapsible mobile menu below the desktop
//! breakpoint, and screen-reader announcements. All state and decisions live
//! in [`controller::NavController`], which takes markup snapshots, events and
//! a caller-supplied clock and returns [`controller::Effect`]s. The browser
//! host (feature `hydrate`) only wires DOM listeners to the controller and
//! applies the effects it returns.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`controller`] | Navigation state machine and the effects it emits |
//! | [`markup`] | Markup snapshot and the flattened tree the controller reads |
//! | [`menu`] | Menu model and the markup scan |
//! | [`input`] | Listener bindings and event types |
//! | [`layout`] | Desktop/mobile layout selection |
//! | [`position`] | Viewport-overflow placement for open panels |
//! | [`timing`] | Debounce, throttle and timer queue on an injected clock |
//! | [`config`] | Runtime tuning parsed from the page |
//! | [`error`] | Error taxonomy |
//! | [`consts`] | Shared constants (breakpoint, delays, class names) |
//! | `host` | Browser bindings (feature `hydrate`) |

pub mod config;
pub mod consts;
pub mod controller;
pub mod error;
pub mod input;
pub mod layout;
pub mod markup;
pub mod menu;
pub mod position;
pub mod timing;

#[cfg(feature = "hydrate")]
pub mod host;

#[cfg(test)]
#[path = "fixture_test.rs"]
mod fixture;
