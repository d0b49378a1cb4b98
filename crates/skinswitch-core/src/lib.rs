//! skinswitch core.
//!
//! Resolves a skin catalog into a registry, manages the skin stylesheets
//! linked into a page document, and keeps every switcher widget on the page
//! in sync through one [`GlobalCoordinator`]. Rendering is left to the
//! caller through [`SwitcherView`].

// Re-exports from skinswitch-types.
pub use skinswitch_types::dom;
pub use skinswitch_types::error;

pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod hooks;
pub mod instance;
pub mod marker;
pub mod persistence;
pub mod registry;
pub mod stylesheet;

pub use coordinator::{ClickOutcome, GlobalCoordinator, Transition};
pub use instance::SwitcherView;
