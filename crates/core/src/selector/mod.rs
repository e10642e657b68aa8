//! Element selector: the page-embedded overlay that lets a user pick an element
//! and captures its visible text.
//!
//! The state machine lives in [`SelectorController`]. Everything that touches
//! the real DOM is behind [`PageSurface`], and captured text leaves through a
//! [`CaptureSink`], so the controller runs identically in the browser and in
//! native tests.

mod controller;
pub mod geometry;


pub use controller::{
	Capture, CaptureSink, ClickDisposition, KeyDisposition, PageSurface, SelectorController, SurfaceError, TargetKind,
	Transition,
};
pub use geometry::{Highlight, Rect};

/// Attribute marking the highlight box itself.
pub const OVERLAY_ATTR: &str = "data-aa-overlay";

/// Attribute marking any other UI the extension adds to a page.
pub const UI_ATTR: &str = "data-aa-ui";

/// Key that cancels an active selection.
pub const CANCEL_KEY: &str = "Escape";
