//! Wire types for the autoanswer extension.
//!
//! Every message crossing an extension context boundary (page controller,
//! service worker, popup panel) is defined here so both sides share a single
//! serde representation.

pub mod messages;

pub use messages::{CommandResponse, PanelMessage, RuntimeRequest, RuntimeResponse, SelectorCommand};

/// Name of the long-lived port the popup panel opens to the service worker.
pub const PANEL_PORT_NAME: &str = "popup";

/// Script file injected into a tab when the selector controller is missing.
pub const CONTENT_SCRIPT_FILE: &str = "content.js";
