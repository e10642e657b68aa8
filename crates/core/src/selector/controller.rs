use thiserror::Error;
use tracing::{debug, info, warn};

use super::CANCEL_KEY;
use super::geometry::{Highlight, Rect};
use crate::text::{CAPTURE_LIMIT, normalize_capture, preview};

/// Failure reported by a [`PageSurface`] while wiring itself into the page.
#[derive(Debug, Clone, Error)]
#[error("page surface error: {0}")]
pub struct SurfaceError(pub String);

/// How the selector treats the element under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
	/// The document root (`<html>`).
	Root,
	/// The `<body>` element.
	Body,
	/// The highlight box or any other UI the extension injected.
	OwnUi,
	/// Regular page content that can be captured.
	Content,
}

impl TargetKind {
	pub fn is_selectable(self) -> bool {
		self == TargetKind::Content
	}
}

/// DOM-facing side of the selector.
///
/// Implementations own the cursor style, the event listeners, and the
/// highlight box. The controller guarantees listeners are attached exactly
/// while it is active.
pub trait PageSurface {
	type Element: Clone;

	/// Switches the page cursor between the crosshair and the page default.
	fn set_picking_cursor(&mut self, picking: bool);

	/// Registers pointer, click, and key listeners (capture phase).
	fn attach_listeners(&mut self) -> Result<(), SurfaceError>;

	/// Unregisters listeners. Must be safe to call when none are attached.
	fn detach_listeners(&mut self);

	/// Creates the (hidden) highlight box if it does not exist yet.
	fn mount_highlight(&mut self) -> Result<(), SurfaceError>;

	/// Removes the highlight box from the page.
	fn unmount_highlight(&mut self);

	/// Shows or hides the highlight box.
	fn render_highlight(&mut self, highlight: Highlight);

	fn classify(&self, element: &Self::Element) -> TargetKind;

	fn bounding_rect(&self, element: &Self::Element) -> Rect;

	/// Visible text of the element (`innerText`, falling back to `textContent`).
	fn inner_text(&self, element: &Self::Element) -> String;

	fn same_element(&self, a: &Self::Element, b: &Self::Element) -> bool;
}

/// Normalized text captured from a clicked element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
	pub text: String,
}

/// Destination of captured text, usually the coordinator process.
pub trait CaptureSink {
	fn deliver(&mut self, capture: Capture);
}

impl CaptureSink for Vec<Capture> {
	fn deliver(&mut self, capture: Capture) {
		self.push(capture);
	}
}

/// Result of an enable/disable request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
	Activated,
	Deactivated,
	/// The controller was already in the requested state.
	Unchanged,
}

/// What the DOM layer must do with a click event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickDisposition {
	/// Selector inactive; the page handles the click normally.
	PassThrough,
	/// Click consumed without a capture; the selector stays active.
	Suppressed,
	/// Click consumed, text captured and delivered, selector now idle.
	Captured,
}

impl ClickDisposition {
	pub fn cancels_default(self) -> bool {
		!matches!(self, ClickDisposition::PassThrough)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
	PassThrough,
	/// The key cancelled the selection and must not reach the page.
	Consumed,
}

struct SelectionSession<E> {
	hovered: Option<E>,
	highlight: Highlight,
}

/// Selector state machine: `Idle` when `session` is `None`, `Active` otherwise.
pub struct SelectorController<S: PageSurface, K: CaptureSink> {
	surface: S,
	sink: K,
	capture_limit: usize,
	session: Option<SelectionSession<S::Element>>,
	last_capture: Option<String>,
}

impl<S: PageSurface, K: CaptureSink> SelectorController<S, K> {
	pub fn new(surface: S, sink: K) -> Self {
		Self {
			surface,
			sink,
			capture_limit: CAPTURE_LIMIT,
			session: None,
			last_capture: None,
		}
	}

	pub fn with_capture_limit(mut self, limit: usize) -> Self {
		self.capture_limit = limit;
		self
	}

	pub fn is_active(&self) -> bool {
		self.session.is_some()
	}

	/// Current highlight state; always hidden while idle.
	pub fn highlight(&self) -> Highlight {
		self.session.as_ref().map(|s| s.highlight).unwrap_or_default()
	}

	/// Text of the most recent successful capture.
	pub fn last_capture(&self) -> Option<&str> {
		self.last_capture.as_deref()
	}

	pub fn surface(&self) -> &S {
		&self.surface
	}

	pub fn surface_mut(&mut self) -> &mut S {
		&mut self.surface
	}

	pub fn sink(&self) -> &K {
		&self.sink
	}

	/// Enters picking mode. A no-op when already active.
	///
	/// On failure every partial change is rolled back and the controller stays idle.
	pub fn enable(&mut self) -> Result<Transition, SurfaceError> {
		if self.is_active() {
			debug!(target = "autoanswer", "selector already active");
			return Ok(Transition::Unchanged);
		}

		self.surface.set_picking_cursor(true);
		let wired = self.surface.mount_highlight().and_then(|()| self.surface.attach_listeners());
		if let Err(err) = wired {
			warn!(target = "autoanswer", error = %err, "selector activation failed");
			self.teardown();
			return Err(err);
		}

		self.surface.render_highlight(Highlight::Hidden);
		self.session = Some(SelectionSession {
			hovered: None,
			highlight: Highlight::Hidden,
		});
		info!(target = "autoanswer", "selector activated");
		Ok(Transition::Activated)
	}

	/// Leaves picking mode without capturing. A no-op when idle.
	pub fn disable(&mut self) -> Transition {
		if self.session.take().is_none() {
			debug!(target = "autoanswer", "selector already idle");
			return Transition::Unchanged;
		}

		self.teardown();
		info!(target = "autoanswer", "selector deactivated");
		Transition::Deactivated
	}

	pub fn on_pointer_move(&mut self, target: Option<&S::Element>) {
		let Some(session) = self.session.as_mut() else {
			return;
		};

		let next = match target {
			Some(element) if self.surface.classify(element).is_selectable() => {
				let changed = session
					.hovered
					.as_ref()
					.is_none_or(|current| !self.surface.same_element(current, element));
				if changed {
					session.hovered = Some(element.clone());
				}
				Highlight::around(self.surface.bounding_rect(element))
			}
			_ => Highlight::Hidden,
		};

		if next != session.highlight {
			session.highlight = next;
			self.surface.render_highlight(next);
		}
	}

	pub fn on_click(&mut self, target: Option<&S::Element>) -> ClickDisposition {
		if !self.is_active() {
			return ClickDisposition::PassThrough;
		}

		let Some(element) = target else {
			warn!(target = "autoanswer", "click without a target");
			return ClickDisposition::Suppressed;
		};

		let kind = self.surface.classify(element);
		if !kind.is_selectable() {
			debug!(target = "autoanswer", ?kind, "ignoring click on non-selectable target");
			return ClickDisposition::Suppressed;
		}

		let text = normalize_capture(&self.surface.inner_text(element), self.capture_limit);
		if text.is_empty() {
			warn!(target = "autoanswer", "clicked element has no text");
			return ClickDisposition::Suppressed;
		}

		info!(target = "autoanswer", len = text.chars().count(), preview = %preview(&text, 100), "element captured");
		self.last_capture = Some(text.clone());
		self.sink.deliver(Capture { text });
		self.disable();
		ClickDisposition::Captured
	}

	pub fn on_key(&mut self, key: &str) -> KeyDisposition {
		if self.is_active() && key == CANCEL_KEY {
			debug!(target = "autoanswer", "selection cancelled by key");
			self.disable();
			return KeyDisposition::Consumed;
		}
		KeyDisposition::PassThrough
	}

	fn teardown(&mut self) {
		self.surface.detach_listeners();
		self.surface.unmount_highlight();
		self.surface.set_picking_cursor(false);
	}
}
