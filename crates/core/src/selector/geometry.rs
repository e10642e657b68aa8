//! Highlight geometry in viewport coordinates.

/// Bounding rectangle of an element, as reported by `getBoundingClientRect`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
	pub top: f64,
	pub left: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
		Self { top, left, width, height }
	}

	/// True when the rectangle covers no area and must never be highlighted.
	pub fn is_empty(&self) -> bool {
		!(self.width > 0.0 && self.height > 0.0)
	}
}

/// What the highlight box currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Highlight {
	#[default]
	Hidden,
	Shown(Rect),
}

impl Highlight {
	/// Highlight for `rect`, hidden when the rectangle is empty.
	pub fn around(rect: Rect) -> Self {
		if rect.is_empty() { Highlight::Hidden } else { Highlight::Shown(rect) }
	}

	pub fn is_visible(&self) -> bool {
		matches!(self, Highlight::Shown(_))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_sized_rects_are_empty() {
		assert!(Rect::new(10.0, 10.0, 0.0, 50.0).is_empty());
		assert!(Rect::new(10.0, 10.0, 100.0, 0.0).is_empty());
		assert!(Rect::new(0.0, 0.0, f64::NAN, 10.0).is_empty());
		assert!(!Rect::new(0.0, 0.0, 100.0, 50.0).is_empty());
	}

	#[test]
	fn highlight_hides_empty_rects() {
		assert_eq!(Highlight::around(Rect::new(5.0, 5.0, 0.0, 0.0)), Highlight::Hidden);
		assert!(Highlight::around(Rect::new(5.0, 5.0, 1.0, 1.0)).is_visible());
	}
}
