//! Text normalization for captured element content.
//!
//! All lengths are counted in `char`s, never bytes, so captures in any script
//! are cut on character boundaries.

/// Default maximum length of a captured text, marker included.
pub const CAPTURE_LIMIT: usize = 2000;

/// Appended to text that was cut short.
pub const TRUNCATION_MARKER: &str = "...";

/// Trims the text and collapses every whitespace run into a single space.
pub fn collapse_whitespace(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());
	for word in raw.split_whitespace() {
		if !out.is_empty() {
			out.push(' ');
		}
		out.push_str(word);
	}
	out
}

/// Caps `text` at `limit` chars, replacing the tail with [`TRUNCATION_MARKER`].
///
/// The result never exceeds `limit` chars.
pub fn cap_length(text: String, limit: usize) -> String {
	if text.chars().count() <= limit {
		return text;
	}

	let marker_len = TRUNCATION_MARKER.chars().count();
	if limit <= marker_len {
		return text.chars().take(limit).collect();
	}

	let mut out: String = text.chars().take(limit - marker_len).collect();
	let kept = out.trim_end().len();
	out.truncate(kept);
	out.push_str(TRUNCATION_MARKER);
	out
}

/// Full capture pipeline: whitespace normalization followed by the length cap.
pub fn normalize_capture(raw: &str, limit: usize) -> String {
	cap_length(collapse_whitespace(raw), limit)
}

/// Returns the first `max` chars of `text` and whether anything was cut.
pub fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
	match text.char_indices().nth(max) {
		Some((idx, _)) => (&text[..idx], true),
		None => (text, false),
	}
}

/// Short single-line preview, `max` chars followed by the marker when cut.
pub fn preview(text: &str, max: usize) -> String {
	let (head, cut) = truncate_chars(text, max);
	if cut {
		format!("{head}{TRUNCATION_MARKER}")
	} else {
		head.to_string()
	}
}
