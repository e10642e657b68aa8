//! Help output colors for `aa`, in the cargo palette.

use clap::builder::Styles;
use clap::builder::styling::AnsiColor;

/// Headers and usage green and bold, command text and placeholders cyan,
/// parse errors red.
pub fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default().bold())
		.usage(AnsiColor::Green.on_default().bold())
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Cyan.on_default())
		.valid(AnsiColor::Cyan.on_default())
		.invalid(AnsiColor::Yellow.on_default().bold())
		.error(AnsiColor::Red.on_default().bold())
}
