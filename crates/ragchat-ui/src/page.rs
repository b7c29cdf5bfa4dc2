//! The embedded chat page shell.
//!
//! Header, side panel, styles, and the client script are static. The
//! `{{main}}` marker is replaced with the rendered main area on every
//! full-page request; afterwards the script swaps the main area in place
//! using `GET /ui/transcript`.

/// The complete page shell with all CSS and JavaScript inlined.
pub const PAGE_SHELL: &str = include_str!("../assets/chat.html");

/// Placeholder the rendered main area is substituted for.
pub const MAIN_MARKER: &str = "{{main}}";
