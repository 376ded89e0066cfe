// Rendering module.
// Turns commit sequences into HTML cards and writes them into a mount point.

pub mod cards;
pub mod document;
pub mod time;

pub use cards::{CardStyle, escape_html, render_card, render_cards};
pub use document::{HtmlDocument, RenderTarget};
pub use time::format_relative_time;

/// Id of the element commit cards are mounted into.
pub const COMMITS_LIST_ID: &str = "commits-list";
