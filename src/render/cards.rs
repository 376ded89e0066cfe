// Commit card markup.
// One card per commit, in input order, with author, message, and relative time.

use chrono::{DateTime, Utc};

use super::time::format_relative_time;
use crate::api::{ApiLayout, Commit};

/// Markup flavour of a card, following the stylesheet the deployment ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardStyle {
    /// Plain shadowed box.
    Plain,
    /// Material card inside a grid row.
    #[default]
    Material,
}

impl From<ApiLayout> for CardStyle {
    fn from(layout: ApiLayout) -> Self {
        match layout {
            ApiLayout::Legacy => CardStyle::Plain,
            ApiLayout::V1 => CardStyle::Material,
        }
    }
}

/// Render the markup for a whole commit sequence.
pub fn render_cards(commits: &[Commit], style: CardStyle, now: &DateTime<Utc>) -> String {
    commits
        .iter()
        .map(|commit| render_card(commit, style, now))
        .collect()
}

/// Render the markup for one commit.
pub fn render_card(commit: &Commit, style: CardStyle, now: &DateTime<Utc>) -> String {
    let author = escape_html(&commit.author);
    let message = escape_html(&commit.message);
    let when = commit
        .timestamp()
        .map(|dt| format_relative_time(&dt, now))
        .unwrap_or_else(|| "unknown date".to_string());

    match style {
        CardStyle::Plain => format!(
            r#"
<div class="bg-white shadow p-4 mb-4 rounded">
  <h2 class="text-lg font-bold">{author}</h2>
  <p class="text-gray-600">{message}</p>
  <p class="text-sm text-gray-500">{when}</p>
</div>
"#
        ),
        CardStyle::Material => format!(
            r#"
<div class="row">
  <div class="col s12 m6">
    <div class="card blue-grey darken-1">
      <div class="card-content white-text">
        <span class="card-title">{author}</span>
        <p>{message}</p>
      </div>
      <div class="card-action">
        <div class="text-sm text-gray-500">{when}</div>
      </div>
    </div>
  </div>
</div>
"#
        ),
    }
}

/// Escape text for use inside HTML element content or quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
