//! Text rendering of the form state: source badge, formatted view, raw JSON view.

use serde_json::Value;

use crate::client::session::{FormState, ViewMode};
use crate::extraction::{ExtractionResult, Source};

const NONE_PLACEHOLDER: &str = "– None –";

pub fn source_badge(source: Source) -> &'static str {
    match source {
        Source::Ai => "[AI Generated]",
        Source::Fallback => "[Fallback Demo]",
    }
}

pub fn render_pretty(result: &ExtractionResult) -> String {
    let mut out = String::new();
    if !result.app_name.is_empty() {
        out.push_str("App Name\n");
        out.push_str(&format!("  {}\n", result.app_name));
    }
    for (label, items) in [
        ("Entities", &result.entities),
        ("Roles", &result.roles),
        ("Features", &result.features),
    ] {
        out.push_str(label);
        out.push('\n');
        out.push_str("  ");
        out.push_str(&chips(items));
        out.push('\n');
    }
    out
}

pub fn render_raw(raw: &Value) -> String {
    serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string())
}

/// Full screen text for the current state and view.
pub fn render_state(state: &FormState, view: ViewMode) -> String {
    match state {
        FormState::Idle => "No result yet\n".to_string(),
        FormState::Submitting => "Extracting...\n".to_string(),
        FormState::Errored(message) => format!("Error: {message}\n"),
        FormState::Rendered(received) => {
            let body = match view {
                ViewMode::Pretty => render_pretty(&received.result),
                ViewMode::Json => format!("{}\n", render_raw(&received.raw)),
            };
            format!(
                "Source: {}\nView: {}\n\n{body}",
                source_badge(received.result.source),
                view.label()
            )
        }
    }
}

fn chips(items: &[String]) -> String {
    if items.is_empty() {
        return NONE_PLACEHOLDER.to_string();
    }
    items
        .iter()
        .map(|item| format!("[{item}]"))
        .collect::<Vec<_>>()
        .join(" ")
}
