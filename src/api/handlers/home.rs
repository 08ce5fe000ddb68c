use crate::AppState;
use crate::commands::version::VERSION;
use axum::{extract::State, response::Html};

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(state.storage.bucket(), VERSION))
}

/// Fills the page shell. Values are HTML-escaped.
pub fn render_index(bucket: &str, version: &str) -> String {
    INDEX_TEMPLATE
        .replace("{{bucket}}", &escape_html(bucket))
        .replace("{{version}}", &escape_html(version))
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
