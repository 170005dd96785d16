//! Status-page markup builders shared by unit tests.

use serde_json::{json, Value};

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) fn incident(code: &str, impact: &str, timestamp: &str) -> Value {
    json!({
        "code": code,
        "name": format!("Incident {code}"),
        "impact": impact,
        "timestamp": timestamp,
    })
}

pub(crate) fn month(year: i32, incidents: Vec<Value>) -> Value {
    json!({ "name": "June", "year": year, "incidents": incidents })
}

pub(crate) fn history_page(months: Value, components: Value) -> String {
    let props = json!({ "months": months, "components": components }).to_string();
    format!(
        "<html><body><div data-react-class=\"HistoryIndex\" data-react-props=\"{}\"></div></body></html>",
        escape(&props)
    )
}

pub(crate) fn empty_history_page() -> String {
    history_page(json!([month(2019, vec![])]), json!([]))
}

pub(crate) fn detail_page(affected: Option<&str>, updates: &[&str]) -> String {
    let affected = affected
        .map(|text| {
            format!(
                "<div class=\"components-affected font-small color-secondary border-color\">{}</div>",
                escape(text)
            )
        })
        .unwrap_or_default();
    let updates: String = updates
        .iter()
        .map(|text| format!("<div class=\"update-body font-regular\">{}</div>", escape(text)))
        .collect();
    format!("<html><body>{updates}{affected}</body></html>")
}
