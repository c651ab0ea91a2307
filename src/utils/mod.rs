//! Utility functions and helpers.

pub mod http;
pub mod url;

/// Substitute `{key}` placeholders in `template`.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{key}}}"), value)
    })
}
