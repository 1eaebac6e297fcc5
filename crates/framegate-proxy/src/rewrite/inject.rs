//! Injection of the instrumentation script into proxied HTML.

use once_cell::sync::Lazy;
use regex::Regex;

/// Browser-side fetch/XHR rewriter and element picker.
pub const PICKER_JS: &str = include_str!("../../assets/picker.js");

/// Attribute marking the injected block; a document carrying it is left alone.
pub const PICKER_MARKER: &str = "data-framegate-picker";

/// The complete `<script>` block inserted into every HTML response.
pub static PICKER_SCRIPT: Lazy<String> =
    Lazy::new(|| format!("\n<script {PICKER_MARKER}>\n{PICKER_JS}</script>\n"));

static BODY_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</body\s*>").expect("valid closing body regex"));

/// Insert the picker script right before the last `</body>`, or append it
/// when the document has no closing body tag.
pub fn inject_picker_script(html: &str) -> String {
    if html.contains(PICKER_MARKER) {
        return html.to_string();
    }

    let script = PICKER_SCRIPT.as_str();
    let mut out = String::with_capacity(html.len() + script.len());
    match BODY_CLOSE.find_iter(html).last() {
        Some(body_close) => {
            out.push_str(&html[..body_close.start()]);
            out.push_str(script);
            out.push_str(&html[body_close.start()..]);
        }
        None => {
            out.push_str(html);
            out.push_str(script);
        }
    }
    out
}
