//! Response body rewriting.
//!
//! Bodies are dispatched on their declared content type:
//! - `text/html` gets URL rewriting and the picker script,
//! - JavaScript/TypeScript/JSX gets module import rewriting,
//! - everything else passes through untouched.
//!
//! Text is decoded as UTF-8 with invalid sequences replaced, so rewriting never
//! fails a response.

mod content_type;
mod context;
mod html;
mod inject;
mod module;

pub use content_type::ContentKind;
pub use context::{is_local_host, origin_of, RewriteContext, MOUNT_PREFIX};
pub use html::rewrite_html_urls;
pub use inject::{inject_picker_script, PICKER_JS, PICKER_MARKER, PICKER_SCRIPT};
pub use module::rewrite_module_imports;

use bytes::Bytes;
use std::borrow::Cow;
use tracing::debug;

/// Rewrite `body` according to `kind`.
///
/// Returns `None` when the body must be forwarded byte-for-byte.
pub fn rewrite_body(kind: ContentKind, body: &[u8], ctx: &RewriteContext) -> Option<Bytes> {
    let rewritten = match kind {
        ContentKind::Html => {
            let html = decode_text(body);
            inject_picker_script(&rewrite_html_urls(&html, ctx))
        }
        ContentKind::Script => rewrite_module_imports(&decode_text(body), ctx),
        ContentKind::Other => return None,
    };
    Some(Bytes::from(rewritten))
}

fn decode_text(body: &[u8]) -> Cow<'_, str> {
    let text = String::from_utf8_lossy(body);
    if let Cow::Owned(_) = text {
        debug!("Response body is not valid UTF-8; invalid sequences replaced");
    }
    text
}
