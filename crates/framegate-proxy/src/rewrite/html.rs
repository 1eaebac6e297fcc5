//! URL rewriting for HTML documents.
//!
//! Rewrites are pattern based and run in a fixed order:
//! 1. absolute URLs on the target origin become mount-relative,
//! 2. remaining root-relative URLs get the mount prefix,
//! 3. inline imports of bundler virtual modules (`/@...`) get the mount prefix.
//!
//! Every step skips values that already sit under the mount prefix, so running
//! the whole pass twice yields the same document.

use super::context::RewriteContext;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// `href=`, `src=` and `action=` attributes (any case) with a single- or
/// double-quoted value.
static URL_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?P<lead>\b(?i:href|src|action)\s*=\s*)(?P<open>["'])(?P<url>[^"']*)(?P<close>["'])"#,
    )
    .expect("valid URL attribute regex")
});

/// `import ... from "/@..."` inside inline scripts.
static INLINE_FROM_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<lead>\bimport\s+.*?\s+from\s+["'])(?P<path>/@[^"']+)(?P<close>["'])"#)
        .expect("valid inline import regex")
});

/// Side-effect `import "/@..."` inside inline scripts.
static INLINE_BARE_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<lead>\bimport\s+["'])(?P<path>/@[^"']+)(?P<close>["'])"#)
        .expect("valid inline side-effect import regex")
});

/// Apply all HTML URL rewrites in order.
pub fn rewrite_html_urls(html: &str, ctx: &RewriteContext) -> String {
    let mut out = html.to_string();
    for step in [rewrite_absolute_urls, rewrite_root_relative_urls, rewrite_inline_imports] {
        if let Some(rewritten) = step(&out, ctx) {
            out = rewritten;
        }
    }
    out
}

/// Turn `http://target[:port]/path` attribute values into `/app/path`.
///
/// Returns `None` when nothing matched.
fn rewrite_absolute_urls(html: &str, ctx: &RewriteContext) -> Option<String> {
    let origin = ctx.origin();
    if origin.is_empty() || !html.contains(origin) {
        return None;
    }

    let mut changed = false;
    let out = URL_ATTRIBUTE.replace_all(html, |caps: &Captures| {
        match caps["url"].strip_prefix(origin) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                changed = true;
                format!(
                    "{}{}{}{}",
                    &caps["lead"],
                    &caps["open"],
                    ctx.mount_path(rest),
                    &caps["close"]
                )
            }
            _ => caps[0].to_string(),
        }
    });
    changed.then(|| out.into_owned())
}

/// Prefix root-relative attribute values with the mount path.
fn rewrite_root_relative_urls(html: &str, ctx: &RewriteContext) -> Option<String> {
    let mut changed = false;
    let out = URL_ATTRIBUTE.replace_all(html, |caps: &Captures| {
        let url = &caps["url"];
        if ctx.should_prefix(url) {
            changed = true;
            format!(
                "{}{}{}{}",
                &caps["lead"],
                &caps["open"],
                ctx.mount_path(url),
                &caps["close"]
            )
        } else {
            caps[0].to_string()
        }
    });
    changed.then(|| out.into_owned())
}

/// Prefix inline imports of `/@...` virtual modules (Vite's client, react-refresh).
fn rewrite_inline_imports(html: &str, ctx: &RewriteContext) -> Option<String> {
    if !html.contains("/@") {
        return None;
    }

    let mut changed = false;
    let mut out = html.to_string();
    for pattern in [&*INLINE_FROM_IMPORT, &*INLINE_BARE_IMPORT] {
        if !pattern.is_match(&out) {
            continue;
        }
        changed = true;
        out = pattern
            .replace_all(&out, |caps: &Captures| {
                format!(
                    "{}{}{}",
                    &caps["lead"],
                    ctx.mount_path(&caps["path"]),
                    &caps["close"]
                )
            })
            .into_owned();
    }
    changed.then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RewriteContext {
        RewriteContext::new("http://localhost:3000")
    }

    #[test]
    fn test_absolute_url_on_target_origin() {
        let html = r#"<a href="http://localhost:3000/about">About</a>"#;
        assert_eq!(
            rewrite_html_urls(html, &ctx()),
            r#"<a href="/app/about">About</a>"#
        );
    }

    #[test]
    fn test_absolute_url_without_path() {
        let html = r#"<a href='http://localhost:3000'>Home</a>"#;
        assert_eq!(rewrite_html_urls(html, &ctx()), r#"<a href='/app'>Home</a>"#);
    }

    #[test]
    fn test_absolute_url_on_other_origin_untouched() {
        let html = r#"<script src="https://cdn.example.com/lib.js"></script>"#;
        assert_eq!(rewrite_html_urls(html, &ctx()), html);
    }

    #[test]
    fn test_origin_must_match_exactly() {
        // Same host, different port.
        let html = r#"<img src="http://localhost:30001/logo.png">"#;
        assert_eq!(rewrite_html_urls(html, &ctx()), html);
    }

    #[test]
    fn test_origin_match_is_case_sensitive() {
        let html = r#"<a href="HTTP://LOCALHOST:3000/x">x</a>"#;
        assert_eq!(rewrite_html_urls(html, &ctx()), html);
    }

    #[test]
    fn test_root_relative_attributes() {
        let html = r#"<link href="/style.css"><script src="/main.js"></script><form action="/login"></form>"#;
        assert_eq!(
            rewrite_html_urls(html, &ctx()),
            r#"<link href="/app/style.css"><script src="/app/main.js"></script><form action="/app/login"></form>"#
        );
    }

    #[test]
    fn test_attribute_names_match_any_case() {
        let html = r#"<a HREF="/x">x</a><img Src='http://localhost:3000/i.png'>"#;
        assert_eq!(
            rewrite_html_urls(html, &ctx()),
            r#"<a HREF="/app/x">x</a><img Src='/app/i.png'>"#
        );
    }

    #[test]
    fn test_relative_and_protocol_relative_untouched() {
        let html = r#"<img src="logo.png"><img src="./a.png"><script src="//cdn.example.com/x.js"></script>"#;
        assert_eq!(rewrite_html_urls(html, &ctx()), html);
    }

    #[test]
    fn test_no_double_prefix_after_absolute_rewrite() {
        let html = r#"<a href="http://localhost:3000/docs">Docs</a>"#;
        let once = rewrite_html_urls(html, &ctx());
        assert_eq!(once, r#"<a href="/app/docs">Docs</a>"#);
        assert!(!once.contains("/app/app"));
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let html = r#"<html><head>
<script type="module" src="/@vite/client"></script>
<script type="module">import RefreshRuntime from "/@react-refresh"; import "/@vite/env";</script>
<link rel="icon" href="http://localhost:3000/favicon.ico">
</head><body><a href="/">home</a><a href="/app">mounted</a><form action='/submit'></form></body></html>"#;
        let once = rewrite_html_urls(html, &ctx());
        let twice = rewrite_html_urls(&once, &ctx());
        assert_eq!(once, twice);
        assert!(!twice.contains("/app/app"));
    }

    #[test]
    fn test_inline_module_imports() {
        let html = r#"<script type="module">
import RefreshRuntime from "/@react-refresh"
import "/@vite/client"
import App from "/src/App.tsx"
</script>"#;
        let out = rewrite_html_urls(html, &ctx());
        assert!(out.contains(r#"import RefreshRuntime from "/app/@react-refresh""#));
        assert!(out.contains(r#"import "/app/@vite/client""#));
        // Only `/@` virtual modules are touched inside inline scripts.
        assert!(out.contains(r#"import App from "/src/App.tsx""#));
    }

    #[test]
    fn test_quote_style_is_preserved() {
        let html = "<img src='/a.png'>";
        assert_eq!(rewrite_html_urls(html, &ctx()), "<img src='/app/a.png'>");
    }

    #[test]
    fn test_target_with_path_uses_origin() {
        let ctx = RewriteContext::new("http://localhost:3000/base");
        let html = r#"<a href="http://localhost:3000/other">x</a>"#;
        assert_eq!(rewrite_html_urls(html, &ctx), r#"<a href="/app/other">x</a>"#);
    }
}
