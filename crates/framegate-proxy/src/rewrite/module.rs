//! Import rewriting for JavaScript, TypeScript and JSX modules.
//!
//! Only root-relative specifiers are touched. Relative (`./x.js`) and absolute
//! (`https://...`) specifiers already resolve correctly from the mounted page.

use super::context::RewriteContext;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// The import/export clause may span lines but never crosses a `;`, which
// keeps a match from running across statement boundaries.

/// `import x from "/path"`, `import { a,\n b } from "/path"`
static STATIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<lead>\bimport\b[^;]*?\bfrom\s*["'])(?P<path>/[^"']+)(?P<close>["'])"#)
        .expect("valid static import regex")
});

/// `import "/path"`
static SIDE_EFFECT_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<lead>\bimport\s*["'])(?P<path>/[^"']+)(?P<close>["'])"#)
        .expect("valid side-effect import regex")
});

/// `import("/path")`
static DYNAMIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<lead>\bimport\s*\(\s*["'])(?P<path>/[^"']+)(?P<close>["'])"#)
        .expect("valid dynamic import regex")
});

/// `new URL("/path", import.meta.url)`
static ASSET_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<lead>\bnew\s+URL\s*\(\s*["'])(?P<path>/[^"']+)(?P<close>["'])"#)
        .expect("valid asset URL regex")
});

/// `export { a } from "/path"`, `export * from "/path"`
static RE_EXPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<lead>\bexport\b[^;]*?\bfrom\s*["'])(?P<path>/[^"']+)(?P<close>["'])"#)
        .expect("valid re-export regex")
});

/// Prefix every root-relative module specifier with the mount path.
pub fn rewrite_module_imports(source: &str, ctx: &RewriteContext) -> String {
    let mut out = source.to_string();
    for pattern in [
        &*STATIC_IMPORT,
        &*SIDE_EFFECT_IMPORT,
        &*DYNAMIC_IMPORT,
        &*ASSET_URL,
        &*RE_EXPORT,
    ] {
        if let Some(rewritten) = prefix_specifiers(pattern, &out, ctx) {
            out = rewritten;
        }
    }
    out
}

fn prefix_specifiers(pattern: &Regex, source: &str, ctx: &RewriteContext) -> Option<String> {
    let mut changed = false;
    let out = pattern.replace_all(source, |caps: &Captures| {
        let path = &caps["path"];
        if ctx.should_prefix(path) {
            changed = true;
            format!("{}{}{}", &caps["lead"], ctx.mount_path(path), &caps["close"])
        } else {
            caps[0].to_string()
        }
    });
    changed.then(|| out.into_owned())
}
