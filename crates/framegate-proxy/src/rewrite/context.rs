//! Per-response rewrite context.

/// Path prefix under which every proxied request is served.
pub const MOUNT_PREFIX: &str = "/app";

/// Everything the rewriters need to know about the current upstream.
///
/// Built fresh for each proxied response from the configured target and
/// dropped once the response has been emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteContext {
    origin: String,
    mount: &'static str,
}

impl RewriteContext {
    /// Build a context for `target`, an absolute base URL without trailing slash.
    pub fn new(target: &str) -> Self {
        Self {
            origin: origin_of(target).to_string(),
            mount: MOUNT_PREFIX,
        }
    }

    /// Literal `scheme://host[:port]` of the target, as configured.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Host part of the origin, without scheme or port.
    pub fn host(&self) -> &str {
        let authority = self
            .origin
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.origin);
        // Drop userinfo, then the port (IPv6 literals keep their brackets).
        let authority = authority.rsplit('@').next().unwrap_or(authority);
        if authority.starts_with('[') {
            match authority.find(']') {
                Some(end) => &authority[..=end],
                None => authority,
            }
        } else {
            authority.split(':').next().unwrap_or(authority)
        }
    }

    /// True when the target is a loopback development host.
    pub fn targets_local_host(&self) -> bool {
        is_local_host(self.host())
    }

    /// True when `path` already lives under the mount prefix.
    pub fn is_mounted(&self, path: &str) -> bool {
        match path.strip_prefix(self.mount) {
            Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
            None => false,
        }
    }

    /// Whether a URL is root-relative and still needs the mount prefix.
    ///
    /// Protocol-relative URLs (`//host/...`) point at another host and are
    /// never prefixed.
    pub fn should_prefix(&self, url: &str) -> bool {
        url.starts_with('/') && !url.starts_with("//") && !self.is_mounted(url)
    }

    /// Join the mount prefix with a root-relative path (or nothing).
    pub fn mount_path(&self, path: &str) -> String {
        let mut out = String::with_capacity(self.mount.len() + path.len());
        out.push_str(self.mount);
        out.push_str(path);
        out
    }
}

/// Cut a base URL down to its literal `scheme://authority` prefix.
pub fn origin_of(target: &str) -> &str {
    match target.find("://") {
        Some(idx) => {
            let authority_start = idx + 3;
            let end = target[authority_start..]
                .find(|c: char| matches!(c, '/' | '?' | '#'))
                .map(|offset| authority_start + offset)
                .unwrap_or(target.len());
            &target[..end]
        }
        None => target,
    }
}

pub fn is_local_host(host: &str) -> bool {
    host.eq_ignore_ascii_case("localhost") || host == "127.0.0.1"
}
