//! The single process-wide proxy target.
//!
//! `TargetStore` is injected into the dispatcher and the configuration
//! endpoint. Reads take a brief shared lock to clone an `Arc<str>`; nothing
//! holds the lock across an upstream call.

mod persistence;

pub use persistence::{
    JsonFilePersistence, NoOpPersistence, PersistError, TargetPersistence, TargetRecord,
};

use crate::metrics;
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

pub struct TargetStore {
    current: RwLock<Option<Arc<str>>>,
    persistence: Arc<dyn TargetPersistence>,
}

impl TargetStore {
    /// Create an empty store backed by `persistence` without reading it.
    pub fn new(persistence: Arc<dyn TargetPersistence>) -> Self {
        metrics::set_target_configured(false);
        Self {
            current: RwLock::new(None),
            persistence,
        }
    }

    /// Create a store initialised from `persistence`.
    ///
    /// `fallback` seeds the store only when no record has ever been written;
    /// a persisted empty target stays empty. The seed itself is not persisted.
    /// A load failure is logged and the store starts unset.
    pub fn load(persistence: Arc<dyn TargetPersistence>, fallback: Option<&str>) -> Self {
        let initial = match persistence.load() {
            Ok(Some(record)) => {
                let target = record.target_url.and_then(|t| normalize_target(&t));
                if let Some(ref target) = target {
                    info!("Loaded proxy target {} ({})", target, persistence.name());
                }
                target
            }
            Ok(None) => {
                let target = fallback.and_then(normalize_target);
                if let Some(ref target) = target {
                    info!("No persisted target, using initial target {}", target);
                }
                target
            }
            Err(e) => {
                warn!("Failed to load persisted target, starting unset: {}", e);
                None
            }
        };

        metrics::set_target_configured(initial.is_some());

        Self {
            current: RwLock::new(initial.map(Arc::from)),
            persistence,
        }
    }

    /// Current target, if any.
    pub fn get(&self) -> Option<Arc<str>> {
        self.current.read().clone()
    }

    /// Replace the target. `None` or a blank value clears it.
    ///
    /// The new value takes effect immediately; persistence is best-effort and
    /// a failure is only logged. Returns the stored value.
    pub fn set(&self, target: Option<&str>) -> Option<Arc<str>> {
        let next: Option<Arc<str>> = target.and_then(normalize_target).map(Arc::from);

        *self.current.write() = next.clone();
        metrics::set_target_configured(next.is_some());

        match next.as_deref() {
            Some(target) => info!("Proxy target set to {}", target),
            None => info!("Proxy target cleared"),
        }

        if let Err(e) = self.persistence.save(next.as_deref()) {
            warn!("Failed to persist proxy target: {}", e);
        }

        next
    }
}

/// Trim surrounding whitespace and trailing slashes. Blank input means "unset".
pub fn normalize_target(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Error)]
pub enum InvalidTarget {
    #[error("invalid target URL '{url}': {source}")]
    Parse {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("target URL '{0}' must use http or https")]
    Scheme(String),

    #[error("target URL '{0}' has no host")]
    NoHost(String),
}

/// Check that `target` is an absolute `http`/`https` URL with a host.
pub fn validate_target_url(target: &str) -> Result<(), InvalidTarget> {
    let parsed = Url::parse(target).map_err(|source| InvalidTarget::Parse {
        url: target.to_string(),
        source,
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(InvalidTarget::Scheme(target.to_string()));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(InvalidTarget::NoHost(target.to_string()));
    }
    Ok(())
}
