//! CORS settings for the configuration endpoints.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CorsConfig {
    /// Value sent as `Access-Control-Allow-Origin`
    #[serde(default = "default_allow_origin")]
    pub allow_origin: String,
}

fn default_allow_origin() -> String {
    "*".to_string()
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: default_allow_origin(),
        }
    }
}
