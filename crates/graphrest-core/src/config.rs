//! Configuration file loading for graphrest.
//!
//! Reads `graphrest.json` and provides typed access to hydration settings.
//! Falls back to defaults when the config file is missing or incomplete.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Hydration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydrateConfig {
    /// Require `self` URIs to end in `/node/<id>` or `/relationship/<id>`.
    #[serde(default = "default_true")]
    pub strict_uris: bool,
    /// Maximum nesting of lists and map literals.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Pass through mappings that match no entity shape instead of rejecting them.
    #[serde(default = "default_true")]
    pub allow_map_literals: bool,
}

fn default_true() -> bool {
    true
}
fn default_max_depth() -> usize {
    64
}

impl Default for HydrateConfig {
    fn default() -> Self {
        Self {
            strict_uris: true,
            max_depth: default_max_depth(),
            allow_map_literals: true,
        }
    }
}

impl HydrateConfig {
    pub const FILE_NAME: &'static str = "graphrest.json";

    /// Load configuration from `graphrest.json` inside the given directory.
    /// Returns defaults if the file doesn't exist or can't be parsed.
    pub fn load(dir: &Path) -> Self {
        let config_path = dir.join(Self::FILE_NAME);
        let content = match std::fs::read_to_string(&config_path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&content) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(
                    path = %config_path.display(),
                    error = %e,
                    "failed to parse config, using defaults"
                );
                Self::default()
            }
        }
    }
}
