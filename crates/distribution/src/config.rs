//! Distribution manager configuration

use serde::{Deserialize, Serialize};

/// Configuration for the distribution manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    /// Refuse leader views whose version is lower than the published one
    pub reject_stale_views: bool,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            reject_stale_views: true,
        }
    }
}
