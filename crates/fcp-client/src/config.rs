//! Configuration for the high-level client

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::retry::BackoffPolicy;

/// Default bound on redirect hops followed by a single fetch
pub const DEFAULT_MAX_REDIRECTS: u32 = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Delays used while no node is reachable
    pub backoff: BackoffPolicy,

    /// Redirect hops a fetch follows before failing
    pub max_redirects: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backoff: BackoffPolicy::default(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            backoff: BackoffPolicy::from_env()?,
            max_redirects: std::env::var("FCP_MAX_REDIRECTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_REDIRECTS),
        })
    }
}
