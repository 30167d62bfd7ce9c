//! Configuration settings for the document host.
//!
//! Configuration can be loaded from environment variables or constructed
//! programmatically.

use net::NetPolicy;
use std::env;

/// Runtime configuration shared by all documents of a `Host`.
#[derive(Clone, Debug)]
pub struct HostConfig {
    /// Network policy applied to script and stylesheet fetches
    pub net: NetPolicy,
    /// Whether fetched scripts are executed; `load` fires either way
    pub scripts_enabled: bool,
}

impl HostConfig {
    /// Construct a new `HostConfig` with explicit values.
    #[inline]
    #[must_use]
    pub const fn new(net: NetPolicy, scripts_enabled: bool) -> Self {
        Self {
            net,
            scripts_enabled,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `VALOR_NET_RELAXED`: `1`/`true` to allow remote http hosts (default: disabled)
    /// - `VALOR_USER_AGENT`: User-Agent for http fetches (default: none)
    /// - `VALOR_SCRIPTS`: Set to "0" to skip script execution (default: enabled)
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        let scripts_enabled = env::var("VALOR_SCRIPTS").ok().as_deref() != Some("0");
        Self {
            net: NetPolicy::from_env(),
            scripts_enabled,
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::new(NetPolicy::default(), true)
    }
}
