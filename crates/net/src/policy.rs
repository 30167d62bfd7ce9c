use std::env;
use url::Url;

/// Which URLs the host is allowed to fetch.
///
/// `file:` and loopback `http` are always reachable; anything else needs
/// `relaxed`.
#[derive(Clone, Debug, Default)]
pub struct NetPolicy {
    /// Allow `http(s)` requests to non-loopback hosts.
    pub relaxed: bool,
    /// Value sent as the `User-Agent` header, if any.
    pub user_agent: Option<String>,
}

impl NetPolicy {
    /// Build a policy explicitly.
    #[inline]
    #[must_use]
    pub const fn new(relaxed: bool, user_agent: Option<String>) -> Self {
        Self {
            relaxed,
            user_agent,
        }
    }

    /// Load the policy from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `VALOR_NET_RELAXED`: `1` or `true` to allow remote hosts (default: disabled)
    /// - `VALOR_USER_AGENT`: User-Agent header for http requests (default: none)
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        let relaxed = env::var("VALOR_NET_RELAXED")
            .ok()
            .is_some_and(|val| val == "1" || val.eq_ignore_ascii_case("true"));
        let user_agent = env::var("VALOR_USER_AGENT")
            .ok()
            .filter(|agent| !agent.trim().is_empty());
        Self {
            relaxed,
            user_agent,
        }
    }

    /// Whether `url` may be fetched under this policy.
    pub fn allows(&self, url: &Url) -> bool {
        match url.scheme() {
            "file" => true,
            "http" | "https" => {
                self.relaxed
                    || url.host_str().is_some_and(|host| {
                        host.eq_ignore_ascii_case("localhost") || host == "127.0.0.1" || host == "[::1]"
                    })
            }
            _ => false,
        }
    }
}
