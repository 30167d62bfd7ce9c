use crate::policy::NetPolicy;
use bytes::Bytes;
use log::{debug, info, warn};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::ErrorKind;
use url::Url;

/// A successfully fetched resource body.
#[derive(Clone, Debug)]
pub struct FetchedResource {
    /// Final URL (after redirects for http).
    pub url: Url,
    /// HTTP status; `200` for file reads.
    pub status: u16,
    /// `Content-Type` header when the server sent one.
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchedResource {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Why a fetch produced no resource.
#[derive(Debug)]
pub enum FetchError {
    /// The URL is outside the host network policy.
    Disallowed(Url),
    /// The URL scheme is not fetchable.
    UnsupportedScheme(String),
    /// A `file:` URL that does not exist.
    NotFound(Url),
    /// The server answered with a non-success status.
    Status(u16),
    /// Transport or I/O failure.
    Network(String),
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Disallowed(url) => write!(f, "disallowed by policy: {url}"),
            Self::UnsupportedScheme(scheme) => write!(f, "unsupported scheme: {scheme}"),
            Self::NotFound(url) => write!(f, "not found: {url}"),
            Self::Status(code) => write!(f, "http status {code}"),
            Self::Network(message) => write!(f, "network error: {message}"),
        }
    }
}

impl Error for FetchError {}

/// Fetches script and stylesheet bodies for the host.
#[derive(Clone, Debug)]
pub struct NetClient {
    client: Client,
    policy: NetPolicy,
}

impl NetClient {
    /// Create a client enforcing `policy`.
    pub fn new(policy: NetPolicy) -> Self {
        Self {
            client: Client::new(),
            policy,
        }
    }

    /// The policy this client enforces.
    pub const fn policy(&self) -> &NetPolicy {
        &self.policy
    }

    /// Fetch `url` according to its scheme.
    ///
    /// # Errors
    /// Returns a `FetchError` when the URL is not allowed, missing, or the
    /// transfer fails.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedResource, FetchError> {
        if !matches!(url.scheme(), "file" | "http" | "https") {
            return Err(FetchError::UnsupportedScheme(url.scheme().to_owned()));
        }
        if !self.policy.allows(url) {
            warn!("NetClient: blocked {url}");
            return Err(FetchError::Disallowed(url.clone()));
        }
        debug!("NetClient: fetching {url}");
        let result = if url.scheme() == "file" {
            fetch_file(url).await
        } else {
            self.fetch_http(url).await
        };
        match &result {
            Ok(resource) => info!(
                "NetClient: fetched {} ({} bytes, status {})",
                resource.url,
                resource.body.len(),
                resource.status
            ),
            Err(err) => warn!("NetClient: failed to fetch {url}: {err}"),
        }
        result
    }

    async fn fetch_http(&self, url: &Url) -> Result<FetchedResource, FetchError> {
        let mut req = self.client.get(url.clone());
        if let Some(agent) = &self.policy.user_agent {
            req = req.header(USER_AGENT, agent);
        }
        let resp = req
            .send()
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?;
        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            return Err(FetchError::Status(status));
        }
        let final_url = resp.url().clone();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = resp
            .bytes()
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?;
        Ok(FetchedResource {
            url: final_url,
            status,
            content_type,
            body,
        })
    }
}

impl Default for NetClient {
    fn default() -> Self {
        Self::new(NetPolicy::default())
    }
}

async fn fetch_file(url: &Url) -> Result<FetchedResource, FetchError> {
    let path = url
        .to_file_path()
        .map_err(|()| FetchError::Network(format!("invalid file path: {url}")))?;
    let data = tokio::fs::read(&path).await.map_err(|err| {
        if err.kind() == ErrorKind::NotFound {
            FetchError::NotFound(url.clone())
        } else {
            FetchError::Network(format!("file read error: {err}"))
        }
    })?;
    Ok(FetchedResource {
        url: url.clone(),
        status: 200,
        content_type: None,
        body: Bytes::from(data),
    })
}
