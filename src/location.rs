//! Coarse region detection through public `cdn-cgi/trace` echo endpoints.
use crate::network::ipv4_client_builder;
use log::{debug, info, warn};
use reqwest::StatusCode;
use std::time::Duration;

/// Trace endpoints tried in order until one reports a location.
pub const TRACE_URLS: [&str; 3] = [
    "https://www.qualcomm.cn/cdn-cgi/trace",
    "https://www.prologis.cn/cdn-cgi/trace",
    "https://www.autodesk.com.cn/cdn-cgi/trace",
];

/// Region used when no endpoint answers usefully.
pub const DEFAULT_REGION: &str = "US";

/// Per-endpoint request timeout.
pub const LOCATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves the caller's two-letter region code.
#[derive(Debug, Clone)]
pub struct LocationResolver {
    endpoints: Vec<String>,
    timeout: Duration,
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::with_endpoints(TRACE_URLS.iter().map(|url| (*url).to_owned()).collect())
    }
}

impl LocationResolver {
    /// A resolver over [`TRACE_URLS`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver over custom endpoints, tried in the given order.
    pub fn with_endpoints(endpoints: Vec<String>) -> Self {
        Self {
            endpoints,
            timeout: LOCATION_TIMEOUT,
        }
    }

    /// Overrides the per-endpoint timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Asks each endpoint in turn, returning the first `loc=` value seen.
    ///
    /// Never fails: when every endpoint is exhausted the result is
    /// [`DEFAULT_REGION`].
    pub async fn resolve(&self) -> String {
        let client = match ipv4_client_builder().timeout(self.timeout).build() {
            Ok(client) => client,
            Err(e) => {
                warn!("Could not build HTTP client for location probe: {}", e);
                return DEFAULT_REGION.to_owned();
            }
        };

        for url in &self.endpoints {
            info!("Probing location via {}", url);
            match self.probe_endpoint(&client, url).await {
                Some(region) => return region,
                None => continue,
            }
        }

        warn!(
            "All location probes failed. Defaulting to {}",
            DEFAULT_REGION
        );
        DEFAULT_REGION.to_owned()
    }

    async fn probe_endpoint(&self, client: &reqwest::Client, url: &str) -> Option<String> {
        let response = match client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Location probe failed: {} ({})", url, e);
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            warn!(
                "Location probe blocked: {} (status {})",
                url,
                response.status()
            );
            return None;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Location probe body unreadable: {} ({})", url, e);
                return None;
            }
        };

        let region = parse_loc(&body);
        if region.is_none() {
            debug!("No loc= line in trace from {}", url);
        }
        region
    }
}

/// Extracts the value of the first `loc=` line from a trace body.
///
/// ```rust
/// use originscan::location::parse_loc;
///
/// let body = "fl=12f\nh=www.example.com\nip=203.0.113.7\nloc=DE\ntls=TLSv1.3\n";
/// assert_eq!(parse_loc(body), Some("DE".to_owned()));
/// ```
pub fn parse_loc(body: &str) -> Option<String> {
    body.lines()
        .find_map(|line| line.strip_prefix("loc="))
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_owned)
}
