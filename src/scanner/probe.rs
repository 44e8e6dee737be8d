//! Single-host probing: one HEAD request over HTTP, one retry over HTTPS.
use crate::network::ipv4_client_builder;
use log::debug;
use reqwest::{header::SERVER, redirect::Policy, Client};
use std::future::Future;
use std::time::{Duration, Instant};

/// Per-attempt timeout for probe requests.
pub const NETWORK_TIMEOUT: Duration = Duration::from_secs(3);

/// What a reachable host told us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Time from sending the successful request to receiving its response.
    pub latency: Duration,
    /// Value of the `Server` response header, empty when absent.
    pub server: String,
}

/// Something that can find out whether a domain answers, and how fast.
///
/// `None` means the host could not be reached; it is not an error.
pub trait Probe: Send + Sync + 'static {
    /// Probes `domain` once, fallbacks included.
    fn probe(&self, domain: &str) -> impl Future<Output = Option<ProbeOutcome>> + Send;
}

/// Probes over real HTTP(S) with a fresh client per call.
#[derive(Debug, Clone)]
pub struct HttpProber {
    timeout: Duration,
}

impl Default for HttpProber {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpProber {
    /// A prober using [`NETWORK_TIMEOUT`].
    pub const fn new() -> Self {
        Self {
            timeout: NETWORK_TIMEOUT,
        }
    }

    /// Same prober with a different per-attempt timeout.
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn client(&self) -> reqwest::Result<Client> {
        ipv4_client_builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .pool_max_idle_per_host(1)
            .redirect(Policy::none())
            .build()
    }

    /// Sends one HEAD request and times it.
    ///
    /// Any HTTP response counts, whatever its status code: a redirect or an
    /// error page still came from the host.
    async fn attempt(&self, client: &Client, url: &str) -> reqwest::Result<ProbeOutcome> {
        let started = Instant::now();
        let response = client.head(url).send().await?;
        let latency = started.elapsed();

        let server = response
            .headers()
            .get(SERVER)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .unwrap_or_default();

        Ok(ProbeOutcome { latency, server })
    }
}

impl Probe for HttpProber {
    async fn probe(&self, domain: &str) -> Option<ProbeOutcome> {
        let client = match self.client() {
            Ok(client) => client,
            Err(e) => {
                debug!("Could not build HTTP client for {}: {}", domain, e);
                return None;
            }
        };

        let plain = format!("http://{domain}");
        match self.attempt(&client, &plain).await {
            Ok(outcome) => return Some(outcome),
            Err(e) => debug!("HTTP probe of {} failed, trying HTTPS: {}", domain, e),
        }

        let secure = format!("https://{domain}");
        match self.attempt(&client, &secure).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                debug!("HTTPS probe of {} failed: {}", domain, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpProber, Probe, NETWORK_TIMEOUT};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned response to every connection.
    async fn serve(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 2048];
                    let _ = stream.read(&mut buf).await;
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });
        addr.to_string()
    }

    #[test]
    fn default_timeout_is_three_seconds() {
        assert_eq!(NETWORK_TIMEOUT, Duration::from_secs(3));
        assert_eq!(HttpProber::default().timeout, NETWORK_TIMEOUT);
    }

    #[tokio::test]
    async fn reads_server_header_from_http() {
        let host = serve("HTTP/1.1 200 OK\r\nServer: nginx/1.24.0\r\nContent-Length: 0\r\n\r\n").await;

        let outcome = HttpProber::new().probe(&host).await.unwrap();
        assert_eq!(outcome.server, "nginx/1.24.0");
        assert!(outcome.latency < NETWORK_TIMEOUT);
    }

    #[tokio::test]
    async fn missing_server_header_is_empty() {
        let host = serve("HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n").await;

        let outcome = HttpProber::new().probe(&host).await.unwrap();
        assert_eq!(outcome.server, "");
    }

    #[tokio::test]
    async fn redirect_counts_as_reachable() {
        let host = serve(
            "HTTP/1.1 301 Moved Permanently\r\nLocation: https://example.invalid/\r\nServer: Apache\r\nContent-Length: 0\r\n\r\n",
        )
        .await;

        let outcome = HttpProber::new().probe(&host).await.unwrap();
        assert_eq!(outcome.server, "Apache");
    }
}
