//! Shared network plumbing: IPv4-only HTTP clients and the startup connectivity check.
use log::debug;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::{io, net::TcpStream, time};

/// Desktop browser user agent sent with every request.
pub const SPOOFED_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Well-known IPv4 endpoint dialed to prove the IPv4 stack works.
pub const IPV4_PROBE_TARGET: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 443);

/// How long the connectivity check waits for the TCP handshake.
pub const PRECHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// A client builder whose connections are always made from an IPv4 socket.
///
/// Binding the local side to `0.0.0.0` keeps the resolver's AAAA answers from
/// being dialed. Certificate checks are off: we look at reachability and
/// headers, not at trust.
pub fn ipv4_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(SPOOFED_USER_AGENT)
        .local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
        .danger_accept_invalid_certs(true)
}

/// Opens and immediately drops a TCP connection to `target`.
///
/// # Example
///
/// ```compile_fail
/// check_ipv4_connectivity(IPV4_PROBE_TARGET, PRECHECK_TIMEOUT).await?;
/// ```
pub async fn check_ipv4_connectivity(target: SocketAddr, timeout: Duration) -> io::Result<()> {
    if !target.is_ipv4() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{target} is not an IPv4 address"),
        ));
    }

    let stream = time::timeout(timeout, TcpStream::connect(target)).await??;
    debug!("IPv4 connectivity check reached {}", target);
    drop(stream);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn local_listener_passes_check() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let result = check_ipv4_connectivity(addr, Duration::from_secs(1)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn closed_port_fails_check() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = check_ipv4_connectivity(addr, Duration::from_secs(1)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn ipv6_target_is_rejected() {
        let target: SocketAddr = "[::1]:443".parse().unwrap();

        let err = check_ipv4_connectivity(target, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn builder_produces_a_client() {
        assert!(ipv4_client_builder().build().is_ok());
    }
}
