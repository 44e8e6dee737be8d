//! Heuristic classification of a host from its `Server` response header.
//!
//! The classifier answers a single question: does the header look like it was
//! written by the backend web server itself, or by an edge network sitting in
//! front of it? Matching is a case-insensitive substring search.
//!
//! Edge signatures are checked first and shadow everything else, so a header
//! such as `nginx (cloudflare)` is treated as CDN-fronted.
//!
//! ```rust
//! use originscan::classifier::is_origin_server;
//!
//! assert!(is_origin_server("nginx/1.24.0"));
//! assert!(!is_origin_server("cloudflare"));
//! assert!(is_origin_server(""));
//! ```

/// Substrings identifying content-delivery networks and edge proxies.
pub const CDN_KEYWORDS: [&str; 11] = [
    "cloudflare",
    "akamai",
    "fastly",
    "cloudfront",
    "azure",
    "vercel",
    "netlify",
    "cdn",
    "gws",
    "imperva",
    "sucuri",
];

/// Substrings identifying common web server software.
pub const ORIGIN_KEYWORDS: [&str; 9] = [
    "nginx",
    "apache",
    "openresty",
    "microsoft-iis",
    "litespeed",
    "caddy",
    "jetty",
    "tomcat",
    "envoy",
];

/// What a `Server` header tells us about the host that answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerKind {
    /// No header (or an empty one) was sent.
    Missing,
    /// The header names an edge network.
    Cdn,
    /// The header names well-known web server software.
    KnownOrigin,
    /// The header is present but matches neither list.
    Unknown,
}

impl ServerKind {
    /// Everything except a CDN match is kept as a possible origin.
    #[must_use]
    pub const fn is_origin(self) -> bool {
        !matches!(self, Self::Cdn)
    }
}

/// Classifies a raw `Server` header value.
#[must_use]
pub fn classify(server_header: &str) -> ServerKind {
    let header = server_header.to_lowercase();
    if header.is_empty() {
        return ServerKind::Missing;
    }

    if CDN_KEYWORDS.iter().any(|keyword| header.contains(keyword)) {
        return ServerKind::Cdn;
    }

    if ORIGIN_KEYWORDS.iter().any(|keyword| header.contains(keyword)) {
        return ServerKind::KnownOrigin;
    }

    ServerKind::Unknown
}

/// Returns `true` when the header does not point at an edge network.
#[must_use]
pub fn is_origin_server(server_header: &str) -> bool {
    classify(server_header).is_origin()
}
