//! Client identification
//!
//! Derives who is calling from request headers: a User-Agent fingerprint used
//! to bind sessions to one client, and the best-known client IP.

use axum::extract::ConnectInfo;
use axum::http::{Extensions, HeaderMap, header};
use std::net::{IpAddr, SocketAddr};

use crate::crypto::sha256;

/// Client fingerprint derived from request headers
#[derive(Debug, Clone)]
pub struct ClientFingerprint {
    /// SHA-256 of the User-Agent header
    pub hash: [u8; 32],
    /// Client IP (X-Forwarded-For or the socket peer)
    pub ip: Option<IpAddr>,
    /// Original User-Agent string, kept for logs
    pub user_agent: Option<String>,
}

impl ClientFingerprint {
    pub fn new(hash: [u8; 32], ip: Option<IpAddr>, user_agent: Option<String>) -> Self {
        Self {
            hash,
            ip,
            user_agent,
        }
    }

    /// Hash as `Vec<u8>` for database storage
    pub fn hash_vec(&self) -> Vec<u8> {
        self.hash.to_vec()
    }

    /// IP as string for database storage
    pub fn ip_string(&self) -> Option<String> {
        self.ip.map(|ip| ip.to_string())
    }
}

/// Error when extracting client fingerprint
#[derive(Debug, Clone, thiserror::Error)]
pub enum FingerprintError {
    #[error("Missing required header: {0}")]
    MissingHeader(String),
}

/// Build the fingerprint from the User-Agent header
///
/// ## Errors
/// [`FingerprintError::MissingHeader`] when no usable User-Agent is present.
pub fn extract_fingerprint(
    headers: &HeaderMap,
    client_ip: Option<IpAddr>,
) -> Result<ClientFingerprint, FingerprintError> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| FingerprintError::MissingHeader("User-Agent".to_string()))?;

    Ok(ClientFingerprint::new(
        sha256(user_agent.as_bytes()),
        client_ip,
        Some(user_agent.to_string()),
    ))
}

/// Resolve the client IP
///
/// The first X-Forwarded-For entry wins (reverse proxy deployments); the
/// direct peer address is the fallback.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
        .or(direct_ip)
}

/// Fingerprint a request from its headers and extensions
///
/// The peer address is read from the `ConnectInfo<SocketAddr>` extension when
/// the server was started with connect info.
pub fn fingerprint_request(
    headers: &HeaderMap,
    extensions: &Extensions,
) -> Result<ClientFingerprint, FingerprintError> {
    let direct_ip = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    extract_fingerprint(headers, extract_client_ip(headers, direct_ip))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_fingerprint() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("Firefox/128"));

        let fp = extract_fingerprint(&headers, None).unwrap();
        assert_eq!(fp.hash, sha256(b"Firefox/128"));
        assert_eq!(fp.user_agent.as_deref(), Some("Firefox/128"));
    }

    #[test]
    fn test_extract_fingerprint_missing_or_blank_ua() {
        let headers = HeaderMap::new();
        assert!(matches!(
            extract_fingerprint(&headers, None),
            Err(FingerprintError::MissingHeader(_))
        ));

        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("  "));
        assert!(extract_fingerprint(&headers, None).is_err());
    }

    #[test]
    fn test_extract_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        let ip = extract_client_ip(&headers, Some(direct));
        assert_eq!(ip, Some("203.0.113.9".parse().unwrap()));
    }

    #[test]
    fn test_fingerprint_request_uses_connect_info() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8"));
        let mut extensions = Extensions::new();
        let addr: SocketAddr = "192.0.2.4:5000".parse().unwrap();
        extensions.insert(ConnectInfo(addr));

        let fp = fingerprint_request(&headers, &extensions).unwrap();
        assert_eq!(fp.ip_string().as_deref(), Some("192.0.2.4"));
    }
}
