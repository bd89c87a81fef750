use std::net::SocketAddr;

/// Network address of the caller, as exposed to functions.
///
/// Kept as strings: a forwarded address may not carry a port, and functions
/// receive both parts verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerAddress {
    pub ip: String,
    pub port: String,
}

impl CallerAddress {
    pub fn new(ip: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            port: port.into(),
        }
    }

    /// Resolve the caller from an `X-Forwarded-For` value and the peer address.
    ///
    /// The first forwarded entry wins. Falls back to the peer, then to empty.
    pub fn resolve(forwarded_for: Option<&str>, peer: Option<SocketAddr>) -> Self {
        let forwarded = forwarded_for
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|first| !first.is_empty());

        match (forwarded, peer) {
            (Some(first), _) => Self::from_host_port(first),
            (None, Some(addr)) => Self::from(addr),
            (None, None) => Self::default(),
        }
    }

    fn from_host_port(value: &str) -> Self {
        match value.parse::<SocketAddr>() {
            Ok(addr) => Self::from(addr),
            Err(_) => Self::new(value.trim_start_matches('[').trim_end_matches(']'), ""),
        }
    }
}

impl From<SocketAddr> for CallerAddress {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwarded_for_takes_first_entry() {
        let caller = CallerAddress::resolve(
            Some("203.0.113.7, 10.0.0.1"),
            Some("127.0.0.1:9000".parse().unwrap()),
        );
        assert_eq!(caller, CallerAddress::new("203.0.113.7", ""));
    }

    #[test]
    fn test_forwarded_for_with_port() {
        let caller = CallerAddress::resolve(Some("203.0.113.7:4444"), None);
        assert_eq!(caller, CallerAddress::new("203.0.113.7", "4444"));
    }

    #[test]
    fn test_forwarded_ipv6_without_port() {
        let caller = CallerAddress::resolve(Some("[2001:db8::1]"), None);
        assert_eq!(caller.ip, "2001:db8::1");
        assert!(caller.port.is_empty());
    }

    #[test]
    fn test_falls_back_to_peer() {
        let caller = CallerAddress::resolve(Some("  "), Some("192.168.1.5:51000".parse().unwrap()));
        assert_eq!(caller, CallerAddress::new("192.168.1.5", "51000"));
    }

    #[test]
    fn test_unknown_caller_is_empty() {
        assert_eq!(CallerAddress::resolve(None, None), CallerAddress::default());
    }
}
