//! Admission checks run before a payload is hashed.

use std::net::{IpAddr, Ipv4Addr};

use crate::error::{transport_error, Error, TransportErrorKind};

/// Addresses Tebex sends webhooks from.
pub const WEBHOOK_IP_ADDRESSES: [IpAddr; 2] = [
    IpAddr::V4(Ipv4Addr::new(18, 209, 80, 3)),
    IpAddr::V4(Ipv4Addr::new(54, 87, 231, 232)),
];

/// The only content type Tebex delivers webhooks with.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Check the transport-level properties of an inbound webhook.
///
/// Checks run in a fixed order and stop at the first failure:
/// source address, then content type, then signature presence.
///
/// `remote_addr` is `None` when the source check is disabled or the address is
/// unknown, e.g. behind a reverse proxy that doesn't forward the client address.
pub fn check_admission(
    content_type: &str,
    signature: &str,
    remote_addr: Option<IpAddr>,
) -> Result<(), Error> {
    if let Some(addr) = remote_addr {
        if !is_allowed_source(addr) {
            return Err(transport_error(TransportErrorKind::InvalidSource(addr)));
        }
    }

    if content_type != CONTENT_TYPE_JSON {
        return Err(transport_error(TransportErrorKind::InvalidContentType));
    }

    if signature.is_empty() {
        return Err(transport_error(TransportErrorKind::MissingSignature));
    }

    Ok(())
}

/// Whether `addr` is a known Tebex sender. IPv4-mapped IPv6 addresses
/// (`::ffff:a.b.c.d`), as reported by dual-stack listeners, are compared as IPv4.
pub fn is_allowed_source(addr: IpAddr) -> bool {
    WEBHOOK_IP_ADDRESSES.contains(&addr.to_canonical())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn kind(result: Result<(), Error>) -> ErrorKind {
        result.unwrap_err().error_kind
    }

    #[test]
    fn test_allowed_sources() {
        assert!(is_allowed_source("18.209.80.3".parse().unwrap()));
        assert!(is_allowed_source("54.87.231.232".parse().unwrap()));
        assert!(is_allowed_source("::ffff:18.209.80.3".parse().unwrap()));
        assert!(!is_allowed_source("18.209.80.4".parse().unwrap()));
        assert!(!is_allowed_source("127.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_passes_with_valid_headers_and_no_address() {
        assert!(check_admission("application/json", "abc", None).is_ok());
    }

    #[test]
    fn test_passes_with_allow_listed_address() {
        let addr = "54.87.231.232".parse().ok();
        assert!(check_admission("application/json", "abc", addr).is_ok());
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        let addr: IpAddr = "203.0.113.9".parse().unwrap();
        assert_eq!(
            kind(check_admission("application/json", "abc", Some(addr))),
            ErrorKind::Transport(TransportErrorKind::InvalidSource(addr))
        );
    }

    #[test]
    fn test_source_is_checked_before_headers() {
        let addr: IpAddr = "203.0.113.9".parse().unwrap();
        assert_eq!(
            kind(check_admission("text/plain", "", Some(addr))),
            ErrorKind::Transport(TransportErrorKind::InvalidSource(addr))
        );
    }

    #[test]
    fn test_content_type_is_checked_before_signature() {
        assert_eq!(
            kind(check_admission("text/plain", "", None)),
            ErrorKind::Transport(TransportErrorKind::InvalidContentType)
        );
    }

    #[test]
    fn test_content_type_must_match_exactly() {
        assert_eq!(
            kind(check_admission("application/json; charset=utf-8", "abc", None)),
            ErrorKind::Transport(TransportErrorKind::InvalidContentType)
        );
        assert_eq!(
            kind(check_admission("", "abc", None)),
            ErrorKind::Transport(TransportErrorKind::InvalidContentType)
        );
    }

    #[test]
    fn test_missing_signature_is_rejected() {
        assert_eq!(
            kind(check_admission("application/json", "", None)),
            ErrorKind::Transport(TransportErrorKind::MissingSignature)
        );
    }
}
