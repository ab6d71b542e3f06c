//! Unified error type.

use std::net::AddrParseError;

/// The error type returned by the crate's fallible operations.
///
/// Only the host pipeline can fail: parsing the bind address and running the
/// listener. The access-log middleware itself has no error path, and
/// application-level failures (404, 422, etc.) are expressed as
/// [`Response`](crate::Response) values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid socket address: {0}")]
    InvalidAddr(#[from] AddrParseError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_underlying_cause() {
        let err: Error = "not-an-addr".parse::<std::net::SocketAddr>().unwrap_err().into();
        assert!(err.to_string().starts_with("invalid socket address: "));

        let err: Error = std::io::Error::other("port in use").into();
        assert_eq!(err.to_string(), "io: port in use");
    }
}
