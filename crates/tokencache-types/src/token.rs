//! Opaque delegation token.

use std::fmt;

/// A delegation token issued by a storage backend.
///
/// The payload is kept in the backend's own encoded form and is never
/// decoded here. `Display` and `Debug` only show its length.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    kind: String,
    service: String,
    encoded: String,
}

impl Token {
    pub fn new(
        kind: impl Into<String>,
        service: impl Into<String>,
        encoded: impl Into<String>,
    ) -> Self {
        Token {
            kind: kind.into(),
            service: service.into(),
            encoded: encoded.into(),
        }
    }

    /// Token kind, e.g. `HDFS_DELEGATION_TOKEN`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Service the token is valid for, usually `host:port`.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Re-key the token to another service.
    pub fn set_service(&mut self, service: impl Into<String>) {
        self.service = service.into();
    }

    /// The encoded payload as handed out by the backend.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Kind: {}, Service: {}, Ident: ({} bytes)",
            self.kind,
            self.service,
            self.encoded.len()
        )
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("kind", &self.kind)
            .field("service", &self.service)
            .field("encoded_len", &self.encoded.len())
            .finish()
    }
}
