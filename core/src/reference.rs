//! Parsed resource references.

use std::fmt;

use url::Url;

use crate::data::Protocol;
use crate::error::ClientError;

/// An absolute URI identifying the target resource of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    url: Url,
}

impl Reference {
    pub fn parse(uri: &str) -> Result<Self, ClientError> {
        Ok(Self {
            url: Url::parse(uri)?,
        })
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// The protocol matching the scheme, if this client knows it.
    pub fn scheme_protocol(&self) -> Option<Protocol> {
        Protocol::from_scheme(self.url.scheme())
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// The port written in the URI, if any.
    pub fn port(&self) -> Option<u16> {
        self.url.port()
    }

    /// The explicit port, or the scheme's default one.
    pub fn effective_port(&self) -> Option<u16> {
        self.url.port_or_known_default()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.url.query()
    }

    /// Value for the `Host` header: host name, plus the port when it differs
    /// from the protocol default.
    pub fn host_header(&self) -> Option<String> {
        let host = self.host()?;
        let default_port = self.scheme_protocol().map(|p| p.default_port);
        match self.port() {
            Some(port) if Some(port) != default_port => Some(format!("{host}:{port}")),
            _ => Some(host.to_string()),
        }
    }

    /// Resolve a possibly relative reference (e.g. a `Location` value)
    /// against this one.
    pub fn resolve(&self, target: &str) -> Result<Reference, ClientError> {
        Ok(Self {
            url: self.url.join(target)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
