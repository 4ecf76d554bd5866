//! Transport bindings: the only place where bytes leave the process.
//!
//! # Design
//! A binding turns a [`Call`] (method, URI, headers, body) into a raw reply
//! (status, reason, headers, body) and reports it through a one-shot
//! completion handler. Two bindings ship:
//!
//! - [`HttpTransport`] performs the exchange itself with `ureq` and
//!   completes before `send_request` returns.
//! - [`HostTransport`] queues the call; the embedding host performs the
//!   exchange and hands back the raw reply later (host-does-IO).
//!
//! Clients normally get their binding injected. When none is, the default
//! is probed once per thread from [`ClientConfig`] and the target.

mod host;
mod http;

use std::cell::OnceCell;
use std::rc::Rc;

use tracing::debug;

use crate::config::ClientConfig;
use crate::data::{Method, Parameter};
use crate::error::TransportError;
use crate::header::{CONNECTION, CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use crate::message::Request;

pub use host::{HostTransport, OutgoingCall};
pub use http::HttpTransport;

/// Invoked exactly once with the completed call or the failure.
pub type CompletionHandler = Box<dyn FnOnce(Result<Call, TransportError>)>;

/// Headers the transport computes itself; bindings never forward them.
pub const MANAGED_HEADERS: &[&str] = &[HOST, CONTENT_LENGTH, CONNECTION, TRANSFER_ENCODING];

pub fn is_managed_header(name: &str) -> bool {
    MANAGED_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// One transport attempt. Request fields are filled by the adapter,
/// response fields by the binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: Method,
    pub uri: String,
    pub request_headers: Vec<Parameter>,
    pub request_body: Option<String>,
    pub response_headers: Vec<Parameter>,
    pub status_code: u16,
    pub reason_phrase: Option<String>,
    pub response_body: Option<String>,
    pub server_address: Option<String>,
    pub server_port: Option<u16>,
}

impl Call {
    pub fn new(request: &Request) -> Self {
        Self {
            method: request.method.clone(),
            uri: request.reference.as_str().to_string(),
            request_headers: Vec::new(),
            request_body: None,
            response_headers: Vec::new(),
            status_code: 0,
            reason_phrase: None,
            response_body: None,
            server_address: request.reference.host().map(str::to_string),
            server_port: request.reference.effective_port(),
        }
    }

    /// Request headers a binding should put on the wire.
    pub fn forwarded_headers(&self) -> impl Iterator<Item = &Parameter> {
        self.request_headers
            .iter()
            .filter(|h| !is_managed_header(&h.name))
    }
}

pub trait TransportBinding {
    fn create_call(&self, request: &Request) -> Call {
        Call::new(request)
    }

    /// Perform `call` and report the outcome to `on_complete`.
    fn send_request(&self, call: Call, on_complete: CompletionHandler);
}

/// Which binding the process default uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Http,
    Host,
}

impl TransportKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "http" => Some(TransportKind::Http),
            "host" => Some(TransportKind::Host),
            _ => None,
        }
    }

    /// Configured kind, else the host binding on wasm targets and the HTTP
    /// binding everywhere else.
    pub fn detect(config: &ClientConfig) -> Self {
        config.transport.unwrap_or(if cfg!(target_arch = "wasm32") {
            TransportKind::Host
        } else {
            TransportKind::Http
        })
    }
}

#[derive(Clone)]
enum DefaultBinding {
    Http(Rc<HttpTransport>),
    Host(Rc<HostTransport>),
}

thread_local! {
    static DEFAULT_BINDING: OnceCell<DefaultBinding> = const { OnceCell::new() };
}

fn probe(config: &ClientConfig) -> DefaultBinding {
    DEFAULT_BINDING.with(|cell| {
        cell.get_or_init(|| {
            let kind = TransportKind::detect(config);
            debug!(?kind, "selected default transport binding");
            match kind {
                TransportKind::Http => DefaultBinding::Http(Rc::new(HttpTransport::new())),
                TransportKind::Host => DefaultBinding::Host(Rc::new(HostTransport::new())),
            }
        })
        .clone()
    })
}

/// This thread's default binding. The first caller's configuration decides
/// which one it is.
pub fn default_binding(config: &ClientConfig) -> Rc<dyn TransportBinding> {
    match probe(config) {
        DefaultBinding::Http(binding) => binding,
        DefaultBinding::Host(binding) => binding,
    }
}

/// The default binding, when it is the host-driven one.
pub fn default_host_transport(config: &ClientConfig) -> Option<Rc<HostTransport>> {
    match probe(config) {
        DefaultBinding::Host(binding) => Some(binding),
        DefaultBinding::Http(_) => None,
    }
}

/// Split a raw `Name: value` header block into parameters. Lines without a
/// colon are skipped; names and values are trimmed.
pub fn parse_header_block(block: &str) -> Vec<Parameter> {
    block
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| Parameter::new(name, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Reference;

    #[test]
    fn header_block_parsing() {
        let block = "Content-Type: application/json\r\n\r\nX-Empty:\nbogus line\n Date : Sun, 06 Nov 1994 08:49:37 GMT\r\n";
        assert_eq!(
            parse_header_block(block),
            vec![
                Parameter::new("Content-Type", "application/json"),
                Parameter::new("X-Empty", ""),
                Parameter::new("Date", "Sun, 06 Nov 1994 08:49:37 GMT"),
            ]
        );
    }

    #[test]
    fn call_skips_managed_headers() {
        let request = Request::new(
            Method::GET,
            Reference::parse("http://example.com/a").unwrap(),
        );
        let mut call = Call::new(&request);
        call.request_headers = vec![
            Parameter::new("Host", "example.com"),
            Parameter::new("Accept", "*/*"),
            Parameter::new("content-length", "0"),
        ];
        let names: Vec<_> = call.forwarded_headers().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Accept"]);
        assert_eq!(call.server_address.as_deref(), Some("example.com"));
        assert_eq!(call.server_port, Some(80));
    }

    #[test]
    fn detection_prefers_configuration() {
        let mut config = ClientConfig::default();
        config.transport = Some(TransportKind::Host);
        assert_eq!(TransportKind::detect(&config), TransportKind::Host);
        config.transport = None;
        assert_eq!(TransportKind::detect(&config), TransportKind::Http);
        assert_eq!(TransportKind::from_name(" HOST "), Some(TransportKind::Host));
        assert_eq!(TransportKind::from_name("xhr"), None);
    }
}
