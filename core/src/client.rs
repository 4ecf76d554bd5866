//! Protocol-level client connector.
//!
//! # Design
//! A `Client` owns a transport binding and the list of protocols it
//! accepts. `handle` checks the protocol, fills in the configured agent,
//! then drives the adapter. Requests for an unsupported protocol never
//! reach the binding; they complete at once with an internal connector
//! error.

use std::rc::Rc;

use tracing::{debug, warn};

use crate::adapter::ClientAdapter;
use crate::config::ClientConfig;
use crate::data::Protocol;
use crate::message::{Request, Response};
use crate::status::Status;
use crate::transport::{default_binding, TransportBinding};

pub struct Client {
    protocols: Vec<Protocol>,
    binding: Rc<dyn TransportBinding>,
    adapter: ClientAdapter,
    config: ClientConfig,
}

impl Client {
    /// A client on this thread's default binding, configured from the
    /// environment.
    pub fn new(protocols: Vec<Protocol>) -> Self {
        let config = ClientConfig::from_env();
        let binding = default_binding(&config);
        Self {
            protocols,
            binding,
            adapter: ClientAdapter,
            config,
        }
    }

    /// A client on an explicit binding.
    pub fn with_transport(protocols: Vec<Protocol>, binding: Rc<dyn TransportBinding>) -> Self {
        Self {
            protocols,
            binding,
            adapter: ClientAdapter,
            config: ClientConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn protocols(&self) -> &[Protocol] {
        &self.protocols
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_supported(&self, request: &Request) -> bool {
        request
            .reference
            .scheme_protocol()
            .is_some_and(|p| self.protocols.contains(&p))
    }

    /// Send `request` and hand the response to `callback`, exactly once.
    pub fn handle(&self, mut request: Request, callback: impl FnOnce(Response) + 'static) {
        if !self.is_supported(&request) {
            let protocol = request
                .reference
                .scheme_protocol()
                .map_or_else(|| request.reference.scheme().to_uppercase(), |p| p.name.to_string());
            warn!(%protocol, "no client connector for protocol");
            let mut response = Response::new(request);
            response.status = Status::CONNECTOR_ERROR_INTERNAL.with_description(format!(
                "No available client connector supports the required protocol: '{protocol}'."
            ));
            callback(response);
            return;
        }

        if request.client_info.agent.is_none() {
            request.client_info.agent = Some(self.config.user_agent.clone());
        }
        debug!(method = %request.method, uri = %request.reference, "handling request");

        let call = self.adapter.to_specific(self.binding.as_ref(), &mut request);
        self.adapter
            .commit(self.binding.as_ref(), call, request, Box::new(callback));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Method, MediaType};
    use crate::reference::Reference;
    use crate::transport::{Call, CompletionHandler};
    use std::cell::RefCell;

    /// Echoes back 200 with the request headers it saw.
    #[derive(Default)]
    struct Echo {
        seen: RefCell<Vec<Call>>,
    }

    impl TransportBinding for Echo {
        fn send_request(&self, mut call: Call, on_complete: CompletionHandler) {
            self.seen.borrow_mut().push(call.clone());
            call.status_code = 200;
            call.response_headers = vec![crate::data::Parameter::new("Content-Type", "text/plain")];
            call.response_body = Some("ok".into());
            on_complete(Ok(call));
        }
    }

    fn capture() -> (Rc<RefCell<Option<Response>>>, impl FnOnce(Response) + 'static) {
        let slot = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&slot);
        (slot, move |r| *sink.borrow_mut() = Some(r))
    }

    #[test]
    fn unsupported_protocol_never_reaches_binding() {
        let echo = Rc::new(Echo::default());
        let client = Client::with_transport(vec![Protocol::HTTP], echo.clone());
        let request = Request::new(Method::GET, Reference::parse("https://example.com/").unwrap());

        let (slot, callback) = capture();
        client.handle(request, callback);

        let response = slot.borrow_mut().take().unwrap();
        assert_eq!(response.status, Status::CONNECTOR_ERROR_INTERNAL);
        assert_eq!(
            response.status.description(),
            Some("No available client connector supports the required protocol: 'HTTPS'.")
        );
        assert!(echo.seen.borrow().is_empty());
    }

    #[test]
    fn configured_agent_is_sent() {
        let echo = Rc::new(Echo::default());
        let config = ClientConfig {
            user_agent: "contacts/1.0".into(),
            ..ClientConfig::default()
        };
        let client = Client::with_transport(vec![Protocol::HTTP], echo.clone()).with_config(config);
        let mut request = Request::new(Method::GET, Reference::parse("http://example.com/").unwrap());
        request.client_info.accepted_media_types.push(MediaType::TEXT_PLAIN);

        let (slot, callback) = capture();
        client.handle(request, callback);

        let response = slot.borrow_mut().take().unwrap();
        assert_eq!(response.status, Status::SUCCESS_OK);
        assert_eq!(response.request.client_info.agent.as_deref(), Some("contacts/1.0"));

        let seen = echo.seen.borrow();
        let agent = seen[0].request_headers.iter().find(|h| h.has_name("User-Agent"));
        assert_eq!(agent.map(|h| h.value.as_str()), Some("contacts/1.0"));
    }
}
