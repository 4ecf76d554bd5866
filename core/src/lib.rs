//! REST client core: request/response model, header mapping, call adapter
//! and transport bindings.
//!
//! # Overview
//! Application code talks to a [`ClientResource`]: each verb builds a
//! [`Request`], sends it through a [`Client`] and gets back the response
//! entity as a [`Representation`], which can be viewed as JSON
//! ([`JsonRepresentation`]) or XML ([`DomRepresentation`],
//! [`XmlRepresentation`]).
//!
//! # Design
//! - Callback driven and single threaded: one transport call per request,
//!   one completion callback, shared state behind `Rc`/`RefCell`.
//! - The [`TransportBinding`] is the only seam to the outside world.
//!   [`HttpTransport`] performs the exchange with `ureq`; [`HostTransport`]
//!   lets an embedding host perform it (host-does-IO).
//! - Protocol failures are data, not errors: 4xx/5xx replies are normal
//!   responses and transport failures become 1000-series connector-error
//!   statuses. Only URL parsing and payload conversion return `Err`.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use restlet_core::transport::{Call, CompletionHandler, TransportBinding};
//! use restlet_core::{Client, ClientResource, JsonRepresentation, MediaType, Parameter, Protocol};
//!
//! struct Canned;
//!
//! impl TransportBinding for Canned {
//!     fn send_request(&self, mut call: Call, on_complete: CompletionHandler) {
//!         call.status_code = 200;
//!         call.response_headers = vec![Parameter::new("Content-Type", "application/json")];
//!         call.response_body = Some(r#"{"id":1}"#.to_string());
//!         on_complete(Ok(call));
//!     }
//! }
//!
//! let mut resource = ClientResource::new("http://localhost:8182/resource/contact/1").unwrap();
//! resource.set_next(Rc::new(Client::with_transport(vec![Protocol::HTTP], Rc::new(Canned))));
//!
//! let id = Rc::new(RefCell::new(None));
//! let sink = Rc::clone(&id);
//! resource.get(Some(MediaType::APPLICATION_JSON), move |entity| {
//!     let object = JsonRepresentation::wrap(entity.unwrap()).object().unwrap();
//!     *sink.borrow_mut() = object["id"].as_u64();
//! });
//! assert_eq!(*id.borrow(), Some(1));
//! ```

pub mod adapter;
pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod header;
pub mod message;
pub mod reference;
pub mod representation;
pub mod resource;
pub mod status;
pub mod transport;

pub use adapter::{ClientAdapter, ResponseCallback};
pub use client::Client;
pub use config::ClientConfig;
pub use data::{
    CacheDirective, ChallengeResponse, CharacterSet, ContentRange, ContentType, Digest,
    Disposition, MediaType, Method, Parameter, Protocol, Tag,
};
pub use error::{ClientError, HeaderError, InvalidReasonPhrase, RepresentationError, TransportError};
pub use message::{ClientInfo, Message, MessageCore, Request, Response, ServerInfo};
pub use reference::Reference;
pub use representation::{
    DomRepresentation, JsonRepresentation, Representation, RepresentationInfo, Variant,
    XmlElement, XmlNode, XmlRepresentation, UNKNOWN_SIZE,
};
pub use resource::ClientResource;
pub use status::Status;
pub use transport::{HostTransport, HttpTransport, TransportBinding, TransportKind};
