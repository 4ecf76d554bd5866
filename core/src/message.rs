//! Request and response messages.
//!
//! # Design
//! `Request` and `Response` share their common fields through
//! [`MessageCore`] and the [`Message`] trait instead of inheritance. The
//! raw header list lives on the message as typed [`Parameter`]s: on a
//! request it holds the caller's extension headers, on a response every
//! header line received, in order and with duplicates.

use chrono::{DateTime, Utc};

use crate::data::{CacheDirective, ChallengeResponse, MediaType, Method, Parameter};
use crate::reference::Reference;
use crate::representation::Representation;
use crate::status::Status;

/// Fields shared by requests and responses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageCore {
    pub entity: Option<Representation>,
    pub date: Option<DateTime<Utc>>,
    pub cache_directives: Vec<CacheDirective>,
    pub headers: Vec<Parameter>,
}

pub trait Message {
    fn core(&self) -> &MessageCore;
    fn core_mut(&mut self) -> &mut MessageCore;

    fn entity(&self) -> Option<&Representation> {
        self.core().entity.as_ref()
    }

    fn entity_mut(&mut self) -> Option<&mut Representation> {
        self.core_mut().entity.as_mut()
    }

    fn set_entity(&mut self, entity: Option<Representation>) {
        self.core_mut().entity = entity;
    }

    fn take_entity(&mut self) -> Option<Representation> {
        self.core_mut().entity.take()
    }

    /// Whether the entity exists and still holds readable content.
    fn is_entity_available(&self) -> bool {
        self.entity().is_some_and(Representation::is_available)
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        self.core().date
    }

    fn set_date(&mut self, date: Option<DateTime<Utc>>) {
        self.core_mut().date = date;
    }

    fn cache_directives(&self) -> &[CacheDirective] {
        &self.core().cache_directives
    }

    fn headers(&self) -> &[Parameter] {
        &self.core().headers
    }

    fn headers_mut(&mut self) -> &mut Vec<Parameter> {
        &mut self.core_mut().headers
    }
}

/// Client-side data used for content negotiation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    /// Accepted media types, most preferred first.
    pub accepted_media_types: Vec<MediaType>,
    pub agent: Option<String>,
}

impl ClientInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client info accepting only `media_type`.
    pub fn with_media_type(media_type: MediaType) -> Self {
        Self {
            accepted_media_types: vec![media_type],
            agent: None,
        }
    }

    /// The `Accept` header value; `*/*` when nothing was declared.
    pub fn accept_header(&self) -> String {
        if self.accepted_media_types.is_empty() {
            return MediaType::ALL.name().to_string();
        }
        self.accepted_media_types
            .iter()
            .map(MediaType::name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// What a response says about the server that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerInfo {
    pub agent: Option<String>,
    pub address: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub reference: Reference,
    pub client_info: ClientInfo,
    pub referrer: Option<Reference>,
    pub challenge_response: Option<ChallengeResponse>,
    core: MessageCore,
}

impl Request {
    pub fn new(method: Method, reference: Reference) -> Self {
        Self {
            method,
            reference,
            client_info: ClientInfo::default(),
            referrer: None,
            challenge_response: None,
            core: MessageCore::default(),
        }
    }

    pub fn with_entity(mut self, entity: Representation) -> Self {
        self.core.entity = Some(entity);
        self
    }

    /// Append a user extension header. Standard headers are filtered out
    /// when the call is built.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.core.headers.push(Parameter::new(name, value));
    }

    pub fn set_cache_directives(&mut self, directives: Vec<CacheDirective>) {
        self.core.cache_directives = directives;
    }
}

impl Message for Request {
    fn core(&self) -> &MessageCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut MessageCore {
        &mut self.core
    }
}

/// The outcome of one request attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    /// The request this response answers.
    pub request: Request,
    pub retry_after: Option<DateTime<Utc>>,
    pub server_info: ServerInfo,
    pub location_ref: Option<Reference>,
    /// Seconds, from the `Age` header.
    pub age: Option<u32>,
    pub allowed_methods: Vec<Method>,
    core: MessageCore,
}

impl Response {
    pub fn new(request: Request) -> Self {
        Self {
            status: Status::SUCCESS_OK,
            request,
            retry_after: None,
            server_info: ServerInfo::default(),
            location_ref: None,
            age: None,
            allowed_methods: Vec::new(),
            core: MessageCore::default(),
        }
    }

    /// First received header named `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.core
            .headers
            .iter()
            .find(|p| p.has_name(name))
            .map(|p| p.value.as_str())
    }
}

impl Message for Response {
    fn core(&self) -> &MessageCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut MessageCore {
        &mut self.core
    }
}
