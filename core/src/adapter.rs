//! Conversion between messages and transport calls.
//!
//! # Design
//! The adapter is stateless and runs strictly in order for each request:
//! [`ClientAdapter::to_specific`] builds the call, [`ClientAdapter::commit`]
//! hands it to the binding, and on completion
//! [`ClientAdapter::update_response`] turns the raw reply into a
//! [`Response`]. Whatever happens, the response callback runs exactly once.

use tracing::{debug, error, warn};

use crate::data::{Method, Parameter};
use crate::header::{
    add_entity_headers, add_general_headers, add_request_headers, content_length,
    copy_response_transport_headers, extract_entity_headers, is_chunked_encoding,
};
use crate::message::{Message, Request, Response};
use crate::representation::{Representation, UNKNOWN_SIZE};
use crate::status::Status;
use crate::transport::{Call, TransportBinding};

/// Receives the finished response.
pub type ResponseCallback = Box<dyn FnOnce(Response)>;

#[derive(Debug, Clone, Copy, Default)]
pub struct ClientAdapter;

impl ClientAdapter {
    /// Build the binding's call for `request`: general headers, entity
    /// headers when an entity is attached, then request headers.
    pub fn to_specific(&self, binding: &dyn TransportBinding, request: &mut Request) -> Call {
        let mut call = binding.create_call(request);
        let mut headers: Vec<Parameter> = Vec::new();

        add_general_headers(request, &mut headers);
        if request.entity().is_some() {
            add_entity_headers(request.entity(), &mut headers);
        }
        add_request_headers(request, &mut headers);

        call.request_headers = headers;
        call.request_body = request
            .entity()
            .filter(|e| e.is_available())
            .and_then(Representation::text)
            .map(str::to_string);
        call
    }

    /// Send `call` and report the resulting response to `callback`.
    /// Transport failures become connector-error responses.
    pub fn commit(
        &self,
        binding: &dyn TransportBinding,
        call: Call,
        request: Request,
        callback: ResponseCallback,
    ) {
        let adapter = *self;
        binding.send_request(
            call,
            Box::new(move |result| {
                let mut response = Response::new(request);
                match result {
                    Ok(call) => {
                        match Status::with_reason(call.status_code, call.reason_phrase.clone()) {
                            Ok(status) => adapter.update_response(&mut response, status, call),
                            Err(e) => {
                                error!(code = call.status_code, error = %e, "rejected status");
                                response.status = Status::CONNECTOR_ERROR_INTERNAL
                                    .with_description(e.to_string());
                            }
                        }
                    }
                    Err(e) => {
                        warn!(uri = %response.request.reference, error = %e, "call failed");
                        response.status = e.status();
                    }
                }
                debug!(status = response.status.code(), "response ready");
                callback(response);
            }),
        );
    }

    /// Fill `response` from the completed call: status, server info, the raw
    /// header list, transport headers and the entity.
    pub fn update_response(&self, response: &mut Response, status: Status, call: Call) {
        response.status = status;
        response.server_info.address = call.server_address;
        response.server_info.port = call.server_port;

        let headers = call.response_headers;
        copy_response_transport_headers(&headers, response);
        let entity = self.response_entity(response, &headers, call.response_body);
        *response.headers_mut() = headers;
        response.set_entity(entity);
    }

    /// The response entity, with the release rules applied.
    ///
    /// The size comes from `Content-Length` unless the body is chunked, then
    /// from the received body. The entity is released for HEAD, 204, 304,
    /// informational statuses and known-empty bodies; 205 and informational
    /// statuses get no entity at all.
    pub fn response_entity(
        &self,
        response: &Response,
        headers: &[Parameter],
        body: Option<String>,
    ) -> Option<Representation> {
        let status = &response.status;
        let is_head = response.request.method == Method::HEAD;

        let size = if is_chunked_encoding(headers) {
            UNKNOWN_SIZE
        } else if let Some(length) = content_length(headers) {
            i64::try_from(length).unwrap_or(UNKNOWN_SIZE)
        } else {
            body.as_ref().map_or(UNKNOWN_SIZE, |b| b.len() as i64)
        };

        let received = match body {
            Some(text) => {
                let mut representation = Representation::new();
                representation.write_text(text);
                Some(representation)
            }
            None if is_head => Some(Representation::new()),
            None => None,
        };

        let mut entity =
            extract_entity_headers(headers, received, Some(&response.request.reference))?;
        entity.size = size;

        if size == 0
            || is_head
            || *status == Status::SUCCESS_NO_CONTENT
            || *status == Status::REDIRECTION_NOT_MODIFIED
            || status.is_informational()
        {
            entity.release();
        }
        if *status == Status::SUCCESS_RESET_CONTENT || status.is_informational() {
            return None;
        }
        Some(entity)
    }
}
