//! C-ABI wrapper around `restlet-core`.
//!
//! # Overview
//! Exposes a resource-oriented REST client through `extern "C"` functions
//! for hosts that perform HTTP themselves. The library builds each call
//! (method, URI, headers, body), the host executes it, and the library
//! turns the host's raw reply into a status plus entity.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Each resource owns a [`HostTransport`]; `restlet_resource_request`
//!   queues one call and hands it out, `restlet_call_complete` /
//!   `restlet_call_fail` feed the reply back through the core adapter.
//! - A single `FfiResult` envelope carries the response status, phrase,
//!   media type and entity text, or a misuse error.
//! - The C caller owns all returned pointers and must call the matching
//!   `restlet_free_*` function to release them.

pub mod types;

use std::cell::Cell;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use restlet_core::{
    Client, ClientConfig, ClientResource, HostTransport, MediaType, Protocol, Representation,
};
use tracing::warn;

use types::*;

// ---------------------------------------------------------------------------
// Resource lifecycle
// ---------------------------------------------------------------------------

/// Create a resource handle for `uri`.
///
/// Returns null if `uri` is null, is not an absolute URI, or if an internal
/// panic occurs. The caller must free the returned pointer with
/// `restlet_resource_free`.
#[unsafe(no_mangle)]
pub extern "C" fn restlet_resource_new(uri: *const c_char) -> *mut FfiResource {
    catch_unwind(|| {
        let Some(uri) = (unsafe { read_c_string(uri) }) else {
            return std::ptr::null_mut();
        };
        let mut resource = match ClientResource::new(&uri) {
            Ok(resource) => resource,
            Err(e) => {
                warn!(%uri, error = %e, "rejected resource uri");
                return std::ptr::null_mut();
            }
        };

        let host = Rc::new(HostTransport::new());
        let client = Client::with_transport(vec![Protocol::HTTP, Protocol::HTTPS], host.clone())
            .with_config(ClientConfig::from_env());
        resource.set_next(Rc::new(client));

        Box::into_raw(Box::new(FfiResource {
            resource,
            host,
            completed: Rc::new(Cell::new(false)),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a resource created by `restlet_resource_new`. Safe to call with
/// null. Calls still pending on the handle are dropped.
#[unsafe(no_mangle)]
pub extern "C" fn restlet_resource_free(res: *mut FfiResource) {
    if !res.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(res) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Issuing calls
// ---------------------------------------------------------------------------

/// Issue `method` against the resource and return the call the host must
/// perform.
///
/// `accept` is the preferred response media type (null for any). `body` is
/// the request entity for POST/PUT (null for none), labelled with
/// `content_type` (null defaults to `text/plain`).
///
/// One call may be in flight per handle: while the previous call is still
/// waiting for `restlet_call_complete` or `restlet_call_fail`, nothing is
/// issued and null is returned.
///
/// Returns null if `res` is null, if a call is still in flight, or if the
/// call completed without needing the host (for instance an unsupported
/// scheme); in that last case `restlet_resource_result` already holds the
/// outcome.
/// The caller must free the returned pointer with `restlet_free_call`.
#[unsafe(no_mangle)]
pub extern "C" fn restlet_resource_request(
    res: *mut FfiResource,
    method: FfiMethod,
    accept: *const c_char,
    body: *const c_char,
    content_type: *const c_char,
) -> *mut FfiCall {
    catch_unwind(AssertUnwindSafe(|| {
        if res.is_null() {
            return std::ptr::null_mut();
        }
        let res = unsafe { &mut *res };
        let in_flight = res.host.pending_count();
        if in_flight > 0 {
            warn!(in_flight, "call still in flight, request not issued");
            return std::ptr::null_mut();
        }
        let accept = unsafe { read_c_string(accept) }.map(MediaType::new);
        let entity = unsafe { read_c_string(body) }.map(|text| {
            let media_type = unsafe { read_c_string(content_type) }
                .map_or(MediaType::TEXT_PLAIN, MediaType::new);
            Representation::from_text(text, media_type)
        });

        res.completed.set(false);
        let done = Rc::clone(&res.completed);
        let on_complete = move |_: Option<Representation>| done.set(true);

        let resource = &mut res.resource;
        match method {
            FfiMethod::Get => resource.get(accept, on_complete),
            FfiMethod::Post => resource.post(entity, accept, on_complete),
            FfiMethod::Put => resource.put(entity, accept, on_complete),
            FfiMethod::Delete => resource.delete(accept, on_complete),
            FfiMethod::Options => resource.options(accept, on_complete),
            FfiMethod::Head => resource.head(accept, on_complete),
        }

        match res.host.take_outgoing().into_iter().next() {
            Some(call) => FfiCall::from_core(call),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Outcome of the last call issued on `res`.
///
/// `error_code` is `Pending` while the host has not replied yet.
/// The caller must free the returned pointer with `restlet_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn restlet_resource_result(res: *const FfiResource) -> *mut FfiResult {
    catch_unwind(AssertUnwindSafe(|| {
        if res.is_null() {
            return FfiResult::null_arg("res");
        }
        last_result(unsafe { &*res })
    }))
    .unwrap_or_else(|_| FfiResult::panic("panic in restlet_resource_result"))
}

fn last_result(res: &FfiResource) -> *mut FfiResult {
    match res.resource.response() {
        Some(response) if res.completed.get() => FfiResult::from_response(&response),
        _ => FfiResult::error(FfiErrorCode::Pending, "no completed call"),
    }
}

// ---------------------------------------------------------------------------
// Host replies
// ---------------------------------------------------------------------------

/// Deliver the host's reply to call `id` and return the resulting outcome.
///
/// Returns an `UnknownCall` error if `id` is not pending on `res`.
/// The caller must free the returned pointer with `restlet_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn restlet_call_complete(
    res: *mut FfiResource,
    id: u64,
    response: *const FfiRawResponse,
) -> *mut FfiResult {
    catch_unwind(AssertUnwindSafe(|| {
        if res.is_null() {
            return FfiResult::null_arg("res");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let res = unsafe { &*res };
        let raw = unsafe { &*response };

        let reason_phrase = unsafe { read_c_string(raw.reason_phrase) };
        let header_block = unsafe { read_c_string(raw.headers) }.unwrap_or_default();
        let body = unsafe { read_c_string(raw.body) };

        match res
            .host
            .complete(id, raw.status, reason_phrase, &header_block, body)
        {
            Ok(()) => last_result(res),
            Err(e) => FfiResult::error(FfiErrorCode::UnknownCall, &e.to_string()),
        }
    }))
    .unwrap_or_else(|_| FfiResult::panic("panic in restlet_call_complete"))
}

/// Report that the host could not perform call `id`. The outcome carries
/// the matching 1000-series connector status.
///
/// `message` may be null. Returns an `UnknownCall` error if `id` is not
/// pending on `res`.
/// The caller must free the returned pointer with `restlet_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn restlet_call_fail(
    res: *mut FfiResource,
    id: u64,
    kind: FfiTransportError,
    message: *const c_char,
) -> *mut FfiResult {
    catch_unwind(AssertUnwindSafe(|| {
        if res.is_null() {
            return FfiResult::null_arg("res");
        }
        let res = unsafe { &*res };
        let message = unsafe { read_c_string(message) }.unwrap_or_default();

        match res.host.fail(id, kind.into_core(message)) {
            Ok(()) => last_result(res),
            Err(e) => FfiResult::error(FfiErrorCode::UnknownCall, &e.to_string()),
        }
    }))
    .unwrap_or_else(|_| FfiResult::panic("panic in restlet_call_fail"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiCall` returned by `restlet_resource_request`. Safe to call
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn restlet_free_call(call: *mut FfiCall) {
    if call.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let call = unsafe { Box::from_raw(call) };
        free_c_string(call.method);
        free_c_string(call.uri);
        free_c_string(call.body);
        if !call.headers.is_null() {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    call.headers,
                    call.headers_len as usize,
                ))
            };
            for header in headers.iter() {
                free_c_string(header.name);
                free_c_string(header.value);
            }
        }
    });
}

/// Free an `FfiResult`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn restlet_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.reason_phrase);
        free_c_string(result.description);
        free_c_string(result.media_type);
        free_c_string(result.location);
        free_c_string(result.entity);
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn restlet_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}
