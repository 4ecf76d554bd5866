//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible fields: `*mut c_char`
//! for strings (null when absent), raw pointer + length for lists, and
//! enums with explicit discriminants. Conversions live here so `lib.rs`
//! stays focused on the `extern "C"` surface.

use std::cell::Cell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::rc::Rc;

use restlet_core::transport::OutgoingCall;
use restlet_core::{
    ClientResource, HostTransport, MediaType, Message, Method, Response, TransportError,
};

/// Opaque handle to a resource whose calls are performed by the host.
/// C callers receive a pointer to this and pass it back into every FFI
/// function.
pub struct FfiResource {
    pub(crate) resource: ClientResource,
    pub(crate) host: Rc<HostTransport>,
    /// Set by the completion callback of the last verb.
    pub(crate) completed: Rc<Cell<bool>>,
}

// ---------------------------------------------------------------------------
// Request side
// ---------------------------------------------------------------------------

/// Uniform method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
    Options = 4,
    Head = 5,
}

impl From<FfiMethod> for Method {
    fn from(m: FfiMethod) -> Self {
        match m {
            FfiMethod::Get => Method::GET,
            FfiMethod::Post => Method::POST,
            FfiMethod::Put => Method::PUT,
            FfiMethod::Delete => Method::DELETE,
            FfiMethod::Options => Method::OPTIONS,
            FfiMethod::Head => Method::HEAD,
        }
    }
}

/// A single header as a name/value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub name: *mut c_char,
    pub value: *mut c_char,
}

/// A call the host must perform, as C-compatible plain data.
///
/// Returned by `restlet_resource_request`. The host executes the exchange
/// and reports back through `restlet_call_complete` or `restlet_call_fail`
/// with the same `id`.
#[repr(C)]
pub struct FfiCall {
    pub id: u64,
    pub method: *mut c_char,
    pub uri: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiCall {
    pub(crate) fn from_core(call: OutgoingCall) -> *mut Self {
        let headers_len = call.headers.len() as u32;
        let headers = if call.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let headers: Box<[FfiHeader]> = call
                .headers
                .into_iter()
                .map(|h| FfiHeader {
                    name: into_c_string(h.name),
                    value: into_c_string(h.value),
                })
                .collect();
            Box::into_raw(headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiCall {
            id: call.id,
            method: into_c_string(call.method),
            uri: into_c_string(call.uri),
            headers,
            headers_len,
            body: call.body.map_or(std::ptr::null_mut(), into_c_string),
        }))
    }
}

// ---------------------------------------------------------------------------
// Host reply (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// The host's raw reply to a call.
///
/// Built by the C caller after performing the exchange and passed to
/// `restlet_call_complete`. `headers` holds `Name: value` lines separated
/// by CRLF or LF. Any string may be null. The FFI layer reads but does not
/// free these fields.
#[repr(C)]
pub struct FfiRawResponse {
    pub status: u16,
    pub reason_phrase: *const c_char,
    pub headers: *const c_char,
    pub body: *const c_char,
}

/// Why the host could not perform a call.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiTransportError {
    Connection = 0,
    Communication = 1,
    Internal = 2,
}

impl FfiTransportError {
    pub(crate) fn into_core(self, message: String) -> TransportError {
        match self {
            FfiTransportError::Connection => TransportError::Connection(message),
            FfiTransportError::Communication => TransportError::Communication(message),
            FfiTransportError::Internal => TransportError::Internal(message),
        }
    }
}

// ---------------------------------------------------------------------------
// Result side
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiResult`. These describe misuse of the C
/// surface; protocol outcomes travel in `status`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NullArg = 1,
    UnknownCall = 2,
    Pending = 3,
    Panic = 4,
}

/// Result envelope for a completed call.
///
/// On success `error_code` is `Ok` and `status` carries the response status
/// (1000-series codes for connector errors). `reason_phrase`,
/// `description`, `media_type`, `location` and `entity` are null when the
/// response has no such value; `entity` is also null when the entity was
/// released (HEAD, 204, 304, empty body).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string and `status` is 0.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub status: u16,
    pub reason_phrase: *mut c_char,
    pub description: *mut c_char,
    pub media_type: *mut c_char,
    pub location: *mut c_char,
    pub entity: *mut c_char,
}

impl FfiResult {
    fn empty(error_code: FfiErrorCode, error_message: *mut c_char) -> Self {
        FfiResult {
            error_code,
            error_message,
            status: 0,
            reason_phrase: std::ptr::null_mut(),
            description: std::ptr::null_mut(),
            media_type: std::ptr::null_mut(),
            location: std::ptr::null_mut(),
            entity: std::ptr::null_mut(),
        }
    }

    /// Build a success result from a core `Response`.
    pub(crate) fn from_response(response: &Response) -> *mut Self {
        let status = &response.status;
        let entity = response.entity();
        let mut result = FfiResult::empty(FfiErrorCode::Ok, std::ptr::null_mut());
        result.status = status.code();
        result.reason_phrase = optional_c_string(status.reason_phrase());
        result.description = optional_c_string(status.description());
        result.media_type =
            optional_c_string(entity.and_then(|e| e.media_type()).map(MediaType::name));
        result.location =
            optional_c_string(response.location_ref.as_ref().map(|r| r.as_str()));
        result.entity = optional_c_string(entity.and_then(|e| e.text()));
        Box::into_raw(Box::new(result))
    }

    pub(crate) fn error(error_code: FfiErrorCode, message: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiResult::empty(
            error_code,
            into_c_string(message),
        )))
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, &format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, msg)
    }
}

// ---------------------------------------------------------------------------
// String helpers
// ---------------------------------------------------------------------------

/// Interior NULs cannot cross the boundary; such strings become empty.
pub(crate) fn into_c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

fn optional_c_string(s: Option<&str>) -> *mut c_char {
    s.map_or(std::ptr::null_mut(), into_c_string)
}

/// Read a borrowed C string, `None` for null. Invalid UTF-8 is replaced.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives
/// the returned value's use.
pub(crate) unsafe fn read_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }
}

/// Free a string produced by [`into_c_string`]. Null is ignored.
pub(crate) fn free_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}
