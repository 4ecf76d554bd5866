//! Status taxonomy: numeric codes, reason phrases, descriptions, reference
//! URIs and category predicates.
//!
//! # Design
//! A `Status` only stores what differs from the well-known table: for a
//! known code every accessor falls back to the static entry, so the
//! associated constants are plain `const` values and `Status::from_code`
//! never allocates. Equality and hashing use the numeric code alone, which
//! keeps a status carrying a custom description equal to its constant.
//!
//! Codes 1000-1099 are synthetic connector errors produced locally when the
//! transport fails; no remote peer ever sends them.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::InvalidReasonPhrase;

const BASE_HTTP: &str = "http://www.w3.org/Protocols/rfc2616/rfc2616-sec10.html";
const BASE_WEBDAV: &str = "http://www.webdav.org/specs/rfc2518.html";
const BASE_RESTLET: &str = "http://www.restlet.org/documentation/";
const WARNING_URI: &str = "http://www.w3.org/Protocols/rfc2616/rfc2616-sec14.html#sec14.46";

/// Where the reference documentation of a known code lives.
#[derive(Clone, Copy)]
enum Reference {
    Http(&'static str),
    Webdav(&'static str),
    Warning,
    Restlet(&'static str),
}

struct Known {
    code: u16,
    phrase: &'static str,
    description: &'static str,
    reference: Reference,
}

const fn known(
    code: u16,
    phrase: &'static str,
    description: &'static str,
    reference: Reference,
) -> Known {
    Known {
        code,
        phrase,
        description,
        reference,
    }
}

use Reference::{Http, Restlet, Warning, Webdav};

/// Sorted by code for binary search. One row per code.
#[rustfmt::skip]
static KNOWN: &[Known] = &[
    known(100, "Continue", "The client should continue with its request", Http("#sec10.1.1")),
    known(101, "Switching Protocols", "The server is willing to change the application protocol being used on this connection", Http("#sec10.1.2")),
    known(102, "Processing", "Interim response used to inform the client that the server has accepted the complete request, but has not yet completed it", Webdav("#STATUS_102")),
    known(110, "Response is stale", "MUST be included whenever the returned response is stale", Warning),
    known(111, "Revalidation failed", "MUST be included if a cache returns a stale response because an attempt to revalidate the response failed, due to an inability to reach the server", Warning),
    known(112, "Disconnected operation", "SHOULD be included if the cache is intentionally disconnected from the rest of the network for a period of time", Warning),
    known(113, "Heuristic expiration", "MUST be included if the cache heuristically chose a freshness lifetime greater than 24 hours and the response's age is greater than 24 hours", Warning),
    known(199, "Miscellaneous warning", "The warning text MAY include arbitrary information to be presented to a human user, or logged. A system receiving this warning MUST NOT take any automated action, besides presenting the warning to the user", Warning),
    known(200, "OK", "The request has succeeded", Http("#sec10.2.1")),
    known(201, "Created", "The request has been fulfilled and resulted in a new resource being created", Http("#sec10.2.2")),
    known(202, "Accepted", "The request has been accepted for processing, but the processing has not been completed", Http("#sec10.2.3")),
    known(203, "Non-Authoritative Information", "The returned meta-information is not the definitive set as available from the origin server", Http("#sec10.2.4")),
    known(204, "No Content", "The server has fulfilled the request but does not need to return an entity-body, and might want to return updated meta-information", Http("#sec10.2.5")),
    known(205, "Reset Content", "The server has fulfilled the request and the user agent should reset the document view which caused the request to be sent", Http("#sec10.2.6")),
    known(206, "Partial Content", "The server has fulfilled the partial get request for the resource", Http("#sec10.2.7")),
    known(207, "Multi-Status", "Provides status for multiple independent operations", Webdav("#STATUS_207")),
    known(214, "Transformation applied", "MUST be added by an intermediate cache or proxy if it applies any transformation changing the content-coding (as specified in the Content-Encoding header) or media-type (as specified in the Content-Type header) of the response, or the entity-body of the response, unless this Warning code already appears in the response", Warning),
    known(299, "Miscellaneous persistent warning", "The warning text MAY include arbitrary information to be presented to a human user, or logged. A system receiving this warning MUST NOT take any automated action", Warning),
    known(300, "Multiple Choices", "The requested resource corresponds to any one of a set of representations", Http("#sec10.3.1")),
    known(301, "Moved Permanently", "The requested resource has been assigned a new permanent URI", Http("#sec10.3.2")),
    known(302, "Found", "The requested resource can be found under a different URI", Http("#sec10.3.3")),
    known(303, "See Other", "The response to the request can be found under a different URI", Http("#sec10.3.4")),
    known(304, "Not Modified", "The client has performed a conditional GET request and the document has not been modified", Http("#sec10.3.5")),
    known(305, "Use Proxy", "The requested resource must be accessed through the proxy given by the location field", Http("#sec10.3.6")),
    known(307, "Temporary Redirect", "The requested resource resides temporarily under a different URI", Http("#sec10.3.8")),
    known(400, "Bad Request", "The request could not be understood by the server due to malformed syntax", Http("#sec10.4.1")),
    known(401, "Unauthorized", "The request requires user authentication", Http("#sec10.4.2")),
    known(402, "Payment Required", "This code is reserved for future use", Http("#sec10.4.3")),
    known(403, "Forbidden", "The server understood the request, but is refusing to fulfill it", Http("#sec10.4.4")),
    known(404, "Not Found", "The server has not found anything matching the request URI", Http("#sec10.4.5")),
    known(405, "Method Not Allowed", "The method specified in the request is not allowed for the resource identified by the request URI", Http("#sec10.4.6")),
    known(406, "Not Acceptable", "The resource identified by the request is only capable of generating response entities which have content characteristics not acceptable according to the accept headers sent in the request", Http("#sec10.4.7")),
    known(407, "Proxy Authentication Required", "This code is similar to Unauthorized, but indicates that the client must first authenticate itself with the proxy", Http("#sec10.4.8")),
    known(408, "Request Timeout", "The client did not produce a request within the time that the server was prepared to wait", Http("#sec10.4.9")),
    known(409, "Conflict", "The request could not be completed due to a conflict with the current state of the resource", Http("#sec10.4.10")),
    known(410, "Gone", "The requested resource is no longer available at the server and no forwarding address is known", Http("#sec10.4.11")),
    known(411, "Length Required", "The server refuses to accept the request without a defined content length", Http("#sec10.4.12")),
    known(412, "Precondition Failed", "The precondition given in one or more of the request header fields evaluated to false when it was tested on the server", Http("#sec10.4.13")),
    known(413, "Request Entity Too Large", "The server is refusing to process a request because the request entity is larger than the server is willing or able to process", Http("#sec10.4.14")),
    known(414, "Request URI Too Long", "The server is refusing to service the request because the request URI is longer than the server is willing to interpret", Http("#sec10.4.15")),
    known(415, "Unsupported Media Type", "The server is refusing to service the request because the entity of the request is in a format not supported by the requested resource for the requested method", Http("#sec10.4.16")),
    known(416, "Requested Range Not Satisfiable", "For byte ranges, this means that the first byte position were greater than the current length of the selected resource", Http("#sec10.4.17")),
    known(417, "Expectation Failed", "The expectation given in the request header could not be met by this server", Http("#sec10.4.18")),
    known(422, "Unprocessable Entity", "The server understands the content type of the request entity and the syntax of the request entity is correct but was unable to process the contained instructions", Webdav("#STATUS_422")),
    known(423, "Locked", "The source or destination resource of a method is locked", Webdav("#STATUS_423")),
    known(424, "Failed Dependency", "The method could not be performed on the resource because the requested action depended on another action and that action failed", Webdav("#STATUS_424")),
    known(500, "Internal Server Error", "The server encountered an unexpected condition which prevented it from fulfilling the request", Http("#sec10.5.1")),
    known(501, "Not Implemented", "The server does not support the functionality required to fulfill the request", Http("#sec10.5.2")),
    known(502, "Bad Gateway", "The server, while acting as a gateway or proxy, received an invalid response from the upstream server it accessed in attempting to fulfill the request", Http("#sec10.5.3")),
    known(503, "Service Unavailable", "The server is currently unable to handle the request due to a temporary overloading or maintenance of the server", Http("#sec10.5.4")),
    known(504, "Gateway Timeout", "The server, while acting as a gateway or proxy, did not receive a timely response from the upstream server specified by the URI (e.g. HTTP, FTP, LDAP) or some other auxiliary server (e.g. DNS) it needed to access in attempting to complete the request", Http("#sec10.5.5")),
    known(505, "Version Not Supported", "The server does not support, or refuses to support, the protocol version that was used in the request message", Http("#sec10.5.6")),
    known(507, "Insufficient Storage", "The method could not be performed on the resource because the server is unable to store the representation needed to successfully complete the request", Webdav("#STATUS_507")),
    known(1000, "Connection Error", "The connector failed to connect to the server", Restlet("org/restlet/data/Status.html#CONNECTOR_ERROR_CONNECTION")),
    known(1001, "Communication Error", "The connector failed to complete the communication with the server", Restlet("org/restlet/data/Status.html#CONNECTOR_ERROR_COMMUNICATION")),
    known(1002, "Internal Connector Error", "The connector encountered an unexpected condition which prevented it from fulfilling the request", Restlet("org/restlet/data/Status.html#CONNECTOR_ERROR_INTERNAL")),
];

fn lookup(code: u16) -> Option<&'static Known> {
    KNOWN
        .binary_search_by_key(&code, |k| k.code)
        .ok()
        .map(|i| &KNOWN[i])
}

/// Standard reason phrase for `code`, if it is a known status.
pub fn code_to_reason_phrase(code: u16) -> Option<&'static str> {
    lookup(code).map(|k| k.phrase)
}

/// Human-readable description for `code`, if it is a known status.
pub fn code_to_description(code: u16) -> Option<&'static str> {
    lookup(code).map(|k| k.description)
}

/// Reference documentation URI for `code`, if it is a known status.
pub fn code_to_reference_uri(code: u16) -> Option<String> {
    lookup(code).map(|k| match k.reference {
        Http(fragment) => format!("{BASE_HTTP}{fragment}"),
        Webdav(fragment) => format!("{BASE_WEBDAV}{fragment}"),
        Warning => WARNING_URI.to_string(),
        Restlet(path) => format!("{BASE_RESTLET}{path}"),
    })
}

pub fn is_informational(code: u16) -> bool {
    (100..=199).contains(&code)
}

pub fn is_success(code: u16) -> bool {
    (200..=299).contains(&code)
}

pub fn is_redirection(code: u16) -> bool {
    (300..=399).contains(&code)
}

pub fn is_client_error(code: u16) -> bool {
    (400..=499).contains(&code)
}

pub fn is_server_error(code: u16) -> bool {
    (500..=599).contains(&code)
}

/// Codes 600-699 are reserved for global errors and never produced here.
pub fn is_global_error(code: u16) -> bool {
    (600..=699).contains(&code)
}

pub fn is_connector_error(code: u16) -> bool {
    (1000..=1099).contains(&code)
}

pub fn is_error(code: u16) -> bool {
    is_client_error(code) || is_server_error(code) || is_connector_error(code)
}

/// A response status: numeric code plus optional overrides of the standard
/// reason phrase, description and reference URI.
#[derive(Debug, Clone)]
pub struct Status {
    code: u16,
    reason_phrase: Option<Cow<'static, str>>,
    description: Option<Cow<'static, str>>,
    uri: Option<Cow<'static, str>>,
}

impl Status {
    pub const INFO_CONTINUE: Status = Status::code_only(100);
    pub const INFO_SWITCHING_PROTOCOL: Status = Status::code_only(101);
    pub const INFO_PROCESSING: Status = Status::code_only(102);
    pub const INFO_STALE_RESPONSE: Status = Status::code_only(110);
    pub const INFO_REVALIDATION_FAILED: Status = Status::code_only(111);
    pub const INFO_DISCONNECTED_OPERATION: Status = Status::code_only(112);
    pub const INFO_HEURISTIC_EXPIRATION: Status = Status::code_only(113);
    pub const INFO_MISC_WARNING: Status = Status::code_only(199);

    pub const SUCCESS_OK: Status = Status::code_only(200);
    pub const SUCCESS_CREATED: Status = Status::code_only(201);
    pub const SUCCESS_ACCEPTED: Status = Status::code_only(202);
    pub const SUCCESS_NON_AUTHORITATIVE: Status = Status::code_only(203);
    pub const SUCCESS_NO_CONTENT: Status = Status::code_only(204);
    pub const SUCCESS_RESET_CONTENT: Status = Status::code_only(205);
    pub const SUCCESS_PARTIAL_CONTENT: Status = Status::code_only(206);
    pub const SUCCESS_MULTI_STATUS: Status = Status::code_only(207);
    pub const SUCCESS_TRANSFORMATION_APPLIED: Status = Status::code_only(214);
    pub const SUCCESS_MISC_PERSISTENT_WARNING: Status = Status::code_only(299);

    pub const REDIRECTION_MULTIPLE_CHOICES: Status = Status::code_only(300);
    pub const REDIRECTION_PERMANENT: Status = Status::code_only(301);
    pub const REDIRECTION_FOUND: Status = Status::code_only(302);
    pub const REDIRECTION_SEE_OTHER: Status = Status::code_only(303);
    pub const REDIRECTION_NOT_MODIFIED: Status = Status::code_only(304);
    pub const REDIRECTION_USE_PROXY: Status = Status::code_only(305);
    pub const REDIRECTION_TEMPORARY: Status = Status::code_only(307);

    pub const CLIENT_ERROR_BAD_REQUEST: Status = Status::code_only(400);
    pub const CLIENT_ERROR_UNAUTHORIZED: Status = Status::code_only(401);
    pub const CLIENT_ERROR_PAYMENT_REQUIRED: Status = Status::code_only(402);
    pub const CLIENT_ERROR_FORBIDDEN: Status = Status::code_only(403);
    pub const CLIENT_ERROR_NOT_FOUND: Status = Status::code_only(404);
    pub const CLIENT_ERROR_METHOD_NOT_ALLOWED: Status = Status::code_only(405);
    pub const CLIENT_ERROR_NOT_ACCEPTABLE: Status = Status::code_only(406);
    pub const CLIENT_ERROR_PROXY_AUTHENTIFICATION_REQUIRED: Status = Status::code_only(407);
    pub const CLIENT_ERROR_REQUEST_TIMEOUT: Status = Status::code_only(408);
    pub const CLIENT_ERROR_CONFLICT: Status = Status::code_only(409);
    pub const CLIENT_ERROR_GONE: Status = Status::code_only(410);
    pub const CLIENT_ERROR_LENGTH_REQUIRED: Status = Status::code_only(411);
    pub const CLIENT_ERROR_PRECONDITION_FAILED: Status = Status::code_only(412);
    pub const CLIENT_ERROR_REQUEST_ENTITY_TOO_LARGE: Status = Status::code_only(413);
    pub const CLIENT_ERROR_REQUEST_URI_TOO_LONG: Status = Status::code_only(414);
    pub const CLIENT_ERROR_UNSUPPORTED_MEDIA_TYPE: Status = Status::code_only(415);
    pub const CLIENT_ERROR_REQUESTED_RANGE_NOT_SATISFIABLE: Status = Status::code_only(416);
    pub const CLIENT_ERROR_EXPECTATION_FAILED: Status = Status::code_only(417);
    pub const CLIENT_ERROR_UNPROCESSABLE_ENTITY: Status = Status::code_only(422);
    pub const CLIENT_ERROR_LOCKED: Status = Status::code_only(423);
    pub const CLIENT_ERROR_FAILED_DEPENDENCY: Status = Status::code_only(424);

    pub const SERVER_ERROR_INTERNAL: Status = Status::code_only(500);
    pub const SERVER_ERROR_NOT_IMPLEMENTED: Status = Status::code_only(501);
    pub const SERVER_ERROR_BAD_GATEWAY: Status = Status::code_only(502);
    pub const SERVER_ERROR_SERVICE_UNAVAILABLE: Status = Status::code_only(503);
    pub const SERVER_ERROR_GATEWAY_TIMEOUT: Status = Status::code_only(504);
    pub const SERVER_ERROR_VERSION_NOT_SUPPORTED: Status = Status::code_only(505);
    pub const SERVER_ERROR_INSUFFICIENT_STORAGE: Status = Status::code_only(507);

    pub const CONNECTOR_ERROR_CONNECTION: Status = Status::code_only(1000);
    pub const CONNECTOR_ERROR_COMMUNICATION: Status = Status::code_only(1001);
    pub const CONNECTOR_ERROR_INTERNAL: Status = Status::code_only(1002);

    const fn code_only(code: u16) -> Self {
        Self {
            code,
            reason_phrase: None,
            description: None,
            uri: None,
        }
    }

    /// The status for `code`. Known codes resolve their phrase, description
    /// and URI from the standard table; unknown codes have none of them.
    pub fn from_code(code: u16) -> Self {
        Self::code_only(code)
    }

    /// A status with a reason phrase received from the wire. `None` keeps
    /// the standard phrase.
    pub fn with_reason(code: u16, reason_phrase: Option<String>) -> Result<Self, InvalidReasonPhrase> {
        if let Some(phrase) = &reason_phrase {
            if phrase.contains('\n') || phrase.contains('\r') {
                return Err(InvalidReasonPhrase);
            }
        }
        Ok(Self {
            reason_phrase: reason_phrase.map(Cow::Owned),
            ..Self::code_only(code)
        })
    }

    /// Copy of this status carrying a custom description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Cow::Owned(description.into()));
        self
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn reason_phrase(&self) -> Option<&str> {
        self.reason_phrase
            .as_deref()
            .or_else(|| code_to_reason_phrase(self.code))
    }

    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .or_else(|| code_to_description(self.code))
    }

    pub fn uri(&self) -> Option<Cow<'_, str>> {
        match &self.uri {
            Some(uri) => Some(Cow::Borrowed(uri.as_ref())),
            None => code_to_reference_uri(self.code).map(Cow::Owned),
        }
    }

    pub fn is_informational(&self) -> bool {
        is_informational(self.code)
    }

    pub fn is_success(&self) -> bool {
        is_success(self.code)
    }

    pub fn is_redirection(&self) -> bool {
        is_redirection(self.code)
    }

    pub fn is_client_error(&self) -> bool {
        is_client_error(self.code)
    }

    pub fn is_server_error(&self) -> bool {
        is_server_error(self.code)
    }

    pub fn is_connector_error(&self) -> bool {
        is_connector_error(self.code)
    }

    pub fn is_global_error(&self) -> bool {
        is_global_error(self.code)
    }

    pub fn is_error(&self) -> bool {
        is_error(self.code)
    }

    /// Whether retrying the same request later may succeed.
    pub fn is_recoverable_error(&self) -> bool {
        self.is_connector_error()
            || *self == Status::CLIENT_ERROR_REQUEST_TIMEOUT
            || *self == Status::SERVER_ERROR_GATEWAY_TIMEOUT
            || *self == Status::SERVER_ERROR_SERVICE_UNAVAILABLE
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::SUCCESS_OK
    }
}

impl PartialEq for Status {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Status {}

impl Hash for Status {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.reason_phrase().unwrap_or(""), self.code)?;
        if let Some(description) = self.description() {
            write!(f, " - {description}")?;
        }
        Ok(())
    }
}
