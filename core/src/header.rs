//! Mapping between flat header lists and message fields.
//!
//! # Design
//! Headers travel as an ordered `Vec<Parameter>`; duplicates are kept in
//! place. [`add_header`] is the only way a header gets appended. Parsing is
//! forgiving: a malformed value is logged and skipped, never returned as an
//! error, so one bad header cannot fail a whole response.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::data::{
    CacheDirective, ContentRange, ContentType, Digest, Disposition, Method, Parameter, Tag,
};
use crate::error::HeaderError;
use crate::message::{Message, Request, Response};
use crate::reference::Reference;
use crate::representation::{Representation, UNKNOWN_SIZE};
use crate::status::Status;

pub const ACCEPT: &str = "Accept";
pub const AGE: &str = "Age";
pub const ALLOW: &str = "Allow";
pub const AUTHORIZATION: &str = "Authorization";
pub const CACHE_CONTROL: &str = "Cache-Control";
pub const CONNECTION: &str = "Connection";
pub const CONTENT_DISPOSITION: &str = "Content-Disposition";
pub const CONTENT_ENCODING: &str = "Content-Encoding";
pub const CONTENT_LANGUAGE: &str = "Content-Language";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_LOCATION: &str = "Content-Location";
pub const CONTENT_MD5: &str = "Content-MD5";
pub const CONTENT_RANGE: &str = "Content-Range";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const DATE: &str = "Date";
pub const ETAG: &str = "ETag";
pub const EXPIRES: &str = "Expires";
pub const HOST: &str = "Host";
pub const LAST_MODIFIED: &str = "Last-Modified";
pub const LOCATION: &str = "Location";
pub const REFERRER: &str = "Referer";
pub const RETRY_AFTER: &str = "Retry-After";
pub const SERVER: &str = "Server";
pub const TRANSFER_ENCODING: &str = "Transfer-Encoding";
pub const USER_AGENT: &str = "User-Agent";

/// Headers owned by the message model. Callers cannot set them as
/// extension headers.
pub const STANDARD_HEADERS: &[&str] = &[
    "Access-Control-Allow-Credentials",
    "Access-Control-Allow-Headers",
    "Access-Control-Allow-Methods",
    "Access-Control-Allow-Origin",
    "Access-Control-Expose-Headers",
    "Access-Control-Max-Age",
    "Access-Control-Request-Headers",
    "Access-Control-Request-Method",
    ACCEPT,
    "Accept-Charset",
    "Accept-Encoding",
    "Accept-Language",
    "Accept-Patch",
    "Accept-Ranges",
    AGE,
    ALLOW,
    "Authentication-Info",
    AUTHORIZATION,
    CACHE_CONTROL,
    CONNECTION,
    CONTENT_DISPOSITION,
    CONTENT_ENCODING,
    CONTENT_LANGUAGE,
    CONTENT_LENGTH,
    CONTENT_LOCATION,
    CONTENT_MD5,
    CONTENT_RANGE,
    CONTENT_TYPE,
    "Cookie",
    DATE,
    ETAG,
    "Expect",
    EXPIRES,
    "From",
    HOST,
    "If-Match",
    "If-Modified-Since",
    "If-None-Match",
    "If-Range",
    "If-Unmodified-Since",
    LAST_MODIFIED,
    LOCATION,
    "Max-Forwards",
    "Proxy-Authenticate",
    "Proxy-Authorization",
    "Range",
    REFERRER,
    RETRY_AFTER,
    SERVER,
    "Set-Cookie",
    "Set-Cookie2",
    USER_AGENT,
    "Vary",
    "Via",
    "Warning",
    "WWW-Authenticate",
];

/// Standard headers the model does not cover yet. They pass through with a
/// warning.
pub const UNSUPPORTED_STANDARD_HEADERS: &[&str] =
    &["Pragma", "Trailer", TRANSFER_ENCODING, "TE", "Upgrade"];

fn contains_ignore_case(set: &[&str], name: &str) -> bool {
    set.iter().any(|h| h.eq_ignore_ascii_case(name))
}

pub fn is_standard_header(name: &str) -> bool {
    contains_ignore_case(STANDARD_HEADERS, name)
}

/// Append `name: value`, unless either is empty.
pub fn add_header(name: &str, value: &str, headers: &mut Vec<Parameter>) {
    if name.is_empty() || value.is_empty() {
        return;
    }
    headers.push(Parameter::new(name, value));
}

/// Value of the first header named `name`.
pub fn first_value<'a>(headers: &'a [Parameter], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|p| p.has_name(name))
        .map(|p| p.value.as_str())
}

/// Append caller-supplied headers, dropping the standard ones.
pub fn add_extension_headers(headers: &mut Vec<Parameter>, additional: &[Parameter]) {
    for header in additional {
        if is_standard_header(&header.name) {
            warn!(
                header = %header.name,
                "addition of a standard header is not allowed, use the matching message property"
            );
        } else if contains_ignore_case(UNSUPPORTED_STANDARD_HEADERS, &header.name) {
            warn!(
                header = %header.name,
                "addition of this standard header is discouraged"
            );
            headers.push(header.clone());
        } else {
            headers.push(header.clone());
        }
    }
}

/// Cache-Control and Date. A message without a date is stamped with the
/// current time.
pub fn add_general_headers<M: Message>(message: &mut M, headers: &mut Vec<Parameter>) {
    add_header(
        CACHE_CONTROL,
        &CacheDirective::format_all(message.cache_directives()),
        headers,
    );
    let date = match message.date() {
        Some(date) => date,
        None => {
            let now = Utc::now();
            message.set_date(Some(now));
            now
        }
    };
    add_header(DATE, &format_date(&date), headers);
}

/// Request headers in wire order: Accept, Host, Referer, User-Agent, the
/// caller's extension headers, then Authorization.
pub fn add_request_headers(request: &Request, headers: &mut Vec<Parameter>) {
    add_header(ACCEPT, &request.client_info.accept_header(), headers);

    if let Some(host) = request.reference.host_header() {
        add_header(HOST, &host, headers);
    }
    if let Some(referrer) = &request.referrer {
        add_header(REFERRER, referrer.as_str(), headers);
    }
    if let Some(agent) = &request.client_info.agent {
        add_header(USER_AGENT, agent, headers);
    }

    add_extension_headers(headers, request.headers());

    if let Some(challenge) = &request.challenge_response {
        add_header(AUTHORIZATION, &challenge.authorization_header(), headers);
    }
}

/// Headers describing a response, for the serving side of an exchange.
pub fn add_response_headers(response: &Response, headers: &mut Vec<Parameter>) {
    if let Some(age) = response.age.filter(|age| *age > 0) {
        add_header(AGE, &age.to_string(), headers);
    }
    if response.status == Status::CLIENT_ERROR_METHOD_NOT_ALLOWED
        || response.request.method == Method::OPTIONS
    {
        let allowed = response
            .allowed_methods
            .iter()
            .map(Method::name)
            .collect::<Vec<_>>()
            .join(", ");
        add_header(ALLOW, &allowed, headers);
    }
    if let Some(location) = &response.location_ref {
        add_header(LOCATION, location.as_str(), headers);
    }
    if let Some(retry_after) = &response.retry_after {
        add_header(RETRY_AFTER, &format_date(retry_after), headers);
    }
    let agent = response
        .server_info
        .agent
        .as_deref()
        .unwrap_or(crate::config::DEFAULT_AGENT);
    add_header(SERVER, agent, headers);
}

/// Entity headers. A missing or unavailable entity is announced with a
/// zero `Content-Length`.
pub fn add_entity_headers(entity: Option<&Representation>, headers: &mut Vec<Parameter>) {
    match entity {
        Some(e) if e.is_available() => {
            if e.size != UNKNOWN_SIZE {
                add_header(CONTENT_LENGTH, &e.size.to_string(), headers);
            }
        }
        _ => add_header(CONTENT_LENGTH, "0", headers),
    }
    if let Some(entity) = entity {
        add_entity_metadata(entity, headers);
    }
}

fn add_entity_metadata(entity: &Representation, headers: &mut Vec<Parameter>) {
    let variant = &entity.info.variant;
    add_header(CONTENT_ENCODING, &variant.encodings.join(", "), headers);
    add_header(CONTENT_LANGUAGE, &variant.languages.join(", "), headers);
    if let Some(location) = &variant.location_ref {
        add_header(CONTENT_LOCATION, location.as_str(), headers);
    }
    if let Some(digest) = &entity.digest {
        add_header(CONTENT_MD5, &digest.to_string(), headers);
    }
    if let Some(range) = &entity.range {
        add_header(CONTENT_RANGE, &range.to_string(), headers);
    }
    if let Some(media_type) = &variant.media_type {
        let content_type = ContentType {
            media_type: media_type.clone(),
            character_set: variant.character_set.clone(),
        };
        add_header(CONTENT_TYPE, &content_type.to_string(), headers);
    }
    if let Some(expires) = &entity.expiration_date {
        add_header(EXPIRES, &format_date(expires), headers);
    }
    if let Some(modified) = &entity.info.modification_date {
        add_header(LAST_MODIFIED, &format_date(modified), headers);
    }
    if let Some(tag) = &entity.info.tag {
        add_header(ETAG, &tag.to_string(), headers);
    }
    if let Some(disposition) = &entity.disposition {
        if disposition.kind != Disposition::TYPE_NONE {
            add_header(CONTENT_DISPOSITION, &disposition.to_string(), headers);
        }
    }
}

/// Populate a representation from entity headers in one scan.
///
/// Returns `None` when no representation was given and no entity header
/// was found. A header only counts as found when its value parses.
/// A relative `Content-Location` is resolved against `base`.
pub fn extract_entity_headers(
    headers: &[Parameter],
    representation: Option<Representation>,
    base: Option<&Reference>,
) -> Option<Representation> {
    let had_representation = representation.is_some();
    let mut result = representation.unwrap_or_default();
    let mut found = false;

    for header in headers {
        match apply_entity_header(header, &mut result, base) {
            Ok(true) => found = true,
            Ok(false) => {}
            Err(e) => warn!(header = %header.name, error = %e, "ignoring malformed entity header"),
        }
    }

    (had_representation || found).then_some(result)
}

/// Ok(true) when `header` is an entity header and was applied.
fn apply_entity_header(
    header: &Parameter,
    r: &mut Representation,
    base: Option<&Reference>,
) -> Result<bool, HeaderError> {
    let value = header.value.as_str();
    let name = header.name.as_str();
    let is = |candidate: &str| name.eq_ignore_ascii_case(candidate);

    if is(CONTENT_TYPE) {
        let content_type = ContentType::parse(value);
        r.info.variant.media_type = Some(content_type.media_type);
        if content_type.character_set.is_some() {
            r.info.variant.character_set = content_type.character_set;
        }
    } else if is(CONTENT_LENGTH) {
        // Presence only; the size is computed by the adapter.
    } else if is(EXPIRES) {
        r.expiration_date = Some(parse_date(value)?);
    } else if is(CONTENT_ENCODING) {
        r.info.variant.encodings.extend(split_list(value));
    } else if is(CONTENT_LANGUAGE) {
        r.info.variant.languages.extend(split_list(value));
    } else if is(LAST_MODIFIED) {
        r.info.modification_date = Some(parse_date(value)?);
    } else if is(ETAG) {
        r.info.tag = Some(Tag::parse(value)?);
    } else if is(CONTENT_LOCATION) {
        let location = match base {
            Some(base) => base.resolve(value.trim()),
            None => Reference::parse(value.trim()),
        }
        .map_err(|e| HeaderError::Location(format!("{value}: {e}")))?;
        r.info.variant.location_ref = Some(location);
    } else if is(CONTENT_DISPOSITION) {
        r.disposition = Some(Disposition::parse(value)?);
    } else if is(CONTENT_RANGE) {
        r.range = Some(ContentRange::parse(value)?);
    } else if is(CONTENT_MD5) {
        r.digest = Some(Digest::parse(value)?);
    } else {
        return Ok(false);
    }
    Ok(true)
}

/// Copy the response headers the transport hands back onto the response
/// fields: Location, Age, Date, Retry-After, Server, Allow and
/// Cache-Control.
pub fn copy_response_transport_headers(headers: &[Parameter], response: &mut Response) {
    for header in headers {
        let value = header.value.as_str();
        let name = header.name.as_str();
        let is = |candidate: &str| name.eq_ignore_ascii_case(candidate);

        if is(LOCATION) {
            match response.request.reference.resolve(value) {
                Ok(location) => response.location_ref = Some(location),
                Err(e) => warn!(value, error = %e, "ignoring invalid Location header"),
            }
        } else if is(AGE) {
            match value.trim().parse() {
                Ok(age) => response.age = Some(age),
                Err(_) => warn!(value, "ignoring invalid Age header"),
            }
        } else if is(DATE) {
            let date = parse_date(value).unwrap_or_else(|e| {
                warn!(error = %e, "invalid Date header, using the current time");
                Utc::now()
            });
            response.set_date(Some(date));
        } else if is(RETRY_AFTER) {
            match parse_retry_after(value) {
                Ok(date) => response.retry_after = Some(date),
                Err(e) => warn!(error = %e, "ignoring invalid Retry-After header"),
            }
        } else if is(SERVER) {
            response.server_info.agent = Some(value.to_string());
        } else if is(ALLOW) {
            response
                .allowed_methods
                .extend(split_list(value).map(|m| Method::value_of(&m)));
        } else if is(CACHE_CONTROL) {
            response
                .core_mut()
                .cache_directives
                .extend(CacheDirective::parse_all(value));
        }
    }
}

/// The declared `Content-Length`, if present and numeric.
pub fn content_length(headers: &[Parameter]) -> Option<u64> {
    first_value(headers, CONTENT_LENGTH).and_then(|v| v.trim().parse().ok())
}

pub fn is_chunked_encoding(headers: &[Parameter]) -> bool {
    headers
        .iter()
        .filter(|p| p.has_name(TRANSFER_ENCODING))
        .flat_map(|p| p.value.split(','))
        .any(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse an HTTP date (RFC 1123 form, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`).
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, HeaderError> {
    DateTime::parse_from_rfc2822(value.trim())
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| HeaderError::Date(format!("{value}: {e}")))
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// `Retry-After` carries either an HTTP date or a delay in seconds.
fn parse_retry_after(value: &str) -> Result<DateTime<Utc>, HeaderError> {
    if let Ok(seconds) = value.trim().parse::<i64>() {
        return Duration::try_seconds(seconds)
            .and_then(|delay| Utc::now().checked_add_signed(delay))
            .ok_or_else(|| HeaderError::Number(value.to_string()));
    }
    parse_date(value)
}
