//! Immutable descriptors exchanged between messages and the header mapper.
//!
//! # Design
//! Every descriptor with a fixed, well-known set of values (protocols,
//! methods, media types, character sets) exposes those values as associated
//! `const`s built from `Cow::Borrowed`, so the common case never allocates
//! and values read from the wire still fit in the same type. Equality
//! follows the name only.

use std::borrow::Cow;
use std::fmt;

use base64::Engine as _;

use crate::error::HeaderError;

/// A transport protocol such as HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Protocol {
    pub scheme_name: &'static str,
    pub name: &'static str,
    pub technical_name: &'static str,
    pub description: &'static str,
    pub default_port: u16,
    pub confidential: bool,
    pub version: &'static str,
}

impl Protocol {
    pub const HTTP: Protocol = Protocol {
        scheme_name: "http",
        name: "HTTP",
        technical_name: "HTTP",
        description: "HyperText Transport Protocol",
        default_port: 80,
        confidential: false,
        version: "1.1",
    };

    pub const HTTPS: Protocol = Protocol {
        scheme_name: "https",
        name: "HTTPS",
        technical_name: "HTTP",
        description: "HyperText Transport Protocol (Secure)",
        default_port: 443,
        confidential: true,
        version: "1.1",
    };

    /// The known protocol for a URI scheme, compared case-insensitively.
    pub fn from_scheme(scheme: &str) -> Option<Protocol> {
        [Protocol::HTTP, Protocol::HTTPS]
            .into_iter()
            .find(|p| p.scheme_name.eq_ignore_ascii_case(scheme))
    }
}

const BASE_METHOD_URI: &str = "http://www.w3.org/Protocols/rfc2616/rfc2616-sec9.html";

/// A request method with its safety and idempotence properties.
#[derive(Debug, Clone)]
pub struct Method {
    name: Cow<'static, str>,
    description: Option<&'static str>,
    section: Option<&'static str>,
    safe: bool,
    idempotent: bool,
}

impl Method {
    pub const CONNECT: Method = Method::standard(
        "CONNECT",
        "Used with a proxy that can dynamically switch to being a tunnel",
        "#sec9.9",
        false,
        false,
    );
    pub const DELETE: Method = Method::standard(
        "DELETE",
        "Requests that the origin server deletes the resource identified by the request URI",
        "#sec9.7",
        false,
        true,
    );
    pub const GET: Method = Method::standard(
        "GET",
        "Retrieves whatever information (in the form of an entity) that is identified by the request URI",
        "#sec9.3",
        true,
        true,
    );
    pub const HEAD: Method = Method::standard(
        "HEAD",
        "Identical to GET except that the server must not return a message body in the response",
        "#sec9.4",
        true,
        true,
    );
    pub const OPTIONS: Method = Method::standard(
        "OPTIONS",
        "Requests for information about the communication options available on the request/response chain identified by the URI",
        "#sec9.2",
        true,
        true,
    );
    pub const POST: Method = Method::standard(
        "POST",
        "Requests that the origin server accepts the entity enclosed in the request as a new subordinate of the resource identified by the request URI",
        "#sec9.5",
        false,
        false,
    );
    pub const PUT: Method = Method::standard(
        "PUT",
        "Requests that the enclosed entity be stored under the supplied request URI",
        "#sec9.6",
        false,
        true,
    );
    pub const TRACE: Method = Method::standard(
        "TRACE",
        "Used to invoke a remote, application-layer loop-back of the request message",
        "#sec9.8",
        true,
        true,
    );

    const ALL: [Method; 8] = [
        Method::CONNECT,
        Method::DELETE,
        Method::GET,
        Method::HEAD,
        Method::OPTIONS,
        Method::POST,
        Method::PUT,
        Method::TRACE,
    ];

    const fn standard(
        name: &'static str,
        description: &'static str,
        section: &'static str,
        safe: bool,
        idempotent: bool,
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            description: Some(description),
            section: Some(section),
            safe,
            idempotent,
        }
    }

    /// The standard method named `name`, or an extension method that is
    /// neither safe nor idempotent.
    pub fn value_of(name: &str) -> Method {
        Method::ALL
            .into_iter()
            .find(|m| m.name == name)
            .unwrap_or_else(|| Method {
                name: Cow::Owned(name.to_string()),
                description: None,
                section: None,
                safe: false,
                idempotent: false,
            })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description
    }

    pub fn spec_uri(&self) -> Option<String> {
        self.section.map(|s| format!("{BASE_METHOD_URI}{s}"))
    }

    pub fn is_safe(&self) -> bool {
        self.safe
    }

    pub fn is_idempotent(&self) -> bool {
        self.idempotent
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Method {}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A media type such as `application/json`, without parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType(Cow<'static, str>);

impl MediaType {
    pub const ALL: MediaType = MediaType(Cow::Borrowed("*/*"));
    pub const APPLICATION_JSON: MediaType = MediaType(Cow::Borrowed("application/json"));
    pub const TEXT_JSON: MediaType = MediaType(Cow::Borrowed("text/json"));
    pub const APPLICATION_XML: MediaType = MediaType(Cow::Borrowed("application/xml"));
    pub const TEXT_XML: MediaType = MediaType(Cow::Borrowed("text/xml"));
    pub const TEXT_PLAIN: MediaType = MediaType(Cow::Borrowed("text/plain"));

    pub fn new(name: impl Into<String>) -> Self {
        MediaType(Cow::Owned(name.into()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_json(&self) -> bool {
        *self == MediaType::APPLICATION_JSON || *self == MediaType::TEXT_JSON
    }

    pub fn is_xml(&self) -> bool {
        *self == MediaType::APPLICATION_XML || *self == MediaType::TEXT_XML
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A character set name such as `UTF-8`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CharacterSet(Cow<'static, str>);

impl CharacterSet {
    pub const UTF_8: CharacterSet = CharacterSet(Cow::Borrowed("UTF-8"));
    pub const ISO_8859_1: CharacterSet = CharacterSet(Cow::Borrowed("ISO-8859-1"));

    pub fn new(name: impl Into<String>) -> Self {
        CharacterSet(Cow::Owned(name.into()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// One name/value pair; the uniform shape of a header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// The parsed value of a `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    pub media_type: MediaType,
    pub character_set: Option<CharacterSet>,
}

impl ContentType {
    pub fn parse(value: &str) -> Self {
        let mut parts = value.split(';');
        let media_type = MediaType::new(parts.next().unwrap_or("").trim());
        let character_set = parts
            .filter_map(|p| p.split_once('='))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
            .map(|(_, v)| CharacterSet::new(v.trim().trim_matches('"')));
        Self {
            media_type,
            character_set,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.media_type.name())?;
        if let Some(charset) = &self.character_set {
            write!(f, "; charset={}", charset.name())?;
        }
        Ok(())
    }
}

/// An entity tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub weak: bool,
}

impl Tag {
    pub fn parse(value: &str) -> Result<Self, HeaderError> {
        let value = value.trim();
        let (weak, rest) = match value.strip_prefix("W/") {
            Some(rest) => (true, rest),
            None => (false, value),
        };
        if rest == "*" {
            return Ok(Tag {
                name: "*".to_string(),
                weak,
            });
        }
        match rest.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
            Some(name) => Ok(Tag {
                name: name.to_string(),
                weak,
            }),
            None => Err(HeaderError::Tag(value.to_string())),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == "*" {
            return f.write_str("*");
        }
        if self.weak {
            f.write_str("W/")?;
        }
        write!(f, "\"{}\"", self.name)
    }
}

/// The parsed value of a `Content-Disposition` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disposition {
    pub kind: String,
    pub parameters: Vec<Parameter>,
}

impl Disposition {
    pub const TYPE_NONE: &'static str = "none";

    pub fn parse(value: &str) -> Result<Self, HeaderError> {
        let mut parts = value.split(';');
        let kind = parts.next().unwrap_or("").trim();
        if kind.is_empty() || kind.contains('=') {
            return Err(HeaderError::Disposition(value.to_string()));
        }
        let mut parameters = Vec::new();
        for part in parts.map(str::trim).filter(|p| !p.is_empty()) {
            let (name, v) = part
                .split_once('=')
                .ok_or_else(|| HeaderError::Disposition(value.to_string()))?;
            parameters.push(Parameter::new(name.trim(), v.trim().trim_matches('"')));
        }
        Ok(Self {
            kind: kind.to_ascii_lowercase(),
            parameters,
        })
    }

    pub fn filename(&self) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.has_name("filename"))
            .map(|p| p.value.as_str())
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind)?;
        for p in &self.parameters {
            write!(f, "; {}=\"{}\"", p.name, p.value)?;
        }
        Ok(())
    }
}

/// A byte range carried by `Content-Range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub index: u64,
    pub size: u64,
    /// Total size of the full entity, `None` when the peer sent `*`.
    pub instance_size: Option<u64>,
}

impl ContentRange {
    pub fn parse(value: &str) -> Result<Self, HeaderError> {
        let err = || HeaderError::Range(value.to_string());
        let bytes = value.trim().strip_prefix("bytes").ok_or_else(err)?.trim();
        let (range, total) = bytes.split_once('/').ok_or_else(err)?;
        let (first, last) = range.split_once('-').ok_or_else(err)?;
        let first: u64 = first.trim().parse().map_err(|_| err())?;
        let last: u64 = last.trim().parse().map_err(|_| err())?;
        if last < first {
            return Err(err());
        }
        let instance_size = match total.trim() {
            "*" => None,
            n => Some(n.parse().map_err(|_| err())?),
        };
        Ok(Self {
            index: first,
            size: (last - first).checked_add(1).ok_or_else(err)?,
            instance_size,
        })
    }
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.index + self.size.saturating_sub(1);
        write!(f, "bytes {}-{}/", self.index, last)?;
        match self.instance_size {
            Some(n) => write!(f, "{n}"),
            None => f.write_str("*"),
        }
    }
}

/// An MD5 digest from `Content-MD5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest(pub Vec<u8>);

impl Digest {
    pub fn parse(value: &str) -> Result<Self, HeaderError> {
        base64::engine::general_purpose::STANDARD
            .decode(value.trim())
            .map(Digest)
            .map_err(|e| HeaderError::Digest(e.to_string()))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base64::engine::general_purpose::STANDARD.encode(&self.0))
    }
}

/// One `Cache-Control` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDirective {
    pub name: String,
    pub value: Option<String>,
}

impl CacheDirective {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn no_cache() -> Self {
        Self::new("no-cache", None)
    }

    pub fn max_age(seconds: u32) -> Self {
        Self::new("max-age", Some(seconds.to_string()))
    }

    /// Parse a comma-separated `Cache-Control` value.
    pub fn parse_all(value: &str) -> Vec<CacheDirective> {
        value
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| match d.split_once('=') {
                Some((name, v)) => {
                    CacheDirective::new(name.trim(), Some(v.trim().trim_matches('"').to_string()))
                }
                None => CacheDirective::new(d, None),
            })
            .collect()
    }

    pub fn format_all(directives: &[CacheDirective]) -> String {
        directives
            .iter()
            .map(CacheDirective::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for CacheDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{}={}", self.name, v),
            None => f.write_str(&self.name),
        }
    }
}

/// Credentials sent in the `Authorization` header. Only HTTP Basic is
/// formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeResponse {
    pub identifier: String,
    pub secret: String,
}

impl ChallengeResponse {
    pub fn basic(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    pub fn authorization_header(&self) -> String {
        let raw = format!("{}:{}", self.identifier, self.secret);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_from_scheme() {
        assert_eq!(Protocol::from_scheme("HTTP"), Some(Protocol::HTTP));
        assert_eq!(Protocol::from_scheme("https").map(|p| p.default_port), Some(443));
        assert!(Protocol::from_scheme("ftp").is_none());
    }

    #[test]
    fn method_value_of() {
        let get = Method::value_of("GET");
        assert_eq!(get, Method::GET);
        assert!(get.is_safe() && get.is_idempotent());
        assert_eq!(
            get.spec_uri().as_deref(),
            Some("http://www.w3.org/Protocols/rfc2616/rfc2616-sec9.html#sec9.3")
        );

        let patch = Method::value_of("PATCH");
        assert_eq!(patch.name(), "PATCH");
        assert!(!patch.is_safe() && !patch.is_idempotent());
        assert!(patch.description().is_none());
    }

    #[test]
    fn content_type_parsing() {
        let ct = ContentType::parse("application/json; charset=UTF-8");
        assert_eq!(ct.media_type, MediaType::APPLICATION_JSON);
        assert_eq!(ct.character_set, Some(CharacterSet::UTF_8));
        assert_eq!(ct.to_string(), "application/json; charset=UTF-8");

        let ct = ContentType::parse("text/xml");
        assert_eq!(ct.media_type, MediaType::TEXT_XML);
        assert!(ct.character_set.is_none());
    }

    #[test]
    fn tag_parsing() {
        assert_eq!(
            Tag::parse("W/\"xyz\"").unwrap(),
            Tag {
                name: "xyz".into(),
                weak: true
            }
        );
        assert_eq!(Tag::parse("\"abc\"").unwrap().to_string(), "\"abc\"");
        assert!(Tag::parse("abc").is_err());
    }

    #[test]
    fn disposition_parsing() {
        let d = Disposition::parse("attachment; filename=\"report.pdf\"").unwrap();
        assert_eq!(d.kind, "attachment");
        assert_eq!(d.filename(), Some("report.pdf"));
        assert_eq!(d.to_string(), "attachment; filename=\"report.pdf\"");
        assert!(Disposition::parse("; filename=x").is_err());
        assert!(Disposition::parse("inline; broken").is_err());
    }

    #[test]
    fn content_range_parsing() {
        let r = ContentRange::parse("bytes 0-499/1234").unwrap();
        assert_eq!(r.index, 0);
        assert_eq!(r.size, 500);
        assert_eq!(r.instance_size, Some(1234));
        assert_eq!(r.to_string(), "bytes 0-499/1234");

        let r = ContentRange::parse("bytes 10-19/*").unwrap();
        assert_eq!(r.instance_size, None);
        assert!(ContentRange::parse("items 0-1/2").is_err());
        assert!(ContentRange::parse("bytes 9-1/20").is_err());
    }

    #[test]
    fn content_range_covering_every_offset_is_rejected() {
        assert!(ContentRange::parse("bytes 0-18446744073709551615/*").is_err());
        let r = ContentRange::parse("bytes 1-18446744073709551615/*").unwrap();
        assert_eq!(r.size, u64::MAX);
    }

    #[test]
    fn digest_round_trips_base64() {
        let d = Digest::parse("Q2hlY2sgSW50ZWdyaXR5IQ==").unwrap();
        assert_eq!(d.0, b"Check Integrity!");
        assert_eq!(d.to_string(), "Q2hlY2sgSW50ZWdyaXR5IQ==");
        assert!(Digest::parse("***").is_err());
    }

    #[test]
    fn cache_directives() {
        let d = CacheDirective::parse_all("no-cache, max-age=60");
        assert_eq!(d, vec![CacheDirective::no_cache(), CacheDirective::max_age(60)]);
        assert_eq!(CacheDirective::format_all(&d), "no-cache, max-age=60");
    }

    #[test]
    fn basic_authorization() {
        let c = ChallengeResponse::basic("Aladdin", "open sesame");
        assert_eq!(c.authorization_header(), "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    }
}
