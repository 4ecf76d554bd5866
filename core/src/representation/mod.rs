//! Entity bodies and their metadata.
//!
//! # Design
//! The metadata hierarchy is expressed by composition: a [`Representation`]
//! holds a [`RepresentationInfo`], which holds a [`Variant`]. The payload is
//! always text. Typed views ([`JsonRepresentation`], [`DomRepresentation`],
//! [`XmlRepresentation`]) keep their source (text, tree or object) and
//! convert on every call instead of caching; callers that need the parsed
//! form repeatedly should keep the result.

mod dom;
mod json;
mod xml;

use chrono::{DateTime, Utc};

use crate::data::{CharacterSet, ContentRange, Digest, Disposition, MediaType, Tag};
use crate::reference::Reference;

pub use dom::{XmlElement, XmlNode};
pub use json::JsonRepresentation;
pub use xml::{DomRepresentation, XmlRepresentation};

/// Size value meaning "not known".
pub const UNKNOWN_SIZE: i64 = -1;

/// Negotiable metadata of a representation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variant {
    pub media_type: Option<MediaType>,
    pub character_set: Option<CharacterSet>,
    pub encodings: Vec<String>,
    pub languages: Vec<String>,
    pub location_ref: Option<Reference>,
}

/// Variant plus validation metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepresentationInfo {
    pub variant: Variant,
    pub modification_date: Option<DateTime<Utc>>,
    pub tag: Option<Tag>,
}

/// An entity body with its metadata.
///
/// Once [`release`](Representation::release)d the payload is gone and
/// [`text`](Representation::text) returns `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representation {
    pub info: RepresentationInfo,
    /// Byte size, or [`UNKNOWN_SIZE`].
    pub size: i64,
    pub range: Option<ContentRange>,
    pub disposition: Option<Disposition>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub digest: Option<Digest>,
    pub transient: bool,
    available: bool,
    text: Option<String>,
}

impl Default for Representation {
    fn default() -> Self {
        Self::new()
    }
}

impl Representation {
    /// An available representation of unknown size with no payload yet.
    pub fn new() -> Self {
        Self {
            info: RepresentationInfo::default(),
            size: UNKNOWN_SIZE,
            range: None,
            disposition: None,
            expiration_date: None,
            digest: None,
            transient: false,
            available: true,
            text: None,
        }
    }

    /// A representation holding `text`, sized to its byte length.
    pub fn from_text(text: impl Into<String>, media_type: MediaType) -> Self {
        let text = text.into();
        let mut representation = Self::new();
        representation.size = text.len() as i64;
        representation.set_media_type(Some(media_type));
        representation.text = Some(text);
        representation
    }

    /// Metadata only, without payload or availability.
    pub(crate) fn metadata(&self) -> Self {
        Self {
            text: None,
            ..self.clone()
        }
    }

    pub fn media_type(&self) -> Option<&MediaType> {
        self.info.variant.media_type.as_ref()
    }

    pub fn set_media_type(&mut self, media_type: Option<MediaType>) {
        self.info.variant.media_type = media_type;
    }

    pub fn character_set(&self) -> Option<&CharacterSet> {
        self.info.variant.character_set.as_ref()
    }

    pub fn tag(&self) -> Option<&Tag> {
        self.info.tag.as_ref()
    }

    /// Store the received body text.
    pub fn write_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
        self.available = true;
    }

    /// The body, if this representation still holds one.
    pub fn text(&self) -> Option<&str> {
        if self.available {
            self.text.as_deref()
        } else {
            None
        }
    }

    /// Whether content can still be read: not released and not known to be
    /// empty.
    pub fn is_available(&self) -> bool {
        self.available && self.size != 0
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Drop the payload; metadata stays readable.
    pub fn release(&mut self) {
        self.available = false;
        self.text = None;
    }
}
