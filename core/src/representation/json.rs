use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::data::MediaType;
use crate::error::RepresentationError;

use super::Representation;

#[derive(Debug, Clone)]
enum Source {
    Text(String),
    Value(Value),
    Wrapped(Representation),
}

/// JSON view over text, a `serde_json::Value`, or a received representation.
///
/// ```
/// use restlet_core::representation::JsonRepresentation;
/// use serde_json::json;
///
/// let r = JsonRepresentation::from_value(json!({"id": 1}));
/// assert_eq!(r.text().unwrap(), r#"{"id":1}"#);
/// ```
#[derive(Debug, Clone)]
pub struct JsonRepresentation {
    metadata: Representation,
    source: Source,
}

impl JsonRepresentation {
    fn with_source(mut metadata: Representation, source: Source) -> Self {
        if metadata.media_type().is_none() {
            metadata.set_media_type(Some(MediaType::APPLICATION_JSON));
        }
        Self { metadata, source }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self::with_source(Representation::new(), Source::Text(text.into()))
    }

    pub fn from_value(value: Value) -> Self {
        Self::with_source(Representation::new(), Source::Value(value))
    }

    /// Serialize any `serde` value.
    pub fn from_object<T: Serialize>(object: &T) -> Result<Self, RepresentationError> {
        Ok(Self::from_value(serde_json::to_value(object)?))
    }

    /// View a received representation as JSON. Its metadata is kept.
    pub fn wrap(representation: Representation) -> Self {
        Self::with_source(representation.metadata(), Source::Wrapped(representation))
    }

    pub fn media_type(&self) -> Option<&MediaType> {
        self.metadata.media_type()
    }

    /// The JSON text. A value source is serialized compactly in its own key
    /// order.
    pub fn text(&self) -> Result<String, RepresentationError> {
        match &self.source {
            Source::Text(text) => Ok(text.clone()),
            Source::Value(value) => Ok(serde_json::to_string(value)?),
            Source::Wrapped(r) => r
                .text()
                .map(str::to_string)
                .ok_or(RepresentationError::Unavailable),
        }
    }

    /// Parse into a `serde_json::Value`. Text sources are parsed on every
    /// call.
    pub fn object(&self) -> Result<Value, RepresentationError> {
        match &self.source {
            Source::Value(value) => Ok(value.clone()),
            _ => Ok(serde_json::from_str(&self.text()?)?),
        }
    }

    /// Deserialize into any `serde` type.
    pub fn to_object<T: DeserializeOwned>(&self) -> Result<T, RepresentationError> {
        match &self.source {
            Source::Value(value) => Ok(serde_json::from_value(value.clone())?),
            _ => Ok(serde_json::from_str(&self.text()?)?),
        }
    }

    /// A plain representation carrying the serialized text, ready to be
    /// attached to a request.
    pub fn into_representation(self) -> Result<Representation, RepresentationError> {
        let text = self.text()?;
        let mut representation = self.metadata;
        representation.size = text.len() as i64;
        representation.write_text(text);
        Ok(representation)
    }
}
