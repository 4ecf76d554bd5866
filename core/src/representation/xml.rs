use serde_json::{Map, Value};

use crate::data::MediaType;
use crate::error::RepresentationError;

use super::dom::{XmlElement, XmlNode};
use super::Representation;

#[derive(Debug, Clone)]
enum Source {
    Text(String),
    Document(XmlElement),
    Wrapped(Representation),
}

impl Source {
    fn text(&self) -> Result<String, RepresentationError> {
        match self {
            Source::Text(text) => Ok(text.clone()),
            Source::Document(root) => root.to_xml(),
            Source::Wrapped(r) => r
                .text()
                .map(str::to_string)
                .ok_or(RepresentationError::Unavailable),
        }
    }

    fn document(&self) -> Result<XmlElement, RepresentationError> {
        match self {
            Source::Document(root) => Ok(root.clone()),
            _ => XmlElement::parse(&self.text()?),
        }
    }
}

fn xml_metadata(mut metadata: Representation) -> Representation {
    if metadata.media_type().is_none() {
        metadata.set_media_type(Some(MediaType::APPLICATION_XML));
    }
    metadata
}

fn into_representation(metadata: Representation, text: String) -> Representation {
    let mut representation = metadata;
    representation.size = text.len() as i64;
    representation.write_text(text);
    representation
}

/// XML view over text, an element tree, or a received representation.
#[derive(Debug, Clone)]
pub struct DomRepresentation {
    metadata: Representation,
    source: Source,
}

impl DomRepresentation {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            metadata: xml_metadata(Representation::new()),
            source: Source::Text(text.into()),
        }
    }

    pub fn from_document(root: XmlElement) -> Self {
        Self {
            metadata: xml_metadata(Representation::new()),
            source: Source::Document(root),
        }
    }

    pub fn wrap(representation: Representation) -> Self {
        Self {
            metadata: xml_metadata(representation.metadata()),
            source: Source::Wrapped(representation),
        }
    }

    pub fn media_type(&self) -> Option<&MediaType> {
        self.metadata.media_type()
    }

    pub fn text(&self) -> Result<String, RepresentationError> {
        self.source.text()
    }

    /// Parse the root element. Text sources are parsed on every call.
    pub fn document(&self) -> Result<XmlElement, RepresentationError> {
        self.source.document()
    }

    pub fn into_representation(self) -> Result<Representation, RepresentationError> {
        let text = self.text()?;
        Ok(into_representation(self.metadata, text))
    }
}

/// XML view of a JSON-like object.
///
/// Writing: the object becomes a root element named after
/// [`object_name`](XmlRepresentation::object_name); each key becomes a
/// child element, scalars become text, nested objects recurse and arrays
/// repeat the element. Reading applies the reverse rule: an element whose
/// only child is text becomes a string, any other element becomes an
/// object, and a repeated name keeps its last value.
#[derive(Debug, Clone)]
pub struct XmlRepresentation {
    metadata: Representation,
    source: ObjectSource,
    object_name: Option<String>,
}

#[derive(Debug, Clone)]
enum ObjectSource {
    Object(Value),
    Xml(Source),
}

impl XmlRepresentation {
    pub const DEFAULT_OBJECT_NAME: &'static str = "object";

    pub fn from_object(object: Value) -> Self {
        Self {
            metadata: xml_metadata(Representation::new()),
            source: ObjectSource::Object(object),
            object_name: None,
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            metadata: xml_metadata(Representation::new()),
            source: ObjectSource::Xml(Source::Text(text.into())),
            object_name: None,
        }
    }

    pub fn wrap(representation: Representation) -> Self {
        Self {
            metadata: xml_metadata(representation.metadata()),
            source: ObjectSource::Xml(Source::Wrapped(representation)),
            object_name: None,
        }
    }

    pub fn with_object_name(mut self, name: impl Into<String>) -> Self {
        self.object_name = Some(name.into());
        self
    }

    /// Root element name used when writing an object.
    pub fn object_name(&self) -> &str {
        self.object_name
            .as_deref()
            .unwrap_or(Self::DEFAULT_OBJECT_NAME)
    }

    pub fn media_type(&self) -> Option<&MediaType> {
        self.metadata.media_type()
    }

    pub fn document(&self) -> Result<XmlElement, RepresentationError> {
        match &self.source {
            ObjectSource::Object(object) => Ok(element_from_value(self.object_name(), object)),
            ObjectSource::Xml(source) => source.document(),
        }
    }

    pub fn text(&self) -> Result<String, RepresentationError> {
        match &self.source {
            ObjectSource::Object(_) => self.document()?.to_xml(),
            ObjectSource::Xml(source) => source.text(),
        }
    }

    /// Decode the document's root element into an object.
    pub fn object(&self) -> Result<Value, RepresentationError> {
        match &self.source {
            ObjectSource::Object(object) => Ok(object.clone()),
            ObjectSource::Xml(source) => Ok(value_from_element(&source.document()?)),
        }
    }

    pub fn into_representation(self) -> Result<Representation, RepresentationError> {
        let text = self.text()?;
        Ok(into_representation(self.metadata, text))
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn element_from_value(name: &str, value: &Value) -> XmlElement {
    let mut element = XmlElement::new(name);
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match child {
                    Value::Array(items) => {
                        for item in items {
                            element.push_element(element_from_value(key, item));
                        }
                    }
                    _ => element.push_element(element_from_value(key, child)),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                element.push_element(element_from_value(name, item));
            }
        }
        scalar => {
            if let Some(text) = scalar_text(scalar) {
                element.children.push(XmlNode::Text(text));
            }
        }
    }
    element
}

fn value_from_element(element: &XmlElement) -> Value {
    if let Some(text) = element.single_text() {
        return Value::String(text.to_string());
    }
    let mut map = Map::new();
    for child in element.elements() {
        map.insert(child.name.clone(), value_from_element(child));
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn writes_object_as_elements() {
        let r = XmlRepresentation::from_object(json!({
            "id": 1,
            "lastName": "lastName1",
            "address": {"city": "Paris"},
            "tags": ["a", "b"]
        }))
        .with_object_name("contact");
        assert_eq!(
            r.text().unwrap(),
            "<contact><id>1</id><lastName>lastName1</lastName>\
             <address><city>Paris</city></address><tags>a</tags><tags>b</tags></contact>"
        );
        assert_eq!(r.media_type(), Some(&MediaType::APPLICATION_XML));
    }

    #[test]
    fn default_object_name() {
        let r = XmlRepresentation::from_object(json!({"a": "b"}));
        assert_eq!(r.object_name(), "object");
        assert_eq!(r.text().unwrap(), "<object><a>b</a></object>");
    }

    #[test]
    fn reads_elements_as_object() {
        let r = XmlRepresentation::from_text(
            "<contact><id>1</id><address><city>Paris</city></address><empty/></contact>",
        );
        assert_eq!(
            r.object().unwrap(),
            json!({"id": "1", "address": {"city": "Paris"}, "empty": {}})
        );
    }

    #[test]
    fn repeated_elements_keep_last_value() {
        let r = XmlRepresentation::from_text("<o><t>a</t><t>b</t></o>");
        assert_eq!(r.object().unwrap(), json!({"t": "b"}));
    }

    #[test]
    fn dom_wraps_received_text() {
        let received = Representation::from_text("<a><b>c</b></a>", MediaType::TEXT_XML);
        let dom = DomRepresentation::wrap(received);
        assert_eq!(dom.media_type(), Some(&MediaType::TEXT_XML));
        let root = dom.document().unwrap();
        assert_eq!(root.child("b").unwrap().text(), "c");
    }

    #[test]
    fn dom_document_round_trips_to_representation() {
        let mut root = XmlElement::new("a");
        root.push_element(XmlElement::with_text("b", "c"));
        let r = DomRepresentation::from_document(root)
            .into_representation()
            .unwrap();
        assert_eq!(r.text(), Some("<a><b>c</b></a>"));
        assert_eq!(r.size, 15);
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let r = XmlRepresentation::from_text("<a><b></a>");
        assert!(matches!(r.object(), Err(RepresentationError::Xml(_))));
    }
}
