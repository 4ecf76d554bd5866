//! Client resource tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port per test, then drives a
//! `ClientResource` over real HTTP through the `ureq`-backed binding.
//! Validates that header mapping, the call adapter and the representation
//! views work end-to-end with an actual server.

use std::cell::RefCell;
use std::rc::Rc;

use mock_server::Contact;
use restlet_core::transport::{Call, CompletionHandler, TransportBinding};
use restlet_core::{
    Client, ClientResource, HttpTransport, JsonRepresentation, MediaType, Parameter, Protocol,
    Representation, Status, XmlRepresentation,
};

fn spawn_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn resource(uri: &str) -> ClientResource {
    let mut resource = ClientResource::new(uri).unwrap();
    resource.set_next(Rc::new(Client::with_transport(
        vec![Protocol::HTTP],
        Rc::new(HttpTransport::new()),
    )));
    resource
}

/// Slot the verb callbacks write the received entity into.
type Received = Rc<RefCell<Option<Option<Representation>>>>;

fn sink(received: &Received) -> impl FnOnce(Option<Representation>) + 'static {
    let slot = Rc::clone(received);
    move |entity| *slot.borrow_mut() = Some(entity)
}

fn take(received: &Received) -> Option<Representation> {
    received
        .borrow_mut()
        .take()
        .expect("callback was not invoked")
}

#[test]
fn get_contact_as_json() {
    let base = spawn_server();
    let mut resource = resource(&format!("{base}/resource/contact/1"));

    let received = Received::default();
    resource.get(Some(MediaType::APPLICATION_JSON), sink(&received));

    let entity = take(&received).unwrap();
    assert!(entity.media_type().unwrap().is_json());
    let contact: Contact = JsonRepresentation::wrap(entity).to_object().unwrap();
    assert_eq!(contact.id, 1);
    assert_eq!(contact.last_name, "lastName1");
    assert_eq!(contact.first_name, "firstName1");

    let response = resource.response().unwrap();
    assert_eq!(response.status, Status::SUCCESS_OK);
    assert_eq!(response.server_info.port, Some(base_port(&base)));
}

#[test]
fn get_contact_as_xml() {
    let base = spawn_server();
    let mut resource = resource(&format!("{base}/resource/contact/1"));

    let received = Received::default();
    resource.get(Some(MediaType::APPLICATION_XML), sink(&received));

    let entity = take(&received).unwrap();
    assert!(entity.media_type().unwrap().is_xml());
    let object = XmlRepresentation::wrap(entity).object().unwrap();
    assert_eq!(object["id"], "1");
    assert_eq!(object["lastName"], "lastName1");
    assert_eq!(object["firstName"], "firstName1");
}

#[test]
fn post_creates_contact_with_location() {
    let base = spawn_server();
    let mut resource = resource(&format!("{base}/resource/contacts"));

    let entity = JsonRepresentation::from_text(r#"{"lastName":"Doe","firstName":"Jane"}"#)
        .into_representation()
        .unwrap();
    let received = Received::default();
    resource.post(Some(entity), Some(MediaType::APPLICATION_JSON), sink(&received));

    let response = resource.response().unwrap();
    assert_eq!(response.status.code(), 201);
    assert_eq!(
        response.location_ref.unwrap().as_str(),
        format!("{base}/resource/contact/2")
    );

    let created: Contact = JsonRepresentation::wrap(take(&received).unwrap())
        .to_object()
        .unwrap();
    assert_eq!(created.id, 2);
    assert_eq!(created.last_name, "Doe");
}

#[test]
fn put_delete_lifecycle() {
    let base = spawn_server();
    let mut resource = resource(&format!("{base}/resource/contact/1"));

    // Step 1: replace contact 1.
    let updated = Contact {
        id: 1,
        last_name: "Smith".to_string(),
        first_name: "John".to_string(),
    };
    let entity = JsonRepresentation::from_object(&updated)
        .unwrap()
        .into_representation()
        .unwrap();
    let received = Received::default();
    resource.put(Some(entity), Some(MediaType::APPLICATION_JSON), sink(&received));
    assert_eq!(resource.response().unwrap().status, Status::SUCCESS_OK);
    let echoed: Contact = JsonRepresentation::wrap(take(&received).unwrap())
        .to_object()
        .unwrap();
    assert_eq!(echoed, updated);

    // Step 2: delete it; 204 carries no usable entity.
    resource.delete(None, sink(&received));
    assert_eq!(resource.response().unwrap().status, Status::SUCCESS_NO_CONTENT);
    assert!(take(&received).is_none_or(|e| !e.is_available()));

    // Step 3: it is gone; 404 is a normal response, not a failure.
    resource.get(Some(MediaType::APPLICATION_JSON), sink(&received));
    let status = resource.response().unwrap().status;
    assert_eq!(status.code(), 404);
    assert!(status.is_client_error());
    assert!(!status.is_connector_error());
}

#[test]
fn head_releases_the_entity() {
    let base = spawn_server();
    let mut resource = resource(&format!("{base}/resource/contact/1"));

    let received = Received::default();
    resource.head(Some(MediaType::APPLICATION_JSON), sink(&received));

    assert_eq!(resource.response().unwrap().status, Status::SUCCESS_OK);
    let entity = take(&received).unwrap();
    assert!(!entity.is_available());
    assert_eq!(entity.text(), None);
}

#[test]
fn options_on_unrouted_method_is_405() {
    let base = spawn_server();
    let mut resource = resource(&format!("{base}/resource/contact/1"));

    let received = Received::default();
    resource.options(None, sink(&received));

    let response = resource.response().unwrap();
    assert_eq!(response.status, Status::CLIENT_ERROR_METHOD_NOT_ALLOWED);
}

#[test]
fn refused_connection_becomes_connector_error() {
    // Bind then drop to get a port nothing listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let mut resource = resource(&format!("http://127.0.0.1:{port}/resource/contact/1"));

    let received = Received::default();
    resource.get(None, sink(&received));

    assert!(take(&received).is_none());
    let status = resource.response().unwrap().status;
    assert_eq!(status, Status::CONNECTOR_ERROR_CONNECTION);
    assert!(status.is_connector_error());
    assert!(status.description().is_some());
}

#[test]
fn default_client_is_created_on_first_use() {
    let base = spawn_server();
    let mut resource = ClientResource::new(&format!("{base}/resource/contact/1")).unwrap();
    assert!(resource.next().is_none());

    let received = Received::default();
    resource.get(Some(MediaType::APPLICATION_JSON), sink(&received));

    assert!(resource.next().is_some());
    let object = JsonRepresentation::wrap(take(&received).unwrap())
        .object()
        .unwrap();
    assert_eq!(object["id"], 1);
}

/// Delegates to the HTTP binding and records the headers it puts on the wire.
struct Recording {
    inner: HttpTransport,
    sent: RefCell<Vec<Parameter>>,
}

impl TransportBinding for Recording {
    fn send_request(&self, call: Call, on_complete: CompletionHandler) {
        self.sent
            .borrow_mut()
            .extend(call.forwarded_headers().cloned());
        self.inner.send_request(call, on_complete);
    }
}

#[test]
fn request_sends_extension_headers_only() {
    let base = spawn_server();
    let recording = Rc::new(Recording {
        inner: HttpTransport::new(),
        sent: RefCell::default(),
    });
    let mut resource = ClientResource::new(&format!("{base}/resource/contact/1")).unwrap();
    resource.set_next(Rc::new(Client::with_transport(
        vec![Protocol::HTTP],
        recording.clone(),
    )));
    resource.request_mut().add_header("X-Custom-Trace", "abc");
    resource.request_mut().add_header("Content-Type", "text/plain");

    let received = Received::default();
    resource.get(Some(MediaType::APPLICATION_JSON), sink(&received));

    assert_eq!(resource.response().unwrap().status, Status::SUCCESS_OK);
    assert!(take(&received).unwrap().media_type().unwrap().is_json());

    let sent = recording.sent.borrow();
    let trace: Vec<&str> = sent
        .iter()
        .filter(|h| h.has_name("X-Custom-Trace"))
        .map(|h| h.value.as_str())
        .collect();
    assert_eq!(trace, vec!["abc"]);
    assert!(!sent.iter().any(|h| h.has_name("Content-Type")));
    assert!(sent.iter().any(|h| h.has_name("Accept")));
}

fn base_port(base: &str) -> u16 {
    base.rsplit(':').next().unwrap().parse().unwrap()
}
