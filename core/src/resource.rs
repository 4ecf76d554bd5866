//! Resource-oriented facade over a client.

use std::cell::RefCell;
use std::rc::Rc;

use crate::client::Client;
use crate::data::{MediaType, Method, Protocol};
use crate::error::ClientError;
use crate::message::{Message, Request, Response};
use crate::reference::Reference;
use crate::representation::Representation;

/// Issues uniform calls against one resource and hands back only the
/// response entity.
///
/// Each verb sets the method, the entity and the accepted media type on the
/// wrapped request, then sends it through `next`. Without an explicit
/// `next`, a default HTTP client is created on first use. The full
/// [`Response`] stays available through [`ClientResource::response`].
pub struct ClientResource {
    request: Request,
    next: Option<Rc<Client>>,
    response: Rc<RefCell<Option<Response>>>,
}

impl ClientResource {
    pub fn new(uri: &str) -> Result<Self, ClientError> {
        Ok(Self::from_reference(Reference::parse(uri)?))
    }

    pub fn from_reference(reference: Reference) -> Self {
        Self {
            request: Request::new(Method::GET, reference),
            next: None,
            response: Rc::default(),
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    pub fn next(&self) -> Option<&Rc<Client>> {
        self.next.as_ref()
    }

    pub fn set_next(&mut self, client: Rc<Client>) {
        self.next = Some(client);
    }

    /// The response of the last completed call.
    pub fn response(&self) -> Option<Response> {
        self.response.borrow().clone()
    }

    pub fn get(
        &mut self,
        media_type: Option<MediaType>,
        callback: impl FnOnce(Option<Representation>) + 'static,
    ) {
        self.handle(Method::GET, None, media_type, callback);
    }

    pub fn post(
        &mut self,
        entity: Option<Representation>,
        media_type: Option<MediaType>,
        callback: impl FnOnce(Option<Representation>) + 'static,
    ) {
        self.handle(Method::POST, entity, media_type, callback);
    }

    pub fn put(
        &mut self,
        entity: Option<Representation>,
        media_type: Option<MediaType>,
        callback: impl FnOnce(Option<Representation>) + 'static,
    ) {
        self.handle(Method::PUT, entity, media_type, callback);
    }

    pub fn delete(
        &mut self,
        media_type: Option<MediaType>,
        callback: impl FnOnce(Option<Representation>) + 'static,
    ) {
        self.handle(Method::DELETE, None, media_type, callback);
    }

    pub fn options(
        &mut self,
        media_type: Option<MediaType>,
        callback: impl FnOnce(Option<Representation>) + 'static,
    ) {
        self.handle(Method::OPTIONS, None, media_type, callback);
    }

    pub fn head(
        &mut self,
        media_type: Option<MediaType>,
        callback: impl FnOnce(Option<Representation>) + 'static,
    ) {
        self.handle(Method::HEAD, None, media_type, callback);
    }

    fn handle(
        &mut self,
        method: Method,
        entity: Option<Representation>,
        media_type: Option<MediaType>,
        callback: impl FnOnce(Option<Representation>) + 'static,
    ) {
        self.request.method = method;
        self.request.set_entity(entity);
        self.request.client_info.accepted_media_types = media_type.into_iter().collect();

        let next = Rc::clone(
            self.next
                .get_or_insert_with(|| Rc::new(Client::new(vec![Protocol::HTTP]))),
        );
        let slot = Rc::clone(&self.response);
        next.handle(self.request.clone(), move |response| {
            let entity = response.entity().cloned();
            *slot.borrow_mut() = Some(response);
            callback(entity);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Parameter;
    use crate::representation::JsonRepresentation;
    use crate::status::Status;
    use crate::transport::{Call, CompletionHandler, TransportBinding};

    /// Answers every call with the contact JSON and remembers the calls.
    #[derive(Default)]
    struct ContactStub {
        calls: RefCell<Vec<Call>>,
    }

    impl TransportBinding for ContactStub {
        fn send_request(&self, mut call: Call, on_complete: CompletionHandler) {
            self.calls.borrow_mut().push(call.clone());
            call.status_code = 200;
            call.reason_phrase = Some("OK".into());
            call.response_headers = vec![Parameter::new("Content-Type", "application/json")];
            call.response_body =
                Some(r#"{"id":1,"lastName":"lastName1","firstName":"firstName1"}"#.into());
            on_complete(Ok(call));
        }
    }

    fn resource(stub: &Rc<ContactStub>) -> ClientResource {
        let mut resource = ClientResource::new("http://localhost:8182/resource/contact/1").unwrap();
        resource.set_next(Rc::new(Client::with_transport(
            vec![Protocol::HTTP],
            stub.clone(),
        )));
        resource
    }

    #[test]
    fn get_hands_back_the_entity() {
        let stub = Rc::new(ContactStub::default());
        let mut resource = resource(&stub);

        let received = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&received);
        resource.get(Some(MediaType::APPLICATION_JSON), move |entity| {
            *sink.borrow_mut() = entity;
        });

        let entity = received.borrow_mut().take().unwrap();
        let object = JsonRepresentation::wrap(entity).object().unwrap();
        assert_eq!(object["id"], 1);
        assert_eq!(resource.response().unwrap().status, Status::SUCCESS_OK);

        let calls = stub.calls.borrow();
        assert_eq!(calls[0].method, Method::GET);
        let accept = calls[0].request_headers.iter().find(|h| h.has_name("Accept"));
        assert_eq!(accept.map(|h| h.value.as_str()), Some("application/json"));
    }

    #[test]
    fn put_sends_the_entity_and_resets_negotiation() {
        let stub = Rc::new(ContactStub::default());
        let mut resource = resource(&stub);

        resource.get(Some(MediaType::APPLICATION_XML), |_| {});
        let entity = JsonRepresentation::from_text(r#"{"id":1}"#)
            .into_representation()
            .unwrap();
        resource.put(Some(entity), None, |_| {});

        let calls = stub.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].method, Method::PUT);
        assert_eq!(calls[1].request_body.as_deref(), Some(r#"{"id":1}"#));
        let accept = calls[1].request_headers.iter().find(|h| h.has_name("Accept"));
        assert_eq!(accept.map(|h| h.value.as_str()), Some("*/*"));
    }

    #[test]
    fn delete_clears_a_previous_entity() {
        let stub = Rc::new(ContactStub::default());
        let mut resource = resource(&stub);

        let entity = Representation::from_text("x", MediaType::TEXT_PLAIN);
        resource.post(Some(entity), None, |_| {});
        resource.delete(None, |_| {});

        assert!(resource.request().entity().is_none());
        assert_eq!(stub.calls.borrow()[1].request_body, None);
    }
}
