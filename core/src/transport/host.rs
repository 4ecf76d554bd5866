use std::cell::{Cell, RefCell};

use tracing::{debug, warn};

use crate::data::Parameter;
use crate::error::TransportError;

use super::{parse_header_block, Call, CompletionHandler, TransportBinding};

/// A call waiting for the host to perform it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingCall {
    pub id: u64,
    pub method: String,
    pub uri: String,
    pub headers: Vec<Parameter>,
    pub body: Option<String>,
}

struct PendingCall {
    id: u64,
    call: Call,
    on_complete: CompletionHandler,
}

/// Binding for hosts that perform the exchange themselves.
///
/// `send_request` only queues the call. The host drains the queue with
/// [`take_outgoing`](HostTransport::take_outgoing), runs each exchange, and
/// reports back with [`complete`](HostTransport::complete) or
/// [`fail`](HostTransport::fail).
#[derive(Default)]
pub struct HostTransport {
    next_id: Cell<u64>,
    outgoing: RefCell<Vec<OutgoingCall>>,
    pending: RefCell<Vec<PendingCall>>,
}

impl HostTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls queued since the last drain, oldest first.
    pub fn take_outgoing(&self) -> Vec<OutgoingCall> {
        std::mem::take(&mut *self.outgoing.borrow_mut())
    }

    /// Number of calls still waiting for a reply.
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    fn take_pending(&self, id: u64) -> Result<PendingCall, TransportError> {
        let mut pending = self.pending.borrow_mut();
        let index = pending
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| TransportError::Internal(format!("no pending call with id {id}")))?;
        Ok(pending.remove(index))
    }

    /// Deliver the host's raw reply for call `id`. `header_block` holds
    /// `Name: value` lines as returned by the host's HTTP stack.
    pub fn complete(
        &self,
        id: u64,
        status_code: u16,
        reason_phrase: Option<String>,
        header_block: &str,
        body: Option<String>,
    ) -> Result<(), TransportError> {
        let PendingCall {
            mut call,
            on_complete,
            ..
        } = self.take_pending(id)?;
        call.status_code = status_code;
        call.reason_phrase = reason_phrase;
        call.response_headers = parse_header_block(header_block);
        call.response_body = body.filter(|b| !b.is_empty());
        debug!(id, status = status_code, uri = %call.uri, "host completed call");
        on_complete(Ok(call));
        Ok(())
    }

    /// Report that the host could not perform call `id`.
    pub fn fail(&self, id: u64, error: TransportError) -> Result<(), TransportError> {
        let pending = self.take_pending(id)?;
        warn!(id, uri = %pending.call.uri, error = %error, "host failed call");
        (pending.on_complete)(Err(error));
        Ok(())
    }
}

impl TransportBinding for HostTransport {
    fn send_request(&self, call: Call, on_complete: CompletionHandler) {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        debug!(id, method = %call.method, uri = %call.uri, "queued call for host");

        self.outgoing.borrow_mut().push(OutgoingCall {
            id,
            method: call.method.name().to_string(),
            uri: call.uri.clone(),
            headers: call.forwarded_headers().cloned().collect(),
            body: call.request_body.clone(),
        });
        self.pending.borrow_mut().push(PendingCall {
            id,
            call,
            on_complete,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::data::Method;
    use crate::message::Request;
    use crate::reference::Reference;

    type Outcome = Rc<RefCell<Vec<Result<Call, TransportError>>>>;

    fn queue(transport: &HostTransport, outcome: &Outcome) {
        let request = Request::new(
            Method::GET,
            Reference::parse("http://example.com/resource/contact/1").unwrap(),
        );
        let mut call = transport.create_call(&request);
        call.request_headers = vec![
            Parameter::new("Accept", "application/json"),
            Parameter::new("Host", "example.com"),
        ];
        let slot = Rc::clone(outcome);
        transport.send_request(call, Box::new(move |r| slot.borrow_mut().push(r)));
    }

    #[test]
    fn queued_call_completes_once() {
        let transport = HostTransport::new();
        let outcome: Outcome = Rc::default();
        queue(&transport, &outcome);

        let outgoing = transport.take_outgoing();
        assert_eq!(outgoing.len(), 1);
        assert_eq!(outgoing[0].method, "GET");
        assert_eq!(outgoing[0].headers, vec![Parameter::new("Accept", "application/json")]);
        assert!(transport.take_outgoing().is_empty());

        transport
            .complete(
                outgoing[0].id,
                200,
                Some("OK".into()),
                "Content-Type: application/json\r\nContent-Length: 8\r\n",
                Some(r#"{"id":1}"#.into()),
            )
            .unwrap();

        let results = outcome.borrow();
        assert_eq!(results.len(), 1);
        let call = results[0].as_ref().unwrap();
        assert_eq!(call.status_code, 200);
        assert_eq!(call.response_headers.len(), 2);
        assert_eq!(call.response_body.as_deref(), Some(r#"{"id":1}"#));
        drop(results);

        assert!(transport.complete(outgoing[0].id, 200, None, "", None).is_err());
        assert_eq!(transport.pending_count(), 0);
    }

    #[test]
    fn failure_is_reported_to_the_handler() {
        let transport = HostTransport::new();
        let outcome: Outcome = Rc::default();
        queue(&transport, &outcome);
        queue(&transport, &outcome);

        let ids: Vec<u64> = transport.take_outgoing().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);

        transport
            .fail(ids[1], TransportError::Connection("refused".into()))
            .unwrap();
        assert!(matches!(
            outcome.borrow()[0],
            Err(TransportError::Connection(_))
        ));
        assert_eq!(transport.pending_count(), 1);
    }
}
