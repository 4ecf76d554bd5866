use std::io::ErrorKind;

use tracing::{debug, warn};

use crate::data::{Method, Parameter};
use crate::error::TransportError;

use super::{Call, CompletionHandler, TransportBinding};

/// Blocking HTTP/1.1 binding backed by a `ureq` agent.
///
/// Status codes never turn into errors and redirects are not followed, so
/// every reply reaches the adapter as data.
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .build()
            .new_agent();
        Self { agent }
    }

    fn execute(&self, call: &mut Call) -> Result<(), TransportError> {
        let uri = call.uri.as_str();
        let body = call.request_body.as_deref();
        let headers: Vec<&Parameter> = call.forwarded_headers().collect();

        let result = if call.method == Method::GET {
            with_headers(self.agent.get(uri), &headers).call()
        } else if call.method == Method::HEAD {
            with_headers(self.agent.head(uri), &headers).call()
        } else if call.method == Method::DELETE {
            with_headers(self.agent.delete(uri), &headers).call()
        } else if call.method == Method::OPTIONS {
            with_headers(self.agent.options(uri), &headers).call()
        } else if call.method == Method::TRACE {
            with_headers(self.agent.trace(uri), &headers).call()
        } else if call.method == Method::POST {
            let builder = with_headers(self.agent.post(uri), &headers);
            match body {
                Some(body) => builder.send(body.as_bytes()),
                None => builder.send_empty(),
            }
        } else if call.method == Method::PUT {
            let builder = with_headers(self.agent.put(uri), &headers);
            match body {
                Some(body) => builder.send(body.as_bytes()),
                None => builder.send_empty(),
            }
        } else {
            return Err(TransportError::Internal(format!(
                "method {} is not supported by the HTTP binding",
                call.method
            )));
        };

        let mut response = result.map_err(map_error)?;

        call.status_code = response.status().as_u16();
        call.reason_phrase = response
            .status()
            .canonical_reason()
            .map(str::to_string);
        call.response_headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                Parameter::new(
                    name.as_str(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::Communication(e.to_string()))?;
        call.response_body = (!text.is_empty()).then_some(text);
        Ok(())
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportBinding for HttpTransport {
    fn send_request(&self, mut call: Call, on_complete: CompletionHandler) {
        debug!(method = %call.method, uri = %call.uri, "sending request");
        match self.execute(&mut call) {
            Ok(()) => {
                debug!(status = call.status_code, uri = %call.uri, "received response");
                on_complete(Ok(call));
            }
            Err(e) => {
                warn!(uri = %call.uri, error = %e, "HTTP exchange failed");
                on_complete(Err(e));
            }
        }
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[&Parameter],
) -> ureq::RequestBuilder<B> {
    for header in headers {
        builder = builder.header(header.name.as_str(), header.value.as_str());
    }
    builder
}

fn map_error(error: ureq::Error) -> TransportError {
    match error {
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
            TransportError::Connection(error.to_string())
        }
        ureq::Error::Io(ref io)
            if matches!(
                io.kind(),
                ErrorKind::ConnectionRefused | ErrorKind::AddrNotAvailable
            ) =>
        {
            TransportError::Connection(error.to_string())
        }
        ureq::Error::BadUri(_) | ureq::Error::Http(_) => TransportError::Internal(error.to_string()),
        other => TransportError::Communication(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::message::Request;
    use crate::reference::Reference;

    #[test]
    fn refused_connection_reports_connection_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let request = Request::new(
            Method::GET,
            Reference::parse(&format!("http://{addr}/resource/contact/1")).unwrap(),
        );
        let transport = HttpTransport::new();
        let outcome = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&outcome);
        transport.send_request(
            transport.create_call(&request),
            Box::new(move |result| *slot.borrow_mut() = Some(result)),
        );

        let result = outcome.borrow_mut().take().unwrap();
        assert!(matches!(result, Err(TransportError::Connection(_))));
    }

    #[test]
    fn custom_methods_are_rejected() {
        let request = Request::new(
            Method::value_of("PROPFIND"),
            Reference::parse("http://127.0.0.1:9/").unwrap(),
        );
        let transport = HttpTransport::new();
        let mut call = transport.create_call(&request);
        assert!(matches!(
            transport.execute(&mut call),
            Err(TransportError::Internal(_))
        ));
    }
}
