use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{
        header::{ACCEPT, CONTENT_TYPE, LOCATION},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: u64,
    pub last_name: String,
    pub first_name: String,
}

impl Contact {
    /// `<contact><id>..</id><lastName>..</lastName><firstName>..</firstName></contact>`
    pub fn to_xml(&self) -> String {
        format!(
            "<contact><id>{}</id><lastName>{}</lastName><firstName>{}</firstName></contact>",
            self.id,
            escape(&self.last_name),
            escape(&self.first_name)
        )
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    pub last_name: String,
    pub first_name: String,
}

pub struct Store {
    contacts: BTreeMap<u64, Contact>,
    next_id: u64,
}

impl Store {
    /// A store holding contact 1 (`lastName1` / `firstName1`).
    pub fn seeded() -> Self {
        let mut contacts = BTreeMap::new();
        contacts.insert(
            1,
            Contact {
                id: 1,
                last_name: "lastName1".to_string(),
                first_name: "firstName1".to_string(),
            },
        );
        Self {
            contacts,
            next_id: 2,
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    Router::new()
        .route("/resource/contacts", post(create_contact))
        .route(
            "/resource/contact/{id}",
            get(get_contact).put(put_contact).delete(delete_contact),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn wants_xml(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("xml"))
}

/// XML when the client accepts it, JSON otherwise.
fn negotiate(headers: &HeaderMap, status: StatusCode, contact: Contact) -> Response {
    if wants_xml(headers) {
        (status, [(CONTENT_TYPE, "application/xml")], contact.to_xml()).into_response()
    } else {
        (status, Json(contact)).into_response()
    }
}

async fn get_contact(
    State(db): State<Db>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    let store = db.read().await;
    let contact = store.contacts.get(&id).cloned().ok_or(StatusCode::NOT_FOUND)?;
    Ok(negotiate(&headers, StatusCode::OK, contact))
}

async fn put_contact(
    State(db): State<Db>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(input): Json<ContactInput>,
) -> Response {
    let contact = Contact {
        id,
        last_name: input.last_name,
        first_name: input.first_name,
    };
    let mut store = db.write().await;
    store.next_id = store.next_id.max(id.saturating_add(1));
    store.contacts.insert(id, contact.clone());
    info!(id, "stored contact");
    negotiate(&headers, StatusCode::OK, contact)
}

async fn delete_contact(State(db): State<Db>, Path(id): Path<u64>) -> StatusCode {
    match db.write().await.contacts.remove(&id) {
        Some(_) => {
            info!(id, "deleted contact");
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn create_contact(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ContactInput>,
) -> Response {
    let mut store = db.write().await;
    let id = store.next_id;
    store.next_id += 1;
    let contact = Contact {
        id,
        last_name: input.last_name,
        first_name: input.first_name,
    };
    store.contacts.insert(id, contact.clone());
    info!(id, "created contact");

    let mut response = negotiate(&headers, StatusCode::CREATED, contact);
    if let Ok(location) = format!("/resource/contact/{id}").parse() {
        response.headers_mut().insert(LOCATION, location);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_serializes_in_camel_case() {
        let contact = Contact {
            id: 1,
            last_name: "lastName1".to_string(),
            first_name: "firstName1".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&contact).unwrap(),
            r#"{"id":1,"lastName":"lastName1","firstName":"firstName1"}"#
        );
    }

    #[test]
    fn contact_xml_escapes_text() {
        let contact = Contact {
            id: 7,
            last_name: "O<Brien".to_string(),
            first_name: "A&B".to_string(),
        };
        assert_eq!(
            contact.to_xml(),
            "<contact><id>7</id><lastName>O&lt;Brien</lastName><firstName>A&amp;B</firstName></contact>"
        );
    }

    #[test]
    fn contact_input_ignores_id() {
        let input: ContactInput =
            serde_json::from_str(r#"{"id":9,"lastName":"l","firstName":"f"}"#).unwrap();
        assert_eq!(input.last_name, "l");
        assert_eq!(input.first_name, "f");
    }

    #[test]
    fn contact_input_requires_names() {
        let result: Result<ContactInput, _> = serde_json::from_str(r#"{"lastName":"l"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn store_is_seeded_with_contact_one() {
        let store = Store::seeded();
        assert_eq!(store.contacts[&1].last_name, "lastName1");
        assert_eq!(store.next_id, 2);
    }
}
