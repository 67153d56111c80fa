use std::future::{Ready, ready};

use actix_web::{Error as ActixError, FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized};

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_NAME_HEADER: &str = "X-User-Name";

/// Identity of whoever triggered the request, as forwarded by the chat
/// front-end. `name` falls back to the id when the header is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub name: String,
}

fn header(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl FromRequest for Actor {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match header(req, USER_ID_HEADER) {
            Some(id) => {
                let name = header(req, USER_NAME_HEADER).unwrap_or_else(|| id.clone());
                ready(Ok(Actor { id, name }))
            }
            None => ready(Err(ErrorUnauthorized("Missing X-User-Id header"))),
        }
    }
}
