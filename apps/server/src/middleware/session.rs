//! Session middleware.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Header carrying the session id in both directions.
pub const SESSION_HEADER: &str = "x-session-id";

/// Longest session id accepted from a client.
const MAX_SESSION_ID_LENGTH: usize = 128;

/// Session the current request belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    /// Issues a fresh session id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Reads the session id sent by the client, if it is usable.
fn session_from_request(request: &Request) -> Option<SessionId> {
    let value = request.headers().get(SESSION_HEADER)?.to_str().ok()?.trim();
    if value.is_empty() || value.len() > MAX_SESSION_ID_LENGTH {
        return None;
    }
    Some(SessionId(value.to_string()))
}

/// Session middleware.
///
/// Stores the request's [`SessionId`] in the request extensions, issuing a
/// new one when the client did not send any, and echoes it back in the
/// response so the client can keep using it.
pub async fn session_middleware(mut request: Request, next: Next) -> Response {
    let session = match session_from_request(&request) {
        Some(session) => session,
        None => {
            let session = SessionId::generate();
            tracing::debug!(session_id = session.as_str(), "Issued new session");
            session
        }
    };

    request.extensions_mut().insert(session.clone());
    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(session.as_str()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(SESSION_HEADER), value);
    }

    response
}
