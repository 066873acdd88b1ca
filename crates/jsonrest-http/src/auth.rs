//! Authentication and HTTPS policy
//!
//! [`guard`] runs in front of every API route: it enforces the HTTPS policy
//! first, then asks the configured [`Authenticator`] whether the request may
//! proceed.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::{header, request::Parts};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::{engine::general_purpose, Engine as _};
use jsonrest_core::ApiError;
use tracing::debug;

use crate::errors::HttpError;
use crate::state::ApiState;

/// The parts of a request an authenticator may inspect
pub type RequestHead = Parts;

/// Decision of an [`Authenticator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authorized,
    /// No usable credentials; answered with 401 and this `WWW-Authenticate`
    /// challenge
    ChallengeRequired { challenge: String },
    /// Credentials were given and rejected
    Forbidden,
}

/// Authentication policy
#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    async fn authenticate(&self, request: &RequestHead) -> AuthOutcome;
}

/// HTTP Basic authentication against a fixed set of users
#[derive(Debug, Clone)]
pub struct BasicAuthenticator {
    realm: String,
    credentials: HashMap<String, String>,
}

impl BasicAuthenticator {
    pub fn new(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            credentials: HashMap::new(),
        }
    }

    /// Accept `username` with `password`
    pub fn with_user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials.insert(username.into(), password.into());
        self
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Value of the `WWW-Authenticate` header
    pub fn challenge(&self) -> String {
        format!("Basic realm=\"{}\"", self.realm)
    }

    /// Decode `Basic <base64(user:password)>`
    pub fn extract_credentials(auth_header: &str) -> Option<(String, String)> {
        let (scheme, encoded) = auth_header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;
        Some((username.to_string(), password.to_string()))
    }
}

#[async_trait]
impl Authenticator for BasicAuthenticator {
    async fn authenticate(&self, request: &RequestHead) -> AuthOutcome {
        let Some(auth_header) = request.headers.get(header::AUTHORIZATION) else {
            return AuthOutcome::ChallengeRequired {
                challenge: self.challenge(),
            };
        };

        let credentials = auth_header.to_str().ok().and_then(Self::extract_credentials);
        match credentials {
            Some((username, password)) if self.credentials.get(&username) == Some(&password) => {
                AuthOutcome::Authorized
            }
            Some((username, _)) => {
                debug!(username = %username, realm = %self.realm, "Rejected credentials");
                AuthOutcome::Forbidden
            }
            None => {
                debug!(realm = %self.realm, "Malformed Authorization header");
                AuthOutcome::Forbidden
            }
        }
    }
}

/// Whether the request arrived over HTTPS or is addressed to localhost
pub fn is_secure_or_local(request: &RequestHead) -> bool {
    let host = request
        .headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| request.uri.host())
        .unwrap_or_default();
    if host.starts_with("localhost") {
        return true;
    }

    if request.uri.scheme_str() == Some("https") {
        return true;
    }

    request
        .headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}

/// Middleware enforcing the HTTPS policy and the authenticator
pub async fn guard(State(state): State<ApiState>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();

    if state.config.require_https && !is_secure_or_local(&parts) {
        return HttpError::from(ApiError::HttpsRequired).into_response();
    }

    if let Some(authenticator) = &state.authenticator {
        match authenticator.authenticate(&parts).await {
            AuthOutcome::Authorized => {}
            AuthOutcome::ChallengeRequired { challenge } => {
                return HttpError::from(ApiError::authentication_required(challenge)).into_response();
            }
            AuthOutcome::Forbidden => return HttpError::from(ApiError::Forbidden).into_response(),
        }
    }

    next.run(Request::from_parts(parts, body)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn head(builder: axum::http::request::Builder) -> RequestHead {
        builder.body(()).unwrap().into_parts().0
    }

    fn basic(user: &str, password: &str) -> String {
        format!(
            "Basic {}",
            general_purpose::STANDARD.encode(format!("{}:{}", user, password))
        )
    }

    #[test]
    fn test_extract_credentials() {
        assert_eq!(
            BasicAuthenticator::extract_credentials(&basic("ann", "s3:cret")),
            Some(("ann".to_string(), "s3:cret".to_string()))
        );
        assert_eq!(BasicAuthenticator::extract_credentials("Bearer abc"), None);
        assert_eq!(BasicAuthenticator::extract_credentials("Basic !!!"), None);
    }

    #[tokio::test]
    async fn test_basic_authenticator_outcomes() {
        let auth = BasicAuthenticator::new("fruit").with_user("ann", "secret");

        let missing = head(HttpRequest::get("/rest/metadata"));
        assert_eq!(
            auth.authenticate(&missing).await,
            AuthOutcome::ChallengeRequired {
                challenge: "Basic realm=\"fruit\"".to_string()
            }
        );

        let good = head(HttpRequest::get("/rest/metadata").header(header::AUTHORIZATION, basic("ann", "secret")));
        assert_eq!(auth.authenticate(&good).await, AuthOutcome::Authorized);

        let bad = head(HttpRequest::get("/rest/metadata").header(header::AUTHORIZATION, basic("ann", "nope")));
        assert_eq!(auth.authenticate(&bad).await, AuthOutcome::Forbidden);
    }

    #[test]
    fn test_https_policy() {
        assert!(is_secure_or_local(&head(
            HttpRequest::get("/rest/metadata").header(header::HOST, "localhost:8080")
        )));
        assert!(!is_secure_or_local(&head(
            HttpRequest::get("/rest/metadata").header(header::HOST, "fruit.example.com")
        )));
        assert!(is_secure_or_local(&head(
            HttpRequest::get("/rest/metadata")
                .header(header::HOST, "fruit.example.com")
                .header("X-Forwarded-Proto", "HTTPS")
        )));
        assert!(is_secure_or_local(&head(HttpRequest::get(
            "https://fruit.example.com/rest/metadata"
        ))));
    }
}
