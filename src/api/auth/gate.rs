//! Request-level digest authentication gate.
//!
//! Walks each request through header check, nonce check, user lookup, and
//! digest verification. Every failure collapses to the same observable
//! outcome, a `401` carrying a freshly minted challenge, so callers cannot
//! distinguish a bad nonce from a bad password or an unknown user. The
//! internal reason is kept for logs.

use axum::{
    extract::{Extension, Request},
    http::{header::AUTHORIZATION, header::WWW_AUTHENTICATE, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use super::nonce::NonceStore;
use super::parser::{self, ParseError};
use super::users::UserLookup;
use super::verifier;

/// The `opaque` value the reference deployment pins in its challenges.
const DEFAULT_OPAQUE: &str = "5ccc069c403ebaf9f0171e9517f40e41";

/// Why a request was rejected. Never surfaced to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    MalformedHeader,
    MissingField(Vec<&'static str>),
    MissingQopParams,
    InvalidNonce,
    UnknownUser,
    ResponseMismatch,
}

impl DenyReason {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedHeader => "malformed_header",
            Self::MissingField(_) => "missing_field",
            Self::MissingQopParams => "missing_qop_params",
            Self::InvalidNonce => "invalid_nonce",
            Self::UnknownUser => "unknown_user",
            Self::ResponseMismatch => "response_mismatch",
        }
    }
}

impl From<ParseError> for DenyReason {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::MalformedHeader => Self::MalformedHeader,
            ParseError::MissingField(fields) => Self::MissingField(fields),
            ParseError::MissingQopParams => Self::MissingQopParams,
        }
    }
}

/// Identity attached to the request extensions on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub user_id: u32,
    pub username: String,
}

/// Per-request result of walking the gate.
#[derive(Debug)]
pub enum AuthOutcome {
    Accepted(AuthIdentity),
    Rejected {
        reason: DenyReason,
        challenge: String,
    },
}

pub struct AuthGate {
    realm: String,
    opaque: String,
    nonces: Arc<NonceStore>,
    users: Arc<dyn UserLookup>,
}

impl AuthGate {
    pub fn new(
        realm: impl Into<String>,
        nonces: Arc<NonceStore>,
        users: Arc<dyn UserLookup>,
    ) -> Self {
        Self {
            realm: realm.into(),
            opaque: DEFAULT_OPAQUE.to_string(),
            nonces,
            users,
        }
    }

    #[must_use]
    pub fn with_opaque(mut self, opaque: impl Into<String>) -> Self {
        self.opaque = opaque.into();
        self
    }

    #[must_use]
    pub fn nonce_store(&self) -> Arc<NonceStore> {
        self.nonces.clone()
    }

    /// Decide whether the request may pass.
    ///
    /// Rejections always carry a challenge built around a new nonce; the
    /// nonce from the failed attempt is never handed back.
    pub async fn authenticate(&self, method: &str, headers: &HeaderMap) -> AuthOutcome {
        match self.check(method, headers).await {
            Ok(identity) => {
                debug!(username = %identity.username, "digest auth accepted");
                AuthOutcome::Accepted(identity)
            }
            Err(reason) => {
                let nonce = self.nonces.generate().await;
                debug!(reason = reason.as_str(), "digest auth rejected, sending challenge");
                AuthOutcome::Rejected {
                    reason,
                    challenge: self.challenge_header(&nonce),
                }
            }
        }
    }

    async fn check(&self, method: &str, headers: &HeaderMap) -> Result<AuthIdentity, DenyReason> {
        let header = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let Some(header) = header else {
            debug!("authorization header missing");
            return Err(DenyReason::MalformedHeader);
        };

        let credential = parser::parse(header).map_err(|err| {
            debug!("digest header rejected: {err}");
            DenyReason::from(err)
        })?;

        if !self.nonces.is_valid(&credential.nonce).await {
            debug!("unknown or expired nonce");
            return Err(DenyReason::InvalidNonce);
        }

        let Some(user) = self.users.find(&credential.username) else {
            debug!(username = %credential.username, "user not found");
            return Err(DenyReason::UnknownUser);
        };

        if !verifier::verify(&credential, &user.secret, method) {
            debug!(username = %user.username, "digest response mismatch");
            return Err(DenyReason::ResponseMismatch);
        }

        Ok(AuthIdentity {
            user_id: user.user_id,
            username: user.username,
        })
    }

    fn challenge_header(&self, nonce: &str) -> String {
        format!(
            "Digest realm=\"{realm}\", nonce=\"{nonce}\", opaque=\"{opaque}\", algorithm=MD5, qop=\"auth\"",
            realm = self.realm,
            opaque = self.opaque,
        )
    }
}

/// Axum middleware enforcing digest auth on the wrapped routes.
///
/// On success the [`AuthIdentity`] lands in the request extensions for the
/// downstream handler; on failure the client gets `401` plus the challenge.
pub async fn require_digest_auth(
    Extension(gate): Extension<Arc<AuthGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    let method = request.method().as_str().to_string();

    match gate.authenticate(&method, request.headers()).await {
        AuthOutcome::Accepted(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        AuthOutcome::Rejected { challenge, .. } => {
            let mut headers = HeaderMap::new();
            if let Ok(value) = challenge.parse() {
                headers.insert(WWW_AUTHENTICATE, value);
            }
            let body = Json(json!({
                "statusCode": 401,
                "message": "Unauthorized: Digest Authentication Required",
            }));
            (StatusCode::UNAUTHORIZED, headers, body).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::users::StaticUserStore;
    use crate::api::auth::verifier::{ha1, ha2};
    use axum::http::HeaderValue;
    use md5::{Digest, Md5};
    use std::time::Duration;

    fn gate() -> AuthGate {
        AuthGate::new(
            "Restricted Access",
            Arc::new(NonceStore::new(Duration::from_secs(300))),
            Arc::new(StaticUserStore::demo()),
        )
    }

    fn digest_headers(header: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(header).unwrap());
        headers
    }

    fn legacy_response(nonce: &str) -> String {
        let ha1 = ha1("admin", "Restricted Access", "secret");
        let ha2 = ha2("GET", "/protected");
        hex::encode(Md5::digest(format!("{ha1}:{nonce}:{ha2}").as_bytes()))
    }

    fn legacy_header(nonce: &str, response: &str) -> String {
        format!(
            "Digest username=\"admin\", realm=\"Restricted Access\", \
             nonce=\"{nonce}\", uri=\"/protected\", response=\"{response}\""
        )
    }

    fn rejected_reason(outcome: AuthOutcome) -> (DenyReason, String) {
        match outcome {
            AuthOutcome::Rejected { reason, challenge } => (reason, challenge),
            AuthOutcome::Accepted(identity) => {
                panic!("expected rejection, got {identity:?}")
            }
        }
    }

    #[tokio::test]
    async fn accepts_valid_legacy_credential() {
        let gate = gate();
        let nonce = gate.nonce_store().generate().await;
        let header = legacy_header(&nonce, &legacy_response(&nonce));

        match gate.authenticate("GET", &digest_headers(&header)).await {
            AuthOutcome::Accepted(identity) => {
                assert_eq!(identity.user_id, 1);
                assert_eq!(identity.username, "admin");
            }
            AuthOutcome::Rejected { reason, .. } => {
                panic!("expected accept, rejected with {reason:?}")
            }
        }
    }

    #[tokio::test]
    async fn missing_header_yields_challenge() {
        let gate = gate();
        let (reason, challenge) = rejected_reason(gate.authenticate("GET", &HeaderMap::new()).await);

        assert_eq!(reason, DenyReason::MalformedHeader);
        assert!(challenge.starts_with("Digest realm=\"Restricted Access\""));
        assert!(challenge.contains("algorithm=MD5"));
        assert!(challenge.contains("qop=\"auth\""));
    }

    #[tokio::test]
    async fn unknown_nonce_is_rejected_with_fresh_nonce() {
        let gate = gate();
        let stale = "00000000000000000000000000000000";
        let header = legacy_header(stale, &legacy_response(stale));

        let (reason, challenge) = rejected_reason(gate.authenticate("GET", &digest_headers(&header)).await);

        assert_eq!(reason, DenyReason::InvalidNonce);
        // The rejected nonce is never reissued
        assert!(!challenge.contains(stale));
    }

    #[tokio::test]
    async fn unknown_user_is_rejected() {
        let gate = gate();
        let nonce = gate.nonce_store().generate().await;
        let header = format!(
            "Digest username=\"root\", realm=\"Restricted Access\", \
             nonce=\"{nonce}\", uri=\"/protected\", response=\"{response}\"",
            response = legacy_response(&nonce)
        );

        let (reason, _) = rejected_reason(gate.authenticate("GET", &digest_headers(&header)).await);
        assert_eq!(reason, DenyReason::UnknownUser);
    }

    #[tokio::test]
    async fn wrong_response_is_rejected() {
        let gate = gate();
        let nonce = gate.nonce_store().generate().await;
        let header = legacy_header(&nonce, "00000000000000000000000000000000");

        let (reason, _) = rejected_reason(gate.authenticate("GET", &digest_headers(&header)).await);
        assert_eq!(reason, DenyReason::ResponseMismatch);
    }

    #[tokio::test]
    async fn qop_without_companions_is_rejected_before_verification() {
        let gate = gate();
        let nonce = gate.nonce_store().generate().await;
        let header = format!(
            "Digest username=\"admin\", realm=\"Restricted Access\", \
             nonce=\"{nonce}\", uri=\"/protected\", \
             response=\"{response}\", qop=auth",
            response = legacy_response(&nonce)
        );

        let (reason, _) = rejected_reason(gate.authenticate("GET", &digest_headers(&header)).await);
        assert_eq!(reason, DenyReason::MissingQopParams);
    }
}
