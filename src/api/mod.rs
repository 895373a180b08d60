use crate::api::auth::{require_digest_auth, AuthGate, NonceStore, StaticUserStore};
use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::get,
    Extension, Router,
};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{debug, info, info_span, Span};
use ulid::Ulid;

pub mod auth;
pub mod handlers;

const NONCE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Build the application router around an auth gate.
///
/// `/health` stays open; everything under the digest gate goes through
/// [`require_digest_auth`].
#[must_use]
pub fn router(gate: Arc<AuthGate>) -> Router {
    let gated = Router::new()
        .route("/protected", get(handlers::protected))
        .route_layer(middleware::from_fn(require_digest_auth));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(gated)
        .layer(Extension(gate))
}

/// Start the server
///
/// # Errors
///
/// Return error if failed to start the server
pub async fn new(port: u16, realm: String, nonce_ttl: Duration) -> Result<()> {
    let nonces = Arc::new(NonceStore::new(nonce_ttl));
    let users = Arc::new(StaticUserStore::demo());
    let gate = Arc::new(AuthGate::new(realm, nonces.clone(), users));

    // Lazy eviction keeps the store correct; the sweeper only bounds memory
    spawn_nonce_sweeper(nonces);

    let app = router(gate).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &Request<Body>| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span)),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn spawn_nonce_sweeper(nonces: Arc<NonceStore>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(NONCE_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = nonces.sweep().await;
            if removed > 0 {
                debug!(removed, "expired nonces swept");
            }
        }
    });
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
