use axum::{
    extract::Extension,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::api::auth::AuthIdentity;

/// Digest-gated demo resource.
///
/// The identity was attached by the auth middleware; missing it means the
/// route was wired without the gate, which the router never does.
pub async fn protected(Extension(identity): Extension<AuthIdentity>) -> impl IntoResponse {
    Json(json!({
        "message": "This endpoint is protected by Digest Authentication",
        "userId": identity.user_id,
        "username": identity.username,
    }))
}
