//! HTTP handlers for the gateway's own status page and the internal
//! companion contract the (out-of-scope) registration/feedback HTTP
//! surface calls into (§4.13 Ambient addition).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::Json;
use oakhaven_types::structs::Resident;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::GatewayError;
use crate::state::{GatewayCommand, GatewayState};

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing the gateway's current world time and
/// known resident count.
pub async fn index(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let world_seconds = snapshot.world_seconds;
    let resident_count = snapshot.residents.len();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Oakhaven Gateway</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        .status {{ color: #3fb950; font-weight: bold; }}
    </style>
</head>
<body>
    <h1>Oakhaven Gateway</h1>
    <p>Status: <span class="status">RUNNING</span></p>
    <div>
        <div class="metric">
            <div class="label">World seconds</div>
            <div class="value">{world_seconds}</div>
        </div>
        <div class="metric">
            <div class="label">Residents</div>
            <div class="value">{resident_count}</div>
        </div>
    </div>
    <p><code>ws://host:port/ws?token=...</code> -- player connection</p>
    <p><code>ws://host:port/ws?spectate=&lt;resident-id&gt;</code> -- spectator connection</p>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// POST /internal/registration
// ---------------------------------------------------------------------------

/// Forward a newly registered resident to the world clock's train queue.
///
/// Accepts the fully-formed [`Resident`] record built by the (out-of-scope)
/// external HTTP registration surface, gated by the same bearer token that
/// surface already presents for `REGISTRATION_TOKEN`. This is a thin
/// contract: id assignment, passport numbering, and session token minting
/// all happen upstream of this endpoint.
///
/// # Route
///
/// `POST /internal/registration`
pub async fn register_resident(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    Json(resident): Json<Resident>,
) -> Result<impl IntoResponse, GatewayError> {
    require_registration_bearer(&headers, &state)?;

    state
        .commands
        .send(GatewayCommand::RegisterResident(resident))
        .await
        .map_err(|_err| GatewayError::Internal("scheduler command channel closed".to_owned()))?;

    Ok((StatusCode::ACCEPTED, Json(serde_json::json!({ "queued": true }))))
}

// ---------------------------------------------------------------------------
// POST /internal/feedback/:token
// ---------------------------------------------------------------------------

/// Redeem a single-use feedback token minted by the reflection subsystem.
///
/// # Route
///
/// `POST /internal/feedback/:token`
pub async fn redeem_feedback(
    State(state): State<Arc<GatewayState>>,
    Path(token_str): Path<String>,
    Json(body): Json<FeedbackBody>,
) -> Result<impl IntoResponse, GatewayError> {
    let token = token_str.parse::<Uuid>().map_err(|err| GatewayError::InvalidUuid(format!("{token_str}: {err}")))?.into();

    let (reply, recv) = oneshot::channel();
    state
        .commands
        .send(GatewayCommand::ResolveFeedback { token, response_text: body.text, reply })
        .await
        .map_err(|_err| GatewayError::Internal("scheduler command channel closed".to_owned()))?;

    let redeemed = recv.await.map_err(|_err| GatewayError::Internal("scheduler dropped the reply channel".to_owned()))?;

    if redeemed {
        Ok((StatusCode::OK, Json(serde_json::json!({ "redeemed": true }))))
    } else {
        Err(GatewayError::NotFound("feedback token not found or already redeemed".to_owned()))
    }
}

/// Request body for [`redeem_feedback`].
#[derive(Debug, serde::Deserialize)]
pub struct FeedbackBody {
    /// The free-text response being recorded.
    pub text: String,
}

/// Check the `Authorization: Bearer <token>` header against the
/// configured registration secret.
fn require_registration_bearer(headers: &HeaderMap, state: &GatewayState) -> Result<(), GatewayError> {
    let presented = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| GatewayError::Auth("missing bearer token".to_owned()))?;

    if presented.as_bytes() == state.session_secret.as_slice() {
        Ok(())
    } else {
        Err(GatewayError::Auth("bearer token did not match the registration secret".to_owned()))
    }
}
