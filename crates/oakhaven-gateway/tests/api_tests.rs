//! Integration tests for the gateway's HTTP surface.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use oakhaven_gateway::router::build_router;
use oakhaven_gateway::state::{GatewayCommand, GatewaySnapshot, GatewayState, ResidentSnapshot};
use oakhaven_types::enums::{LifecycleStatus, ResidentKind, SpeedMode};
use oakhaven_types::ids::ResidentId;
use oakhaven_types::structs::{Custody, Needs, Position, Resident, ResidentTransient};
use serde_json::Value;
use tower::ServiceExt;

const REGISTRATION_SECRET: &[u8] = b"test-registration-secret";

fn make_resident() -> Resident {
    Resident {
        id: ResidentId::new(),
        passport_no: "OC-0000001".to_owned(),
        display_name: "Test Resident".to_owned(),
        kind: ResidentKind::Human,
        status: LifecycleStatus::Alive,
        position: Position::new(0.0, 0.0),
        facing_degrees: 0,
        velocity: Position::new(0.0, 0.0),
        speed_mode: SpeedMode::Stopped,
        sleeping: false,
        needs: Needs { hunger: 100, thirst: 100, energy: 100, bladder: 0, health: 100, social: 100 },
        wallet: 0,
        inventory: Vec::new(),
        employment: None,
        current_building: None,
        webhook_url: None,
        bio: None,
        custody: Custody::default(),
        transient: ResidentTransient::default(),
        registered_at: Utc::now(),
    }
}

async fn make_test_state() -> (Arc<GatewayState>, tokio::sync::mpsc::Receiver<GatewayCommand>) {
    let (state, commands) = GatewayState::with_channel(REGISTRATION_SECRET.to_vec(), "https://example.test/map".to_owned());

    let resident = make_resident();
    {
        let mut snapshot = state.snapshot.write().await;
        snapshot.world_seconds = 120;
        snapshot.residents.insert(resident.id, ResidentSnapshot { status: resident.status });
    }

    (Arc::new(state), commands)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn index_returns_html() {
    let (state, _commands) = make_test_state().await;
    let router = build_router(state);

    let response = router.oneshot(Request::get("/").body(Body::empty()).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn register_resident_without_bearer_is_rejected() {
    let (state, _commands) = make_test_state().await;
    let router = build_router(state);
    let resident = make_resident();

    let response = router
        .oneshot(
            Request::post("/internal/registration")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&resident).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_resident_with_valid_bearer_queues_the_command() {
    let (state, mut commands) = make_test_state().await;
    let router = build_router(Arc::clone(&state));
    let resident = make_resident();
    let resident_id = resident.id;

    let response = router
        .oneshot(
            Request::post("/internal/registration")
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {}", String::from_utf8_lossy(REGISTRATION_SECRET)))
                .body(Body::from(serde_json::to_vec(&resident).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["queued"], true);

    let command = commands.recv().await.expect("command");
    match command {
        GatewayCommand::RegisterResident(queued) => assert_eq!(queued.id, resident_id),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[tokio::test]
async fn redeem_feedback_with_malformed_token_is_rejected() {
    let (state, _commands) = make_test_state().await;
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::post("/internal/feedback/not-a-uuid")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::json!({ "text": "it was fine" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn redeem_feedback_replies_not_found_when_scheduler_says_so() {
    let (state, mut commands) = make_test_state().await;
    let router = build_router(Arc::clone(&state));

    let token = uuid::Uuid::now_v7();
    let handle = tokio::spawn(async move {
        if let Some(GatewayCommand::ResolveFeedback { reply, .. }) = commands.recv().await {
            let _ = reply.send(false);
        }
    });

    let response = router
        .oneshot(
            Request::post(format!("/internal/feedback/{token}"))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::json!({ "text": "it was fine" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    handle.await.unwrap();
}

#[tokio::test]
async fn nonexistent_route_returns_404() {
    let (state, _commands) = make_test_state().await;
    let router = build_router(state);

    let response = router.oneshot(Request::get("/api/nonexistent").body(Body::empty()).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn publish_reaches_subscribers() {
    let (state, _commands) = make_test_state().await;
    let mut rx = state.subscribe();

    let delivered = state.publish(
        oakhaven_gateway::state::Recipient::Spectators,
        oakhaven_types::protocol::ServerMessage::SystemAnnouncement(oakhaven_types::protocol::SystemAnnouncement {
            title: "test".to_owned(),
            version: "0.0.0".to_owned(),
        }),
    );

    assert_eq!(delivered, 1);
    rx.recv().await.expect("recv");
}

#[tokio::test]
async fn snapshot_reflects_seeded_world_state() {
    let (state, _commands) = make_test_state().await;
    let snapshot: GatewaySnapshot = state.snapshot.read().await.clone();
    assert_eq!(snapshot.world_seconds, 120);
    assert_eq!(snapshot.residents.len(), 1);
}
