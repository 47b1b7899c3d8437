use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    server::AppState,
    transport::{
        middleware::{add_response_headers, check_auth},
        routes::{rooms, stats},
        websocket_server::websocket_handler,
    },
};

const API_V1: &str = "/v1";

pub fn router(state: Arc<AppState>) -> Router {
    let v1_routes = Router::new()
        .route("/info", get(stats::get_info))
        .route("/stats", get(stats::get_stats))
        .route("/rooms", get(rooms::list_rooms))
        .route("/rooms/{room_id}", get(rooms::get_room))
        .layer(middleware::from_fn_with_state(state.clone(), check_auth));

    let mut app = Router::new()
        .nest(API_V1, v1_routes)
        .route("/healthz", get(stats::healthz))
        .route("/ws", get(websocket_handler));

    if let Some(dir) = state.config.server.public_dir.as_deref() {
        tracing::info!("Serving static files from {}", dir);
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(middleware::from_fn(add_response_headers))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{configs::Config, protocol::OutgoingMessage};
    use crate::room::EnqueueRequest;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use futures::{SinkExt, StreamExt};
    use serde_json::Value;
    use std::time::Duration;
    use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
    use tower::util::ServiceExt;

    async fn serve(config: Config) -> (std::net::SocketAddr, Arc<AppState>) {
        let state = Arc::new(AppState::new(config));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, state)
    }

    async fn fetch(app: Router, path: &str, password: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().uri(path);
        if let Some(password) = password {
            request = request.header("authorization", password);
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        assert_eq!(response.headers()["radio-api-version"], "1");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn locked_state() -> Arc<AppState> {
        let mut config = Config::default();
        config.server.password = Some("pw".into());
        Arc::new(AppState::new(config))
    }

    async fn next_event<S>(stream: &mut S) -> OutgoingMessage
    where
        S: futures::Stream<Item = Result<WsMessage, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        loop {
            let msg = tokio::time::timeout(Duration::from_secs(2), stream.next())
                .await
                .expect("timed out waiting for event")
                .expect("stream ended")
                .expect("websocket error");
            if let WsMessage::Text(text) = msg {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_join_enqueue_over_websocket() {
        let (addr, state) = serve(Config::default()).await;
        let (mut ws, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();

        assert!(matches!(next_event(&mut ws).await, OutgoingMessage::Ready { .. }));

        ws.send(WsMessage::Text(r#"{"event":"join","roomId":"lobby"}"#.into()))
            .await
            .unwrap();
        assert!(matches!(
            next_event(&mut ws).await,
            OutgoingMessage::QueueUpdated { ref queue, .. } if queue.is_empty()
        ));

        ws.send(WsMessage::Text(
            r#"{"event":"enqueue","roomId":"lobby","url":"a.mp3","title":"A"}"#.into(),
        ))
        .await
        .unwrap();
        assert!(matches!(next_event(&mut ws).await, OutgoingMessage::QueueUpdated { .. }));
        match next_event(&mut ws).await {
            OutgoingMessage::NowPlaying { title, duration, .. } => {
                assert_eq!(title, "A");
                assert_eq!(duration, 180);
            }
            other => panic!("unexpected {:?}", other),
        }

        ws.send(WsMessage::Text("{oops".into())).await.unwrap();
        assert!(matches!(next_event(&mut ws).await, OutgoingMessage::Error { .. }));

        ws.close(None).await.unwrap();
        for _ in 0..100 {
            if state.gateway.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(state.gateway.is_empty());
        let snapshot = state.registry.snapshot(&"lobby".into(), 0).unwrap();
        assert_eq!(snapshot.listeners, 0);
    }

    #[tokio::test]
    async fn test_websocket_requires_password_when_configured() {
        let mut config = Config::default();
        config.server.password = Some("secret".into());
        let (addr, _) = serve(config).await;

        assert!(connect_async(format!("ws://{}/ws", addr)).await.is_err());
    }

    #[tokio::test]
    async fn test_healthz_skips_auth() {
        let state = locked_state();
        let (status, body) = fetch(router(state), "/healthz", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_v1_routes_reject_missing_or_wrong_password() {
        let state = locked_state();
        for path in ["/v1/info", "/v1/stats", "/v1/rooms", "/v1/rooms/r1"] {
            for password in [None, Some("nope")] {
                let (status, body) = fetch(router(state.clone()), path, password).await;
                assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", path);
                assert_eq!(body["status"], 401);
                assert_eq!(body["error"], "Unauthorized");
                assert_eq!(body["path"], path);
            }
        }
    }

    #[tokio::test]
    async fn test_info_reports_package_version() {
        let state = locked_state();
        let (status, body) = fetch(router(state), "/v1/info", Some("pw")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"]["semver"], env!("CARGO_PKG_VERSION"));
        assert!(body["git"]["commit"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_room_is_404_and_not_created() {
        let state = locked_state();
        let (status, body) = fetch(router(state.clone()), "/v1/rooms/nope", Some("pw")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], 404);
        assert_eq!(body["path"], "/v1/rooms/nope");
        assert!(!state.registry.contains(&"nope".into()));

        let (status, body) = fetch(router(state.clone()), "/v1/rooms", Some("pw")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
        assert!(state.registry.is_empty());
    }

    #[tokio::test]
    async fn test_room_list_snapshot_and_stats() {
        let state = locked_state();
        let gateway = state.gateway.clone();
        state
            .registry
            .join(&"lobby".into(), &"alice".into(), 0, gateway.as_ref());
        state
            .registry
            .enqueue(&"lobby".into(), EnqueueRequest::new("a.mp3"), 0, gateway.as_ref());
        state
            .registry
            .enqueue(&"lobby".into(), EnqueueRequest::new("b.mp3"), 0, gateway.as_ref());

        let (status, body) = fetch(router(state.clone()), "/v1/rooms", Some("pw")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["roomId"], "lobby");
        assert_eq!(body[0]["listeners"], 1);
        assert_eq!(body[0]["queueLength"], 2);
        assert_eq!(body[0]["pending"], 1);
        assert!(body[0]["nowPlaying"].is_string());

        let (status, body) = fetch(router(state.clone()), "/v1/rooms/lobby", Some("pw")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["queue"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["nowPlaying"]["url"], "a.mp3");
        assert_eq!(body["votes"], serde_json::json!({ "likes": 0, "skips": 0 }));

        let (status, body) = fetch(router(state), "/v1/stats", Some("pw")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rooms"], 1);
        assert_eq!(body["playingRooms"], 1);
        assert_eq!(body["listeners"], 1);
        assert_eq!(body["connections"], 0);
    }

    #[tokio::test]
    async fn test_binary_frame_is_answered_with_error() {
        let (addr, state) = serve(Config::default()).await;
        let (mut ws, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
        assert!(matches!(next_event(&mut ws).await, OutgoingMessage::Ready { .. }));

        ws.send(WsMessage::Binary(vec![1u8, 2, 3].into())).await.unwrap();
        match next_event(&mut ws).await {
            OutgoingMessage::Error { message } => assert!(message.contains("binary")),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(state.gateway.len(), 1);
    }
}
