use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::domain::ports::PortalStore;
use crate::interface_adapters::handlers::{execute_operation, health};
use crate::interface_adapters::middleware::authenticate;
use crate::interface_adapters::state::AppState;

pub fn app<S>(state: AppState<S>) -> Router
where
    S: PortalStore,
{
    Router::new()
        .route("/graphql", post(execute_operation::<S>))
        // Only the operations endpoint resolves a viewer.
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate::<S>,
        ))
        .route("/health", get(health))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Claims;
    use crate::domain::entities::{NewUser, User};
    use crate::domain::ports::{Clock, TokenCodec, UserStore};
    use crate::interface_adapters::jwt::Hs256Codec;
    use crate::interface_adapters::memory_store::InMemoryPortalStore;
    use crate::interface_adapters::state::SystemClock;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const SECRET: &str = "route-test-secret";

    fn build_test_app(store: InMemoryPortalStore) -> Router {
        app(AppState::new(store, Hs256Codec::new(SECRET, 0), "JWT"))
    }

    async fn seed_superuser(store: &InMemoryPortalStore) -> User {
        let user = store
            .insert_user(NewUser {
                email: "root@portal.edu".to_string(),
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                created_at: SystemClock.now(),
            })
            .await
            .expect("insert user");
        store
            .update_user(User {
                is_superuser: true,
                ..user
            })
            .await
            .expect("promote user")
    }

    fn token_for(user: &User) -> String {
        Hs256Codec::new(SECRET, 0)
            .encode(&Claims::for_user(user, SystemClock.now_epoch_seconds(), 300))
            .expect("encode token")
    }

    fn operation_request(authorization: Option<String>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header("content-type", "application/json");
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        builder
            .body(Body::from(body.to_string()))
            .expect("expected request to build")
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("expected response body");
        serde_json::from_slice(&body).expect("expected json body")
    }

    #[tokio::test]
    async fn when_health_is_requested_then_returns_ok_without_a_token() {
        let request = Request::builder()
            .uri("/health")
            .header("authorization", "JWT not-a-token")
            .body(Body::empty())
            .expect("expected request to build");

        let response = build_test_app(InMemoryPortalStore::new())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn when_superuser_creates_school_then_returns_200_and_full_envelope() {
        let store = InMemoryPortalStore::new();
        let root = seed_superuser(&store).await;

        let response = build_test_app(store)
            .oneshot(operation_request(
                Some(format!("JWT {}", token_for(&root))),
                json!({"operation": "create_school", "input": {"name": "Lincoln High"}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let payload = json_body(response).await;
        assert_eq!(payload["status"], true);
        assert_eq!(payload["query"]["slug"], "lincoln-high");
        assert!(payload["errors"].is_null());
        assert!(payload["error_code"].is_null());
    }

    #[tokio::test]
    async fn when_anonymous_viewer_creates_school_then_returns_401_envelope() {
        let response = build_test_app(InMemoryPortalStore::new())
            .oneshot(operation_request(
                None,
                json!({"operation": "create_school", "input": {"name": "Lincoln High"}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let payload = json_body(response).await;
        assert_eq!(payload["status"], false);
        assert_eq!(payload["error_code"], 401);
    }

    #[tokio::test]
    async fn when_header_uses_another_prefix_then_viewer_is_anonymous() {
        let store = InMemoryPortalStore::new();
        let root = seed_superuser(&store).await;

        let response = build_test_app(store)
            .oneshot(operation_request(
                Some(format!("Bearer {}", token_for(&root))),
                json!({"operation": "create_school", "input": {"name": "Lincoln High"}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["status"], false);
    }

    #[tokio::test]
    async fn when_token_is_garbage_then_returns_401_error_payload() {
        let response = build_test_app(InMemoryPortalStore::new())
            .oneshot(operation_request(
                Some("JWT %%%not-a-token%%%".to_string()),
                json!({"operation": "find_school", "input": {"school_id": 1}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let payload = json_body(response).await;
        assert!(payload["data"].is_null());
        assert_eq!(payload["errors"][0]["message"], "Error decoding token");
    }

    #[tokio::test]
    async fn when_operation_is_unknown_then_returns_400_on_operation_field() {
        let response = build_test_app(InMemoryPortalStore::new())
            .oneshot(operation_request(
                None,
                json!({"operation": "drop_school", "input": {}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = json_body(response).await;
        assert_eq!(payload["errors"][0]["field"], "operation");
        assert_eq!(payload["error_code"], 400);
    }

    #[tokio::test]
    async fn when_school_does_not_exist_then_find_school_returns_404_envelope() {
        let response = build_test_app(InMemoryPortalStore::new())
            .oneshot(operation_request(
                None,
                json!({"operation": "find_school", "input": {"school_id": 77}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let payload = json_body(response).await;
        assert_eq!(payload["errors"][0]["field"], "school_id");
        assert_eq!(payload["errors"][0]["details"]["code"], "not-found");
    }

    #[tokio::test]
    async fn when_body_is_not_json_then_returns_400_envelope() {
        let request = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .expect("expected request to build");

        let response = build_test_app(InMemoryPortalStore::new())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["status"], false);
    }

    #[tokio::test]
    async fn when_operations_route_is_called_with_get_then_returns_405() {
        let request = Request::builder()
            .method("GET")
            .uri("/graphql")
            .body(Body::empty())
            .expect("expected request to build");

        let response = build_test_app(InMemoryPortalStore::new())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
