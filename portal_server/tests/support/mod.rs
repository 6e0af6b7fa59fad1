use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use portal_server::app;
use portal_server::domain::auth::Claims;
use portal_server::domain::entities::{NewUser, User};
use portal_server::domain::ports::{Clock, TokenCodec, UserStore};
use portal_server::interface_adapters::InMemoryPortalStore;
use portal_server::interface_adapters::jwt::Hs256Codec;
use portal_server::interface_adapters::state::{AppState, SystemClock};
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";

pub struct Portal {
    pub store: InMemoryPortalStore,
    pub router: Router,
}

impl Portal {
    pub fn new() -> Self {
        let store = InMemoryPortalStore::new();
        let router = app(AppState::new(
            store.clone(),
            Hs256Codec::new(SECRET, 0),
            "JWT",
        ));
        Self { store, router }
    }

    pub async fn user(&self, email: &str, superuser: bool) -> User {
        let user = self
            .store
            .insert_user(NewUser {
                email: email.to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                created_at: Utc::now(),
            })
            .await
            .expect("insert user");
        self.store
            .update_user(User {
                is_superuser: superuser,
                ..user
            })
            .await
            .expect("update user")
    }

    pub async fn call(&self, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("JWT {token}"));
        }
        let request = builder
            .body(Body::from(body.to_string()))
            .expect("request should build");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request should be served");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }
}

pub fn token(user_id: i64, secret: &str, ttl: u64) -> String {
    token_issued_at(user_id, secret, SystemClock.now_epoch_seconds(), ttl)
}

pub fn token_issued_at(user_id: i64, secret: &str, iat: u64, ttl: u64) -> String {
    Hs256Codec::new(secret, 0)
        .encode(&Claims::new(user_id, None, iat, ttl))
        .expect("encode token")
}
