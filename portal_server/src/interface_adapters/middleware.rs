use axum::Json;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::info;

use crate::domain::ports::PortalStore;
use crate::interface_adapters::protocol::AuthErrorPayload;
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::use_cases::resolve_viewer::ResolveViewerUseCase;

/// Extracts the token from `Authorization: <prefix> <token>`.
///
/// The scheme comparison ignores ASCII case. A header carrying any other
/// scheme yields `None`, the same as a missing header.
pub fn bearer_token<'a>(headers: &'a HeaderMap, prefix: &str) -> Option<&'a str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(prefix) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

// Resolves the viewer once per request and stores it as a request extension.
pub async fn authenticate<S>(
    State(state): State<AppState<S>>,
    mut request: Request,
    next: Next,
) -> Response
where
    S: PortalStore,
{
    let token = bearer_token(request.headers(), &state.header_prefix).map(str::to_owned);
    let use_case = ResolveViewerUseCase {
        clock: SystemClock,
        codec: state.codec.clone(),
        users: state.store.clone(),
    };

    match use_case.execute(token.as_deref()).await {
        Ok(viewer) => {
            request.extensions_mut().insert(viewer);
            next.run(request).await
        }
        Err(err) => {
            info!(error = %err, "rejected bearer token");
            (
                StatusCode::UNAUTHORIZED,
                Json(AuthErrorPayload::new(err.to_string())),
            )
                .into_response()
        }
    }
}
