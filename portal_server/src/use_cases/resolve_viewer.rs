use tracing::{debug, warn};

use crate::domain::auth::Viewer;
use crate::domain::errors::AuthError;
use crate::domain::ports::{Clock, TokenCodec, UserStore};

// Turns an optional bearer token into the request's viewer.
//
// A token that fails to decode is an error. A well-formed token whose user
// cannot be loaded, or is inactive, resolves to an anonymous viewer.
pub struct ResolveViewerUseCase<C, T, S> {
    pub clock: C,
    pub codec: T,
    pub users: S,
}

impl<C, T, S> ResolveViewerUseCase<C, T, S>
where
    C: Clock,
    T: TokenCodec,
    S: UserStore,
{
    pub async fn execute(&self, token: Option<&str>) -> Result<Viewer, AuthError> {
        let Some(token) = token else {
            return Ok(Viewer::Anonymous);
        };

        let claims = self.codec.decode(token, self.clock.now_epoch_seconds())?;
        let Some(user_id) = claims.user_id() else {
            debug!(sub = %claims.sub, "token subject is not a user id");
            return Ok(Viewer::Anonymous);
        };

        match self.users.user_by_id(user_id).await {
            Ok(Some(user)) if user.is_active => Ok(Viewer::Authenticated(user)),
            Ok(Some(_)) => {
                debug!(user_id, "token user is inactive");
                Ok(Viewer::Anonymous)
            }
            Ok(None) => {
                debug!(user_id, "token user no longer exists");
                Ok(Viewer::Anonymous)
            }
            Err(err) => {
                warn!(user_id, error = %err, "failed to load token user");
                Ok(Viewer::Anonymous)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Claims;
    use crate::interface_adapters::jwt::Hs256Codec;
    use crate::use_cases::test_support::{FailureFlags, FixedClock, NOW, RecordingStore};

    const SECRET: &str = "resolve-viewer-secret";

    fn use_case(store: RecordingStore) -> ResolveViewerUseCase<FixedClock, Hs256Codec, RecordingStore> {
        ResolveViewerUseCase {
            clock: FixedClock(NOW),
            codec: Hs256Codec::new(SECRET, 0),
            users: store,
        }
    }

    fn token_for(user_id: i64, ttl: u64) -> String {
        Hs256Codec::new(SECRET, 0)
            .encode(&Claims::new(user_id, None, NOW, ttl))
            .expect("encode token")
    }

    #[tokio::test]
    async fn when_no_token_is_sent_then_viewer_is_anonymous() {
        let viewer = use_case(RecordingStore::new())
            .execute(None)
            .await
            .expect("resolve viewer");

        assert_eq!(viewer, Viewer::Anonymous);
    }

    #[tokio::test]
    async fn when_token_belongs_to_active_user_then_viewer_is_that_user() {
        let store = RecordingStore::new();
        let user = store.seed_user("head@lincoln.edu").await;
        let token = token_for(user.id, 300);

        let viewer = use_case(store)
            .execute(Some(&token))
            .await
            .expect("resolve viewer");

        assert_eq!(viewer.user().map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn when_token_user_was_deleted_then_viewer_is_anonymous() {
        let token = token_for(404, 300);

        let viewer = use_case(RecordingStore::new())
            .execute(Some(&token))
            .await
            .expect("resolve viewer");

        assert_eq!(viewer, Viewer::Anonymous);
    }

    #[tokio::test]
    async fn when_token_user_is_inactive_then_viewer_is_anonymous() {
        let store = RecordingStore::new();
        let user = store.seed_inactive_user("former@lincoln.edu").await;
        let token = token_for(user.id, 300);

        let viewer = use_case(store)
            .execute(Some(&token))
            .await
            .expect("resolve viewer");

        assert!(!viewer.is_authenticated());
    }

    #[tokio::test]
    async fn when_user_lookup_fails_then_viewer_is_anonymous() {
        let store = RecordingStore::new();
        let user = store.seed_user("head@lincoln.edu").await;
        let token = token_for(user.id, 300);
        let store = store.with_failures(FailureFlags {
            reads: true,
            ..Default::default()
        });

        let viewer = use_case(store)
            .execute(Some(&token))
            .await
            .expect("resolve viewer");

        assert_eq!(viewer, Viewer::Anonymous);
    }

    #[tokio::test]
    async fn when_token_is_signed_with_another_secret_then_returns_invalid_signature() {
        let token = Hs256Codec::new("someone-else", 0)
            .encode(&Claims::new(1, None, NOW, 300))
            .expect("encode token");

        let result = use_case(RecordingStore::new()).execute(Some(&token)).await;

        assert_eq!(result, Err(AuthError::InvalidSignature));
    }

    #[tokio::test]
    async fn when_token_is_expired_then_returns_expired() {
        let token = Hs256Codec::new(SECRET, 0)
            .encode(&Claims::new(1, None, NOW - 600, 300))
            .expect("encode token");

        let result = use_case(RecordingStore::new()).execute(Some(&token)).await;

        assert_eq!(result, Err(AuthError::Expired));
    }
}
