use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{Id, User};

// JWT payload. `sub` holds the user id as a decimal string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: u64,
    pub iat: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    pub fn new(user_id: Id, email: Option<String>, now: u64, ttl_seconds: u64) -> Self {
        Self {
            sub: user_id.to_string(),
            email,
            exp: now.saturating_add(ttl_seconds),
            iat: now,
            jti: Some(Uuid::new_v4().to_string()),
        }
    }

    pub fn for_user(user: &User, now: u64, ttl_seconds: u64) -> Self {
        Self::new(user.id, Some(user.email.clone()), now, ttl_seconds)
    }

    // `None` when the subject is not a user id; callers treat that as anonymous.
    pub fn user_id(&self) -> Option<Id> {
        self.sub.parse().ok().filter(|id: &Id| *id > 0)
    }
}

/// Identity attached to every request before an operation runs.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    Authenticated(User),
}

impl Viewer {
    pub fn user(&self) -> Option<&User> {
        match self {
            Viewer::Anonymous => None,
            Viewer::Authenticated(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Viewer::Authenticated(_))
    }

    pub fn is_superuser(&self) -> bool {
        self.user().is_some_and(|user| user.is_superuser)
    }
}
