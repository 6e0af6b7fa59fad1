use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::ports::Clock;
use crate::interface_adapters::jwt::Hs256Codec;

// Application state shared by the middleware and the operation handler.
#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
    pub codec: Hs256Codec,
    // Scheme expected before the token in the `Authorization` header.
    pub header_prefix: Arc<str>,
}

impl<S> AppState<S> {
    pub fn new(store: S, codec: Hs256Codec, header_prefix: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            codec,
            header_prefix: header_prefix.into(),
        }
    }
}

// System clock adapter used for token checks and timestamps.
#[derive(Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
