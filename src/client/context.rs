//! Per-client request state: the auth token and the in-flight request count.
//!
//! A [`RequestContext`] is cloned into every component that issues backend
//! calls; clones share the same token and counter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::ClientError;

// ---

#[derive(Debug, Clone)]
pub struct RequestContext {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    token: watch::Sender<Option<String>>,
    in_flight: AtomicUsize,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RequestContext {
    pub fn new(token: Option<String>) -> Self {
        // ---
        let (token, _) = watch::channel(token);
        RequestContext {
            inner: Arc::new(Inner {
                token,
                in_flight: AtomicUsize::new(0),
            }),
        }
    }

    /// Publish a token; callers blocked in [`wait_for_auth`](Self::wait_for_auth) wake up.
    pub fn set_token(&self, token: impl Into<String>) {
        self.inner.token.send_replace(Some(token.into()));
    }

    pub fn clear_token(&self) {
        self.inner.token.send_replace(None);
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.token.borrow().is_some()
    }

    /// Wait until a token is available, giving up after `timeout`.
    pub async fn wait_for_auth(&self, timeout: Duration) -> Result<String, ClientError> {
        // ---
        let mut rx = self.inner.token.subscribe();
        let timed_out = ClientError::AuthTimeout { waited: timeout };

        let waited = match tokio::time::timeout(timeout, rx.wait_for(Option::is_some)).await {
            Ok(Ok(token)) => (*token).clone().ok_or(timed_out),
            // The sender lives in `inner`, so the channel cannot close while we hold `self`
            Ok(Err(_)) | Err(_) => {
                tracing::warn!("Gave up waiting {:?} for an auth token", timeout);
                Err(timed_out)
            }
        };
        waited
    }

    /// Mark a request as in flight until the returned guard is dropped.
    pub fn begin(&self) -> InFlight {
        // ---
        self.inner.in_flight.fetch_add(1, Ordering::SeqCst);
        InFlight {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// True while at least one backend request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight() > 0
    }
}

/// Guard returned by [`RequestContext::begin`].
#[derive(Debug)]
pub struct InFlight {
    inner: Arc<Inner>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
