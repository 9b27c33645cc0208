//! Human-verification capability.
//!
//! The widget is an optional dependency resolved at startup: a controller
//! built without one treats verification as disabled. `WidgetReady` replaces
//! the loader's global ready callback with a one-shot initialization event.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::OnceCell;
use tracing::debug;

/// A challenge/response widget. Tokens are single use.
pub trait VerificationWidget: Send + Sync {
    /// Current response token, if the challenge was completed.
    fn response_token(&self) -> Option<String>;

    /// Discard the current token so a fresh challenge must be completed.
    fn reset(&self);
}

/// Guards widget rendering so it happens at most once per page instance.
#[derive(Debug, Default)]
pub struct WidgetReady {
    rendered: OnceCell<()>,
}

impl WidgetReady {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a ready event. Runs `render` only on the first call and
    /// returns whether this call rendered the widget.
    pub async fn on_ready<F, Fut>(&self, render: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut rendered_now = false;
        self.rendered
            .get_or_init(|| {
                rendered_now = true;
                render()
            })
            .await;
        if !rendered_now {
            debug!("Verification widget already rendered, ignoring ready event");
        }
        rendered_now
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered.initialized()
    }
}

/// A widget backed by a token the user pastes after solving the challenge
/// elsewhere. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct TokenField {
    token: Arc<Mutex<String>>,
}

impl TokenField {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, String> {
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.slot() = token.into();
    }

    pub fn push(&self, c: char) {
        self.slot().push(c);
    }

    pub fn pop(&self) {
        self.slot().pop();
    }

    pub fn len(&self) -> usize {
        self.slot().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slot().is_empty()
    }

    pub fn value(&self) -> String {
        self.slot().clone()
    }
}

impl VerificationWidget for TokenField {
    fn response_token(&self) -> Option<String> {
        let token = self.slot().trim().to_string();
        (!token.is_empty()).then_some(token)
    }

    fn reset(&self) {
        debug!("Resetting verification token");
        self.slot().clear();
    }
}
