//! Dispatch middleware
//!
//! Middleware observes every action the [`Store`](crate::Store) reduces. The
//! store calls [`Middleware::before`] with the state the reducer is about to
//! see and [`Middleware::after`] with the state it produced, both while the
//! write lock is held, so the pair always brackets exactly one transition.
//!
//! Middleware can observe but never alter a transition. Anything that needs
//! to change state belongs in a reducer; anything that needs to do I/O in
//! response belongs in an effect.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use todo_store_core::environment::SystemClock;
//! use todo_store_runtime::middleware::{default_middleware, LoggingMiddleware, Middleware};
//!
//! #[derive(Debug, serde::Serialize)]
//! struct Tally(u32);
//!
//! #[derive(Debug, serde::Serialize)]
//! enum TallyAction {
//!     Add(u32),
//! }
//!
//! let mut stack: Vec<Box<dyn Middleware<Tally, TallyAction>>> =
//!     vec![Box::new(LoggingMiddleware::new(Arc::new(SystemClock)))];
//! stack.extend(default_middleware());
//! assert_eq!(stack.len(), 2);
//! ```

use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;
use todo_store_core::environment::Clock;

/// Observer hooked around every reducer call
pub trait Middleware<S, A>: Send + Sync {
    /// Called with the action and the state the reducer is about to see
    fn before(&self, _action: &A, _state: &S) {}

    /// Called with the action and the state the reducer produced
    fn after(&self, _action: &A, _state: &S) {}
}

/// Logs each action with the previous and next state
///
/// Emits `debug` events on the `todo_store_runtime::middleware` target. The
/// timestamp comes from the injected [`Clock`] so log lines are reproducible
/// under a fixed clock.
#[derive(Clone)]
pub struct LoggingMiddleware {
    clock: Arc<dyn Clock>,
}

impl LoggingMiddleware {
    /// Create a logging middleware stamping entries with `clock`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl std::fmt::Debug for LoggingMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingMiddleware").finish_non_exhaustive()
    }
}

impl<S: Debug, A: Debug> Middleware<S, A> for LoggingMiddleware {
    fn before(&self, action: &A, state: &S) {
        tracing::debug!(
            at = %self.clock.now().format("%H:%M:%S%.3f"),
            action = ?action,
            prev_state = ?state,
            "action dispatched"
        );
    }

    fn after(&self, action: &A, state: &S) {
        tracing::debug!(action = ?action, next_state = ?state, "action reduced");
    }
}

/// Flags actions or states that do not serialize
///
/// State and actions are expected to round-trip through JSON (for snapshots
/// and logging sinks). A failure is reported as a `warn` event and counted in
/// `store.middleware.unserializable_total`; the transition itself is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializableCheckMiddleware;

impl SerializableCheckMiddleware {
    fn check<T: Serialize>(kind: &'static str, value: &T) -> bool {
        match serde_json::to_value(value) {
            Ok(_) => true,
            Err(error) => {
                tracing::warn!(kind, error = %error, "value is not serializable");
                metrics::counter!("store.middleware.unserializable_total", "kind" => kind)
                    .increment(1);
                false
            },
        }
    }
}

impl<S: Serialize, A: Serialize> Middleware<S, A> for SerializableCheckMiddleware {
    fn before(&self, action: &A, _state: &S) {
        Self::check("action", action);
    }

    fn after(&self, _action: &A, state: &S) {
        Self::check("state", state);
    }
}

/// The middleware stack every store built "with middleware" starts from
#[must_use]
pub fn default_middleware<S, A>() -> Vec<Box<dyn Middleware<S, A>>>
where
    S: Serialize,
    A: Serialize,
{
    vec![Box::new(SerializableCheckMiddleware)]
}
