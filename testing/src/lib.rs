//! # Todo Store Testing
//!
//! Testing utilities and helpers for the todo store reducer architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A Given-When-Then builder for reducers ([`ReducerTest`])
//! - Assertion helpers for effects
//! - A recording middleware for checking dispatch order
//!
//! ## Example
//!
//! ```ignore
//! use todo_store_testing::{test_clock, SequentialIdGenerator};
//! use todo_store_runtime::Store;
//!
//! #[tokio::test]
//! async fn create_appends() {
//!     let store = Store::new(state, reducer, env_with(SequentialIdGenerator::new("todo")));
//!     store.send(TodoAction::Create { desc: "Write docs".into() }).await?;
//!     assert_eq!(store.state(|s| s.todos.len()).await, 4);
//! }
//! ```

use chrono::{DateTime, Utc};
use todo_store_core::environment::{Clock, IdGenerator};


pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};
    use todo_store_runtime::middleware::Middleware;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use todo_store_testing::mocks::FixedClock;
    /// use todo_store_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(20_089))
    }

    /// Predictable identifiers: `{prefix}-1`, `{prefix}-2`, ...
    ///
    /// # Example
    ///
    /// ```
    /// use todo_store_testing::mocks::SequentialIdGenerator;
    /// use todo_store_core::environment::IdGenerator;
    ///
    /// let ids = SequentialIdGenerator::new("todo");
    /// assert_eq!(ids.next_id(), "todo-1");
    /// assert_eq!(ids.next_id(), "todo-2");
    /// ```
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        prefix: String,
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Start a sequence at `{prefix}-1`
        #[must_use]
        pub fn new(prefix: impl Into<String>) -> Self {
            Self {
                prefix: prefix.into(),
                next: AtomicU64::new(1),
            }
        }

        /// How many identifiers have been handed out
        #[must_use]
        pub fn issued(&self) -> u64 {
            self.next.load(Ordering::SeqCst) - 1
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            format!("{}-{n}", self.prefix)
        }
    }

    /// Which middleware hook produced a [`RecordingMiddleware`] entry
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Phase {
        /// Recorded in `before`
        Before,
        /// Recorded in `after`
        After,
    }

    /// Middleware that remembers every hook call
    ///
    /// Clones share the same log, so keep one clone for assertions and hand
    /// the other to the store.
    pub struct RecordingMiddleware<S, A> {
        log: Arc<Mutex<Vec<(Phase, A, S)>>>,
    }

    impl<S, A> RecordingMiddleware<S, A> {
        /// Create an empty recorder
        #[must_use]
        pub fn new() -> Self {
            Self {
                log: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl<S: Clone, A: Clone> RecordingMiddleware<S, A> {
        /// Everything recorded so far, oldest first
        #[must_use]
        pub fn entries(&self) -> Vec<(Phase, A, S)> {
            self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }
    }

    impl<S, A> Default for RecordingMiddleware<S, A> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<S, A> Clone for RecordingMiddleware<S, A> {
        fn clone(&self) -> Self {
            Self {
                log: Arc::clone(&self.log),
            }
        }
    }

    impl<S, A> Middleware<S, A> for RecordingMiddleware<S, A>
    where
        S: Clone + Send,
        A: Clone + Send,
    {
        fn before(&self, action: &A, state: &S) {
            self.log
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((Phase::Before, action.clone(), state.clone()));
        }

        fn after(&self, action: &A, state: &S) {
            self.log
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((Phase::After, action.clone(), state.clone()));
        }
    }
}

/// Install a `fmt` subscriber honouring `RUST_LOG`, once per process
///
/// Safe to call from every test; later calls are ignored.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock, Phase, RecordingMiddleware, SequentialIdGenerator};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialIdGenerator::new("t");
        assert_eq!(ids.issued(), 0);
        assert_eq!(ids.next_id(), "t-1");
        assert_eq!(ids.next_id(), "t-2");
        assert_eq!(ids.issued(), 2);
    }
}
