//! # Todo Store Runtime
//!
//! Runtime implementation for the todo store reducer architecture.
//!
//! This crate provides the [`Store`] that owns the state, runs the reducer for
//! every dispatched action, and executes the effects the reducer describes.
//!
//! ## Core Components
//!
//! - **Store**: Owns state, serializes dispatch, notifies listeners
//! - **Middleware**: Observers bracketing every reducer call
//! - **Effect Executor**: Runs effect descriptions and feeds actions back
//!
//! ## Example
//!
//! ```ignore
//! use todo_store_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! let _subscription = store.subscribe(|state| println!("{state:?}"));
//! store.send(Action::DoSomething).await?;
//!
//! let value = store.state(|s| s.some_field).await;
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use todo_store_core::{effect::Effect, reducer::Reducer};
use tokio::sync::RwLock;

/// Prometheus metrics for observability
pub mod metrics;

/// Middleware run around every reducer call
pub mod middleware;

use middleware::Middleware;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),
    }
}

pub use error::StoreError;

/// Default number of actions buffered for [`Store::subscribe_actions`] receivers
pub const DEFAULT_BROADCAST_CAPACITY: usize = 16;

/// Largest action broadcast capacity a store will allocate
pub const MAX_BROADCAST_CAPACITY: usize = 65_536;

/// Configuration for Store instances
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(64)
///     .with_middleware(LoggingMiddleware::new(Arc::new(SystemClock)));
///
/// let store = Store::with_config(state, reducer, env, config);
/// ```
pub struct StoreConfig<S, A> {
    /// Capacity of the action broadcast channel
    pub broadcast_capacity: usize,
    /// Middleware in the order it runs (`before` hooks front to back, `after` hooks likewise)
    pub middleware: Vec<Box<dyn Middleware<S, A>>>,
}

impl<S, A> StoreConfig<S, A> {
    /// Set the action broadcast capacity
    ///
    /// Values are clamped to `1..=MAX_BROADCAST_CAPACITY`.
    #[must_use]
    pub fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity.clamp(1, MAX_BROADCAST_CAPACITY);
        self
    }

    /// Append one middleware to the stack
    #[must_use]
    pub fn with_middleware<M>(mut self, middleware: M) -> Self
    where
        M: Middleware<S, A> + 'static,
    {
        self.middleware.push(Box::new(middleware));
        self
    }

    /// Append several already-boxed middleware to the stack
    #[must_use]
    pub fn with_middlewares<I>(mut self, middleware: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Middleware<S, A>>>,
    {
        self.middleware.extend(middleware);
        self
    }
}

impl<S, A> Default for StoreConfig<S, A> {
    fn default() -> Self {
        Self {
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
            middleware: Vec::new(),
        }
    }
}

impl<S, A> std::fmt::Debug for StoreConfig<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("broadcast_capacity", &self.broadcast_capacity)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

type Listener<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// Registered state listeners, keyed by subscription id
struct ListenerRegistry<S> {
    next_id: u64,
    entries: Vec<(u64, Listener<S>)>,
}

impl<S> ListenerRegistry<S> {
    const fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    fn insert(&mut self, listener: Listener<S>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }
}

/// Handle returned by [`Store::subscribe`]
///
/// The listener stays attached for as long as this handle lives. Dropping it,
/// or calling [`Subscription::unsubscribe`], detaches the listener. A handle
/// that outlives its store is inert.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription<S> {
    id: u64,
    registry: Weak<Mutex<ListenerRegistry<S>>>,
}

impl<S> Subscription<S> {
    /// Detach the listener now
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl<S> Drop for Subscription<S> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
            if registry.remove(self.id) {
                #[allow(clippy::cast_precision_loss)]
                metrics::gauge!("store.listeners.active").set(registry.entries.len() as f64);
                tracing::trace!(subscription = self.id, "Listener detached");
            }
        }
    }
}

impl<S> std::fmt::Debug for Subscription<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Keeps `pending_effects` accurate even if an effect task panics
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl AtomicCounterGuard {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, Duration, Effect, Listener,
        ListenerRegistry, Middleware, Mutex, Ordering, PoisonError, Reducer, RwLock,
        StoreConfig, StoreError, Subscription,
    };
    use futures::future::{join_all, BoxFuture};
    use todo_store_core::SmallVec;
    use tokio::sync::broadcast;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; the only copy)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Middleware, listeners and effect execution
    ///
    /// Cloning a `Store` is cheap and yields another handle to the same state.
    /// The host decides the store's lifetime; there is no global instance.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        middleware: Arc<[Box<dyn Middleware<S, A>>]>,
        listeners: Arc<Mutex<ListenerRegistry<S>>>,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Clone + Send + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// No middleware is attached and the action broadcast capacity is
        /// [`DEFAULT_BROADCAST_CAPACITY`](super::DEFAULT_BROADCAST_CAPACITY).
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        ///
        /// # Example
        ///
        /// ```ignore
        /// let config = StoreConfig::default()
        ///     .with_middlewares(default_middleware());
        ///
        /// let store = Store::with_config(MyState::default(), MyReducer, env, config);
        /// ```
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig<S, A>,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(
                config.broadcast_capacity.clamp(1, super::MAX_BROADCAST_CAPACITY),
            );

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                middleware: Arc::from(config.middleware),
                listeners: Arc::new(Mutex::new(ListenerRegistry::new())),
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires the write lock on state
        /// 2. Runs middleware `before` hooks
        /// 3. Calls the reducer with (state, action, environment)
        /// 4. Runs middleware `after` hooks and notifies listeners
        /// 5. Broadcasts the action to [`subscribe_actions`](Self::subscribe_actions) receivers
        /// 6. Starts executing returned effects
        ///
        /// Steps 2-5 happen under the write lock, so concurrent `send()` calls
        /// are applied one at a time and every listener sees each state.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        ///
        /// # Panics
        ///
        /// If the reducer panics, the panic will propagate to the caller.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            metrics::counter!("store.actions.total").increment(1);

            let effects = {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");
                self.transition(&mut state, action)
            };

            for effect in effects {
                self.execute_effect(effect);
            }

            Ok(())
        }

        /// One reducer call bracketed by middleware, listeners and broadcast
        fn transition(&self, state: &mut S, action: A) -> SmallVec<[Effect<A>; 4]> {
            let span = tracing::debug_span!("reducer_execution");
            let _enter = span.enter();

            for middleware in self.middleware.iter() {
                middleware.before(&action, state);
            }

            let observed = action.clone();
            let start = std::time::Instant::now();
            let effects = self.reducer.reduce(state, action, &self.environment);
            metrics::histogram!("store.reducer.duration_seconds")
                .record(start.elapsed().as_secs_f64());
            tracing::trace!("Reducer completed, returned {} effects", effects.len());

            for middleware in self.middleware.iter() {
                middleware.after(&observed, state);
            }

            self.notify(state);

            // No receivers is the common case and not an error.
            let _ = self.action_broadcast.send(observed);

            effects
        }

        /// Call every listener with the new state
        fn notify(&self, state: &S) {
            // Snapshot first so a listener may subscribe or unsubscribe without deadlocking.
            let listeners: Vec<Listener<S>> = self
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entries
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();

            for listener in &listeners {
                listener(state);
            }
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let todo_count = store.state(|s| s.todos.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Clone out the current state
        pub async fn snapshot(&self) -> S
        where
            S: Clone,
        {
            self.state(S::clone).await
        }

        /// Register a listener called with the new state after every dispatch
        ///
        /// Listeners run synchronously inside `send()`, after the reducer and
        /// middleware, in registration order. Keep them short.
        pub fn subscribe<F>(&self, listener: F) -> Subscription<S>
        where
            F: Fn(&S) + Send + Sync + 'static,
        {
            let mut registry = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            let id = registry.insert(Arc::new(listener));
            #[allow(clippy::cast_precision_loss)]
            metrics::gauge!("store.listeners.active").set(registry.entries.len() as f64);
            tracing::trace!(subscription = id, "Listener attached");

            Subscription {
                id,
                registry: Arc::downgrade(&self.listeners),
            }
        }

        /// Number of listeners currently attached
        #[must_use]
        pub fn listener_count(&self) -> usize {
            self.listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entries
                .len()
        }

        /// Subscribe to every action this store reduces
        ///
        /// Both actions sent by callers and actions fed back by effects are
        /// broadcast. A receiver that falls more than the configured capacity
        /// behind gets [`broadcast::error::RecvError::Lagged`].
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Number of effect tasks still running
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Initiate graceful shutdown of the store
        ///
        /// Sets the shutdown flag (rejecting new actions, including actions fed
        /// back by effects) and waits for running effects to finish.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            self.shutdown.store(true, Ordering::Release);

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(pending_effects = pending, "Shutdown timeout");
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Hand an effect to the executor
        ///
        /// No-op effects are dropped here; everything else runs in a spawned
        /// task, so a tokio runtime must be present when a reducer returns one.
        fn execute_effect(&self, effect: Effect<A>) {
            if effect.is_none() {
                return;
            }

            metrics::counter!("store.effects.executed_total").increment(1);
            let guard = AtomicCounterGuard::new(Arc::clone(&self.pending_effects));
            let store = self.clone();

            tokio::spawn(async move {
                let _guard = guard;
                store.run_effect(effect).await;
            });
        }

        fn run_effect(&self, effect: Effect<A>) -> BoxFuture<'static, ()> {
            let store = self.clone();

            Box::pin(async move {
                match effect {
                    Effect::None => {},
                    Effect::Parallel(effects) => {
                        join_all(effects.into_iter().map(|e| store.run_effect(e))).await;
                    },
                    Effect::Sequential(effects) => {
                        for e in effects {
                            store.run_effect(e).await;
                        }
                    },
                    Effect::Delay { duration, action } => {
                        tokio::time::sleep(duration).await;
                        store.feed_back(*action).await;
                    },
                    Effect::Future(fut) => {
                        if let Some(action) = fut.await {
                            store.feed_back(action).await;
                        }
                    },
                }
            })
        }

        async fn feed_back(&self, action: A) {
            if let Err(error) = self.send(action).await {
                tracing::warn!(error = %error, "Dropped action produced by effect");
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                middleware: Arc::clone(&self.middleware),
                listeners: Arc::clone(&self.listeners),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
