//! Reducer composition utilities
//!
//! - **`combine_reducers`**: Run multiple reducers on the same state/action
//! - **`scope_reducer`**: Focus a reducer on one slice of a larger state
//!
//! Together they build an aggregate reducer out of independent slice
//! reducers: scope each slice reducer onto its field, then combine the scoped
//! reducers. Every slice reducer sees the same action, and none of them can
//! read a sibling slice.
//!
//! # Examples
//!
//! ```
//! use todo_store_core::composition::{combine_reducers, scope_reducer};
//! use todo_store_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug)]
//! enum Action {
//!     Rename(String),
//!     Bump,
//! }
//!
//! #[derive(Clone, Debug, Default)]
//! struct Page {
//!     title: String,
//!     views: u32,
//! }
//!
//! struct TitleReducer;
//! struct ViewsReducer;
//!
//! impl Reducer for TitleReducer {
//!     type State = String;
//!     type Action = Action;
//!     type Environment = ();
//!
//!     fn reduce(&self, title: &mut String, action: Action, _env: &()) -> SmallVec<[Effect<Action>; 4]> {
//!         if let Action::Rename(name) = action {
//!             *title = name;
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! impl Reducer for ViewsReducer {
//!     type State = u32;
//!     type Action = Action;
//!     type Environment = ();
//!
//!     fn reduce(&self, views: &mut u32, action: Action, _env: &()) -> SmallVec<[Effect<Action>; 4]> {
//!         if matches!(action, Action::Bump) {
//!             *views += 1;
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let page = combine_reducers(vec![
//!     Box::new(scope_reducer(TitleReducer, |p: &Page| &p.title, |p: &mut Page, t| p.title = t)),
//!     Box::new(scope_reducer(ViewsReducer, |p: &Page| &p.views, |p: &mut Page, v| p.views = v)),
//! ]);
//!
//! let mut state = Page::default();
//! let _ = page.reduce(&mut state, Action::Rename("Home".to_string()), &());
//! let _ = page.reduce(&mut state, Action::Bump, &());
//! assert_eq!(state.title, "Home");
//! assert_eq!(state.views, 1);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// Boxed reducer accepted by [`combine_reducers`].
pub type BoxedReducer<S, A, E> = Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Reducers run in the order given; each receives its own clone of the action.
/// All effects are collected and concatenated in the same order.
#[must_use]
pub fn combine_reducers<S, A, E>(reducers: Vec<BoxedReducer<S, A, E>>) -> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    reducers: Vec<BoxedReducer<S, A, E>>,
}

impl<S, A, E> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    /// Number of reducers in the combination
    #[must_use]
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Whether the combination holds no reducers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut all_effects = SmallVec::new();

        for reducer in &self.reducers {
            let effects = reducer.reduce(state, action.clone(), env);
            all_effects.extend(effects);
        }

        all_effects
    }
}

/// Scopes a reducer to operate on a subset of a larger state.
///
/// The slice is read through `get_state`, cloned, reduced, and written back
/// through `set_state`, so the child reducer never sees the rest of the
/// parent state.
///
/// # Type Parameters
///
/// - `S`: The parent state type
/// - `SubS`: The child state type (subset of `S`)
/// - `A`: The action type
/// - `E`: The environment type
pub fn scope_reducer<S, SubS, A, E, R>(
    reducer: R,
    get_state: fn(&S) -> &SubS,
    set_state: fn(&mut S, SubS),
) -> ScopedReducer<S, SubS, A, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = A, Environment = E>,
{
    ScopedReducer {
        reducer,
        get_state,
        set_state,
        _phantom: std::marker::PhantomData,
    }
}

/// A scoped reducer that operates on a subset of state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, SubS, A, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = A, Environment = E>,
{
    reducer: R,
    get_state: fn(&S) -> &SubS,
    set_state: fn(&mut S, SubS),
    _phantom: std::marker::PhantomData<fn(A, &E)>,
}

impl<S, SubS, A, E, R> Reducer for ScopedReducer<S, SubS, A, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = A, Environment = E>,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut slice = (self.get_state)(state).clone();
        let effects = self.reducer.reduce(&mut slice, action, env);
        (self.set_state)(state, slice);
        effects
    }
}
