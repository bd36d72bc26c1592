//! Store-level tests: dispatch, listeners and the two store variants

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use todo::{
    store, AppState, RemoveBehavior, TodoAction, TodoConfig, TodoEnvironment, TodoId, TodoStore,
};
use todo_store_testing::{init_test_tracing, test_clock, SequentialIdGenerator};
use tokio_test::assert_ok;

fn test_env() -> TodoEnvironment {
    TodoEnvironment::new(Arc::new(SequentialIdGenerator::new("todo")))
}

fn both_variants(config: &TodoConfig) -> [TodoStore; 2] {
    [
        store::plain(config, test_env()),
        store::with_middleware(config, test_env(), Arc::new(test_clock())),
    ]
}

fn session() -> Vec<TodoAction> {
    vec![
        TodoAction::Create {
            desc: "Write docs".to_string(),
        },
        TodoAction::Edit {
            id: TodoId::from("todo-4"),
            desc: "Write the docs".to_string(),
        },
        TodoAction::Toggle {
            id: TodoId::from("todo-3"),
            is_complete: true,
        },
        TodoAction::Select {
            id: TodoId::from("todo-2"),
        },
        TodoAction::Remove {
            id: TodoId::from("todo-2"),
        },
        TodoAction::Edit {
            id: TodoId::from("todo-99"),
            desc: "ghost".to_string(),
        },
    ]
}

async fn run(store: &TodoStore, actions: Vec<TodoAction>) {
    for action in actions {
        assert_ok!(store.send(action).await);
    }
}

#[tokio::test]
async fn stores_start_seeded() {
    for store in both_variants(&TodoConfig::default()) {
        let state = store.snapshot().await;
        assert_eq!(state.todos.len(), 3);
        assert_eq!(state.todos.completed_count(), 2);
        assert_eq!(state.selected_todo, None);
        assert_eq!(state.counter, 0);
    }
}

#[tokio::test]
async fn variants_reach_the_same_state() {
    init_test_tracing();
    let [plain, with_middleware] = both_variants(&TodoConfig::default());

    run(&plain, session()).await;
    run(&with_middleware, session()).await;

    let state = plain.snapshot().await;
    assert_eq!(state, with_middleware.snapshot().await);

    let descs: Vec<&str> = state.todos.iter().map(|t| t.desc.as_str()).collect();
    assert_eq!(descs, vec!["Learn React", "Learn Redux-ToolKit", "Write the docs"]);
    assert_eq!(state.todos.completed_count(), 2);
    assert_eq!(state.selected_todo, Some(TodoId::from("todo-2")));
    assert!(state.selected().is_none());
    assert_eq!(state.counter, 5);
}

#[tokio::test]
async fn inert_remove_is_configurable() {
    let config = TodoConfig {
        remove_behavior: RemoveBehavior::Inert,
        ..TodoConfig::default()
    };

    for store in both_variants(&config) {
        run(&store, session()).await;

        let state = store.snapshot().await;
        assert_eq!(state.todos.len(), 4);
        assert_eq!(
            state.selected().map(|t| t.desc.as_str()),
            Some("Learn Redux")
        );
        assert_eq!(state.counter, 5);
    }
}

#[tokio::test]
async fn listener_sees_every_dispatch_until_unsubscribed() {
    let store = store::plain(&TodoConfig::default(), test_env());
    let counters = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&counters);
    let subscription = store.subscribe(move |state: &AppState| {
        sink.lock().unwrap().push(state.counter);
    });

    run(&store, session()).await;
    subscription.unsubscribe();
    assert_ok!(
        store
            .send(TodoAction::Create {
                desc: "unseen".to_string(),
            })
            .await
    );

    // Select does not move the counter, but still notifies.
    assert_eq!(*counters.lock().unwrap(), vec![1, 2, 3, 3, 4, 5]);
    assert_eq!(store.listener_count(), 0);
    assert_eq!(store.state(|s| s.counter).await, 6);
}

#[tokio::test]
async fn dropping_subscription_detaches_listener() {
    let store = store::with_middleware(
        &TodoConfig::default(),
        test_env(),
        Arc::new(test_clock()),
    );
    let calls = Arc::new(AtomicUsize::new(0));

    {
        let calls = Arc::clone(&calls);
        let _subscription = store.subscribe(move |_: &AppState| {
            calls.fetch_add(1, Ordering::SeqCst);
        });
        assert_ok!(
            store
                .send(TodoAction::Select {
                    id: TodoId::from("todo-1"),
                })
                .await
        );
    }

    assert_ok!(
        store
            .send(TodoAction::Select {
                id: TodoId::from("todo-3"),
            })
            .await
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn actions_are_broadcast_in_order() {
    let config = TodoConfig {
        broadcast_capacity: 32,
        ..TodoConfig::default()
    };
    let store = store::build(&config, test_env(), Arc::new(test_clock()));
    let mut rx = store.subscribe_actions();

    run(&store, session()).await;

    for expected in session() {
        let received = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await;
        assert_eq!(received.unwrap().unwrap(), expected);
    }
}

#[tokio::test]
async fn concurrent_creates_get_unique_ids() {
    let store = store::plain(&TodoConfig::default(), test_env());

    let handles: Vec<_> = (0..25)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .send(TodoAction::Create {
                        desc: format!("task {i}"),
                    })
                    .await
            })
        })
        .collect();
    for handle in handles {
        assert_ok!(handle.await.unwrap());
    }

    let state = store.snapshot().await;
    let mut ids: Vec<&str> = state.todos.iter().map(|t| t.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 28);
    assert_eq!(state.counter, 25);
}

#[tokio::test]
async fn final_state_serializes_with_camel_case() {
    let store = store::plain(&TodoConfig::default(), test_env());
    assert_ok!(
        store
            .send(TodoAction::Select {
                id: TodoId::from("todo-1"),
            })
            .await
    );

    let json = serde_json::to_value(store.snapshot().await).unwrap();
    assert_eq!(json["selectedTodo"], "todo-1");
    assert_eq!(json["counter"], 0);
    assert_eq!(json["todos"][2]["desc"], "Learn Redux-ToolKit");
    assert_eq!(json["todos"][2]["isComplete"], false);
}
