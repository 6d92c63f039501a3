//! PostgreSQL store tests.
//!
//! These run against a real database and are skipped unless
//! `TODOS_TEST_DATABASE_URL` is set. Every test works on lists with unique
//! names so tests can share one database.

use entities::{Completable, TodoStatus};
use todo_store::{LoginStore, PostgresStore, StoreProvider, TodoStore, TodoStoreError};

async fn connect() -> Option<PostgresStore> {
    let url = std::env::var("TODOS_TEST_DATABASE_URL").ok()?;
    let store = PostgresStore::connect(&url, 2)
        .await
        .expect("Failed to connect to test database");
    Some(store)
}

fn unique_name(prefix: &str) -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{prefix} {nanos}")
}

#[tokio::test]
async fn test_list_crud() {
    let Some(store) = connect().await else {
        return;
    };

    let name = unique_name("Groceries");
    let list = store.add_list(&name).await.unwrap();
    assert_eq!(list.name, name);
    assert!(list.todos.is_empty());

    let found = store.find_list(list.id).await.unwrap().unwrap();
    assert_eq!(found.name, name);

    let renamed = unique_name("Shopping");
    store.update_list_name(list.id, &renamed).await.unwrap();
    let found = store.find_list(list.id).await.unwrap().unwrap();
    assert_eq!(found.name, renamed);

    assert!(store.delete_list(list.id).await.unwrap());
    assert!(store.find_list(list.id).await.unwrap().is_none());
    assert!(!store.delete_list(list.id).await.unwrap());
}

#[tokio::test]
async fn test_duplicate_list_name_conflicts() {
    let Some(store) = connect().await else {
        return;
    };

    let name = unique_name("Chores");
    let list = store.add_list(&name).await.unwrap();

    let err = store.add_list(&name.to_uppercase()).await.unwrap_err();
    assert!(matches!(err, TodoStoreError::AlreadyExists { .. }));

    store.delete_list(list.id).await.unwrap();
}

#[tokio::test]
async fn test_todos_lifecycle() {
    let Some(store) = connect().await else {
        return;
    };

    let list = store.add_list(&unique_name("Weekend")).await.unwrap();

    let milk = store.add_todo_to_list(list.id, "Milk").await.unwrap();
    let eggs = store.add_todo_to_list(list.id, "Eggs").await.unwrap();
    assert!(eggs.id > milk.id);
    assert_eq!(milk.status, TodoStatus::Incomplete);

    store
        .update_todo_status(list.id, milk.id, TodoStatus::Complete)
        .await
        .unwrap();
    let found = store.find_todo_from_list(list.id, milk.id).await.unwrap().unwrap();
    assert_eq!(found.status, TodoStatus::Complete);

    let list_after = store.find_list(list.id).await.unwrap().unwrap();
    assert!(!list_after.is_complete());

    store.complete_all_todos(list.id).await.unwrap();
    let list_after = store.find_list(list.id).await.unwrap().unwrap();
    assert!(list_after.is_complete());

    assert!(store.delete_todo_from_list(list.id, eggs.id).await.unwrap());
    assert!(!store.delete_todo_from_list(list.id, eggs.id).await.unwrap());

    store.delete_list(list.id).await.unwrap();
}

#[tokio::test]
async fn test_delete_list_removes_items() {
    let Some(store) = connect().await else {
        return;
    };

    let list = store.add_list(&unique_name("Errands")).await.unwrap();
    let item = store.add_todo_to_list(list.id, "Post office").await.unwrap();

    assert!(store.delete_list(list.id).await.unwrap());
    assert!(store
        .find_todo_from_list(list.id, item.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_missing_list_is_reported() {
    let Some(store) = connect().await else {
        return;
    };

    let list = store.add_list(&unique_name("Gone")).await.unwrap();
    store.delete_list(list.id).await.unwrap();

    let err = store.add_todo_to_list(list.id, "Anything").await.unwrap_err();
    assert!(err.is_not_found());

    let err = store.complete_all_todos(list.id).await.unwrap_err();
    assert!(err.is_not_found());

    let err = store.update_list_name(list.id, "Other").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_summaries_count_items() {
    let Some(store) = connect().await else {
        return;
    };

    let list = store.add_list(&unique_name("Counted")).await.unwrap();
    let first = store.add_todo_to_list(list.id, "One").await.unwrap();
    store.add_todo_to_list(list.id, "Two").await.unwrap();
    store
        .update_todo_status(list.id, first.id, TodoStatus::Complete)
        .await
        .unwrap();

    let summaries = store.list_summaries().await.unwrap();
    let summary = summaries.iter().find(|s| s.id == list.id).unwrap();
    assert_eq!(summary.todos_count, 2);
    assert_eq!(summary.incomplete_count, 1);

    store.delete_list(list.id).await.unwrap();
}

#[tokio::test]
async fn test_logins_and_provider() {
    let Some(store) = connect().await else {
        return;
    };

    let name = unique_name("visitor");
    let record = store.logins().record_login(&name).await.unwrap();
    assert_eq!(record.name, name);

    let current = store.logins().current_user().await.unwrap();
    assert!(current.is_some());

    // Every session sees the same tables
    let list = store.add_list(&unique_name("Shared")).await.unwrap();
    let other = store.store_for("another-session").await;
    assert!(other.find_list(list.id).await.unwrap().is_some());

    store.delete_list(list.id).await.unwrap();
}
