//! Session-backed todo store.
//!
//! Each session owns a [`SessionData`] value holding its lists. The data
//! lives as long as the [`SessionRegistry`] that handed it out and is lost
//! when the process exits.
//!
//! A session only takes up space in the registry once it has created a
//! list. Until then its store reads from an empty, unregistered value, so
//! requests that merely look around leave nothing behind.

use std::{
    collections::HashMap,
    sync::{Arc, Weak},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use entities::{ListId, LoginRecord, TodoId, TodoItem, TodoList, TodoStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{next_id, LoginStore, StoreProvider, TodoStore, TodoStoreError, TodoStoreResult};

/// Everything a session remembers about its todo lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Lists in insertion order.
    pub lists: Vec<TodoList>,
    /// Highest list id issued so far.
    #[serde(default)]
    last_list_id: ListId,
    /// Highest item id issued so far, per list.
    #[serde(default)]
    last_todo_ids: HashMap<ListId, TodoId>,
}

impl SessionData {
    fn list_mut(&mut self, list_id: ListId) -> TodoStoreResult<&mut TodoList> {
        self.lists
            .iter_mut()
            .find(|list| list.id == list_id)
            .ok_or_else(|| TodoStoreError::not_found("TodoList", list_id))
    }
}

type SharedData = Arc<RwLock<SessionData>>;

#[derive(Debug)]
struct SessionEntry {
    data: SharedData,
    last_seen: Instant,
}

/// Registered sessions, keyed by session id.
#[derive(Debug, Default)]
struct SessionTable {
    entries: HashMap<String, SessionEntry>,
    idle_timeout: Option<Duration>,
}

impl SessionTable {
    /// Returns the data of a known session and marks it as used.
    fn touch(&mut self, session_id: &str) -> Option<SharedData> {
        let entry = self.entries.get_mut(session_id)?;
        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.data))
    }

    /// Registers a session unless it already is, and returns its data.
    fn get_or_insert(&mut self, session_id: &str, data: &SharedData) -> SharedData {
        if let Some(data) = self.touch(session_id) {
            return data;
        }

        self.purge_idle();
        self.entries.insert(
            session_id.to_string(),
            SessionEntry {
                data: Arc::clone(data),
                last_seen: Instant::now(),
            },
        );
        Arc::clone(data)
    }

    /// Drops sessions unused for longer than the idle timeout.
    fn purge_idle(&mut self) -> usize {
        let Some(idle_timeout) = self.idle_timeout else {
            return 0;
        };

        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.last_seen.elapsed() < idle_timeout);
        let purged = before - self.entries.len();
        if purged > 0 {
            tracing::debug!(purged, "Dropped idle sessions");
        }
        purged
    }
}

/// Where an unregistered session store registers itself on first write.
#[derive(Debug, Clone)]
struct PendingSession {
    table: Weak<RwLock<SessionTable>>,
    session_id: String,
}

/// Todo store over the data of a single session.
///
/// Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    data: SharedData,
    pending: Option<PendingSession>,
}

impl SessionStore {
    /// Creates a store for a fresh session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store over previously saved session data.
    pub fn from_data(data: SessionData) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
            pending: None,
        }
    }

    /// Returns a copy of the session data.
    pub async fn snapshot(&self) -> SessionData {
        self.shared(false).await.read().await.clone()
    }

    /// Resolves the data this store works on.
    ///
    /// An unregistered store reads through to the registry in case another
    /// request registered the session meanwhile, and registers it when
    /// `register` is set.
    async fn shared(&self, register: bool) -> SharedData {
        let Some(pending) = &self.pending else {
            return Arc::clone(&self.data);
        };
        let Some(table) = pending.table.upgrade() else {
            return Arc::clone(&self.data);
        };

        if register {
            let mut table = table.write().await;
            return table.get_or_insert(&pending.session_id, &self.data);
        }

        let table = table.read().await;
        match table.entries.get(&pending.session_id) {
            Some(entry) => Arc::clone(&entry.data),
            None => Arc::clone(&self.data),
        }
    }
}

#[async_trait]
impl TodoStore for SessionStore {
    async fn all_lists(&self) -> TodoStoreResult<Vec<TodoList>> {
        let shared = self.shared(false).await;
        let data = shared.read().await;
        Ok(data.lists.clone())
    }

    async fn find_list(&self, list_id: ListId) -> TodoStoreResult<Option<TodoList>> {
        let shared = self.shared(false).await;
        let data = shared.read().await;
        Ok(data.lists.iter().find(|list| list.id == list_id).cloned())
    }

    async fn add_list(&self, name: &str) -> TodoStoreResult<TodoList> {
        let shared = self.shared(true).await;
        let mut data = shared.write().await;
        let id = next_id(data.lists.iter().map(|list| list.id), data.last_list_id)
            .ok_or(TodoStoreError::IdsExhausted {
                entity_type: "TodoList",
            })?;
        let list = TodoList::new(id, name);
        data.last_list_id = id;
        data.lists.push(list.clone());
        Ok(list)
    }

    async fn delete_list(&self, list_id: ListId) -> TodoStoreResult<bool> {
        let shared = self.shared(false).await;
        let mut data = shared.write().await;
        let before = data.lists.len();
        data.lists.retain(|list| list.id != list_id);
        data.last_todo_ids.remove(&list_id);
        Ok(data.lists.len() < before)
    }

    async fn update_list_name(&self, list_id: ListId, new_name: &str) -> TodoStoreResult<()> {
        let shared = self.shared(false).await;
        let mut data = shared.write().await;
        data.list_mut(list_id)?.name = new_name.to_string();
        Ok(())
    }

    async fn add_todo_to_list(&self, list_id: ListId, name: &str) -> TodoStoreResult<TodoItem> {
        let shared = self.shared(false).await;
        let mut data = shared.write().await;
        let last_issued = data.last_todo_ids.get(&list_id).copied().unwrap_or(0);
        let list = data.list_mut(list_id)?;

        let id = next_id(list.todos.iter().map(|item| item.id), last_issued).ok_or(
            TodoStoreError::IdsExhausted {
                entity_type: "TodoItem",
            },
        )?;
        let item = TodoItem::new(id, name);
        list.todos.push(item.clone());
        data.last_todo_ids.insert(list_id, id);

        Ok(item)
    }

    async fn find_todo_from_list(
        &self,
        list_id: ListId,
        todo_id: TodoId,
    ) -> TodoStoreResult<Option<TodoItem>> {
        let shared = self.shared(false).await;
        let data = shared.read().await;
        Ok(data
            .lists
            .iter()
            .find(|list| list.id == list_id)
            .and_then(|list| list.todo(todo_id))
            .cloned())
    }

    async fn delete_todo_from_list(
        &self,
        list_id: ListId,
        todo_id: TodoId,
    ) -> TodoStoreResult<bool> {
        let shared = self.shared(false).await;
        let mut data = shared.write().await;
        let Some(list) = data.lists.iter_mut().find(|list| list.id == list_id) else {
            return Ok(false);
        };

        let before = list.todos.len();
        list.todos.retain(|item| item.id != todo_id);
        Ok(list.todos.len() < before)
    }

    async fn update_todo_status(
        &self,
        list_id: ListId,
        todo_id: TodoId,
        status: TodoStatus,
    ) -> TodoStoreResult<()> {
        let shared = self.shared(false).await;
        let mut data = shared.write().await;
        let item = data
            .list_mut(list_id)?
            .todo_mut(todo_id)
            .ok_or_else(|| TodoStoreError::not_found("TodoItem", todo_id))?;
        item.status = status;
        Ok(())
    }

    async fn complete_all_todos(&self, list_id: ListId) -> TodoStoreResult<()> {
        let shared = self.shared(false).await;
        let mut data = shared.write().await;
        for item in data.list_mut(list_id)?.todos.iter_mut() {
            item.status = TodoStatus::Complete;
        }
        Ok(())
    }
}

/// In-memory login log holding the most recent login.
#[derive(Debug, Default)]
pub struct MemoryLoginStore {
    latest: RwLock<Option<LoginRecord>>,
}

impl MemoryLoginStore {
    /// Creates an empty login log.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoginStore for MemoryLoginStore {
    async fn record_login(&self, name: &str) -> TodoStoreResult<LoginRecord> {
        let record = LoginRecord::new(name);
        *self.latest.write().await = Some(record.clone());
        Ok(record)
    }

    async fn current_user(&self) -> TodoStoreResult<Option<LoginRecord>> {
        Ok(self.latest.read().await.clone())
    }
}

/// Keeps one [`SessionStore`] per session id.
///
/// Sessions are registered when they create their first list. With an idle
/// timeout set, sessions unused for longer than that are dropped whenever a
/// new session registers or [`SessionRegistry::purge_idle`] runs.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    table: Arc<RwLock<SessionTable>>,
    logins: MemoryLoginStore,
}

impl SessionRegistry {
    /// Creates an empty registry that keeps sessions until they are ended.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry that drops sessions idle for `idle_timeout`.
    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        let table = SessionTable {
            entries: HashMap::new(),
            idle_timeout: Some(idle_timeout),
        };
        Self {
            table: Arc::new(RwLock::new(table)),
            logins: MemoryLoginStore::new(),
        }
    }

    /// Number of registered sessions.
    pub async fn session_count(&self) -> usize {
        self.table.read().await.entries.len()
    }

    /// Forgets a session and all of its lists.
    pub async fn end_session(&self, session_id: &str) -> bool {
        self.table.write().await.entries.remove(session_id).is_some()
    }

    /// Drops idle sessions now, returning how many were dropped.
    pub async fn purge_idle(&self) -> usize {
        self.table.write().await.purge_idle()
    }
}

#[async_trait]
impl StoreProvider for SessionRegistry {
    type Store = SessionStore;
    type Logins = MemoryLoginStore;

    async fn store_for(&self, session_id: &str) -> SessionStore {
        if let Some(data) = self.table.write().await.touch(session_id) {
            return SessionStore {
                data,
                pending: None,
            };
        }

        SessionStore {
            data: SharedData::default(),
            pending: Some(PendingSession {
                table: Arc::downgrade(&self.table),
                session_id: session_id.to_string(),
            }),
        }
    }

    fn logins(&self) -> &MemoryLoginStore {
        &self.logins
    }
}

#[cfg(test)]
mod tests {
    use entities::Completable;

    use super::*;

    #[tokio::test]
    async fn test_list_crud() {
        let store = SessionStore::new();

        // Create
        let created = store.add_list("Groceries").await.unwrap();
        assert_eq!(created.id, 1);

        // Find
        let fetched = store.find_list(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Groceries");
        assert!(fetched.todos.is_empty());

        // Rename
        store.update_list_name(created.id, "Food").await.unwrap();
        let fetched = store.find_list(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Food");
        assert_eq!(fetched.id, created.id);

        // Delete
        assert!(store.delete_list(created.id).await.unwrap());
        assert!(store.find_list(created.id).await.unwrap().is_none());
        assert!(store.all_lists().await.unwrap().is_empty());

        // Deleting again is a no-op
        assert!(!store.delete_list(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_lists_keep_insertion_order() {
        let store = SessionStore::new();
        store.add_list("A").await.unwrap();
        store.add_list("B").await.unwrap();
        store.add_list("C").await.unwrap();

        let names: Vec<String> = store
            .all_lists()
            .await
            .unwrap()
            .into_iter()
            .map(|list| list.name)
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_item_ids_are_per_list() {
        let store = SessionStore::new();
        let first = store.add_list("First").await.unwrap();
        let second = store.add_list("Second").await.unwrap();

        let a = store.add_todo_to_list(first.id, "a").await.unwrap();
        let b = store.add_todo_to_list(first.id, "b").await.unwrap();
        let c = store.add_todo_to_list(second.id, "c").await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(c.id, 1);
        assert_eq!(a.status, TodoStatus::Incomplete);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = SessionStore::new();
        let first = store.add_list("First").await.unwrap();
        let second = store.add_list("Second").await.unwrap();
        store.delete_list(second.id).await.unwrap();

        let third = store.add_list("Third").await.unwrap();
        assert_eq!(third.id, 3);

        let item = store.add_todo_to_list(first.id, "a").await.unwrap();
        store.delete_todo_from_list(first.id, item.id).await.unwrap();
        let item = store.add_todo_to_list(first.id, "b").await.unwrap();
        assert_eq!(item.id, 2);
    }

    #[tokio::test]
    async fn test_delete_list_discards_items() {
        let store = SessionStore::new();
        let list = store.add_list("Chores").await.unwrap();
        let item = store.add_todo_to_list(list.id, "Dishes").await.unwrap();

        store.delete_list(list.id).await.unwrap();

        assert!(store
            .find_todo_from_list(list.id, item.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_todo_status() {
        let store = SessionStore::new();
        let list = store.add_list("Chores").await.unwrap();
        let item = store.add_todo_to_list(list.id, "Dishes").await.unwrap();

        store
            .update_todo_status(list.id, item.id, TodoStatus::Complete)
            .await
            .unwrap();

        let item = store
            .find_todo_from_list(list.id, item.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.status, TodoStatus::Complete);
    }

    #[tokio::test]
    async fn test_complete_all_todos() {
        let store = SessionStore::new();
        let list = store.add_list("Chores").await.unwrap();
        store.add_todo_to_list(list.id, "Dishes").await.unwrap();
        let laundry = store.add_todo_to_list(list.id, "Laundry").await.unwrap();
        store
            .update_todo_status(list.id, laundry.id, TodoStatus::Complete)
            .await
            .unwrap();

        store.complete_all_todos(list.id).await.unwrap();

        let list = store.find_list(list.id).await.unwrap().unwrap();
        assert!(list.todos.iter().all(|item| item.status == TodoStatus::Complete));
        assert!(list.is_complete());
    }

    #[tokio::test]
    async fn test_complete_all_on_empty_list_is_noop() {
        let store = SessionStore::new();
        let list = store.add_list("Empty").await.unwrap();

        store.complete_all_todos(list.id).await.unwrap();

        let list = store.find_list(list.id).await.unwrap().unwrap();
        assert!(list.todos.is_empty());
        assert!(!list.is_complete());
    }

    #[tokio::test]
    async fn test_missing_list_is_reported() {
        let store = SessionStore::new();

        assert!(store.find_list(42).await.unwrap().is_none());
        assert!(store
            .update_list_name(42, "x")
            .await
            .unwrap_err()
            .is_not_found());
        assert!(store
            .add_todo_to_list(42, "x")
            .await
            .unwrap_err()
            .is_not_found());
        assert!(store.complete_all_todos(42).await.unwrap_err().is_not_found());
        assert!(!store.delete_todo_from_list(42, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_item_is_reported() {
        let store = SessionStore::new();
        let list = store.add_list("Chores").await.unwrap();

        let err = store
            .update_todo_status(list.id, 9, TodoStatus::Complete)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TodoStoreError::NotFound {
                entity_type: "TodoItem",
                ..
            }
        ));
        assert!(!store.delete_todo_from_list(list.id, 9).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_summaries() {
        let store = SessionStore::new();
        let list = store.add_list("Chores").await.unwrap();
        store.add_todo_to_list(list.id, "Dishes").await.unwrap();
        let laundry = store.add_todo_to_list(list.id, "Laundry").await.unwrap();
        store
            .update_todo_status(list.id, laundry.id, TodoStatus::Complete)
            .await
            .unwrap();

        let summaries = store.list_summaries().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].todos_count, 2);
        assert_eq!(summaries[0].incomplete_count, 1);
    }

    #[tokio::test]
    async fn test_session_data_shape() {
        let store = SessionStore::new();
        let list = store.add_list("Chores").await.unwrap();
        store.add_todo_to_list(list.id, "Dishes").await.unwrap();

        let json = serde_json::to_value(store.snapshot().await).unwrap();
        assert_eq!(json["lists"][0]["name"], "Chores");
        assert_eq!(json["lists"][0]["todos"][0]["status"], "incomplete");

        let data: SessionData = serde_json::from_value(json).unwrap();
        let restored = SessionStore::from_data(data);
        let next = restored.add_todo_to_list(list.id, "Laundry").await.unwrap();
        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn test_registry_isolates_sessions() {
        let registry = SessionRegistry::new();

        let alice = registry.store_for("alice").await;
        alice.add_list("Groceries").await.unwrap();

        let bob = registry.store_for("bob").await;
        assert!(bob.all_lists().await.unwrap().is_empty());

        let alice_again = registry.store_for("alice").await;
        assert_eq!(alice_again.all_lists().await.unwrap().len(), 1);
        // bob never wrote anything
        assert_eq!(registry.session_count().await, 1);

        assert!(registry.end_session("alice").await);
        let alice_new = registry.store_for("alice").await;
        assert!(alice_new.all_lists().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_only_sessions_are_not_registered() {
        let registry = SessionRegistry::new();

        for i in 0..500 {
            let store = registry.store_for(&format!("visitor-{i}")).await;
            assert!(store.all_lists().await.unwrap().is_empty());
            assert!(store.find_list(1).await.unwrap().is_none());
            assert!(!store.delete_list(1).await.unwrap());
            assert!(store.complete_all_todos(1).await.is_err());
        }

        assert_eq!(registry.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_first_list_registers_session() {
        let registry = SessionRegistry::new();
        let writer = registry.store_for("alice").await;
        let reader = registry.store_for("alice").await;

        let list = writer.add_list("Groceries").await.unwrap();
        assert_eq!(registry.session_count().await, 1);

        // A store handed out before registration sees the new list
        assert!(reader.find_list(list.id).await.unwrap().is_some());
        reader.add_todo_to_list(list.id, "Milk").await.unwrap();

        let later = registry.store_for("alice").await;
        let found = later.find_list(list.id).await.unwrap().unwrap();
        assert_eq!(found.todos.len(), 1);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_dropped() {
        let registry = SessionRegistry::with_idle_timeout(Duration::ZERO);

        registry
            .store_for("alice")
            .await
            .add_list("Groceries")
            .await
            .unwrap();
        registry
            .store_for("bob")
            .await
            .add_list("Chores")
            .await
            .unwrap();

        // Registering bob dropped the idle alice
        assert_eq!(registry.session_count().await, 1);
        assert!(registry
            .store_for("alice")
            .await
            .all_lists()
            .await
            .unwrap()
            .is_empty());

        assert_eq!(registry.purge_idle().await, 1);
        assert_eq!(registry.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_sessions_without_timeout_are_kept() {
        let registry = SessionRegistry::new();
        registry
            .store_for("alice")
            .await
            .add_list("Groceries")
            .await
            .unwrap();

        assert_eq!(registry.purge_idle().await, 0);
        assert_eq!(registry.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_exhausted_ids_are_reported() {
        let full_list =
            TodoList::new(1, "Full").with_todos(vec![TodoItem::new(i32::MAX, "Last")]);
        let store = SessionStore::from_data(SessionData {
            lists: vec![TodoList::new(i32::MAX, "Last"), full_list],
            ..SessionData::default()
        });

        let err = store.add_list("One more").await.unwrap_err();
        assert!(matches!(
            err,
            TodoStoreError::IdsExhausted {
                entity_type: "TodoList"
            }
        ));

        let err = store.add_todo_to_list(1, "One more").await.unwrap_err();
        assert!(matches!(
            err,
            TodoStoreError::IdsExhausted {
                entity_type: "TodoItem"
            }
        ));
    }

    #[tokio::test]
    async fn test_login_store() {
        let logins = MemoryLoginStore::new();
        assert!(logins.current_user().await.unwrap().is_none());

        logins.record_login("first").await.unwrap();
        logins.record_login("second").await.unwrap();

        let current = logins.current_user().await.unwrap().unwrap();
        assert_eq!(current.name, "second");
    }
}
