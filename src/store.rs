use crate::backup::BackupManager;
use crate::errors::{AppError, AppResult};
use crate::models::{ListFilters, StoreConfig, Todo, TodoDocument, TodoPayload, TodoStats};
use crate::persistence::Persistence;
use crate::query;
use crate::validate::validate;
use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// Owns the persisted collection. Every mutation is a full
/// load → mutate → save cycle under the single-writer assumption; read
/// paths load and hand the snapshot to the query engine.
pub struct TodoStore {
    persistence: Persistence,
    backups: BackupManager,
}

impl TodoStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            persistence: Persistence::new(config),
            backups: BackupManager::new(config),
        }
    }

    /// Write the empty envelope on first run so the backing document exists
    /// before the first request.
    pub fn ensure_initialized(&self) -> AppResult<()> {
        if self.persistence.document_exists() {
            return Ok(());
        }
        self.persistence.save(&TodoDocument::default())
    }

    pub fn list(&self, filters: &ListFilters) -> Vec<Todo> {
        let mut todos = self.persistence.load().todos;
        query::apply_filters(&mut todos, filters);
        query::sort_todos(&mut todos, filters.sort.as_deref());
        todos
    }

    pub fn create(&self, payload: TodoPayload) -> AppResult<Todo> {
        let patch = validate(&payload, false)?;
        let title = patch.title.ok_or_else(|| {
            AppError::Validation("Missing required field: title".to_string())
        })?;

        let mut document = self.persistence.load();
        let todo = Todo {
            id: Uuid::new_v4().to_string(),
            title,
            completed: patch.completed.unwrap_or(false),
            progress: patch.progress,
            category: patch.category,
            priority: patch.priority,
            due_date: patch.due_date,
            created_at: now_timestamp(),
            updated_at: None,
            description: patch.description,
        };
        document.todos.push(todo.clone());
        self.persistence.save(&document)?;
        Ok(todo)
    }

    /// Shallow field-level merge: only supplied fields change. An omitted
    /// `completed` keeps the stored value.
    pub fn update(&self, id: &str, payload: TodoPayload) -> AppResult<Todo> {
        let patch = validate(&payload, true)?;

        let mut document = self.persistence.load();
        let todo = document
            .todos
            .iter_mut()
            .find(|todo| todo.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Todo '{}' not found", id)))?;

        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        if let Some(progress) = patch.progress {
            todo.progress = Some(progress);
        }
        if let Some(category) = patch.category {
            todo.category = Some(category);
        }
        if let Some(priority) = patch.priority {
            todo.priority = Some(priority);
        }
        if let Some(due_date) = patch.due_date {
            todo.due_date = Some(due_date);
        }
        if let Some(description) = patch.description {
            todo.description = Some(description);
        }
        todo.updated_at = Some(now_timestamp());

        let updated = todo.clone();
        self.persistence.save(&document)?;
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        let mut document = self.persistence.load();
        let index = document
            .todos
            .iter()
            .position(|todo| todo.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Todo '{}' not found", id)))?;
        document.todos.remove(index);
        self.persistence.save(&document)
    }

    /// Move a record adjacent to the target: before it when moving toward
    /// the front, after it when moving toward the back. Inserting at the
    /// target's pre-removal index produces both.
    pub fn reorder(&self, todo_id: &str, target_id: &str) -> AppResult<()> {
        let mut document = self.persistence.load();
        let todo_index = document.todos.iter().position(|todo| todo.id == todo_id);
        let target_index = document.todos.iter().position(|todo| todo.id == target_id);
        let (Some(todo_index), Some(target_index)) = (todo_index, target_index) else {
            return Err(AppError::Validation("Invalid todo id".to_string()));
        };

        let moved = document.todos.remove(todo_index);
        document.todos.insert(target_index, moved);
        self.persistence.save(&document)
    }

    pub fn search(&self, query: &str) -> Vec<Todo> {
        let document = self.persistence.load();
        query::search(&document.todos, query)
    }

    pub fn stats(&self) -> TodoStats {
        let document = self.persistence.load();
        query::collect_stats(&document.todos)
    }

    pub fn backup_now(&self) -> AppResult<()> {
        self.backups.snapshot()
    }

    /// Replace the whole collection with a named backup's content. The save
    /// path snapshots the current state first, so even a restore is undoable.
    pub fn restore(&self, name: &str) -> AppResult<()> {
        let document = self.backups.restore(name)?;
        self.persistence.save(&document)
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Priority};
    use serde_json::json;

    fn temp_store() -> (tempfile::TempDir, TodoStore) {
        let root = tempfile::tempdir().expect("temp store root");
        let config = StoreConfig {
            data_file: root.path().join("todos.json"),
            backup_dir: root.path().join("backups"),
        };
        (root, TodoStore::new(&config))
    }

    fn titled(title: &str) -> TodoPayload {
        TodoPayload {
            title: Some(title.to_string()),
            ..TodoPayload::default()
        }
    }

    fn ids(store: &TodoStore) -> Vec<String> {
        store
            .list(&ListFilters::default())
            .into_iter()
            .map(|todo| todo.id)
            .collect()
    }

    #[test]
    fn create_assigns_fresh_unique_ids() {
        let (_root, store) = temp_store();
        let first = store.create(titled("a")).expect("first create");
        let second = store.create(titled("b")).expect("second create");

        assert!(!first.id.is_empty());
        assert_ne!(first.id, second.id);
        assert!(!first.completed);
        assert!(!first.created_at.is_empty());
        assert!(first.updated_at.is_none());
    }

    #[test]
    fn create_without_title_is_a_validation_error() {
        let (_root, store) = temp_store();
        let error = store
            .create(TodoPayload::default())
            .expect_err("title required");
        assert!(matches!(error, AppError::Validation(_)));
        assert!(store.list(&ListFilters::default()).is_empty());
    }

    #[test]
    fn create_with_empty_category_stores_other() {
        let (_root, store) = temp_store();
        let todo = store
            .create(TodoPayload {
                category: Some("".to_string()),
                ..titled("uncategorized")
            })
            .expect("create");
        assert_eq!(todo.category, Some(Category::Other));
    }

    #[test]
    fn update_merges_only_supplied_fields() {
        let (_root, store) = temp_store();
        let created = store
            .create(TodoPayload {
                completed: Some(json!(true)),
                priority: Some("high".to_string()),
                description: Some("original".to_string()),
                ..titled("task")
            })
            .expect("create");

        let updated = store
            .update(
                &created.id,
                TodoPayload {
                    progress: Some(json!(40)),
                    ..TodoPayload::default()
                },
            )
            .expect("update");

        assert!(updated.completed, "omitted completed must be retained");
        assert_eq!(updated.progress, Some(40));
        assert_eq!(updated.priority, Some(Priority::High));
        assert_eq!(updated.description.as_deref(), Some("original"));
        assert_eq!(updated.title, "task");
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.created_at, created.created_at);
    }

    #[test]
    fn update_with_completed_present_always_overwrites() {
        let (_root, store) = temp_store();
        let created = store
            .create(TodoPayload {
                completed: Some(json!(true)),
                ..titled("done")
            })
            .expect("create");

        let updated = store
            .update(
                &created.id,
                TodoPayload {
                    completed: Some(json!(false)),
                    ..TodoPayload::default()
                },
            )
            .expect("update");
        assert!(!updated.completed);
    }

    #[test]
    fn update_of_unknown_id_is_not_found() {
        let (_root, store) = temp_store();
        let error = store
            .update("missing", titled("x"))
            .expect_err("unknown id");
        assert!(matches!(error, AppError::NotFound(_)));
    }

    #[test]
    fn delete_removes_exactly_the_matching_record() {
        let (_root, store) = temp_store();
        let keep = store.create(titled("keep")).expect("create keep");
        let gone = store.create(titled("gone")).expect("create gone");

        store.delete(&gone.id).expect("delete");
        assert_eq!(ids(&store), vec![keep.id]);

        let error = store.delete(&gone.id).expect_err("already deleted");
        assert!(matches!(error, AppError::NotFound(_)));
    }

    #[test]
    fn reorder_toward_the_back_lands_after_the_target() {
        let (_root, store) = temp_store();
        let a = store.create(titled("A")).expect("create A");
        let b = store.create(titled("B")).expect("create B");
        let c = store.create(titled("C")).expect("create C");

        store.reorder(&a.id, &c.id).expect("reorder");
        assert_eq!(ids(&store), vec![b.id, c.id, a.id]);
    }

    #[test]
    fn reorder_toward_the_front_lands_before_the_target() {
        let (_root, store) = temp_store();
        let a = store.create(titled("A")).expect("create A");
        let b = store.create(titled("B")).expect("create B");
        let c = store.create(titled("C")).expect("create C");

        store.reorder(&c.id, &a.id).expect("reorder");
        assert_eq!(ids(&store), vec![c.id, a.id, b.id]);
    }

    #[test]
    fn reorder_with_unknown_ids_is_a_validation_error() {
        let (_root, store) = temp_store();
        let a = store.create(titled("A")).expect("create A");

        let error = store.reorder(&a.id, "missing").expect_err("unknown target");
        assert!(matches!(error, AppError::Validation(_)));
        let error = store.reorder("missing", &a.id).expect_err("unknown source");
        assert!(matches!(error, AppError::Validation(_)));
    }

    #[test]
    fn restore_replaces_the_whole_collection() {
        let (root, store) = temp_store();
        store.create(titled("before")).expect("create before");
        store.backup_now().expect("manual backup");

        let backup_name = std::fs::read_dir(root.path().join("backups"))
            .expect("backup dir")
            .next()
            .expect("one backup")
            .expect("entry")
            .file_name()
            .to_string_lossy()
            .to_string();

        store.create(titled("after")).expect("create after");
        assert_eq!(store.list(&ListFilters::default()).len(), 2);

        store.restore(&backup_name).expect("restore");
        let titles: Vec<_> = store
            .list(&ListFilters::default())
            .into_iter()
            .map(|todo| todo.title)
            .collect();
        assert_eq!(titles, vec!["before"]);
    }

    #[test]
    fn restore_of_unknown_backup_is_not_found() {
        let (_root, store) = temp_store();
        let error = store.restore("nope.json").expect_err("unknown backup");
        assert!(matches!(error, AppError::NotFound(_)));
    }

    #[test]
    fn ensure_initialized_writes_the_empty_envelope_once() {
        let (root, store) = temp_store();
        let data_file = root.path().join("todos.json");
        assert!(!data_file.exists());

        store.ensure_initialized().expect("first init");
        let raw = std::fs::read_to_string(&data_file).expect("read data file");
        assert!(raw.contains("todos"));

        let created = store.create(titled("kept")).expect("create");
        store.ensure_initialized().expect("second init");
        assert_eq!(ids(&store), vec![created.id]);
    }
}
