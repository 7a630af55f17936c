use std::{sync::Arc, time::Duration};

use time::OffsetDateTime;
use tracing::{debug, error};
use uuid::Uuid;

use crate::db::RepoError;
use crate::error::{ApiError, ApiResult};
use crate::todos::repo::TodoRepository;
use crate::todos::repo_types::{NewTodo, Todo, TodoPatch};

/// Owner-scoped todo storage. A todo that belongs to someone else is
/// reported exactly like one that does not exist.
#[derive(Clone)]
pub struct TodoStore {
    repo: Arc<dyn TodoRepository>,
    deadline: Duration,
}

impl TodoStore {
    /// `deadline` bounds an operation as a whole, including the read back
    /// after an update.
    pub fn new(repo: Arc<dyn TodoRepository>, deadline: Duration) -> Self {
        Self { repo, deadline }
    }

    pub async fn create(
        &self,
        owner: Uuid,
        title: String,
        completed: Option<bool>,
    ) -> ApiResult<Todo> {
        let todo = self
            .repo
            .insert(NewTodo {
                user_id: owner,
                title,
                completed: completed.unwrap_or(false),
            })
            .await?;
        debug!(todo_id = %todo.id, user_id = %owner, "todo created");
        Ok(todo)
    }

    pub async fn find_all(&self, owner: Uuid) -> ApiResult<Vec<Todo>> {
        Ok(self.repo.find_all(owner).await?)
    }

    pub async fn find_by_id(&self, id: Uuid, owner: Uuid) -> ApiResult<Todo> {
        self.repo
            .find_by_id(id, owner)
            .await?
            .ok_or(ApiError::NotFound)
    }

    /// Applies the patch to the `(id, owner)` match, then reads the row back.
    /// A row deleted between the two steps also ends in `NotFound`.
    pub async fn update(
        &self,
        id: Uuid,
        owner: Uuid,
        title: Option<String>,
        completed: Option<bool>,
    ) -> ApiResult<Todo> {
        let patch = TodoPatch {
            title,
            completed,
            updated_at: OffsetDateTime::now_utc(),
        };
        let op = async {
            if !self.repo.update(id, owner, patch).await? {
                return Err(ApiError::NotFound);
            }
            self.find_by_id(id, owner).await
        };
        match tokio::time::timeout(self.deadline, op).await {
            Ok(res) => res,
            Err(_) => {
                error!(limit = ?self.deadline, todo_id = %id, "todo update deadline exceeded");
                Err(RepoError::Timeout(self.deadline).into())
            }
        }
    }

    pub async fn delete(&self, id: Uuid, owner: Uuid) -> ApiResult<()> {
        if !self.repo.delete(id, owner).await? {
            return Err(ApiError::NotFound);
        }
        debug!(todo_id = %id, user_id = %owner, "todo deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryTodoRepository;
    use axum::async_trait;

    fn store() -> TodoStore {
        TodoStore::new(
            Arc::new(InMemoryTodoRepository::default()),
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn create_defaults_to_not_completed() {
        let store = store();
        let owner = Uuid::new_v4();
        let todo = store.create(owner, "Buy milk".into(), None).await.unwrap();
        assert!(!todo.completed);
        assert_eq!(todo.user_id, owner);
        assert_eq!(todo.created_at, todo.updated_at);
    }

    #[tokio::test]
    async fn find_all_is_scoped_to_owner() {
        let store = store();
        let (ann, bob) = (Uuid::new_v4(), Uuid::new_v4());
        store.create(ann, "a1".into(), None).await.unwrap();
        store.create(ann, "a2".into(), Some(true)).await.unwrap();
        store.create(bob, "b1".into(), None).await.unwrap();

        let titles: Vec<_> = store
            .find_all(ann)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["a1", "a2"]);
        assert!(store.find_all(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_owners_see_not_found() {
        let store = store();
        let (ann, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let todo = store.create(ann, "private".into(), None).await.unwrap();

        assert!(matches!(store.find_by_id(todo.id, bob).await, Err(ApiError::NotFound)));
        assert!(matches!(
            store.update(todo.id, bob, Some("hijacked".into()), None).await,
            Err(ApiError::NotFound)
        ));
        assert!(matches!(store.delete(todo.id, bob).await, Err(ApiError::NotFound)));

        let still = store.find_by_id(todo.id, ann).await.unwrap();
        assert_eq!(still.title, "private");
    }

    #[tokio::test]
    async fn partial_update_keeps_absent_fields() {
        let store = store();
        let owner = Uuid::new_v4();
        let todo = store.create(owner, "Buy milk".into(), None).await.unwrap();

        let updated = store.update(todo.id, owner, None, Some(true)).await.unwrap();
        assert_eq!(updated.title, "Buy milk");
        assert!(updated.completed);
        assert!(updated.updated_at > todo.updated_at);
        assert_eq!(updated.created_at, todo.created_at);

        let again = store.update(todo.id, owner, None, Some(false)).await.unwrap();
        assert!(!again.completed);
        assert!(again.updated_at > updated.updated_at);
    }

    #[tokio::test]
    async fn delete_removes_only_once() {
        let store = store();
        let owner = Uuid::new_v4();
        let todo = store.create(owner, "x".into(), None).await.unwrap();
        store.delete(todo.id, owner).await.unwrap();
        assert!(matches!(store.delete(todo.id, owner).await, Err(ApiError::NotFound)));
        assert!(matches!(store.find_by_id(todo.id, owner).await, Err(ApiError::NotFound)));
    }

    /// Reports a successful update but the row is gone on the read back,
    /// as if a concurrent delete landed in between.
    struct VanishingRepo;

    #[async_trait]
    impl TodoRepository for VanishingRepo {
        async fn insert(&self, _todo: NewTodo) -> Result<Todo, RepoError> {
            unreachable!()
        }
        async fn find_all(&self, _user_id: Uuid) -> Result<Vec<Todo>, RepoError> {
            Ok(Vec::new())
        }
        async fn find_by_id(&self, _id: Uuid, _user_id: Uuid) -> Result<Option<Todo>, RepoError> {
            Ok(None)
        }
        async fn update(&self, _id: Uuid, _u: Uuid, _p: TodoPatch) -> Result<bool, RepoError> {
            Ok(true)
        }
        async fn delete(&self, _id: Uuid, _user_id: Uuid) -> Result<bool, RepoError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn update_then_vanished_row_is_not_found() {
        let store = TodoStore::new(Arc::new(VanishingRepo), Duration::from_secs(1));
        let res = store
            .update(Uuid::new_v4(), Uuid::new_v4(), None, Some(true))
            .await;
        assert!(matches!(res, Err(ApiError::NotFound)));
    }

    /// Each call finishes well inside the budget on its own; together they
    /// overrun it.
    struct SlowRepo(Duration);

    #[async_trait]
    impl TodoRepository for SlowRepo {
        async fn insert(&self, _todo: NewTodo) -> Result<Todo, RepoError> {
            unreachable!()
        }
        async fn find_all(&self, _user_id: Uuid) -> Result<Vec<Todo>, RepoError> {
            Ok(Vec::new())
        }
        async fn find_by_id(&self, _id: Uuid, _user_id: Uuid) -> Result<Option<Todo>, RepoError> {
            tokio::time::sleep(self.0).await;
            Ok(None)
        }
        async fn update(&self, _id: Uuid, _u: Uuid, _p: TodoPatch) -> Result<bool, RepoError> {
            tokio::time::sleep(self.0).await;
            Ok(true)
        }
        async fn delete(&self, _id: Uuid, _user_id: Uuid) -> Result<bool, RepoError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn update_and_read_back_share_one_deadline() {
        let store = TodoStore::new(
            Arc::new(SlowRepo(Duration::from_millis(60))),
            Duration::from_millis(100),
        );
        let res = store
            .update(Uuid::new_v4(), Uuid::new_v4(), None, Some(true))
            .await;
        assert!(matches!(res, Err(ApiError::Internal(_))));
    }
}
