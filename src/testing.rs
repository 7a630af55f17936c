//! In-memory repositories standing in for Postgres in unit and HTTP tests.

use std::sync::Mutex;

use axum::async_trait;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::auth::repo::UserRepository;
use crate::auth::repo_types::{NewUser, User};
use crate::db::RepoError;
use crate::todos::repo::TodoRepository;
use crate::todos::repo_types::{NewTodo, Todo, TodoPatch};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, RepoError> {
        let mut users = self.users.lock().unwrap();
        // mirrors the UNIQUE constraint on users.email
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepoError::UniqueViolation);
        }
        let now = OffsetDateTime::now_utc();
        let stored = User {
            id: Uuid::new_v4(),
            email: user.email,
            full_name: user.full_name,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.push(stored.clone());
        Ok(stored)
    }
}

#[derive(Default)]
pub struct InMemoryTodoRepository {
    todos: Mutex<Vec<Todo>>,
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, RepoError> {
        let now = OffsetDateTime::now_utc();
        let stored = Todo {
            id: Uuid::new_v4(),
            user_id: todo.user_id,
            title: todo.title,
            completed: todo.completed,
            created_at: now,
            updated_at: now,
        };
        self.todos.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn find_all(&self, user_id: Uuid) -> Result<Vec<Todo>, RepoError> {
        let todos = self.todos.lock().unwrap();
        Ok(todos.iter().filter(|t| t.user_id == user_id).cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Todo>, RepoError> {
        let todos = self.todos.lock().unwrap();
        Ok(todos
            .iter()
            .find(|t| t.id == id && t.user_id == user_id)
            .cloned())
    }

    async fn update(&self, id: Uuid, user_id: Uuid, patch: TodoPatch) -> Result<bool, RepoError> {
        let mut todos = self.todos.lock().unwrap();
        let Some(todo) = todos.iter_mut().find(|t| t.id == id && t.user_id == user_id) else {
            return Ok(false);
        };
        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        todo.updated_at = patch
            .updated_at
            .max(todo.updated_at + Duration::microseconds(1));
        Ok(true)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let mut todos = self.todos.lock().unwrap();
        let before = todos.len();
        todos.retain(|t| !(t.id == id && t.user_id == user_id));
        Ok(todos.len() < before)
    }
}
