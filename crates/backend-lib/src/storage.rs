// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! Storage abstraction with flat-file implementation.
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::{fs as tokio_fs, io::AsyncWriteExt};
use todo_common::Seq;

use crate::error::AppError;
use crate::validation::is_valid_login_id;

/// A stored account. Records are replaced whole, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub login_id: String,
    pub password_hash: String,
}

impl Identity {
    pub fn new(login_id: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            login_id: login_id.into(),
            password_hash: password_hash.into(),
        }
    }
}

/// A stored todo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub seq: Seq,
    pub content: String,
}

impl Todo {
    /// Copy of this todo with new content
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            seq: self.seq,
            content: content.into(),
        }
    }
}

/// Trait for storage backends
#[async_trait]
pub trait Storage: Send + Sync {
    /// Look up an account by login id
    async fn find_user_by_login_id(&self, login_id: &str) -> Result<Option<Identity>, AppError>;

    /// Whether an account with this login id exists
    async fn user_exists(&self, login_id: &str) -> Result<bool, AppError>;

    /// Store a new account; fails with `DuplicateLoginId` if the id is taken
    async fn store_user(&self, identity: &Identity) -> Result<(), AppError>;

    /// Replace the account `current_login_id` with `updated`, which may carry a new login id
    async fn replace_user(&self, current_login_id: &str, updated: &Identity) -> Result<(), AppError>;

    /// Delete an account, returning whether it existed
    async fn delete_user(&self, login_id: &str) -> Result<bool, AppError>;

    /// Store a new todo under the next sequence number
    async fn insert_todo(&self, content: &str) -> Result<Todo, AppError>;

    /// All todos ordered by sequence number
    async fn list_todos(&self) -> Result<Vec<Todo>, AppError>;

    async fn find_todo(&self, seq: Seq) -> Result<Option<Todo>, AppError>;

    /// First todo (lowest seq) whose content equals `content`
    async fn find_todo_by_content(&self, content: &str) -> Result<Option<Todo>, AppError>;

    /// Replace an existing todo, returning whether it existed
    async fn replace_todo(&self, todo: &Todo) -> Result<bool, AppError>;

    /// Delete a todo, returning whether it existed
    async fn delete_todo(&self, seq: Seq) -> Result<bool, AppError>;
}

/// Flat-file implementation of the Storage trait
///
/// Layout: `users/<loginId>.json` and `todos/<seq>.json` under the root.
#[derive(Clone)]
pub struct FlatFileStorage {
    root: PathBuf,
    next_seq: Arc<AtomicU64>,
}

impl FlatFileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, AppError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("users"))?;
        fs::create_dir_all(root.join("todos"))?;

        let mut last_seq = 0;
        for entry in fs::read_dir(root.join("todos"))? {
            if let Some(seq) = seq_from_path(&entry?.path()) {
                last_seq = last_seq.max(seq);
            }
        }

        Ok(Self {
            root,
            next_seq: Arc::new(AtomicU64::new(last_seq + 1)),
        })
    }

    /// Path of a user record; `None` for ids that cannot name a file safely
    fn user_path(&self, login_id: &str) -> Option<PathBuf> {
        is_valid_login_id(login_id).then(|| self.root.join("users").join(format!("{login_id}.json")))
    }

    fn todo_path(&self, seq: Seq) -> PathBuf {
        self.root.join("todos").join(format!("{seq}.json"))
    }
}

fn seq_from_path(path: &Path) -> Option<Seq> {
    if path.extension()? != "json" {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
    match tokio_fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Create `path`, failing with `AlreadyExists` if it is present.
async fn create_json<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    let mut file = tokio_fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(&json).await?;
    file.flush().await
}

/// Overwrite `path` through a temporary file and rename.
async fn replace_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let json = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    tokio_fs::write(&tmp, json).await?;
    tokio_fs::rename(&tmp, path).await?;
    Ok(())
}

async fn remove_file(path: &Path) -> Result<bool, AppError> {
    match tokio_fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl Storage for FlatFileStorage {
    async fn find_user_by_login_id(&self, login_id: &str) -> Result<Option<Identity>, AppError> {
        match self.user_path(login_id) {
            Some(path) => read_json(&path).await,
            None => Ok(None),
        }
    }

    async fn user_exists(&self, login_id: &str) -> Result<bool, AppError> {
        match self.user_path(login_id) {
            Some(path) => Ok(tokio_fs::try_exists(path).await?),
            None => Ok(false),
        }
    }

    async fn store_user(&self, identity: &Identity) -> Result<(), AppError> {
        let path = self
            .user_path(&identity.login_id)
            .ok_or_else(|| AppError::InvalidInput(format!("invalid login id: {}", identity.login_id)))?;

        match create_json(&path, identity).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(AppError::DuplicateLoginId),
            Err(e) => Err(e.into()),
        }
    }

    async fn replace_user(&self, current_login_id: &str, updated: &Identity) -> Result<(), AppError> {
        let current = self
            .user_path(current_login_id)
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;
        if !tokio_fs::try_exists(&current).await? {
            return Err(AppError::NotFound("User".to_string()));
        }

        if current_login_id == updated.login_id {
            return replace_json(&current, updated).await;
        }

        self.store_user(updated).await?;
        remove_file(&current).await?;
        Ok(())
    }

    async fn delete_user(&self, login_id: &str) -> Result<bool, AppError> {
        match self.user_path(login_id) {
            Some(path) => remove_file(&path).await,
            None => Ok(false),
        }
    }

    async fn insert_todo(&self, content: &str) -> Result<Todo, AppError> {
        let todo = Todo {
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
            content: content.to_string(),
        };
        create_json(&self.todo_path(todo.seq), &todo).await?;
        Ok(todo)
    }

    async fn list_todos(&self) -> Result<Vec<Todo>, AppError> {
        let mut todos = Vec::new();
        let mut entries = tokio_fs::read_dir(self.root.join("todos")).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if seq_from_path(&path).is_none() {
                continue;
            }
            if let Some(todo) = read_json::<Todo>(&path).await? {
                todos.push(todo);
            }
        }
        todos.sort_by_key(|todo| todo.seq);
        Ok(todos)
    }

    async fn find_todo(&self, seq: Seq) -> Result<Option<Todo>, AppError> {
        read_json(&self.todo_path(seq)).await
    }

    async fn find_todo_by_content(&self, content: &str) -> Result<Option<Todo>, AppError> {
        Ok(self
            .list_todos()
            .await?
            .into_iter()
            .find(|todo| todo.content == content))
    }

    async fn replace_todo(&self, todo: &Todo) -> Result<bool, AppError> {
        let path = self.todo_path(todo.seq);
        if !tokio_fs::try_exists(&path).await? {
            return Ok(false);
        }
        replace_json(&path, todo).await?;
        Ok(true)
    }

    async fn delete_todo(&self, seq: Seq) -> Result<bool, AppError> {
        remove_file(&self.todo_path(seq)).await
    }
}
