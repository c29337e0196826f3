use crate::error::StoreError;
use crate::task::{Status, Task};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How a [`TaskStore`] came by its initial contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The backing file was read and decoded.
    Loaded { count: usize },
    /// No backing file existed yet.
    Missing,
    /// The backing file could not be read or decoded and was ignored.
    Recovered { reason: String },
}

/// On-disk layout of the backing file.
#[derive(Serialize)]
struct TaskFile<'a> {
    next_id: u32,
    tasks: &'a [Task],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTasks {
    Current { next_id: u32, tasks: Vec<Task> },
    // Plain array written by earlier versions of the tool
    Legacy(Vec<Task>),
}

/// The authoritative, file-backed collection of tasks.
///
/// Every mutation is written through to the backing file before it is
/// reported as successful. There is no locking between processes: two
/// invocations racing on the same file can lose an update, and the last
/// one to persist wins.
#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
    next_id: u32,
    load_outcome: LoadOutcome,
}

impl TaskStore {
    /// Loads the store from `path`.
    ///
    /// Never fails: a missing, unreadable or malformed file yields an empty
    /// store, and [`TaskStore::load_outcome`] records which of those happened.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (tasks, next_id, load_outcome) = match fs::read_to_string(&path) {
            Ok(contents) => match decode(&contents) {
                Ok((tasks, next_id)) => {
                    let count = tasks.len();
                    (tasks, next_id, LoadOutcome::Loaded { count })
                }
                Err(reason) => {
                    debug!(path = %path.display(), %reason, "ignoring malformed task file");
                    (Vec::new(), 1, LoadOutcome::Recovered { reason })
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no task file yet, starting empty");
                (Vec::new(), 1, LoadOutcome::Missing)
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cannot read task file");
                (
                    Vec::new(),
                    1,
                    LoadOutcome::Recovered {
                        reason: e.to_string(),
                    },
                )
            }
        };

        Self {
            path,
            tasks,
            next_id,
            load_outcome,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Writes the whole collection to the backing file.
    ///
    /// The file is replaced by renaming a fully written sibling temp file over
    /// it, so a reader sees either the old contents or the new ones.
    pub fn persist(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&TaskFile {
            next_id: self.next_id,
            tasks: &self.tasks,
        })?;

        let persist_err = |source| StoreError::Persist {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(persist_err)?;
        }

        let temp_path = self.temp_path();
        let written = write_synced(&temp_path, format!("{json}\n").as_bytes())
            .and_then(|_| fs::rename(&temp_path, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(persist_err(e));
        }

        debug!(path = %self.path.display(), count = self.tasks.len(), "persisted tasks");
        Ok(())
    }

    /// Creates a pending task and returns it.
    ///
    /// Fails with [`StoreError::IdsExhausted`] once the last `u32` ID would
    /// leave no successor for the counter.
    #[tracing::instrument(skip(self))]
    pub fn add(&mut self, description: String) -> Result<Task, StoreError> {
        self.write_through(|store| {
            let following = store
                .next_id
                .checked_add(1)
                .ok_or(StoreError::IdsExhausted)?;
            let task = Task::new(store.next_id, description);
            store.next_id = following;
            store.tasks.push(task.clone());
            Ok(task)
        })
        .inspect(|task| info!(id = task.id(), "task added"))
    }

    /// Replaces the description of the task with the given ID.
    #[tracing::instrument(skip(self))]
    pub fn update_description(
        &mut self,
        id: u32,
        description: String,
    ) -> Result<Task, StoreError> {
        self.write_through(|store| {
            let task = store.get_mut(id).ok_or(StoreError::NotFound(id))?;
            task.set_description(description);
            Ok(task.clone())
        })
        .inspect(|_| info!(id, "task description updated"))
    }

    /// Validates `status` against the fixed set of statuses, then applies it.
    ///
    /// An invalid status is rejected before the task is even looked up.
    pub fn update_status(&mut self, id: u32, status: &str) -> Result<Task, StoreError> {
        let status = status.parse::<Status>()?;
        self.set_status(id, status)
    }

    #[tracing::instrument(skip(self))]
    pub fn set_status(&mut self, id: u32, status: Status) -> Result<Task, StoreError> {
        self.write_through(|store| {
            let task = store.get_mut(id).ok_or(StoreError::NotFound(id))?;
            task.set_status(status);
            Ok(task.clone())
        })
        .inspect(|_| info!(id, %status, "task status updated"))
    }

    /// Removes the task with the given ID and returns it.
    ///
    /// The remaining tasks keep their relative order and IDs.
    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, id: u32) -> Result<Task, StoreError> {
        self.write_through(|store| {
            let index = store
                .tasks
                .iter()
                .position(|task| task.id() == id)
                .ok_or(StoreError::NotFound(id))?;
            Ok(store.tasks.remove(index))
        })
        .inspect(|_| info!(id, "task deleted"))
    }

    pub fn get(&self, id: u32) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    /// All tasks in insertion order.
    pub fn list_all(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks with the given status, in insertion order.
    pub fn list_by_status(&self, status: Status) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.status() == status)
            .collect()
    }

    fn get_mut(&mut self, id: u32) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id() == id)
    }

    // `mutation` must leave the store untouched when it returns an error.
    // If persisting fails the in-memory state is rolled back, so memory never
    // holds a change the file does not.
    fn write_through<T>(
        &mut self,
        mutation: impl FnOnce(&mut Self) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let tasks = self.tasks.clone();
        let next_id = self.next_id;

        let value = mutation(self)?;
        if let Err(e) = self.persist() {
            self.tasks = tasks;
            self.next_id = next_id;
            return Err(e);
        }
        Ok(value)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("tasks"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

const IDS_EXHAUSTED: &str = "task ID space exhausted";

/// Decodes a backing file into its tasks and the next ID to assign.
///
/// Older array files assigned `count + 1` as the ID, so after a deletion they
/// can hold the same ID twice. Later duplicates there get fresh IDs past the
/// highest one, keeping their position. Duplicates in the current format are
/// corruption.
fn decode(contents: &str) -> Result<(Vec<Task>, u32), String> {
    let stored = serde_json::from_str::<StoredTasks>(contents).map_err(|e| e.to_string())?;
    let (mut tasks, stored_next_id, legacy) = match stored {
        StoredTasks::Current { next_id, tasks } => (tasks, next_id, false),
        StoredTasks::Legacy(tasks) => (tasks, 1, true),
    };

    if tasks.iter().any(|task| task.id() == 0) {
        return Err("task ID 0 is not allowed".to_string());
    }

    let max_id = tasks.iter().map(Task::id).max().unwrap_or(0);
    let mut next_id = max_id
        .checked_add(1)
        .ok_or_else(|| IDS_EXHAUSTED.to_string())?
        .max(stored_next_id);

    let mut seen = HashSet::new();
    for task in &mut tasks {
        if seen.insert(task.id()) {
            continue;
        }
        if !legacy {
            return Err(format!("duplicate task ID {}", task.id()));
        }
        debug!(old = task.id(), new = next_id, "reassigning duplicate task ID");
        task.reassign_id(next_id);
        seen.insert(next_id);
        next_id = next_id
            .checked_add(1)
            .ok_or_else(|| IDS_EXHAUSTED.to_string())?;
    }

    Ok((tasks, next_id))
}
