//! Client-side task cache with optimistic mutations.
//!
//! `update`, `delete` and `move_task` rewrite the cache before the server
//! answers and roll the whole cache back to the pre-mutation snapshot if the
//! server rejects the change. `create` only reveals the task once the server
//! has assigned it an id.
//!
//! Every write to the cache bumps a generation counter. A failed mutation
//! restores its snapshot only while the generation is still the one it
//! produced; if the cache moved on in the meantime the snapshot is stale,
//! so the store reloads from the server instead.
//!
//! That reload replaces the whole cache, including the optimistic edits of
//! any mutation still in flight. Such an edit stays gone even if its request
//! later succeeds; it reappears with the next `load`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;

use crate::api::{self, ApiError, Transport};
use crate::core::board::{Board, TasksSummary};
use crate::core::task::{Task, TaskCreate, TaskStatus, TaskUpdate};

use super::notice::Notifier;

#[derive(Debug, Default)]
struct TaskCache {
    tasks: Vec<Task>,
    loading: bool,
    error: Option<ApiError>,
    generation: u64,
}

impl TaskCache {
    fn replace(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.generation += 1;
    }
}

/// Cache contents before a mutation, and the generation the mutation left
/// behind.
struct Snapshot {
    tasks: Vec<Task>,
    generation: u64,
}

#[derive(Clone)]
pub struct TaskStore {
    transport: Arc<dyn Transport>,
    cache: Arc<Mutex<TaskCache>>,
    notices: Notifier,
}

impl TaskStore {
    pub fn new(transport: Arc<dyn Transport>, notices: Notifier) -> Self {
        Self {
            transport,
            cache: Arc::new(Mutex::new(TaskCache::default())),
            notices,
        }
    }

    fn lock(&self) -> MutexGuard<'_, TaskCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.lock().tasks.iter().find(|t| t.id == id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    /// Error from the last `load`, cleared by the next successful one.
    pub fn error(&self) -> Option<ApiError> {
        self.lock().error.clone()
    }

    pub fn board(&self) -> Board {
        Board::from_tasks(&self.lock().tasks)
    }

    pub fn summary(&self) -> TasksSummary {
        TasksSummary::from_tasks(&self.lock().tasks)
    }

    /// Replace the cache with the server's task list. No retry.
    pub async fn load(&self) -> Result<(), ApiError> {
        self.lock().loading = true;
        let result = api::tasks::list(&*self.transport).await;

        let mut cache = self.lock();
        cache.loading = false;
        match result {
            Ok(tasks) => {
                log::info!("Loaded {} tasks", tasks.len());
                cache.replace(tasks);
                cache.error = None;
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load tasks: {}", e);
                cache.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Create a task and append the server's record once it is confirmed.
    pub async fn create(&self, input: TaskCreate) -> Result<Task, ApiError> {
        match api::tasks::create(&*self.transport, &input).await {
            Ok(task) => {
                {
                    let mut cache = self.lock();
                    // A reload may already have picked it up.
                    if !cache.tasks.iter().any(|t| t.id == task.id) {
                        cache.tasks.push(task.clone());
                        cache.generation += 1;
                    }
                }
                log::info!("Created task {} ({})", task.id, task.title);
                self.notices.success("Task created successfully!");
                Ok(task)
            }
            Err(e) => {
                log::warn!("Failed to create task {:?}: {}", input.title, e);
                self.notices.error("Failed to create task.");
                Err(e)
            }
        }
    }

    /// Merge `fields` over the cached task now and send the update in the
    /// background. The handle may be awaited or dropped.
    pub fn update(&self, id: &str, fields: TaskUpdate) -> JoinHandle<()> {
        let snapshot = self.apply_optimistic(|tasks| {
            if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
                fields.apply_to(task);
            }
        });

        let store = self.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            let result = api::tasks::update(&*store.transport, &id, &fields).await;
            if result.is_ok() {
                log::debug!("Task {} updated", id);
            }
            store
                .settle(snapshot, result, "Task updated successfully!", "Failed to update task.")
                .await;
        })
    }

    /// Remove the task from the cache now and delete it in the background.
    pub fn delete(&self, id: &str) -> JoinHandle<()> {
        let snapshot = self.apply_optimistic(|tasks| tasks.retain(|t| t.id != id));

        let store = self.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            let result = api::tasks::delete(&*store.transport, &id).await;
            if result.is_ok() {
                log::info!("Task {} deleted", id);
            }
            store
                .settle(snapshot, result, "Task deleted successfully!", "Failed to delete task.")
                .await;
        })
    }

    /// Drop a task into another status column. Returns `None`, without
    /// touching the network, when the task is unknown or already there.
    pub fn move_task(&self, id: &str, status: TaskStatus) -> Option<JoinHandle<()>> {
        let current = self.lock().tasks.iter().find(|t| t.id == id).map(|t| t.status);
        match current {
            Some(current) if current != status => Some(self.update(id, TaskUpdate::status(status))),
            Some(_) => {
                log::debug!("Task {} already {}", id, status.as_str());
                None
            }
            None => {
                log::warn!("Cannot move unknown task {}", id);
                None
            }
        }
    }

    fn apply_optimistic(&self, mutate: impl FnOnce(&mut Vec<Task>)) -> Snapshot {
        let mut cache = self.lock();
        let tasks = cache.tasks.clone();
        mutate(&mut cache.tasks);
        cache.generation += 1;
        Snapshot {
            tasks,
            generation: cache.generation,
        }
    }

    async fn settle(
        &self,
        snapshot: Snapshot,
        result: Result<(), ApiError>,
        success: &str,
        failure: &str,
    ) {
        let err = match result {
            Ok(()) => {
                self.notices.success(success);
                return;
            }
            Err(e) => e,
        };

        log::warn!("{} {}", failure, err);
        let restored = {
            let mut cache = self.lock();
            if cache.generation == snapshot.generation {
                cache.replace(snapshot.tasks);
                true
            } else {
                false
            }
        };
        self.notices.error(failure);

        if !restored {
            log::warn!("Task cache changed since the failed mutation, reloading");
            // load() records its own failure in `error`.
            let _ = self.load().await;
        }
    }
}
