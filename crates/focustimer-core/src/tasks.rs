//! Simple to-do list kept next to the timer.

use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::ValidationError;
use crate::events::Event;
use crate::storage::{self, KvStore, TASKS_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Monotonic token derived from the creation instant.
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Persisted task list, newest first.
pub struct TaskList {
    store: Rc<dyn KvStore>,
    clock: Rc<dyn Clock>,
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn load(store: Rc<dyn KvStore>, clock: Rc<dyn Clock>) -> Self {
        let tasks: Vec<Task> = storage::load_whole(store.as_ref(), TASKS_KEY);
        Self {
            store,
            clock,
            tasks,
        }
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn active(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| !t.completed).collect()
    }

    pub fn completed(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.completed).collect()
    }

    pub fn add(&mut self, text: &str) -> Result<Event, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyTaskText);
        }

        let last = self.tasks.iter().map(|t| t.id).max().unwrap_or(0);
        let id = self.clock.now_ms().max(last.saturating_add(1));
        let at = self.clock.now();
        self.tasks.insert(
            0,
            Task {
                id,
                text: text.to_string(),
                completed: false,
                created_at: at,
                completed_at: None,
            },
        );
        tracing::debug!(id, "task added");
        self.persist();
        Ok(Event::TaskAdded { id, at })
    }

    /// Flip completion, stamping or clearing `completed_at`.
    pub fn toggle(&mut self, id: u64) -> Result<Event, ValidationError> {
        let at = self.clock.now();
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ValidationError::TaskNotFound(id))?;

        task.completed = !task.completed;
        let event = if task.completed {
            task.completed_at = Some(at);
            Event::TaskCompleted { id, at }
        } else {
            task.completed_at = None;
            Event::TaskReopened { id, at }
        };
        self.persist();
        Ok(event)
    }

    pub fn delete(&mut self, id: u64) -> Result<Event, ValidationError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Err(ValidationError::TaskNotFound(id));
        }
        self.persist();
        Ok(Event::TaskDeleted {
            id,
            at: self.clock.now(),
        })
    }

    /// Drop every completed task. Returns `None` when there was nothing to clear.
    pub fn clear_completed(&mut self) -> Option<Event> {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let count = before - self.tasks.len();
        if count == 0 {
            return None;
        }
        self.persist();
        Some(Event::CompletedTasksCleared {
            count,
            at: self.clock.now(),
        })
    }

    fn persist(&self) {
        if let Err(e) = storage::save_record(self.store.as_ref(), TASKS_KEY, &self.tasks) {
            tracing::warn!(error = %e, "failed to persist tasks");
        }
    }
}
