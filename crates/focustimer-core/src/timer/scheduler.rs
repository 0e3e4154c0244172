//! Deterministic task scheduler.
//!
//! Stands in for interval and timeout callbacks. Tasks are identified by a
//! [`TaskId`] that doubles as the cancellation token. Nothing runs on its
//! own: the owner calls [`Scheduler::pop_due`] with the current instant and
//! handles each due task in deadline order.

use serde::{Deserialize, Serialize};

use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum TaskKind {
    /// One-second countdown tick.
    Tick,
    /// One step of the auto-start countdown.
    AutoStart,
    /// An event held back for later delivery.
    Deliver(Box<Event>),
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    id: TaskId,
    kind: TaskKind,
    due_ms: u64,
    period_ms: Option<u64>,
}

#[derive(Debug, Default, Clone)]
pub struct Scheduler {
    next_id: u64,
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `kind` once at `due_ms`.
    pub fn schedule_once(&mut self, kind: TaskKind, due_ms: u64) -> TaskId {
        self.push(kind, due_ms, None)
    }

    /// Run `kind` at `first_due_ms` and then every `period_ms` after it.
    ///
    /// Deadlines are computed from the first deadline, not from when each
    /// run was handled, so late handling never shifts later runs.
    pub fn schedule_every(&mut self, kind: TaskKind, first_due_ms: u64, period_ms: u64) -> TaskId {
        self.push(kind, first_due_ms, Some(period_ms.max(1)))
    }

    /// Cancel a task. Returns false if it had already run or been cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            tracing::trace!(?id, "scheduler task cancelled");
        }
        removed
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of pending tasks matching `pred`.
    pub fn count_where(&self, pred: impl Fn(&TaskKind) -> bool) -> usize {
        self.tasks.iter().filter(|t| pred(&t.kind)).count()
    }

    /// Earliest pending deadline.
    pub fn next_due(&self) -> Option<u64> {
        self.tasks.iter().map(|t| t.due_ms).min()
    }

    /// Take the earliest task due at or before `now_ms`.
    ///
    /// One-shot tasks are removed; repeating tasks are re-armed for their
    /// next period. Ties are broken by scheduling order.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TaskId, TaskKind)> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= now_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i)?;

        let fired = (self.tasks[idx].id, self.tasks[idx].kind.clone());
        let period = self.tasks[idx].period_ms;
        match period {
            Some(period) => self.tasks[idx].due_ms += period,
            None => {
                self.tasks.remove(idx);
            }
        }
        Some(fired)
    }

    fn push(&mut self, kind: TaskKind, due_ms: u64, period_ms: Option<u64>) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        tracing::trace!(?id, ?kind, due_ms, ?period_ms, "scheduler task added");
        self.tasks.push(ScheduledTask {
            id,
            kind,
            due_ms,
            period_ms,
        });
        id
    }
}
