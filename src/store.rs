// Task collection state, commands, and slot synchronization

use crate::error::ValidationError;
use crate::filter::Filter;
use crate::models::{NewTask, Task};
use crate::slot::Slot;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eyre::{Context, Result};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Minimum length of the id prefix shown to users
const SHORT_ID_LEN: usize = 8;

/// The task board: an in-memory collection mirrored into a `Slot`
///
/// Tasks are kept newest first. Every mutating command rewrites the whole
/// collection into the slot; the view filter is never persisted.
pub struct TaskStore<S: Slot> {
    tasks: Vec<Task>,
    filter: Filter,
    slot: S,
}

/// Filtered projection plus counts over the full collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View<'a> {
    pub visible: Vec<&'a Task>,
    pub total_count: usize,
    pub active_count: usize,
    pub completed_count: usize,
}

/// Outcome of looking up a task by id prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Unique(String),
    Ambiguous(usize),
    NotFound,
}

impl<S: Slot> TaskStore<S> {
    /// Hydrate a store from `slot`
    ///
    /// Never fails: an unreadable or malformed slot is logged and the store
    /// starts empty.
    pub fn open(slot: S) -> Self {
        let tasks = load_tasks(&slot);
        Self {
            tasks,
            filter: Filter::default(),
            slot,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Create a task and put it at the front of the collection
    pub fn add(&mut self, input: NewTask) -> Result<Task, ValidationError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let mut id = Uuid::now_v7().to_string();
        while self.get(&id).is_some() {
            id = Uuid::now_v7().to_string();
        }

        let task = Task {
            id,
            title: title.to_string(),
            description: input.description.trim().to_string(),
            priority: input.priority,
            due_date: input.due_date,
            completed: false,
            created_at: Utc::now(),
        };

        debug!(id = %task.id, priority = %task.priority, "add: created task");
        self.tasks.insert(0, task.clone());
        self.persist();

        Ok(task)
    }

    /// Flip `completed` on the matching task; returns false if no task matched
    pub fn toggle(&mut self, id: &str) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!(id, "toggle: no such task");
            return false;
        };

        task.completed = !task.completed;
        debug!(id, completed = task.completed, "toggle: flipped");
        self.persist();
        true
    }

    /// Remove the matching task; returns false if no task matched
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.tasks.iter().position(|t| t.id == id) else {
            debug!(id, "delete: no such task");
            return false;
        };

        self.tasks.remove(index);
        debug!(id, index, "delete: removed");
        self.persist();
        true
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// Visible tasks under the current filter, with fresh counts
    pub fn derive(&self) -> View<'_> {
        let visible = self.tasks.iter().filter(|t| self.filter.matches(t)).collect();
        let completed_count = self.tasks.iter().filter(|t| t.completed).count();

        View {
            visible,
            total_count: self.tasks.len(),
            active_count: self.tasks.len() - completed_count,
            completed_count,
        }
    }

    /// Find the single task whose id starts with `prefix`
    ///
    /// An exact id match always wins, even if it is also a prefix of another id.
    pub fn resolve(&self, prefix: &str) -> Resolved {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Resolved::NotFound;
        }
        if self.get(prefix).is_some() {
            return Resolved::Unique(prefix.to_string());
        }

        let matches: Vec<&Task> = self.tasks.iter().filter(|t| t.id.starts_with(prefix)).collect();
        match matches.as_slice() {
            [] => Resolved::NotFound,
            [task] => Resolved::Unique(task.id.clone()),
            many => Resolved::Ambiguous(many.len()),
        }
    }

    /// Shortest prefix of `id`, at least eight characters, that no other task shares
    ///
    /// UUID v7 ids begin with the creation timestamp, so tasks created close
    /// together need a longer prefix to tell apart. Whatever this returns
    /// resolves back to `id` through `resolve`.
    pub fn short_id<'a>(&self, id: &'a str) -> &'a str {
        let ends = id
            .char_indices()
            .map(|(i, _)| i)
            .skip(SHORT_ID_LEN)
            .chain(std::iter::once(id.len()));

        for end in ends {
            let prefix = &id[..end];
            let sharing = self.tasks.iter().filter(|t| t.id.starts_with(prefix)).count();
            if sharing <= 1 {
                return prefix;
            }
        }
        id
    }

    /// Overwrite the slot with the full collection; failures are logged and dropped
    fn persist(&mut self) {
        let result = encode_tasks(&self.tasks).and_then(|text| self.slot.write(&text));
        if let Err(e) = result {
            warn!(error = ?e, count = self.tasks.len(), "Failed to persist tasks, change kept in memory only");
        }
    }
}

/// A task is overdue when it is open and its due date lies strictly before now
pub fn is_overdue(due_date: Option<NaiveDate>, completed: bool) -> bool {
    is_overdue_at(due_date, completed, Utc::now())
}

/// `is_overdue` against an explicit clock; a due date means midnight UTC of that day
pub fn is_overdue_at(due_date: Option<NaiveDate>, completed: bool, now: DateTime<Utc>) -> bool {
    match due_date {
        Some(due) if !completed => due.and_time(NaiveTime::MIN).and_utc() < now,
        _ => false,
    }
}

/// Serialize a collection as a JSON array
pub fn encode_tasks(tasks: &[Task]) -> Result<String> {
    serde_json::to_string(tasks).context("Failed to serialize tasks")
}

/// Parse a collection previously written by `encode_tasks`
pub fn decode_tasks(text: &str) -> Result<Vec<Task>> {
    serde_json::from_str(text).context("Failed to parse persisted tasks")
}

/// Read and decode the slot, falling back to an empty collection
pub fn load_tasks<S: Slot>(slot: &S) -> Vec<Task> {
    let text = match slot.read() {
        Ok(Some(text)) => text,
        Ok(None) => {
            debug!("No persisted tasks, starting empty");
            return Vec::new();
        }
        Err(e) => {
            warn!(error = ?e, "Failed to read persisted tasks, starting empty");
            return Vec::new();
        }
    };

    if text.trim().is_empty() {
        return Vec::new();
    }

    match decode_tasks(&text) {
        Ok(tasks) => {
            info!(count = tasks.len(), "Loaded persisted tasks");
            tasks
        }
        Err(e) => {
            warn!(error = ?e, "Persisted tasks are malformed, starting empty");
            Vec::new()
        }
    }
}
