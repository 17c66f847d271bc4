use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A to-do item. The literal text is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(text: impl Into<String>, completed: bool) -> Self {
        Task {
            text: text.into(),
            completed,
        }
    }
}

/// The flat to-do list: source of truth for whether a task exists and
/// whether it is done. Holds at most one task per distinct text; list order
/// is the to-do list's display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
}

impl TaskRegistry {
    /// Build from a loaded list. Later duplicates of a text are dropped and
    /// returned so the caller can report them.
    pub fn from_tasks(tasks: Vec<Task>) -> (Self, Vec<Task>) {
        let mut registry = TaskRegistry::default();
        let mut dropped = Vec::new();
        for task in tasks {
            if registry.contains(&task.text) {
                dropped.push(task);
            } else {
                registry.tasks.push(task);
            }
        }
        (registry, dropped)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.get(text).is_some()
    }

    pub fn get(&self, text: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.text == text)
    }

    pub fn is_completed(&self, text: &str) -> Option<bool> {
        self.get(text).map(|t| t.completed)
    }

    /// Set the completion flag, creating the task at the end of the list if
    /// it does not exist yet. Returns true if anything changed.
    pub fn upsert(&mut self, text: &str, completed: bool) -> bool {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.text == text) {
            let changed = task.completed != completed;
            task.completed = completed;
            return changed;
        }
        self.tasks.push(Task::new(text, completed));
        true
    }

    pub fn remove(&mut self, text: &str) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.text == text)?;
        Some(self.tasks.remove(idx))
    }

    pub fn pending(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.completed)
    }

    pub fn completed(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.completed)
    }
}

impl Serialize for TaskRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.tasks.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TaskRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tasks = Vec::<Task>::deserialize(deserializer)?;
        Ok(TaskRegistry::from_tasks(tasks).0)
    }
}
