// ABOUTME: Activities, the ordered and possibly nested collections of tasks
// ABOUTME: Provides the deterministic traversal yielding each task with its ancestor ids

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::task::Task;

/// An ordered collection of tasks and/or nested sub-activities. Traversed,
/// never mutated, by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    items: Vec<ActivityItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityItem {
    Task(Task),
    Activity(Activity),
}

impl Activity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub fn add_task(&mut self, task: Task) {
        self.items.push(ActivityItem::Task(task));
    }

    pub fn add_activity(&mut self, activity: Activity) {
        self.items.push(ActivityItem::Activity(activity));
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.add_task(task);
        self
    }

    pub fn with_activity(mut self, activity: Activity) -> Self {
        self.add_activity(activity);
        self
    }

    pub fn items(&self) -> &[ActivityItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Walk every task in declaration order, flattening nested
    /// sub-activities. Each task is yielded with its ancestor ids: the tasks
    /// already yielded in strictly enclosing frames when the traversal
    /// descended to this task's activity. Earlier siblings in the same
    /// activity are not ancestors. Re-invoking replays the same sequence.
    pub fn traverse(&self) -> Traversal<'_> {
        Traversal {
            stack: vec![Frame {
                items: self.items.iter(),
                ancestors: Vec::new(),
                seen: Vec::new(),
            }],
        }
    }

    /// Ids of every task in traversal order.
    pub fn task_ids(&self) -> Vec<Uuid> {
        self.traverse().map(|(task, _)| task.id).collect()
    }

    pub fn task_count(&self) -> usize {
        self.traverse().count()
    }
}

impl From<Task> for Activity {
    fn from(task: Task) -> Self {
        Activity::new("activity").with_task(task)
    }
}

impl From<Vec<Task>> for Activity {
    fn from(tasks: Vec<Task>) -> Self {
        let mut activity = Activity::new("activity");
        for task in tasks {
            activity.add_task(task);
        }
        activity
    }
}

/// Read-only, restartable iterator over `(task, ancestor_ids)` pairs.
pub struct Traversal<'a> {
    stack: Vec<Frame<'a>>,
}

struct Frame<'a> {
    items: std::slice::Iter<'a, ActivityItem>,
    ancestors: Vec<Uuid>,
    seen: Vec<Uuid>,
}

impl<'a> Iterator for Traversal<'a> {
    type Item = (&'a Task, Vec<Uuid>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.stack.last_mut()?.items.next();
            match item {
                Some(ActivityItem::Task(task)) => {
                    let frame = self.stack.last_mut()?;
                    let ancestors = frame.ancestors.clone();
                    frame.seen.push(task.id);
                    return Some((task, ancestors));
                }
                Some(ActivityItem::Activity(sub)) => {
                    let ancestors = match self.stack.last() {
                        Some(frame) => {
                            let mut ancestors = frame.ancestors.clone();
                            ancestors.extend(frame.seen.iter().copied());
                            ancestors
                        }
                        None => Vec::new(),
                    };
                    self.stack.push(Frame {
                        items: sub.items.iter(),
                        ancestors,
                        seen: Vec::new(),
                    });
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
