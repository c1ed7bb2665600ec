// ABOUTME: Task return markers and the classified Response consumed by the orchestrator
// ABOUTME: Implements the one-candidate-per-category classification with detour precedence

pub mod error;

pub use error::{ResponseError, Result};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::activity::Activity;
use crate::outputs::{Outputs, Schema};

/// One signal inside a task's raw return value.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnItem {
    /// Plain produced data, classified into an output container.
    Data(Value),
    /// An explicit output container, passed through (retagged to the
    /// running task).
    Outputs(Outputs),
    /// Opaque payload for the external store.
    Store(Value),
    /// Escalating cancellation signals.
    Stop {
        tasks: bool,
        children: bool,
        activities: bool,
    },
    /// Replace the current unit of work's continuation.
    Restart(Activity),
    /// Extend the current branch before the outer traversal resumes.
    Detour(Activity),
    /// Unconditional extra work appended after restart and detour.
    Addition(Activity),
}

/// A task function's raw return: nothing, one signal, or several
/// simultaneous signals.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TaskReturn {
    #[default]
    None,
    Single(ReturnItem),
    Many(Vec<ReturnItem>),
}

impl TaskReturn {
    /// Shorthand for returning plain data.
    pub fn data(value: Value) -> Self {
        TaskReturn::Single(ReturnItem::Data(value))
    }

    fn into_items(self) -> Vec<ReturnItem> {
        match self {
            TaskReturn::None => Vec::new(),
            TaskReturn::Single(item) => vec![item],
            TaskReturn::Many(items) => items,
        }
    }
}

impl From<ReturnItem> for TaskReturn {
    fn from(item: ReturnItem) -> Self {
        TaskReturn::Single(item)
    }
}

impl From<Vec<ReturnItem>> for TaskReturn {
    fn from(items: Vec<ReturnItem>) -> Self {
        TaskReturn::Many(items)
    }
}

/// The classified outcome of running one task. Constructed exactly once per
/// execution, consumed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    pub outputs: Option<Outputs>,
    pub stored_data: Option<Value>,
    pub stop_tasks: bool,
    pub stop_children: bool,
    pub stop_activities: bool,
    pub restart: Option<Activity>,
    pub detour: Option<Activity>,
    pub addition: Option<Activity>,
}

impl Response {
    /// Classify a task's raw return value. Each item lands in its category;
    /// a second item of the same category is a malformed return. Plain
    /// object data becomes a dynamic container (or is validated against the
    /// declared schema), any other plain data fills the wildcard field. A
    /// detour suppresses plain outputs from the same return.
    pub fn from_task_return(
        task_return: TaskReturn,
        owner_id: Uuid,
        schema: Option<&Schema>,
    ) -> Result<Response> {
        let mut response = Response::default();
        let mut stop_seen = false;

        for item in task_return.into_items() {
            match item {
                ReturnItem::Data(value) => {
                    if response.outputs.is_some() {
                        return Err(ResponseError::DuplicateCategory {
                            category: "outputs",
                        });
                    }
                    response.outputs = Some(Outputs::from_value(owner_id, value, schema)?);
                }
                ReturnItem::Outputs(mut outputs) => {
                    if response.outputs.is_some() {
                        return Err(ResponseError::DuplicateCategory {
                            category: "outputs",
                        });
                    }
                    outputs.set_owner(owner_id);
                    if let Some(schema) = schema {
                        schema.validate(outputs.values())?;
                    }
                    response.outputs = Some(outputs);
                }
                ReturnItem::Store(data) => {
                    if response.stored_data.is_some() {
                        return Err(ResponseError::DuplicateCategory { category: "store" });
                    }
                    response.stored_data = Some(data);
                }
                ReturnItem::Stop {
                    tasks,
                    children,
                    activities,
                } => {
                    if stop_seen {
                        return Err(ResponseError::DuplicateCategory { category: "stop" });
                    }
                    stop_seen = true;
                    response.stop_tasks = tasks;
                    response.stop_children = children;
                    response.stop_activities = activities;
                }
                ReturnItem::Restart(activity) => {
                    if response.restart.is_some() {
                        return Err(ResponseError::DuplicateCategory {
                            category: "restart",
                        });
                    }
                    response.restart = Some(activity);
                }
                ReturnItem::Detour(activity) => {
                    if response.detour.is_some() {
                        return Err(ResponseError::DuplicateCategory { category: "detour" });
                    }
                    response.detour = Some(activity);
                }
                ReturnItem::Addition(activity) => {
                    if response.addition.is_some() {
                        return Err(ResponseError::DuplicateCategory {
                            category: "addition",
                        });
                    }
                    response.addition = Some(activity);
                }
            }
        }

        // detour precedence: stored data and stop flags are unaffected
        if response.detour.is_some() {
            response.outputs = None;
        }

        Ok(response)
    }
}
