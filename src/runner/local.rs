// ABOUTME: Local sequential orchestrator walking an activity's traversal
// ABOUTME: Resolves inputs, runs tasks, applies response semantics, and tracks skip/fizzle state

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use super::error::{Result, RunError};
use crate::activity::Activity;
use crate::reference::{MissingPolicy, OutputCache};
use crate::registry::FunctionRegistry;
use crate::response::Response;
use crate::store::{MemoryStore, OutputStore};
use crate::task::{Task, TaskError};

/// Response map keyed by task unique id, in execution order. Contains
/// entries only for tasks that actually executed.
pub type ResponseMap = IndexMap<Uuid, Response>;

/// Diagnostic record for a task that fizzled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    pub task_id: Uuid,
    pub task_name: String,
    pub error: String,
    pub at: DateTime<Utc>,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub responses: ResponseMap,
    pub failures: Vec<FailureRecord>,
}

impl RunReport {
    /// Ids declared in `activity` that have no response entry, i.e. tasks
    /// that fizzled or were skipped.
    pub fn skipped(&self, activity: &Activity) -> Vec<Uuid> {
        activity
            .task_ids()
            .into_iter()
            .filter(|id| !self.responses.contains_key(id))
            .collect()
    }
}

/// Single-threaded, strictly sequential orchestrator. All run state lives on
/// this instance and is mutated only by its run loop; one runner drives one
/// run.
pub struct LocalRunner<'a, S: OutputStore = MemoryStore> {
    registry: &'a FunctionRegistry,
    store: S,
    output_cache: OutputCache,
    stopped_parents: HashSet<Uuid>,
    fizzled: HashSet<Uuid>,
    halt: bool,
    responses: ResponseMap,
    failures: Vec<FailureRecord>,
}

impl<'a> LocalRunner<'a, MemoryStore> {
    /// Runner backed by a fresh in-memory store.
    pub fn new(registry: &'a FunctionRegistry) -> Self {
        Self::with_store(registry, MemoryStore::new())
    }
}

impl<'a, S: OutputStore> LocalRunner<'a, S> {
    pub fn with_store(registry: &'a FunctionRegistry, store: S) -> Self {
        Self {
            registry,
            store,
            output_cache: OutputCache::new(),
            stopped_parents: HashSet::new(),
            fizzled: HashSet::new(),
            halt: false,
            responses: ResponseMap::new(),
            failures: Vec::new(),
        }
    }

    /// Execute the activity to completion and report every response keyed by
    /// task id. Only a malformed task return or a store write failure aborts
    /// the run.
    pub fn run(mut self, activity: impl Into<Activity>) -> Result<RunReport> {
        let activity = activity.into();
        info!(activity = %activity.name, "started executing tasks locally");
        self.run_activity(&activity)?;
        info!(
            executed = self.responses.len(),
            fizzled = self.fizzled.len(),
            "finished executing tasks locally"
        );
        Ok(RunReport {
            responses: self.responses,
            failures: self.failures,
        })
    }

    fn run_activity(&mut self, activity: &Activity) -> Result<()> {
        for (task, ancestors) in activity.traverse() {
            if self.halt {
                break;
            }
            self.run_task(task, &ancestors)?;
        }
        Ok(())
    }

    fn run_task(&mut self, task: &Task, ancestors: &[Uuid]) -> Result<()> {
        if ancestors.iter().any(|id| self.stopped_parents.contains(id)) {
            info!(task = %task.name, "skipping, an ancestor stopped its children");
            self.stopped_parents.insert(task.id);
            return Ok(());
        }

        if ancestors.iter().any(|id| self.fizzled.contains(id))
            && task.config.on_missing == MissingPolicy::Error
        {
            // inputs are unresolvable in principle; the ancestor produced no outputs
            info!(task = %task.name, "skipping, an ancestor fizzled");
            self.fizzled.insert(task.id);
            return Ok(());
        }

        let response = match task.run(
            self.registry,
            Some(&self.output_cache),
            Some(&self.store as &dyn OutputStore),
        ) {
            Ok(response) => response,
            Err(TaskError::MalformedReturn(source)) => {
                return Err(RunError::Malformed(source));
            }
            Err(err) => {
                warn!(task = %task.name, error = %err, "task fizzled");
                self.fizzled.insert(task.id);
                self.failures.push(FailureRecord {
                    task_id: task.id,
                    task_name: task.name.clone(),
                    error: err.to_string(),
                    at: Utc::now(),
                });
                return Ok(());
            }
        };

        if let Some(outputs) = &response.outputs {
            self.output_cache
                .insert(task.id, outputs.clone().into_fields());
        }

        if let Some(data) = &response.stored_data {
            self.store.put(task.id, stored_fields(data))?;
        }

        let stop_children = response.stop_children;
        let stop_activities = response.stop_activities;
        let restart = response.restart.clone();
        let detour = response.detour.clone();
        let addition = response.addition.clone();
        self.responses.insert(task.id, response);

        if stop_children {
            self.stopped_parents.insert(task.id);
        }

        if stop_activities {
            info!(task = %task.name, "stop signal received, halting all activities");
            self.halt = true;
            return Ok(());
        }

        // fixed splice order: restart, then detour, then addition
        if let Some(restart) = restart {
            info!(task = %task.name, activity = %restart.name, "running restart activity");
            self.run_activity(&restart)?;
        }
        if let Some(detour) = detour {
            if !self.halt {
                info!(task = %task.name, activity = %detour.name, "running detour activity");
                self.run_activity(&detour)?;
            }
        }
        if let Some(addition) = addition {
            if !self.halt {
                info!(task = %task.name, activity = %addition.name, "running addition activity");
                self.run_activity(&addition)?;
            }
        }

        Ok(())
    }
}

/// Run a task, a flat list of tasks, or an activity with the default
/// in-memory store, returning the unique-id-keyed response map.
pub fn run_locally(
    activity: impl Into<Activity>,
    registry: &FunctionRegistry,
) -> Result<RunReport> {
    LocalRunner::new(registry).run(activity)
}

/// Shape the opaque stored payload into store fields: objects keep their
/// keys, anything else lands under a single `data` field.
fn stored_fields(data: &Value) -> IndexMap<String, Value> {
    match data {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        other => {
            let mut fields = IndexMap::new();
            fields.insert("data".to_string(), other.clone());
            fields
        }
    }
}
