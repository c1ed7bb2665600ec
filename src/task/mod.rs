// ABOUTME: The task model, a unit of work bound to a callable, arguments, and an output schema
// ABOUTME: Implements reference enumeration, input resolution, and execution into a Response

pub mod builder;
pub mod error;

pub use builder::TaskBuilder;
pub use error::{Result, TaskError};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::outputs::{Schema, WILDCARD_FIELD};
use crate::reference::{
    find_references, resolve_value, MissingPolicy, OutputCache, Reference,
};
use crate::registry::{FunctionRef, FunctionRegistry};
use crate::response::Response;
use crate::store::OutputStore;

/// Per-task execution configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TaskConfig {
    /// Error policy applied when an input reference cannot be resolved.
    #[serde(default)]
    pub on_missing: MissingPolicy,
}

/// A unit of work: a qualified function name, arguments which may embed
/// references to other tasks' outputs at any depth, and an optional output
/// schema (`None` means dynamic outputs).
///
/// The unique id is assigned at construction and stable for the task's
/// lifetime; responses produced by `run` stamp it into their output
/// container so later lookups tie outputs back to this task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub function: FunctionRef,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: IndexMap<String, Value>,
    #[serde(default)]
    pub schema: Option<Schema>,
    #[serde(default)]
    pub config: TaskConfig,
}

impl Task {
    pub fn new(name: impl Into<String>, function: FunctionRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            function,
            args: Vec::new(),
            kwargs: IndexMap::new(),
            schema: None,
            config: TaskConfig::default(),
        }
    }

    pub fn arg(mut self, value: Value) -> Self {
        self.args.push(value);
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: Value) -> Self {
        self.kwargs.insert(name.into(), value);
        self
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn on_missing(mut self, policy: MissingPolicy) -> Self {
        self.config.on_missing = policy;
        self
    }

    /// Every distinct reference reachable in the task's arguments, in
    /// discovery order. Each call replays the same sequence.
    pub fn input_references(&self) -> Vec<Reference> {
        let mut found = IndexSet::new();
        for value in self.args.iter().chain(self.kwargs.values()) {
            found.extend(find_references(value));
        }
        found.into_iter().collect()
    }

    /// References other tasks may use to depend on this task's outputs:
    /// one per declared schema field, or the single wildcard reference when
    /// the schema is dynamic.
    pub fn output_references(&self) -> Vec<Reference> {
        match &self.schema {
            Some(schema) => schema.references(self.id),
            None => vec![Reference::new(self.id, WILDCARD_FIELD)],
        }
    }

    /// Resolve every reference in the arguments in place, consulting the
    /// cache first and the store second.
    pub fn resolve_inputs(
        &mut self,
        cache: Option<&OutputCache>,
        store: Option<&dyn OutputStore>,
        on_missing: MissingPolicy,
    ) -> std::result::Result<(), crate::reference::ReferenceError> {
        for value in self.args.iter_mut().chain(self.kwargs.values_mut()) {
            resolve_value(value, cache, store, on_missing)?;
        }
        Ok(())
    }

    /// Resolving counterpart to `resolve_inputs` that leaves the receiver
    /// untouched and returns an independent resolved copy.
    pub fn resolved(
        &self,
        cache: Option<&OutputCache>,
        store: Option<&dyn OutputStore>,
        on_missing: MissingPolicy,
    ) -> std::result::Result<Task, crate::reference::ReferenceError> {
        let mut copy = self.clone();
        copy.resolve_inputs(cache, store, on_missing)?;
        Ok(copy)
    }

    /// Resolve inputs, invoke the referenced function, and classify its
    /// return value. The receiver is not mutated. A failure inside the
    /// function surfaces as `TaskError::ExecutionFailed` rather than
    /// propagating; a malformed return is `TaskError::MalformedReturn` and
    /// is the caller's signal to abort the run.
    pub fn run(
        &self,
        registry: &FunctionRegistry,
        cache: Option<&OutputCache>,
        store: Option<&dyn OutputStore>,
    ) -> Result<Response> {
        debug!(task = %self.name, function = %self.function, "running task");

        let resolved = self.resolved(cache, store, self.config.on_missing)?;
        let function = registry.lookup(&self.function)?;

        let task_return =
            function(&resolved.args, &resolved.kwargs).map_err(|source| {
                TaskError::ExecutionFailed {
                    task: self.name.clone(),
                    source,
                }
            })?;

        let response = Response::from_task_return(task_return, self.id, self.schema.as_ref())?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::FieldKind;
    use crate::response::TaskReturn;
    use serde_json::json;

    fn number_schema() -> Schema {
        Schema::single(FieldKind::Number)
    }

    fn add_registry() -> FunctionRegistry {
        let mut registry = FunctionRegistry::new();
        registry.register("math", "add", |args, kwargs| {
            let a = args.first().and_then(|v| v.as_i64()).unwrap_or(0);
            let b = kwargs.get("b").and_then(|v| v.as_i64()).unwrap_or(5);
            Ok(TaskReturn::data(json!(a + b)))
        });
        registry
    }

    #[test]
    fn test_task_init() {
        let task = Task::new("add", FunctionRef::new("math", "add"))
            .arg(json!(1))
            .kwarg("b", json!(2))
            .with_schema(number_schema());

        assert_eq!(task.function, FunctionRef::new("math", "add"));
        assert_eq!(task.args, vec![json!(1)]);
        assert_eq!(task.kwargs.get("b"), Some(&json!(2)));
        assert_eq!(task.config.on_missing, MissingPolicy::Error);
        assert!(task.schema.is_some());
    }

    #[test]
    fn test_input_references_deduplicated() {
        let reference = Reference::new(Uuid::new_v4(), "value");
        let other = Reference::new(Uuid::new_v4(), "count");

        let task = Task::new("add", FunctionRef::new("math", "add"))
            .arg(json!([reference.to_value(), {"nested": other.to_value()}]))
            .kwarg("b", reference.to_value());

        assert_eq!(task.input_references(), vec![reference, other]);
    }

    #[test]
    fn test_output_references_follow_schema_or_wildcard() {
        let task = Task::new("add", FunctionRef::new("math", "add")).with_schema(
            Schema::new()
                .field("total", FieldKind::Number)
                .field("label", FieldKind::String),
        );
        assert_eq!(
            task.output_references(),
            vec![
                Reference::new(task.id, "total"),
                Reference::new(task.id, "label"),
            ]
        );

        let dynamic = Task::new("print", FunctionRef::new("io", "print"));
        assert_eq!(
            dynamic.output_references(),
            vec![Reference::new(dynamic.id, WILDCARD_FIELD)]
        );
    }

    #[test]
    fn test_resolve_inputs_in_place() {
        let reference = Reference::new(Uuid::new_v4(), "value");
        let mut cache = OutputCache::new();
        let mut fields = IndexMap::new();
        fields.insert("value".to_string(), json!(2));
        cache.insert(reference.owner_id, fields);

        let mut task = Task::new("add", FunctionRef::new("math", "add"))
            .arg(json!(1))
            .kwarg("b", reference.to_value());
        task.resolve_inputs(Some(&cache), None, MissingPolicy::Error)
            .unwrap();

        assert_eq!(task.kwargs.get("b"), Some(&json!(2)));
        assert_eq!(task.args, vec![json!(1)]);
    }

    #[test]
    fn test_resolved_copy_leaves_original_untouched() {
        let reference = Reference::new(Uuid::new_v4(), "value");
        let mut cache = OutputCache::new();
        let mut fields = IndexMap::new();
        fields.insert("value".to_string(), json!(2));
        cache.insert(reference.owner_id, fields);

        let task = Task::new("add", FunctionRef::new("math", "add"))
            .kwarg("b", reference.to_value());
        let resolved = task
            .resolved(Some(&cache), None, MissingPolicy::Error)
            .unwrap();

        assert_eq!(resolved.kwargs.get("b"), Some(&json!(2)));
        assert_eq!(task.kwargs.get("b"), Some(&reference.to_value()));
        assert_eq!(resolved.id, task.id);
    }

    #[test]
    fn test_resolve_missing_keep_policy_leaves_reference() {
        let reference = Reference::new(Uuid::new_v4(), "value");
        let mut task = Task::new("add", FunctionRef::new("math", "add"))
            .kwarg("b", reference.to_value());

        task.resolve_inputs(None, None, MissingPolicy::Keep).unwrap();
        assert_eq!(task.kwargs.get("b"), Some(&reference.to_value()));

        let err = task
            .resolve_inputs(None, None, MissingPolicy::Error)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::reference::ReferenceError::Missing { .. }
        ));
    }

    #[test]
    fn test_run_produces_schema_checked_outputs() {
        let registry = add_registry();
        let task = Task::new("add", FunctionRef::new("math", "add"))
            .arg(json!(1))
            .kwarg("b", json!(2))
            .with_schema(number_schema());

        let response = task.run(&registry, None, None).unwrap();
        let outputs = response.outputs.unwrap();
        assert_eq!(outputs.owner_id(), task.id);
        assert_eq!(outputs.get(WILDCARD_FIELD), Some(&json!(3)));
    }

    #[test]
    fn test_run_resolves_references_from_cache() {
        let registry = add_registry();
        let reference = Reference::new(Uuid::new_v4(), "value");

        let mut cache = OutputCache::new();
        let mut fields = IndexMap::new();
        fields.insert("value".to_string(), json!(2));
        cache.insert(reference.owner_id, fields);

        let task = Task::new("add", FunctionRef::new("math", "add"))
            .arg(json!(1))
            .kwarg("b", reference.to_value())
            .with_schema(number_schema());

        let response = task.run(&registry, Some(&cache), None).unwrap();
        assert_eq!(
            response.outputs.unwrap().get(WILDCARD_FIELD),
            Some(&json!(3))
        );
        // the receiver still holds the unresolved reference
        assert_eq!(task.kwargs.get("b"), Some(&reference.to_value()));
    }

    #[test]
    fn test_run_reports_function_failure_without_propagating() {
        let mut registry = FunctionRegistry::new();
        registry.register("tests", "explode", |_args, _kwargs| {
            Err(anyhow::anyhow!("boom"))
        });

        let task = Task::new("explode", FunctionRef::new("tests", "explode"));
        let err = task.run(&registry, None, None).unwrap_err();
        assert!(matches!(err, TaskError::ExecutionFailed { .. }));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_run_unknown_function_is_an_error() {
        let registry = FunctionRegistry::new();
        let task = Task::new("nope", FunctionRef::new("missing", "nope"));
        let err = task.run(&registry, None, None).unwrap_err();
        assert!(matches!(err, TaskError::Registry(_)));
    }
}
