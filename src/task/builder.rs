// ABOUTME: Factory for stamping out tasks bound to one callable
// ABOUTME: The builder is the decorator-style surface: configure once, build tasks per invocation

use indexmap::IndexMap;
use serde_json::Value;

use super::{Task, TaskConfig};
use crate::outputs::Schema;
use crate::reference::MissingPolicy;
use crate::registry::FunctionRef;

/// Holds a function reference plus shared configuration; each `build` mints
/// a fresh task with its own unique id.
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    function: FunctionRef,
    name: String,
    schema: Option<Schema>,
    config: TaskConfig,
}

impl TaskBuilder {
    pub fn new(function: FunctionRef) -> Self {
        let name = function.name.clone();
        Self {
            function,
            name,
            schema: None,
            config: TaskConfig::default(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
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

    /// Create a task for one concrete invocation.
    pub fn build(&self, args: Vec<Value>, kwargs: IndexMap<String, Value>) -> Task {
        let mut task = Task::new(&self.name, self.function.clone());
        task.args = args;
        task.kwargs = kwargs;
        task.schema = self.schema.clone();
        task.config = self.config;
        task
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::{FieldKind, WILDCARD_FIELD};
    use serde_json::json;

    #[test]
    fn test_builder_stamps_fresh_ids() {
        let builder = TaskBuilder::new(FunctionRef::new("math", "add"))
            .with_schema(Schema::single(FieldKind::Number));

        let mut kwargs = IndexMap::new();
        kwargs.insert("b".to_string(), json!(2));

        let first = builder.build(vec![json!(1)], kwargs.clone());
        let second = builder.build(vec![json!(3)], kwargs);

        assert_ne!(first.id, second.id);
        assert_eq!(first.function, second.function);
        assert_eq!(first.name, "add");
        assert_eq!(first.args, vec![json!(1)]);
        assert_eq!(second.args, vec![json!(3)]);
        assert_eq!(
            first.output_references(),
            vec![crate::reference::Reference::new(first.id, WILDCARD_FIELD)]
        );
    }

    #[test]
    fn test_builder_carries_config() {
        let builder = TaskBuilder::new(FunctionRef::new("io", "print"))
            .named("announce")
            .on_missing(MissingPolicy::Keep);

        let task = builder.build(vec![json!("hello")], IndexMap::new());
        assert_eq!(task.name, "announce");
        assert_eq!(task.config.on_missing, MissingPolicy::Keep);
        assert!(task.schema.is_none());
    }
}
