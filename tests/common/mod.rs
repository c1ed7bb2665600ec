// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides a shared function registry and task constructors

#![allow(dead_code)]

use serde_json::{json, Value};

use switchyard::{
    FieldKind, FunctionRef, FunctionRegistry, Reference, Schema, Task, TaskReturn,
};

/// Registry with the arithmetic and failure functions the suites share.
/// Tests register any extra control-signal functions they need on top.
pub fn base_registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();

    registry.register("math", "add", |args, kwargs| {
        let a = args.first().and_then(Value::as_i64).unwrap_or(0);
        let b = kwargs.get("b").and_then(Value::as_i64).unwrap_or(5);
        Ok(TaskReturn::data(json!(a + b)))
    });

    registry.register("io", "print", |args, _kwargs| {
        for arg in args {
            println!("{}", arg);
        }
        Ok(TaskReturn::None)
    });

    registry.register("tests", "fail", |_args, _kwargs| {
        Err(anyhow::anyhow!("exploded on purpose"))
    });

    registry
}

/// Task computing `a + b` with a single-field numeric schema.
pub fn add_task(name: &str, a: Value, b: Value) -> Task {
    Task::new(name, FunctionRef::new("math", "add"))
        .arg(a)
        .kwarg("b", b)
        .with_schema(Schema::single(FieldKind::Number))
}

/// Task that always fails during execution.
pub fn fail_task(name: &str) -> Task {
    Task::new(name, FunctionRef::new("tests", "fail"))
}

/// Sentinel value referencing another task's wildcard output.
pub fn output_ref(task: &Task) -> Value {
    Reference::new(task.id, "value").to_value()
}
