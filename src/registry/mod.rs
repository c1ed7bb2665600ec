// ABOUTME: Function registry resolving qualified names to executable callables
// ABOUTME: Tasks carry a (module, name) pair; the registry maps it to a boxed function at run time

pub mod error;

pub use error::{RegistryError, Result};

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response::TaskReturn;

/// Stable qualified name of a task's callable. A plain (module, name) pair
/// rather than a function pointer, so tasks can be persisted or sent to
/// another process and still resolve to code there.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionRef {
    pub module: String,
    pub name: String,
}

impl FunctionRef {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}

/// Signature every registered task function satisfies: resolved positional
/// and keyword arguments in, a classifiable return value out.
pub type TaskFn = dyn Fn(&[Value], &IndexMap<String, Value>) -> anyhow::Result<TaskReturn> + Send + Sync;

/// Lookup table from qualified names to callables, populated by the caller
/// before a run.
#[derive(Default)]
pub struct FunctionRegistry {
    functions: HashMap<FunctionRef, Box<TaskFn>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, module: &str, name: &str, function: F)
    where
        F: Fn(&[Value], &IndexMap<String, Value>) -> anyhow::Result<TaskReturn>
            + Send
            + Sync
            + 'static,
    {
        self.functions
            .insert(FunctionRef::new(module, name), Box::new(function));
    }

    pub fn lookup(&self, function: &FunctionRef) -> Result<&TaskFn> {
        self.functions
            .get(function)
            .map(|f| f.as_ref())
            .ok_or_else(|| RegistryError::UnknownFunction {
                function: function.clone(),
            })
    }

    pub fn contains(&self, function: &FunctionRef) -> bool {
        self.functions.contains_key(function)
    }

    pub fn registered(&self) -> Vec<&FunctionRef> {
        self.functions.keys().collect()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}
