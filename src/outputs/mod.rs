// ABOUTME: Output containers holding the named values a task produces
// ABOUTME: Defines fixed-schema and dynamic containers tagged with the owning task's id

pub mod error;

pub use error::{OutputsError, Result};

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::reference::{descend, Reference};

/// Reserved field name for whole-value outputs in dynamic containers.
pub const WILDCARD_FIELD: &str = "value";

/// JSON kind used to type-check fixed-schema output fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Any,
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl FieldKind {
    pub fn of(value: &Value) -> FieldKind {
        match value {
            Value::Null => FieldKind::Null,
            Value::Bool(_) => FieldKind::Bool,
            Value::Number(_) => FieldKind::Number,
            Value::String(_) => FieldKind::String,
            Value::Array(_) => FieldKind::Array,
            Value::Object(_) => FieldKind::Object,
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        *self == FieldKind::Any || *self == FieldKind::of(value)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Any => "any",
            FieldKind::Null => "null",
            FieldKind::Bool => "bool",
            FieldKind::Number => "number",
            FieldKind::String => "string",
            FieldKind::Array => "array",
            FieldKind::Object => "object",
        };
        write!(f, "{}", name)
    }
}

/// Declared output fields for a task, in declaration order. Field names are
/// unique; re-declaring a name replaces its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Schema {
    fields: IndexMap<String, FieldKind>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    /// One-field schema over the wildcard `value` field. Mirrors tasks whose
    /// whole return is a single typed value.
    pub fn single(kind: FieldKind) -> Self {
        Self::new().field(WILDCARD_FIELD, kind)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|name| name.as_str())
    }

    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.fields.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// References other tasks may use to depend on these declared fields.
    pub fn references(&self, owner_id: Uuid) -> Vec<Reference> {
        self.field_names()
            .map(|name| Reference::new(owner_id, name))
            .collect()
    }

    /// Check produced values against the declaration: no unknown fields, no
    /// missing fields, kinds must match.
    pub fn validate(&self, values: &IndexMap<String, Value>) -> Result<()> {
        for name in values.keys() {
            if !self.fields.contains_key(name) {
                return Err(OutputsError::UnknownField { field: name.clone() });
            }
        }
        for (name, kind) in &self.fields {
            match values.get(name) {
                None => {
                    return Err(OutputsError::MissingField { field: name.clone() });
                }
                Some(value) => {
                    if !kind.matches(value) {
                        return Err(OutputsError::KindMismatch {
                            field: name.clone(),
                            expected: *kind,
                            actual: FieldKind::of(value),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Named values produced by one task, tagged with the producing task's id so
/// references against its fields resolve unambiguously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Outputs {
    /// Closed record: fields and kinds known at declaration time.
    Fixed {
        owner_id: Uuid,
        schema: Schema,
        values: IndexMap<String, Value>,
    },
    /// Open mapping: arbitrary named values assigned at run time, with the
    /// reserved `value` slot for whole-value outputs.
    Dynamic {
        owner_id: Uuid,
        values: IndexMap<String, Value>,
    },
}

impl Outputs {
    pub fn fixed(owner_id: Uuid, schema: Schema, values: IndexMap<String, Value>) -> Result<Self> {
        schema.validate(&values)?;
        Ok(Outputs::Fixed {
            owner_id,
            schema,
            values,
        })
    }

    pub fn dynamic(owner_id: Uuid) -> Self {
        Outputs::Dynamic {
            owner_id,
            values: IndexMap::new(),
        }
    }

    /// Dynamic container holding one whole value under the wildcard field.
    pub fn wildcard(owner_id: Uuid, value: Value) -> Self {
        let mut values = IndexMap::new();
        values.insert(WILDCARD_FIELD.to_string(), value);
        Outputs::Dynamic { owner_id, values }
    }

    /// Classify a plain produced value into a container. Objects become named
    /// fields (validated when a schema is declared); anything else fills the
    /// wildcard slot, or the schema's only field when exactly one is declared.
    pub fn from_value(owner_id: Uuid, value: Value, schema: Option<&Schema>) -> Result<Self> {
        match schema {
            Some(schema) => match value {
                Value::Object(map) => {
                    let values = map.into_iter().collect();
                    Outputs::fixed(owner_id, schema.clone(), values)
                }
                other if schema.len() == 1 => {
                    let mut values = IndexMap::new();
                    if let Some(name) = schema.field_names().next() {
                        values.insert(name.to_string(), other);
                    }
                    Outputs::fixed(owner_id, schema.clone(), values)
                }
                other => Err(OutputsError::ExpectedObject {
                    fields: schema.len(),
                    actual: FieldKind::of(&other),
                }),
            },
            None => Ok(match value {
                Value::Object(map) => Outputs::Dynamic {
                    owner_id,
                    values: map.into_iter().collect(),
                },
                other => Outputs::wildcard(owner_id, other),
            }),
        }
    }

    pub fn owner_id(&self) -> Uuid {
        match self {
            Outputs::Fixed { owner_id, .. } | Outputs::Dynamic { owner_id, .. } => *owner_id,
        }
    }

    pub fn set_owner(&mut self, id: Uuid) {
        match self {
            Outputs::Fixed { owner_id, .. } | Outputs::Dynamic { owner_id, .. } => *owner_id = id,
        }
    }

    pub fn schema(&self) -> Option<&Schema> {
        match self {
            Outputs::Fixed { schema, .. } => Some(schema),
            Outputs::Dynamic { .. } => None,
        }
    }

    pub fn values(&self) -> &IndexMap<String, Value> {
        match self {
            Outputs::Fixed { values, .. } | Outputs::Dynamic { values, .. } => values,
        }
    }

    /// Look up a field by name or dotted path into its value.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let (field, rest) = match path.split_once('.') {
            Some((field, rest)) => (field, Some(rest)),
            None => (path, None),
        };
        descend(self.values().get(field)?, rest)
    }

    /// Assign a field. Fixed containers only accept declared fields with a
    /// matching kind; dynamic containers accept anything (last write wins).
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Result<()> {
        let name = name.into();
        match self {
            Outputs::Fixed { schema, values, .. } => match schema.kind_of(&name) {
                None => Err(OutputsError::UnknownField { field: name }),
                Some(kind) if !kind.matches(&value) => Err(OutputsError::KindMismatch {
                    field: name,
                    expected: kind,
                    actual: FieldKind::of(&value),
                }),
                Some(_) => {
                    values.insert(name, value);
                    Ok(())
                }
            },
            Outputs::Dynamic { values, .. } => {
                values.insert(name, value);
                Ok(())
            }
        }
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.values().keys().map(|name| name.as_str()).collect()
    }

    /// One reference per populated field.
    pub fn references(&self) -> Vec<Reference> {
        let owner_id = self.owner_id();
        self.values()
            .keys()
            .map(|name| Reference::new(owner_id, name))
            .collect()
    }

    /// Consume the container into its field map for the run cache or store.
    pub fn into_fields(self) -> IndexMap<String, Value> {
        match self {
            Outputs::Fixed { values, .. } | Outputs::Dynamic { values, .. } => values,
        }
    }
}
