// SPDX-License-Identifier: MIT

use serde_json::{Map, Value};

/// Trait for anything a workflow node can wrap.
///
/// Implementations describe an external command-line tool (or a plain
/// pass-through) without running it. The executing engine reads the
/// declared fields and parameters and does the actual work.
pub trait Interface: Send + Sync + std::fmt::Debug {
    /// Interface name, e.g. `N4BiasFieldCorrection`
    fn name(&self) -> &str;

    /// Fields that may receive values or connections
    fn input_fields(&self) -> &[String];

    /// Fields other nodes may connect from
    fn output_fields(&self) -> &[String];

    /// Fixed tool parameters, as an object
    fn parameters(&self) -> Value {
        Value::Object(Map::new())
    }

    /// Command line for the given input values, if this wraps a tool
    fn command_line(&self, _inputs: &Map<String, Value>) -> Option<Vec<String>> {
        None
    }

    fn has_input(&self, field: &str) -> bool {
        self.input_fields().iter().any(|f| f == field)
    }

    fn has_output(&self, field: &str) -> bool {
        self.output_fields().iter().any(|f| f == field)
    }
}

/// A typed record whose field names define an identity node's shape
pub trait FieldRecord {
    fn field_names() -> &'static [&'static str];
}

/// Pass-through interface: every declared field is both input and output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityInterface {
    fields: Vec<String>,
}

impl IdentityInterface {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from the field names of a typed record
    pub fn from_record<R: FieldRecord>() -> Self {
        Self::new(R::field_names().iter().copied())
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl Interface for IdentityInterface {
    fn name(&self) -> &str {
        "IdentityInterface"
    }

    fn input_fields(&self) -> &[String] {
        &self.fields
    }

    fn output_fields(&self) -> &[String] {
        &self.fields
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "fields": self.fields })
    }
}
