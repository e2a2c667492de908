// SPDX-License-Identifier: MIT

//! Scalar-or-sequence values
//!
//! Inputs such as `in_file` may be given as a single path or as a list of
//! paths. `OneOrMany` keeps that distinction at the configuration boundary
//! and normalizes it into an ordered `Vec`; `as_list` is the same rule for
//! untyped values flowing across a connection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Either a single value or an ordered list of values
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A single scalar
    One(T),
    /// An already ordered sequence
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Normalize into a vector, consuming self
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(v) => v,
        }
    }

    /// Number of elements after normalization
    pub fn len(&self) -> usize {
        match self {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First element, if any
    pub fn first(&self) -> Option<&T> {
        match self {
            OneOrMany::One(v) => Some(v),
            OneOrMany::Many(v) => v.first(),
        }
    }
}

impl<T: Clone> OneOrMany<T> {
    /// Normalize into a vector without consuming self
    pub fn to_vec(&self) -> Vec<T> {
        self.clone().into_vec()
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(value: T) -> Self {
        OneOrMany::One(value)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(values: Vec<T>) -> Self {
        OneOrMany::Many(values)
    }
}

/// Wrap a text scalar into a one-element list; pass anything else through.
pub fn as_list(value: Value) -> Value {
    match value {
        Value::String(s) => Value::Array(vec![Value::String(s)]),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn test_as_list_wraps_string() {
        assert_eq!(as_list(json!("sub-01_T1w.nii.gz")), json!(["sub-01_T1w.nii.gz"]));
    }

    #[test]
    fn test_as_list_passes_sequence_through() {
        let seq = json!(["a.nii.gz", "b.nii.gz"]);
        assert_eq!(as_list(seq.clone()), seq);
    }

    #[test]
    fn test_as_list_passes_non_sequence_through() {
        assert_eq!(as_list(json!(3)), json!(3));
        assert_eq!(as_list(Value::Null), Value::Null);
    }

    #[test]
    fn test_as_list_empty_string_still_wrapped() {
        assert_eq!(as_list(json!("")), json!([""]));
    }

    #[test]
    fn test_one_or_many_into_vec() {
        let one: OneOrMany<String> = "t1.nii".to_string().into();
        assert_eq!(one.into_vec(), vec!["t1.nii".to_string()]);

        let many: OneOrMany<u8> = vec![1, 2, 3].into();
        assert_eq!(many.len(), 3);
        assert_eq!(many.first(), Some(&1));
        assert_eq!(many.into_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_one_or_many_empty() {
        let many: OneOrMany<u8> = OneOrMany::Many(vec![]);
        assert!(many.is_empty());
        assert_eq!(many.first(), None);
    }

    #[test]
    fn test_one_or_many_deserialize_scalar() {
        let v: OneOrMany<PathBuf> = serde_yaml::from_str("sub-01_T1w.nii.gz").unwrap();
        assert_eq!(v.to_vec(), vec![PathBuf::from("sub-01_T1w.nii.gz")]);
    }

    #[test]
    fn test_one_or_many_deserialize_list() {
        let yaml = r#"
            - sub-01_T1w.nii.gz
            - sub-01_T2w.nii.gz
        "#;
        let v: OneOrMany<PathBuf> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v.first(), Some(&PathBuf::from("sub-01_T1w.nii.gz")));
    }

    #[test]
    fn test_one_or_many_serializes_untagged() {
        let v = OneOrMany::One("x".to_string());
        assert_eq!(serde_json::to_value(&v).unwrap(), json!("x"));
        let v = OneOrMany::Many(vec!["x".to_string()]);
        assert_eq!(serde_json::to_value(&v).unwrap(), json!(["x"]));
    }
}
