//! Flattens nested [`serde_json::Value`]s into maps keyed by delimiter-joined paths and
//! expands such maps back into nested values.
//!
//! ```
//! use serde_dotted::{expand, flatten};
//! use serde_json::json;
//!
//! let nested = json!({"users": [{"name": "John"}], "active": true});
//! let flat = flatten(nested.clone());
//! assert_eq!(flat["users.[0].name"], json!("John"));
//! assert_eq!(expand(flat), nested);
//! ```
pub mod flat_value;
pub mod nested_csv;
pub mod options;
pub mod record;
pub mod typed;

pub use {
    flat_value::{
        FieldPath, Segment,
        expand::{expand, expand_with},
        flatten::{flatten, flatten_with},
    },
    options::{ExpandOptions, FlattenOptions, KeyOrder},
    typed::{from_flat_map, to_flat_map},
};

/// Flat mapping from rendered path to leaf value.
pub type FlatMap = serde_json::Map<String, serde_json::Value>;

/// Serializes as a flat map and deserializes by expanding one, with default options.
#[derive(Debug)]
pub struct Flattened<T>(T);

#[derive(Debug)]
pub struct FlattenedRef<'a, T>(&'a T);

impl<T> Flattened<T> {
    pub fn new(value: T) -> Self {
        Flattened(value)
    }

    pub fn into_inner(self) -> T {
        self.0
    }

    pub fn as_ref(&self) -> FlattenedRef<'_, T> {
        FlattenedRef(&self.0)
    }
}

impl<'a, T> FlattenedRef<'a, T> {
    pub fn new(value: &'a T) -> Self {
        FlattenedRef(value)
    }
}
