//! Configuration for [`flatten_with`](crate::flat_value::flatten::flatten_with) and
//! [`expand_with`](crate::flat_value::expand::expand_with).
//!
//! ```
//! use serde_dotted::{ExpandOptions, FlattenOptions, KeyOrder};
//!
//! let flatten = FlattenOptions::new().with_separator("_").with_prefix("app");
//! let expand = ExpandOptions::new()
//!     .with_separator("_")
//!     .with_key_order(KeyOrder::Insertion);
//! assert_eq!(flatten.separator(), expand.separator());
//! ```

pub const DEFAULT_SEPARATOR: &str = ".";

/// Options for flattening a nested value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlattenOptions {
    separator: String,
    prefix: String,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            prefix: String::new(),
        }
    }
}

impl FlattenOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// String placed between path segments. Defaults to `"."`.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Raw string put in front of every key, followed by the separator.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// Order in which flat entries are folded into the expanded value.
///
/// This only matters when two keys disagree about the shape of a shared prefix,
/// e.g. `a.[0]` next to `a.x`, or `a` next to `a.b`. Conflicts are always resolved
/// last-write-wins at the type level: a node that has to become an array or an
/// object but currently holds something else is replaced. The key order decides
/// which write is the last one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyOrder {
    /// Keys are folded in ascending byte order, so the same flat map always
    /// expands to the same value.
    #[default]
    Sorted,
    /// Keys are folded in the map's own iteration order.
    Insertion,
}

/// Options for expanding a flat map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandOptions {
    separator: String,
    key_order: KeyOrder,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            key_order: KeyOrder::default(),
        }
    }
}

impl ExpandOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Must match the separator the map was flattened with.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    #[must_use]
    pub fn with_key_order(mut self, key_order: KeyOrder) -> Self {
        self.key_order = key_order;
        self
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn key_order(&self) -> KeyOrder {
        self.key_order
    }
}

impl From<&FlattenOptions> for ExpandOptions {
    fn from(options: &FlattenOptions) -> Self {
        Self::new().with_separator(options.separator())
    }
}
