//! Adapter turning fixed-field records into plain [`Value`] objects before flattening.
//!
//! Flattening only understands the closed [`Value`] shape. Anything richer, such as
//! records with embedded sub-records, private fields or maps keyed by something that
//! is not a string, is resolved here first:
//!
//! - [`FieldKind::Embedded`] fields have their own fields promoted into the parent,
//!   so they flatten without their own name in the path. Embedded values with no
//!   fields of their own (scalars, `null`, opaque maps) contribute nothing.
//! - [`FieldKind::Private`] fields are skipped.
//! - [`FieldValue::Opaque`] values contribute no entries at all.
//! - Name collisions are resolved last-write-wins in declaration order. The winning
//!   value keeps the position of the first field with that name.
//!
//! ```
//! use serde_dotted::{flatten, record::Record};
//! use serde_json::json;
//!
//! let b = Record::new().with_field("C", "test").with_field("D", 2);
//! let a = Record::new().with_embedded("B", b).with_field("F", 1);
//!
//! assert_eq!(
//!     serde_json::Value::Object(flatten(a.into())),
//!     json!({"C": "test", "D": 2, "F": 1})
//! );
//! ```
use {
    indexmap::IndexMap,
    serde_json::{Map, Value},
    std::{borrow::Cow, collections::BTreeMap, collections::HashMap},
    tap::Pipe,
    tracing::trace,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Named,
    /// Anonymous field whose own fields are promoted into the enclosing record.
    Embedded,
    /// Inaccessible field, never surfaced.
    Private,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Value(Value),
    Record(Record),
    /// A keyed collection whose keys are not representable as strings.
    Opaque,
}

macro_rules! field_values {
    ($($ty:ty),* $(,)?) => {
        $(impl From<$ty> for FieldValue {
            fn from(value: $ty) -> Self {
                FieldValue::Value(value.into())
            }
        })*
    };
}

field_values!(
    Value,
    Map<String, Value>,
    String,
    &str,
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
);

impl FieldValue {
    fn into_value(self) -> Option<Value> {
        match self {
            FieldValue::Value(value) => Some(value),
            FieldValue::Record(record) => record.into_value().pipe(Some),
            FieldValue::Opaque => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub value: FieldValue,
}

/// A record with declared fields in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<Field>,
}

impl FromIterator<Field> for Record {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    fn with(mut self, name: impl Into<String>, kind: FieldKind, value: FieldValue) -> Self {
        self.push(Field {
            name: name.into(),
            kind,
            value,
        });
        self
    }

    #[must_use]
    pub fn with_field(self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.with(name, FieldKind::Named, value.into())
    }

    /// `name` is the embedded type's name. It never shows up in flattened keys.
    #[must_use]
    pub fn with_embedded(self, name: impl Into<String>, record: Record) -> Self {
        self.with(name, FieldKind::Embedded, FieldValue::Record(record))
    }

    #[must_use]
    pub fn with_private(self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.with(name, FieldKind::Private, value.into())
    }

    /// The record's visible fields after promotion, in first-declaration order.
    pub fn promoted_fields(self) -> IndexMap<String, FieldValue> {
        self.fields
            .into_iter()
            .fold(IndexMap::new(), |mut promoted, Field { name, kind, value }| {
                match (kind, value) {
                    (FieldKind::Private, _) => trace!(%name, "skipping private field"),
                    (FieldKind::Embedded, FieldValue::Record(record)) => {
                        promoted.extend(record.promoted_fields());
                    }
                    (FieldKind::Embedded, FieldValue::Value(Value::Object(map))) => {
                        promoted.extend(map.into_iter().map(|(key, value)| (key, FieldValue::Value(value))));
                    }
                    // nothing to promote and no name of its own
                    (FieldKind::Embedded, _) => trace!(%name, "dropping embedded field without fields"),
                    (FieldKind::Named, value) => {
                        promoted.insert(name, value);
                    }
                }
                promoted
            })
    }

    pub fn into_value(self) -> Value {
        self.promoted_fields()
            .into_iter()
            .filter_map(|(name, value)| match value.into_value() {
                Some(value) => Some((name, value)),
                None => {
                    trace!(%name, "dropping opaque field");
                    None
                }
            })
            .collect::<Map<_, _>>()
            .pipe(Value::Object)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}

impl From<Record> for FieldValue {
    fn from(record: Record) -> Self {
        FieldValue::Record(record)
    }
}

/// Keys that may or may not be rendered into a path.
pub trait MapKey {
    fn as_key(&self) -> Option<Cow<'_, str>>;
}

macro_rules! string_keys {
    ($($ty:ty),* $(,)?) => {
        $(impl MapKey for $ty {
            fn as_key(&self) -> Option<Cow<'_, str>> {
                Some(Cow::Borrowed(AsRef::<str>::as_ref(self)))
            }
        })*
    };
}

macro_rules! opaque_keys {
    ($($ty:ty),* $(,)?) => {
        $(impl MapKey for $ty {
            fn as_key(&self) -> Option<Cow<'_, str>> {
                None
            }
        })*
    };
}

string_keys!(String, &str, Box<str>, Cow<'_, str>);
opaque_keys!(bool, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl MapKey for char {
    fn as_key(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.to_string()))
    }
}

/// Builds an object out of keyed entries, or [`FieldValue::Opaque`] when the keys
/// can't be rendered as strings.
pub fn keyed<K, V, I>(entries: I) -> FieldValue
where
    K: MapKey,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    entries
        .into_iter()
        .map(|(key, value)| key.as_key().map(|key| (key.into_owned(), value.into())))
        .collect::<Option<Map<_, _>>>()
        .map(Value::Object)
        .map(FieldValue::Value)
        .unwrap_or(FieldValue::Opaque)
}

/// Same as [`keyed`] for an owned [`HashMap`].
pub fn keyed_hash_map<K: MapKey, V: Into<Value>>(map: HashMap<K, V>) -> FieldValue {
    keyed(map)
}

/// Same as [`keyed`] for an owned [`BTreeMap`].
pub fn keyed_btree_map<K: MapKey, V: Into<Value>>(map: BTreeMap<K, V>) -> FieldValue {
    keyed(map)
}

/// Resolves an optional reference to `null` or the pointee's value.
pub fn optional<T: Into<FieldValue>>(value: Option<T>) -> FieldValue {
    value.map(Into::into).unwrap_or(FieldValue::Value(Value::Null))
}
