//! Bridges typed values and flat maps through `serde_json`.
//!
//! Typed structs go through [`serde_json::to_value`] first, so serde attributes take
//! the roles the record adapter plays for hand-built records: `#[serde(flatten)]`
//! promotes a sub-struct's fields into the parent and `#[serde(skip)]` hides a field.
use {
    crate::{
        FlatMap,
        flat_value::{expand::expand_with, flatten::flatten_with},
        options::{ExpandOptions, FlattenOptions},
    },
    serde::{Serialize, de::DeserializeOwned},
    serde_json::Value,
    tap::Pipe,
    tracing::instrument,
};

mod flattened;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not convert the value into a json tree")]
    ToValue(#[source] serde_json::Error),
    #[error("could not rebuild the typed value from:\n{value:#}")]
    FromValue {
        #[source]
        source: serde_json::Error,
        value: Value,
    },
    #[error("expected a flat map at the top level, found {0}")]
    UnsupportedTopLevelValue(&'static str),
}

type Result<T> = std::result::Result<T, self::Error>;

#[instrument(level = "debug", skip(value), fields(ty = std::any::type_name::<T>()))]
pub fn to_flat_map<T>(value: &T, options: &FlattenOptions) -> Result<FlatMap>
where
    T: Serialize + ?Sized,
{
    serde_json::to_value(value)
        .map_err(self::Error::ToValue)
        .map(|value| flatten_with(value, options))
}

/// Expands `flat` and deserializes the result into `T`.
///
/// Expansion only ever produces generic trees, so this works as long as `T`'s
/// deserializer accepts what was flattened. Values that went through a text substrate
/// (every leaf a string) usually need lenient field types on `T`.
#[instrument(level = "debug", skip(flat), fields(ty = std::any::type_name::<T>(), len = flat.len()))]
pub fn from_flat_map<T>(flat: FlatMap, options: &ExpandOptions) -> Result<T>
where
    T: DeserializeOwned,
{
    expand_with(flat, options).pipe(|value| {
        T::deserialize(&value).map_err(|source| self::Error::FromValue { source, value })
    })
}

pub(crate) fn top_level_flat_map(value: Value) -> Result<FlatMap> {
    match value {
        Value::Object(map) => Ok(map),
        other => {
            tracing::debug!("other=\n{other:#?}");
            Err(self::Error::UnsupportedTopLevelValue(match other {
                Value::Null => "Value::Null",
                Value::Bool(_) => "Value::Bool",
                Value::Number(_) => "Value::Number",
                Value::String(_) => "Value::String",
                Value::Array(_) => "Value::Array",
                Value::Object(_) => "Value::Object",
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        serde::{Deserialize, Serialize},
        serde_json::json,
    };

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    #[serde(rename_all = "PascalCase")]
    struct B {
        c: String,
        d: i32,
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    #[serde(rename_all = "PascalCase")]
    struct Inner {
        #[serde(flatten)]
        b: B,
        v: String,
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    #[serde(rename_all = "PascalCase")]
    struct A {
        #[serde(flatten)]
        b: B,
        f: i32,
        inner: Inner,
        #[serde(skip)]
        private: String,
    }

    fn a() -> A {
        A {
            b: B {
                c: "test".into(),
                d: 2,
            },
            f: 1,
            inner: Inner {
                b: B { c: "".into(), d: 0 },
                v: "".into(),
            },
            private: "hidden".into(),
        }
    }

    #[test_log::test]
    fn test_serde_flatten_promotes_fields() -> anyhow::Result<()> {
        let flat = to_flat_map(&a(), &FlattenOptions::default())?;
        assert_eq!(
            Value::Object(flat),
            json!({
                "C": "test",
                "D": 2,
                "F": 1,
                "Inner.C": "",
                "Inner.D": 0,
                "Inner.V": ""
            })
        );
        Ok(())
    }

    #[test_log::test]
    fn test_typed_roundtrip() -> anyhow::Result<()> {
        let options = FlattenOptions::new().with_separator("__");
        let flat = to_flat_map(&a(), &options)?;
        let back: A = from_flat_map(flat, &ExpandOptions::from(&options))?;
        assert_eq!(back, A { private: String::new(), ..a() });
        Ok(())
    }

    #[test]
    fn test_from_flat_map_reports_the_expanded_value() {
        let mut flat = FlatMap::new();
        flat.insert("F".into(), json!("not a number"));
        match from_flat_map::<A>(flat, &ExpandOptions::default()) {
            Err(Error::FromValue { value, .. }) => assert_eq!(value, json!({"F": "not a number"})),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_top_level_must_be_a_map() {
        assert!(matches!(
            top_level_flat_map(json!([1])),
            Err(Error::UnsupportedTopLevelValue("Value::Array"))
        ));
    }
}
