use {
    crate::{
        Flattened, FlattenedRef,
        flat_value::{expand::expand, flatten::flatten},
    },
    serde::{Deserialize, Serialize, de::DeserializeOwned},
    tracing::instrument,
};

impl<T> Serialize for Flattened<T>
where
    T: Serialize,
{
    #[instrument(skip_all)]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_ref().serialize(serializer)
    }
}

impl<T> Serialize for FlattenedRef<'_, T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serde_json::to_value(self.0)
            .map_err(serde::ser::Error::custom)
            .map(flatten)
            .and_then(|flat| serializer.collect_map(flat))
    }
}

impl<'de, T> Deserialize<'de> for Flattened<T>
where
    T: DeserializeOwned,
{
    #[instrument(skip(deserializer))]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer)
            .and_then(|value| super::top_level_flat_map(value).map_err(serde::de::Error::custom))
            .map(expand)
            .and_then(|value| serde_json::from_value::<T>(value).map_err(serde::de::Error::custom))
            .map(Self)
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::Flattened,
        serde::{Deserialize, Serialize},
        serde_json::json,
    };

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    struct Child {
        field_1: bool,
        field_2: Vec<i32>,
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    struct Parent {
        child_1: Child,
        child_2: Option<Child>,
    }

    const PARENT: Parent = Parent {
        child_1: Child {
            field_1: true,
            field_2: Vec::new(),
        },
        child_2: None,
    };

    #[test_log::test]
    fn test_serializes_as_flat_map() -> anyhow::Result<()> {
        let parent = Parent {
            child_1: Child {
                field_1: true,
                field_2: vec![4, 5],
            },
            ..PARENT
        };
        assert_eq!(
            serde_json::to_value(Flattened::new(parent))?,
            json!({
                "child_1.field_1": true,
                "child_1.field_2.[0]": 4,
                "child_1.field_2.[1]": 5,
                "child_2": null
            })
        );
        Ok(())
    }

    #[test_log::test]
    fn test_deserializes_from_flat_map() -> anyhow::Result<()> {
        let Flattened(parent) = serde_json::from_value::<Flattened<Parent>>(json!({
            "child_1.field_1": false,
            "child_1.field_2.[1]": 7,
            "child_1.field_2.[0]": 6,
            "child_2.field_1": true,
            "child_2.field_2.[0]": 1
        }))?;
        assert_eq!(
            parent,
            Parent {
                child_1: Child {
                    field_1: false,
                    field_2: vec![6, 7],
                },
                child_2: Some(Child {
                    field_1: true,
                    field_2: vec![1],
                }),
            }
        );
        Ok(())
    }

    #[test]
    fn test_rejects_non_map_input() {
        assert!(serde_json::from_value::<Flattened<Parent>>(json!([1, 2])).is_err());
    }
}
