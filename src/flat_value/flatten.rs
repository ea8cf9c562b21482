use {
    super::{FieldPath, Segment, boxed_iter},
    crate::{FlatMap, options::FlattenOptions},
    serde_json::Value,
    std::{borrow::Cow, iter::once},
    tap::Pipe,
    tracing::instrument,
};

/// Empty arrays and objects yield nothing. A bare leaf is yielded with `prefix` itself.
pub fn flattened_iter<'prefix>(prefix: FieldPath<'prefix>, value: Value) -> impl Iterator<Item = (FieldPath<'static>, Value)> {
    match value {
        Value::Array(arr) => arr
            .into_iter()
            .enumerate()
            .flat_map({
                let prefix = prefix.to_owned();
                move |(idx, value)| flattened_iter(prefix.join(Segment::Idx(idx)), value)
            })
            .pipe(boxed_iter),
        Value::Object(map) => map
            .into_iter()
            .flat_map({
                let prefix = prefix.to_owned();
                move |(key, value)| flattened_iter(prefix.join(Segment::Field(Cow::Owned(key))), value)
            })
            .pipe(boxed_iter),
        leaf => once((prefix.to_owned(), leaf)).pipe(boxed_iter),
    }
    .pipe(boxed_iter)
}

fn render_key(path: &FieldPath<'_>, options: &FlattenOptions) -> Option<String> {
    match (options.prefix(), path.is_empty()) {
        ("", true) => None,
        ("", false) => path.encode(options.separator()).pipe(Some),
        (prefix, true) => prefix.to_string().pipe(Some),
        (prefix, false) => format!("{prefix}{}{}", options.separator(), path.encode(options.separator())).pipe(Some),
    }
}

/// A leaf at the root only produces an entry when a prefix is configured.
#[instrument(level = "trace", skip(value))]
pub fn flatten_with(value: Value, options: &FlattenOptions) -> FlatMap {
    flattened_iter(FieldPath::default(), value)
        .filter_map(|(path, leaf)| render_key(&path, options).map(|key| (key, leaf)))
        .collect()
}

pub fn flatten(value: Value) -> FlatMap {
    flatten_with(value, &FlattenOptions::default())
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json, tap::Tap};

    fn flat(value: serde_json::Value) -> serde_json::Value {
        flatten(value).pipe(Value::Object)
    }

    #[test]
    fn test_flatten_simple() {
        let input = json!({
            "name": "John",
            "age": 30
        });

        let result = flatten(input);
        assert_eq!(result.get("name").unwrap(), &json!("John"));
        assert_eq!(result.get("age").unwrap(), &json!(30));
    }

    #[test]
    fn test_flatten_nested() {
        let input = json!({
            "user": {
                "name": "John",
                "address": {
                    "city": "NYC",
                    "zip": "10001"
                }
            },
            "active": true
        });

        let result = flatten(input).tap(|r| println!("{r:#?}"));
        assert_eq!(result.get("user.name").unwrap(), &json!("John"));
        assert_eq!(result.get("user.address.city").unwrap(), &json!("NYC"));
        assert_eq!(result.get("user.address.zip").unwrap(), &json!("10001"));
        assert_eq!(result.get("active").unwrap(), &json!(true));
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_flatten_arrays() {
        assert_eq!(
            flat(json!({
                "numbers": [1, 2, 3],
                "users": [{"name": "John"}, {"name": "Jane", "tags": ["admin"]}]
            })),
            json!({
                "numbers.[0]": 1,
                "numbers.[1]": 2,
                "numbers.[2]": 3,
                "users.[0].name": "John",
                "users.[1].name": "Jane",
                "users.[1].tags.[0]": "admin"
            })
        );
    }

    #[test]
    fn test_flatten_root_scalars_produce_nothing() {
        for value in [json!("hello"), json!(42), json!(true), json!(null)] {
            assert!(flatten(value).is_empty());
        }
    }

    #[test]
    fn test_flatten_empty_containers_produce_nothing() {
        assert!(flatten(json!({})).is_empty());
        assert!(flatten(json!([])).is_empty());
        assert!(flatten(json!({"empty": [], "nested": {"also": {}}})).is_empty());
    }

    #[test]
    fn test_flatten_keeps_nulls_below_root() {
        assert_eq!(
            flat(json!({"user": {"email": null}, "list": [null]})),
            json!({"user.email": null, "list.[0]": null})
        );
    }

    #[test]
    fn test_flatten_root_array_has_no_leading_separator() {
        assert_eq!(
            flat(json!(["a", {"b": 1}])),
            json!({"[0]": "a", "[1].b": 1})
        );
    }

    #[test]
    fn test_flatten_with_prefix() {
        assert_eq!(
            flatten_with(json!({"name": "John"}), &FlattenOptions::new().with_prefix("user")).pipe(Value::Object),
            json!({"user.name": "John"})
        );
        assert_eq!(
            flatten_with(json!(["x"]), &FlattenOptions::new().with_prefix("list")).pipe(Value::Object),
            json!({"list.[0]": "x"})
        );
    }

    #[test]
    fn test_flatten_root_scalar_with_prefix() {
        assert_eq!(
            flatten_with(json!(42), &FlattenOptions::new().with_prefix("answer")).pipe(Value::Object),
            json!({"answer": 42})
        );
    }

    #[test]
    fn test_flatten_with_prefix_and_separator() {
        assert_eq!(
            flatten_with(
                json!({"user": {"name": "John", "age": 30}}),
                &FlattenOptions::new().with_prefix("root").with_separator("|")
            )
            .pipe(Value::Object),
            json!({"root|user|name": "John", "root|user|age": 30})
        );
    }

    #[test]
    fn test_flattened_iter_reports_paths() {
        let paths = flattened_iter(FieldPath::default(), json!({"a": [true]}))
            .map(|(path, _)| path)
            .collect::<Vec<_>>();
        assert_eq!(
            paths,
            vec![[Segment::field("a"), Segment::Idx(0)].into_iter().collect::<FieldPath>()]
        );
    }
}
