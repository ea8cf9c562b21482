use {
    super::{FieldPath, Segment, boxed_iter},
    crate::{
        FlatMap,
        options::{ExpandOptions, KeyOrder},
    },
    itertools::Itertools,
    serde_json::{Map, Value},
    std::mem,
    tap::Pipe,
    tracing::{instrument, trace},
};

#[extension_traits::extension(pub trait VecGrowExt)]
impl<T> Vec<T> {
    fn grow_to(&mut self, index: usize, filler: impl FnMut() -> T) -> Option<&mut T> {
        let len = index.checked_add(1)?;
        if len > self.len() {
            self.resize_with(len, filler);
        }
        self.get_mut(index)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Shaped after the current insertion's next segment and never revisited.
fn filler(rest: &[Segment<'_>]) -> Value {
    match rest.first() {
        Some(Segment::Idx(_)) => Value::Array(Vec::new()),
        Some(Segment::Field(_)) => Value::Object(Map::new()),
        None => Value::Null,
    }
}

fn into_array(node: Value) -> Vec<Value> {
    match node {
        Value::Array(values) => values,
        Value::Null => Vec::new(),
        other => {
            trace!(replaced = kind(&other), "type conflict, replacing with array");
            Vec::new()
        }
    }
}

fn into_object(node: Value) -> Map<String, Value> {
    match node {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            trace!(replaced = kind(&other), "type conflict, replacing with object");
            Map::new()
        }
    }
}

/// A node that has to be an array or an object but holds something else is
/// discarded, so the last write wins for the node's type as well as its value.
pub fn put(node: Value, path: &[Segment<'_>], value: Value) -> Value {
    match path.split_first() {
        None => value,
        Some((Segment::Idx(idx), rest)) => {
            let mut values = into_array(node);
            if *idx > values.len() {
                trace!(idx, len = values.len(), "sparse index, adding fillers");
            }
            match values.grow_to(*idx, || filler(rest)) {
                Some(slot) => *slot = put(mem::take(slot), rest, value),
                None => trace!(idx, "index can't be addressed, dropping write"),
            }
            Value::Array(values)
        }
        Some((Segment::Field(name), rest)) => {
            let mut map = into_object(node);
            let slot = map.entry(name.to_string()).or_insert(Value::Null);
            *slot = put(mem::take(slot), rest, value);
            Value::Object(map)
        }
    }
}

fn ordered(flat: FlatMap, key_order: KeyOrder) -> Box<dyn Iterator<Item = (String, Value)>> {
    match key_order {
        KeyOrder::Sorted => flat
            .into_iter()
            .sorted_unstable_by(|(a, _), (b, _)| a.cmp(b))
            .pipe(boxed_iter),
        KeyOrder::Insertion => flat.into_iter().pipe(boxed_iter),
    }
}

/// An empty map expands to `null`, not to an empty object.
#[instrument(level = "trace", skip(flat), fields(len = flat.len()))]
pub fn expand_with(flat: FlatMap, options: &ExpandOptions) -> Value {
    ordered(flat, options.key_order()).fold(Value::Null, |root, (key, value)| {
        FieldPath::decode(&key, options.separator()).pipe(|path| put(root, path.segments(), value))
    })
}

pub fn expand(flat: FlatMap) -> Value {
    expand_with(flat, &ExpandOptions::default())
}
