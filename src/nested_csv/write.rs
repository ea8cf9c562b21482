use {
    crate::{
        FlatMap,
        flat_value::flatten::flatten_with,
        options::FlattenOptions,
    },
    serde::Serialize,
    serde_json::{Map, Value},
    std::{fmt::Debug, io::Write, marker::PhantomData},
    tap::Pipe,
    tracing::{debug, instrument},
};

pub struct NestedCsvWriter<W: Write, T: Serialize + Debug> {
    writer: csv::Writer<W>,
    options: FlattenOptions,
    headers: Option<Vec<String>>,
    count: usize,
    _marker: PhantomData<T>,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Could not convert into inner error:\n{0}")]
    IntoInner(Box<str>),
    #[error("Could not serialize the struct to value")]
    SerializingToValue(#[source] serde_json::Error),
    #[error("Could not write headers")]
    WritingHeaders(#[source] csv::Error),
    #[error("Writing record #{idx}")]
    WritingRecord {
        idx: usize,
        #[source]
        source: csv::Error,
    },
    #[error("Flushing the underlying writer")]
    Flushing(#[source] std::io::Error),
    #[error("Extra headers compared to headers line:\n{extra_values:#?}")]
    ExtraValuesComparedToHeaders { extra_values: Map<String, Value> },
}

type Result<T> = std::result::Result<T, self::Error>;

#[extension_traits::extension(pub trait CsvWriterEnableNestedExt)]
impl<W: Write> csv::Writer<W> {
    fn enable_nested<T: Serialize + Debug>(self) -> NestedCsvWriter<W, T> {
        NestedCsvWriter::new(self, FlattenOptions::default())
    }

    fn enable_nested_with<T: Serialize + Debug>(self, options: FlattenOptions) -> NestedCsvWriter<W, T> {
        NestedCsvWriter::new(self, options)
    }
}

fn cell(leaf: &Value) -> String {
    match leaf {
        Value::Null => String::new(),
        Value::String(v) => v.to_string(),
        other => other.to_string(),
    }
}

impl<W, T> NestedCsvWriter<W, T>
where
    W: Write,
    T: Serialize + Debug,
{
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| self::Error::IntoInner(format!("{e:#?}").pipe(Box::from)))
    }

    pub fn new(writer: csv::Writer<W>, options: FlattenOptions) -> Self {
        Self {
            writer,
            options,
            count: 0usize,
            headers: None,
            _marker: PhantomData,
        }
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Writes one row. The first row also fixes the header line; later rows may leave
    /// header columns out (written as empty cells) but may not add new ones.
    #[instrument(level = "trace", skip(self))]
    pub fn serialize(&mut self, item: &T) -> Result<()> {
        serde_json::to_value(item)
            .map_err(self::Error::SerializingToValue)
            .map(|value| flatten_with(value, &self.options))
            .and_then(|item| self.write_flat(item))
    }

    pub fn write_flat(&mut self, mut item: FlatMap) -> Result<()> {
        if self.headers.is_none() {
            let headers = item.keys().cloned().collect::<Vec<_>>();
            debug!(?headers, "writing header line");
            self.writer
                .write_record(&headers)
                .map_err(self::Error::WritingHeaders)?;
            self.headers = Some(headers);
        }
        self.count += 1;
        self.headers
            .iter()
            .flatten()
            .map(|h| item.remove(h.as_str()).unwrap_or(Value::Null))
            .map(|f| cell(&f))
            .collect::<Vec<_>>()
            .pipe(|values| {
                item.is_empty()
                    .then_some(values)
                    .ok_or_else(|| self::Error::ExtraValuesComparedToHeaders { extra_values: item })
            })
            .and_then(|row| {
                self.writer
                    .write_record(&row)
                    .map_err(|source| self::Error::WritingRecord {
                        idx: self.count,
                        source,
                    })
            })
    }
}

/// allows bypassing the limitation of csv crate (it disallows writing nested objects)
pub fn write_nested_csv<'a, W, T>(
    writer: &mut W,
    items: impl IntoIterator<Item = &'a T>,
    options: &FlattenOptions,
) -> Result<usize>
where
    W: Write,
    T: Serialize + Debug + 'a,
{
    NestedCsvWriter::<_, T>::new(csv::WriterBuilder::new().from_writer(writer), options.clone())
        .pipe_ref_mut(|w| {
            items
                .into_iter()
                .try_for_each(|i| w.serialize(i))
                .and_then(|()| w.flush().map_err(self::Error::Flushing))
                .map(|_| w.count)
        })
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        serde_json::json,
    };

    fn written(rows: &[Value], options: &FlattenOptions) -> Result<String> {
        let mut out = Vec::new();
        write_nested_csv(&mut out, rows, options)?;
        String::from_utf8(out).map_err(|e| self::Error::IntoInner(e.to_string().into()))
    }

    #[test]
    fn test_writes_header_from_first_row() -> anyhow::Result<()> {
        let rows = [
            json!({"user": {"name": "John", "tags": ["a"]}, "active": true, "note": null}),
            json!({"user": {"name": "Jane", "tags": ["b"]}, "active": false, "note": "x"}),
        ];
        assert_eq!(
            written(&rows, &FlattenOptions::default())?,
            "user.name,user.tags.[0],active,note\nJohn,a,true,\nJane,b,false,x\n"
        );
        Ok(())
    }

    #[test]
    fn test_missing_columns_are_empty() -> anyhow::Result<()> {
        let rows = [json!({"a": 1, "b": 2}), json!({"a": 3})];
        assert_eq!(written(&rows, &FlattenOptions::new().with_separator("_"))?, "a,b\n1,2\n3,\n");
        Ok(())
    }

    #[test]
    fn test_extra_columns_are_rejected() {
        let rows = [json!({"a": 1}), json!({"a": 2, "b": 3})];
        assert!(matches!(
            written(&rows, &FlattenOptions::default()),
            Err(Error::ExtraValuesComparedToHeaders { .. })
        ));
    }
}
