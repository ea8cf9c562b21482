use {
    crate::{
        FlatMap,
        flat_value::expand::expand_with,
        options::ExpandOptions,
    },
    csv::StringRecord,
    serde_json::Value,
    std::io::Read,
    tap::Tap,
    tracing::trace,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Headers-parsing reader is required")]
    NoHeaders,
    #[error("Reading headers")]
    ReadingHeaders(#[source] csv::Error),
    #[error("Reading a single record")]
    ReadingRecord(#[source] csv::Error),
    #[error("Missing field '{field}' (idx: {idx}) for record number {record}")]
    MissingField {
        idx: usize,
        field: String,
        record: usize,
    },
}

type Result<T> = std::result::Result<T, self::Error>;

pub struct NestedCsvReader<R> {
    headers: StringRecord,
    reader: csv::Reader<R>,
    options: ExpandOptions,
    count: usize,
    rec: StringRecord,
}

#[extension_traits::extension(pub trait CsvReaderEnableNestedExt)]
impl<R: Read> csv::Reader<R> {
    fn enable_nested(self) -> Result<NestedCsvReader<R>> {
        NestedCsvReader::new(self, ExpandOptions::default())
    }

    fn enable_nested_with(self, options: ExpandOptions) -> Result<NestedCsvReader<R>> {
        NestedCsvReader::new(self, options)
    }
}

fn leaf(cell: &str) -> Value {
    match cell {
        "" => Value::Null,
        other => Value::String(other.into()),
    }
}

impl<R: Read> NestedCsvReader<R> {
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// Reads the next row as a flat map keyed by the header line.
    pub fn read_flat(&mut self) -> Option<Result<FlatMap>> {
        self.reader
            .read_record(&mut self.rec)
            .map_err(self::Error::ReadingRecord)
            .and_then(|r| {
                r.then(|| {
                    self.headers
                        .iter()
                        .enumerate()
                        .map(|(idx, header)| {
                            self.rec
                                .get(idx)
                                .ok_or_else(|| self::Error::MissingField {
                                    idx,
                                    field: header.to_string(),
                                    record: self.count,
                                })
                                .map(|cell| (header.to_string(), leaf(cell)))
                        })
                        .collect::<Result<FlatMap>>()
                })
                .transpose()
            })
            .transpose()
            .tap(|v| {
                if matches!(v, Some(Ok(_))) {
                    self.count += 1
                }
            })
    }

    /// Iterates over the remaining rows, expanding each into a nested value.
    pub fn deserialize(&mut self) -> impl Iterator<Item = self::Result<Value>> + '_ {
        std::iter::from_fn(|| {
            self.read_flat().map(|flat| {
                flat.map(|flat| {
                    trace!(record = self.count, "expanding row");
                    expand_with(flat, &self.options)
                })
            })
        })
    }

    pub fn new(reader: csv::Reader<R>, options: ExpandOptions) -> Result<Self> {
        (match reader.has_headers() {
            true => Ok(reader),
            false => Err(self::Error::NoHeaders),
        })
        .and_then(|mut reader| {
            reader
                .headers()
                .map_err(self::Error::ReadingHeaders)
                .cloned()
                .map(|headers| (reader, headers))
        })
        .map(|(reader, headers)| Self {
            headers,
            reader,
            options,
            rec: Default::default(),
            count: 0,
        })
        .tap(|r| {
            if let Ok(r) = r {
                trace!(headers = ?r.headers, "nested csv reader ready")
            }
        })
    }
}
