//! Path encoding shared by [`flatten`] and [`expand`].
//!
//! A flat key is a list of [`Segment`]s joined by a separator. Field names are
//! written verbatim, array indices as `[<digits>]`:
//!
//! ```
//! use serde_dotted::flat_value::{FieldPath, Segment};
//!
//! let path = FieldPath::decode("users.[0].name", ".");
//! assert_eq!(
//!     path.segments(),
//!     &[Segment::field("users"), Segment::Idx(0), Segment::field("name")]
//! );
//! assert_eq!(path.encode("."), "users.[0].name");
//! ```
#![allow(clippy::unit_arg)]
use {
    itertools::Itertools,
    std::{borrow::Cow, fmt, iter::once},
    tap::{Pipe, Tap},
};

const IDX_OPEN: &str = "[";
const IDX_CLOSE: &str = "]";

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment<'a> {
    Idx(usize),
    Field(Cow<'a, str>),
}

impl fmt::Display for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Idx(idx) => write!(f, "{IDX_OPEN}{idx}{IDX_CLOSE}"),
            Segment::Field(name) => f.write_str(name),
        }
    }
}

impl<'a> Segment<'a> {
    pub fn field(name: impl Into<Cow<'a, str>>) -> Self {
        Segment::Field(name.into())
    }

    /// Reads a single separator-free part of a key.
    ///
    /// Only an exact `[<ascii digits>]` becomes an index. Everything else, including
    /// `[]`, `[abc]`, `[1a2]`, `[+1]` and indices that overflow `usize`, is kept as a
    /// literal field name. This never fails.
    pub fn parse(part: &'a str) -> Segment<'a> {
        part.strip_prefix(IDX_OPEN)
            .and_then(|rest| rest.strip_suffix(IDX_CLOSE))
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse::<usize>().ok())
            .map(Segment::Idx)
            .unwrap_or_else(|| part.pipe(Cow::Borrowed).pipe(Segment::Field))
    }

    pub fn to_owned(&self) -> Segment<'static> {
        match self {
            Segment::Idx(idx) => Segment::Idx(*idx),
            Segment::Field(cow) => cow.to_string().pipe(Cow::<str>::Owned).pipe(Segment::Field),
        }
    }
}

/// Root-to-leaf location inside a nested value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldPath<'a>(Vec<Segment<'a>>);

impl<'a> FromIterator<Segment<'a>> for FieldPath<'a> {
    fn from_iter<I: IntoIterator<Item = Segment<'a>>>(iter: I) -> Self {
        iter.into_iter().collect::<Vec<_>>().pipe(FieldPath)
    }
}

impl<'a> FieldPath<'a> {
    pub fn segments(&self) -> &[Segment<'a>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment<'a>> {
        self.0.iter()
    }

    pub fn to_owned(&self) -> FieldPath<'static> {
        self.0.iter().map(Segment::to_owned).collect()
    }

    pub fn join(&self, segment: Segment<'a>) -> Self {
        self.clone().tap_mut(|p| p.0.push(segment))
    }

    /// Renders the path, with no separator before the first segment.
    pub fn encode(&self, separator: &str) -> String {
        self.0.iter().join(separator)
    }

    /// Splits `key` on `separator` and parses each part with [`Segment::parse`].
    ///
    /// An empty separator does not split at all, so the whole key is one segment.
    pub fn decode(key: &'a str, separator: &str) -> Self {
        match separator.is_empty() {
            true => once(key).map(Segment::parse).collect(),
            false => key.split(separator).map(Segment::parse).collect(),
        }
    }
}

pub fn boxed_iter<'a, T, I>(iter: I) -> Box<dyn Iterator<Item = T> + 'a>
where
    T: 'a,
    I: Iterator<Item = T> + 'a,
{
    Box::new(iter)
}

pub mod expand;
pub mod flatten;
