//! Values returned by query execution.
//!
//! Scalars hold the text the execution engine already normalized. Nothing
//! here parses or validates that text; the result marshaller only re-tags it.
//!
//! Traversal of `Array` and `Record` values is plain recursion. That's fine
//! for reasonably shallow warehouse schemas, deeply nested values are bounded
//! only by the stack.
use std::fmt;

use indexmap::IndexMap;
use indexmap::map::Entry;

macro_rules! text_scalar {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new(text: impl Into<String>) -> Self {
                $name(text.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

text_scalar! {
    /// NUMERIC value.
    Decimal
}
text_scalar! {
    /// BIGNUMERIC value.
    BigDecimal
}
text_scalar! {
    /// FLOAT64 value, may be `NaN`, `Infinity` or `-Infinity`.
    Float64
}
text_scalar! {
    /// INT64 value.
    Int64
}
text_scalar! {
    /// BYTES value, base64 encoded.
    Base64
}
text_scalar!(Date);
text_scalar!(Timestamp);
text_scalar!(Time);
text_scalar!(Datetime);
text_scalar! {
    /// GEOGRAPHY value in WKT.
    Geography
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutputValue {
    Null,
    Decimal(Decimal),
    BigDecimal(BigDecimal),
    Float(Float64),
    Text(String),
    Bytes(Base64),
    Date(Date),
    Timestamp(Timestamp),
    Time(Time),
    Datetime(Datetime),
    Geography(Geography),
    Bool(bool),
    Integer(Int64),
    Array(Vec<OutputValue>),
    Record(Record),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Duplicate field in record: {0}")]
pub struct DuplicateFieldError(pub String);

/// A single row, fields kept in projection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, OutputValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from fields in projection order, rejecting repeated
    /// names.
    pub fn try_from_fields<S>(
        fields: impl IntoIterator<Item = (S, OutputValue)>,
    ) -> Result<Self, DuplicateFieldError>
    where
        S: Into<String>,
    {
        let mut record = Record::new();
        for (name, value) in fields {
            record.push(name, value)?;
        }
        Ok(record)
    }

    /// Append a field to the end of the record.
    pub fn push(
        &mut self,
        name: impl Into<String>,
        value: OutputValue,
    ) -> Result<(), DuplicateFieldError> {
        match self.fields.entry(name.into()) {
            Entry::Occupied(ent) => Err(DuplicateFieldError(ent.key().clone())),
            Entry::Vacant(ent) => {
                ent.insert(value);
                Ok(())
            }
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OutputValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Ordered rows from a single query execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub rows: Vec<Record>,
}

impl RowSet {
    pub fn new(rows: Vec<Record>) -> Self {
        RowSet { rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn first(&self) -> Option<&Record> {
        self.rows.first()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<Record> for RowSet {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        RowSet {
            rows: iter.into_iter().collect(),
        }
    }
}
