//! Structured records produced by parsing a log line.

use crate::error::{Error, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Field storage: `(field name, captured text)` pairs in template order.
pub type Fields = Vec<(String, String)>;

/// A parsed log line.
///
/// Fields keep the order in which their placeholders appear in the template,
/// so a record for `%TIMESTAMP% %HOSTNAME% %syslogtag%%msg%%msg%` iterates as
/// `TIMESTAMP`, `HOSTNAME`, `syslogtag`, `msg`, `msg1`.
///
/// Every call to [`CompiledTemplate::parse`](crate::CompiledTemplate::parse)
/// returns a new, owned record; holding on to one never observes a later parse.
/// A line that did not match produces an empty record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Fields,
}

impl Record {
    /// Create a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record from already ordered fields.
    pub fn from_fields(fields: Fields) -> Self {
        Self { fields }
    }

    /// Look up a field, returning `None` if it is absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a field value as a string.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use rsytmpl::Record;
    /// let record = Record::from_fields(vec![("HOSTNAME".to_string(), "myhost".to_string())]);
    ///
    /// assert_eq!(record.field("HOSTNAME").unwrap(), "myhost");
    /// assert!(record.field("msg").is_err());
    /// ```
    pub fn field(&self, name: &str) -> Result<&str> {
        self.get(name).ok_or_else(|| Error::field_not_found(name))
    }

    /// Get a field value as a float.
    pub fn float_field(&self, name: &str) -> Result<f64> {
        let value = self.field(name)?;
        value
            .parse::<f64>()
            .map_err(|e| Error::field_parse_error(name, value, "f64", e))
    }

    /// Get a field value as a 64-bit integer.
    pub fn int64_field(&self, name: &str) -> Result<i64> {
        let value = self.field(name)?;
        value
            .parse::<i64>()
            .map_err(|e| Error::field_parse_error(name, value, "i64", e))
    }

    /// Get a field value as a 32-bit integer.
    pub fn int_field(&self, name: &str) -> Result<i32> {
        let value = self.field(name)?;
        value
            .parse::<i32>()
            .map_err(|e| Error::field_parse_error(name, value, "i32", e))
    }

    /// Field names in template order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over `(name, value)` pairs in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Get the number of fields in this record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the line did not match (or the template has no placeholders).
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get a reference to the underlying fields.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}

impl From<Fields> for Record {
    fn from(fields: Fields) -> Self {
        Self::from_fields(fields)
    }
}

impl From<Record> for Fields {
    fn from(record: Record) -> Self {
        record.fields
    }
}

impl fmt::Display for Record {
    /// Tab separated `name=value` pairs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("\t")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
