//! Row data handling for 4D query results
//!
//! This module provides types and functions for:
//! - Decoding row data from the 4D wire format
//! - Representing column values in a type-safe manner
//! - Projecting rows into numeric, associative, or combined form

use indexmap::IndexMap;
use tokio::io::AsyncRead;

use crate::constants::{FetchStyle, SqlType};
use crate::error::{Error, Result};
use crate::messages::response::ResponseHeader;
use crate::wire;

/// Represents a value from a 4D column.
///
/// This enum covers all the data types that can be returned from 4D queries.
/// Values can be accessed using the various `as_*` methods.
///
/// # Example
///
/// ```rust,no_run
/// use fourd_rs::Value;
///
/// fn process_value(value: &Value) {
///     match value {
///         Value::Null => println!("NULL"),
///         Value::String(s) => println!("String: {}", s),
///         Value::Integer(i) => println!("Integer: {}", i),
///         Value::Float(f) => println!("Float: {}", f),
///         _ => println!("Other type"),
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value (VK_BOOLEAN)
    Boolean(bool),
    /// Integer value (VK_BYTE, VK_WORD, VK_LONG, VK_LONG8, VK_DURATION)
    Integer(i64),
    /// Floating point value (VK_REAL, VK_FLOAT)
    Float(f64),
    /// String value (VK_STRING, decoded from UTF-16LE)
    String(String),
    /// Byte array (VK_BLOB, VK_IMAGE)
    Bytes(Vec<u8>),
    /// Formatted date-time string (VK_TIMESTAMP, VK_TIME)
    DateTime(String),
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as a string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::DateTime(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Try to get as a float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Integer(i) => Some(*i != 0),
            _ => None,
        }
    }

    /// Try to get as bytes
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::DateTime(s) => write!(f, "{}", s),
        }
    }
}

/// A row of data from a query result.
///
/// Rows contain values that can be accessed by column index (0-based) or by
/// column name. When the result set declares updateable columns, the row also
/// carries the server's record id for use in subsequent UPDATE/DELETE calls.
///
/// # Example
///
/// ```rust,no_run
/// use fourd_rs::Row;
///
/// fn print_person(row: &Row) {
///     let id = row.get_i64(0).unwrap_or(0);
///     let name = row.get_by_name("name").and_then(|v| v.as_str()).unwrap_or("");
///     println!("{}: {}", id, name);
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Column values, in column order
    values: Vec<Value>,
    /// Column names, parallel to `values`
    column_names: Vec<String>,
    /// Server record id, present iff the result set is updateable
    record_id: Option<u32>,
}

impl Row {
    /// Create a new row with values and column names
    pub fn new(values: Vec<Value>, column_names: Vec<String>) -> Self {
        Self {
            values,
            column_names,
            record_id: None,
        }
    }

    /// Attach the server record id
    pub fn with_record_id(mut self, record_id: u32) -> Self {
        self.record_id = Some(record_id);
        self
    }

    /// Get the number of columns in this row
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a value by column index
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get a value by column name
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        let index = self
            .column_names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))?;
        self.values.get(index)
    }

    /// The server record id, if the result set declared updateable columns
    pub fn record_id(&self) -> Option<u32> {
        self.record_id
    }

    /// The column names, in column order
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Get all values as a slice
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consume the row and return the values
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Consume the row into a name-to-value mapping, column order preserved.
    ///
    /// The record id is not part of the mapping.
    pub fn into_assoc(self) -> IndexMap<String, Value> {
        self.column_names.into_iter().zip(self.values).collect()
    }

    /// Project the row into the requested fetch style
    pub fn project(self, style: FetchStyle) -> Fetched {
        match style {
            FetchStyle::Numeric => Fetched::Numeric(self.into_values()),
            FetchStyle::Assoc => Fetched::Assoc(self.into_assoc()),
            FetchStyle::Both => Fetched::Both(self),
        }
    }

    /// Try to get a string value by index
    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Value::as_str)
    }

    /// Try to get an integer value by index
    pub fn get_i64(&self, index: usize) -> Option<i64> {
        self.get(index).and_then(Value::as_i64)
    }

    /// Try to get a float value by index
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(Value::as_f64)
    }

    /// Check if a column value is NULL
    pub fn is_null(&self, index: usize) -> bool {
        self.get(index).map(Value::is_null).unwrap_or(true)
    }
}

impl std::ops::Index<usize> for Row {
    type Output = Value;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

/// A row projected into the caller-requested [`FetchStyle`]
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    /// Values in column order
    Numeric(Vec<Value>),
    /// Name-to-value mapping, column order preserved
    Assoc(IndexMap<String, Value>),
    /// Index and name access in one container
    Both(Row),
}

/// Decoder for row data from the 4D wire format.
///
/// Rows arrive back to back in the order declared by the header block. When
/// any column is updateable every row is prefixed with one skip byte and a
/// u32 LE record id. Each value is preceded by a status byte: `0` null, `1`
/// value follows, `2` a server-side error code follows.
pub struct RowDecoder<'a> {
    column_names: &'a [String],
    column_types: &'a [SqlType],
    with_record_ids: bool,
}

impl<'a> RowDecoder<'a> {
    /// Create a decoder from explicit column metadata
    pub fn new(
        column_names: &'a [String],
        column_types: &'a [SqlType],
        with_record_ids: bool,
    ) -> Self {
        Self {
            column_names,
            column_types,
            with_record_ids,
        }
    }

    /// Create a decoder from a parsed response header
    pub fn from_header(header: &'a ResponseHeader) -> Self {
        Self::new(
            &header.column_names,
            &header.column_types,
            header.has_record_ids(),
        )
    }

    /// Decode one row from the stream
    pub async fn decode_row<R>(&self, reader: &mut R) -> Result<Row>
    where
        R: AsyncRead + Unpin,
    {
        let record_id = if self.with_record_ids {
            wire::read_u8(reader).await?;
            Some(wire::read_u32_le(reader).await?)
        } else {
            None
        };

        let mut values = Vec::with_capacity(self.column_types.len());
        for &ty in self.column_types {
            match wire::read_u8(reader).await? {
                0 => values.push(Value::Null),
                1 => values.push(wire::decode_value(reader, ty).await?),
                2 => {
                    let code = wire::read_u64_le(reader).await?;
                    return Err(Error::ColumnValue { code });
                }
                other => {
                    return Err(Error::Decode(format!(
                        "unexpected value status byte: {other}"
                    )))
                }
            }
        }

        let mut row = Row::new(values, self.column_names.to_vec());
        if let Some(id) = record_id {
            row = row.with_record_id(id);
        }
        Ok(row)
    }

    /// Decode a full page of rows from the stream
    pub async fn decode_page<R>(&self, reader: &mut R, rows: u32) -> Result<Vec<Row>>
    where
        R: AsyncRead + Unpin,
    {
        let mut page = Vec::with_capacity(rows as usize);
        for _ in 0..rows {
            page.push(self.decode_row(reader).await?);
        }
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person_row() -> Row {
        Row::new(
            vec![Value::Integer(42), Value::String("ABCD".into())],
            vec!["id".into(), "name".into()],
        )
    }

    #[test]
    fn test_value_accessors() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::Integer(7).as_i64(), Some(7));
        assert_eq!(Value::Integer(7).as_f64(), Some(7.0));
        assert_eq!(Value::Float(1.5).as_i64(), Some(1));
        assert_eq!(Value::Boolean(true).as_bool(), Some(true));
        assert_eq!(Value::Integer(0).as_bool(), Some(false));
        assert_eq!(Value::String("x".into()).as_str(), Some("x"));
        assert_eq!(Value::DateTime("04.03.2020".into()).as_str(), Some("04.03.2020"));
        assert_eq!(Value::String("x".into()).as_i64(), None);
    }

    #[test]
    fn test_value_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(5i64)), Value::Integer(5));
    }

    #[test]
    fn test_row_access() {
        let row = person_row();
        assert_eq!(row.len(), 2);
        assert_eq!(row.get_i64(0), Some(42));
        assert_eq!(row.get_string(1), Some("ABCD"));
        assert_eq!(row.get_by_name("name"), Some(&Value::String("ABCD".into())));
        assert_eq!(row.get_by_name("NAME"), Some(&Value::String("ABCD".into())));
        assert_eq!(row.get_by_name("missing"), None);
        assert_eq!(row[0], Value::Integer(42));
        assert!(row.record_id().is_none());
    }

    #[test]
    fn test_numeric_and_assoc_projections_agree() {
        let row = person_row();
        let numeric = match row.clone().project(FetchStyle::Numeric) {
            Fetched::Numeric(values) => values,
            other => panic!("wrong projection: {other:?}"),
        };
        let assoc = match row.clone().project(FetchStyle::Assoc) {
            Fetched::Assoc(map) => map,
            other => panic!("wrong projection: {other:?}"),
        };
        for (index, name) in row.column_names().iter().enumerate() {
            assert_eq!(&numeric[index], &assoc[name.as_str()]);
        }
    }

    #[test]
    fn test_record_id_never_projected() {
        let row = person_row().with_record_id(9);
        assert_eq!(row.record_id(), Some(9));
        let assoc = row.clone().into_assoc();
        assert_eq!(assoc.len(), 2);
        assert!(!assoc.contains_key("_ID"));
        let Fetched::Numeric(values) = row.project(FetchStyle::Numeric) else {
            panic!("wrong projection");
        };
        assert_eq!(values.len(), 2);
    }

    #[tokio::test]
    async fn test_decode_row_with_record_id_prefix() {
        let names = vec!["id".to_string()];
        let types = vec![SqlType::Long];
        let decoder = RowDecoder::new(&names, &types, true);

        let mut frame = Vec::new();
        frame.push(0x00); // skip byte
        frame.extend_from_slice(&77u32.to_le_bytes()); // record id
        frame.push(0x01); // value follows
        frame.extend_from_slice(&5u32.to_le_bytes());
        let mut data: &[u8] = &frame;

        let row = decoder.decode_row(&mut data).await.unwrap();
        assert_eq!(row.record_id(), Some(77));
        assert_eq!(row.get_i64(0), Some(5));
    }

    #[tokio::test]
    async fn test_decode_row_null_status() {
        let names = vec!["a".to_string(), "b".to_string()];
        let types = vec![SqlType::Long, SqlType::Long];
        let decoder = RowDecoder::new(&names, &types, false);

        let mut frame = Vec::new();
        frame.push(0x00); // a is null
        frame.push(0x01);
        frame.extend_from_slice(&3u32.to_le_bytes());
        let mut data: &[u8] = &frame;

        let row = decoder.decode_row(&mut data).await.unwrap();
        assert!(row.is_null(0));
        assert_eq!(row.get_i64(1), Some(3));
    }

    #[tokio::test]
    async fn test_decode_row_error_marker() {
        let names = vec!["a".to_string()];
        let types = vec![SqlType::Long];
        let decoder = RowDecoder::new(&names, &types, false);

        let mut frame = Vec::new();
        frame.push(0x02);
        frame.extend_from_slice(&0xDEAD_BEEFu64.to_le_bytes());
        let mut data: &[u8] = &frame;

        let err = decoder.decode_row(&mut data).await.unwrap_err();
        assert!(matches!(err, Error::ColumnValue { code: 0xDEAD_BEEF }));
    }
}
