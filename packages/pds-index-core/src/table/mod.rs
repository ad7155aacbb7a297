//! Decoded index tables.
//!
//! A [`Table`] is column oriented: every column holds one value per line of
//! the data file. Columns start out as raw text; time columns may later be
//! replaced by parsed timestamps (see [`normalize_times`]).

pub mod reader;
pub mod times;

use std::fmt;

use chrono::NaiveDateTime;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::{IndexError, Result};

pub use reader::{parse_lines, read, read_index_collection, read_with_options, ReadOptions};
pub use times::normalize_times;

/// Column holding the source file name in combined tables.
pub const INDEX_FNAME_COLUMN: &str = "INDEX_FNAME";

/// Values of one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Text(Vec<String>),
    Time(Vec<Option<NaiveDateTime>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.len(),
            ColumnData::Time(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_time(&self) -> bool {
        matches!(self, ColumnData::Time(_))
    }

    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            ColumnData::Text(v) => Some(v),
            ColumnData::Time(_) => None,
        }
    }

    pub fn as_time(&self) -> Option<&[Option<NaiveDateTime>]> {
        match self {
            ColumnData::Time(v) => Some(v),
            ColumnData::Text(_) => None,
        }
    }

    fn value(&self, row: usize) -> Option<Value<'_>> {
        match self {
            ColumnData::Text(v) => v.get(row).map(|s| Value::Text(s)),
            ColumnData::Time(v) => v.get(row).map(|t| Value::Time(*t)),
        }
    }

    fn extend(&mut self, other: ColumnData) -> bool {
        match (self, other) {
            (ColumnData::Text(a), ColumnData::Text(b)) => a.extend(b),
            (ColumnData::Time(a), ColumnData::Time(b)) => a.extend(b),
            _ => return false,
        }
        true
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// One cell of a table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value<'a> {
    Text(&'a str),
    Time(Option<NaiveDateTime>),
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Time(Some(t)) => write!(f, "{}", t.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Time(None) => Ok(()),
        }
    }
}

/// Ordered named columns of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table, checking that every column has the same length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut table = Self::new();
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    /// Appends a column. The first column fixes the row count.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if self.columns.is_empty() {
            self.n_rows = column.data.len();
        } else if column.data.len() != self.n_rows {
            return Err(IndexError::SchemaMismatch {
                expected: vec![format!("{} rows", self.n_rows)],
                got: vec![format!("{} rows in '{}'", column.data.len(), column.name)],
            });
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn push_text_column(&mut self, name: impl Into<String>, values: Vec<String>) -> Result<()> {
        self.push_column(Column {
            name: name.into(),
            data: ColumnData::Text(values),
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.data)
    }

    /// Values of row `index`, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<Value<'_>>> {
        if index >= self.n_rows {
            return None;
        }
        self.columns.iter().map(|c| c.data.value(index)).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<Value<'_>>> + '_ {
        (0..self.n_rows).filter_map(move |i| self.row(i))
    }

    /// Record view over at most `limit` rows.
    pub fn records(&self, limit: Option<usize>) -> Records<'_> {
        Records {
            table: self,
            n_rows: limit.map_or(self.n_rows, |n| n.min(self.n_rows)),
        }
    }

    /// Concatenates tables with identical column names and kinds.
    pub fn concat(tables: Vec<Table>) -> Result<Table> {
        let mut tables = tables.into_iter();
        let mut combined = match tables.next() {
            Some(t) => t,
            None => return Ok(Table::new()),
        };

        for table in tables {
            let expected: Vec<String> = combined.columns.iter().map(|c| c.name.clone()).collect();
            let got: Vec<String> = table.columns.iter().map(|c| c.name.clone()).collect();
            if expected != got {
                return Err(IndexError::SchemaMismatch { expected, got });
            }
            let added = table.n_rows;
            for (dst, src) in combined.columns.iter_mut().zip(table.columns) {
                if !dst.data.extend(src.data) {
                    return Err(IndexError::SchemaMismatch {
                        expected: vec![format!("'{}' with matching value kind", dst.name)],
                        got: vec![format!("'{}' with a different value kind", dst.name)],
                    });
                }
            }
            combined.n_rows += added;
        }
        Ok(combined)
    }
}

struct RowRef<'a> {
    table: &'a Table,
    index: usize,
}

impl Serialize for RowRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.table.columns.len()))?;
        for column in &self.table.columns {
            if let Some(value) = column.data.value(self.index) {
                map.serialize_entry(&column.name, &value)?;
            }
        }
        map.end()
    }
}

/// The first rows of a table, serialized as records.
pub struct Records<'a> {
    table: &'a Table,
    n_rows: usize,
}

impl Serialize for Records<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.n_rows))?;
        for index in 0..self.n_rows {
            seq.serialize_element(&RowRef {
                table: self.table,
                index,
            })?;
        }
        seq.end()
    }
}

/// Serializes as a sequence of records, keys in column order.
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.records(None).serialize(serializer)
    }
}
