//! Label files of PDS index tables.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use super::column::{ColumnDescriptor, ColumnSpec, Decoded};
use super::pvl::{self, PvlModule, PvlValue};
use crate::error::{classify_io_error, IndexError, Result};
use crate::table::{self, ReadOptions, Table};

/// Key prefix marking a pointer to a data object.
pub const POINTER_MARKER: char = '^';

/// Column layout of a PDS index table, read from its label file.
///
/// The table itself is expected next to the label; the pointer entry
/// (`^INDEX_TABLE = "INDEX.TAB"`) names the file and the object describing
/// its columns.
#[derive(Debug, Clone)]
pub struct IndexLabel {
    path: PathBuf,
    table_name: String,
    data_file_name: String,
    columns: Vec<ColumnDescriptor>,
    document: PvlModule,
}

impl IndexLabel {
    /// Reads and parses a label file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| classify_io_error(e, path))?;
        let text = String::from_utf8_lossy(&bytes);
        let label = Self::parse(&text, path)?;
        tracing::debug!(
            "Loaded label {} with {} columns ({} expanded)",
            path.display(),
            label.columns.len(),
            label.column_names().len()
        );
        Ok(label)
    }

    /// Parses label text as if it had been read from `path`.
    pub fn parse(text: &str, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = pvl::parse(text)?;

        let (table_name, data_file_name) = {
            let mut pointers = document
                .iter()
                .filter(|(key, _)| key.starts_with(POINTER_MARKER));
            let (pointer_key, pointer_value) = pointers.next().ok_or_else(|| {
                IndexError::Lookup(format!(
                    "No table pointer ('{}' entry) found in {}",
                    POINTER_MARKER,
                    path.display()
                ))
            })?;
            if let Some((extra, _)) = pointers.next() {
                tracing::warn!(
                    "Label {} has several pointers, using {} and ignoring {}",
                    path.display(),
                    pointer_key,
                    extra
                );
            }

            let file_name = pointer_file_name(pointer_value).ok_or_else(|| {
                IndexError::Lookup(format!(
                    "Pointer {} does not name a file: {}",
                    pointer_key, pointer_value
                ))
            })?;
            (
                pointer_key.trim_start_matches(POINTER_MARKER).to_string(),
                file_name,
            )
        };

        let columns = {
            let table = document
                .get(&table_name)
                .filter(|v| v.is_object())
                .and_then(|v| v.as_module())
                .ok_or_else(|| {
                    IndexError::Lookup(format!("Table object '{}' not found in label", table_name))
                })?;

            table
                .get_all("COLUMN")
                .map(|block| {
                    block
                        .as_module()
                        .ok_or_else(|| IndexError::parse("COLUMN entry is not an object"))
                        .and_then(ColumnDescriptor::from_pvl)
                })
                .collect::<Result<Vec<_>>>()?
        };

        Ok(Self {
            path,
            table_name,
            data_file_name,
            columns,
            document,
        })
    }

    /// Path the label was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the table object, e.g. `INDEX_TABLE`.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// The full parsed label.
    pub fn document(&self) -> &PvlModule {
        &self.document
    }

    /// Declared columns, before expansion.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Looks up a declared column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().flat_map(|c| c.expanded_names()).collect()
    }

    pub fn column_byte_ranges(&self) -> Vec<Range<usize>> {
        self.columns.iter().flat_map(|c| c.expanded_ranges()).collect()
    }

    /// Expanded names paired with their ranges.
    pub fn column_specs(&self) -> Vec<ColumnSpec> {
        self.columns.iter().flat_map(|c| c.expand()).collect()
    }

    /// Largest stop offset of any expanded column.
    pub fn record_width(&self) -> usize {
        self.column_byte_ranges()
            .iter()
            .map(|r| r.end)
            .max()
            .unwrap_or(0)
    }

    /// Data file path, resolved against the label's directory.
    pub fn data_file_path(&self) -> PathBuf {
        match self.path.parent() {
            Some(dir) => dir.join(&self.data_file_name),
            None => PathBuf::from(&self.data_file_name),
        }
    }

    /// Decodes one data line column by column, in declaration order.
    pub fn decode_line(&self, line: &str) -> Vec<(String, Decoded)> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.decode(line)))
            .collect()
    }

    /// Reads the paired data file.
    pub fn read_table(&self, options: &ReadOptions) -> Result<Table> {
        table::read_with_options(
            self.data_file_path(),
            &self.column_names(),
            &self.column_byte_ranges(),
            options,
        )
    }
}

/// File name a pointer refers to: either a plain string or the first
/// element of a `("FILE.TAB", record)` sequence.
fn pointer_file_name(value: &PvlValue) -> Option<String> {
    match value {
        PvlValue::Text(s) | PvlValue::Symbol(s) | PvlValue::Identifier(s) => Some(s.clone()),
        PvlValue::Sequence(items) => items.first().and_then(|v| v.as_str()).map(|s| s.to_string()),
        _ => None,
    }
}
