//! Column descriptors declared by `OBJECT = COLUMN` blocks.

use std::ops::Range;

use serde::Serialize;

use super::pvl::PvlModule;
use crate::error::{IndexError, Result};

/// Repeat layout of an array column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemLayout {
    /// Number of sub-fields
    pub items: usize,
    /// Width of each sub-field in bytes
    pub item_bytes: usize,
    /// Distance between the starts of successive sub-fields
    pub item_offset: usize,
}

/// One declared field of an index table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// 1-indexed start byte as written in the label
    pub start_byte: usize,
    pub byte_count: usize,
    pub repeat: Option<ItemLayout>,
    pub data_type: Option<String>,
    pub unit: Option<String>,
    pub description: Option<String>,
}

/// One flattened column: an expanded name and its half-open byte range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    pub range: Range<usize>,
}

/// Value(s) of one declared column sliced out of a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Decoded {
    Scalar(String),
    Items(Vec<String>),
}

impl ColumnDescriptor {
    /// Creates a scalar column.
    pub fn scalar(name: impl Into<String>, start_byte: usize, byte_count: usize) -> Self {
        Self {
            name: name.into(),
            start_byte,
            byte_count,
            repeat: None,
            data_type: None,
            unit: None,
            description: None,
        }
    }

    /// Creates a repeated column.
    pub fn repeated(
        name: impl Into<String>,
        start_byte: usize,
        byte_count: usize,
        repeat: ItemLayout,
    ) -> Self {
        Self {
            repeat: Some(repeat),
            ..Self::scalar(name, start_byte, byte_count)
        }
    }

    /// Builds a descriptor from a `COLUMN` block.
    pub fn from_pvl(block: &PvlModule) -> Result<Self> {
        let name = block
            .get("NAME")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| IndexError::parse("Column missing 'NAME'"))?;

        let start_byte = required_count(block, &name, "START_BYTE")?;
        if start_byte < 1 {
            return Err(IndexError::parse(format!(
                "Column '{}' has START_BYTE {}, byte positions start at 1",
                name, start_byte
            )));
        }
        let byte_count = required_count(block, &name, "BYTES")?;

        let repeat = match optional_count(block, &name, "ITEMS")? {
            None => None,
            Some(0) => {
                return Err(IndexError::parse(format!(
                    "Column '{}' declares ITEMS = 0",
                    name
                )))
            }
            Some(items) => {
                let item_bytes = optional_count(block, &name, "ITEM_BYTES")?.ok_or_else(|| {
                    IndexError::parse(format!("Column '{}' has ITEMS but no ITEM_BYTES", name))
                })?;
                let item_offset = optional_count(block, &name, "ITEM_OFFSET")?.ok_or_else(|| {
                    IndexError::parse(format!("Column '{}' has ITEMS but no ITEM_OFFSET", name))
                })?;
                Some(ItemLayout {
                    items,
                    item_bytes,
                    item_offset,
                })
            }
        };

        check_extent(&name, start_byte, byte_count, repeat.as_ref())?;

        let text = |key: &str| block.get(key).and_then(|v| v.as_str()).map(|s| s.to_string());

        Ok(Self {
            data_type: text("DATA_TYPE"),
            unit: text("UNIT"),
            description: text("DESCRIPTION"),
            name,
            start_byte,
            byte_count,
            repeat,
        })
    }

    /// 0-indexed start offset.
    pub fn start(&self) -> usize {
        self.start_byte - 1
    }

    /// Declared range of the whole column.
    pub fn byte_range(&self) -> Range<usize> {
        self.start()..self.start() + self.byte_count
    }

    pub fn is_repeated(&self) -> bool {
        self.repeat.is_some()
    }

    /// Column names after expanding repeated columns into `NAME_1..NAME_n`.
    pub fn expanded_names(&self) -> Vec<String> {
        match &self.repeat {
            None => vec![self.name.clone()],
            Some(r) => (1..=r.items).map(|i| format!("{}_{}", self.name, i)).collect(),
        }
    }

    /// Byte ranges matching [`expanded_names`](Self::expanded_names).
    pub fn expanded_ranges(&self) -> Vec<Range<usize>> {
        match &self.repeat {
            None => vec![self.byte_range()],
            Some(r) => (0..r.items)
                .map(|i| {
                    let offset = self.start() + i * r.item_offset;
                    offset..offset + r.item_bytes
                })
                .collect(),
        }
    }

    pub fn expand(&self) -> Vec<ColumnSpec> {
        self.expanded_names()
            .into_iter()
            .zip(self.expanded_ranges())
            .map(|(name, range)| ColumnSpec { name, range })
            .collect()
    }

    /// Slices this column out of one data line.
    pub fn decode(&self, line: &str) -> Decoded {
        let mut values: Vec<String> = self
            .expanded_ranges()
            .into_iter()
            .map(|range| slice_line(line.as_bytes(), &range))
            .collect();
        if self.is_repeated() {
            Decoded::Items(values)
        } else {
            Decoded::Scalar(values.pop().unwrap_or_default())
        }
    }
}

/// Extracts `range` from a line, truncating at the line end instead of failing.
pub fn slice_line(line: &[u8], range: &Range<usize>) -> String {
    let stop = range.end.min(line.len());
    let start = range.start.min(stop);
    String::from_utf8_lossy(&line[start..stop]).into_owned()
}

fn optional_count(block: &PvlModule, column: &str, key: &str) -> Result<Option<usize>> {
    match block.get(key) {
        None => Ok(None),
        Some(value) => {
            let raw = value.as_integer().ok_or_else(|| {
                IndexError::parse(format!(
                    "Column '{}': {} must be an integer, got {}",
                    column, key, value
                ))
            })?;
            usize::try_from(raw).map(Some).map_err(|_| {
                IndexError::parse(format!(
                    "Column '{}': {} must not be negative, got {}",
                    column, key, raw
                ))
            })
        }
    }
}

/// Rejects layouts whose last byte offset does not fit in `usize`.
fn check_extent(
    column: &str,
    start_byte: usize,
    byte_count: usize,
    repeat: Option<&ItemLayout>,
) -> Result<()> {
    let start = start_byte - 1;
    let declared_end = start.checked_add(byte_count);
    let items_end = match repeat {
        None => Some(0),
        Some(r) => (r.items - 1)
            .checked_mul(r.item_offset)
            .and_then(|offset| offset.checked_add(start))
            .and_then(|offset| offset.checked_add(r.item_bytes)),
    };
    match (declared_end, items_end) {
        (Some(_), Some(_)) => Ok(()),
        _ => Err(IndexError::parse(format!(
            "Column '{}' extends past the addressable byte range",
            column
        ))),
    }
}

fn required_count(block: &PvlModule, column: &str, key: &str) -> Result<usize> {
    optional_count(block, column, key)?
        .ok_or_else(|| IndexError::parse(format!("Column '{}' missing '{}'", column, key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::pvl;

    fn column_block(text: &str) -> PvlModule {
        let label = pvl::parse(&format!("OBJECT = COLUMN\n{}\nEND_OBJECT = COLUMN\n", text)).unwrap();
        label.get("COLUMN").and_then(|v| v.as_module()).unwrap().clone()
    }

    #[test]
    fn test_scalar_column() -> Result<()> {
        let col = ColumnDescriptor::from_pvl(&column_block(
            "NAME = FILE_NAME\nDATA_TYPE = CHARACTER\nSTART_BYTE = 14\nBYTES = 25",
        ))?;
        assert_eq!(col.expanded_names(), vec!["FILE_NAME"]);
        assert_eq!(col.expanded_ranges(), vec![13..38]);
        assert_eq!(col.data_type.as_deref(), Some("CHARACTER"));
        assert!(!col.is_repeated());
        Ok(())
    }

    #[test]
    fn test_repeated_column() -> Result<()> {
        let col = ColumnDescriptor::from_pvl(&column_block(
            "NAME = VALS\nSTART_BYTE = 6\nBYTES = 9\nITEMS = 2\nITEM_BYTES = 4\nITEM_OFFSET = 5",
        ))?;
        assert_eq!(col.expanded_names(), vec!["VALS_1", "VALS_2"]);
        assert_eq!(col.expanded_ranges(), vec![5..9, 10..14]);
        assert_eq!(
            col.decode("00001AAAA BBBB"),
            Decoded::Items(vec!["AAAA".into(), "BBBB".into()])
        );
        Ok(())
    }

    #[test]
    fn test_repeated_ranges_follow_stride() {
        for items in 1..6usize {
            let col = ColumnDescriptor::repeated(
                "X",
                3,
                items * 7,
                ItemLayout {
                    items,
                    item_bytes: 6,
                    item_offset: 7,
                },
            );
            let ranges = col.expanded_ranges();
            assert_eq!(ranges.len(), items);
            assert_eq!(col.expanded_names().len(), items);
            for (i, range) in ranges.iter().enumerate() {
                assert_eq!(range.start, 2 + i * 7);
                assert_eq!(range.end - range.start, 6);
            }
        }
    }

    #[test]
    fn test_missing_item_offset_is_rejected() {
        let err = ColumnDescriptor::from_pvl(&column_block(
            "NAME = VALS\nSTART_BYTE = 6\nBYTES = 9\nITEMS = 2\nITEM_BYTES = 4",
        ))
        .unwrap_err();
        assert!(matches!(err, IndexError::Parse { .. }));
    }

    #[test]
    fn test_zero_items_is_rejected() {
        let err = ColumnDescriptor::from_pvl(&column_block(
            "NAME = VALS\nSTART_BYTE = 6\nBYTES = 9\nITEMS = 0\nITEM_BYTES = 4\nITEM_OFFSET = 5",
        ))
        .unwrap_err();
        assert!(matches!(err, IndexError::Parse { .. }));
    }

    #[test]
    fn test_overflowing_layout_is_rejected() {
        let err = ColumnDescriptor::from_pvl(&column_block(&format!(
            "NAME = VALS\nSTART_BYTE = 2\nBYTES = 12\nITEMS = 3\nITEM_BYTES = 4\nITEM_OFFSET = {}",
            i64::MAX
        )))
        .unwrap_err();
        assert!(matches!(err, IndexError::Parse { .. }));
    }

    #[test]
    fn test_zero_start_byte_is_rejected() {
        let err = ColumnDescriptor::from_pvl(&column_block("NAME = ID\nSTART_BYTE = 0\nBYTES = 5"))
            .unwrap_err();
        assert!(matches!(err, IndexError::Parse { .. }));
    }

    #[test]
    fn test_short_line_truncates() {
        let col = ColumnDescriptor::scalar("ID", 4, 10);
        assert_eq!(col.decode("abcdef"), Decoded::Scalar("def".into()));
        assert_eq!(col.decode("ab"), Decoded::Scalar(String::new()));
    }
}
