//! Fixed-width table reader.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

#[cfg(feature = "mmap")]
use memmap2::Mmap;

use super::{normalize_times, Column, ColumnData, Table, INDEX_FNAME_COLUMN};
use crate::error::{classify_io_error, IndexError, Result};
use crate::label::{slice_line, IndexLabel};

/// Options controlling how data lines become table values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Convert time columns to timestamps
    pub normalize_times: bool,
    /// Strip surrounding whitespace from every value
    pub trim_values: bool,
    /// Ignore lines that contain only whitespace
    pub skip_blank_lines: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            normalize_times: true,
            trim_values: true,
            skip_blank_lines: true,
        }
    }
}

/// Reads a fixed-width data file with the given column layout.
pub fn read(
    data_path: impl AsRef<Path>,
    column_names: &[String],
    byte_ranges: &[Range<usize>],
    normalize_times: bool,
) -> Result<Table> {
    let options = ReadOptions {
        normalize_times,
        ..ReadOptions::default()
    };
    read_with_options(data_path, column_names, byte_ranges, &options)
}

pub fn read_with_options(
    data_path: impl AsRef<Path>,
    column_names: &[String],
    byte_ranges: &[Range<usize>],
    options: &ReadOptions,
) -> Result<Table> {
    let data_path = data_path.as_ref();
    let bytes = load_bytes(data_path)?;
    let table = parse_lines(&bytes, column_names, byte_ranges, options)?;
    tracing::debug!(
        "Read {} rows x {} columns from {}",
        table.n_rows(),
        table.n_columns(),
        data_path.display()
    );
    Ok(table)
}

#[cfg(not(feature = "mmap"))]
fn load_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| classify_io_error(e, path))
}

#[cfg(feature = "mmap")]
fn load_bytes(path: &Path) -> Result<Mmap> {
    let file = fs::File::open(path).map_err(|e| classify_io_error(e, path))?;
    // Index files are treated as read-only input for the duration of the read.
    let mmap = unsafe { Mmap::map(&file).map_err(|e| classify_io_error(e, path))? };
    Ok(mmap)
}

/// Slices raw file content into a table.
///
/// Lines end at `\n`, with an optional `\r` removed. Ranges past the end of
/// a short line produce truncated or empty values.
pub fn parse_lines(
    content: &[u8],
    column_names: &[String],
    byte_ranges: &[Range<usize>],
    options: &ReadOptions,
) -> Result<Table> {
    if column_names.len() != byte_ranges.len() {
        return Err(IndexError::parse(format!(
            "{} column names but {} byte ranges",
            column_names.len(),
            byte_ranges.len()
        )));
    }

    let mut values: Vec<Vec<String>> = vec![Vec::new(); column_names.len()];
    let content = content.strip_suffix(b"\n").unwrap_or(content);
    let lines = content
        .split(|&b| b == b'\n')
        .take(if content.is_empty() { 0 } else { usize::MAX });
    for line in lines {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if options.skip_blank_lines && line.iter().all(|b| b.is_ascii_whitespace()) {
            continue;
        }
        for (column, range) in values.iter_mut().zip(byte_ranges) {
            let value = slice_line(line, range);
            column.push(if options.trim_values {
                value.trim().to_string()
            } else {
                value
            });
        }
    }

    let mut table = Table::from_columns(
        column_names
            .iter()
            .cloned()
            .zip(values)
            .map(|(name, v)| Column {
                name,
                data: ColumnData::Text(v),
            })
            .collect(),
    )?;

    if options.normalize_times {
        normalize_times(&mut table)?;
    }
    Ok(table)
}

/// Data files (`*.tab`, any case) in `dir`, sorted by name.
fn index_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| classify_io_error(e, dir))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| classify_io_error(e, dir))?.path();
        let is_table = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tab"));
        if is_table && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Reads every index file in `dir` with one label and stacks the rows.
///
/// An `INDEX_FNAME` column records each row's source file. Times are
/// converted once, on the combined table.
pub fn read_index_collection(
    dir: impl AsRef<Path>,
    label: &IndexLabel,
    options: &ReadOptions,
) -> Result<Table> {
    let dir = dir.as_ref();
    let files = index_files(dir)?;
    if files.is_empty() {
        return Err(IndexError::Lookup(format!(
            "No .tab files found in {}",
            dir.display()
        )));
    }

    let names = label.column_names();
    let ranges = label.column_byte_ranges();
    let per_file = ReadOptions {
        normalize_times: false,
        ..*options
    };

    let mut tables = Vec::with_capacity(files.len());
    for file in &files {
        let mut table = read_with_options(file, &names, &ranges, &per_file)?;
        let fname = file.display().to_string();
        table.push_text_column(INDEX_FNAME_COLUMN, vec![fname; table.n_rows()])?;
        tables.push(table);
    }

    let mut combined = Table::concat(tables)?;
    tracing::info!(
        "Combined {} index files into {} rows",
        files.len(),
        combined.n_rows()
    );
    if options.normalize_times {
        normalize_times(&mut combined)?;
    }
    Ok(combined)
}
