//! Reading paired data files.

use chrono::{Datelike, Timelike};
use pds_index_core::error::IndexError;
use pds_index_core::label::IndexLabel;
use pds_index_core::table::{self, ReadOptions, Value};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use super::helpers::{write_index, SAMPLE_LABEL, SAMPLE_ROWS};

#[test]
fn test_read_sample_index() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let label = IndexLabel::load(write_index(dir.path(), SAMPLE_LABEL, SAMPLE_ROWS))?;

    let table = label.read_table(&ReadOptions::default())?;
    assert_eq!(table.n_rows(), 2);
    assert_eq!(
        table.column_names(),
        vec!["ID", "VALS_1", "VALS_2", "START_TIME", "LOCAL_TIME"]
    );

    let row = table.row(0).expect("first row");
    assert_eq!(row[0], Value::Text("00001"));
    assert_eq!(row[1], Value::Text("AAAA"));
    assert_eq!(row[2], Value::Text("BBBB"));
    assert_eq!(row[4], Value::Text("10:30:00"));

    let start = table
        .column("START_TIME")
        .and_then(|c| c.as_time())
        .expect("START_TIME converted");
    let first = start[0].expect("first start time");
    assert_eq!((first.month(), first.day()), (2, 14));
    assert_eq!(first.nanosecond(), 250_000_000);
    let second = start[1].expect("second start time");
    assert_eq!(second.ordinal(), 46);
    Ok(())
}

#[test]
fn test_raw_times_stay_text() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let label = IndexLabel::load(write_index(dir.path(), SAMPLE_LABEL, SAMPLE_ROWS))?;

    let table = table::read(
        label.data_file_path(),
        &label.column_names(),
        &label.column_byte_ranges(),
        false,
    )?;
    assert_eq!(
        table.column("START_TIME").and_then(|c| c.as_text()).map(|v| v.to_vec()),
        Some(vec![
            "2016-045T12:00:00.250".to_string(),
            "2016-046T00:00:00".to_string()
        ])
    );
    Ok(())
}

#[test]
fn test_missing_data_file() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let label_path = dir.path().join("SAMPLE_INDEX.LBL");
    std::fs::write(&label_path, SAMPLE_LABEL)?;
    let label = IndexLabel::load(&label_path)?;

    let err = label.read_table(&ReadOptions::default()).unwrap_err();
    assert_eq!(
        err,
        IndexError::FileNotFound {
            path: dir.path().join("SAMPLE_INDEX.TAB")
        }
    );
    Ok(())
}

#[test]
fn test_bad_time_names_column_and_value() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let rows = "00001AAAA BBBB not-a-date            10:30:00\n";
    let label = IndexLabel::load(write_index(dir.path(), SAMPLE_LABEL, rows))?;

    let err = label.read_table(&ReadOptions::default()).unwrap_err();
    assert_eq!(
        err,
        IndexError::TimeParse {
            column: "START_TIME".into(),
            value: "not-a-date".into()
        }
    );
    Ok(())
}

#[test]
fn test_padded_fields_round_trip() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let label = IndexLabel::load(write_index(dir.path(), SAMPLE_LABEL, SAMPLE_ROWS))?;
    let options = ReadOptions {
        normalize_times: false,
        trim_values: false,
        ..ReadOptions::default()
    };
    let table = label.read_table(&options)?;

    let width = label.record_width();
    for (line, row) in SAMPLE_ROWS.lines().zip(table.rows()) {
        let mut rebuilt = vec![b' '; width];
        for (range, value) in label.column_byte_ranges().iter().zip(&row) {
            let text = value.to_string();
            rebuilt[range.start..range.start + text.len()].copy_from_slice(text.as_bytes());
        }
        assert_eq!(String::from_utf8(rebuilt)?, line);
    }
    Ok(())
}
