//! Label loading from disk.

use std::path::PathBuf;

use pds_index_core::error::IndexError;
use pds_index_core::label::{ColumnDescriptor, IndexLabel, ItemLayout};
use tempfile::tempdir;

use super::helpers::{write_index, SAMPLE_LABEL, SAMPLE_ROWS};

#[test]
fn test_load_sample_label() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let label_path = write_index(dir.path(), SAMPLE_LABEL, SAMPLE_ROWS);

    let label = IndexLabel::load(&label_path)?;
    assert_eq!(label.table_name(), "INDEX_TABLE");
    assert_eq!(
        label.column_names(),
        vec!["ID", "VALS_1", "VALS_2", "START_TIME", "LOCAL_TIME"]
    );
    assert_eq!(
        label.column_byte_ranges(),
        vec![0..5, 5..9, 10..14, 15..36, 37..45]
    );
    assert_eq!(label.data_file_path(), dir.path().join("SAMPLE_INDEX.TAB"));

    let start = label.column("START_TIME").expect("START_TIME declared");
    assert_eq!(
        start.description.as_deref(),
        Some("Observation start, in day-of-year format.")
    );
    Ok(())
}

#[test]
fn test_data_path_ignores_working_directory() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let nested = dir.path().join("volumes").join("index");
    std::fs::create_dir_all(&nested)?;
    let label_path = write_index(&nested, SAMPLE_LABEL, SAMPLE_ROWS);

    let label = IndexLabel::load(&label_path)?;
    assert_eq!(label.data_file_path(), nested.join("SAMPLE_INDEX.TAB"));
    Ok(())
}

#[test]
fn test_missing_label_file() {
    let err = IndexLabel::load("/nonexistent/dir/INDEX.LBL").unwrap_err();
    assert_eq!(
        err,
        IndexError::FileNotFound {
            path: PathBuf::from("/nonexistent/dir/INDEX.LBL")
        }
    );
}

#[test]
fn test_label_without_pointer() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let text = SAMPLE_LABEL.replace("^INDEX_TABLE = \"SAMPLE_INDEX.TAB\"\n", "");
    let label_path = write_index(dir.path(), &text, SAMPLE_ROWS);

    let err = IndexLabel::load(&label_path).unwrap_err();
    assert!(matches!(err, IndexError::Lookup(_)));
    Ok(())
}

#[test]
fn test_malformed_label_fails_before_data_is_read() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let label_path = dir.path().join("BROKEN.LBL");
    std::fs::write(&label_path, "^INDEX_TABLE = \"MISSING.TAB\"\nOBJECT = INDEX_TABLE\n")?;

    let err = IndexLabel::load(&label_path).unwrap_err();
    assert!(matches!(err, IndexError::Parse { .. }));
    Ok(())
}

#[test]
fn test_scalar_and_repeated_properties() {
    for start_byte in 1..20usize {
        for byte_count in 1..10usize {
            let scalar = ColumnDescriptor::scalar("X", start_byte, byte_count);
            assert_eq!(
                scalar.expanded_ranges(),
                vec![start_byte - 1..start_byte - 1 + byte_count]
            );
        }
    }

    let repeated = ColumnDescriptor::repeated(
        "VALS",
        6,
        9,
        ItemLayout {
            items: 3,
            item_bytes: 2,
            item_offset: 3,
        },
    );
    assert_eq!(repeated.expanded_names(), vec!["VALS_1", "VALS_2", "VALS_3"]);
    let starts: Vec<usize> = repeated.expanded_ranges().iter().map(|r| r.start).collect();
    assert_eq!(starts, vec![5, 8, 11]);
}
