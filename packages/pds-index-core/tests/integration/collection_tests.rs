//! Folder collections and HiRISE repair.

use std::fs;

use pds_index_core::error::IndexError;
use pds_index_core::label::IndexLabel;
use pds_index_core::repair::fix_hirise_edrcumindex;
use pds_index_core::table::{read_index_collection, ReadOptions, INDEX_FNAME_COLUMN};
use tempfile::tempdir;

use super::helpers::{SAMPLE_LABEL, SAMPLE_ROWS};

#[test]
fn test_collection_stacks_files() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let label_path = dir.path().join("CUMINDEX.LBL");
    fs::write(&label_path, SAMPLE_LABEL)?;
    fs::write(dir.path().join("COISS_2001.tab"), SAMPLE_ROWS)?;
    fs::write(dir.path().join("COISS_2002.TAB"), SAMPLE_ROWS)?;
    fs::write(dir.path().join("notes.txt"), "not an index")?;

    let label = IndexLabel::load(&label_path)?;
    let table = read_index_collection(dir.path(), &label, &ReadOptions::default())?;

    assert_eq!(table.n_rows(), 4);
    let fnames = table
        .column(INDEX_FNAME_COLUMN)
        .and_then(|c| c.as_text())
        .expect("file name column");
    assert!(fnames[0].ends_with("COISS_2001.tab"));
    assert!(fnames[3].ends_with("COISS_2002.TAB"));
    assert!(table.column("START_TIME").is_some_and(|c| c.is_time()));
    Ok(())
}

#[test]
fn test_empty_collection() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let label = IndexLabel::parse(SAMPLE_LABEL, dir.path().join("CUMINDEX.LBL"))?;
    let err = read_index_collection(dir.path(), &label, &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, IndexError::Lookup(_)));
    Ok(())
}

#[test]
fn test_fix_hirise_edrcumindex() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let line = |exposure: &str| {
        let mut fields: Vec<String> = (0..30).map(|i| format!("\"F{}\"", i)).collect();
        fields[21] = exposure.to_string();
        fields.join(",")
    };
    let input = dir.path().join("EDRCUMINDEX.TAB");
    let output = dir.path().join("EDRCUMINDEX_FIXED.TAB");
    fs::write(
        &input,
        format!("{}\r\n{}\r\n", line(" 1234.5678"), line("20000.0000")),
    )?;

    let repaired = fix_hirise_edrcumindex(&input, &output)?;
    assert_eq!(repaired, 1);
    assert_eq!(
        fs::read_to_string(&output)?,
        format!("{}\r\n{}\r\n", line(" 1234.5678"), line("20000.000"))
    );
    Ok(())
}
