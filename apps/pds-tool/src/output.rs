//! Rendering of layouts and tables for the terminal.

use std::io::Write;

use pds_index_core::label::{ColumnSpec, Decoded, IndexLabel};
use pds_index_core::Table;

/// One line per expanded column: name, 0-indexed range, declared type.
pub fn write_columns<W: Write>(out: &mut W, label: &IndexLabel) -> std::io::Result<()> {
    writeln!(out, "NAME\tSTART\tSTOP\tDATA_TYPE")?;
    for column in label.columns() {
        let data_type = column.data_type.as_deref().unwrap_or("-");
        for ColumnSpec { name, range } in column.expand() {
            writeln!(out, "{}\t{}\t{}\t{}", name, range.start, range.end, data_type)?;
        }
    }
    Ok(())
}

/// Tab-separated table with a header row, at most `limit` rows.
pub fn write_tsv<W: Write>(out: &mut W, table: &Table, limit: Option<usize>) -> std::io::Result<()> {
    writeln!(out, "{}", table.column_names().join("\t"))?;
    for row in table.rows().take(limit.unwrap_or(usize::MAX)) {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writeln!(out, "{}", cells.join("\t"))?;
    }
    Ok(())
}

pub fn write_decoded<W: Write>(out: &mut W, decoded: &[(String, Decoded)]) -> std::io::Result<()> {
    for (name, value) in decoded {
        match value {
            Decoded::Scalar(v) => writeln!(out, "{} {:?}", name, v)?,
            Decoded::Items(items) => writeln!(out, "{} {:?}", name, items)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABEL: &str = "^INDEX_TABLE = \"I.TAB\"\nOBJECT = INDEX_TABLE\n\
        OBJECT = COLUMN\nNAME = ID\nSTART_BYTE = 1\nBYTES = 5\nEND_OBJECT = COLUMN\n\
        OBJECT = COLUMN\nNAME = VALS\nDATA_TYPE = CHARACTER\nSTART_BYTE = 6\nBYTES = 9\n\
        ITEMS = 2\nITEM_BYTES = 4\nITEM_OFFSET = 5\nEND_OBJECT = COLUMN\n\
        END_OBJECT = INDEX_TABLE\nEND\n";

    #[test]
    fn test_columns_listing() {
        let label = IndexLabel::parse(LABEL, "I.LBL").unwrap();
        let mut out = Vec::new();
        write_columns(&mut out, &label).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "NAME\tSTART\tSTOP\tDATA_TYPE\nID\t0\t5\t-\nVALS_1\t5\t9\tCHARACTER\nVALS_2\t10\t14\tCHARACTER\n"
        );
    }

    #[test]
    fn test_tsv_limit() {
        let mut table = Table::new();
        table
            .push_text_column("ID", vec!["1".into(), "2".into(), "3".into()])
            .unwrap();
        let mut out = Vec::new();
        write_tsv(&mut out, &table, Some(2)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "ID\n1\n2\n");
    }

    #[test]
    fn test_decoded_lines() {
        let label = IndexLabel::parse(LABEL, "I.LBL").unwrap();
        let mut out = Vec::new();
        write_decoded(&mut out, &label.decode_line("00001AAAA BBBB")).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "ID \"00001\"\nVALS [\"AAAA\", \"BBBB\"]\n"
        );
    }
}
