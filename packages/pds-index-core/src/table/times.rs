//! Conversion of time columns to timestamps.

use chrono::NaiveDateTime;

use super::{ColumnData, Table};
use crate::error::{IndexError, Result};
use crate::time::{is_time_column, parse_timestamp};

/// Replaces every text time column with parsed timestamps.
///
/// All columns are converted before the table is touched, so on error the
/// table is left as it was.
pub fn normalize_times(table: &mut Table) -> Result<()> {
    let mut converted: Vec<(usize, Vec<Option<NaiveDateTime>>)> = Vec::new();

    for (index, column) in table.columns().iter().enumerate() {
        if !is_time_column(&column.name) {
            continue;
        }
        let values = match &column.data {
            ColumnData::Text(values) => values,
            ColumnData::Time(_) => continue,
        };
        tracing::info!("Converting times for column {}", column.name);
        let parsed = values
            .iter()
            .map(|raw| {
                parse_timestamp(raw).ok_or_else(|| IndexError::TimeParse {
                    column: column.name.clone(),
                    value: raw.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        converted.push((index, parsed));
    }

    let columns = table.columns_mut();
    for (index, parsed) in converted {
        columns[index].data = ColumnData::Time(parsed);
    }
    Ok(())
}
