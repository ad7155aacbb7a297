//! Fixture writers shared by the integration tests.

use std::fs;
use std::path::{Path, PathBuf};

/// Label for a table with a scalar ID, a two-item array and two time columns.
pub const SAMPLE_LABEL: &str = r#"PDS_VERSION_ID = PDS3
RECORD_TYPE = FIXED_LENGTH
RECORD_BYTES = 47
^INDEX_TABLE = "SAMPLE_INDEX.TAB"

/* Sample index used by the integration tests */
OBJECT = INDEX_TABLE
  INTERCHANGE_FORMAT = ASCII
  ROWS = 2
  COLUMNS = 4

  OBJECT = COLUMN
    NAME = ID
    DATA_TYPE = CHARACTER
    START_BYTE = 1
    BYTES = 5
  END_OBJECT = COLUMN

  OBJECT = COLUMN
    NAME = VALS
    DATA_TYPE = CHARACTER
    START_BYTE = 6
    BYTES = 9
    ITEMS = 2
    ITEM_BYTES = 4
    ITEM_OFFSET = 5
  END_OBJECT = COLUMN

  OBJECT = COLUMN
    NAME = START_TIME
    DATA_TYPE = TIME
    START_BYTE = 16
    BYTES = 21
    DESCRIPTION = "Observation start, in
                   day-of-year format."
  END_OBJECT = COLUMN

  OBJECT = COLUMN
    NAME = LOCAL_TIME
    DATA_TYPE = CHARACTER
    START_BYTE = 38
    BYTES = 8
  END_OBJECT = COLUMN
END_OBJECT = INDEX_TABLE
END
"#;

/// Two rows matching [`SAMPLE_LABEL`].
pub const SAMPLE_ROWS: &str = "00001AAAA BBBB 2016-045T12:00:00.250 10:30:00\r\n\
                               00002CCCC DDDD 2016-046T00:00:00     23:59:59\r\n";

/// Writes `label` and `rows` side by side, returning the label path.
pub fn write_index(dir: &Path, label: &str, rows: &str) -> PathBuf {
    let label_path = dir.join("SAMPLE_INDEX.LBL");
    fs::write(&label_path, label).unwrap();
    fs::write(dir.join("SAMPLE_INDEX.TAB"), rows).unwrap();
    label_path
}
