//! Repair of known defects in published index files.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{classify_io_error, IndexError, Result};

/// Comma-separated field holding `SCAN_EXPOSURE_DURATION` in the HiRISE EDR index.
const SCAN_EXPOSURE_FIELD: usize = 21;
/// Largest value that fits the declared F9.4 format.
const SCAN_EXPOSURE_LIMIT: f64 = 9999.999;
/// Width of the declared F9.4 format.
const SCAN_EXPOSURE_WIDTH: usize = 9;

/// Fixes one line of the HiRISE EDRCUMINDEX, returning `None` if it is fine.
///
/// Some lines carry `SCAN_EXPOSURE_DURATION` as F10.4 (`20000.0000`) instead
/// of F9.4; the extra decimal is dropped so the column widths line up again.
pub fn fix_hirise_line(line: &str, line_no: usize) -> Result<Option<String>> {
    let exposure = line.split(',').nth(SCAN_EXPOSURE_FIELD).ok_or_else(|| IndexError::Parse {
        line: line_no,
        message: format!("fewer than {} comma-separated fields", SCAN_EXPOSURE_FIELD + 1),
    })?;
    let value: f64 = exposure.trim().parse().map_err(|_| IndexError::Parse {
        line: line_no,
        message: format!("SCAN_EXPOSURE_DURATION '{}' is not a number", exposure),
    })?;
    if value <= SCAN_EXPOSURE_LIMIT {
        return Ok(None);
    }
    let shortened: String = exposure.chars().take(SCAN_EXPOSURE_WIDTH).collect();
    Ok(Some(line.replace(exposure, &shortened)))
}

/// Copies `input` to `output`, fixing over-wide exposure durations.
///
/// Returns the number of repaired lines.
pub fn fix_hirise_edrcumindex(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<usize> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let reader = BufReader::new(File::open(input).map_err(|e| classify_io_error(e, input))?);
    let mut writer = BufWriter::new(File::create(output).map_err(|e| classify_io_error(e, output))?);

    let mut repaired = 0;
    for (index, line) in reader.split(b'\n').enumerate() {
        let raw = line.map_err(|e| classify_io_error(e, input))?;
        let text = String::from_utf8_lossy(&raw);
        let (body, ending) = match text.strip_suffix('\r') {
            Some(body) => (body, "\r\n"),
            None => (&*text, "\n"),
        };
        let fixed = if body.trim().is_empty() {
            None
        } else {
            fix_hirise_line(body, index + 1)?
        };
        if fixed.is_some() {
            repaired += 1;
            tracing::warn!("Repaired SCAN_EXPOSURE_DURATION on line {}", index + 1);
        }
        writer
            .write_all(fixed.as_deref().unwrap_or(body).as_bytes())
            .and_then(|_| writer.write_all(ending.as_bytes()))
            .map_err(|e| classify_io_error(e, output))?;
    }
    writer.flush().map_err(|e| classify_io_error(e, output))?;
    Ok(repaired)
}
