use crate::input::Cell;
use crate::Result;
use anyhow::Context;
use std::io::Read;
use std::path::Path;

/// Reads the data rows of a CSV file. The header row is skipped and every cell is text.
pub(super) fn read_path(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Unable to open CSV file {}", path.display()))?;
    read(file).with_context(|| format!("Unable to read CSV file {}", path.display()))
}

pub(super) fn read<R: Read>(reader: R) -> Result<Vec<Vec<Cell>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (line_ix, result) in rdr.records().enumerate() {
        let record =
            result.with_context(|| format!("CSV parse error at line {}", line_ix + 2))?;
        rows.push(record.iter().map(Cell::text).collect());
    }
    Ok(rows)
}
