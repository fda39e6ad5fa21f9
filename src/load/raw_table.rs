use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Column names exactly as the header row spells them.
    pub headers: Vec<String>,
    /// Every record after the header, padded to `headers.len()`.
    pub rows: Vec<Vec<String>>,
}

/// Read a World Bank export verbatim. Footer rows are kept; `clean` drops them.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_raw_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path.as_ref()))?;
    read_raw_from(file).with_context(|| format!("reading {:?}", path.as_ref()))
}

pub fn read_raw_from<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // footer rows carry fewer fields than data rows
        .from_reader(reader);

    let mut records = rdr.records();
    let headers: Vec<String> = match records.next() {
        Some(first) => first
            .context("CSV parse error in header row")?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == 0 {
                    h.trim_start_matches('\u{feff}').to_string()
                } else {
                    h.to_string()
                }
            })
            .collect(),
        None => return Err(anyhow!("CSV has no header row")),
    };

    let width = headers.len();
    let mut rows = Vec::new();
    let mut warned_long = false;
    for (idx, result) in records.enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx + 1))?;
        let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        if row.len() > width && !warned_long {
            warn!(
                record = idx + 1,
                cells = row.len(),
                headers = width,
                "record has more cells than headers; extra cells dropped"
            );
            warned_long = true;
        }
        row.resize(width, String::new());
        rows.push(row);
    }

    debug!(columns = width, rows = rows.len(), "raw table loaded");
    Ok(RawTable { headers, rows })
}
