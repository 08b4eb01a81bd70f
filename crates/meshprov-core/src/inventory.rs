// ── Inventory file reading ──
//
// Headerless CSV: building, role, floor, mac, target name. Rows are read
// lazily; normalization (and therefore MAC validation) happens only for
// rows the caller actually wants. Each physical line holds one row, so
// line numbers are counted here rather than by the csv reader, which
// does not count the blank and `#` lines it skips.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::iter::Enumerate;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::trace;

use crate::error::CoreError;
use crate::model::{InventoryRecord, InventoryRow, MacAddress};

const COLUMNS: usize = 5;

/// Lazy iterator over the rows of an inventory file.
pub struct InventoryReader<R: io::Read> {
    lines: Enumerate<Lines<BufReader<R>>>,
}

impl InventoryReader<File> {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let file = File::open(path.as_ref())?;
        Ok(Self::from_reader(file))
    }
}

impl<R: io::Read> InventoryReader<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines().enumerate(),
        }
    }
}

impl<R: io::Read> Iterator for InventoryReader<R> {
    type Item = Result<InventoryRow, CoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (idx, text) = self.lines.next()?;
            let line = idx as u64 + 1;
            let text = match text {
                Ok(text) => text,
                Err(e) => {
                    return Some(Err(CoreError::Inventory {
                        line,
                        reason: e.to_string(),
                    }));
                }
            };

            let trimmed = text.trim_start_matches('\u{feff}').trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                trace!(line, "skipping blank or comment line");
                continue;
            }

            return Some(
                parse_line(line, trimmed).and_then(|record| row_from_record(line, &record)),
            );
        }
    }
}

fn parse_line(line: u64, text: &str) -> Result<StringRecord, CoreError> {
    let mut record = StringRecord::new();
    ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes())
        .read_record(&mut record)
        .map_err(|e| CoreError::Inventory {
            line,
            reason: e.to_string(),
        })?;
    Ok(record)
}

fn row_from_record(line: u64, record: &StringRecord) -> Result<InventoryRow, CoreError> {
    if record.iter().all(str::is_empty) {
        return Err(CoreError::Inventory {
            line,
            reason: "row has no values".into(),
        });
    }

    if record.len() < COLUMNS {
        return Err(CoreError::Inventory {
            line,
            reason: format!(
                "expected {COLUMNS} columns (building, role, floor, mac, name), found {}",
                record.len()
            ),
        });
    }

    let field = |idx: usize| record.get(idx).unwrap_or_default().to_owned();
    let row = InventoryRow {
        line,
        building: field(0),
        role: field(1),
        floor: field(2),
        mac: field(3),
        target_name: field(4),
    };
    trace!(line, building = %row.building, floor = %row.floor, "read inventory row");
    Ok(row)
}

impl InventoryRow {
    /// Lowercase building and role, colon-format the MAC.
    pub fn normalize(&self) -> Result<InventoryRecord, CoreError> {
        let mac = MacAddress::parse(&self.mac).map_err(|e| CoreError::Inventory {
            line: self.line,
            reason: format!("invalid MAC '{}': {e}", self.mac),
        })?;

        if self.target_name.is_empty() {
            return Err(CoreError::Inventory {
                line: self.line,
                reason: "target name is empty".into(),
            });
        }

        Ok(InventoryRecord {
            building: self.building.to_lowercase(),
            floor: self.floor.clone(),
            role: self.role.to_lowercase(),
            mac,
            target_name: self.target_name.clone(),
        })
    }
}

// ── Filtering ───────────────────────────────────────────────────────

/// Selects the rows for one building and floor.
///
/// Building matches case-insensitively; floor is compared as an exact
/// string, so `"3"` does not match `"03"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryFilter {
    building: String,
    floor: String,
}

impl InventoryFilter {
    pub fn new(building: &str, floor: &str) -> Self {
        Self {
            building: building.trim().to_lowercase(),
            floor: floor.trim().to_owned(),
        }
    }

    pub fn building(&self) -> &str {
        &self.building
    }

    pub fn floor(&self) -> &str {
        &self.floor
    }

    pub fn matches(&self, row: &InventoryRow) -> bool {
        row.building.to_lowercase() == self.building && row.floor == self.floor
    }
}
