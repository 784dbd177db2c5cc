use std::path::Path;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize, Serializer};

use crate::models::{car_listing::CarListing, delay::DelayRecord};

#[derive(Debug, Clone, Copy)]
pub struct TableFormat {
    pub delimiter: u8,
    /// First column holds the row index (pandas `index_col=0`).
    pub index_column: bool,
}

pub const PRICING_FORMAT: TableFormat = TableFormat {
    delimiter: b',',
    index_column: true,
};

pub const DELAY_FORMAT: TableFormat = TableFormat {
    delimiter: b';',
    index_column: false,
};

/// Rows of a flat file keyed by their row index, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<T> {
    pub rows: Vec<(usize, T)>,
}

impl<T> Table<T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().map(|(_, row)| row)
    }
}

impl<T: Clone> Table<&T> {
    pub fn cloned(&self) -> Table<T> {
        Table {
            rows: self.rows.iter().map(|(index, row)| (*index, (*row).clone())).collect(),
        }
    }
}

/// Serializes as `{"<index>": row, ...}` keeping row order.
impl<T: Serialize> Serialize for Table<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.rows.iter().map(|(index, row)| (index, row)))
    }
}

pub fn read_table<T: DeserializeOwned>(path: impl AsRef<Path>, format: TableFormat) -> Result<Table<T>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(format.delimiter)
        .from_path(path)
        .with_context(|| format!("failed to open dataset {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("failed to read header of {}", path.display()))?
        .clone();

    let mut rows = Vec::new();
    for (position, result) in reader.records().enumerate() {
        let line = position + 2;
        let record =
            result.with_context(|| format!("malformed line {line} in {}", path.display()))?;

        let index = if format.index_column {
            let raw = record.get(0).unwrap_or_default().trim();
            raw.parse::<usize>().with_context(|| {
                format!("invalid row index {raw:?} on line {line} in {}", path.display())
            })?
        } else {
            position
        };

        let row: T = record
            .deserialize(Some(&headers))
            .with_context(|| format!("failed to parse line {line} in {}", path.display()))?;
        rows.push((index, row));
    }

    Ok(Table { rows })
}

pub fn read_pricing_dataset(path: impl AsRef<Path>) -> Result<Table<CarListing>> {
    read_table(path, PRICING_FORMAT)
}

pub fn read_delay_dataset(path: impl AsRef<Path>) -> Result<Table<DelayRecord>> {
    read_table(path, DELAY_FORMAT)
}
