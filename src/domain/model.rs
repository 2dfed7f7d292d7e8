use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// CSV 的一列：欄位名稱與值（空字串視為缺值）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: Vec<(String, Option<String>)>,
}

impl RawRow {
    pub fn new(cells: Vec<(String, Option<String>)>) -> Self {
        Self { cells }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let cells = pairs
            .into_iter()
            .map(|(label, value)| (label.into(), present(value.into())))
            .collect();
        Self { cells }
    }

    /// Value under `label`, if the column exists and the cell is not empty.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(l, _)| l == label)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Present cell values in column order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().filter_map(|(_, v)| v.as_deref())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Empty and whitespace-only cells count as missing.
pub fn present(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// One loaded CSV file.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub path: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl SourceTable {
    pub fn raw_rows(&self) -> impl Iterator<Item = RawRow> + '_ {
        self.rows.iter().map(move |row| {
            RawRow::new(
                self.header
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect(),
            )
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// All configured sources, concatenated in configuration order.
#[derive(Debug, Clone)]
pub struct RecordTable {
    pub sources: Vec<SourceTable>,
    pub loaded_at: DateTime<Utc>,
}

impl RecordTable {
    pub fn new(sources: Vec<SourceTable>) -> Self {
        Self {
            sources,
            loaded_at: Utc::now(),
        }
    }

    pub fn raw_rows(&self) -> impl Iterator<Item = RawRow> + '_ {
        self.sources.iter().flat_map(|source| source.raw_rows())
    }

    pub fn positional_rows(&self) -> impl Iterator<Item = &[Option<String>]> {
        self.sources
            .iter()
            .flat_map(|source| source.rows.iter().map(Vec::as_slice))
    }

    pub fn row_count(&self) -> usize {
        self.sources.iter().map(SourceTable::len).sum()
    }
}

impl Default for RecordTable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalCard {
    pub name: String,
    pub address: String,
    pub departments: String,
    pub prefecture: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalInfo {
    pub name: String,
    pub address: String,
    pub departments: Vec<String>,
    pub prefecture: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedCard {
    pub id: u32,
    pub name: String,
    pub address: String,
    pub reviews: u32,
    pub departments: String,
    pub prefecture: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalRecord {
    pub name: String,
    pub address: String,
    pub departments: Vec<String>,
    pub reviews: u32,
    pub prefecture: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHospital {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub departments: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_row_treats_blank_cells_as_missing() {
        let row = RawRow::from_pairs([("病院名", "A病院"), ("住所", "  "), ("診療科", "内科")]);
        assert_eq!(row.get("病院名"), Some("A病院"));
        assert_eq!(row.get("住所"), None);
        assert_eq!(row.get("電話番号"), None);
        assert_eq!(row.values().collect::<Vec<_>>(), vec!["A病院", "内科"]);
    }

    #[test]
    fn test_record_table_concatenates_sources_in_order() {
        let first = SourceTable {
            path: "a.csv".to_string(),
            header: vec!["name".to_string()],
            rows: vec![vec![Some("A".to_string())], vec![Some("B".to_string())]],
        };
        let second = SourceTable {
            path: "b.csv".to_string(),
            header: vec!["name".to_string()],
            rows: vec![vec![Some("C".to_string())]],
        };
        let table = RecordTable::new(vec![first, second]);

        assert_eq!(table.row_count(), 3);
        let names: Vec<String> = table
            .raw_rows()
            .filter_map(|row| row.get("name").map(str::to_string))
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }
}
