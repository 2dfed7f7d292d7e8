use crate::core::blocklist::BlockList;
use crate::core::extraction::{CanonicalField, RecordExtractor};
use crate::core::loader::{encode_row, parse_source, CsvLoader};
use crate::domain::model::{
    HospitalCard, HospitalInfo, HospitalRecord, IndexedCard, NewHospital, RecordTable,
};
use crate::domain::ports::Storage;
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::validate_non_empty_string;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub configured_sources: usize,
    pub loaded_sources: usize,
    pub rows: usize,
    pub loaded_at: DateTime<Utc>,
}

/// In-memory view over the configured CSV files.
///
/// Every read works on the table loaded at startup; the table is only
/// refreshed after a row is appended to one of its sources.
pub struct HospitalCatalog {
    storage: Arc<dyn Storage>,
    loader: CsvLoader,
    extractor: RecordExtractor,
    paths: Vec<String>,
    table: RwLock<RecordTable>,
}

impl HospitalCatalog {
    pub fn new(storage: Arc<dyn Storage>, paths: Vec<String>, extractor: RecordExtractor) -> Self {
        Self {
            loader: CsvLoader::new(storage.clone()),
            storage,
            extractor,
            paths,
            table: RwLock::new(RecordTable::default()),
        }
    }

    pub async fn load(
        storage: Arc<dyn Storage>,
        paths: Vec<String>,
        extractor: RecordExtractor,
    ) -> Self {
        let catalog = Self::new(storage, paths, extractor);
        catalog.reload().await;
        catalog
    }

    pub async fn reload(&self) {
        let table = self.loader.load_all(&self.paths).await;
        *self.table.write() = table;
    }

    pub fn extractor(&self) -> &RecordExtractor {
        &self.extractor
    }

    pub fn cards(&self, blocked: &BlockList, exclude_blocked: bool) -> Vec<HospitalCard> {
        let table = self.table.read();
        let cards = table
            .raw_rows()
            .filter_map(|row| self.extractor.extract_card(&row))
            .collect();
        blocked.filter(cards, exclude_blocked)
    }

    pub fn infos(&self, blocked: &BlockList, exclude_blocked: bool) -> Vec<HospitalInfo> {
        let table = self.table.read();
        let infos = table
            .raw_rows()
            .filter_map(|row| self.extractor.extract_info(&row))
            .collect();
        blocked.filter(infos, exclude_blocked)
    }

    /// Positional cards; ids are handed out after filtering so they stay contiguous.
    pub fn indexed_cards(&self, blocked: &BlockList, exclude_blocked: bool) -> Vec<IndexedCard> {
        let table = self.table.read();
        let cards = table
            .positional_rows()
            .filter_map(|cells| self.extractor.extract_indexed(cells))
            .collect();

        blocked
            .filter(cards, exclude_blocked)
            .into_iter()
            .zip(1u32..)
            .map(|(card, id)| IndexedCard { id, ..card })
            .collect()
    }

    pub fn records(&self, blocked: &BlockList, exclude_blocked: bool) -> Vec<HospitalRecord> {
        let table = self.table.read();
        let records = table
            .raw_rows()
            .filter_map(|row| self.extractor.extract_record(&row))
            .collect();
        blocked.filter(records, exclude_blocked)
    }

    /// 新增一筆醫院資料到目標 CSV
    ///
    /// 欄位位置依目標檔的標題列決定，找不到對應標題時退回 positional layout；
    /// 診療科以逗號合併寫入同一欄。
    pub async fn append_hospital(&self, target: &str, hospital: &NewHospital) -> Result<()> {
        validate_non_empty_string("name", &hospital.name)?;
        validate_non_empty_string("address", &hospital.address)?;

        let existing = match self.storage.read_file(target).await {
            Ok(bytes) => bytes,
            Err(RegistryError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e),
        };

        let mut data = Vec::new();
        let header = if existing.is_empty() {
            // 新檔案先寫入標題列
            let header = self.new_file_header();
            data.extend(encode_row(&header)?);
            header
        } else {
            if !existing.ends_with(b"\n") {
                data.push(b'\n');
            }
            parse_source(target, &existing)?.header
        };

        let cells = self.hospital_row(target, &header, hospital)?;
        data.extend(encode_row(&cells)?);

        self.storage.append_file(target, &data).await?;
        tracing::info!("➕ Added hospital '{}' to {}", hospital.name, target);

        if self.paths.iter().any(|path| path == target) {
            self.reload().await;
            tracing::debug!("Reloaded sources after writing {}", target);
        }

        Ok(())
    }

    fn new_file_header(&self) -> Vec<String> {
        let layout = self.extractor.layout();
        let mut header = vec![String::new(); layout.width()];

        for (field, index) in [
            (CanonicalField::Name, layout.name),
            (CanonicalField::Address, layout.address),
            (CanonicalField::Prefecture, layout.prefecture),
            (CanonicalField::Departments, layout.departments),
        ] {
            header[index] = self
                .extractor
                .mapping()
                .labels(field)
                .first()
                .cloned()
                .unwrap_or_else(|| field.as_str().to_string());
        }

        header
    }

    /// One cell per header column; the prefecture cell stays empty.
    fn hospital_row(
        &self,
        target: &str,
        header: &[String],
        hospital: &NewHospital,
    ) -> Result<Vec<String>> {
        let layout = self.extractor.layout();
        let departments = hospital
            .departments
            .iter()
            .map(|department| department.trim())
            .filter(|department| !department.is_empty())
            .collect::<Vec<_>>()
            .join(",");

        let mut placed = vec![
            (
                self.column(target, header, CanonicalField::Name, layout.name)?,
                hospital.name.trim().to_string(),
            ),
            (
                self.column(target, header, CanonicalField::Address, layout.address)?,
                hospital.address.trim().to_string(),
            ),
        ];
        if !departments.is_empty() {
            placed.push((
                self.column(target, header, CanonicalField::Departments, layout.departments)?,
                departments,
            ));
        }

        let mut cells = vec![String::new(); header.len()];
        for (index, value) in placed {
            if !cells[index].is_empty() {
                return Err(RegistryError::ProcessingError {
                    message: format!("{}: two fields map to column {}", target, index),
                });
            }
            cells[index] = value;
        }

        Ok(cells)
    }

    fn column(
        &self,
        target: &str,
        header: &[String],
        field: CanonicalField,
        fallback: usize,
    ) -> Result<usize> {
        let index = self
            .extractor
            .mapping()
            .labels(field)
            .iter()
            .find_map(|label| header.iter().position(|h| h == label))
            .unwrap_or(fallback);

        if index < header.len() {
            Ok(index)
        } else {
            Err(RegistryError::ProcessingError {
                message: format!(
                    "{} has no column for '{}' ({} header columns)",
                    target,
                    field.as_str(),
                    header.len()
                ),
            })
        }
    }

    pub fn stats(&self) -> CatalogStats {
        let table = self.table.read();
        CatalogStats {
            configured_sources: self.paths.len(),
            loaded_sources: table.sources.len(),
            rows: table.row_count(),
            loaded_at: table.loaded_at,
        }
    }
}
