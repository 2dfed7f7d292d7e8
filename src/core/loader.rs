use crate::domain::model::{present, RecordTable, SourceTable};
use crate::domain::ports::Storage;
use crate::utils::error::{RegistryError, Result};
use std::borrow::Cow;
use std::sync::Arc;

/// Labels given to the leading columns of an unlabeled (`col1, col2, ...`) export.
const UNLABELED_HEADER: [&str; 3] = ["name", "address", "tel"];

pub struct CsvLoader {
    storage: Arc<dyn Storage>,
}

impl CsvLoader {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// 依設定順序載入所有來源；讀不到的檔案記錄後略過
    pub async fn load_all(&self, paths: &[String]) -> RecordTable {
        let mut sources = Vec::with_capacity(paths.len());

        for path in paths {
            if let Some(source) = self.load_source(path).await {
                sources.push(source);
            }
        }

        let table = RecordTable::new(sources);
        tracing::info!(
            "📂 Loaded {} rows from {}/{} CSV files",
            table.row_count(),
            table.sources.len(),
            paths.len()
        );
        table
    }

    pub async fn load_source(&self, path: &str) -> Option<SourceTable> {
        let bytes = match self.storage.read_file(path).await {
            Ok(bytes) => bytes,
            Err(RegistryError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("ファイルが見つかりません: {}", path);
                return None;
            }
            Err(e) => {
                tracing::warn!("⚠️ Failed to read {}: {}", path, e);
                return None;
            }
        };

        match parse_source(path, &bytes) {
            Ok(source) => {
                tracing::debug!("Loaded {} rows from {}", source.len(), path);
                Some(source)
            }
            Err(e) => {
                tracing::warn!("⚠️ Failed to parse {}: {}", path, e);
                None
            }
        }
    }
}

/// Parses one CSV file with a header row.
///
/// Rows with more cells than the header are dropped, shorter rows are padded
/// with missing cells and rows with no present cell are ignored.
pub fn parse_source(path: &str, bytes: &[u8]) -> Result<SourceTable> {
    let decoded = decode(path, bytes);
    let text = decoded.strip_prefix('\u{feff}').unwrap_or(&decoded);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header = normalize_header(
        reader
            .headers()?
            .iter()
            .map(|label| label.trim().to_string())
            .collect(),
    );

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                skipped += 1;
                tracing::debug!("{}: skipping unreadable row {}: {}", path, index + 2, e);
                continue;
            }
        };

        if record.len() > header.len() {
            skipped += 1;
            tracing::debug!(
                "{}: skipping row {} ({} cells, header has {})",
                path,
                index + 2,
                record.len(),
                header.len()
            );
            continue;
        }

        let mut row: Vec<Option<String>> =
            record.iter().map(|cell| present(cell.to_string())).collect();
        if row.iter().all(Option::is_none) {
            continue;
        }
        row.resize(header.len(), None);
        rows.push(row);
    }

    if skipped > 0 {
        tracing::info!("⚠️ {}: skipped {} malformed rows", path, skipped);
    }

    Ok(SourceTable {
        path: path.to_string(),
        header,
        rows,
    })
}

/// 未命名欄位（col 開頭）的匯出檔，前三欄改為 name/address/tel
pub fn normalize_header(mut header: Vec<String>) -> Vec<String> {
    let unlabeled = header
        .first()
        .map(|first| first.starts_with("col"))
        .unwrap_or(false);

    if unlabeled {
        for (label, canonical) in header.iter_mut().zip(UNLABELED_HEADER) {
            *label = canonical.to_string();
        }
    }

    header
}

/// Encodes one CSV line (no header).
pub fn encode_row(cells: &[String]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(cells)?;
    writer
        .into_inner()
        .map_err(|e| RegistryError::ProcessingError {
            message: format!("Failed to flush CSV row: {}", e),
        })
}

fn decode<'a>(path: &str, bytes: &'a [u8]) -> Cow<'a, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            tracing::warn!("⚠️ {} is not valid UTF-8, decoding lossily", path);
            String::from_utf8_lossy(bytes)
        }
    }
}
