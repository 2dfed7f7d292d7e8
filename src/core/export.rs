use crate::domain::model::HospitalRecord;
use crate::domain::ports::Storage;
use crate::utils::error::{RegistryError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

#[derive(Serialize)]
struct ExportRow<'a> {
    name: &'a str,
    address: &'a str,
    prefecture: &'a str,
    departments: String,
    reviews: u32,
}

impl<'a> From<&'a HospitalRecord> for ExportRow<'a> {
    fn from(record: &'a HospitalRecord) -> Self {
        Self {
            name: &record.name,
            address: &record.address,
            prefecture: &record.prefecture,
            departments: record.departments.join(","),
            reviews: record.reviews,
        }
    }
}

pub fn render(records: &[HospitalRecord], format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_vec_pretty(records)?),
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for record in records {
                writer.serialize(ExportRow::from(record))?;
            }
            writer
                .into_inner()
                .map_err(|e| RegistryError::ProcessingError {
                    message: format!("Failed to flush CSV export: {}", e),
                })
        }
    }
}

/// 將合併後的醫院資料寫出，回傳筆數
pub async fn export_records(
    storage: &dyn Storage,
    output: &str,
    records: &[HospitalRecord],
    format: ExportFormat,
) -> Result<usize> {
    let data = render(records, format)?;
    tracing::debug!("Writing {} bytes to {}", data.len(), output);
    storage.write_file(output, &data).await?;
    tracing::info!("💾 Exported {} records to {}", records.len(), output);
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<HospitalRecord> {
        vec![
            HospitalRecord {
                name: "仙台中央病院".to_string(),
                address: "宮城県仙台市青葉区1-1".to_string(),
                departments: vec!["内科".to_string(), "外科".to_string()],
                reviews: 3,
                prefecture: "宮城県".to_string(),
            },
            HospitalRecord {
                name: "盛岡歯科".to_string(),
                address: "岩手県盛岡市".to_string(),
                departments: vec!["歯科".to_string()],
                reviews: 0,
                prefecture: String::new(),
            },
        ]
    }

    #[test]
    fn test_render_csv_keeps_departments_in_one_field() {
        let data = render(&records(), ExportFormat::Csv).unwrap();
        let text = String::from_utf8(data).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "name,address,prefecture,departments,reviews");
        assert_eq!(lines[1], "仙台中央病院,宮城県仙台市青葉区1-1,宮城県,\"内科,外科\",3");
        assert_eq!(lines[2], "盛岡歯科,岩手県盛岡市,,歯科,0");
    }

    #[test]
    fn test_render_json_is_an_array() {
        let data = render(&records(), ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&data).unwrap();

        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["departments"][1], "外科");
        assert_eq!(value[1]["reviews"], 0);
    }

    #[test]
    fn test_render_csv_with_no_records_is_empty() {
        let data = render(&[], ExportFormat::Csv).unwrap();
        assert!(data.is_empty());
    }
}
