use crate::domain::model::{HospitalCard, HospitalInfo, HospitalRecord, IndexedCard, RawRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 標準欄位名稱
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Name,
    Address,
    Prefecture,
    Departments,
    Reviews,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 5] = [
        CanonicalField::Name,
        CanonicalField::Address,
        CanonicalField::Prefecture,
        CanonicalField::Departments,
        CanonicalField::Reviews,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Name => "name",
            CanonicalField::Address => "address",
            CanonicalField::Prefecture => "prefecture",
            CanonicalField::Departments => "departments",
            CanonicalField::Reviews => "reviews",
        }
    }

    fn default_labels(&self) -> &'static [&'static str] {
        match self {
            CanonicalField::Name => &["name", "病院名"],
            CanonicalField::Address => &["address", "住所"],
            CanonicalField::Prefecture => &["prefecture", "都道府県"],
            // 整理後的 CSV 將診療科放在 established 欄
            CanonicalField::Departments => &["established", "診療科", "departments"],
            CanonicalField::Reviews => &["review", "reviews", "レビューの数"],
        }
    }
}

/// Canonical field → accepted source column labels, tried in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    labels: BTreeMap<CanonicalField, Vec<String>>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        let labels = CanonicalField::ALL
            .iter()
            .map(|field| {
                let labels = field
                    .default_labels()
                    .iter()
                    .map(|label| label.to_string())
                    .collect();
                (*field, labels)
            })
            .collect();
        Self { labels }
    }
}

impl FieldMapping {
    pub fn with_labels(mut self, field: CanonicalField, labels: Vec<String>) -> Self {
        self.labels.insert(field, labels);
        self
    }

    pub fn labels(&self, field: CanonicalField) -> &[String] {
        self.labels.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First accepted label holding a present value wins.
    pub fn resolve<'a>(&self, row: &'a RawRow, field: CanonicalField) -> Option<&'a str> {
        self.labels(field)
            .iter()
            .find_map(|label| row.get(label))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

pub const DEFAULT_DEPARTMENT_KEYWORDS: [&str; 22] = [
    "内", "外", "整", "小", "呼", "リハ", "精神", "糖尿病", "循環器", "消化器", "脳外", "心外",
    "皮", "ひ", "産婦", "眼", "耳い", "放", "麻", "歯", "形", "病理",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentKeywords {
    keywords: Vec<String>,
}

impl Default for DepartmentKeywords {
    fn default() -> Self {
        Self::new(DEFAULT_DEPARTMENT_KEYWORDS.iter().map(|k| k.to_string()).collect())
    }
}

impl DepartmentKeywords {
    pub fn new(keywords: Vec<String>) -> Self {
        let keywords = keywords.into_iter().filter(|k| !k.is_empty()).collect();
        Self { keywords }
    }

    pub fn matches(&self, cell: &str) -> bool {
        self.keywords.iter().any(|keyword| cell.contains(keyword.as_str()))
    }

    /// Trimmed cells containing at least one keyword, in input order.
    pub fn scan<'a>(&self, cells: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        cells
            .into_iter()
            .filter(|cell| self.matches(cell))
            .map(|cell| cell.trim().to_string())
            .filter(|cell| !cell.is_empty())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Column positions used for header-less reads and for appended rows.
///
/// `departments` is only used when writing: the department list goes into
/// that one cell, comma-joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionalLayout {
    pub name: usize,
    pub address: usize,
    pub prefecture: usize,
    pub departments: usize,
}

impl Default for PositionalLayout {
    fn default() -> Self {
        Self {
            name: 2,
            address: 3,
            prefecture: 4,
            departments: 5,
        }
    }
}

impl PositionalLayout {
    /// Columns needed to hold every positioned field.
    pub fn width(&self) -> usize {
        [self.name, self.address, self.prefecture, self.departments]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordExtractor {
    mapping: FieldMapping,
    keywords: DepartmentKeywords,
    layout: PositionalLayout,
}

impl RecordExtractor {
    pub fn new(mapping: FieldMapping, keywords: DepartmentKeywords, layout: PositionalLayout) -> Self {
        Self {
            mapping,
            keywords,
            layout,
        }
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    pub fn keywords(&self) -> &DepartmentKeywords {
        &self.keywords
    }

    pub fn layout(&self) -> PositionalLayout {
        self.layout
    }

    fn field(&self, row: &RawRow, field: CanonicalField) -> String {
        self.mapping
            .resolve(row, field)
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// Full record; rows without a name, address or department list are skipped.
    pub fn extract_record(&self, row: &RawRow) -> Option<HospitalRecord> {
        let name = self.mapping.resolve(row, CanonicalField::Name)?;
        let address = self.mapping.resolve(row, CanonicalField::Address)?;
        let departments = self.mapping.resolve(row, CanonicalField::Departments)?;

        Some(HospitalRecord {
            name: name.to_string(),
            address: address.to_string(),
            departments: split_departments(departments),
            reviews: parse_reviews(self.mapping.resolve(row, CanonicalField::Reviews)),
            prefecture: self.field(row, CanonicalField::Prefecture),
        })
    }

    pub fn extract_card(&self, row: &RawRow) -> Option<HospitalCard> {
        let name = self.mapping.resolve(row, CanonicalField::Name)?;

        Some(HospitalCard {
            name: name.to_string(),
            address: self.field(row, CanonicalField::Address),
            departments: self.field(row, CanonicalField::Departments),
            prefecture: self.field(row, CanonicalField::Prefecture),
        })
    }

    /// Departments are every cell of the row that mentions a keyword.
    pub fn extract_info(&self, row: &RawRow) -> Option<HospitalInfo> {
        let name = self.mapping.resolve(row, CanonicalField::Name)?;

        Some(HospitalInfo {
            name: name.to_string(),
            address: self.field(row, CanonicalField::Address),
            departments: self.keywords.scan(row.values()),
            prefecture: self.field(row, CanonicalField::Prefecture),
        })
    }

    /// Card from a header-less row. The id is left at 0 for the caller to assign.
    pub fn extract_indexed(&self, cells: &[Option<String>]) -> Option<IndexedCard> {
        let at = |index: usize| {
            cells
                .get(index)
                .and_then(|cell| cell.as_deref())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let name = at(self.layout.name)?;
        let departments = self
            .keywords
            .scan(cells.iter().filter_map(|cell| cell.as_deref()))
            .join(" ");

        Some(IndexedCard {
            id: 0,
            name: name.to_string(),
            address: at(self.layout.address).unwrap_or_default().to_string(),
            reviews: 0,
            departments,
            prefecture: at(self.layout.prefecture).unwrap_or_default().to_string(),
        })
    }
}

fn split_departments(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// 無法解析的評論數視為缺值（0）
fn parse_reviews(value: Option<&str>) -> u32 {
    let Some(value) = value.map(str::trim) else {
        return 0;
    };

    if let Ok(count) = value.parse::<u32>() {
        return count;
    }

    match value.parse::<f64>() {
        Ok(count) if count.is_finite() && count >= 0.0 && count.fract() == 0.0 && count <= u32::MAX as f64 => {
            count as u32
        }
        _ => {
            tracing::debug!("Unparseable review count '{}', using 0", value);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> RecordExtractor {
        RecordExtractor::default()
    }

    #[test]
    fn test_row_with_empty_address_is_skipped() {
        let row = RawRow::from_pairs([("病院名", "A病院"), ("住所", ""), ("診療科", "内科")]);
        assert!(extractor().extract_record(&row).is_none());
    }

    #[test]
    fn test_row_without_address_column_is_skipped() {
        let row = RawRow::from_pairs([("病院名", "A病院"), ("診療科", "内科")]);
        assert!(extractor().extract_record(&row).is_none());
    }

    #[test]
    fn test_record_renames_japanese_labels() {
        let row = RawRow::from_pairs([
            ("病院名", " A病院 "),
            ("住所", "宮城県仙台市青葉区1-1"),
            ("診療科", "内科, 外科,,小児科"),
            ("レビューの数", "12"),
            ("都道府県", "宮城県"),
        ]);

        let record = extractor().extract_record(&row).unwrap();
        assert_eq!(record.name, "A病院");
        assert_eq!(record.address, "宮城県仙台市青葉区1-1");
        assert_eq!(record.departments, vec!["内科", "外科", "小児科"]);
        assert_eq!(record.reviews, 12);
        assert_eq!(record.prefecture, "宮城県");
    }

    #[test]
    fn test_record_reads_established_as_departments() {
        let row = RawRow::from_pairs([
            ("id", "1.0"),
            ("name", "B歯科医院"),
            ("address", "岩手県盛岡市"),
            ("established", "歯科"),
        ]);

        let record = extractor().extract_record(&row).unwrap();
        assert_eq!(record.departments, vec!["歯科"]);
        assert_eq!(record.reviews, 0);
        assert_eq!(record.prefecture, "");
    }

    #[test]
    fn test_unparseable_reviews_fall_back_to_zero() {
        assert_eq!(parse_reviews(Some("3.0")), 3);
        assert_eq!(parse_reviews(Some("abc")), 0);
        assert_eq!(parse_reviews(Some("-4")), 0);
        assert_eq!(parse_reviews(Some("2.5")), 0);
        assert_eq!(parse_reviews(None), 0);
    }

    #[test]
    fn test_card_only_requires_name() {
        let row = RawRow::from_pairs([("name", "C病院"), ("address", "")]);
        let card = extractor().extract_card(&row).unwrap();
        assert_eq!(card.address, "");
        assert_eq!(card.departments, "");

        let nameless = RawRow::from_pairs([("name", ""), ("address", "青森県")]);
        assert!(extractor().extract_card(&nameless).is_none());
    }

    #[test]
    fn test_info_scans_every_cell_for_keywords() {
        let row = RawRow::from_pairs([
            ("name", "D医院"),
            ("address", "宮城県仙台市"),
            ("col12", " 循環器内科 "),
            ("col13", "0236-00-0000"),
            ("col14", "リハビリテーション科"),
        ]);

        let info = extractor().extract_info(&row).unwrap();
        assert_eq!(info.departments, vec!["循環器内科", "リハビリテーション科"]);
    }

    #[test]
    fn test_custom_mapping_and_keywords() {
        let mapping = FieldMapping::default()
            .with_labels(CanonicalField::Name, vec!["施設名".to_string()]);
        let keywords = DepartmentKeywords::new(vec!["眼".to_string()]);
        let extractor = RecordExtractor::new(mapping, keywords, PositionalLayout::default());

        let row = RawRow::from_pairs([("施設名", "E眼科"), ("name", "ignored"), ("memo", "内科")]);
        let info = extractor.extract_info(&row).unwrap();
        assert_eq!(info.name, "E眼科");
        assert_eq!(info.departments, vec!["E眼科"]);
    }

    #[test]
    fn test_indexed_card_uses_positions() {
        let cells: Vec<Option<String>> = vec![
            Some("1.0".to_string()),
            Some("0101".to_string()),
            Some("F病院".to_string()),
            Some("福島県福島市".to_string()),
            Some("福島県".to_string()),
            None,
            Some("内科".to_string()),
            Some("整形外科".to_string()),
        ];

        let card = extractor().extract_indexed(&cells).unwrap();
        assert_eq!(card.name, "F病院");
        assert_eq!(card.address, "福島県福島市");
        assert_eq!(card.prefecture, "福島県");
        assert_eq!(card.departments, "内科 整形外科");
        assert_eq!(card.reviews, 0);
    }

    #[test]
    fn test_indexed_card_skips_short_rows() {
        let cells = vec![Some("1.0".to_string()), Some("0101".to_string())];
        assert!(extractor().extract_indexed(&cells).is_none());
    }

    #[test]
    fn test_default_keyword_count() {
        assert_eq!(DepartmentKeywords::default().len(), 22);
    }
}
