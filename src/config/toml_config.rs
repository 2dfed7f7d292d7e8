use crate::core::extraction::{
    CanonicalField, DepartmentKeywords, FieldMapping, PositionalLayout, RecordExtractor,
};
use crate::core::ConfigProvider;
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::{
    validate_file_extensions, validate_path, validate_positive_number, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    pub blocking: Option<BlockingConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
            static_dir: "static".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub base_dir: String,
    pub csv_paths: Vec<String>,
    pub add_target: Option<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            base_dir: ".".to_string(),
            csv_paths: Vec::new(),
            add_target: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// canonical field name → accepted source labels
    pub field_labels: Option<BTreeMap<String, Vec<String>>>,
    pub department_keywords: Option<Vec<String>>,
    pub positional: Option<PositionalLayout>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockingConfig {
    #[serde(default)]
    pub initial: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RegistryError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RegistryError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CSV_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RegistryError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn field_mapping(&self) -> Result<FieldMapping> {
        let mut mapping = FieldMapping::default();

        if let Some(overrides) = &self.extraction.field_labels {
            for (name, labels) in overrides {
                let field = CanonicalField::ALL
                    .into_iter()
                    .find(|field| field.as_str() == name.as_str())
                    .ok_or_else(|| RegistryError::InvalidConfigValueError {
                        field: "extraction.field_labels".to_string(),
                        value: name.clone(),
                        reason: "Unknown canonical field. Valid fields: name, address, prefecture, departments, reviews".to_string(),
                    })?;
                mapping = mapping.with_labels(field, labels.clone());
            }
        }

        Ok(mapping)
    }

    pub fn department_keywords(&self) -> DepartmentKeywords {
        self.extraction
            .department_keywords
            .clone()
            .map(DepartmentKeywords::new)
            .unwrap_or_default()
    }

    pub fn positional_layout(&self) -> PositionalLayout {
        self.extraction.positional.unwrap_or_default()
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_path("server.static_dir", &self.server.static_dir)?;
        validate_positive_number("server.port", self.server.port as usize, 1)?;
        validate_path("sources.base_dir", &self.sources.base_dir)?;
        validate_file_extensions("sources.csv_paths", &self.sources.csv_paths, &["csv"])?;

        if let Some(target) = &self.sources.add_target {
            validate_file_extensions(
                "sources.add_target",
                std::slice::from_ref(target),
                &["csv"],
            )?;
        }

        if let Some(keywords) = &self.extraction.department_keywords {
            if keywords.iter().all(|k| k.is_empty()) {
                return Err(RegistryError::InvalidConfigValueError {
                    field: "extraction.department_keywords".to_string(),
                    value: format!("{:?}", keywords),
                    reason: "At least one non-empty keyword is required".to_string(),
                });
            }
        }

        let layout = self.positional_layout();
        let columns = [layout.name, layout.address, layout.prefecture, layout.departments];
        let distinct: std::collections::HashSet<usize> = columns.iter().copied().collect();
        if distinct.len() != columns.len() {
            return Err(RegistryError::InvalidConfigValueError {
                field: "extraction.positional".to_string(),
                value: format!(
                    "name={}, address={}, prefecture={}, departments={}",
                    layout.name, layout.address, layout.prefecture, layout.departments
                ),
                reason: "every positioned field must use its own column".to_string(),
            });
        }

        self.field_mapping()?;

        if self.sources.csv_paths.is_empty() {
            tracing::warn!("⚠️ No CSV sources configured, every listing will be empty");
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn csv_paths(&self) -> &[String] {
        &self.sources.csv_paths
    }

    fn add_target(&self) -> Option<&str> {
        self.sources.add_target.as_deref()
    }

    fn static_dir(&self) -> &str {
        &self.server.static_dir
    }

    fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn initial_blocked(&self) -> &[String] {
        self.blocking
            .as_ref()
            .map(|b| b.initial.as_slice())
            .unwrap_or(&[])
    }

    fn extractor(&self) -> RecordExtractor {
        // validate_config 已檢查過欄位名稱，這裡遇到錯誤就退回預設值
        let mapping = self.field_mapping().unwrap_or_else(|e| {
            tracing::warn!("⚠️ {}; using default field mapping", e);
            FieldMapping::default()
        });
        RecordExtractor::new(mapping, self.department_keywords(), self.positional_layout())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
