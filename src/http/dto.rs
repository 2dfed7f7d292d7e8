//! Request and response bodies for the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// `?exclude_blocked=` on every listing endpoint; defaults to true.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_true")]
    pub exclude_blocked: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            exclude_blocked: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefectureQuery {
    pub prefecture: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedPrefecturesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub blocked_prefectures: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddHospitalResponse {
    pub message: String,
    pub name: String,
    pub address: String,
    pub departments: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub configured_sources: usize,
    pub loaded_sources: usize,
    pub rows: usize,
    pub blocked_prefectures: usize,
    pub loaded_at: DateTime<Utc>,
}
