use crate::core::extraction::RecordExtractor;
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Storage: Send + Sync {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
    async fn append_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn csv_paths(&self) -> &[String];
    fn add_target(&self) -> Option<&str>;
    fn static_dir(&self) -> &str;
    fn bind_address(&self) -> String;
    fn initial_blocked(&self) -> &[String];
    fn extractor(&self) -> RecordExtractor;
}

/// Anything the prefecture block filter can judge.
pub trait Located {
    fn address(&self) -> &str;
    fn prefecture(&self) -> &str;
}
