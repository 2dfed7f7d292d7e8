pub mod config;
pub mod core;
pub mod domain;
pub mod http;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::{blocklist::BlockList, catalog::HospitalCatalog};
pub use http::{create_router, AppState};
pub use utils::error::{RegistryError, Result};
