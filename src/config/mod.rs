pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::export::ExportFormat;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "hospital-registry")]
#[command(about = "Serves merged medical-facility CSV registries as JSON and HTML")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// CSV sources, in load order
    #[arg(long, value_delimiter = ',')]
    pub csv_paths: Vec<String>,

    /// CSV file that POST /add-hospital appends to
    #[arg(long)]
    pub add_target: Option<String>,

    #[arg(long)]
    pub static_dir: Option<String>,

    /// Prefectures blocked at startup
    #[arg(long, value_delimiter = ',')]
    pub block: Vec<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Write the merged hospital records to a file
    Export {
        #[arg(short, long)]
        output: String,

        #[arg(short, long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Keep records from blocked prefectures
        #[arg(long)]
        include_blocked: bool,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入設定檔（若有）並套用命令列覆蓋設定
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(static_dir) = &self.static_dir {
            config.server.static_dir = static_dir.clone();
        }
        if !self.csv_paths.is_empty() {
            config.sources.csv_paths = self.csv_paths.clone();
        }
        if let Some(target) = &self.add_target {
            config.sources.add_target = Some(target.clone());
        }
        if !self.block.is_empty() {
            config.blocking.get_or_insert_with(Default::default).initial = self.block.clone();
        }
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use crate::core::ConfigProvider;

    #[test]
    fn test_cli_overrides_defaults() {
        let cli = CliConfig::parse_from([
            "hospital-registry",
            "--port",
            "9000",
            "--csv-paths",
            "csv/a.csv,csv/b.csv",
            "--block",
            "北海道,青森県",
        ]);

        let config = cli.resolve().unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.csv_paths().len(), 2);
        assert_eq!(config.initial_blocked().len(), 2);
        assert!(matches!(cli.command(), Command::Serve));
    }

    #[test]
    fn test_export_subcommand() {
        let cli = CliConfig::parse_from([
            "hospital-registry",
            "--csv-paths",
            "csv/a.csv",
            "export",
            "--output",
            "out/merged.json",
            "--format",
            "json",
        ]);

        match cli.command() {
            Command::Export {
                output,
                format,
                include_blocked,
            } => {
                assert_eq!(output, "out/merged.json");
                assert_eq!(format, ExportFormat::Json);
                assert!(!include_blocked);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
