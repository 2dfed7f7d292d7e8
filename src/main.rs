use clap::Parser;
use hospital_registry::config::Command;
use hospital_registry::core::export::{export_records, ExportFormat};
use hospital_registry::core::ConfigProvider;
use hospital_registry::utils::error::{ErrorSeverity, RegistryError};
use hospital_registry::utils::{logger, validation::Validate};
use hospital_registry::{
    create_router, AppState, BlockList, CliConfig, HospitalCatalog, LocalStorage, TomlConfig,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            // logger 尚未初始化，直接輸出
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(
        cli.verbose,
        config.log_level(),
        cli.json_logs || config.json_logs(),
    );

    tracing::info!("Starting hospital-registry");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let storage = Arc::new(LocalStorage::new(config.sources.base_dir.clone()));

    let outcome = match cli.command() {
        Command::Serve => serve(&config, storage).await,
        Command::Export {
            output,
            format,
            include_blocked,
        } => export(&config, storage, &output, format, include_blocked).await,
    };

    if let Err(e) = outcome {
        exit_with(e);
    }

    Ok(())
}

async fn serve(config: &TomlConfig, storage: Arc<LocalStorage>) -> hospital_registry::Result<()> {
    let state = AppState::from_config(config, storage).await;
    let stats = state.catalog.stats();
    tracing::info!(
        "📚 Loaded {} rows from {}/{} sources",
        stats.rows,
        stats.loaded_sources,
        stats.configured_sources
    );

    let app = create_router(state, config.static_dir())?;

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn export(
    config: &TomlConfig,
    storage: Arc<LocalStorage>,
    output: &str,
    format: ExportFormat,
    include_blocked: bool,
) -> hospital_registry::Result<()> {
    if config.csv_paths().is_empty() {
        return Err(RegistryError::MissingConfigError {
            field: "sources.csv_paths".to_string(),
        });
    }

    let catalog =
        HospitalCatalog::load(storage, config.csv_paths().to_vec(), config.extractor()).await;
    let blocked: BlockList = config.initial_blocked().iter().cloned().collect();
    let records = catalog.records(&blocked, !include_blocked);

    // 輸出路徑以目前目錄為基準
    let out = LocalStorage::new(".".to_string());
    let count = export_records(&out, output, &records, format).await?;

    println!("✅ Exported {} records", count);
    println!("📁 Output saved to: {}", output);
    Ok(())
}

fn exit_with(e: RegistryError) {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ hospital-registry failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}
