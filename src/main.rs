use invoice_flattener::{AppConfig, InvoiceFlattener};
use tracing::{error, info};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式, 默认 info 级别 (RUST_LOG 可覆盖)
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env()?;
    info!("Starting invoice flattener with config: {:?}", config);

    match InvoiceFlattener::run(&config) {
        Ok(_) => {
            info!("Data extraction and transformation complete.");
            Ok(())
        }
        Err(e) => {
            error!("Invoice flattening failed: {}", e);
            Err(e.into())
        }
    }
}
