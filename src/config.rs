use crate::error::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_INVOICES_PATH: &str = "invoices_new.pkl";
pub const DEFAULT_EXPIRED_IDS_PATH: &str = "expired_invoices.txt";
pub const DEFAULT_OUTPUT_PATH: &str = "invoices_flat.csv";

/// 可选配置文件 (工作目录下)
pub const CONFIG_FILE: &str = "flattener.toml";
/// 环境变量前缀, 例如 FLATTENER_OUTPUT_PATH
pub const ENV_PREFIX: &str = "FLATTENER";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 发票数据 (pickle, 或 .json)
    pub invoices_path: PathBuf,
    /// 过期发票ID列表 (逗号分隔)
    pub expired_ids_path: PathBuf,
    /// 输出 CSV
    pub output_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            invoices_path: PathBuf::from(DEFAULT_INVOICES_PATH),
            expired_ids_path: PathBuf::from(DEFAULT_EXPIRED_IDS_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> flattener.toml -> 环境变量
    pub fn from_env() -> Result<Self> {
        Self::load(Some(Path::new(CONFIG_FILE)))
    }

    /// 指定配置文件加载 (文件不存在时忽略)
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("invoices_path", DEFAULT_INVOICES_PATH)?
            .set_default("expired_ids_path", DEFAULT_EXPIRED_IDS_PATH)?
            .set_default("output_path", DEFAULT_OUTPUT_PATH)?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(false));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
