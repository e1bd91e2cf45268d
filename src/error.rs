use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

/// 流水线错误 (加载 / 导出阶段直接向上抛出)
#[derive(Error, Debug)]
pub enum FlattenError {
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("pickle decoding failed: {0}")]
    Pickle(#[from] serde_pickle::Error),

    #[error("JSON decoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid expired invoice id '{token}': {source}")]
    ExpiredId {
        token: String,
        #[source]
        source: ParseIntError,
    },

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl FlattenError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FlattenError>;
