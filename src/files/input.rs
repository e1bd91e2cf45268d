use crate::error::{FlattenError, Result};
use crate::models::Invoice;
use indexmap::IndexSet;
use serde_pickle::DeOptions;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// 发票数据文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceFormat {
    Pickle,
    Json,
}

impl InvoiceFormat {
    /// 按扩展名判断, 只有 .json 走 JSON, 其余一律按 pickle 解析
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => InvoiceFormat::Json,
            _ => InvoiceFormat::Pickle,
        }
    }
}

/// 读取发票数据文件
pub fn read_invoices(path: &Path) -> Result<Vec<Invoice>> {
    let file = File::open(path).map_err(|e| FlattenError::io(path, e))?;
    decode_invoices(BufReader::new(file), InvoiceFormat::from_path(path))
}

/// 解码发票序列
///
/// pickle 中无法解析的全局对象 (如 datetime 实例) 会被替换成 None,
/// 由转换阶段按无效日期处理。
pub fn decode_invoices<R: Read>(reader: R, format: InvoiceFormat) -> Result<Vec<Invoice>> {
    let invoices = match format {
        InvoiceFormat::Pickle => {
            serde_pickle::from_reader(reader, DeOptions::new().replace_unresolved_globals())?
        }
        InvoiceFormat::Json => serde_json::from_reader(reader)?,
    };
    Ok(invoices)
}

/// 读取过期发票ID文件
pub fn read_expired_ids(path: &Path) -> Result<IndexSet<i64>> {
    let text = std::fs::read_to_string(path).map_err(|e| FlattenError::io(path, e))?;
    parse_expired_ids(&text)
}

/// 解析逗号分隔的过期发票ID (保序去重)
pub fn parse_expired_ids(text: &str) -> Result<IndexSet<i64>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(IndexSet::new());
    }

    text.split(',')
        .map(|token| {
            let token = token.trim();
            token.parse::<i64>().map_err(|source| FlattenError::ExpiredId {
                token: token.to_string(),
                source,
            })
        })
        .collect()
}
