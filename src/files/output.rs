use crate::error::{FlattenError, Result};
use crate::format::{format_bool, format_float};
use crate::models::{FlatRecord, COLUMNS};
use chrono::{NaiveDateTime, Timelike};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// 导出到 CSV 文件 (首行为固定表头)
pub fn write_csv(records: &[FlatRecord], output_path: &Path) -> Result<()> {
    let file = File::create(output_path).map_err(|e| FlattenError::io(output_path, e))?;
    write_records(file, records)
}

/// 写出表头和数据行
pub fn write_records<W: Write>(writer: W, records: &[FlatRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(COLUMNS)?;

    let created_on_format = created_on_format(records);
    for record in records {
        writer.write_record(&[
            record.invoice_id.to_string(),
            record.created_on.format(created_on_format).to_string(),
            record.invoiceitem_id.to_string(),
            record.invoiceitem_name.clone(),
            record.item_type.label().to_string(),
            record.unit_price.to_string(),
            record.total_price.to_string(),
            format_float(record.percentage_in_invoice),
            format_bool(record.is_expired).to_string(),
        ])?;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// created_on 整列统一格式: 全是零点时只写日期;
/// 有小数秒时整列带 6 位, 有亚微秒时整列带 9 位
fn created_on_format(records: &[FlatRecord]) -> &'static str {
    if records.iter().all(|r| is_midnight(&r.created_on)) {
        "%Y-%m-%d"
    } else if records.iter().any(|r| r.created_on.nanosecond() % 1_000 != 0) {
        "%Y-%m-%d %H:%M:%S%.9f"
    } else if records.iter().any(|r| r.created_on.nanosecond() != 0) {
        "%Y-%m-%d %H:%M:%S%.6f"
    } else {
        "%Y-%m-%d %H:%M:%S"
    }
}

fn is_midnight(value: &NaiveDateTime) -> bool {
    value.num_seconds_from_midnight() == 0 && value.nanosecond() == 0
}
