use crate::config::AppConfig;
use crate::error::Result;
use crate::files;
use crate::models::{missing_columns, FlatRecord, Invoice, TransformReport};
use crate::service::parse::{item_name, item_type, parse_created_on, price_item, PricedLine};
use indexmap::IndexSet;
use std::path::Path;

/// 加载时打印的样例发票数量
const SAMPLE_SIZE: usize = 5;

/// 转换结果: 排好序的明细行 + 统计信息
#[derive(Debug, Clone)]
pub struct Flattened {
    pub records: Vec<FlatRecord>,
    pub report: TransformReport,
}

/// 发票扁平化: load -> transform -> save
pub struct InvoiceFlattener {
    invoices: Vec<Invoice>,
    expired_ids: IndexSet<i64>,
}

impl InvoiceFlattener {
    pub fn new(invoices: Vec<Invoice>, expired_ids: IndexSet<i64>) -> Self {
        Self {
            invoices,
            expired_ids,
        }
    }

    /// 由已解码的发票和逗号分隔的过期ID文本构建
    pub fn load(invoices: Vec<Invoice>, expired_ids_text: &str) -> Result<Self> {
        let expired_ids = files::parse_expired_ids(expired_ids_text)?;
        Ok(Self::new(invoices, expired_ids))
    }

    /// 从文件加载发票数据和过期发票ID
    pub fn load_files(invoices_path: &Path, expired_ids_path: &Path) -> Result<Self> {
        let invoices = files::read_invoices(invoices_path)?;
        tracing::info!(
            "Invoices data loaded successfully: {} invoices from {}",
            invoices.len(),
            invoices_path.display()
        );
        for invoice in invoices.iter().take(SAMPLE_SIZE) {
            tracing::debug!("Sample invoice: {:?}", invoice);
        }

        let expired_ids = files::read_expired_ids(expired_ids_path)?;
        tracing::info!(
            "Expired invoice IDs loaded successfully: {:?}",
            expired_ids
        );

        Ok(Self::new(invoices, expired_ids))
    }

    /// 展开所有发票明细, 按 (invoice_id, invoiceitem_id) 升序排列
    pub fn transform(&self) -> Flattened {
        let mut records = Vec::new();
        let mut report = TransformReport {
            invoices_total: self.invoices.len(),
            ..TransformReport::default()
        };

        for invoice in &self.invoices {
            self.flatten_invoice(invoice, &mut records, &mut report);
        }

        let missing = missing_columns(&records);
        if missing.is_empty() {
            records.sort_by_key(|r| (r.invoice_id, r.invoiceitem_id));
            tracing::info!("Data transformation completed: {} rows", records.len());
        } else {
            tracing::warn!("Columns missing in output: {:?}", missing);
        }

        report.items_emitted = records.len();
        Flattened { records, report }
    }

    fn flatten_invoice(
        &self,
        invoice: &Invoice,
        records: &mut Vec<FlatRecord>,
        report: &mut TransformReport,
    ) {
        let Some(invoice_id) = invoice.invoice_id() else {
            tracing::warn!("Skipping invoice without integer id: {:?}", invoice.id);
            report.invoices_skipped += 1;
            return;
        };

        let created_on = invoice
            .created_on
            .as_ref()
            .and_then(|v| v.as_text())
            .and_then(parse_created_on);
        let Some(created_on) = created_on else {
            tracing::warn!(
                "Invoice {}: skipping invalid date: {:?}",
                invoice_id,
                invoice.created_on
            );
            report.invoices_skipped += 1;
            return;
        };

        let items = invoice.items();
        let priced: Vec<Option<PricedLine>> = items.iter().map(price_item).collect();

        // 只有单价和数量都有效的明细计入发票总额
        let invoice_total: i128 = priced
            .iter()
            .flatten()
            .map(|line| i128::from(line.total_price))
            .sum();
        let is_expired = self.expired_ids.contains(&invoice_id);

        let mut non_numeric = 0usize;
        let mut without_id = 0usize;
        for (item, line) in items.iter().zip(priced) {
            let Some(line) = line else {
                non_numeric += 1;
                continue;
            };
            let Some(item_id) = item.item_id() else {
                without_id += 1;
                continue;
            };

            let percentage_in_invoice = if invoice_total != 0 {
                line.total_price as f64 / invoice_total as f64
            } else {
                0.0
            };

            records.push(FlatRecord {
                invoice_id,
                created_on,
                invoiceitem_id: item_id,
                invoiceitem_name: item_name(item),
                item_type: item_type(item),
                unit_price: line.unit_price,
                total_price: line.total_price,
                percentage_in_invoice,
                is_expired,
            });
        }

        if non_numeric > 0 {
            tracing::warn!(
                "Invoice {}: skipped {} of {} items with missing or non-numeric unit_price/quantity",
                invoice_id,
                non_numeric,
                items.len()
            );
        }
        // 金额有效但没有整数ID: 已计入发票总额, 只是不输出
        if without_id > 0 {
            tracing::warn!(
                "Invoice {}: skipped {} of {} items without integer id",
                invoice_id,
                without_id,
                items.len()
            );
        }
        report.items_skipped += non_numeric + without_id;
        report.items_without_id += without_id;
    }

    /// 导出 CSV
    pub fn save(records: &[FlatRecord], output_path: &Path) -> Result<()> {
        files::write_csv(records, output_path)?;
        tracing::info!(
            "{} rows saved to '{}'",
            records.len(),
            output_path.display()
        );
        Ok(())
    }

    /// 按配置执行完整流程
    pub fn run(config: &AppConfig) -> Result<TransformReport> {
        let flattener = Self::load_files(&config.invoices_path, &config.expired_ids_path)?;
        let Flattened { records, report } = flattener.transform();
        Self::save(&records, &config.output_path)?;

        tracing::info!(
            "Flatten finished - invoices: {} (skipped {}), rows: {}, skipped items: {} ({} without id)",
            report.invoices_total,
            report.invoices_skipped,
            report.items_emitted,
            report.items_skipped,
            report.items_without_id
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemType;
    use serde_json::{json, Value};

    fn invoices(value: Value) -> Vec<Invoice> {
        serde_json::from_value(value).unwrap()
    }

    fn flatten(value: Value, expired: &str) -> Flattened {
        InvoiceFlattener::load(invoices(value), expired)
            .unwrap()
            .transform()
    }

    #[test]
    fn flattens_reference_invoice() {
        let out = flatten(
            json!([{
                "id": 1,
                "created_on": "2024-01-01",
                "items": [
                    {"id": 10, "unit_price": "100", "quantity": "2", "type": 0},
                    {"id": 11, "unit_price": "50", "quantity": "1", "type": 1}
                ]
            }]),
            "1",
        );

        assert_eq!(out.records.len(), 2);
        let first = &out.records[0];
        assert_eq!(
            (first.invoice_id, first.invoiceitem_id, first.item_type),
            (1, 10, ItemType::Material)
        );
        assert_eq!((first.unit_price, first.total_price), (100, 200));
        assert!((first.percentage_in_invoice - 0.8).abs() < 1e-12);
        assert!(first.is_expired);
        assert_eq!(first.invoiceitem_name, "Unknown");

        let second = &out.records[1];
        assert_eq!((second.invoiceitem_id, second.item_type), (11, ItemType::Equipment));
        assert_eq!((second.unit_price, second.total_price), (50, 50));
        assert!((second.percentage_in_invoice - 0.2).abs() < 1e-12);
        assert!(second.is_expired);
    }

    #[test]
    fn one_row_per_valid_item_with_expiry_membership() {
        let out = flatten(
            json!([
                {"id": 4, "created_on": "2024-02-01", "items": [
                    {"id": 1, "unit_price": "3", "quantity": "1"},
                    {"id": 2, "unit_price": "4", "quantity": "1"},
                    {"id": 3, "unit_price": "5", "quantity": "1"}
                ]},
                {"id": 5, "created_on": "2024-02-02", "items": [
                    {"id": 1, "unit_price": "7", "quantity": "2"}
                ]}
            ]),
            "5, 42",
        );

        let for_4: Vec<_> = out.records.iter().filter(|r| r.invoice_id == 4).collect();
        let for_5: Vec<_> = out.records.iter().filter(|r| r.invoice_id == 5).collect();
        assert_eq!(for_4.len(), 3);
        assert_eq!(for_5.len(), 1);
        assert!(for_4.iter().all(|r| !r.is_expired));
        assert!(for_5.iter().all(|r| r.is_expired));
        assert_eq!(out.report.items_skipped, 0);
    }

    #[test]
    fn percentages_sum_to_one_per_invoice() {
        let out = flatten(
            json!([{"id": 9, "created_on": "2024-05-05", "items": [
                {"id": 1, "unit_price": "1", "quantity": "1"},
                {"id": 2, "unit_price": "1", "quantity": "1"},
                {"id": 3, "unit_price": "1", "quantity": "1"}
            ]}]),
            "",
        );

        let sum: f64 = out.records.iter().map(|r| r.percentage_in_invoice).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_total_gives_zero_percentages() {
        let out = flatten(
            json!([{"id": 2, "created_on": "2024-05-05", "items": [
                {"id": 1, "unit_price": "0", "quantity": "4"},
                {"id": 2, "unit_price": "10", "quantity": "0"}
            ]}]),
            "",
        );

        assert_eq!(out.records.len(), 2);
        assert!(out.records.iter().all(|r| r.percentage_in_invoice == 0.0));
    }

    #[test]
    fn invalid_items_are_dropped_and_excluded_from_total() {
        let out = flatten(
            json!([{"id": 3, "created_on": "2024-01-01", "items": [
                {"id": 1, "unit_price": "abc", "quantity": "2"},
                {"id": 2, "unit_price": "10", "quantity": 5},
                {"id": 3, "unit_price": "10"},
                {"id": 4, "unit_price": "25", "quantity": "2"}
            ]}]),
            "",
        );

        assert_eq!(out.records.len(), 1);
        let only = &out.records[0];
        assert_eq!(only.invoiceitem_id, 4);
        assert_eq!(only.total_price, 50);
        assert_eq!(only.percentage_in_invoice, 1.0);
        assert_eq!(out.report.items_skipped, 3);
        assert_eq!(out.report.items_without_id, 0);
    }

    #[test]
    fn invalid_date_skips_whole_invoice() {
        let out = flatten(
            json!([
                {"id": 1, "created_on": "not-a-date", "items": [
                    {"id": 1, "unit_price": "1", "quantity": "1"}
                ]},
                {"id": 2, "items": [
                    {"id": 1, "unit_price": "1", "quantity": "1"}
                ]},
                {"id": 3, "created_on": "2024-01-01", "items": [
                    {"id": 1, "unit_price": "1", "quantity": "1"}
                ]}
            ]),
            "",
        );

        assert!(out.records.iter().all(|r| r.invoice_id == 3));
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.report.invoices_total, 3);
        assert_eq!(out.report.invoices_skipped, 2);
    }

    #[test]
    fn month_first_and_month_name_dates_keep_their_rows() {
        let out = flatten(
            json!([
                {"id": 1, "created_on": "01/15/2024", "items": [
                    {"id": 1, "unit_price": "1", "quantity": "1"}
                ]},
                {"id": 2, "created_on": "Jan 5, 2024", "items": [
                    {"id": 1, "unit_price": "1", "quantity": "1"}
                ]}
            ]),
            "",
        );

        assert_eq!(out.records.len(), 2);
        assert_eq!(out.report.invoices_skipped, 0);
        assert_eq!(out.records[0].created_on.to_string(), "2024-01-15 00:00:00");
        assert_eq!(out.records[1].created_on.to_string(), "2024-01-05 00:00:00");
    }

    #[test]
    fn rows_are_sorted_by_invoice_then_item() {
        let out = flatten(
            json!([
                {"id": 20, "created_on": "2024-01-01", "items": [
                    {"id": 5, "unit_price": "1", "quantity": "1"},
                    {"id": 2, "unit_price": "1", "quantity": "1"}
                ]},
                {"id": 7, "created_on": "2024-01-01", "items": [
                    {"id": 9, "unit_price": "1", "quantity": "1"},
                    {"id": 1, "unit_price": "1", "quantity": "1"}
                ]}
            ]),
            "",
        );

        let keys: Vec<_> = out
            .records
            .iter()
            .map(|r| (r.invoice_id, r.invoiceitem_id))
            .collect();
        assert_eq!(keys, vec![(7, 1), (7, 9), (20, 2), (20, 5)]);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn item_without_id_is_dropped_but_counts_toward_total() {
        let out = flatten(
            json!([{"id": 1, "created_on": "2024-01-01", "items": [
                {"unit_price": "30", "quantity": "1"},
                {"id": 2, "unit_price": "10", "quantity": "1"}
            ]}]),
            "",
        );

        assert_eq!(out.records.len(), 1);
        assert!((out.records[0].percentage_in_invoice - 0.25).abs() < 1e-12);
        assert_eq!(out.report.items_skipped, 1);
        assert_eq!(out.report.items_without_id, 1);
    }

    #[test]
    fn skip_causes_are_counted_separately() {
        let out = flatten(
            json!([{"id": 6, "created_on": "2024-01-01", "items": [
                {"id": 1, "unit_price": "abc", "quantity": "1"},
                {"id": 2, "unit_price": "5", "quantity": 1},
                {"id": "3", "unit_price": "5", "quantity": "1"},
                {"id": 4, "unit_price": "5", "quantity": "1"}
            ]}]),
            "",
        );

        assert_eq!(out.records.len(), 1);
        assert_eq!(out.report.items_skipped, 3);
        assert_eq!(out.report.items_without_id, 1);
    }

    #[test]
    fn empty_input_produces_no_rows() {
        let out = flatten(json!([]), "");
        assert!(out.records.is_empty());
        assert_eq!(out.report, TransformReport::default());
    }

    #[test]
    fn malformed_expired_text_fails_load() {
        assert!(InvoiceFlattener::load(Vec::new(), "1;2").is_err());
    }
}
