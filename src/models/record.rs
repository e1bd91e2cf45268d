use chrono::NaiveDateTime;
use std::fmt;

/// 输出列 (固定顺序)
pub const COLUMNS: [&str; 9] = [
    "invoice_id",
    "created_on",
    "invoiceitem_id",
    "invoiceitem_name",
    "type",
    "unit_price",
    "total_price",
    "percentage_in_invoice",
    "is_expired",
];

/// 明细类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    Material,
    Equipment,
    Service,
    Other,
}

impl ItemType {
    /// 缺省类型编码
    pub const DEFAULT_CODE: i64 = 3;

    /// 0/1/2 有对应类型, 其余编码一律归为 Other
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => ItemType::Material,
            1 => ItemType::Equipment,
            2 => ItemType::Service,
            _ => ItemType::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemType::Material => "Material",
            ItemType::Equipment => "Equipment",
            ItemType::Service => "Service",
            ItemType::Other => "Other",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 扁平化后的明细行
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRecord {
    pub invoice_id: i64,
    pub created_on: NaiveDateTime,
    pub invoiceitem_id: i64,
    pub invoiceitem_name: String,
    pub item_type: ItemType,
    pub unit_price: i64,
    pub total_price: i64,
    pub percentage_in_invoice: f64,
    pub is_expired: bool,
}

/// 转换统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformReport {
    pub invoices_total: usize,
    pub invoices_skipped: usize,
    pub items_emitted: usize,
    /// 所有未输出的明细 (含下面的无ID明细)
    pub items_skipped: usize,
    /// 金额有效但缺少整数ID的明细
    pub items_without_id: usize,
}

/// 对照期望列检查结果表, 返回缺失的列名
///
/// 没有任何行时结果表不含任何列。
pub fn missing_columns(records: &[FlatRecord]) -> Vec<&'static str> {
    if records.is_empty() {
        COLUMNS.to_vec()
    } else {
        Vec::new()
    }
}
