use crate::models::{Item, ItemType, RawValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// 纯日期写法; 斜杠日期先按月/日/年, 不成立再按日/月/年
const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d-%B-%Y",
];

/// 解析 created_on, 带时区偏移的时间统一换算为 UTC
pub fn parse_created_on(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    let date = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| parse_compact_date(text))
        .or_else(|| parse_year_month(text))?;
    date.and_hms_opt(0, 0, 0)
}

/// YYYY-MM, 取当月 1 日
fn parse_year_month(text: &str) -> Option<NaiveDate> {
    let (year, month) = text.split_once('-')?;
    if year.len() != 4 || month.is_empty() || month.len() > 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

/// YYYYMMDD
fn parse_compact_date(text: &str) -> Option<NaiveDate> {
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = text[..4].parse().ok()?;
    let month = text[4..6].parse().ok()?;
    let day = text[6..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// 纯数字字符串才算有效金额/数量; 非字符串、空串、溢出一律无效
pub fn parse_digits(value: Option<&RawValue>) -> Option<i64> {
    let text = value?.as_text()?;
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// 明细的计价结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub unit_price: i64,
    pub quantity: i64,
    pub total_price: i64,
}

/// 单价和数量都有效时返回计价结果
pub fn price_item(item: &Item) -> Option<PricedLine> {
    let unit_price = parse_digits(item.unit_price.as_ref())?;
    let quantity = parse_digits(item.quantity.as_ref())?;
    let total_price = unit_price.checked_mul(quantity)?;
    Some(PricedLine {
        unit_price,
        quantity,
        total_price,
    })
}

/// 类型编码缺失或不是整数时按 3 (Other) 处理
pub fn item_type(item: &Item) -> ItemType {
    let code = item
        .type_code
        .as_ref()
        .and_then(RawValue::as_code)
        .unwrap_or(ItemType::DEFAULT_CODE);
    ItemType::from_code(code)
}

/// 名称缺失时为 Unknown
pub fn item_name(item: &Item) -> String {
    match &item.name {
        Some(name) => name.to_string(),
        None => "Unknown".to_string(),
    }
}
