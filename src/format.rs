//! CSV 单元格的文本格式

/// 布尔值写作 True / False
pub fn format_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// 浮点数: 最短可还原的十进制表示, 整数值保留 ".0",
/// 指数形式写作 1e-05 / 1e+16
pub fn format_float(value: f64) -> String {
    let repr = format!("{:?}", value);
    if !repr.contains('e') {
        return repr;
    }

    let (mantissa, exponent) = repr.split_once('e').unwrap_or((repr.as_str(), "0"));

    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{}e{}{:0>2}", mantissa, sign, digits)
}
