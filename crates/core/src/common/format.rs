//! 展示层数值格式化。
//!
//! 只生成字符串，不修改任何原始数值；调用方应始终同时保留原值。

use rust_decimal::{Decimal, RoundingStrategy};

/// # Summary
/// 按千分位分组并固定小数位数。
///
/// # Logic
/// 1. 以远离零的方式四舍五入到 `scale` 位小数。
/// 2. 调整精度使小数位数恰好为 `scale`。
/// 3. 整数部分每三位插入一个逗号，保留负号。
///
/// # Arguments
/// * `value`: 原始数值。
/// * `scale`: 小数位数。
///
/// # Returns
/// 例如 `1234567.891` 与 `2` 得到 `"1,234,567.89"`。
pub fn group_thousands(value: Decimal, scale: u32) -> String {
    let mut rounded = value
        .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
        .abs();
    rounded.rescale(scale);

    let text = rounded.to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(text.len() + int_part.len() / 3 + 1);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    let is_negative = value.is_sign_negative() && !rounded.is_zero();
    if is_negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// 美元金额，两位小数，负数写作 `-$1,234.50`。
pub fn format_usd(value: Decimal) -> String {
    let body = group_thousands(value.abs(), 2);
    if value.is_sign_negative() && body != "0.00" {
        format!("-${}", body)
    } else {
        format!("${}", body)
    }
}

/// 带显式正负号的美元金额，用于盈亏展示 (`+$2,000.00`)。
pub fn format_signed_usd(value: Decimal) -> String {
    if value > Decimal::ZERO {
        format!("+{}", format_usd(value))
    } else {
        format_usd(value)
    }
}

/// 百分比，去除多余的尾随零 (`60%`, `12.5%`)。
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", value.normalize())
}
