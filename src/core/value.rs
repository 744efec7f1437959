//! 字符串值与类型化值之间的转换。所有值都以文本流转，
//! 只在读写边界按 value_type 解析。

use crate::models::{BoolEncoding, OptionDefinition, StorageTarget, ValueType};

const TRUTHY: [&str; 4] = ["on", "1", "true", "yes"];
const FALSY: [&str; 4] = ["off", "0", "false", "no"];

/// 命令存储读出的布尔值统一成 `"true"`/`"false"`；无法识别的原样返回
pub fn normalize_bool(option: &OptionDefinition, raw: &str) -> String {
    if option.value_type != ValueType::Bool {
        return raw.to_string();
    }
    if TRUTHY.contains(&raw) {
        "true".to_string()
    } else if FALSY.contains(&raw) {
        "false".to_string()
    } else {
        raw.to_string()
    }
}

/// UI 规范值 → 存储编码。只对写入命令存储的布尔选项生效，
/// 结构化存储的布尔值保持 `"true"`/`"false"`。
pub fn encode_for_storage(option: &OptionDefinition, value: &str) -> String {
    if option.value_type != ValueType::Bool {
        return value.to_string();
    }
    if let StorageTarget::Structured = option.storage {
        return value.to_string();
    }

    let truthy = value.eq_ignore_ascii_case("true") || value == "1" || value.eq_ignore_ascii_case("on");
    match (option.bool_encoding, truthy) {
        (BoolEncoding::OnOff, true) => "on".to_string(),
        (BoolEncoding::OnOff, false) => "off".to_string(),
        (BoolEncoding::OneZero, true) => "1".to_string(),
        (BoolEncoding::OneZero, false) => "0".to_string(),
    }
}

/// 任意编码的真值判断，供可见性谓词使用
pub fn is_truthy(raw: &str) -> bool {
    let lower = raw.trim().to_ascii_lowercase();
    TRUTHY.contains(&lower.as_str())
}

/// 仅对 bool 选项解析
pub fn as_bool(option: &OptionDefinition, raw: &str) -> Option<bool> {
    if option.value_type != ValueType::Bool {
        return None;
    }
    let lower = raw.trim().to_ascii_lowercase();
    if TRUTHY.contains(&lower.as_str()) {
        Some(true)
    } else if FALSY.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// 仅对 float 选项解析
pub fn as_float(option: &OptionDefinition, raw: &str) -> Option<f64> {
    if option.value_type != ValueType::Float {
        return None;
    }
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 按选项精度格式化数值
pub fn format_float(option: &OptionDefinition, value: f64) -> String {
    format!("{:.*}", option.precision as usize, value)
}
