use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 控件类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    Toggle,
    NumericRange,
    ChoiceList,
    RadioHorizontal,
    RadioVertical,
    FreeText,
    NumberInput,
    Separator,
    Title,
}

impl OptionType {
    /// 分隔线和标题不携带值
    pub fn is_decorative(self) -> bool {
        matches!(self, OptionType::Separator | OptionType::Title)
    }
}

/// 值类型：所有值都以字符串存储，类型只决定解析方式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Bool,
    Float,
}

/// 命令存储中布尔值的写出编码
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BoolEncoding {
    #[default]
    OnOff,
    OneZero,
}

/// 值所在的存储
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageTarget {
    /// 结构化存储，按选项路径寻址
    #[default]
    Structured,
    /// 命令存储，按控制台命令名寻址
    Command(String),
}

impl StorageTarget {
    pub fn command(&self) -> Option<&str> {
        match self {
            StorageTarget::Structured => None,
            StorageTarget::Command(name) => Some(name),
        }
    }
}

/// 列表/单选项
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Choice {
    pub value: String,
    pub display_key: Option<String>,
}

impl Choice {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display_key: None,
        }
    }
}

/// 可见性谓词。以数据而非闭包表示，schema 可比较、可序列化。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityRule {
    Equals { command: String, value: String },
    NotEquals { command: String, value: String },
    Truthy { command: String },
    All(Vec<VisibilityRule>),
    Any(Vec<VisibilityRule>),
    Not(Box<VisibilityRule>),
}

impl VisibilityRule {
    pub fn equals(command: &str, value: &str) -> Self {
        VisibilityRule::Equals {
            command: command.to_string(),
            value: value.to_string(),
        }
    }

    pub fn not_equals(command: &str, value: &str) -> Self {
        VisibilityRule::NotEquals {
            command: command.to_string(),
            value: value.to_string(),
        }
    }

    pub fn truthy(command: &str) -> Self {
        VisibilityRule::Truthy {
            command: command.to_string(),
        }
    }
}

/// 单个选项的静态定义
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionDefinition {
    pub id: String,
    pub option_type: OptionType,
    pub value_type: ValueType,
    pub storage: StorageTarget,
    /// 规范文本形式的硬编码默认值
    pub default_value: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub precision: u32,
    pub choices: Vec<Choice>,
    pub bool_encoding: BoolEncoding,
    pub visible_when: Option<VisibilityRule>,
    pub label: Option<String>,
    pub description: Option<String>,
}

impl OptionDefinition {
    pub fn new(id: &str, option_type: OptionType, value_type: ValueType, default_value: &str) -> Self {
        Self {
            id: id.to_string(),
            option_type,
            value_type,
            storage: StorageTarget::Structured,
            default_value: default_value.to_string(),
            min: None,
            max: None,
            step: None,
            precision: 2,
            choices: Vec::new(),
            bool_encoding: BoolEncoding::OnOff,
            visible_when: None,
            label: None,
            description: None,
        }
    }

    pub fn toggle(id: &str, default_value: &str) -> Self {
        Self::new(id, OptionType::Toggle, ValueType::Bool, default_value)
    }

    pub fn range(id: &str, default_value: &str, min: f64, max: f64, step: f64) -> Self {
        let mut opt = Self::new(id, OptionType::NumericRange, ValueType::Float, default_value);
        opt.min = Some(min);
        opt.max = Some(max);
        opt.step = Some(step);
        opt
    }

    pub fn list(id: &str, default_value: &str, choices: &[&str]) -> Self {
        let mut opt = Self::new(id, OptionType::ChoiceList, ValueType::String, default_value);
        opt.choices = choices.iter().map(|c| Choice::new(*c)).collect();
        opt
    }

    pub fn radio(id: &str, default_value: &str, choices: &[&str]) -> Self {
        let mut opt = Self::list(id, default_value, choices);
        opt.option_type = OptionType::RadioHorizontal;
        opt
    }

    pub fn radio_vertical(id: &str, default_value: &str, choices: &[&str]) -> Self {
        let mut opt = Self::list(id, default_value, choices);
        opt.option_type = OptionType::RadioVertical;
        opt
    }

    pub fn text(id: &str, default_value: &str) -> Self {
        Self::new(id, OptionType::FreeText, ValueType::String, default_value)
    }

    pub fn number_input(id: &str, default_value: &str) -> Self {
        Self::new(id, OptionType::NumberInput, ValueType::Float, default_value)
    }

    pub fn title(id: &str) -> Self {
        Self::new(id, OptionType::Title, ValueType::String, "")
    }

    pub fn separator(id: &str) -> Self {
        Self::new(id, OptionType::Separator, ValueType::String, "")
    }

    pub fn command(mut self, name: &str) -> Self {
        self.storage = StorageTarget::Command(name.to_string());
        self
    }

    pub fn one_zero(mut self) -> Self {
        self.bool_encoding = BoolEncoding::OneZero;
        self
    }

    pub fn precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn visible_when(mut self, rule: VisibilityRule) -> Self {
        self.visible_when = Some(rule);
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn is_decorative(&self) -> bool {
        self.option_type.is_decorative()
    }

    pub fn command_name(&self) -> Option<&str> {
        self.storage.command()
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// 选项组
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionGroup {
    pub id: String,
    pub options: Vec<OptionDefinition>,
}

/// 选项页
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionPage {
    pub id: String,
    pub groups: Vec<OptionGroup>,
}

/// 选项路径 `page/group/id`，结构化存储与暂存区的统一键
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct OptionPath(String);

impl OptionPath {
    pub fn new(page_id: &str, group_id: &str, option_id: &str) -> Self {
        Self(format!("{}/{}/{}", page_id, group_id, option_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 是否属于指定页（按 `page/` 前缀判断）
    pub fn in_page(&self, page_id: &str) -> bool {
        self.0
            .strip_prefix(page_id)
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl fmt::Display for OptionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OptionPath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// 写请求中的存储标记；`command` 仅在命令存储时出现
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "storageType")]
pub enum StorageKind {
    #[serde(rename = "structured")]
    Structured,
    #[serde(rename = "command")]
    Command { command: String },
}

impl StorageKind {
    pub fn command(&self) -> Option<&str> {
        match self {
            StorageKind::Structured => None,
            StorageKind::Command { command } => Some(command),
        }
    }
}

impl From<&StorageTarget> for StorageKind {
    fn from(target: &StorageTarget) -> Self {
        match target {
            StorageTarget::Structured => StorageKind::Structured,
            StorageTarget::Command(name) => StorageKind::Command {
                command: name.clone(),
            },
        }
    }
}

/// 暂存的修改，同时也是 `save_options` 的 Change 结构。
/// value 已按目标存储编码。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PendingChange {
    pub path: OptionPath,
    pub value: String,
    #[serde(flatten)]
    pub storage: StorageKind,
}

impl PendingChange {
    pub fn command(&self) -> Option<&str> {
        self.storage.command()
    }
}

/// `reset_options_to_defaults` 的条目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResetEntry {
    pub path: OptionPath,
    pub default_value: String,
    #[serde(flatten)]
    pub storage: StorageKind,
}

/// `get_options` 的返回
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptionsSnapshot {
    #[serde(default)]
    pub structured_values: HashMap<String, String>,
    #[serde(default)]
    pub command_values: HashMap<String, String>,
}

/// 默认值层级：section（`{page}_{group}`）→ 选项 id → 默认值
pub type DefaultsMap = HashMap<String, HashMap<String, String>>;
