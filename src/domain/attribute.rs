// ==========================================
// Bullet Points - 属性领域类型
// ==========================================
// EAV: 属性值按 backend_type 存放在独立的值表中,
// 每行以 (attribute_id, scope_id, entity_id) 唯一
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ==========================================
// 存储类型 (Backend Type)
// ==========================================
// 序列化格式: lowercase (与 eav_attribute.backend_type 一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    Static,   // 实体表上的固定列,不在值表中
    Varchar,
    Text,
    Int,
    Decimal,
    Datetime,
}

impl BackendType {
    /// 所有取值（用于建表与校验）
    pub const ALL: [BackendType; 6] = [
        BackendType::Static,
        BackendType::Varchar,
        BackendType::Text,
        BackendType::Int,
        BackendType::Decimal,
        BackendType::Datetime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::Static => "static",
            BackendType::Varchar => "varchar",
            BackendType::Text => "text",
            BackendType::Int => "int",
            BackendType::Decimal => "decimal",
            BackendType::Datetime => "datetime",
        }
    }

    /// 对应的值表名
    ///
    /// static 属性没有值表,返回 None
    pub fn value_table(&self) -> Option<&'static str> {
        match self {
            BackendType::Static => None,
            BackendType::Varchar => Some("catalog_entity_varchar"),
            BackendType::Text => Some("catalog_entity_text"),
            BackendType::Int => Some("catalog_entity_int"),
            BackendType::Decimal => Some("catalog_entity_decimal"),
            BackendType::Datetime => Some("catalog_entity_datetime"),
        }
    }

    /// 值表中 value 列的 SQLite 类型
    pub fn column_type(&self) -> &'static str {
        match self {
            BackendType::Int => "INTEGER",
            BackendType::Decimal => "REAL",
            _ => "TEXT",
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, BackendType::Static)
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(BackendType::Static),
            "varchar" => Ok(BackendType::Varchar),
            "text" => Ok(BackendType::Text),
            "int" => Ok(BackendType::Int),
            "decimal" => Ok(BackendType::Decimal),
            "datetime" => Ok(BackendType::Datetime),
            other => Err(format!("未知的 backend_type: {}", other)),
        }
    }
}

// ==========================================
// AttributeDescriptor - 属性描述
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    pub id: i64,
    pub code: String,
    pub label: String,
    pub backend_type: BackendType,
}

impl AttributeDescriptor {
    pub fn new(id: i64, code: &str, label: &str, backend_type: BackendType) -> Self {
        Self {
            id,
            code: code.to_string(),
            label: label.to_string(),
            backend_type,
        }
    }
}

// ==========================================
// ResolvedAttributeValue - 作用域回退后的属性值
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAttributeValue {
    pub entity_id: i64,
    pub attribute_id: i64,
    pub code: String,
    pub label: String,
    /// None: 定义作用域与指定作用域都没有记录
    pub value: Option<String>,
}

impl ResolvedAttributeValue {
    /// 值是否可渲染
    ///
    /// None / 空串 / "0" 都视为空（整型属性存 0 时不输出）
    pub fn has_value(&self) -> bool {
        self.value
            .as_deref()
            .map_or(false, |v| !v.is_empty() && v != "0")
    }
}

// ==========================================
// ResolvedEntity - 单个实体的解析结果
// ==========================================
// values 无固有顺序,渲染顺序由调用方的 attribute_id 序列决定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntity {
    pub entity_id: i64,
    pub sku: String,
    pub values: HashMap<i64, ResolvedAttributeValue>,
}

impl ResolvedEntity {
    pub fn new(entity_id: i64, sku: String) -> Self {
        Self {
            entity_id,
            sku,
            values: HashMap::new(),
        }
    }

    /// 按属性编码取值（测试与日志使用）
    pub fn value_by_code(&self, code: &str) -> Option<&str> {
        self.values
            .values()
            .find(|v| v.code == code)
            .and_then(|v| v.value.as_deref())
    }
}
