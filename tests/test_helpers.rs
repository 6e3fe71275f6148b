// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库初始化、EAV 测试数据准备
// ==========================================

#![allow(dead_code)]

use bullet_points::db::{configure_sqlite_connection, init_schema};
use bullet_points::domain::{AttributeDescriptor, BackendType};
use bullet_points::repository::{AttributeMetadataRepository, EntityRepository};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 派生属性编码（与默认配置一致）
pub const TARGET_CODE: &str = "selling_features_bullets";

/// 测试用指定作用域
pub const STORE_SCOPE: i64 = 1;

/// 测试类目
pub const CATEGORY_ID: i64 = 3;

pub fn color() -> AttributeDescriptor {
    AttributeDescriptor::new(10, "color", "Color", BackendType::Varchar)
}

pub fn material() -> AttributeDescriptor {
    AttributeDescriptor::new(11, "material", "Material", BackendType::Text)
}

pub fn pieces() -> AttributeDescriptor {
    AttributeDescriptor::new(12, "pieces", "Pieces", BackendType::Int)
}

pub fn sku_attribute() -> AttributeDescriptor {
    AttributeDescriptor::new(14, "sku", "SKU", BackendType::Static)
}

pub fn target() -> AttributeDescriptor {
    AttributeDescriptor::new(90, TARGET_CODE, "Selling Features", BackendType::Text)
}

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是 UTF-8")?
        .to_string();

    let conn = Connection::open(&db_path)?;
    configure_sqlite_connection(&conn)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接
pub fn open_shared(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    let conn = bullet_points::db::open_sqlite_connection(db_path)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 准备标准测试目录
///
/// 属性: color(varchar) / material(text) / pieces(int) / sku(static) / 派生属性(text)
/// 实体（全部属于类目 3）:
/// - 101 A1: color=red（定义作用域）
/// - 102 A2: color=red（定义作用域）, blue（作用域 1）
/// - 103 A3: 无任何值
/// - 104 A4: material=leather
/// - 105 A5: material=canvas, pieces=2
pub fn seed_catalog(conn: &Arc<Mutex<Connection>>) -> Result<(), Box<dyn Error>> {
    let attributes = AttributeMetadataRepository::from_connection(conn.clone());
    for attribute in [color(), material(), pieces(), sku_attribute(), target()] {
        attributes.upsert(&attribute)?;
    }

    let entities = EntityRepository::from_connection(conn.clone());
    entities.upsert_category(CATEGORY_ID, "Shoes")?;
    for (position, (id, sku)) in [(101, "A1"), (102, "A2"), (103, "A3"), (104, "A4"), (105, "A5")]
        .into_iter()
        .enumerate()
    {
        entities.upsert_entity(id, sku)?;
        entities.assign_category(CATEGORY_ID, id, position as i64)?;
    }

    entities.set_attribute_value(101, &color(), 0, Some("red"))?;
    entities.set_attribute_value(102, &color(), 0, Some("red"))?;
    entities.set_attribute_value(102, &color(), STORE_SCOPE, Some("blue"))?;
    entities.set_attribute_value(104, &material(), 0, Some("leather"))?;
    entities.set_attribute_value(105, &material(), 0, Some("canvas"))?;
    entities.set_attribute_value(105, &pieces(), 0, Some("2"))?;

    Ok(())
}

/// 读取派生属性（定义作用域）
pub fn derived_value(
    conn: &Arc<Mutex<Connection>>,
    entity_id: i64,
) -> Result<Option<String>, Box<dyn Error>> {
    let conn = conn.lock().map_err(|e| e.to_string())?;
    let value: Option<Option<String>> = conn
        .query_row(
            "SELECT value FROM catalog_entity_text WHERE attribute_id = ?1 AND scope_id = 0 AND entity_id = ?2",
            params![target().id, entity_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value.flatten())
}

/// 片段: 单个 (code, label, value) 列表
pub fn fragment(items: &[(&str, &str, &str)]) -> String {
    let body: String = items
        .iter()
        .map(|(code, label, value)| {
            format!(
                r#"<dt class="{code}_label">{label}</dt><dd class="{code}_value">{value}</dd>"#
            )
        })
        .collect();
    format!("<dl>{}</dl>", body)
}
