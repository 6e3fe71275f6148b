use crate::db::open_sqlite_connection;
use crate::domain::{AttributeDescriptor, BackendType};
use crate::repository::collaborators::AttributeMetadataResolver;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

// ==========================================
// AttributeMetadataRepository - 属性定义仓储
// ==========================================
/// 属性定义仓储
/// 职责: 读写 eav_attribute 表
/// 红线: 不含业务逻辑，只负责数据访问
pub struct AttributeMetadataRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AttributeMetadataRepository {
    /// 创建新的 AttributeMetadataRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row) -> rusqlite::Result<(i64, String, String, String)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    }

    fn to_descriptor(
        (id, code, label, backend_raw): (i64, String, String, String),
    ) -> RepositoryResult<AttributeDescriptor> {
        let backend_type = backend_raw.parse::<BackendType>().map_err(|e| {
            RepositoryError::ValidationError(format!("attribute_id={}: {}", id, e))
        })?;
        Ok(AttributeDescriptor {
            id,
            code,
            label,
            backend_type,
        })
    }

    /// 按属性编码查询
    ///
    /// # 返回
    /// - Ok(Some): 找到记录
    /// - Ok(None): 未找到记录
    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<AttributeDescriptor>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                r#"
                SELECT attribute_id, attribute_code, frontend_label, backend_type
                FROM eav_attribute
                WHERE attribute_code = ?1
                "#,
                params![code],
                Self::map_row,
            )
            .optional()?;

        raw.map(Self::to_descriptor).transpose()
    }

    /// 插入或更新属性定义（按 attribute_id）
    pub fn upsert(&self, attribute: &AttributeDescriptor) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO eav_attribute (attribute_id, attribute_code, frontend_label, backend_type)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(attribute_id) DO UPDATE SET
                attribute_code = excluded.attribute_code,
                frontend_label = excluded.frontend_label,
                backend_type = excluded.backend_type
            "#,
            params![
                attribute.id,
                attribute.code,
                attribute.label,
                attribute.backend_type.as_str()
            ],
        )
        .map_err(RepositoryError::persistence)?;
        Ok(())
    }
}

impl AttributeMetadataResolver for AttributeMetadataRepository {
    fn get(&self, attribute_ids: &[i64]) -> RepositoryResult<Vec<AttributeDescriptor>> {
        if attribute_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut seen = HashSet::new();
        let requested: Vec<i64> = attribute_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let conn = self.get_conn()?;
        let placeholders = requested.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let query = format!(
            "SELECT attribute_id, attribute_code, frontend_label, backend_type \
             FROM eav_attribute WHERE attribute_id IN ({})",
            placeholders
        );

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(requested.iter()), Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut by_id: HashMap<i64, AttributeDescriptor> = HashMap::with_capacity(rows.len());
        for raw in rows {
            let descriptor = Self::to_descriptor(raw)?;
            by_id.insert(descriptor.id, descriptor);
        }

        requested
            .into_iter()
            .map(|id| {
                by_id
                    .remove(&id)
                    .ok_or_else(|| RepositoryError::not_found("eav_attribute", id))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_repo() -> AttributeMetadataRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        let repo = AttributeMetadataRepository::from_connection(Arc::new(Mutex::new(conn)));

        repo.upsert(&AttributeDescriptor::new(10, "color", "Color", BackendType::Varchar))
            .unwrap();
        repo.upsert(&AttributeDescriptor::new(11, "weight", "Weight", BackendType::Decimal))
            .unwrap();
        repo.upsert(&AttributeDescriptor::new(12, "sku", "SKU", BackendType::Static))
            .unwrap();
        repo
    }

    #[test]
    fn test_get_preserves_request_order_and_dedups() {
        let repo = setup_repo();

        let attributes = repo.get(&[12, 10, 11, 10]).unwrap();
        let ids: Vec<i64> = attributes.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![12, 10, 11]);

        // static 属性由调用方过滤
        assert_eq!(attributes[0].backend_type, BackendType::Static);
        assert_eq!(attributes[2].backend_type, BackendType::Decimal);
    }

    #[test]
    fn test_get_unknown_id_is_not_found() {
        let repo = setup_repo();

        let err = repo.get(&[10, 99]).unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::NotFound { ref entity, ref id } if entity == "eav_attribute" && id == "99"
        ));
    }

    #[test]
    fn test_find_by_code() {
        let repo = setup_repo();

        let found = repo.find_by_code("weight").unwrap().unwrap();
        assert_eq!(found.id, 11);
        assert_eq!(found.label, "Weight");

        assert!(repo.find_by_code("missing").unwrap().is_none());
    }
}
