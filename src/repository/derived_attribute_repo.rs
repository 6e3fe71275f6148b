use crate::domain::{AttributeDescriptor, BackendType};
use crate::repository::collaborators::EntityWriter;
use crate::repository::entity_repo::upsert_attribute_value;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// 派生属性写入作用域（定义作用域）
pub const DERIVED_ATTRIBUTE_SCOPE_ID: i64 = 0;

// ==========================================
// DerivedAttributeRepository - 派生属性写入
// ==========================================
/// 将渲染片段写入目标属性（定义作用域）
///
/// 每次写入是独立事务: 校验实体存在 → UPSERT 值 → 刷新 updated_at
pub struct DerivedAttributeRepository {
    conn: Arc<Mutex<Connection>>,
    target_attribute_code: String,
}

impl DerivedAttributeRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>, target_attribute_code: &str) -> Self {
        Self {
            conn,
            target_attribute_code: target_attribute_code.to_string(),
        }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn load_target(&self, conn: &Connection) -> RepositoryResult<AttributeDescriptor> {
        let raw: Option<(i64, String, String, String)> = conn
            .query_row(
                r#"
                SELECT attribute_id, attribute_code, frontend_label, backend_type
                FROM eav_attribute
                WHERE attribute_code = ?1
                "#,
                params![self.target_attribute_code],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()
            .map_err(RepositoryError::persistence)?;

        let (id, code, label, backend_raw) = raw.ok_or_else(|| {
            RepositoryError::PersistenceError(format!(
                "派生属性未定义: {}",
                self.target_attribute_code
            ))
        })?;

        let backend_type = backend_raw
            .parse::<BackendType>()
            .map_err(RepositoryError::PersistenceError)?;
        if backend_type.is_static() {
            return Err(RepositoryError::PersistenceError(format!(
                "派生属性不能是 static 类型: {}",
                code
            )));
        }

        Ok(AttributeDescriptor {
            id,
            code,
            label,
            backend_type,
        })
    }
}

impl EntityWriter for DerivedAttributeRepository {
    fn target_attribute_code(&self) -> &str {
        &self.target_attribute_code
    }

    fn set_derived_attribute(&self, entity_id: i64, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let target = self.load_target(&conn)?;

        let tx = conn
            .unchecked_transaction()
            .map_err(RepositoryError::persistence)?;

        let touched = tx
            .execute(
                "UPDATE catalog_entity SET updated_at = datetime('now') WHERE entity_id = ?1",
                params![entity_id],
            )
            .map_err(RepositoryError::persistence)?;
        if touched == 0 {
            return Err(RepositoryError::not_found("catalog_entity", entity_id));
        }

        upsert_attribute_value(
            &tx,
            entity_id,
            &target,
            DERIVED_ATTRIBUTE_SCOPE_ID,
            Some(value),
        )?;

        tx.commit().map_err(RepositoryError::persistence)?;
        Ok(())
    }
}
