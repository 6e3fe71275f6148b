use crate::db::open_sqlite_connection;
use crate::domain::{AttributeDescriptor, EntityRecord, EntitySelection};
use crate::repository::collaborators::{EntityReader, EntitySelector};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// ==========================================
// EntityRepository - 实体与类目成员关系仓储
// ==========================================
/// 实体仓储
/// 职责: catalog_entity / catalog_category / catalog_category_entity 的读写,
///       以及按作用域写入单个属性值
/// 红线: 不含业务逻辑，只负责数据访问
pub struct EntityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EntityRepository {
    /// 创建新的 EntityRepository 实例
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

    // ===== 写入（数据准备/导入使用）=====

    /// 插入实体（entity_id 已存在时更新 SKU）
    pub fn upsert_entity(&self, entity_id: i64, sku: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO catalog_entity (entity_id, sku)
            VALUES (?1, ?2)
            ON CONFLICT(entity_id) DO UPDATE SET
                sku = excluded.sku,
                updated_at = datetime('now')
            "#,
            params![entity_id, sku],
        )
        .map_err(RepositoryError::persistence)?;
        Ok(())
    }

    /// 插入类目（已存在时更新名称）
    pub fn upsert_category(&self, category_id: i64, name: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO catalog_category (category_id, name) VALUES (?1, ?2)
            ON CONFLICT(category_id) DO UPDATE SET name = excluded.name
            "#,
            params![category_id, name],
        )
        .map_err(RepositoryError::persistence)?;
        Ok(())
    }

    /// 将实体加入类目
    pub fn assign_category(
        &self,
        category_id: i64,
        entity_id: i64,
        position: i64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO catalog_category_entity (category_id, entity_id, position)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(category_id, entity_id) DO UPDATE SET position = excluded.position
            "#,
            params![category_id, entity_id, position],
        )
        .map_err(RepositoryError::persistence)?;
        Ok(())
    }

    /// 在指定作用域写入属性值（UPSERT, 按 attribute_id + scope_id + entity_id 唯一）
    ///
    /// # 参数
    /// - value: None 表示写入 NULL 值的记录（记录存在但值为空）
    ///
    /// # 错误
    /// - static 属性没有值表 → ValidationError
    pub fn set_attribute_value(
        &self,
        entity_id: i64,
        attribute: &AttributeDescriptor,
        scope_id: i64,
        value: Option<&str>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        upsert_attribute_value(&conn, entity_id, attribute, scope_id, value)
    }

    /// 查询单个作用域下的原始属性值（不做作用域回退）
    pub fn find_attribute_value(
        &self,
        entity_id: i64,
        attribute: &AttributeDescriptor,
        scope_id: i64,
    ) -> RepositoryResult<Option<String>> {
        let table = attribute.backend_type.value_table().ok_or_else(|| {
            RepositoryError::ValidationError(format!(
                "static 属性没有值表: {}",
                attribute.code
            ))
        })?;

        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT CAST(value AS TEXT) FROM {} WHERE attribute_id = ?1 AND scope_id = ?2 AND entity_id = ?3",
            table
        );
        let value: Option<Option<String>> = conn
            .query_row(&sql, params![attribute.id, scope_id, entity_id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value.flatten())
    }
}

/// 在已持有的连接/事务上执行属性值 UPSERT
pub(crate) fn upsert_attribute_value(
    conn: &Connection,
    entity_id: i64,
    attribute: &AttributeDescriptor,
    scope_id: i64,
    value: Option<&str>,
) -> RepositoryResult<()> {
    let table = attribute.backend_type.value_table().ok_or_else(|| {
        RepositoryError::ValidationError(format!("static 属性没有值表: {}", attribute.code))
    })?;

    let sql = format!(
        r#"
        INSERT INTO {} (attribute_id, scope_id, entity_id, value)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(attribute_id, scope_id, entity_id) DO UPDATE SET value = excluded.value
        "#,
        table
    );
    conn.execute(&sql, params![attribute.id, scope_id, entity_id, value])
        .map_err(RepositoryError::persistence)?;
    Ok(())
}

impl EntitySelector for EntityRepository {
    fn resolve_categories(&self, category_ids: &[i64]) -> RepositoryResult<Vec<i64>> {
        let mut seen = HashSet::new();
        let requested: Vec<i64> = category_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        if requested.is_empty() {
            return Ok(requested);
        }

        let conn = self.get_conn()?;
        let placeholders = requested.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let query = format!(
            "SELECT category_id FROM catalog_category WHERE category_id IN ({})",
            placeholders
        );
        let mut stmt = conn.prepare(&query)?;
        let existing: HashSet<i64> = stmt
            .query_map(rusqlite::params_from_iter(requested.iter()), |row| row.get(0))?
            .collect::<rusqlite::Result<HashSet<i64>>>()?;

        if let Some(missing) = requested.iter().find(|id| !existing.contains(id)) {
            return Err(RepositoryError::not_found("catalog_category", missing));
        }

        Ok(requested)
    }

    fn select(&self, category_ids: &[i64], skus: &[String]) -> RepositoryResult<EntitySelection> {
        let mut conditions: Vec<String> = Vec::new();
        let mut bind: Vec<&dyn ToSql> = Vec::new();

        if !category_ids.is_empty() {
            let placeholders = category_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
            conditions.push(format!("cce.category_id IN ({})", placeholders));
            bind.extend(category_ids.iter().map(|id| id as &dyn ToSql));
        }

        if !skus.is_empty() {
            let placeholders = skus.iter().map(|_| "?").collect::<Vec<_>>().join(",");
            conditions.push(format!("e.sku IN ({})", placeholders));
            bind.extend(skus.iter().map(|sku| sku as &dyn ToSql));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            r#"
            SELECT cce.category_id, e.entity_id
            FROM catalog_category_entity cce
            JOIN catalog_entity e ON e.entity_id = cce.entity_id
            {}
            ORDER BY e.entity_id, cce.category_id
            "#,
            where_clause
        );

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&query)?;
        let rows = stmt
            .query_map(bind.as_slice(), |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<rusqlite::Result<Vec<(i64, i64)>>>()?;

        let mut selection = EntitySelection::default();
        for (category_id, entity_id) in rows {
            selection
                .entity_ids_by_category
                .entry(category_id)
                .or_default()
                .push(entity_id);
            // 按 entity_id 排序,相邻去重即可
            if selection.entity_ids.last() != Some(&entity_id) {
                selection.entity_ids.push(entity_id);
            }
        }

        Ok(selection)
    }
}

impl EntityReader for EntityRepository {
    fn get_by_id(&self, entity_id: i64) -> RepositoryResult<EntityRecord> {
        let conn = self.get_conn()?;
        conn.query_row(
            "SELECT entity_id, sku FROM catalog_entity WHERE entity_id = ?1",
            params![entity_id],
            |row| {
                Ok(EntityRecord {
                    id: row.get(0)?,
                    sku: row.get(1)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| RepositoryError::not_found("catalog_entity", entity_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BackendType;

    fn setup_repo() -> EntityRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        let repo = EntityRepository::from_connection(Arc::new(Mutex::new(conn)));

        repo.upsert_category(3, "Shoes").unwrap();
        repo.upsert_category(4, "Boots").unwrap();
        for (id, sku) in [(101, "A1"), (102, "A2"), (103, "A3"), (104, "A4")] {
            repo.upsert_entity(id, sku).unwrap();
        }
        repo.assign_category(3, 101, 0).unwrap();
        repo.assign_category(3, 102, 1).unwrap();
        repo.assign_category(4, 102, 0).unwrap();
        repo.assign_category(4, 103, 1).unwrap();
        // 104 不属于任何类目
        repo
    }

    #[test]
    fn test_select_by_categories_dedups_entities() {
        let repo = setup_repo();

        let selection = repo.select(&[3, 4], &[]).unwrap();
        assert_eq!(selection.entity_ids, vec![101, 102, 103]);
        assert_eq!(selection.entity_ids_by_category[&3], vec![101, 102]);
        assert_eq!(selection.entity_ids_by_category[&4], vec![102, 103]);
    }

    #[test]
    fn test_select_category_and_sku_is_intersection() {
        let repo = setup_repo();

        let selection = repo
            .select(&[3], &["A2".to_string(), "A3".to_string()])
            .unwrap();
        assert_eq!(selection.entity_ids, vec![102]);
    }

    #[test]
    fn test_select_by_sku_requires_category_membership() {
        let repo = setup_repo();

        let selection = repo
            .select(&[], &["A1".to_string(), "A4".to_string()])
            .unwrap();
        assert_eq!(selection.entity_ids, vec![101]);
    }

    #[test]
    fn test_resolve_categories() {
        let repo = setup_repo();

        assert_eq!(repo.resolve_categories(&[4, 3, 4]).unwrap(), vec![4, 3]);
        assert!(repo.resolve_categories(&[]).unwrap().is_empty());

        let err = repo.resolve_categories(&[3, 77]).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_get_by_id() {
        let repo = setup_repo();

        let record = repo.get_by_id(102).unwrap();
        assert_eq!(record.sku, "A2");

        assert!(repo.get_by_id(999).unwrap_err().is_not_found());
    }

    #[test]
    fn test_set_attribute_value_is_upsert() {
        let repo = setup_repo();
        let color = AttributeDescriptor::new(10, "color", "Color", BackendType::Varchar);
        {
            let conn = repo.get_conn().unwrap();
            conn.execute(
                "INSERT INTO eav_attribute (attribute_id, attribute_code, frontend_label, backend_type) VALUES (10, 'color', 'Color', 'varchar')",
                [],
            )
            .unwrap();
        }

        repo.set_attribute_value(101, &color, 0, Some("red")).unwrap();
        repo.set_attribute_value(101, &color, 0, Some("green")).unwrap();

        assert_eq!(
            repo.find_attribute_value(101, &color, 0).unwrap().as_deref(),
            Some("green")
        );
        assert_eq!(repo.find_attribute_value(101, &color, 1).unwrap(), None);

        let sku = AttributeDescriptor::new(12, "sku", "SKU", BackendType::Static);
        let err = repo.set_attribute_value(101, &sku, 0, Some("x")).unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError(_)));
    }
}
