// ==========================================
// 属性值解析引擎 - 执行
// ==========================================

use super::plan::{
    effective_value, CompiledStatement, ScopedRow, ValueQueryPlan, MAX_ENTITY_IDS_PER_STATEMENT,
};
use crate::domain::{AttributeDescriptor, ResolvedAttributeValue, ResolvedEntity};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Value;
use rusqlite::{Connection, Row, ToSql};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// 单行原始结果: (entity_id, sku, [(定义作用域, 指定作用域)])
type RawRow = (i64, String, Vec<(Option<ScopedRow>, Option<ScopedRow>)>);

// ==========================================
// AttributeValueResolver - 属性值解析引擎
// ==========================================
/// 只读; 连接由调用方注入,整批共享
pub struct AttributeValueResolver {
    conn: Arc<Mutex<Connection>>,
}

impl AttributeValueResolver {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 批量解析属性值
    ///
    /// # 参数
    /// - entity_ids: 实体 ID（空集合返回空结果）
    /// - attributes: 属性描述（static 属性被忽略）
    /// - scope_id: 指定作用域
    ///
    /// # 返回
    /// - 每个存在于 catalog_entity 的实体一条 ResolvedEntity,
    ///   其中每个非 static 属性一条 ResolvedAttributeValue（值可能为 None）
    ///
    /// # 错误
    /// - 语句构建/执行失败 → StorageError（数据缺失不是错误）
    pub fn resolve(
        &self,
        entity_ids: &[i64],
        attributes: &[AttributeDescriptor],
        scope_id: i64,
    ) -> RepositoryResult<HashMap<i64, ResolvedEntity>> {
        if scope_id < 0 {
            return Err(RepositoryError::ValidationError(format!(
                "scope_id 不能为负数: {}",
                scope_id
            )));
        }

        let mut seen = HashSet::new();
        let entity_ids: Vec<i64> = entity_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        if entity_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let plan = ValueQueryPlan::build(attributes, scope_id);
        if !plan.skipped_static.is_empty() {
            debug!(skipped = ?plan.skipped_static, "忽略 static 属性");
        }

        let statements = plan.compile();
        let conn = self.get_conn()?;

        let mut resolved: HashMap<i64, ResolvedEntity> = HashMap::with_capacity(entity_ids.len());
        for statement in &statements {
            for chunk in entity_ids.chunks(MAX_ENTITY_IDS_PER_STATEMENT) {
                for (entity_id, sku, scoped) in Self::execute(&conn, statement, chunk)? {
                    let entity = resolved
                        .entry(entity_id)
                        .or_insert_with(|| ResolvedEntity::new(entity_id, sku));

                    for (join, (definition, specific)) in statement.joins.iter().zip(scoped) {
                        entity.values.insert(
                            join.attribute.id,
                            ResolvedAttributeValue {
                                entity_id,
                                attribute_id: join.attribute.id,
                                code: join.attribute.code.clone(),
                                label: join.attribute.label.clone(),
                                value: effective_value(specific, definition),
                            },
                        );
                    }
                }
            }
        }

        info!(
            requested = entity_ids.len(),
            resolved = resolved.len(),
            attributes = plan.attribute_count(),
            statements = statements.len(),
            scope_id,
            "属性值解析完成"
        );

        Ok(resolved)
    }

    fn execute(
        conn: &Connection,
        statement: &CompiledStatement,
        entity_ids: &[i64],
    ) -> RepositoryResult<Vec<RawRow>> {
        let sql = statement.sql(entity_ids.len());
        let mut stmt = conn.prepare(&sql)?;

        let params: Vec<&dyn ToSql> = statement
            .join_params()
            .iter()
            .chain(entity_ids.iter())
            .map(|v| v as &dyn ToSql)
            .collect();

        let attribute_count = statement.joins.len();
        let rows = stmt
            .query_map(params.as_slice(), |row| {
                let mut scoped = Vec::with_capacity(attribute_count);
                for position in 0..attribute_count {
                    scoped.push((
                        read_scoped_row(row, statement.definition_column(position))?,
                        read_scoped_row(row, statement.specific_column(position))?,
                    ));
                }
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, scoped))
            })?
            .collect::<rusqlite::Result<Vec<RawRow>>>()?;

        Ok(rows)
    }
}

/// 读取一路 LEFT JOIN 的结果; value_id 为 NULL 表示该作用域没有记录
fn read_scoped_row(row: &Row, column: usize) -> rusqlite::Result<Option<ScopedRow>> {
    let value_id: Option<i64> = row.get(column)?;
    if value_id.is_none() {
        return Ok(None);
    }
    let value: Value = row.get(column + 1)?;
    Ok(Some(ScopedRow::from_storage(value)))
}
