// ==========================================
// 值查询计划
// ==========================================
// 查询计划是类型化的 join 规格列表,每批次构建并编译一次。
// 表名只来自 BackendType 的固定集合; attribute_id / scope_id /
// entity_id 全部以参数绑定。
// ==========================================

use crate::domain::AttributeDescriptor;
use rusqlite::types::Value;
use std::collections::HashSet;

/// 定义作用域
pub const DEFINITION_SCOPE_ID: i64 = 0;

/// 单条语句最多 join 的属性数（每个属性两张表, SQLite 单条 join 上限 64 张表）
pub const MAX_ATTRIBUTES_PER_STATEMENT: usize = 30;

/// 单条语句最多绑定的实体 ID 数
pub const MAX_ENTITY_IDS_PER_STATEMENT: usize = 500;

/// join 的作用域条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeFilter {
    /// scope_id = 0
    Definition,
    /// scope_id = 请求的作用域
    Requested(i64),
}

impl ScopeFilter {
    pub fn scope_id(&self) -> i64 {
        match self {
            ScopeFilter::Definition => DEFINITION_SCOPE_ID,
            ScopeFilter::Requested(scope_id) => *scope_id,
        }
    }
}

/// 单个 LEFT JOIN 规格
///
/// 连接键固定为 (entity_id, attribute_id, scope_id)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    pub table: &'static str,
    pub alias: String,
    pub attribute_id: i64,
    pub scope_filter: ScopeFilter,
}

impl JoinSpec {
    fn to_sql(&self) -> String {
        format!(
            "LEFT JOIN {table} AS {alias} ON {alias}.entity_id = main.entity_id \
             AND {alias}.attribute_id = ? AND {alias}.scope_id = ?",
            table = self.table,
            alias = self.alias,
        )
    }

    fn params(&self) -> [i64; 2] {
        [self.attribute_id, self.scope_filter.scope_id()]
    }
}

/// 一个属性对应的两路 join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeJoin {
    pub attribute: AttributeDescriptor,
    pub definition: JoinSpec,
    pub specific: JoinSpec,
}

/// 批次级查询计划
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueQueryPlan {
    pub scope_id: i64,
    pub joins: Vec<AttributeJoin>,
    /// 被过滤掉的 static 属性 ID
    pub skipped_static: Vec<i64>,
}

impl ValueQueryPlan {
    /// 由属性描述构建计划（过滤 static 属性,按 ID 去重）
    pub fn build(attributes: &[AttributeDescriptor], scope_id: i64) -> Self {
        let mut seen = HashSet::new();
        let mut joins = Vec::new();
        let mut skipped_static = Vec::new();

        for attribute in attributes {
            if !seen.insert(attribute.id) {
                continue;
            }
            let Some(table) = attribute.backend_type.value_table() else {
                skipped_static.push(attribute.id);
                continue;
            };

            // 别名在编译时按语句内位置重新分配
            joins.push(AttributeJoin {
                attribute: attribute.clone(),
                definition: JoinSpec {
                    table,
                    alias: String::new(),
                    attribute_id: attribute.id,
                    scope_filter: ScopeFilter::Definition,
                },
                specific: JoinSpec {
                    table,
                    alias: String::new(),
                    attribute_id: attribute.id,
                    scope_filter: ScopeFilter::Requested(scope_id),
                },
            });
        }

        Self {
            scope_id,
            joins,
            skipped_static,
        }
    }

    pub fn attribute_count(&self) -> usize {
        self.joins.len()
    }

    /// 编译为语句列表（每条语句最多 MAX_ATTRIBUTES_PER_STATEMENT 个属性）
    ///
    /// 属性集为空时仍返回一条只含实体标识列的语句
    pub fn compile(&self) -> Vec<CompiledStatement> {
        if self.joins.is_empty() {
            return vec![CompiledStatement::new(Vec::new())];
        }

        self.joins
            .chunks(MAX_ATTRIBUTES_PER_STATEMENT)
            .map(|chunk| CompiledStatement::new(chunk.to_vec()))
            .collect()
    }
}

/// 编译后的单条语句（实体 ID 的 IN 列表在执行时按分片长度补齐）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledStatement {
    pub joins: Vec<AttributeJoin>,
    select_and_joins: String,
    join_params: Vec<i64>,
}

impl CompiledStatement {
    fn new(mut joins: Vec<AttributeJoin>) -> Self {
        let mut columns = vec!["main.entity_id".to_string(), "main.sku".to_string()];
        let mut join_clauses = Vec::with_capacity(joins.len() * 2);
        let mut join_params = Vec::with_capacity(joins.len() * 4);

        for (position, join) in joins.iter_mut().enumerate() {
            join.definition.alias = format!("d{}", position);
            join.specific.alias = format!("s{}", position);

            for spec in [&join.definition, &join.specific] {
                columns.push(format!("{}.value_id", spec.alias));
                columns.push(format!("{}.value", spec.alias));
                join_clauses.push(spec.to_sql());
                join_params.extend(spec.params());
            }
        }

        let mut select_and_joins = format!(
            "SELECT {} FROM catalog_entity AS main",
            columns.join(", ")
        );
        for clause in join_clauses {
            select_and_joins.push(' ');
            select_and_joins.push_str(&clause);
        }

        Self {
            joins,
            select_and_joins,
            join_params,
        }
    }

    /// 生成绑定 entity_count 个实体 ID 的 SQL
    pub fn sql(&self, entity_count: usize) -> String {
        let placeholders = vec!["?"; entity_count.max(1)].join(", ");
        format!(
            "{} WHERE main.entity_id IN ({}) ORDER BY main.entity_id",
            self.select_and_joins, placeholders
        )
    }

    /// join 条件中的参数（按出现顺序）
    pub fn join_params(&self) -> &[i64] {
        &self.join_params
    }

    /// 属性 i 的定义作用域列起始下标（value_id, value）
    pub fn definition_column(&self, position: usize) -> usize {
        2 + position * 4
    }

    /// 属性 i 的指定作用域列起始下标（value_id, value）
    pub fn specific_column(&self, position: usize) -> usize {
        2 + position * 4 + 2
    }
}

/// 某一作用域下命中的值记录
///
/// 记录存在但 value 为 NULL 时 value = None
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedRow {
    pub value: Option<String>,
}

impl ScopedRow {
    pub fn new(value: Option<&str>) -> Self {
        Self {
            value: value.map(str::to_string),
        }
    }

    /// 将值表中的存储值转换为文本
    pub fn from_storage(value: Value) -> Self {
        let value = match value {
            Value::Null => None,
            Value::Integer(i) => Some(i.to_string()),
            Value::Real(f) => Some(f.to_string()),
            Value::Text(s) => Some(s),
            Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
        };
        Self { value }
    }
}

/// 作用域回退
///
/// 指定作用域记录存在（即使值为 NULL）即覆盖定义作用域
pub fn effective_value(specific: Option<ScopedRow>, definition: Option<ScopedRow>) -> Option<String> {
    specific.or(definition).and_then(|row| row.value)
}
