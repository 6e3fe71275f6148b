// ==========================================
// Bullet Points - 属性值解析引擎
// ==========================================
// 职责: 按作用域回退规则批量解析实体属性值
// 输入: 实体 ID 集合 + 属性描述 + 作用域
// 输出: entity_id → ResolvedEntity
// ==========================================
// 规则: 指定作用域记录存在 → 取指定作用域值
//       否则定义作用域(0)记录存在 → 取定义作用域值
//       否则 → None
// ==========================================

mod core;
mod plan;


pub use self::core::AttributeValueResolver;
pub use plan::{
    effective_value, AttributeJoin, CompiledStatement, JoinSpec, ScopeFilter, ScopedRow,
    ValueQueryPlan, DEFINITION_SCOPE_ID, MAX_ATTRIBUTES_PER_STATEMENT,
    MAX_ENTITY_IDS_PER_STATEMENT,
};
