// ==========================================
// Bullet Points - 引擎层
// ==========================================
// 职责: 属性值批量解析、定义列表渲染、批处理编排
// 红线: SQL 只出现在值查询计划中（表名来自固定集合,值全部绑定）
// ==========================================

pub mod error;
pub mod list_renderer;
pub mod orchestrator;
pub mod repositories;
pub mod value_resolver;

// 重导出核心引擎
pub use error::{BatchError, EngineResult};
pub use list_renderer::ListRenderer;
pub use orchestrator::BatchOrchestrator;
pub use repositories::BulletPointsRepositories;
pub use value_resolver::{AttributeValueResolver, ValueQueryPlan};
