// ==========================================
// Bullet Points - 领域模型层
// ==========================================
// 职责: 定义属性描述、解析结果、实体快照与批处理结果
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod attribute;
pub mod batch;
pub mod entity;

// 重导出核心类型
pub use attribute::{AttributeDescriptor, BackendType, ResolvedAttributeValue, ResolvedEntity};
pub use batch::{BatchResult, EntityOutcome};
pub use entity::{EntityRecord, EntitySelection};
