// ==========================================
// Bullet Points - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有值使用参数化绑定; 表名只来自固定的存储类型集合
// ==========================================

pub mod attribute_repo;
pub mod collaborators;
pub mod derived_attribute_repo;
pub mod entity_repo;
pub mod error;

// 重导出核心仓储
pub use attribute_repo::AttributeMetadataRepository;
pub use collaborators::{AttributeMetadataResolver, EntityReader, EntitySelector, EntityWriter};
pub use derived_attribute_repo::{DerivedAttributeRepository, DERIVED_ATTRIBUTE_SCOPE_ID};
pub use entity_repo::EntityRepository;
pub use error::{RepositoryError, RepositoryResult};
