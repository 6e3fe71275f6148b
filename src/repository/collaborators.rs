// ==========================================
// Bullet Points - 外部协作者接口
// ==========================================
// 职责: 定义批处理编排所依赖的数据访问接口（不包含实现）
// 实现者: AttributeMetadataRepository / EntityRepository（使用 rusqlite）
// 红线: 接口不含渲染与编排逻辑
// ==========================================

use crate::domain::{AttributeDescriptor, EntityRecord, EntitySelection};
use crate::repository::error::RepositoryResult;

// ==========================================
// AttributeMetadataResolver
// ==========================================
pub trait AttributeMetadataResolver: Send + Sync {
    /// 按 ID 解析属性描述
    ///
    /// # 返回
    /// - 按请求顺序排列,重复 ID 只保留一次
    /// - 任一 ID 不存在 → NotFound
    ///
    /// 不过滤 static 属性（由值解析器负责）
    fn get(&self, attribute_ids: &[i64]) -> RepositoryResult<Vec<AttributeDescriptor>>;
}

// ==========================================
// EntitySelector
// ==========================================
pub trait EntitySelector: Send + Sync {
    /// 校验并透传类目 ID（去重,保持顺序）
    ///
    /// 任一类目不存在 → NotFound
    fn resolve_categories(&self, category_ids: &[i64]) -> RepositoryResult<Vec<i64>>;

    /// 按类目与 SKU 筛选实体
    ///
    /// # 语义
    /// - 实体必须属于至少一个类目（类目成员关系 join）
    /// - category_ids 非空时限定类目, skus 非空时再限定 SKU（AND）
    /// - 空过滤条件表示该维度不限制
    fn select(&self, category_ids: &[i64], skus: &[String]) -> RepositoryResult<EntitySelection>;
}

// ==========================================
// EntityReader
// ==========================================
pub trait EntityReader: Send + Sync {
    /// 读取实体快照, 不存在 → NotFound
    fn get_by_id(&self, entity_id: i64) -> RepositoryResult<EntityRecord>;
}

// ==========================================
// EntityWriter
// ==========================================
pub trait EntityWriter: Send + Sync {
    /// 写入目标（派生属性编码）
    ///
    /// 编排器以此判断来源属性是否与写入目标冲突
    fn target_attribute_code(&self) -> &str;

    /// 将渲染好的片段写入派生属性
    ///
    /// - 冲突/校验失败 → PersistenceError
    /// - 相同实体相同值重复写入结果一致（幂等）
    fn set_derived_attribute(&self, entity_id: i64, value: &str) -> RepositoryResult<()>;
}
