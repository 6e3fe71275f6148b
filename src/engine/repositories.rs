// ==========================================
// Bullet Points - 引擎层协作者聚合
// ==========================================
// 职责: 聚合批处理编排所需的所有协作者
// 目标: 减少 BatchOrchestrator 的构造函数参数数量; 测试时可单独替换
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::engine::value_resolver::AttributeValueResolver;
use crate::repository::{
    AttributeMetadataRepository, AttributeMetadataResolver, DerivedAttributeRepository,
    EntityReader, EntityRepository, EntitySelector, EntityWriter,
};

/// 批处理协作者集合
///
/// # 包含的协作者
/// - `attribute_metadata`: 属性 ID → 属性描述
/// - `entity_selector`: 类目/SKU → 实体 ID
/// - `entity_reader`: 实体快照读取
/// - `entity_writer`: 派生属性写入
/// - `value_resolver`: 批量属性值解析（只读）
#[derive(Clone)]
pub struct BulletPointsRepositories {
    pub attribute_metadata: Arc<dyn AttributeMetadataResolver>,
    pub entity_selector: Arc<dyn EntitySelector>,
    pub entity_reader: Arc<dyn EntityReader>,
    pub entity_writer: Arc<dyn EntityWriter>,
    pub value_resolver: Arc<AttributeValueResolver>,
}

impl BulletPointsRepositories {
    /// 基于同一个 SQLite 连接组装全部协作者
    ///
    /// # 参数
    /// - conn: 共享连接
    /// - target_attribute_code: 派生属性编码
    pub fn from_connection(conn: Arc<Mutex<Connection>>, target_attribute_code: &str) -> Self {
        let entity_repo = Arc::new(EntityRepository::from_connection(conn.clone()));
        Self {
            attribute_metadata: Arc::new(AttributeMetadataRepository::from_connection(conn.clone())),
            entity_selector: entity_repo.clone(),
            entity_reader: entity_repo,
            entity_writer: Arc::new(DerivedAttributeRepository::from_connection(
                conn.clone(),
                target_attribute_code,
            )),
            value_resolver: Arc::new(AttributeValueResolver::new(conn)),
        }
    }

    /// 替换写入协作者（测试/包装重试策略时使用）
    pub fn with_entity_writer(mut self, writer: Arc<dyn EntityWriter>) -> Self {
        self.entity_writer = writer;
        self
    }

    /// 替换读取协作者
    pub fn with_entity_reader(mut self, reader: Arc<dyn EntityReader>) -> Self {
        self.entity_reader = reader;
        self
    }
}
