// ==========================================
// Bullet Points - 实体领域类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 实体快照（处理时读取一次,不在核心中修改）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: i64,
    pub sku: String,
}

/// 实体筛选结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySelection {
    /// 去重后的实体 ID（按 entity_id 升序,即批处理顺序）
    pub entity_ids: Vec<i64>,
    /// 类目 → 该类目下命中的实体 ID
    pub entity_ids_by_category: BTreeMap<i64, Vec<i64>>,
}

impl EntitySelection {
    pub fn is_empty(&self) -> bool {
        self.entity_ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entity_ids.len()
    }
}
