// ==========================================
// Bullet Points - 批处理结果
// ==========================================
// 每次执行创建一个 BatchResult,逐实体折叠 EntityOutcome,
// 执行结束后整体返回
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// 单个实体的处理结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityOutcome {
    /// 片段已写回
    Written { entity_id: i64 },
    /// 没有可渲染的属性值,不写入
    Skipped { entity_id: i64 },
    /// 读取/渲染/写入失败
    Failed { entity_id: i64, message: String },
}

impl EntityOutcome {
    pub fn entity_id(&self) -> i64 {
        match self {
            EntityOutcome::Written { entity_id }
            | EntityOutcome::Skipped { entity_id }
            | EntityOutcome::Failed { entity_id, .. } => *entity_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub errors: BTreeMap<i64, String>,
    pub successes: Vec<i64>,
    pub skipped: Vec<i64>,
    /// 是否因取消标志提前结束
    pub cancelled: bool,
}

impl BatchResult {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            finished_at: None,
            errors: BTreeMap::new(),
            successes: Vec::new(),
            skipped: Vec::new(),
            cancelled: false,
        }
    }

    /// 折叠单个实体结果
    pub fn record(&mut self, outcome: EntityOutcome) {
        match outcome {
            EntityOutcome::Written { entity_id } => self.successes.push(entity_id),
            EntityOutcome::Skipped { entity_id } => self.skipped.push(entity_id),
            EntityOutcome::Failed { entity_id, message } => {
                self.errors.insert(entity_id, message);
            }
        }
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn processed_count(&self) -> usize {
        self.errors.len() + self.successes.len() + self.skipped.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Default for BatchResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_folds_outcomes() {
        let mut result = BatchResult::new();
        result.record(EntityOutcome::Written { entity_id: 1 });
        result.record(EntityOutcome::Skipped { entity_id: 2 });
        result.record(EntityOutcome::Failed {
            entity_id: 3,
            message: "boom".to_string(),
        });

        assert_eq!(result.successes, vec![1]);
        assert_eq!(result.skipped, vec![2]);
        assert_eq!(result.errors.get(&3).map(String::as_str), Some("boom"));
        assert_eq!(result.processed_count(), 3);
        assert!(result.has_errors());
    }

    #[test]
    fn test_finish_sets_timestamp() {
        let result = BatchResult::new().finish();
        let finished_at = result.finished_at.unwrap();
        assert!(finished_at >= result.started_at);
    }
}
