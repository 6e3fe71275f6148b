// ==========================================
// Bullet Points - 生成入口 API
// ==========================================
// 职责: 打开/复用连接 → 建表 → 读取配置 → 组装协作者 → 执行批处理
// 红线: 不包含业务逻辑,全部委托给 BatchOrchestrator
// ==========================================

use std::error::Error;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{BulletPointsConfigReader, ConfigManager};
use crate::db;
use crate::domain::BatchResult;
use crate::engine::{BatchOrchestrator, BulletPointsRepositories};

// ==========================================
// GenerateRequest - 生成请求
// ==========================================

/// 一次批处理的输入
///
/// category_ids 与 skus 至少提供一个; 两者同时提供时为 AND 关系
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// 来源属性（同时决定渲染顺序）
    pub attribute_ids: Vec<i64>,

    #[serde(default)]
    pub category_ids: Vec<i64>,

    #[serde(default)]
    pub skus: Vec<String>,

    /// 覆盖配置中的作用域（仅本次请求有效）
    #[serde(default)]
    pub scope_id: Option<i64>,
}

impl GenerateRequest {
    pub fn new(attribute_ids: Vec<i64>) -> Self {
        Self {
            attribute_ids,
            ..Self::default()
        }
    }

    pub fn with_categories(mut self, category_ids: Vec<i64>) -> Self {
        self.category_ids = category_ids;
        self
    }

    pub fn with_skus<S: Into<String>>(mut self, skus: impl IntoIterator<Item = S>) -> Self {
        self.skus = skus.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scope(mut self, scope_id: i64) -> Self {
        self.scope_id = Some(scope_id);
        self
    }

    fn validate(&self) -> ApiResult<()> {
        if let Some(scope_id) = self.scope_id {
            if scope_id < 0 {
                return Err(ApiError::InvalidInput(format!(
                    "scope_id 不能为负数: {}",
                    scope_id
                )));
            }
        }
        Ok(())
    }
}

/// 解析逗号分隔的 ID 列表（如 "1, 2,3"）
///
/// 空白片段被忽略; 非整数片段 → InvalidInput
pub fn parse_id_list(raw: &str) -> ApiResult<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| ApiError::InvalidInput(format!("无效的 ID: {}", part)))
        })
        .collect()
}

/// 解析逗号分隔的 SKU 列表
pub fn parse_sku_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

// ==========================================
// BulletPointsApi - 生成入口
// ==========================================
pub struct BulletPointsApi {
    conn: Arc<Mutex<Connection>>,
    config_manager: Arc<ConfigManager>,
    cancel_flag: Arc<AtomicBool>,
}

impl BulletPointsApi {
    /// 打开数据库文件并初始化 schema
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = db::open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 复用已有连接（schema 初始化幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ApiError::DatabaseConnectionError(format!("锁获取失败: {}", e)))?;
            db::init_schema(&guard).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        }

        let config_manager = ConfigManager::from_connection(conn.clone())
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        Ok(Self {
            conn,
            config_manager: Arc::new(config_manager),
            cancel_flag: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn config_manager(&self) -> Arc<ConfigManager> {
        self.config_manager.clone()
    }

    /// 取消标志（置位后当前批次在下一个实体前停止）
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel_flag.clone()
    }

    /// 执行一次生成
    ///
    /// # 返回
    /// - Ok(BatchResult): 批次完成（可能包含逐实体错误）
    /// - Err(ApiError): 批次级失败
    pub async fn generate(&self, request: &GenerateRequest) -> ApiResult<BatchResult> {
        request.validate()?;

        let target_attribute_code = self
            .config_manager
            .get_target_attribute_code()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let repos = BulletPointsRepositories::from_connection(self.conn.clone(), &target_attribute_code);
        let config = Arc::new(RequestConfig {
            inner: self.config_manager.clone(),
            scope_id: request.scope_id,
        });
        let orchestrator =
            BatchOrchestrator::new(config, repos).with_cancel_flag(self.cancel_flag.clone());

        let result = orchestrator
            .execute(&request.attribute_ids, &request.category_ids, &request.skus)
            .await?;

        info!(
            run_id = %result.run_id,
            processed = result.processed_count(),
            failed = result.errors.len(),
            "生成请求完成"
        );
        Ok(result)
    }
}

// ==========================================
// RequestConfig - 请求级配置覆盖
// ==========================================
struct RequestConfig {
    inner: Arc<ConfigManager>,
    scope_id: Option<i64>,
}

#[async_trait]
impl BulletPointsConfigReader for RequestConfig {
    async fn get_target_attribute_code(&self) -> Result<String, Box<dyn Error>> {
        self.inner.get_target_attribute_code().await
    }

    async fn get_scope_id(&self) -> Result<i64, Box<dyn Error>> {
        match self.scope_id {
            Some(scope_id) => Ok(scope_id),
            None => self.inner.get_scope_id().await,
        }
    }

    async fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        self.inner.get_locale().await
    }
}
