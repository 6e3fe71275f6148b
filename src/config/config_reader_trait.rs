// ==========================================
// Bullet Points - 配置读取 Trait
// ==========================================
// 职责: 定义批处理所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

/// 批处理一次执行所需的配置快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulletPointsSettings {
    pub target_attribute_code: String,
    pub scope_id: i64,
    pub locale: String,
}

// ==========================================
// BulletPointsConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait BulletPointsConfigReader: Send + Sync {
    /// 派生属性编码（片段写入的目标属性）
    ///
    /// # 默认值
    /// - selling_features_bullets
    async fn get_target_attribute_code(&self) -> Result<String, Box<dyn Error>>;

    /// 解析属性值时使用的指定作用域
    ///
    /// # 默认值
    /// - 0（定义作用域）
    async fn get_scope_id(&self) -> Result<i64, Box<dyn Error>>;

    /// 错误信息语言
    ///
    /// # 默认值
    /// - en
    async fn get_locale(&self) -> Result<String, Box<dyn Error>>;

    /// 一次性读取全部配置
    ///
    /// 每个值先落到局部变量: 错误不能跨 await 存活（Box<dyn Error> 不是 Send）
    async fn load_settings(&self) -> Result<BulletPointsSettings, Box<dyn Error>> {
        let target_attribute_code = self.get_target_attribute_code().await?;
        let scope_id = self.get_scope_id().await?;
        let locale = self.get_locale().await?;

        Ok(BulletPointsSettings {
            target_attribute_code,
            scope_id,
            locale,
        })
    }
}
