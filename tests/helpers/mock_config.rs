// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use bullet_points::config::BulletPointsConfigReader;
use std::error::Error;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub target_attribute_code: String,
    pub scope_id: i64,
    pub locale: String,
    /// 为 true 时所有读取都失败
    pub broken: bool,
}

impl MockConfig {
    /// 创建默认配置（定义作用域）
    pub fn default() -> Self {
        Self {
            target_attribute_code: "selling_features_bullets".to_string(),
            scope_id: 0,
            locale: "en".to_string(),
            broken: false,
        }
    }

    /// 指定作用域
    pub fn with_scope(scope_id: i64) -> Self {
        let mut config = Self::default();
        config.scope_id = scope_id;
        config
    }

    /// 指定派生属性
    pub fn with_target(code: &str) -> Self {
        let mut config = Self::default();
        config.target_attribute_code = code.to_string();
        config
    }

    /// 指定错误信息语言
    pub fn with_locale(locale: &str) -> Self {
        let mut config = Self::default();
        config.locale = locale.to_string();
        config
    }

    /// 读取失败的配置
    pub fn broken() -> Self {
        let mut config = Self::default();
        config.broken = true;
        config
    }

    fn check(&self) -> Result<(), Box<dyn Error>> {
        if self.broken {
            return Err("config store unavailable".into());
        }
        Ok(())
    }
}

#[async_trait]
impl BulletPointsConfigReader for MockConfig {
    async fn get_target_attribute_code(&self) -> Result<String, Box<dyn Error>> {
        self.check()?;
        Ok(self.target_attribute_code.clone())
    }

    async fn get_scope_id(&self) -> Result<i64, Box<dyn Error>> {
        self.check()?;
        Ok(self.scope_id)
    }

    async fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        self.check()?;
        Ok(self.locale.clone())
    }
}
