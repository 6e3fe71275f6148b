// ==========================================
// Bullet Points - 批处理编排器
// ==========================================
// 流程: 类目校验 → 实体筛选 → 属性描述 → 批量解析（一次）
//       → 逐实体: 读取快照 → 渲染 → 写回
// 红线: 批量解析失败中止整个批次; 逐实体失败只记录,继续下一个
// 红线: 不回滚已写入的实体（每个实体独立事务）
// ==========================================

use crate::config::{BulletPointsConfigReader, BulletPointsSettings};
use crate::domain::{BatchResult, EntityOutcome, ResolvedEntity};
use crate::engine::error::{BatchError, EngineResult};
use crate::engine::list_renderer::ListRenderer;
use crate::engine::repositories::BulletPointsRepositories;
use crate::i18n;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

// ==========================================
// BatchOrchestrator - 批处理编排器
// ==========================================
pub struct BatchOrchestrator<C>
where
    C: BulletPointsConfigReader,
{
    config: Arc<C>,
    repos: BulletPointsRepositories,
    renderer: ListRenderer,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl<C> BatchOrchestrator<C>
where
    C: BulletPointsConfigReader,
{
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - config: 配置读取器
    /// - repos: 协作者集合
    pub fn new(config: Arc<C>, repos: BulletPointsRepositories) -> Self {
        Self {
            config,
            repos,
            renderer: ListRenderer::new(),
            cancel_flag: None,
        }
    }

    /// 设置取消标志
    ///
    /// 标志置位后,在下一个实体开始前停止; 已处理的实体不回滚
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::SeqCst))
    }

    /// 执行批处理
    ///
    /// # 参数
    /// - attribute_ids: 来源属性（同时决定渲染顺序）
    /// - category_ids: 类目筛选（可为空）
    /// - skus: SKU 筛选（可为空, 与类目条件为 AND 关系）
    ///
    /// # 返回
    /// - Ok(BatchResult): 全部实体处理完毕（含逐实体错误）
    /// - Err(BatchError): 批次级失败,没有任何写入发生
    pub async fn execute(
        &self,
        attribute_ids: &[i64],
        category_ids: &[i64],
        skus: &[String],
    ) -> EngineResult<BatchResult> {
        let skus: Vec<String> = skus
            .iter()
            .map(|sku| sku.trim().to_string())
            .filter(|sku| !sku.is_empty())
            .collect();

        // ==========================================
        // 步骤0: 配置 + 输入校验
        // ==========================================
        // 消息语言取自配置, 不改动进程级语言
        let settings = self.load_settings().await?;
        let locale = settings.locale.as_str();

        if attribute_ids.is_empty() {
            return Err(BatchError::InvalidInput(i18n::t_in(locale, "batch.missing_attributes")));
        }
        if category_ids.is_empty() && skus.is_empty() {
            return Err(BatchError::InvalidInput(i18n::t_in(locale, "batch.missing_filters")));
        }

        // 写入目标以写入者为准; 配置与之不一致说明协作者组装错误
        let target_code = self.repos.entity_writer.target_attribute_code();
        if settings.target_attribute_code != target_code {
            return Err(BatchError::Config(format!(
                "配置的派生属性 {} 与写入目标 {} 不一致",
                settings.target_attribute_code, target_code
            )));
        }

        let mut result = BatchResult::new();
        info!(
            run_id = %result.run_id,
            attributes = attribute_ids.len(),
            categories = category_ids.len(),
            skus = skus.len(),
            scope_id = settings.scope_id,
            target = %target_code,
            "开始生成属性列表"
        );

        // ==========================================
        // 步骤1-2: 类目校验 + 实体筛选
        // ==========================================
        let category_ids = self.repos.entity_selector.resolve_categories(category_ids)?;
        let selection = self.repos.entity_selector.select(&category_ids, &skus)?;
        debug!(
            entities = selection.len(),
            categories_matched = selection.entity_ids_by_category.len(),
            "实体筛选完成"
        );

        // ==========================================
        // 步骤3: 属性描述
        // ==========================================
        let attributes = self.repos.attribute_metadata.get(attribute_ids)?;
        if attributes.iter().any(|attribute| attribute.code == target_code) {
            return Err(BatchError::InvalidInput(i18n::t_with_args_in(
                locale,
                "batch.target_in_sources",
                &[("code", target_code)],
            )));
        }

        // ==========================================
        // 步骤4: 批量解析（整批一次, 失败即中止）
        // ==========================================
        let resolved = self.repos.value_resolver.resolve(
            &selection.entity_ids,
            &attributes,
            settings.scope_id,
        )?;

        // ==========================================
        // 步骤5-6: 逐实体渲染与写回
        // ==========================================
        for &entity_id in &selection.entity_ids {
            if self.is_cancelled() {
                warn!(run_id = %result.run_id, entity_id, "批处理已取消");
                result.cancelled = true;
                break;
            }

            let outcome =
                self.process_entity(entity_id, resolved.get(&entity_id), attribute_ids, locale);
            match &outcome {
                EntityOutcome::Written { .. } => debug!(entity_id, "派生属性已写入"),
                EntityOutcome::Skipped { .. } => debug!(entity_id, "无可渲染属性值,跳过"),
                EntityOutcome::Failed { message, .. } => warn!(entity_id, %message, "实体处理失败"),
            }
            result.record(outcome);
        }

        let result = result.finish();
        info!(
            run_id = %result.run_id,
            written = result.successes.len(),
            skipped = result.skipped.len(),
            failed = result.errors.len(),
            cancelled = result.cancelled,
            "属性列表生成完成"
        );

        Ok(result)
    }

    async fn load_settings(&self) -> EngineResult<BulletPointsSettings> {
        self.config
            .load_settings()
            .await
            .map_err(|e| BatchError::Config(e.to_string()))
    }

    /// 单个实体: 读取快照 → 渲染 → 写回
    ///
    /// 所有错误都转换为 Failed,不向上传播
    fn process_entity(
        &self,
        entity_id: i64,
        resolved: Option<&ResolvedEntity>,
        attribute_ids: &[i64],
        locale: &str,
    ) -> EntityOutcome {
        let record = match self.repos.entity_reader.get_by_id(entity_id) {
            Ok(record) => record,
            Err(e) => {
                return EntityOutcome::Failed {
                    entity_id,
                    message: entity_error_message(locale, None, &e),
                }
            }
        };

        let fragment = resolved
            .map(|entity| self.renderer.render(&entity.values, attribute_ids))
            .unwrap_or_default();
        if fragment.is_empty() {
            return EntityOutcome::Skipped { entity_id };
        }

        match self
            .repos
            .entity_writer
            .set_derived_attribute(entity_id, &fragment)
        {
            Ok(()) => EntityOutcome::Written { entity_id },
            Err(e) => EntityOutcome::Failed {
                entity_id,
                message: entity_error_message(locale, Some(&record.sku), &e),
            },
        }
    }
}

/// 逐实体错误信息（SKU 不可得时使用占位符）
fn entity_error_message(locale: &str, sku: Option<&str>, error: &dyn Display) -> String {
    let unknown = i18n::t_in(locale, "common.unknown_sku");
    let error = error.to_string();
    i18n::t_with_args_in(
        locale,
        "batch.entity_not_updated",
        &[("sku", sku.unwrap_or(&unknown)), ("error", error.as_str())],
    )
}
