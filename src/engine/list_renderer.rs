// ==========================================
// Bullet Points - 定义列表渲染器
// ==========================================
// 职责: 按调用方给定的属性顺序输出 <dl> 片段
// 输入: attribute_id → ResolvedAttributeValue + 属性顺序
// 输出: 片段字符串（空串表示无可渲染内容,不应写入）
// ==========================================
// 格式:
// <dl><dt class="{code}_label">{label}</dt><dd class="{code}_value">{value}</dd>...</dl>
// 标签与值原样输出（值可能本身就是标记）
// 空值: None / 空串 / "0"
// ==========================================

use crate::domain::ResolvedAttributeValue;
use std::collections::HashMap;

// ==========================================
// ListRenderer - 定义列表渲染器
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct ListRenderer {
    // 无状态
}

impl ListRenderer {
    pub fn new() -> Self {
        Self {}
    }

    /// 渲染片段
    ///
    /// # 规则
    /// - 严格按 ordered_attribute_ids 输出（重复 ID 重复输出）
    /// - 缺失 / None / 空串 / "0" 的属性跳过
    /// - 没有任何条目时返回空串（不输出空的 <dl></dl>）
    pub fn render(
        &self,
        values: &HashMap<i64, ResolvedAttributeValue>,
        ordered_attribute_ids: &[i64],
    ) -> String {
        let items: String = ordered_attribute_ids
            .iter()
            .filter_map(|attribute_id| values.get(attribute_id))
            .filter(|attribute| attribute.has_value())
            .map(Self::render_item)
            .collect();

        if items.is_empty() {
            return String::new();
        }

        format!("<dl>{}</dl>", items)
    }

    fn render_item(attribute: &ResolvedAttributeValue) -> String {
        format!(
            r#"<dt class="{code}_label">{label}</dt><dd class="{code}_value">{value}</dd>"#,
            code = attribute.code,
            label = attribute.label,
            value = attribute.value.as_deref().unwrap_or_default(),
        )
    }
}
