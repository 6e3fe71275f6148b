// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库, 支持英文（默认）和中文
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"en" 或 "zh-CN"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use bullet_points::i18n::t_with_args;
/// let msg = t_with_args(
///     "batch.entity_not_updated",
///     &[("sku", "A1"), ("error", "disk full")],
/// );
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    fill_args(rust_i18n::t!(key).to_string(), args)
}

/// 按指定语言翻译（不改动全局语言）
///
/// 未知语言回退到 en
pub fn t_in(locale: &str, key: &str) -> String {
    rust_i18n::t!(key, locale = locale).to_string()
}

/// 按指定语言翻译（带参数, 不改动全局语言）
pub fn t_with_args_in(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    fill_args(rust_i18n::t!(key, locale = locale).to_string(), args)
}

fn fill_args(mut message: String, args: &[(&str, &str)]) -> String {
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        message = message.replace(&placeholder, v);
    }
    message
}
