// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和中文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言（不支持的语言回退到 en）
///
/// # 参数
/// - locale: 语言代码（"en" 或 "zh-CN"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(resolve_locale(locale));
}

/// 规范化语言代码（"zh"、"zh_cn" → "zh-CN"）
pub fn resolve_locale(locale: &str) -> &'static str {
    let key = locale.trim().to_lowercase().replace('_', "-");
    if key.starts_with("zh") {
        "zh-CN"
    } else {
        "en"
    }
}

/// 翻译消息（无参数，当前语言）
///
/// # 示例
/// ```no_run
/// use bcbd_validator::i18n::t;
/// let msg = t("report.not_found");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（指定语言，带参数）
///
/// 参数占位符格式为 %{name}
///
/// # 示例
/// ```no_run
/// use bcbd_validator::i18n::t_in;
/// let msg = t_in("zh-CN", "report.empty_expected", &[("expected", "5%")]);
/// ```
pub fn t_in(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    let locale = resolve_locale(locale);
    let mut result = rust_i18n::t!(key, locale = locale).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 为避免测试互相干扰，这里对 i18n 相关测试串行化。
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh_cn");
        assert_eq!(current_locale(), "zh-CN");

        set_locale("fr");
        assert_eq!(current_locale(), "en");
    }

    #[test]
    fn test_translate_in_explicit_locale() {
        assert_eq!(t_in("en", "report.not_found", &[]), "Not found in file");
        assert_eq!(t_in("zh-CN", "report.not_found", &[]), "文件中未找到");
    }

    #[test]
    fn test_translate_with_args() {
        let msg = t_in("en", "report.empty_expected", &[("expected", "5%")]);
        assert_eq!(msg, "Empty — Expected: 5%");
    }

    #[test]
    fn test_current_locale_translation() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(t("verdict.warning"), "WARNING");
        assert_eq!(t("brands.unavailable"), "unavailable");
    }
}
