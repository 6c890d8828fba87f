// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持日文（默认）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use crate::domain::types::{Phase, PhaseStatus};

/// 默认语言
pub const DEFAULT_LOCALE: &str = "ja";

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"ja" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use seishin::i18n::t;
/// let msg = t("message.no_open_work");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数，占位符格式 `%{name}`）
///
/// # 示例
/// ```no_run
/// use seishin::i18n::t_with_args;
/// let msg = t_with_args("message.cuts_added", &[("count", "20"), ("episode", "3")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 工程显示名
pub fn phase_label(phase: Phase) -> String {
    t(&format!("phase.{}", phase.to_db_str()))
}

/// 状态显示名
pub fn status_label(status: PhaseStatus) -> String {
    t(&format!("status.{}", status.to_db_str()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    // locale 为全局状态，测试默认并行执行；
    // i18n 相关测试（包括 export 模块）通过此锁串行化。
    pub(crate) static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(current_locale(), "en");

        set_locale(DEFAULT_LOCALE);
        assert_eq!(current_locale(), "ja");
    }

    #[test]
    fn test_phase_and_status_labels() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("ja");
        assert_eq!(phase_label(Phase::InBetween), "動画");
        assert_eq!(status_label(PhaseStatus::Retake), "リテイク");

        set_locale("en");
        assert_eq!(phase_label(Phase::VideoEdit), "Video edit");
        assert_eq!(status_label(PhaseStatus::Delayed), "Delayed");

        set_locale(DEFAULT_LOCALE);
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("ja");
        let msg = t_with_args("message.cuts_added", &[("count", "20"), ("episode", "3")]);
        assert_eq!(msg, "20カット追加 (第3話)");

        set_locale("en");
        let msg = t_with_args("message.phase_updated", &[("cut", "C042"), ("phase", "douga")]);
        assert_eq!(msg, "Updated C042 douga");

        set_locale(DEFAULT_LOCALE);
    }
}
