// ==========================================
// 制作進行管理 - 配置层
// ==========================================
// 职责: 系统配置管理（当前作品、默认值、语言）
// 存储: config_kv 表 (scope_id = 'global')
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
