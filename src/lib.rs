// ==========================================
// 制作進行管理 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: アニメ制作パイプライン管理（卡 × 十工程）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "ja");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 性能埋点
pub mod perf;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 共享状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AssigneeKind, OrderStatus, Phase, PhaseStatus};

// 领域实体
pub use domain::{
    Cut, CutDetail, CutSummary, Episode, Order, PhaseRecord, PhaseUpdate, Project, WorkItem,
};

// 引擎
pub use engine::{
    CascadeImpact, DeadlineClassifier, DelayCascadeSimulator, PriorityRanker, ProgressAggregator,
    ProjectProgress,
};

// API
pub use api::{ApiError, ApiResult, CutApi, OrderApi, PipelineApi, ProjectApi, RosterApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "制作進行管理";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
