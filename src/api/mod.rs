// ==========================================
// 制作進行管理 - API 层
// ==========================================
// 职责: 用例层,连接仓储与引擎,转换错误
// 输出: 结构化数据,不含任何显示格式（CSV 导出除外）
// ==========================================

pub mod cut_api;
pub mod error;
pub mod export;
pub mod order_api;
pub mod pipeline_api;
pub mod project_api;
pub mod roster_api;

// 重导出核心类型
pub use cut_api::{CutApi, PhaseUpdateOutcome};
pub use error::{ApiError, ApiResult};
pub use order_api::{CreateOrderRequest, OrderApi};
pub use pipeline_api::{DeadlineReport, PipelineApi};
pub use project_api::{EpisodeOverview, ProjectApi};
pub use roster_api::RosterApi;
