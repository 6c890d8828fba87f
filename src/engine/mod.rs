// ==========================================
// 制作進行管理 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: Engine 不拼 SQL,数据由 API 层经仓储读取后传入
// ==========================================

pub mod cascade;
pub mod deadline;
pub mod priority;
pub mod progress;

// 重导出核心引擎
pub use cascade::{CascadeImpact, DelayCascadeSimulator};
pub use deadline::{DeadlineBuckets, DeadlineClassifier};
pub use priority::{resolve_section, PriorityRanker};
pub use progress::{EpisodeProgress, PhaseProgress, ProgressAggregator, ProjectProgress};
