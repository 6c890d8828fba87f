// ==========================================
// 制作進行管理 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、流水线顺序
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod cut;
pub mod cut_range;
pub mod order;
pub mod pipeline;
pub mod project;
pub mod retake;
pub mod roster;
pub mod types;
pub mod work_item;

// 重导出核心类型
pub use cut::{
    AssigneeRef, BoardColumn, BoardEntry, Cut, CutDetail, CutPriorityUpdate, CutSummary,
    PhaseRecord, PhaseUpdate,
};
pub use cut_range::{parse_cut_range, CutRangeError};
pub use order::{NewOrder, Order};
pub use project::{Episode, NewEpisode, NewProject, Project};
pub use retake::RetakeRecord;
pub use roster::{Company, Creator, CreatorUpdate, NewCompany, NewCreator};
pub use types::{AssigneeKind, OrderStatus, Phase, PhaseStatus};
pub use work_item::{DeadlineItem, PhaseCounts, PhaseRecordRow, WorkItem};
