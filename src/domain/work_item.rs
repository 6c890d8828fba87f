// ==========================================
// 制作進行管理 - 引擎输入行模型
// ==========================================
// 仓储层按此结构返回查询结果,引擎层只消费这些结构
// ==========================================

use crate::domain::types::{Phase, PhaseStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// WorkItem - 开放工程作业项
// ==========================================
// 优先排序引擎的输入,也是其输出元素
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub cut_number: String,
    pub difficulty: i32,
    pub is_priority: bool,
    pub priority_reason: Option<String>,
    pub phase: Phase,
    pub status: PhaseStatus,
    pub deadline: Option<NaiveDate>,
    pub assignee_name: Option<String>,
}

// ==========================================
// PhaseRecordRow - 工程记录简表
// ==========================================
// 遅延カスケード使用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecordRow {
    pub cut_number: String,
    pub phase: Phase,
    pub status: PhaseStatus,
    pub deadline: Option<NaiveDate>,
}

// ==========================================
// PhaseCounts - 工程别计数
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseCounts {
    pub total: i64,
    pub completed: i64,
    pub delayed: i64,
    pub retake: i64,
}

// ==========================================
// DeadlineItem - 带截止日的开放作业
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineItem {
    pub episode_number: i32,
    pub cut_number: String,
    pub phase: Phase,
    pub status: PhaseStatus,
    pub deadline: NaiveDate,
    pub assignee_name: Option<String>,
}
