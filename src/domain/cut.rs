// ==========================================
// 制作進行管理 - 卡 / 工程记录 领域模型
// ==========================================
// 红线: 每个卡恰好拥有十条工程记录,与卡同时创建
// ==========================================

use crate::domain::types::{AssigneeKind, Phase, PhaseStatus};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 难易度下限
pub const MIN_DIFFICULTY: i32 = 1;
/// 难易度上限
pub const MAX_DIFFICULTY: i32 = 5;

/// 难易度是否在 1..=5 内
pub fn is_valid_difficulty(difficulty: i32) -> bool {
    (MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty)
}

// ==========================================
// Cut - 卡
// ==========================================
// 对齐: cut 表, UNIQUE(episode_id, number)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cut {
    pub id: i64,
    pub episode_id: i64,
    pub number: String,                  // 卡号 (C042)
    pub difficulty: i32,                 // 难易度 1-5
    pub is_priority: bool,               // 优先标记
    pub priority_reason: Option<String>, // 优先理由
    pub created_at: Option<NaiveDateTime>,
}

/// 卡一览行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutSummary {
    pub cut: Cut,
    pub current_phase: Option<Phase>, // None = 全工程完了
    pub completed_phases: i64,
}

/// 卡详情（含十条工程记录，流水线顺序）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutDetail {
    pub cut: Cut,
    pub phases: Vec<PhaseRecord>,
}

impl CutDetail {
    pub fn phase(&self, phase: Phase) -> Option<&PhaseRecord> {
        self.phases.iter().find(|r| r.phase == phase)
    }

    pub fn current_phase(&self) -> Option<Phase> {
        crate::domain::pipeline::current_phase(self.phases.iter().map(|r| (r.phase, r.status)))
    }
}

// ==========================================
// AssigneeRef - 担当引用
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssigneeRef {
    pub kind: AssigneeKind,
    pub id: i64,
}

impl AssigneeRef {
    pub fn creator(id: i64) -> Self {
        Self {
            kind: AssigneeKind::Creator,
            id,
        }
    }

    pub fn company(id: i64) -> Self {
        Self {
            kind: AssigneeKind::Company,
            id,
        }
    }
}

// ==========================================
// PhaseRecord - 工程记录
// ==========================================
// 对齐: cut_phase 表, UNIQUE(cut_id, phase)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub id: i64,
    pub cut_id: i64,
    pub phase: Phase,
    pub status: PhaseStatus,
    pub assignee: Option<AssigneeRef>,
    pub assignee_name: Option<String>, // 解析后的担当显示名
    pub deadline: Option<NaiveDate>,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

// ==========================================
// PhaseUpdate - 工程记录更新补丁
// ==========================================
// 只更新调用方给出的字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseUpdate {
    pub status: Option<PhaseStatus>,
    pub assignee: Option<AssigneeRef>,
    pub deadline: Option<NaiveDate>,
    pub retake_reason: Option<String>, // 仅 status = retake 时记录
}

impl PhaseUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.assignee.is_none() && self.deadline.is_none()
    }

    /// 去掉与当前记录相同的字段；结果为空即无需写入
    pub fn effective_against(&self, current: &PhaseRecord) -> PhaseUpdate {
        PhaseUpdate {
            status: self.status.filter(|s| *s != current.status),
            assignee: self.assignee.filter(|a| Some(*a) != current.assignee),
            deadline: self.deadline.filter(|d| Some(*d) != current.deadline),
            retake_reason: self.retake_reason.clone(),
        }
    }
}

// ==========================================
// CutPriorityUpdate - 卡属性更新补丁
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CutPriorityUpdate {
    pub difficulty: Option<i32>,
    pub is_priority: Option<bool>,
    pub priority_reason: Option<String>,
}

impl CutPriorityUpdate {
    pub fn is_empty(&self) -> bool {
        self.difficulty.is_none() && self.is_priority.is_none() && self.priority_reason.is_none()
    }
}

// ==========================================
// BoardEntry - 工程别看板行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardEntry {
    pub cut_number: String,
    pub status: PhaseStatus,
    pub assignee_name: Option<String>,
}

/// 工程别看板
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardColumn {
    pub phase: Phase,
    pub entries: Vec<BoardEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: PhaseStatus, assignee: Option<AssigneeRef>) -> PhaseRecord {
        PhaseRecord {
            id: 1,
            cut_id: 1,
            phase: Phase::KeyRaw,
            status,
            assignee,
            assignee_name: None,
            deadline: NaiveDate::from_ymd_opt(2026, 11, 1),
            started_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn test_difficulty_range() {
        assert!(is_valid_difficulty(1));
        assert!(is_valid_difficulty(5));
        assert!(!is_valid_difficulty(0));
        assert!(!is_valid_difficulty(6));
    }

    #[test]
    fn test_empty_patch() {
        assert!(PhaseUpdate::default().is_empty());
        // 仅有 retake 理由不构成更新
        let only_reason = PhaseUpdate {
            retake_reason: Some("線が荒い".to_string()),
            ..Default::default()
        };
        assert!(only_reason.is_empty());
    }

    #[test]
    fn test_effective_patch_drops_unchanged_fields() {
        let current = record(PhaseStatus::InProgress, Some(AssigneeRef::creator(7)));
        let patch = PhaseUpdate {
            status: Some(PhaseStatus::InProgress),
            assignee: Some(AssigneeRef::creator(7)),
            deadline: NaiveDate::from_ymd_opt(2026, 11, 1),
            retake_reason: None,
        };
        assert!(patch.effective_against(&current).is_empty());

        let patch = PhaseUpdate {
            status: Some(PhaseStatus::Completed),
            assignee: Some(AssigneeRef::company(7)),
            ..Default::default()
        };
        let effective = patch.effective_against(&current);
        assert_eq!(effective.status, Some(PhaseStatus::Completed));
        assert_eq!(effective.assignee, Some(AssigneeRef::company(7)));
        assert_eq!(effective.deadline, None);
    }
}
