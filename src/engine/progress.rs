// ==========================================
// 制作進行管理 - 进捗集计引擎
// ==========================================
// 职责: 作品 / 话数 / 工程 三级进捗集计
// 输入: 仓储层给出的工程别计数 + 话数卡数
// 输出: ProjectProgress（报表视图用）
// ==========================================
// 红线: 只读集计,不做任何写入
// 红线: 每个工程 total == 话数卡数,done + open == total
// ==========================================

use crate::domain::types::Phase;
use crate::domain::work_item::PhaseCounts;
use serde::{Deserialize, Serialize};

// ==========================================
// PhaseProgress - 工程别进捗
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseProgress {
    pub phase: Phase,
    pub total: i64,
    pub done: i64,
    pub delayed: i64,
    pub retake: i64,
    /// 未完了 (total - done)
    pub open: i64,
}

impl PhaseProgress {
    pub fn from_counts(phase: Phase, counts: PhaseCounts) -> Self {
        Self {
            phase,
            total: counts.total,
            done: counts.completed,
            delayed: counts.delayed,
            retake: counts.retake,
            open: counts.total - counts.completed,
        }
    }

    /// 完了率 (0.0 - 1.0)；记录为 0 时视为 0
    pub fn completion_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f64 / self.total as f64
        }
    }
}

// ==========================================
// EpisodeProgress - 话数进捗
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeProgress {
    pub episode_id: i64,
    pub episode_number: i32,
    pub title: Option<String>,
    pub cut_count: i64,
    pub phases: Vec<PhaseProgress>,
}

impl EpisodeProgress {
    pub fn phase(&self, phase: Phase) -> Option<&PhaseProgress> {
        self.phases.iter().find(|p| p.phase == phase)
    }

    /// 全工程完了记录 / 全记录
    pub fn completion_ratio(&self) -> f64 {
        let total: i64 = self.phases.iter().map(|p| p.total).sum();
        let done: i64 = self.phases.iter().map(|p| p.done).sum();
        if total == 0 {
            0.0
        } else {
            done as f64 / total as f64
        }
    }

    /// 各工程 total == cut_count 且 done + open == total
    pub fn is_consistent(&self) -> bool {
        self.phases
            .iter()
            .all(|p| p.total == self.cut_count && p.done + p.open == p.total && p.done <= p.total)
    }
}

// ==========================================
// ProjectProgress - 作品进捗
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectProgress {
    pub project_id: i64,
    pub project_name: String,
    pub episodes: Vec<EpisodeProgress>,
    /// 未分配的开放作业数
    pub unassigned_open: i64,
    /// 遅延作业数
    pub delayed: i64,
}

// ==========================================
// ProgressAggregator - 进捗集计引擎
// ==========================================
pub struct ProgressAggregator;

impl ProgressAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 集计一个话数
    ///
    /// # 参数
    /// - `counts`: 工程别计数；缺失的工程按 0 计
    pub fn aggregate_episode(
        &self,
        episode_id: i64,
        episode_number: i32,
        title: Option<String>,
        cut_count: i64,
        counts: &[(Phase, PhaseCounts)],
    ) -> EpisodeProgress {
        let phases = Phase::ALL
            .iter()
            .map(|phase| {
                let c = counts
                    .iter()
                    .find(|(p, _)| p == phase)
                    .map(|(_, c)| *c)
                    .unwrap_or_default();
                PhaseProgress::from_counts(*phase, c)
            })
            .collect();

        let progress = EpisodeProgress {
            episode_id,
            episode_number,
            title,
            cut_count,
            phases,
        };

        if !progress.is_consistent() {
            tracing::warn!(
                episode_id,
                episode_number,
                cut_count,
                "phase record totals disagree with cut count"
            );
        }
        progress
    }

    /// 汇总作品
    pub fn aggregate_project(
        &self,
        project_id: i64,
        project_name: impl Into<String>,
        episodes: Vec<EpisodeProgress>,
        unassigned_open: i64,
        delayed: i64,
    ) -> ProjectProgress {
        ProjectProgress {
            project_id,
            project_name: project_name.into(),
            episodes,
            unassigned_open,
            delayed,
        }
    }
}

impl Default for ProgressAggregator {
    fn default() -> Self {
        Self::new()
    }
}
