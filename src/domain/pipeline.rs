// ==========================================
// 制作進行管理 - 流水线模型
// ==========================================
// 职责: 固定十工程顺序的唯一定义点
// 红线: "下游"/"先后" 判断必须经过本模块,禁止在查询处写 CASE 排序
// ==========================================

use crate::domain::types::{Phase, PhaseStatus};
use std::cmp::Ordering;

/// 工程总数
pub const PHASE_COUNT: usize = Phase::ALL.len();

/// 流水线顺序（切片借用用）
static PIPELINE_ORDER: [Phase; PHASE_COUNT] = Phase::ALL;

impl Phase {
    /// 流水线下标 (0..PHASE_COUNT)
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// 由下标取工程
    pub fn from_index(index: usize) -> Option<Phase> {
        Phase::ALL.get(index).copied()
    }

    /// 下一个工程 (v_edit 之后为 None)
    pub fn next(&self) -> Option<Phase> {
        Phase::from_index(self.index() + 1)
    }
}

impl PartialOrd for Phase {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Phase {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index().cmp(&other.index())
    }
}

/// 工程 a 是否在工程 b 之前
pub fn is_before(a: Phase, b: Phase) -> bool {
    a.index() < b.index()
}

/// 工程 p 的下游（含 p 本身），按流水线顺序
pub fn downstream_of(phase: Phase) -> &'static [Phase] {
    PIPELINE_ORDER.get(phase.index()..).unwrap_or(&[])
}

/// 当前工程
///
/// 流水线顺序中最早的 pending / in_progress 工程；全部不满足则返回 None（已全部完成）
pub fn current_phase<I>(records: I) -> Option<Phase>
where
    I: IntoIterator<Item = (Phase, PhaseStatus)>,
{
    records
        .into_iter()
        .filter(|(_, status)| matches!(status, PhaseStatus::Pending | PhaseStatus::InProgress))
        .map(|(phase, _)| phase)
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_declared_order() {
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i);
            assert_eq!(Phase::from_index(i), Some(*phase));
        }
        assert_eq!(Phase::from_index(PHASE_COUNT), None);
        assert_eq!(Phase::KeyRaw.index(), 3);
        assert_eq!(Phase::VideoEdit.index(), PHASE_COUNT - 1);
    }

    #[test]
    fn test_ordering_follows_pipeline() {
        assert!(Phase::LayoutRaw < Phase::VideoEdit);
        assert!(is_before(Phase::KeySupervision, Phase::InBetween));
        assert!(!is_before(Phase::Finishing, Phase::Finishing));
        let mut shuffled = vec![Phase::VideoEdit, Phase::KeyRaw, Phase::LayoutRaw];
        shuffled.sort();
        assert_eq!(shuffled, vec![Phase::LayoutRaw, Phase::KeyRaw, Phase::VideoEdit]);
    }

    #[test]
    fn test_downstream_is_inclusive() {
        let down = downstream_of(Phase::KeyRaw);
        assert_eq!(down.len(), 7);
        assert_eq!(down[0], Phase::KeyRaw);
        assert_eq!(down[6], Phase::VideoEdit);
        assert_eq!(downstream_of(Phase::VideoEdit), &[Phase::VideoEdit]);
    }

    #[test]
    fn test_next_stops_after_video_edit() {
        assert_eq!(Phase::Photography.next(), Some(Phase::VideoEdit));
        assert_eq!(Phase::VideoEdit.next(), None);
    }

    #[test]
    fn test_current_phase_skips_exception_states() {
        let records = vec![
            (Phase::LayoutRaw, PhaseStatus::Completed),
            (Phase::LayoutDirection, PhaseStatus::Retake),
            (Phase::KeyRaw, PhaseStatus::Pending),
            (Phase::LayoutSupervision, PhaseStatus::InProgress),
        ];
        assert_eq!(current_phase(records), Some(Phase::LayoutSupervision));

        let done = Phase::ALL.iter().map(|p| (*p, PhaseStatus::Completed));
        assert_eq!(current_phase(done), None);
    }
}
