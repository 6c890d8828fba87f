use crate::domain::work_item::WorkItem;
use chrono::NaiveDate;
use std::cmp::Ordering;

// ==========================================
// PriorityRanker - 优先作业排序引擎
// ==========================================
pub struct PriorityRanker {
    // 无状态引擎,不需要注入依赖
}

impl PriorityRanker {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 排序开放作业
    ///
    /// 排序键:
    /// 1) is_priority 优先
    /// 2) 状态紧急度 delayed < retake < in_progress < pending
    /// 3) difficulty 降序
    /// 4) deadline 升序 (无截止日排最后)
    /// 5) cut_number 升序
    /// 6) 工程顺序 (同一卡在部门内有两个工程时)
    ///
    /// completed 记录不参与排序,直接丢弃
    ///
    /// # 返回
    /// 排序后的作业列表（优先级从高到低）
    pub fn rank(&self, items: Vec<WorkItem>) -> Vec<WorkItem> {
        let mut open: Vec<WorkItem> = items
            .into_iter()
            .filter(|item| item.status.is_open())
            .collect();
        open.sort_by(|a, b| self.compare(a, b));
        open
    }

    // ==========================================
    // 比较方法
    // ==========================================

    /// 比较两个作业的优先级
    ///
    /// # 返回
    /// Ordering::Less 表示 a 优先于 b
    pub fn compare(&self, a: &WorkItem, b: &WorkItem) -> Ordering {
        // 1. 优先标记 (true 在前)
        match b.is_priority.cmp(&a.is_priority) {
            Ordering::Equal => {}
            other => return other,
        }

        // 2. 状态紧急度 (越小越紧急)
        match a.status.urgency_rank().cmp(&b.status.urgency_rank()) {
            Ordering::Equal => {}
            other => return other,
        }

        // 3. 难易度 (降序)
        match b.difficulty.cmp(&a.difficulty) {
            Ordering::Equal => {}
            other => return other,
        }

        // 4. 截止日 (升序, None 最后)
        match self.compare_deadline(a.deadline, b.deadline) {
            Ordering::Equal => {}
            other => return other,
        }

        // 5. 卡号 (字典序升序)
        match a.cut_number.cmp(&b.cut_number) {
            Ordering::Equal => {}
            other => return other,
        }

        // 6. 工程顺序
        a.phase.cmp(&b.phase)
    }

    fn compare_deadline(&self, a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl Default for PriorityRanker {
    fn default() -> Self {
        Self::new()
    }
}
