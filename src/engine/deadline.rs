// ==========================================
// 制作進行管理 - 截止日分类引擎
// ==========================================
// 职责: 将带截止日的开放作业按基准日分桶
// 输入: DeadlineItem 列表 + 基准日
// 输出: overdue / today / tomorrow / this_week
// ==========================================

use crate::domain::work_item::DeadlineItem;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// this_week 的上限（含）
pub const THIS_WEEK_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeadlineBuckets {
    pub overdue: Vec<DeadlineItem>,
    pub today: Vec<DeadlineItem>,
    pub tomorrow: Vec<DeadlineItem>,
    /// 2..=7 日后
    pub this_week: Vec<DeadlineItem>,
}

impl DeadlineBuckets {
    pub fn total(&self) -> usize {
        self.overdue.len() + self.today.len() + self.tomorrow.len() + self.this_week.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

pub struct DeadlineClassifier;

impl DeadlineClassifier {
    pub fn new() -> Self {
        Self
    }

    /// 分桶；8 日以后的作业不进入任何桶
    ///
    /// 桶内保持输入顺序
    pub fn classify(&self, items: Vec<DeadlineItem>, today: NaiveDate) -> DeadlineBuckets {
        let mut buckets = DeadlineBuckets::default();
        for item in items {
            if item.status.is_closed() {
                continue;
            }
            let days = (item.deadline - today).num_days();
            match days {
                d if d < 0 => buckets.overdue.push(item),
                0 => buckets.today.push(item),
                1 => buckets.tomorrow.push(item),
                d if d <= THIS_WEEK_DAYS => buckets.this_week.push(item),
                _ => {}
            }
        }
        buckets
    }

    /// 今天起 within_days 日内（含）到期的开放作业数,不含已超期
    pub fn due_soon_count(&self, items: &[DeadlineItem], today: NaiveDate, within_days: i64) -> usize {
        items
            .iter()
            .filter(|item| item.status.is_open())
            .filter(|item| {
                let days = (item.deadline - today).num_days();
                (0..=within_days).contains(&days)
            })
            .count()
    }
}

impl Default for DeadlineClassifier {
    fn default() -> Self {
        Self::new()
    }
}
