// ==========================================
// 制作進行管理 - 发注书 领域模型
// ==========================================
// 发注书是叠加在工程状态之上的商业约定,不自动修改工程记录
// ==========================================

use crate::domain::types::{AssigneeKind, OrderStatus, Phase};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Order - 发注书
// ==========================================
// 对齐: "order" 表 (cut_numbers 以逗号存储)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub episode_id: i64,
    pub phase: Phase,
    pub cut_numbers: Vec<String>,
    pub assignee_kind: AssigneeKind,
    pub assignee_id: i64,
    pub price_per_cut: i64,
    pub total_price: i64,
    pub deadline: Option<NaiveDate>,
    pub status: OrderStatus,
    pub issued_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
}

/// 新建发注书参数（cut_numbers 已展开）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub episode_id: i64,
    pub phase: Phase,
    pub cut_numbers: Vec<String>,
    pub assignee_kind: AssigneeKind,
    pub assignee_id: i64,
    pub price_per_cut: i64,
    pub deadline: Option<NaiveDate>,
}

impl NewOrder {
    /// 合计金额 = 卡单价 × 卡数；溢出时返回 None
    pub fn total_price(&self) -> Option<i64> {
        i64::try_from(self.cut_numbers.len())
            .ok()
            .and_then(|n| self.price_per_cut.checked_mul(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_price_multiplies_cut_count() {
        let order = NewOrder {
            episode_id: 1,
            phase: Phase::KeyRaw,
            cut_numbers: vec!["C042".into(), "C043".into(), "C044".into()],
            assignee_kind: AssigneeKind::Creator,
            assignee_id: 1,
            price_per_cut: 3800,
            deadline: None,
        };
        assert_eq!(order.total_price(), Some(11_400));
    }

    #[test]
    fn test_total_price_overflow_is_none() {
        let order = NewOrder {
            episode_id: 1,
            phase: Phase::InBetween,
            cut_numbers: (1..=10).map(|n| format!("C{:03}", n)).collect(),
            assignee_kind: AssigneeKind::Company,
            assignee_id: 1,
            price_per_cut: i64::MAX / 4,
            deadline: None,
        };
        assert_eq!(order.total_price(), None);
    }
}
