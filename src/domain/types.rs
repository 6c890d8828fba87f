// ==========================================
// 制作進行管理 - 领域类型定义
// ==========================================
// 工程 / 状态 / 担当类型 / 发注状态
// 红线: 封闭枚举,禁止以自由字符串在各处散落比较
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 工程 (Pipeline Phase)
// ==========================================
// 判别值即流水线下标；顺序比较只在 pipeline 模块定义
// 序列化格式: 与数据库 cut_phase.phase 列一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "lo_raw")]
    LayoutRaw = 0, // LO ラフ
    #[serde(rename = "lo_enshutsu")]
    LayoutDirection = 1, // LO 演出チェック
    #[serde(rename = "lo_sakkan")]
    LayoutSupervision = 2, // LO 作監チェック
    #[serde(rename = "genga_raw")]
    KeyRaw = 3, // 原画
    #[serde(rename = "genga_enshutsu")]
    KeyDirection = 4, // 原画 演出チェック
    #[serde(rename = "genga_sakkan")]
    KeySupervision = 5, // 原画 作監チェック
    #[serde(rename = "douga")]
    InBetween = 6, // 動画
    #[serde(rename = "shiage")]
    Finishing = 7, // 仕上げ
    #[serde(rename = "satsuei")]
    Photography = 8, // 撮影
    #[serde(rename = "v_edit")]
    VideoEdit = 9, // V編
}

impl Phase {
    /// 全工程（流水线顺序）
    pub const ALL: [Phase; 10] = [
        Phase::LayoutRaw,
        Phase::LayoutDirection,
        Phase::LayoutSupervision,
        Phase::KeyRaw,
        Phase::KeyDirection,
        Phase::KeySupervision,
        Phase::InBetween,
        Phase::Finishing,
        Phase::Photography,
        Phase::VideoEdit,
    ];

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Phase::LayoutRaw => "lo_raw",
            Phase::LayoutDirection => "lo_enshutsu",
            Phase::LayoutSupervision => "lo_sakkan",
            Phase::KeyRaw => "genga_raw",
            Phase::KeyDirection => "genga_enshutsu",
            Phase::KeySupervision => "genga_sakkan",
            Phase::InBetween => "douga",
            Phase::Finishing => "shiage",
            Phase::Photography => "satsuei",
            Phase::VideoEdit => "v_edit",
        }
    }

    /// 英文名 (layout-raw ... video-edit)
    pub fn english_name(&self) -> &'static str {
        match self {
            Phase::LayoutRaw => "layout-raw",
            Phase::LayoutDirection => "layout-direction",
            Phase::LayoutSupervision => "layout-supervision",
            Phase::KeyRaw => "key-raw",
            Phase::KeyDirection => "key-direction",
            Phase::KeySupervision => "key-supervision",
            Phase::InBetween => "in-between",
            Phase::Finishing => "finishing",
            Phase::Photography => "photography",
            Phase::VideoEdit => "video-edit",
        }
    }

    /// 解析工程名
    ///
    /// 同时接受数据库代码 (`genga_raw`) 与英文名 (`key-raw`)，大小写不敏感
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        Phase::ALL
            .iter()
            .copied()
            .find(|p| p.to_db_str() == needle || p.english_name() == needle)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 工程状态 (Phase Status)
// ==========================================
// pending → in_progress → completed
// retake / delayed: 任意未完成状态均可进入
// completed 仅能被 retake 重新打开
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Pending,    // 未着手
    InProgress, // 作业中
    Completed,  // 完了
    Retake,     // リテイク
    Delayed,    // 遅延
}

impl PhaseStatus {
    pub const ALL: [PhaseStatus; 5] = [
        PhaseStatus::Pending,
        PhaseStatus::InProgress,
        PhaseStatus::Completed,
        PhaseStatus::Retake,
        PhaseStatus::Delayed,
    ];

    /// 开放状态集合（SQL IN 子句使用）
    pub const OPEN: [PhaseStatus; 4] = [
        PhaseStatus::Pending,
        PhaseStatus::InProgress,
        PhaseStatus::Retake,
        PhaseStatus::Delayed,
    ];

    pub fn to_db_str(&self) -> &'static str {
        match self {
            PhaseStatus::Pending => "pending",
            PhaseStatus::InProgress => "in_progress",
            PhaseStatus::Completed => "completed",
            PhaseStatus::Retake => "retake",
            PhaseStatus::Delayed => "delayed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase().replace('-', "_");
        PhaseStatus::ALL
            .iter()
            .copied()
            .find(|st| st.to_db_str() == needle)
    }

    /// 是否属于"开放"状态 (pending / in_progress / retake / delayed)
    pub fn is_open(&self) -> bool {
        !self.is_closed()
    }

    /// 是否属于"关闭"状态 (completed)
    pub fn is_closed(&self) -> bool {
        matches!(self, PhaseStatus::Completed)
    }

    /// 紧急度排名（越小越紧急）
    ///
    /// delayed(0) < retake(1) < in_progress(2) < pending(3)
    /// completed 不参与排序，排在最后
    pub fn urgency_rank(&self) -> u8 {
        match self {
            PhaseStatus::Delayed => 0,
            PhaseStatus::Retake => 1,
            PhaseStatus::InProgress => 2,
            PhaseStatus::Pending => 3,
            PhaseStatus::Completed => 4,
        }
    }

    /// 状态转换是否合法
    ///
    /// completed 只允许进入 retake（或保持 completed）
    pub fn can_transition_to(&self, next: PhaseStatus) -> bool {
        match self {
            PhaseStatus::Completed => {
                matches!(next, PhaseStatus::Retake | PhaseStatus::Completed)
            }
            _ => true,
        }
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 担当类型 (Assignee Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssigneeKind {
    Creator, // 个人
    Company, // 外注会社
}

impl AssigneeKind {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AssigneeKind::Creator => "creator",
            AssigneeKind::Company => "company",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "creator" => Some(AssigneeKind::Creator),
            "company" => Some(AssigneeKind::Company),
            _ => None,
        }
    }
}

impl fmt::Display for AssigneeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 发注状态 (Order Status)
// ==========================================
// draft → issued → (accepted) → completed
// 发注书不会自动修改工程记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,     // 草稿
    Issued,    // 已发出
    Accepted,  // 已受领
    Completed, // 已完成
}

impl OrderStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Issued => "issued",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Some(OrderStatus::Draft),
            "issued" => Some(OrderStatus::Issued),
            "accepted" => Some(OrderStatus::Accepted),
            "completed" => Some(OrderStatus::Completed),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Draft, OrderStatus::Issued)
                | (OrderStatus::Issued, OrderStatus::Accepted)
                | (OrderStatus::Issued, OrderStatus::Completed)
                | (OrderStatus::Accepted, OrderStatus::Completed)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_parse_accepts_db_code_and_english_name() {
        assert_eq!(Phase::parse("genga_raw"), Some(Phase::KeyRaw));
        assert_eq!(Phase::parse("key-raw"), Some(Phase::KeyRaw));
        assert_eq!(Phase::parse(" V_EDIT "), Some(Phase::VideoEdit));
        assert_eq!(Phase::parse("sakkan"), None);
    }

    #[test]
    fn test_phase_serde_uses_db_code() {
        let json = serde_json::to_string(&Phase::InBetween).unwrap();
        assert_eq!(json, "\"douga\"");
        let back: Phase = serde_json::from_str("\"lo_sakkan\"").unwrap();
        assert_eq!(back, Phase::LayoutSupervision);
    }

    #[test]
    fn test_status_open_closed() {
        assert!(PhaseStatus::Pending.is_open());
        assert!(PhaseStatus::Retake.is_open());
        assert!(PhaseStatus::Delayed.is_open());
        assert!(PhaseStatus::InProgress.is_open());
        assert!(PhaseStatus::Completed.is_closed());
        assert_eq!(PhaseStatus::OPEN.len(), 4);
    }

    #[test]
    fn test_status_urgency_rank_order() {
        assert!(PhaseStatus::Delayed.urgency_rank() < PhaseStatus::Retake.urgency_rank());
        assert!(PhaseStatus::Retake.urgency_rank() < PhaseStatus::InProgress.urgency_rank());
        assert!(PhaseStatus::InProgress.urgency_rank() < PhaseStatus::Pending.urgency_rank());
    }

    #[test]
    fn test_completed_only_reopens_via_retake() {
        assert!(PhaseStatus::Completed.can_transition_to(PhaseStatus::Retake));
        assert!(!PhaseStatus::Completed.can_transition_to(PhaseStatus::Pending));
        assert!(!PhaseStatus::Completed.can_transition_to(PhaseStatus::Delayed));
        assert!(PhaseStatus::Pending.can_transition_to(PhaseStatus::Delayed));
        assert!(PhaseStatus::Retake.can_transition_to(PhaseStatus::InProgress));
    }

    #[test]
    fn test_order_status_transitions() {
        assert!(OrderStatus::Draft.can_transition_to(OrderStatus::Issued));
        assert!(OrderStatus::Issued.can_transition_to(OrderStatus::Completed));
        assert!(OrderStatus::Issued.can_transition_to(OrderStatus::Accepted));
        assert!(!OrderStatus::Draft.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Draft));
    }
}
