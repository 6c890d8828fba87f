// ==========================================
// 制作進行管理 - リテイク履历
// ==========================================
// 工程记录进入 retake 时开启一条履历,离开 retake 时关闭
// ==========================================

use crate::domain::types::Phase;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetakeRecord {
    pub retake_id: String, // UUID v4
    pub cut_phase_id: i64,
    pub phase: Phase,
    pub returned_at: NaiveDateTime,
    pub reason: Option<String>,
    pub resolved_at: Option<NaiveDateTime>,
}

impl RetakeRecord {
    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}
