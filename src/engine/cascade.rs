// ==========================================
// 制作進行管理 - 遅延カスケード 模拟引擎
// ==========================================
// 职责: 推算某工程遅延 N 日后,下游各工程受影响的程度
// 输入: 起点工程 + 遅延日数 + 各工程未完了记录的读取函数
// 输出: 受影响工程列表（起点在前,流水线顺序）
// ==========================================
// 红线: 纯推算,不写任何状态/截止日
// 红线: 每个下游工程固定吸收 1 日,不按工程类型/工作量加权
// ==========================================

use crate::domain::pipeline::downstream_of;
use crate::domain::types::Phase;
use crate::domain::work_item::PhaseRecordRow;
use serde::{Deserialize, Serialize};

// ==========================================
// CascadeImpact - 单工程影响
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeImpact {
    pub phase: Phase,
    /// 残余遅延日数 (> 0)
    pub delay_days: i64,
    pub affected_cuts: usize,
    pub cuts: Vec<PhaseRecordRow>,
}

// ==========================================
// DelayCascadeSimulator - 遅延カスケード模拟
// ==========================================
pub struct DelayCascadeSimulator;

impl DelayCascadeSimulator {
    pub fn new() -> Self {
        Self
    }

    /// 残余遅延窗口
    ///
    /// 起点工程为 k=0,第 k 个下游工程残余 days - k,
    /// 残余 <= 0 即停止。days <= 0 返回空。
    pub fn residual_window(&self, origin: Phase, days: i64) -> Vec<(Phase, i64)> {
        if days <= 0 {
            return Vec::new();
        }
        downstream_of(origin)
            .iter()
            .enumerate()
            .map(|(k, phase)| (*phase, days - k as i64))
            .take_while(|(_, residual)| *residual > 0)
            .collect()
    }

    /// 执行模拟
    ///
    /// # 参数
    /// - `origin`: 遅延发生的工程
    /// - `days`: 遅延日数
    /// - `load_open`: 读取某工程在该话数内的未完了记录
    ///
    /// # 返回
    /// 有未完了记录的受影响工程；无记录的工程不输出
    pub fn simulate<F, E>(
        &self,
        origin: Phase,
        days: i64,
        mut load_open: F,
    ) -> Result<Vec<CascadeImpact>, E>
    where
        F: FnMut(Phase) -> Result<Vec<PhaseRecordRow>, E>,
    {
        let mut impacts = Vec::new();
        for (phase, residual) in self.residual_window(origin, days) {
            let cuts: Vec<PhaseRecordRow> = load_open(phase)?
                .into_iter()
                .filter(|row| row.status.is_open())
                .collect();
            if cuts.is_empty() {
                continue;
            }
            impacts.push(CascadeImpact {
                phase,
                delay_days: residual,
                affected_cuts: cuts.len(),
                cuts,
            });
        }
        Ok(impacts)
    }
}

impl Default for DelayCascadeSimulator {
    fn default() -> Self {
        Self::new()
    }
}
