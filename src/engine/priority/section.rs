// ==========================================
// 部门 (section) → 工程 对照表
// ==========================================
// 静态对照表；未登记的名字按单一工程名解释
// ==========================================

use crate::domain::pipeline::downstream_of;
use crate::domain::types::Phase;

/// 部门名 → 负责的工程（流水线顺序）
pub const SECTIONS: &[(&str, &[Phase])] = &[
    ("sakkan", &[Phase::LayoutSupervision, Phase::KeySupervision]),
    ("enshutsu", &[Phase::LayoutDirection, Phase::KeyDirection]),
    ("douga", &[Phase::InBetween]),
    ("shiage", &[Phase::Finishing]),
    ("satsuei", &[Phase::Photography]),
];

/// 只查对照表
pub fn section_phases(name: &str) -> Option<&'static [Phase]> {
    let needle = name.trim().to_lowercase();
    SECTIONS
        .iter()
        .find(|(section, _)| *section == needle)
        .map(|(_, phases)| *phases)
}

/// 解析部门过滤
///
/// 1) 对照表命中 → 对应工程
/// 2) 否则按工程名解析 (DB 代码或英文名) → 单一工程
/// 3) 都不是 → None
pub fn resolve_section(name: &str) -> Option<&'static [Phase]> {
    if let Some(phases) = section_phases(name) {
        return Some(phases);
    }
    Phase::parse(name).map(|phase| &downstream_of(phase)[..1])
}
