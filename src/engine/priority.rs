// ==========================================
// 制作進行管理 - 优先作业排序引擎
// ==========================================
// 职责: 对一个话数内的开放工程作业给出"下一步做什么"的顺序
// 输入: 仓储层返回的开放作业 (WorkItem, 顺序不保证)
// 输出: 按优先键排好的作业列表
// ==========================================
// 红线: Engine 不拼 SQL
// 红线: 结果为空是正常结果（无待办）,不是错误
// ==========================================

mod core;
pub mod section;


pub use core::PriorityRanker;
pub use section::{resolve_section, section_phases, SECTIONS};
