// ==========================================
// 制作進行管理 - 仓储层行映射工具
// ==========================================
// 日期/时间/枚举列的解析统一在此处
// ==========================================

use crate::domain::cut::AssigneeRef;
use crate::domain::types::{AssigneeKind, Phase, PhaseStatus};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 解析日期列；格式不符视为未设置
pub fn parse_date(raw: Option<String>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok())
}

/// 解析 datetime('now') 格式的时间列
pub fn parse_datetime(raw: Option<String>) -> Option<NaiveDateTime> {
    raw.and_then(|s| NaiveDateTime::parse_from_str(s.trim(), DATETIME_FORMAT).ok())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_datetime(ts: NaiveDateTime) -> String {
    ts.format(DATETIME_FORMAT).to_string()
}

fn conversion_error(idx: usize, what: &str, raw: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        format!("未知{}: {}", what, raw).into(),
    )
}

/// 读取工程列
pub fn phase_at(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Phase> {
    let raw: String = row.get(idx)?;
    Phase::parse(&raw).ok_or_else(|| conversion_error(idx, "工程", &raw))
}

/// 读取状态列
pub fn status_at(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<PhaseStatus> {
    let raw: String = row.get(idx)?;
    PhaseStatus::parse(&raw).ok_or_else(|| conversion_error(idx, "状态", &raw))
}

/// 读取担当 (assignee_type, assignee_id) 两列
pub fn assignee_at(
    row: &rusqlite::Row<'_>,
    kind_idx: usize,
    id_idx: usize,
) -> rusqlite::Result<Option<AssigneeRef>> {
    let kind: Option<String> = row.get(kind_idx)?;
    let id: Option<i64> = row.get(id_idx)?;
    match (kind, id) {
        (Some(kind), Some(id)) => {
            let kind = AssigneeKind::parse(&kind)
                .ok_or_else(|| conversion_error(kind_idx, "担当类型", &kind))?;
            Ok(Some(AssigneeRef { kind, id }))
        }
        // 旧数据只有 assignee_id 时按个人处理
        (None, Some(id)) => Ok(Some(AssigneeRef::creator(id))),
        _ => Ok(None),
    }
}

/// 生成 `?N, ?N+1, ...` 占位符
pub fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 开放状态 IN 子句字面量
pub fn open_status_list() -> String {
    PhaseStatus::OPEN
        .iter()
        .map(|s| format!("'{}'", s.to_db_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 担当显示名 SQL 片段（需 LEFT JOIN creator cr / company co）
pub const ASSIGNEE_NAME_SQL: &str = r#"
    CASE cp.assignee_type
        WHEN 'company' THEN co.name
        ELSE cr.name
    END
"#;

/// 担当关联 JOIN 片段
pub const ASSIGNEE_JOIN_SQL: &str = r#"
    LEFT JOIN creator cr
        ON cr.id = cp.assignee_id AND COALESCE(cp.assignee_type, 'creator') = 'creator'
    LEFT JOIN company co
        ON co.id = cp.assignee_id AND cp.assignee_type = 'company'
"#;
