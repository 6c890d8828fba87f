// ==========================================
// 制作進行管理 - CSV 导出
// ==========================================
// 职责: 优先作业列表 / 工程别看板 导出为 CSV
// 表头与工程/状态名按当前语言输出
// ==========================================

use std::io::Write;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::cut::BoardColumn;
use crate::domain::work_item::WorkItem;
use crate::i18n::{phase_label, status_label, t};
use crate::repository::sql_utils::format_date;

fn csv_error(e: csv::Error) -> ApiError {
    ApiError::InternalError(format!("CSV 写入失败: {}", e))
}

/// 写出优先作业列表
pub fn write_priority_csv<W: Write>(writer: W, items: &[WorkItem]) -> ApiResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        t("export.priority_header.rank"),
        t("export.priority_header.cut"),
        t("export.priority_header.phase"),
        t("export.priority_header.status"),
        t("export.priority_header.difficulty"),
        t("export.priority_header.assignee"),
        t("export.priority_header.deadline"),
        t("export.priority_header.reason"),
    ])
    .map_err(csv_error)?;

    for (i, item) in items.iter().enumerate() {
        wtr.write_record([
            (i + 1).to_string(),
            item.cut_number.clone(),
            phase_label(item.phase),
            status_label(item.status),
            item.difficulty.to_string(),
            item.assignee_name
                .clone()
                .unwrap_or_else(|| t("export.unassigned")),
            item.deadline
                .map(format_date)
                .unwrap_or_else(|| t("export.no_deadline")),
            item.priority_reason.clone().unwrap_or_default(),
        ])
        .map_err(csv_error)?;
    }
    wtr.flush()
        .map_err(|e| ApiError::InternalError(format!("CSV 写入失败: {}", e)))?;
    Ok(())
}

/// 写出工程别看板（每行: 工程, 卡号, 状态, 担当）
pub fn write_board_csv<W: Write>(writer: W, board: &[BoardColumn]) -> ApiResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        t("export.board_header.phase"),
        t("export.board_header.cut"),
        t("export.board_header.status"),
        t("export.board_header.assignee"),
    ])
    .map_err(csv_error)?;

    for column in board {
        let label = phase_label(column.phase);
        for entry in &column.entries {
            wtr.write_record([
                label.clone(),
                entry.cut_number.clone(),
                status_label(entry.status),
                entry.assignee_name.clone().unwrap_or_default(),
            ])
            .map_err(csv_error)?;
        }
    }
    wtr.flush()
        .map_err(|e| ApiError::InternalError(format!("CSV 写入失败: {}", e)))?;
    Ok(())
}

/// 优先作业列表 CSV 文本
pub fn priority_csv(items: &[WorkItem]) -> ApiResult<String> {
    let mut buf = Vec::new();
    write_priority_csv(&mut buf, items)?;
    String::from_utf8(buf).map_err(|e| ApiError::InternalError(e.to_string()))
}

/// 看板 CSV 文本
pub fn board_csv(board: &[BoardColumn]) -> ApiResult<String> {
    let mut buf = Vec::new();
    write_board_csv(&mut buf, board)?;
    String::from_utf8(buf).map_err(|e| ApiError::InternalError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cut::BoardEntry;
    use crate::domain::types::{Phase, PhaseStatus};
    use crate::i18n::tests::LOCALE_TEST_LOCK;
    use crate::i18n::{set_locale, DEFAULT_LOCALE};
    use chrono::NaiveDate;

    fn sample_item() -> WorkItem {
        WorkItem {
            cut_number: "C010".to_string(),
            difficulty: 5,
            is_priority: true,
            priority_reason: Some("retake risk".to_string()),
            phase: Phase::InBetween,
            status: PhaseStatus::Delayed,
            deadline: NaiveDate::from_ymd_opt(2026, 11, 2),
            assignee_name: None,
        }
    }

    #[test]
    fn test_priority_csv_japanese_headers() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale(DEFAULT_LOCALE);
        let text = priority_csv(&[sample_item()]).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("順位,カット,工程,状態,難易度,担当,締切,優先理由")
        );
        assert_eq!(
            lines.next(),
            Some("1,C010,動画,遅延,5,未割当,2026-11-02,retake risk")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_board_csv_english() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        let board = vec![BoardColumn {
            phase: Phase::KeyRaw,
            entries: vec![BoardEntry {
                cut_number: "C001".to_string(),
                status: PhaseStatus::InProgress,
                assignee_name: Some("Sato".to_string()),
            }],
        }];
        let text = board_csv(&board).unwrap();
        set_locale(DEFAULT_LOCALE);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Phase,Cut,Status,Assignee");
        assert_eq!(lines[1], "Key animation,C001,In progress,Sato");
    }

    #[test]
    fn test_empty_priority_list_has_header_only() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale(DEFAULT_LOCALE);
        let text = priority_csv(&[]).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
