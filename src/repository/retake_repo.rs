// ==========================================
// 制作進行管理 - リテイク履历 数据仓储
// ==========================================
// 写入由 CutRepository::update_phase 在同一事务内完成,此处只读
// ==========================================

use crate::domain::retake::RetakeRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{parse_datetime, phase_at};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct RetakeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RetakeRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &rusqlite::Row<'_>) -> SqliteResult<RetakeRecord> {
        let returned_raw: String = row.get(3)?;
        let returned_at = parse_datetime(Some(returned_raw.clone())).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                Type::Text,
                format!("returned_at 格式错误: {}", returned_raw).into(),
            )
        })?;
        Ok(RetakeRecord {
            retake_id: row.get(0)?,
            cut_phase_id: row.get(1)?,
            phase: phase_at(row, 2)?,
            returned_at,
            reason: row.get(4)?,
            resolved_at: parse_datetime(row.get(5)?),
        })
    }

    /// 卡的全部リテイク履历（旧→新）
    pub fn list_by_cut(&self, cut_id: i64) -> RepositoryResult<Vec<RetakeRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT rh.retake_id, rh.cut_phase_id, cp.phase, rh.returned_at, rh.reason, rh.resolved_at
            FROM retake_history rh
            JOIN cut_phase cp ON cp.id = rh.cut_phase_id
            WHERE cp.cut_id = ?1
            ORDER BY rh.returned_at, rh.rowid
            "#,
        )?;
        let rows = stmt
            .query_map(params![cut_id], Self::map_row)?
            .collect::<SqliteResult<Vec<RetakeRecord>>>()?;
        Ok(rows)
    }
}
