// ==========================================
// 制作進行管理 - 卡 / 工程记录 数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 卡与其十条工程记录在同一事务内创建
// ==========================================
// 职责:
// - 卡 CRUD
// - 工程记录更新（单条原子写入）
// - 引擎查询接口（开放作业 / 工程记录 / 计数）
// ==========================================

use crate::domain::cut::{
    BoardColumn, BoardEntry, Cut, CutDetail, CutPriorityUpdate, CutSummary, PhaseRecord,
    PhaseUpdate,
};
use crate::domain::pipeline::current_phase;
use crate::domain::types::{Phase, PhaseStatus};
use crate::domain::work_item::{DeadlineItem, PhaseCounts, PhaseRecordRow, WorkItem};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{
    assignee_at, format_date, format_datetime, open_status_list, parse_date, parse_datetime,
    phase_at, placeholders, status_at, ASSIGNEE_JOIN_SQL, ASSIGNEE_NAME_SQL,
};
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result as SqliteResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

// ==========================================
// CutRepository - 卡仓储
// ==========================================
pub struct CutRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CutRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_cut(row: &rusqlite::Row<'_>) -> SqliteResult<Cut> {
        Ok(Cut {
            id: row.get(0)?,
            episode_id: row.get(1)?,
            number: row.get(2)?,
            difficulty: row.get::<_, Option<i32>>(3)?.unwrap_or(3),
            is_priority: row.get::<_, Option<bool>>(4)?.unwrap_or(false),
            priority_reason: row.get(5)?,
            created_at: parse_datetime(row.get(6)?),
        })
    }

    fn insert_phases(conn: &Connection, cut_id: i64) -> RepositoryResult<()> {
        let mut stmt = conn.prepare_cached("INSERT INTO cut_phase (cut_id, phase) VALUES (?1, ?2)")?;
        for phase in Phase::ALL {
            stmt.execute(params![cut_id, phase.to_db_str()])?;
        }
        Ok(())
    }

    // ==========================================
    // 创建
    // ==========================================

    /// 批量创建卡（含全部工程记录）
    ///
    /// 已存在的卡号跳过，不计入返回值
    ///
    /// # 返回
    /// - Ok(usize): 新建卡数
    pub fn insert_batch(
        &self,
        episode_id: i64,
        numbers: &[String],
        difficulty: i32,
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut created = 0usize;
        for number in numbers {
            let inserted = tx.execute(
                r#"
                INSERT INTO cut (episode_id, number, difficulty)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(episode_id, number) DO NOTHING
                "#,
                params![episode_id, number, difficulty],
            )?;
            if inserted == 0 {
                tracing::debug!(episode_id, cut = %number, "cut exists, skipped");
                continue;
            }
            let cut_id = tx.last_insert_rowid();
            Self::insert_phases(&tx, cut_id)?;
            created += 1;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(created)
    }

    /// 创建单个卡；卡号重复时返回 UniqueConstraintViolation
    pub fn insert_one(&self, episode_id: i64, number: &str, difficulty: i32) -> RepositoryResult<i64> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            "INSERT INTO cut (episode_id, number, difficulty) VALUES (?1, ?2, ?3)",
            params![episode_id, number, difficulty],
        )?;
        let cut_id = tx.last_insert_rowid();
        Self::insert_phases(&tx, cut_id)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(cut_id)
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn find_by_number(&self, episode_id: i64, number: &str) -> RepositoryResult<Option<Cut>> {
        let conn = self.get_conn()?;
        let cut = conn
            .query_row(
                r#"
                SELECT id, episode_id, number, difficulty, is_priority, priority_reason, created_at
                FROM cut
                WHERE episode_id = ?1 AND number = ?2
                "#,
                params![episode_id, number],
                Self::map_cut,
            )
            .optional()?;
        Ok(cut)
    }

    /// 卡一览（含当前工程与完了工程数）
    pub fn list_summaries(&self, episode_id: i64) -> RepositoryResult<Vec<CutSummary>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, episode_id, number, difficulty, is_priority, priority_reason, created_at
            FROM cut
            WHERE episode_id = ?1
            ORDER BY number
            "#,
        )?;
        let cuts = stmt
            .query_map(params![episode_id], Self::map_cut)?
            .collect::<SqliteResult<Vec<Cut>>>()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT cp.cut_id, cp.phase, cp.status
            FROM cut_phase cp
            JOIN cut c ON c.id = cp.cut_id
            WHERE c.episode_id = ?1
            "#,
        )?;
        let mut phases_by_cut: HashMap<i64, Vec<(Phase, PhaseStatus)>> = HashMap::new();
        let rows = stmt.query_map(params![episode_id], |row| {
            Ok((row.get::<_, i64>(0)?, phase_at(row, 1)?, status_at(row, 2)?))
        })?;
        for row in rows {
            let (cut_id, phase, status) = row?;
            phases_by_cut.entry(cut_id).or_default().push((phase, status));
        }

        let summaries = cuts
            .into_iter()
            .map(|cut| {
                let phases = phases_by_cut.remove(&cut.id).unwrap_or_default();
                let completed_phases = phases
                    .iter()
                    .filter(|(_, s)| *s == PhaseStatus::Completed)
                    .count() as i64;
                CutSummary {
                    current_phase: current_phase(phases),
                    completed_phases,
                    cut,
                }
            })
            .collect();
        Ok(summaries)
    }

    fn load_phase_records(conn: &Connection, cut_id: i64) -> RepositoryResult<Vec<PhaseRecord>> {
        let sql = format!(
            r#"
            SELECT cp.id, cp.cut_id, cp.phase, cp.status, cp.assignee_type, cp.assignee_id,
                   {name}, cp.deadline, cp.started_at, cp.completed_at
            FROM cut_phase cp
            {join}
            WHERE cp.cut_id = ?1
            "#,
            name = ASSIGNEE_NAME_SQL,
            join = ASSIGNEE_JOIN_SQL,
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut records = stmt
            .query_map(params![cut_id], Self::map_phase_record)?
            .collect::<SqliteResult<Vec<PhaseRecord>>>()?;
        records.sort_by_key(|r| r.phase);
        Ok(records)
    }

    fn map_phase_record(row: &rusqlite::Row<'_>) -> SqliteResult<PhaseRecord> {
        Ok(PhaseRecord {
            id: row.get(0)?,
            cut_id: row.get(1)?,
            phase: phase_at(row, 2)?,
            status: status_at(row, 3)?,
            assignee: assignee_at(row, 4, 5)?,
            assignee_name: row.get(6)?,
            deadline: parse_date(row.get(7)?),
            started_at: parse_datetime(row.get(8)?),
            completed_at: parse_datetime(row.get(9)?),
        })
    }

    /// 卡详情（工程记录按流水线顺序）
    pub fn find_detail(&self, episode_id: i64, number: &str) -> RepositoryResult<Option<CutDetail>> {
        let cut = match self.find_by_number(episode_id, number)? {
            Some(cut) => cut,
            None => return Ok(None),
        };
        let conn = self.get_conn()?;
        let phases = Self::load_phase_records(&conn, cut.id)?;
        Ok(Some(CutDetail { cut, phases }))
    }

    /// 单条工程记录
    pub fn find_phase_record(&self, cut_id: i64, phase: Phase) -> RepositoryResult<Option<PhaseRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT cp.id, cp.cut_id, cp.phase, cp.status, cp.assignee_type, cp.assignee_id,
                   {name}, cp.deadline, cp.started_at, cp.completed_at
            FROM cut_phase cp
            {join}
            WHERE cp.cut_id = ?1 AND cp.phase = ?2
            "#,
            name = ASSIGNEE_NAME_SQL,
            join = ASSIGNEE_JOIN_SQL,
        );
        let record = conn
            .query_row(&sql, params![cut_id, phase.to_db_str()], Self::map_phase_record)
            .optional()?;
        Ok(record)
    }

    /// 工程别看板
    pub fn board(&self, episode_id: i64) -> RepositoryResult<Vec<BoardColumn>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT cp.phase, c.number, cp.status, {name}
            FROM cut_phase cp
            JOIN cut c ON c.id = cp.cut_id
            {join}
            WHERE c.episode_id = ?1
            ORDER BY c.number
            "#,
            name = ASSIGNEE_NAME_SQL,
            join = ASSIGNEE_JOIN_SQL,
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut by_phase: HashMap<Phase, Vec<BoardEntry>> = HashMap::new();
        let rows = stmt.query_map(params![episode_id], |row| {
            Ok((
                phase_at(row, 0)?,
                BoardEntry {
                    cut_number: row.get(1)?,
                    status: status_at(row, 2)?,
                    assignee_name: row.get(3)?,
                },
            ))
        })?;
        for row in rows {
            let (phase, entry) = row?;
            by_phase.entry(phase).or_default().push(entry);
        }

        Ok(Phase::ALL
            .iter()
            .map(|phase| BoardColumn {
                phase: *phase,
                entries: by_phase.remove(phase).unwrap_or_default(),
            })
            .collect())
    }

    // ==========================================
    // 更新
    // ==========================================

    /// 更新工程记录（单事务）
    ///
    /// - status → in_progress 记录 started_at
    /// - status → completed 记录 completed_at
    /// - status → retake 开启リテイク履历；离开 retake 时关闭履历
    ///
    /// # 参数
    /// - `current`: 更新前的记录
    /// - `patch`: 已剔除未变化字段的补丁（非空）
    /// - `now`: 写入时间戳
    pub fn update_phase(
        &self,
        current: &PhaseRecord,
        patch: &PhaseUpdate,
        now: NaiveDateTime,
    ) -> RepositoryResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let now_str = format_datetime(now);
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(status) = patch.status {
            sets.push("status = ?");
            values.push(Value::Text(status.to_db_str().to_string()));
            match status {
                PhaseStatus::InProgress => {
                    sets.push("started_at = ?");
                    values.push(Value::Text(now_str.clone()));
                }
                PhaseStatus::Completed => {
                    sets.push("completed_at = ?");
                    values.push(Value::Text(now_str.clone()));
                }
                _ => {}
            }
        }
        if let Some(assignee) = patch.assignee {
            sets.push("assignee_type = ?");
            values.push(Value::Text(assignee.kind.to_db_str().to_string()));
            sets.push("assignee_id = ?");
            values.push(Value::Integer(assignee.id));
        }
        if let Some(deadline) = patch.deadline {
            sets.push("deadline = ?");
            values.push(Value::Text(format_date(deadline)));
        }
        values.push(Value::Integer(current.id));

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let sql = format!("UPDATE cut_phase SET {} WHERE id = ?", sets.join(", "));
        let changed = tx.execute(&sql, params_from_iter(values.iter()))?;
        if changed == 0 {
            return Err(RepositoryError::not_found("cut_phase", current.id));
        }

        if let Some(status) = patch.status {
            if current.status == PhaseStatus::Retake && status != PhaseStatus::Retake {
                tx.execute(
                    r#"
                    UPDATE retake_history SET resolved_at = ?1
                    WHERE cut_phase_id = ?2 AND resolved_at IS NULL
                    "#,
                    params![now_str, current.id],
                )?;
            }
            if status == PhaseStatus::Retake && current.status != PhaseStatus::Retake {
                tx.execute(
                    r#"
                    INSERT INTO retake_history (retake_id, cut_phase_id, returned_at, reason)
                    VALUES (?1, ?2, ?3, ?4)
                    "#,
                    params![
                        Uuid::new_v4().to_string(),
                        current.id,
                        now_str,
                        patch.retake_reason
                    ],
                )?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// 更新卡的难易度 / 优先标记 / 优先理由
    pub fn update_priority(&self, cut_id: i64, patch: &CutPriorityUpdate) -> RepositoryResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(difficulty) = patch.difficulty {
            sets.push("difficulty = ?");
            values.push(Value::Integer(difficulty as i64));
        }
        if let Some(flag) = patch.is_priority {
            sets.push("is_priority = ?");
            values.push(Value::Integer(flag as i64));
        }
        if let Some(reason) = &patch.priority_reason {
            sets.push("priority_reason = ?");
            values.push(Value::Text(reason.clone()));
        }
        values.push(Value::Integer(cut_id));

        let conn = self.get_conn()?;
        let sql = format!("UPDATE cut SET {} WHERE id = ?", sets.join(", "));
        let changed = conn.execute(&sql, params_from_iter(values.iter()))?;
        if changed == 0 {
            return Err(RepositoryError::not_found("cut", cut_id));
        }
        Ok(())
    }

    // ==========================================
    // 引擎查询接口
    // ==========================================

    /// 开放状态的工程作业（顺序不保证）
    ///
    /// # 参数
    /// - `phases`: 工程过滤；None 表示全工程
    pub fn list_open_phase_records(
        &self,
        episode_id: i64,
        phases: Option<&[Phase]>,
    ) -> RepositoryResult<Vec<WorkItem>> {
        let conn = self.get_conn()?;
        let mut values: Vec<Value> = vec![Value::Integer(episode_id)];
        let phase_filter = match phases {
            Some(phases) => {
                values.extend(phases.iter().map(|p| Value::Text(p.to_db_str().to_string())));
                format!("AND cp.phase IN ({})", placeholders(2, phases.len()))
            }
            None => String::new(),
        };
        let sql = format!(
            r#"
            SELECT c.number, c.difficulty, c.is_priority, c.priority_reason,
                   cp.phase, cp.status, cp.deadline, {name}
            FROM cut c
            JOIN cut_phase cp ON cp.cut_id = c.id
            {join}
            WHERE c.episode_id = ?1
              {phase_filter}
              AND cp.status IN ({open})
            "#,
            name = ASSIGNEE_NAME_SQL,
            join = ASSIGNEE_JOIN_SQL,
            phase_filter = phase_filter,
            open = open_status_list(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                Ok(WorkItem {
                    cut_number: row.get(0)?,
                    difficulty: row.get::<_, Option<i32>>(1)?.unwrap_or(3),
                    is_priority: row.get::<_, Option<bool>>(2)?.unwrap_or(false),
                    priority_reason: row.get(3)?,
                    phase: phase_at(row, 4)?,
                    status: status_at(row, 5)?,
                    deadline: parse_date(row.get(6)?),
                    assignee_name: row.get(7)?,
                })
            })?
            .collect::<SqliteResult<Vec<WorkItem>>>()?;
        Ok(items)
    }

    /// 某工程的全部工程记录（按卡号）
    ///
    /// # 参数
    /// - `exclude_completed`: true 时只返回未完了记录
    pub fn list_phase_records(
        &self,
        episode_id: i64,
        phase: Phase,
        exclude_completed: bool,
    ) -> RepositoryResult<Vec<PhaseRecordRow>> {
        let conn = self.get_conn()?;
        let status_filter = if exclude_completed {
            "AND cp.status != 'completed'"
        } else {
            ""
        };
        let sql = format!(
            r#"
            SELECT c.number, cp.phase, cp.status, cp.deadline
            FROM cut_phase cp
            JOIN cut c ON c.id = cp.cut_id
            WHERE c.episode_id = ?1 AND cp.phase = ?2
            {}
            ORDER BY c.number
            "#,
            status_filter
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![episode_id, phase.to_db_str()], |row| {
                Ok(PhaseRecordRow {
                    cut_number: row.get(0)?,
                    phase: phase_at(row, 1)?,
                    status: status_at(row, 2)?,
                    deadline: parse_date(row.get(3)?),
                })
            })?
            .collect::<SqliteResult<Vec<PhaseRecordRow>>>()?;
        Ok(rows)
    }

    /// 工程别计数
    pub fn count_phase_records(&self, episode_id: i64, phase: Phase) -> RepositoryResult<PhaseCounts> {
        let conn = self.get_conn()?;
        let counts = conn.query_row(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN cp.status = 'completed' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN cp.status = 'delayed' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN cp.status = 'retake' THEN 1 ELSE 0 END), 0)
            FROM cut_phase cp
            JOIN cut c ON c.id = cp.cut_id
            WHERE c.episode_id = ?1 AND cp.phase = ?2
            "#,
            params![episode_id, phase.to_db_str()],
            |row| {
                Ok(PhaseCounts {
                    total: row.get(0)?,
                    completed: row.get(1)?,
                    delayed: row.get(2)?,
                    retake: row.get(3)?,
                })
            },
        )?;
        Ok(counts)
    }

    /// 作品内未分配的开放作业数
    pub fn count_unassigned_open_work(&self, project_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT COUNT(*)
            FROM cut_phase cp
            JOIN cut c ON c.id = cp.cut_id
            JOIN episode e ON e.id = c.episode_id
            WHERE e.project_id = ?1
              AND cp.assignee_id IS NULL
              AND cp.status IN ({})
            "#,
            open_status_list()
        );
        let count = conn.query_row(&sql, params![project_id], |row| row.get(0))?;
        Ok(count)
    }

    /// 作品内遅延作业数
    pub fn count_delayed_work(&self, project_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM cut_phase cp
            JOIN cut c ON c.id = cp.cut_id
            JOIN episode e ON e.id = c.episode_id
            WHERE e.project_id = ?1 AND cp.status = 'delayed'
            "#,
            params![project_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 作品内带截止日的开放作业
    pub fn list_open_with_deadline(&self, project_id: i64) -> RepositoryResult<Vec<DeadlineItem>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT e.number, c.number, cp.phase, cp.status, cp.deadline, {name}
            FROM cut_phase cp
            JOIN cut c ON c.id = cp.cut_id
            JOIN episode e ON e.id = c.episode_id
            {join}
            WHERE e.project_id = ?1
              AND cp.deadline IS NOT NULL
              AND cp.status IN ({open})
            ORDER BY cp.deadline, e.number, c.number
            "#,
            name = ASSIGNEE_NAME_SQL,
            join = ASSIGNEE_JOIN_SQL,
            open = open_status_list(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![project_id], |row| {
                Ok((
                    row.get::<_, i32>(0)?,
                    row.get::<_, String>(1)?,
                    phase_at(row, 2)?,
                    status_at(row, 3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        // 无法解析的截止日跳过
        Ok(rows
            .into_iter()
            .filter_map(|(episode_number, cut_number, phase, status, deadline, assignee_name)| {
                parse_date(deadline).map(|deadline| DeadlineItem {
                    episode_number,
                    cut_number,
                    phase,
                    status,
                    deadline,
                    assignee_name,
                })
            })
            .collect())
    }
}
