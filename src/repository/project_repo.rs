// ==========================================
// 制作進行管理 - 作品 / 话数 数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::project::{Episode, NewEpisode, NewProject, Project};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::parse_datetime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ProjectRepository - 作品仓储
// ==========================================
pub struct ProjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProjectRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &rusqlite::Row<'_>) -> SqliteResult<Project> {
        Ok(Project {
            id: row.get(0)?,
            name: row.get(1)?,
            short_name: row.get(2)?,
            total_episodes: row.get::<_, Option<i32>>(3)?.unwrap_or(12),
            created_at: parse_datetime(row.get(4)?),
        })
    }

    /// 新建作品，返回 id
    pub fn insert(&self, project: &NewProject) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO project (name, short_name, total_episodes) VALUES (?1, ?2, ?3)",
            params![project.name, project.short_name, project.total_episodes],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list(&self) -> RepositoryResult<Vec<Project>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, short_name, total_episodes, created_at FROM project ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<Project>>>()?;
        Ok(rows)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Project>> {
        let conn = self.get_conn()?;
        let project = conn
            .query_row(
                "SELECT id, name, short_name, total_episodes, created_at FROM project WHERE id = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(project)
    }

    /// 按作品名精确查询
    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Project>> {
        let conn = self.get_conn()?;
        let project = conn
            .query_row(
                "SELECT id, name, short_name, total_episodes, created_at FROM project WHERE name = ?1",
                params![name],
                Self::map_row,
            )
            .optional()?;
        Ok(project)
    }
}

// ==========================================
// EpisodeRepository - 话数仓储
// ==========================================
pub struct EpisodeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EpisodeRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &rusqlite::Row<'_>) -> SqliteResult<Episode> {
        Ok(Episode {
            id: row.get(0)?,
            project_id: row.get(1)?,
            number: row.get(2)?,
            title: row.get(3)?,
            air_date: row.get(4)?,
            v_edit_date: row.get(5)?,
            created_at: parse_datetime(row.get(6)?),
        })
    }

    pub fn insert(&self, project_id: i64, episode: &NewEpisode) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO episode (project_id, number, title, air_date, v_edit_date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                project_id,
                episode.number,
                episode.title,
                episode.air_date,
                episode.v_edit_date,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_by_project(&self, project_id: i64) -> RepositoryResult<Vec<Episode>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, project_id, number, title, air_date, v_edit_date, created_at
            FROM episode
            WHERE project_id = ?1
            ORDER BY number
            "#,
        )?;
        let rows = stmt
            .query_map(params![project_id], Self::map_row)?
            .collect::<SqliteResult<Vec<Episode>>>()?;
        Ok(rows)
    }

    /// 按 (作品, 话数) 查询
    pub fn find_by_number(&self, project_id: i64, number: i32) -> RepositoryResult<Option<Episode>> {
        let conn = self.get_conn()?;
        let episode = conn
            .query_row(
                r#"
                SELECT id, project_id, number, title, air_date, v_edit_date, created_at
                FROM episode
                WHERE project_id = ?1 AND number = ?2
                "#,
                params![project_id, number],
                Self::map_row,
            )
            .optional()?;
        Ok(episode)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Episode>> {
        let conn = self.get_conn()?;
        let episode = conn
            .query_row(
                r#"
                SELECT id, project_id, number, title, air_date, v_edit_date, created_at
                FROM episode
                WHERE id = ?1
                "#,
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(episode)
    }

    /// 话数内卡数
    pub fn count_cuts(&self, episode_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM cut WHERE episode_id = ?1",
            params![episode_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
