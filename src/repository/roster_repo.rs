// ==========================================
// 制作進行管理 - 人员 / 外注会社 数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（评分范围由 API 层校验）
// ==========================================

use crate::domain::roster::{Company, Creator, CreatorUpdate, NewCompany, NewCreator};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::parse_datetime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex, MutexGuard};

const CREATOR_COLUMNS: &str = r#"
    id, name, category, skills, speed_rating, quality_rating,
    pulls_deadline, daily_capacity, price_per_cut, notes, created_at
"#;

const COMPANY_COLUMNS: &str = r#"
    id, name, capabilities, capacity_per_day, num_staff, quality_rating,
    contact, notes, created_at
"#;

// ==========================================
// CreatorRepository - 创作者仓储
// ==========================================
pub struct CreatorRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CreatorRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &rusqlite::Row<'_>) -> SqliteResult<Creator> {
        Ok(Creator {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
            skills: row.get(3)?,
            speed_rating: row.get::<_, Option<i32>>(4)?.unwrap_or(3),
            quality_rating: row.get::<_, Option<i32>>(5)?.unwrap_or(3),
            pulls_deadline: row.get::<_, Option<bool>>(6)?.unwrap_or(false),
            daily_capacity: row.get::<_, Option<i32>>(7)?.unwrap_or(0),
            price_per_cut: row.get::<_, Option<i64>>(8)?.unwrap_or(0),
            notes: row.get(9)?,
            created_at: parse_datetime(row.get(10)?),
        })
    }

    pub fn insert(&self, creator: &NewCreator) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO creator (name, category, skills, speed_rating, quality_rating, price_per_cut)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                creator.name,
                creator.category,
                creator.skills,
                creator.speed_rating,
                creator.quality_rating,
                creator.price_per_cut,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 创作者一览
    ///
    /// # 参数
    /// - `skill`: 技能部分匹配过滤（None 不过滤）
    pub fn list(&self, skill: Option<&str>) -> RepositoryResult<Vec<Creator>> {
        let conn = self.get_conn()?;
        let rows = match skill {
            Some(skill) => {
                let sql = format!(
                    "SELECT {} FROM creator WHERE skills LIKE ?1 ORDER BY name, id",
                    CREATOR_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![format!("%{}%", skill)], Self::map_row)?
                    .collect::<SqliteResult<Vec<Creator>>>()?;
                rows
            }
            None => {
                let sql = format!("SELECT {} FROM creator ORDER BY name, id", CREATOR_COLUMNS);
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], Self::map_row)?
                    .collect::<SqliteResult<Vec<Creator>>>()?;
                rows
            }
        };
        Ok(rows)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Creator>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM creator WHERE id = ?1", CREATOR_COLUMNS);
        let creator = conn.query_row(&sql, params![id], Self::map_row).optional()?;
        Ok(creator)
    }

    /// 按名字部分匹配,取 id 最小的一人
    pub fn find_by_name_partial(&self, name: &str) -> RepositoryResult<Option<Creator>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM creator WHERE name LIKE ?1 ORDER BY id LIMIT 1",
            CREATOR_COLUMNS
        );
        let creator = conn
            .query_row(&sql, params![format!("%{}%", name)], Self::map_row)
            .optional()?;
        Ok(creator)
    }

    /// 按补丁更新（只写给出的字段）
    pub fn update(&self, id: i64, patch: &CreatorUpdate) -> RepositoryResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(v) = patch.speed_rating {
            sets.push("speed_rating = ?");
            values.push(Value::Integer(v as i64));
        }
        if let Some(v) = patch.quality_rating {
            sets.push("quality_rating = ?");
            values.push(Value::Integer(v as i64));
        }
        if let Some(v) = patch.price_per_cut {
            sets.push("price_per_cut = ?");
            values.push(Value::Integer(v));
        }
        if let Some(v) = &patch.skills {
            sets.push("skills = ?");
            values.push(Value::Text(v.clone()));
        }
        if let Some(v) = patch.daily_capacity {
            sets.push("daily_capacity = ?");
            values.push(Value::Integer(v as i64));
        }
        if let Some(v) = patch.pulls_deadline {
            sets.push("pulls_deadline = ?");
            values.push(Value::Integer(v as i64));
        }
        if let Some(v) = &patch.notes {
            sets.push("notes = ?");
            values.push(Value::Text(v.clone()));
        }
        values.push(Value::Integer(id));

        let conn = self.get_conn()?;
        let sql = format!("UPDATE creator SET {} WHERE id = ?", sets.join(", "));
        let changed = conn.execute(&sql, params_from_iter(values.iter()))?;
        if changed == 0 {
            return Err(RepositoryError::not_found("creator", id));
        }
        Ok(())
    }
}

// ==========================================
// CompanyRepository - 外注会社仓储
// ==========================================
pub struct CompanyRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CompanyRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &rusqlite::Row<'_>) -> SqliteResult<Company> {
        Ok(Company {
            id: row.get(0)?,
            name: row.get(1)?,
            capabilities: row.get(2)?,
            capacity_per_day: row.get::<_, Option<i32>>(3)?.unwrap_or(0),
            num_staff: row.get::<_, Option<i32>>(4)?.unwrap_or(0),
            quality_rating: row.get::<_, Option<i32>>(5)?.unwrap_or(3),
            contact: row.get(6)?,
            notes: row.get(7)?,
            created_at: parse_datetime(row.get(8)?),
        })
    }

    /// 新建会社；同名会社已存在时返回 UniqueConstraintViolation
    pub fn insert(&self, company: &NewCompany) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO company (name, capabilities, capacity_per_day, num_staff, quality_rating)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                company.name,
                company.capabilities,
                company.capacity_per_day,
                company.num_staff,
                company.quality_rating,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list(&self) -> RepositoryResult<Vec<Company>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM company ORDER BY name, id", COMPANY_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<Company>>>()?;
        Ok(rows)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Company>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM company WHERE id = ?1", COMPANY_COLUMNS);
        let company = conn.query_row(&sql, params![id], Self::map_row).optional()?;
        Ok(company)
    }

    pub fn find_by_name_partial(&self, name: &str) -> RepositoryResult<Option<Company>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM company WHERE name LIKE ?1 ORDER BY id LIMIT 1",
            COMPANY_COLUMNS
        );
        let company = conn
            .query_row(&sql, params![format!("%{}%", name)], Self::map_row)
            .optional()?;
        Ok(company)
    }
}
