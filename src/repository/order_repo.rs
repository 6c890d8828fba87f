// ==========================================
// 制作進行管理 - 发注书 数据仓储
// ==========================================
// 红线: 状态迁移合法性由 API 层判断,此处只写入
// ==========================================

use crate::domain::order::{NewOrder, Order};
use crate::domain::types::{AssigneeKind, OrderStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{format_date, format_datetime, parse_date, parse_datetime, phase_at};
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex, MutexGuard};

const ORDER_COLUMNS: &str = r#"
    id, episode_id, phase, cut_numbers, assignee_type, assignee_id,
    price_per_cut, total_price, deadline, status, issued_at, created_at
"#;

pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &rusqlite::Row<'_>) -> SqliteResult<Order> {
        let kind_raw: String = row.get(4)?;
        let assignee_kind = AssigneeKind::parse(&kind_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                Type::Text,
                format!("未知担当类型: {}", kind_raw).into(),
            )
        })?;
        let status_raw: Option<String> = row.get(9)?;
        let status = match status_raw {
            Some(raw) => OrderStatus::parse(&raw).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    9,
                    Type::Text,
                    format!("未知发注状态: {}", raw).into(),
                )
            })?,
            None => OrderStatus::Draft,
        };
        let cut_numbers: String = row.get(3)?;

        Ok(Order {
            id: row.get(0)?,
            episode_id: row.get(1)?,
            phase: phase_at(row, 2)?,
            cut_numbers: split_cut_numbers(&cut_numbers),
            assignee_kind,
            assignee_id: row.get(5)?,
            price_per_cut: row.get::<_, Option<i64>>(6)?.unwrap_or(0),
            total_price: row.get::<_, Option<i64>>(7)?.unwrap_or(0),
            deadline: parse_date(row.get(8)?),
            status,
            issued_at: parse_datetime(row.get(10)?),
            created_at: parse_datetime(row.get(11)?),
        })
    }

    /// 新建发注书（status = draft）
    pub fn insert(&self, order: &NewOrder) -> RepositoryResult<i64> {
        let total_price = order
            .total_price()
            .ok_or_else(|| RepositoryError::field_value("total_price", "合计金额溢出"))?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO "order" (
                episode_id, phase, cut_numbers, assignee_type, assignee_id,
                price_per_cut, total_price, deadline, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'draft')
            "#,
            params![
                order.episode_id,
                order.phase.to_db_str(),
                order.cut_numbers.join(","),
                order.assignee_kind.to_db_str(),
                order.assignee_id,
                order.price_per_cut,
                total_price,
                order.deadline.map(format_date),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 发注书一览（新→旧）
    pub fn list(&self, episode_id: Option<i64>) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let rows = match episode_id {
            Some(episode_id) => {
                let sql = format!(
                    r#"SELECT {} FROM "order" WHERE episode_id = ?1 ORDER BY id DESC"#,
                    ORDER_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![episode_id], Self::map_row)?
                    .collect::<SqliteResult<Vec<Order>>>()?;
                rows
            }
            None => {
                let sql = format!(r#"SELECT {} FROM "order" ORDER BY id DESC"#, ORDER_COLUMNS);
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], Self::map_row)?
                    .collect::<SqliteResult<Vec<Order>>>()?;
                rows
            }
        };
        Ok(rows)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;
        let sql = format!(r#"SELECT {} FROM "order" WHERE id = ?1"#, ORDER_COLUMNS);
        let order = conn.query_row(&sql, params![id], Self::map_row).optional()?;
        Ok(order)
    }

    /// 写入新状态；迁移到 issued 时记录 issued_at
    pub fn update_status(
        &self,
        id: i64,
        status: OrderStatus,
        now: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = if status == OrderStatus::Issued {
            conn.execute(
                r#"UPDATE "order" SET status = ?1, issued_at = ?2 WHERE id = ?3"#,
                params![status.to_db_str(), format_datetime(now), id],
            )?
        } else {
            conn.execute(
                r#"UPDATE "order" SET status = ?1 WHERE id = ?2"#,
                params![status.to_db_str(), id],
            )?
        };
        if changed == 0 {
            return Err(RepositoryError::not_found("order", id));
        }
        Ok(())
    }
}

fn split_cut_numbers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_cut_numbers_skips_blanks() {
        assert_eq!(
            split_cut_numbers("C001, C002,,C003"),
            vec!["C001", "C002", "C003"]
        );
        assert!(split_cut_numbers("").is_empty());
    }

    #[test]
    fn test_insert_rejects_overflowing_total() {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        let repo = OrderRepository::from_connection(Arc::new(Mutex::new(conn)));

        let order = NewOrder {
            episode_id: 1,
            phase: crate::domain::types::Phase::KeyRaw,
            cut_numbers: vec!["C001".to_string(), "C002".to_string()],
            assignee_kind: AssigneeKind::Creator,
            assignee_id: 1,
            price_per_cut: i64::MAX,
            deadline: None,
        };
        let err = repo.insert(&order).unwrap_err();
        assert!(
            matches!(err, RepositoryError::FieldValueError { ref field, .. } if field == "total_price"),
            "{:?}",
            err
        );
        assert!(repo.list(None).unwrap().is_empty());
    }
}
