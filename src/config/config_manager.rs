// ==========================================
// 制作進行管理 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value, scope_id = 'global')
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }
        Ok(Self { conn })
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
            ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        tracing::debug!(key, value, "config updated");
        Ok(())
    }

    fn get_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get(key)?.unwrap_or_else(|| default.to_string()))
    }

    fn get_i64_or(&self, key: &str, default: i64) -> Result<i64, Box<dyn Error>> {
        match self.get(key)? {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(key, value = %raw, "config value is not an integer, using default");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    // ===== 当前作品 =====

    /// 当前作品 id（未设置返回 None）
    pub fn active_project_id(&self) -> Result<Option<i64>, Box<dyn Error>> {
        Ok(self
            .get(config_keys::ACTIVE_PROJECT_ID)?
            .and_then(|raw| raw.trim().parse::<i64>().ok()))
    }

    pub fn active_project_name(&self) -> Result<Option<String>, Box<dyn Error>> {
        self.get(config_keys::ACTIVE_PROJECT_NAME)
    }

    /// 切换当前作品
    pub fn set_active_project(&self, id: i64, name: &str) -> Result<(), Box<dyn Error>> {
        self.set(config_keys::ACTIVE_PROJECT_ID, &id.to_string())?;
        self.set(config_keys::ACTIVE_PROJECT_NAME, name)?;
        Ok(())
    }

    // ===== 默认值 =====

    /// 新建卡的默认难易度
    pub fn default_difficulty(&self) -> Result<i32, Box<dyn Error>> {
        let v = self.get_i64_or(config_keys::DEFAULT_DIFFICULTY, 3)?;
        Ok(v.clamp(1, 5) as i32)
    }

    /// 发注书的默认卡单价
    pub fn default_price_per_cut(&self) -> Result<i64, Box<dyn Error>> {
        let v = self.get_i64_or(config_keys::DEFAULT_PRICE_PER_CUT, 0)?;
        Ok(v.max(0))
    }

    /// "即将到期" 的天数阈值
    pub fn deadline_soon_days(&self) -> Result<i64, Box<dyn Error>> {
        let v = self.get_i64_or(config_keys::DEADLINE_SOON_DAYS, 3)?;
        Ok(v.max(0))
    }

    pub fn locale(&self) -> Result<String, Box<dyn Error>> {
        self.get_or_default(config_keys::LOCALE, crate::i18n::DEFAULT_LOCALE)
    }

    /// 全部配置快照（JSON）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 当前作品
    pub const ACTIVE_PROJECT_ID: &str = "active_project_id";
    pub const ACTIVE_PROJECT_NAME: &str = "active_project_name";

    // 默认值
    pub const DEFAULT_DIFFICULTY: &str = "default_difficulty";
    pub const DEFAULT_PRICE_PER_CUT: &str = "default_price_per_cut";
    pub const DEADLINE_SOON_DAYS: &str = "deadline_soon_days";

    // 显示
    pub const LOCALE: &str = "locale";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_unset() {
        let cfg = manager();
        assert_eq!(cfg.active_project_id().unwrap(), None);
        assert_eq!(cfg.default_difficulty().unwrap(), 3);
        assert_eq!(cfg.default_price_per_cut().unwrap(), 0);
        assert_eq!(cfg.deadline_soon_days().unwrap(), 3);
        assert_eq!(cfg.locale().unwrap(), "ja");
    }

    #[test]
    fn test_set_overwrites() {
        let cfg = manager();
        cfg.set_active_project(4, "星屑").unwrap();
        cfg.set_active_project(5, "月影").unwrap();
        assert_eq!(cfg.active_project_id().unwrap(), Some(5));
        assert_eq!(cfg.active_project_name().unwrap().as_deref(), Some("月影"));
    }

    #[test]
    fn test_bad_integer_falls_back() {
        let cfg = manager();
        cfg.set(config_keys::DEFAULT_DIFFICULTY, "hard").unwrap();
        assert_eq!(cfg.default_difficulty().unwrap(), 3);
        cfg.set(config_keys::DEFAULT_DIFFICULTY, "9").unwrap();
        assert_eq!(cfg.default_difficulty().unwrap(), 5);
    }

    #[test]
    fn test_snapshot_is_json_object() {
        let cfg = manager();
        cfg.set(config_keys::LOCALE, "en").unwrap();
        let snapshot: serde_json::Value =
            serde_json::from_str(&cfg.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(snapshot["locale"], "en");
    }
}
