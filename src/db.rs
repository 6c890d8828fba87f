// ==========================================
// 制作進行管理 - SQLite 连接初始化 / 建库
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 建表幂等,记录 schema_version
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 2;

/// 建表 SQL
///
/// 说明：
/// - cut_phase 每个 (cut_id, phase) 唯一,由 CutRepository 在创建卡时一次性写入十条
/// - assignee_type 为空表示未分配
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_scope (
    scope_id TEXT PRIMARY KEY,
    scope_type TEXT NOT NULL,
    scope_key TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(scope_type, scope_key)
);

INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
VALUES ('global', 'GLOBAL', 'global');

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS project (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    short_name TEXT,
    total_episodes INTEGER DEFAULT 12,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS episode (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL REFERENCES project(id),
    number INTEGER NOT NULL,
    title TEXT,
    air_date TEXT,
    v_edit_date TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    UNIQUE(project_id, number)
);

CREATE TABLE IF NOT EXISTS cut (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    episode_id INTEGER NOT NULL REFERENCES episode(id),
    number TEXT NOT NULL,
    difficulty INTEGER DEFAULT 3 CHECK(difficulty BETWEEN 1 AND 5),
    is_priority INTEGER NOT NULL DEFAULT 0,
    priority_reason TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    UNIQUE(episode_id, number)
);

CREATE TABLE IF NOT EXISTS creator (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    category TEXT,
    skills TEXT,
    speed_rating INTEGER DEFAULT 3 CHECK(speed_rating BETWEEN 1 AND 5),
    quality_rating INTEGER DEFAULT 3 CHECK(quality_rating BETWEEN 1 AND 5),
    pulls_deadline INTEGER NOT NULL DEFAULT 0,
    daily_capacity INTEGER DEFAULT 0,
    price_per_cut INTEGER DEFAULT 0,
    notes TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS company (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    capabilities TEXT,
    capacity_per_day INTEGER DEFAULT 0,
    num_staff INTEGER DEFAULT 0,
    quality_rating INTEGER DEFAULT 3 CHECK(quality_rating BETWEEN 1 AND 5),
    contact TEXT,
    notes TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS cut_phase (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cut_id INTEGER NOT NULL REFERENCES cut(id),
    phase TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK(status IN ('pending', 'in_progress', 'completed', 'retake', 'delayed')),
    assignee_type TEXT CHECK(assignee_type IN ('creator', 'company')),
    assignee_id INTEGER,
    deadline TEXT,
    started_at TEXT,
    completed_at TEXT,
    UNIQUE(cut_id, phase)
);

CREATE INDEX IF NOT EXISTS idx_cut_phase_phase_status ON cut_phase(phase, status);

CREATE TABLE IF NOT EXISTS "order" (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    episode_id INTEGER NOT NULL REFERENCES episode(id),
    phase TEXT NOT NULL,
    cut_numbers TEXT NOT NULL,
    assignee_type TEXT NOT NULL CHECK(assignee_type IN ('creator', 'company')),
    assignee_id INTEGER NOT NULL,
    price_per_cut INTEGER DEFAULT 0,
    total_price INTEGER DEFAULT 0,
    deadline TEXT,
    status TEXT DEFAULT 'draft' CHECK(status IN ('draft', 'issued', 'accepted', 'completed')),
    issued_at TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS retake_history (
    retake_id TEXT PRIMARY KEY,
    cut_phase_id INTEGER NOT NULL REFERENCES cut_phase(id),
    returned_at TEXT NOT NULL,
    reason TEXT,
    resolved_at TEXT
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let mut conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    crate::perf::install_sqlite_tracing(&mut conn);
    Ok(conn)
}

/// 建表（幂等）并记录 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    tracing::debug!(version = CURRENT_SCHEMA_VERSION, "schema initialized");
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
