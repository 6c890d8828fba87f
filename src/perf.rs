// ==========================================
// 制作進行管理 - 性能统计
// ==========================================
// SQL 计数 + 慢查询日志 + 操作耗时
// 开关:
// - Debug 默认开启；Release 默认关闭
// - SEISHIN_PERF_SQL=1 强制开启
// - SEISHIN_SLOW_SQL_MS=50 慢 SQL 阈值（毫秒）
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

const ENV_PERF_SQL: &str = "SEISHIN_PERF_SQL";
const ENV_SLOW_SQL_MS: &str = "SEISHIN_SLOW_SQL_MS";

static PERF_SQL_ENABLED: AtomicBool = AtomicBool::new(false);
static SLOW_SQL_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static SCOPE_DEPTH: Cell<u32> = const { Cell::new(0) };
    static COUNTERS: Cell<SqlCounters> = const { Cell::new(SqlCounters { statements: 0, slow: 0 }) };
}

/// 线程内 SQL 计数快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlCounters {
    pub statements: u64,
    pub slow: u64,
}

impl SqlCounters {
    fn since(self, earlier: SqlCounters) -> SqlCounters {
        SqlCounters {
            statements: self.statements.saturating_sub(earlier.statements),
            slow: self.slow.saturating_sub(earlier.slow),
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|v| {
        matches!(
            v.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn one_line(sql: &str, max_len: usize) -> String {
    let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}…", &flat[..cut]),
        None => flat,
    }
}

fn in_scope() -> bool {
    SCOPE_DEPTH.with(|d| d.get() > 0)
}

fn bump(f: impl FnOnce(&mut SqlCounters)) {
    COUNTERS.with(|c| {
        let mut v = c.get();
        f(&mut v);
        c.set(v);
    });
}

/// 安装 SQLite 语句 trace/profile
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let enabled = env_flag(ENV_PERF_SQL).unwrap_or(cfg!(debug_assertions));
    PERF_SQL_ENABLED.store(enabled, Ordering::Relaxed);

    if !enabled {
        conn.trace(None);
        conn.profile(None);
        return;
    }

    let slow_ms = std::env::var(ENV_SLOW_SQL_MS)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 });
    SLOW_SQL_THRESHOLD_MS.store(slow_ms, Ordering::Relaxed);

    conn.trace(Some(on_sql_trace));
    conn.profile(Some(on_sql_profile));
}

fn on_sql_trace(_sql: &str) {
    if PERF_SQL_ENABLED.load(Ordering::Relaxed) && in_scope() {
        bump(|c| c.statements = c.statements.saturating_add(1));
    }
}

fn on_sql_profile(sql: &str, duration: Duration) {
    if !PERF_SQL_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let ms = duration.as_millis() as u64;
    let threshold = SLOW_SQL_THRESHOLD_MS.load(Ordering::Relaxed);
    if threshold == 0 || ms < threshold {
        return;
    }
    tracing::warn!(
        target: "slow_sql",
        duration_ms = ms,
        sql = %one_line(sql, 300),
        "slow sql"
    );
    if in_scope() {
        bump(|c| c.slow = c.slow.saturating_add(1));
    }
}

/// 操作级性能 Guard：drop 时记录 elapsed_ms / sql_count / slow_sql_count
///
/// ```ignore
/// let _perf = seishin::perf::PerfGuard::new("pipeline.rank_priority");
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    baseline: SqlCounters,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        SCOPE_DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        Self {
            op,
            start: Instant::now(),
            baseline: COUNTERS.with(|c| c.get()),
        }
    }

    /// 截至目前本 Guard 内的 SQL 计数
    pub fn sql_counters(&self) -> SqlCounters {
        COUNTERS.with(|c| c.get()).since(self.baseline)
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let delta = self.sql_counters();
        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms = self.start.elapsed().as_millis() as u64,
            sql_count = delta.statements,
            slow_sql_count = delta.slow,
            "done"
        );
        SCOPE_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_line_flattens_and_truncates() {
        assert_eq!(one_line("SELECT *\n  FROM cut", 100), "SELECT * FROM cut");
        assert_eq!(one_line("SELECT * FROM cut", 6), "SELECT…");
    }

    #[test]
    fn test_counters_since() {
        let a = SqlCounters { statements: 10, slow: 1 };
        let b = SqlCounters { statements: 4, slow: 1 };
        assert_eq!(a.since(b), SqlCounters { statements: 6, slow: 0 });
    }
}
