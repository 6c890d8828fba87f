// ==========================================
// 制作進行管理 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 约束: 所有仓储共享同一个连接
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{CutApi, OrderApi, PipelineApi, ProjectApi, RosterApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::{
    CompanyRepository, CreatorRepository, CutRepository, EpisodeRepository, OrderRepository,
    ProjectRepository, RetakeRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径（内存库为 ":memory:"）
    pub db_path: String,

    pub project_api: Arc<ProjectApi>,
    pub cut_api: Arc<CutApi>,
    pub roster_api: Arc<RosterApi>,
    pub order_api: Arc<OrderApi>,
    pub pipeline_api: Arc<PipelineApi>,

    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 打开数据库、建表并组装全部 API
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        let mut state = Self::from_connection(conn)?;
        state.db_path = db_path;
        Ok(state)
    }

    /// 由已打开的连接组装（测试使用内存库）
    pub fn from_connection(conn: Connection) -> Result<Self, String> {
        init_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let project_repo = Arc::new(ProjectRepository::from_connection(conn.clone()));
        let episode_repo = Arc::new(EpisodeRepository::from_connection(conn.clone()));
        let cut_repo = Arc::new(CutRepository::from_connection(conn.clone()));
        let retake_repo = Arc::new(RetakeRepository::from_connection(conn.clone()));
        let creator_repo = Arc::new(CreatorRepository::from_connection(conn.clone()));
        let company_repo = Arc::new(CompanyRepository::from_connection(conn.clone()));
        let order_repo = Arc::new(OrderRepository::from_connection(conn.clone()));

        // 配置管理器
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let roster_api = Arc::new(RosterApi::new(creator_repo, company_repo));
        let project_api = Arc::new(ProjectApi::new(
            project_repo.clone(),
            episode_repo.clone(),
            cut_repo.clone(),
            config_manager.clone(),
        ));
        let cut_api = Arc::new(CutApi::new(
            episode_repo.clone(),
            cut_repo.clone(),
            retake_repo,
            roster_api.clone(),
            config_manager.clone(),
        ));
        let order_api = Arc::new(OrderApi::new(
            episode_repo.clone(),
            order_repo,
            roster_api.clone(),
            config_manager.clone(),
        ));
        let pipeline_api = Arc::new(PipelineApi::new(
            project_repo,
            episode_repo,
            cut_repo,
            config_manager.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path: ":memory:".to_string(),
            project_api,
            cut_api,
            roster_api,
            order_api,
            pipeline_api,
            config_manager,
        })
    }
}

/// 默认数据库路径
///
/// 1) 环境变量 SEISHIN_DB_PATH
/// 2) ~/.seishin/seishin.db（目录不存在则创建）
/// 3) 取不到 home 目录时回退到 ./seishin.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("SEISHIN_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./seishin.db");
    if let Some(home) = dirs::home_dir() {
        let dir = home.join(".seishin");
        if let Err(e) = std::fs::create_dir_all(&dir) {
            tracing::warn!("无法创建数据目录 {}: {}", dir.display(), e);
        } else {
            path = dir.join("seishin.db");
        }
    }
    path.to_string_lossy().to_string()
}
