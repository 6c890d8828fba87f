// ==========================================
// 制作進行管理 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod cut_repo;
pub mod error;
pub mod order_repo;
pub mod project_repo;
pub mod retake_repo;
pub mod roster_repo;
pub mod sql_utils;

// 重导出核心仓储
pub use cut_repo::CutRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use order_repo::OrderRepository;
pub use project_repo::{EpisodeRepository, ProjectRepository};
pub use retake_repo::RetakeRepository;
pub use roster_repo::{CompanyRepository, CreatorRepository};
