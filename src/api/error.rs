// ==========================================
// 制作進行管理 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为调用方可读的错误
// 约束: NotFound 必须指明是哪一个实体
// ==========================================

use crate::domain::cut_range::CutRangeError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("{entity}未找到: {key}")]
    NotFound { entity: String, key: String },

    #[error("卡号范围无效: {0}")]
    InvalidRange(#[from] CutRangeError),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("约束违反: {0}")]
    ConstraintViolation(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(entity: &str, key: impl ToString) -> Self {
        ApiError::NotFound {
            entity: entity.to_string(),
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => ApiError::NotFound { entity, key: id },
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseError(format!("事务失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::ConstraintViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::ConstraintViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_keeps_entity() {
        let err: ApiError = RepositoryError::not_found("episode", 3).into();
        match err {
            ApiError::NotFound { entity, key } => {
                assert_eq!(entity, "episode");
                assert_eq!(key, "3");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unique_violation_maps_to_constraint() {
        let err: ApiError =
            RepositoryError::UniqueConstraintViolation("cut.number".to_string()).into();
        assert!(matches!(err, ApiError::ConstraintViolation(_)));
    }

    #[test]
    fn test_range_error_converts() {
        let err: ApiError = CutRangeError::Empty.into();
        assert!(matches!(err, ApiError::InvalidRange(CutRangeError::Empty)));
        assert!(err.to_string().contains("卡号范围"));
    }
}
