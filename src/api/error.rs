// ==========================================
// 库存生命周期引擎 - API层错误类型
// ==========================================
// 职责: 汇总引擎/数据提供/配置层错误，转换为调用方可读的错误消息
// ==========================================

use crate::config::ConfigError;
use crate::engine::error::EngineError;
use crate::provider::error::ProviderError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入校验错误（计算前返回，无部分输出）
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据质量错误: {0}")]
    DataQualityError(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ==========================================
    // 缺陷类错误
    // ==========================================
    #[error("聚合不变量违反: {0}")]
    InvariantViolation(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 是否为调用方输入问题
    pub fn is_input_error(&self) -> bool {
        matches!(self, ApiError::InvalidInput(_))
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        if err.is_input_validation() {
            ApiError::InvalidInput(err.to_string())
        } else {
            ApiError::InvariantViolation(err.to_string())
        }
    }
}

// ==========================================
// 从 ProviderError 转换
// ==========================================
impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            ProviderError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            ProviderError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            ProviderError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            ProviderError::FieldValueError {
                table,
                field,
                message,
            } => ApiError::DataQualityError(format!("{}.{}: {}", table, field, message)),
            ProviderError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
