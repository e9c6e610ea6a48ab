// ==========================================
// 库存生命周期引擎 - 数据提供层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 数据提供层错误类型
#[derive(Error, Debug)]
pub enum ProviderError {
    // ===== 数据库错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    // ===== 数据质量错误 =====
    #[error("字段值错误 (table={table}, field={field}): {message}")]
    FieldValueError {
        table: String,
        field: String,
        message: String,
    },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProviderError {
    pub fn field_value(table: &str, field: &str, message: impl Into<String>) -> Self {
        ProviderError::FieldValueError {
            table: table.to_string(),
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for ProviderError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => ProviderError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            rusqlite::Error::SqliteFailure(_, Some(msg)) => ProviderError::DatabaseQueryError(msg),
            _ => ProviderError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type ProviderResult<T> = Result<T, ProviderError>;
