// ==========================================
// 库存生命周期引擎 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 输入校验错误在计算前立即返回，不产生部分输出；
//       聚合不变量违反属于缺陷，由测试检测，不作为可恢复的运行时状态
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    // ===== 输入校验错误 =====
    #[error("月份格式错误: {value}（期望 YYYYMM / YYYY.MM / YYYY-MM）")]
    InvalidPeriod { value: String },

    #[error("未知维度页签: {0}（仅支持 style/color/size/color&size）")]
    UnknownDimensionTab(String),

    #[error("未知品类: {0}")]
    UnknownCategory(String),

    #[error("未知渠道代码: {0}（仅支持 FR/OR/HQ）")]
    UnknownChannel(String),

    #[error("未知最小数量优先级: {0}")]
    UnknownPrecedence(String),

    #[error("参数无效 ({name}): {message}")]
    InvalidParameter { name: String, message: String },

    // ===== 聚合不变量 =====
    #[error("聚合不变量违反: key={key}, field={field}, parent={parent}, children_sum={children_sum}")]
    AggregationInvariantViolation {
        key: String,
        field: String,
        parent: f64,
        children_sum: f64,
    },
}

impl EngineError {
    /// 构造参数无效错误
    pub fn invalid_parameter(name: &str, message: impl Into<String>) -> Self {
        EngineError::InvalidParameter {
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// 是否为输入校验类错误
    pub fn is_input_validation(&self) -> bool {
        !matches!(self, EngineError::AggregationInvariantViolation { .. })
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
