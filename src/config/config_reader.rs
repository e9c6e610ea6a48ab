// ==========================================
// 库存生命周期引擎 - 引擎配置读取 Trait
// ==========================================
// 职责: 定义报表服务所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::engine_config::EngineConfig;
use async_trait::async_trait;
use std::error::Error;

/// 配置读取错误
pub type ConfigError = Box<dyn Error + Send + Sync>;

// ==========================================
// EngineConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait EngineConfigReader: Send + Sync {
    /// 滞销阈值（百分比）
    ///
    /// # 默认值
    /// - 0.01（即 0.01%）
    async fn get_threshold_percent(&self) -> Result<f64, ConfigError>;

    /// 上月末数量下限（默认 10）
    async fn get_min_qty(&self) -> Result<i64, ConfigError>;

    /// 当月数量下限（默认 10）
    async fn get_current_month_min_qty(&self) -> Result<i64, ConfigError>;

    /// 规则槽位起算月（默认 202312）
    async fn get_base_month(&self) -> Result<String, ConfigError>;

    /// 维度页签（默认 style）
    async fn get_dimension_tab(&self) -> Result<String, ConfigError>;

    /// 品类过滤（默认 all）
    async fn get_category_filter(&self) -> Result<String, ConfigError>;

    /// 当月下限优先级
    ///
    /// # 返回
    /// - None: 未配置（没有默认值，由调用方显式给出）
    async fn get_min_qty_precedence(&self) -> Result<Option<String>, ConfigError>;

    /// 组装完整配置（评估月由请求给出）
    async fn load_engine_config(&self) -> Result<EngineConfig, ConfigError> {
        Ok(EngineConfig {
            threshold: self.get_threshold_percent().await?,
            min_qty: self.get_min_qty().await?,
            current_month_min_qty: self.get_current_month_min_qty().await?,
            base_month: self.get_base_month().await?,
            reference_month: None,
            dimension_tab: self.get_dimension_tab().await?,
            category_filter: self.get_category_filter().await?,
            min_qty_precedence: self.get_min_qty_precedence().await?,
        })
    }
}
