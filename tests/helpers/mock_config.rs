// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use inventory_lifecycle::config::{ConfigError, EngineConfigReader};

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockEngineConfig {
    pub threshold_percent: f64,
    pub min_qty: i64,
    pub current_month_min_qty: i64,
    pub base_month: String,
    pub dimension_tab: String,
    pub category_filter: String,
    pub min_qty_precedence: Option<String>,
}

impl Default for MockEngineConfig {
    fn default() -> Self {
        Self {
            threshold_percent: 0.01,
            min_qty: 10,
            current_month_min_qty: 10,
            base_month: "202312".to_string(),
            dimension_tab: "style".to_string(),
            category_filter: "all".to_string(),
            min_qty_precedence: Some("BUCKET_BEFORE_FLOOR".to_string()),
        }
    }
}

impl MockEngineConfig {
    pub fn with_precedence(precedence: Option<&str>) -> Self {
        Self {
            min_qty_precedence: precedence.map(str::to_string),
            ..Self::default()
        }
    }
}

#[async_trait]
impl EngineConfigReader for MockEngineConfig {
    async fn get_threshold_percent(&self) -> Result<f64, ConfigError> {
        Ok(self.threshold_percent)
    }

    async fn get_min_qty(&self) -> Result<i64, ConfigError> {
        Ok(self.min_qty)
    }

    async fn get_current_month_min_qty(&self) -> Result<i64, ConfigError> {
        Ok(self.current_month_min_qty)
    }

    async fn get_base_month(&self) -> Result<String, ConfigError> {
        Ok(self.base_month.clone())
    }

    async fn get_dimension_tab(&self) -> Result<String, ConfigError> {
        Ok(self.dimension_tab.clone())
    }

    async fn get_category_filter(&self) -> Result<String, ConfigError> {
        Ok(self.category_filter.clone())
    }

    async fn get_min_qty_precedence(&self) -> Result<Option<String>, ConfigError> {
        Ok(self.min_qty_precedence.clone())
    }
}
