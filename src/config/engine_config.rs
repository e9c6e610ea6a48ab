// ==========================================
// 库存生命周期引擎 - 引擎配置
// ==========================================
// 职责: 调用方配置（camelCase JSON）→ 校验后的强类型参数
// 红线: minQtyPrecedence 没有默认值，缺失即报错
// ==========================================

use crate::domain::period::Period;
use crate::domain::types::{CategoryFilter, DimensionTab, MinQtyPrecedence};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::orchestrator::ClassificationOptions;
use crate::engine::stagnation::{
    StagnationParams, FALLBACK_MIN_CURRENT_QTY, FALLBACK_MIN_PRIOR_QTY, FALLBACK_THRESHOLD,
};
use serde::{Deserialize, Serialize};

/// 规则槽位的默认起算月
pub const DEFAULT_BASE_MONTH: &str = "202312";

fn default_threshold() -> f64 {
    FALLBACK_THRESHOLD * 100.0
}

fn default_min_qty() -> i64 {
    FALLBACK_MIN_PRIOR_QTY
}

fn default_current_month_min_qty() -> i64 {
    FALLBACK_MIN_CURRENT_QTY
}

fn default_base_month() -> String {
    DEFAULT_BASE_MONTH.to_string()
}

fn default_dimension_tab() -> String {
    DimensionTab::Style.as_str().to_string()
}

fn default_category_filter() -> String {
    CategoryFilter::All.as_str().to_string()
}

/// 引擎配置（原始文本，未校验）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// 滞销阈值（百分比，0.01 = 0.01%）
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// 上月末数量下限
    #[serde(default = "default_min_qty")]
    pub min_qty: i64,
    /// 当月数量下限
    #[serde(default = "default_current_month_min_qty")]
    pub current_month_min_qty: i64,
    /// 规则槽位起算月
    #[serde(default = "default_base_month")]
    pub base_month: String,
    /// 评估月（当期）
    #[serde(default)]
    pub reference_month: Option<String>,
    #[serde(default = "default_dimension_tab")]
    pub dimension_tab: String,
    #[serde(default = "default_category_filter")]
    pub category_filter: String,
    /// 当月下限与季节桶的优先级（必填）
    #[serde(default)]
    pub min_qty_precedence: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            min_qty: default_min_qty(),
            current_month_min_qty: default_current_month_min_qty(),
            base_month: default_base_month(),
            reference_month: None,
            dimension_tab: default_dimension_tab(),
            category_filter: default_category_filter(),
            min_qty_precedence: None,
        }
    }
}

/// 校验后的配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedConfig {
    pub base_month: Period,
    pub reference_month: Period,
    pub dimension_tab: DimensionTab,
    pub category_filter: CategoryFilter,
    pub stagnation: StagnationParams,
}

impl ValidatedConfig {
    /// 去年同期
    pub fn prior_month(&self) -> Period {
        self.reference_month.prior_year()
    }

    pub fn classification_options(&self) -> ClassificationOptions {
        ClassificationOptions {
            dimension_tab: self.dimension_tab,
            category_filter: self.category_filter,
            stagnation: self.stagnation,
        }
    }
}

impl EngineConfig {
    /// 校验并转换为强类型参数（任何一项失败即返回，不产生部分结果）
    pub fn validate(&self) -> EngineResult<ValidatedConfig> {
        let reference_raw = self
            .reference_month
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| EngineError::invalid_parameter("referenceMonth", "评估月不能为空"))?;
        let reference_month = Period::parse(reference_raw)?;
        let base_month = Period::parse(&self.base_month)?;
        if reference_month < base_month {
            return Err(EngineError::invalid_parameter(
                "baseMonth",
                format!("起算月 {} 晚于评估月 {}", base_month, reference_month),
            ));
        }

        let dimension_tab = DimensionTab::parse(&self.dimension_tab)?;
        let category_filter = CategoryFilter::parse(&self.category_filter)?;

        let precedence_raw = self
            .min_qty_precedence
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                EngineError::invalid_parameter("minQtyPrecedence", "必须显式指定当月下限优先级")
            })?;
        let precedence = MinQtyPrecedence::parse(precedence_raw)?;

        let stagnation = StagnationParams::from_percent(
            self.threshold,
            self.min_qty,
            self.current_month_min_qty,
            precedence,
        )?;

        Ok(ValidatedConfig {
            base_month,
            reference_month,
            dimension_tab,
            category_filter,
            stagnation,
        })
    }
}
