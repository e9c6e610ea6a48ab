// ==========================================
// 库存生命周期引擎 - 滞销判定
// ==========================================
// 判定粒度: (按维度页签投影后的维度键, 月)
// 规则（顺序执行）:
//   1) 当月数量 < 当月下限 → below_min_qty，不滞销（受优先级参数约束）
//   2) 非 past → 不滞销
//   3) 上月末数量 < 上月下限 → 保持 past，不滞销
//   4) ratio = SKU 销售额 / 中分类当月总库存额；分母 > 0 且 ratio < 阈值 → 滞销
// 红线: 分母为 0 时一律不滞销；阈值与下限只接受调用方参数或文档化兜底值
// ==========================================

use crate::domain::types::{MinQtyPrecedence, SeasonBucket};
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// 兜底阈值（比例，0.01%）
pub const FALLBACK_THRESHOLD: f64 = 0.0001;
/// 兜底上月下限
pub const FALLBACK_MIN_PRIOR_QTY: i64 = 10;
/// 兜底当月下限
pub const FALLBACK_MIN_CURRENT_QTY: i64 = 10;

// ==========================================
// StagnationParams - 判定参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StagnationParams {
    /// 比例阈值（0.0001 = 0.01%）
    pub threshold: f64,
    pub min_prior_qty: i64,
    pub min_current_qty: i64,
    /// 当月下限与季节桶的优先级（必填）
    pub precedence: MinQtyPrecedence,
}

impl StagnationParams {
    /// 由百分比阈值构建（0.01 → 0.0001）
    pub fn from_percent(
        threshold_percent: f64,
        min_prior_qty: i64,
        min_current_qty: i64,
        precedence: MinQtyPrecedence,
    ) -> EngineResult<Self> {
        if !threshold_percent.is_finite() || threshold_percent < 0.0 {
            return Err(EngineError::invalid_parameter(
                "threshold",
                format!("阈值必须为非负有限数: {}", threshold_percent),
            ));
        }
        if min_prior_qty < 0 {
            return Err(EngineError::invalid_parameter(
                "minQty",
                format!("下限不能为负: {}", min_prior_qty),
            ));
        }
        if min_current_qty < 0 {
            return Err(EngineError::invalid_parameter(
                "currentMonthMinQty",
                format!("下限不能为负: {}", min_current_qty),
            ));
        }

        Ok(Self {
            threshold: threshold_percent / 100.0,
            min_prior_qty,
            min_current_qty,
            precedence,
        })
    }

    /// 文档化兜底参数（优先级仍需调用方给出）
    pub fn fallback(precedence: MinQtyPrecedence) -> Self {
        Self {
            threshold: FALLBACK_THRESHOLD,
            min_prior_qty: FALLBACK_MIN_PRIOR_QTY,
            min_current_qty: FALLBACK_MIN_CURRENT_QTY,
            precedence,
        }
    }
}

/// 单个 (维度键, 月) 的判定输入
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StagnationInput {
    pub bucket: SeasonBucket,
    /// 当月末数量（全门店）
    pub current_qty: i64,
    /// 上月末数量（全门店；批次中缺失按 0）
    pub prior_qty: i64,
    /// SKU 销售额（全门店全渠道）
    pub sku_sales_amt: f64,
    /// 中分类当月总库存额
    pub category_stock_amt: f64,
}

/// 判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagnationOutcome {
    pub bucket: SeasonBucket,
    pub is_stagnant: bool,
}

// ==========================================
// StagnationDetector - 滞销判定引擎
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct StagnationDetector {
    params: StagnationParams,
}

impl StagnationDetector {
    pub fn new(params: StagnationParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &StagnationParams {
        &self.params
    }

    pub fn evaluate(&self, input: &StagnationInput) -> StagnationOutcome {
        let floor_applies = match self.params.precedence {
            MinQtyPrecedence::FloorBeforeBucket => true,
            MinQtyPrecedence::BucketBeforeFloor => input.bucket == SeasonBucket::Past,
            MinQtyPrecedence::IgnoreFloor => false,
        };

        if floor_applies && input.current_qty < self.params.min_current_qty {
            return StagnationOutcome {
                bucket: SeasonBucket::BelowMinQty,
                is_stagnant: false,
            };
        }

        if input.bucket != SeasonBucket::Past {
            return StagnationOutcome {
                bucket: input.bucket,
                is_stagnant: false,
            };
        }

        // 上月下限未达不等于滞销
        if input.prior_qty < self.params.min_prior_qty {
            return StagnationOutcome {
                bucket: SeasonBucket::Past,
                is_stagnant: false,
            };
        }

        StagnationOutcome {
            bucket: SeasonBucket::Past,
            is_stagnant: self.ratio_below_threshold(input.sku_sales_amt, input.category_stock_amt),
        }
    }

    fn ratio_below_threshold(&self, sales: f64, category_stock: f64) -> bool {
        if !sales.is_finite() || !category_stock.is_finite() || category_stock <= 0.0 {
            return false;
        }
        sales / category_stock < self.params.threshold
    }
}
