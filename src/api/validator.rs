// ==========================================
// 库存生命周期引擎 - 报表请求校验
// ==========================================
// 职责: 在任何计算/取数之前校验请求，失败即返回，不产生部分输出
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{EngineConfig, ValidatedConfig};
use crate::domain::aggregate::{GroupingSpec, OrgLevel};
use crate::domain::period::Period;
use crate::domain::types::{DimensionTab, ItemCategory};
use serde::{Deserialize, Serialize};

/// 报表请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// 品牌代码（M / I / X ...）
    pub brand: String,
    pub config: EngineConfig,
    /// 需要输出的分组（为空时使用默认分组）
    #[serde(default)]
    pub groupings: Vec<GroupingSpec>,
    /// 是否附带经销商名称
    #[serde(default)]
    pub include_dealer_names: bool,
}

/// 校验后的请求
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub brand: String,
    pub config: ValidatedConfig,
    pub groupings: Vec<GroupingSpec>,
    pub include_dealer_names: bool,
    /// 取数窗口 [去年同期的上月, 评估月]
    pub window: (Period, Period),
}

impl ValidatedRequest {
    /// 月度趋势的首月（窗口首月只用作上月数量下限）
    pub fn trend_start(&self) -> Period {
        self.window.0.add_months(1)
    }
}

/// 默认分组
///
/// - 全部汇总
/// - 品类页签（含"全部"由汇总行提供）
/// - 主力/奥莱 × 季节桶
/// - 渠道组（FRS / HQ_OR）
/// - 经销商
/// - 维度页签 × 品类
pub fn default_groupings(tab: DimensionTab) -> Vec<GroupingSpec> {
    vec![
        GroupingSpec::total(),
        GroupingSpec::total().with_category(),
        GroupingSpec::total().with_segment().with_season_bucket(),
        GroupingSpec::total().with_org(OrgLevel::ChannelGroup),
        GroupingSpec::total().with_org(OrgLevel::Dealer),
        GroupingSpec::total().with_dimension(tab).with_category(),
    ]
}

/// 校验报表请求
pub fn validate_request(request: &ReportRequest) -> ApiResult<ValidatedRequest> {
    let brand = request.brand.trim();
    if brand.is_empty() {
        return Err(ApiError::InvalidInput("品牌代码不能为空".to_string()));
    }
    if !brand.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ApiError::InvalidInput(format!("品牌代码格式错误: {}", brand)));
    }

    let config = request.config.validate()?;

    let groupings = if request.groupings.is_empty() {
        default_groupings(config.dimension_tab)
    } else {
        request.groupings.clone()
    };

    // 前一个月的数量下限需要额外一个月的数据
    let window_start = config.prior_month().prev_month();
    if Period::new(window_start.year(), window_start.month()).is_err() {
        return Err(ApiError::InvalidInput(format!(
            "取数窗口起点超出支持范围: {}（评估月需不早于 190102）",
            window_start.as_yyyymm()
        )));
    }
    let window = (window_start, config.reference_month);

    Ok(ValidatedRequest {
        brand: brand.to_string(),
        config,
        groupings,
        include_dealer_names: request.include_dealer_names,
        window,
    })
}

/// 报表识别的品类页签（四个已知中分类）
pub fn known_category_tabs() -> Vec<&'static str> {
    ItemCategory::ALL.iter().map(|c| c.as_str()).collect()
}
