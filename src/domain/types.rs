// ==========================================
// 库存生命周期引擎 - 领域类型定义
// ==========================================
// 职责: 分群/季节桶/渠道/维度页签/品类等受控词表
// 红线: 枚举取值互斥且完备，未知输入显式报错，不静默兜底
// ==========================================

use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 商品分群 (Segment)
// ==========================================
// 主力 / 奥莱，分类器输出永远二选一
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Core,   // 主力（当季主推）
    Outlet, // 奥莱（清货/过季）
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Core => "core",
            Segment::Outlet => "outlet",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 分群判定原因 (Lifecycle Reason)
// ==========================================
// 红线: 每个分群结论都必须可解释
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleReason {
    FocusIntro,  // 规则为 FOCUS/INTRO
    OutletVocab, // 规则为 OUTLET/CARE/DONE
    RuleYear,    // 规则前两位年份 ≥ 评估年
    SeasonYear,  // 无规则，季节前两位年份 ≥ 评估年
    Fallback,    // 其余情况
}

impl fmt::Display for LifecycleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleReason::FocusIntro => write!(f, "FOCUS_INTRO"),
            LifecycleReason::OutletVocab => write!(f, "OUTLET_VOCAB"),
            LifecycleReason::RuleYear => write!(f, "RULE_YEAR"),
            LifecycleReason::SeasonYear => write!(f, "SEASON_YEAR"),
            LifecycleReason::Fallback => write!(f, "FALLBACK"),
        }
    }
}

// ==========================================
// 季节桶 (Season Bucket)
// ==========================================
// 互斥且完备；BelowMinQty 由滞销判定阶段改写
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonBucket {
    Current,     // 当季
    Next,        // 下季
    Past,        // 过季
    BelowMinQty, // 当月数量低于下限
}

impl SeasonBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonBucket::Current => "current",
            SeasonBucket::Next => "next",
            SeasonBucket::Past => "past",
            SeasonBucket::BelowMinQty => "below_min_qty",
        }
    }
}

impl fmt::Display for SeasonBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 渠道 (Channel)
// ==========================================
// FR=经销商(加盟) / OR=直营 / HQ=总部仓
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Fr,
    Or,
    Hq,
}

impl Channel {
    /// 从渠道代码解析（大小写不敏感）
    pub fn parse(raw: &str) -> EngineResult<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "FR" | "FRS" => Ok(Channel::Fr),
            "OR" => Ok(Channel::Or),
            "HQ" => Ok(Channel::Hq),
            other => Err(EngineError::UnknownChannel(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Fr => "FR",
            Channel::Or => "OR",
            Channel::Hq => "HQ",
        }
    }

    /// 所属渠道组：FR → FRS（经销商库存），HQ/OR → HQ_OR（总部库存）
    pub fn group(&self) -> ChannelGroup {
        match self {
            Channel::Fr => ChannelGroup::Frs,
            Channel::Or | Channel::Hq => ChannelGroup::HqOr,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 渠道组
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChannelGroup {
    #[serde(rename = "FRS")]
    Frs,
    #[serde(rename = "HQ_OR")]
    HqOr,
}

impl ChannelGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelGroup::Frs => "FRS",
            ChannelGroup::HqOr => "HQ_OR",
        }
    }
}

impl fmt::Display for ChannelGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 维度页签 (Dimension Tab)
// ==========================================
// 决定维度键粒度: 款 / 款+色 / 款+码 / 款+色+码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DimensionTab {
    #[serde(rename = "style")]
    Style,
    #[serde(rename = "color")]
    Color,
    #[serde(rename = "size")]
    Size,
    #[serde(rename = "color&size")]
    ColorSize,
}

impl DimensionTab {
    pub fn parse(raw: &str) -> EngineResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "style" => Ok(DimensionTab::Style),
            "color" => Ok(DimensionTab::Color),
            "size" => Ok(DimensionTab::Size),
            "color&size" | "color_size" => Ok(DimensionTab::ColorSize),
            _ => Err(EngineError::UnknownDimensionTab(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionTab::Style => "style",
            DimensionTab::Color => "color",
            DimensionTab::Size => "size",
            DimensionTab::ColorSize => "color&size",
        }
    }

    pub fn keeps_color(&self) -> bool {
        matches!(self, DimensionTab::Color | DimensionTab::ColorSize)
    }

    pub fn keeps_size(&self) -> bool {
        matches!(self, DimensionTab::Size | DimensionTab::ColorSize)
    }
}

impl fmt::Display for DimensionTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 品类 (Item Category)
// ==========================================
// 配件四个中分类；其他值作为"意外品类"上报
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Shoes,
    Headwear,
    Bag,
    #[serde(rename = "Acc_etc")]
    AccEtc,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 4] = [
        ItemCategory::Shoes,
        ItemCategory::Headwear,
        ItemCategory::Bag,
        ItemCategory::AccEtc,
    ];

    /// 严格匹配仓库中的中分类名称
    pub fn from_code(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Shoes" => Some(ItemCategory::Shoes),
            "Headwear" => Some(ItemCategory::Headwear),
            "Bag" => Some(ItemCategory::Bag),
            "Acc_etc" => Some(ItemCategory::AccEtc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Shoes => "Shoes",
            ItemCategory::Headwear => "Headwear",
            ItemCategory::Bag => "Bag",
            ItemCategory::AccEtc => "Acc_etc",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 品类过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CategoryFilter {
    All,
    Only(ItemCategory),
}

impl CategoryFilter {
    pub fn parse(raw: &str) -> EngineResult<Self> {
        let s = raw.trim();
        if s.eq_ignore_ascii_case("all") || s == "전체" || s == "全部" {
            return Ok(CategoryFilter::All);
        }
        ItemCategory::from_code(s)
            .map(CategoryFilter::Only)
            .ok_or_else(|| EngineError::UnknownCategory(raw.to_string()))
    }

    /// 是否放行该中分类
    pub fn accepts(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c.as_str() == category.trim(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Only(c) => c.as_str(),
        }
    }
}

impl TryFrom<String> for CategoryFilter {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CategoryFilter::parse(&value)
    }
}

impl From<CategoryFilter> for String {
    fn from(c: CategoryFilter) -> Self {
        c.as_str().to_string()
    }
}

// ==========================================
// 当月数量下限与季节桶的优先级
// ==========================================
// 各调用口径不一致，必须由调用方显式指定，不提供默认值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MinQtyPrecedence {
    /// 先判下限：任何季节桶低于下限都改写为 BelowMinQty
    FloorBeforeBucket,
    /// 先分桶：仅过季记录参与下限判定
    BucketBeforeFloor,
    /// 忽略当月下限（上月下限仍生效）
    IgnoreFloor,
}

impl MinQtyPrecedence {
    pub fn parse(raw: &str) -> EngineResult<Self> {
        match raw.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "FLOOR_BEFORE_BUCKET" => Ok(MinQtyPrecedence::FloorBeforeBucket),
            "BUCKET_BEFORE_FLOOR" => Ok(MinQtyPrecedence::BucketBeforeFloor),
            "IGNORE_FLOOR" | "IGNORE_MIN_QTY" => Ok(MinQtyPrecedence::IgnoreFloor),
            _ => Err(EngineError::UnknownPrecedence(raw.to_string())),
        }
    }
}

impl fmt::Display for MinQtyPrecedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinQtyPrecedence::FloorBeforeBucket => write!(f, "FLOOR_BEFORE_BUCKET"),
            MinQtyPrecedence::BucketBeforeFloor => write!(f, "BUCKET_BEFORE_FLOOR"),
            MinQtyPrecedence::IgnoreFloor => write!(f, "IGNORE_FLOOR"),
        }
    }
}

// ==========================================
// 品牌代码
// ==========================================

/// 品牌代码 → 品牌名称（未知代码原样返回）
pub fn brand_name(code: &str) -> &str {
    match code {
        "M" => "MLB",
        "I" => "MLB KIDS",
        "X" => "DISCOVERY",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_group() {
        assert_eq!(Channel::parse("fr").unwrap().group(), ChannelGroup::Frs);
        assert_eq!(Channel::parse("OR").unwrap().group(), ChannelGroup::HqOr);
        assert_eq!(Channel::parse("HQ").unwrap().group(), ChannelGroup::HqOr);
        assert!(matches!(Channel::parse("XX"), Err(EngineError::UnknownChannel(_))));
    }

    #[test]
    fn test_dimension_tab_parse() {
        assert_eq!(DimensionTab::parse("color&size").unwrap(), DimensionTab::ColorSize);
        assert_eq!(DimensionTab::parse(" Style ").unwrap(), DimensionTab::Style);
        assert!(matches!(
            DimensionTab::parse("fabric"),
            Err(EngineError::UnknownDimensionTab(_))
        ));
    }

    #[test]
    fn test_category_filter() {
        assert_eq!(CategoryFilter::parse("전체").unwrap(), CategoryFilter::All);
        let bag = CategoryFilter::parse("Bag").unwrap();
        assert!(bag.accepts("Bag"));
        assert!(!bag.accepts("Shoes"));
        assert!(CategoryFilter::All.accepts("Apparel"));
        assert!(matches!(
            CategoryFilter::parse("Apparel"),
            Err(EngineError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_precedence_parse() {
        assert_eq!(
            MinQtyPrecedence::parse("ignore-min-qty").unwrap(),
            MinQtyPrecedence::IgnoreFloor
        );
        assert!(MinQtyPrecedence::parse("").is_err());
    }

    #[test]
    fn test_brand_name() {
        assert_eq!(brand_name("M"), "MLB");
        assert_eq!(brand_name("I"), "MLB KIDS");
        assert_eq!(brand_name("Z"), "Z");
    }

    #[test]
    fn test_serde_labels() {
        assert_eq!(serde_json::to_string(&Segment::Core).unwrap(), "\"core\"");
        assert_eq!(
            serde_json::to_string(&SeasonBucket::BelowMinQty).unwrap(),
            "\"below_min_qty\""
        );
        assert_eq!(serde_json::to_string(&ChannelGroup::HqOr).unwrap(), "\"HQ_OR\"");
        assert_eq!(
            serde_json::to_string(&DimensionTab::ColorSize).unwrap(),
            "\"color&size\""
        );
    }
}
