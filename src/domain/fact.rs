// ==========================================
// 库存生命周期引擎 - 原始事实 (Facts)
// ==========================================
// 职责: 定义数据提供方交付的库存/销售事实与运营规则版本
// 红线: 不含分类逻辑；事实一经交付即只读
// ==========================================

use crate::domain::period::Period;
use crate::domain::types::{Channel, DimensionTab};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// DimensionKey - 维度键
// ==========================================

/// 维度键（款 / 色 / 码）
///
/// 原始事实总是带齐三段；按维度页签投影后，未保留的段为 None。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DimensionKey {
    pub style: String,
    pub color: Option<String>,
    pub size: Option<String>,
}

impl DimensionKey {
    pub fn new(style: &str, color: &str, size: &str) -> Self {
        Self {
            style: style.to_string(),
            color: Some(color.to_string()),
            size: Some(size.to_string()),
        }
    }

    /// 仅款号
    pub fn style_only(style: &str) -> Self {
        Self {
            style: style.to_string(),
            color: None,
            size: None,
        }
    }

    /// 按维度页签投影
    pub fn project(&self, tab: DimensionTab) -> DimensionKey {
        DimensionKey {
            style: self.style.clone(),
            color: if tab.keeps_color() { self.color.clone() } else { None },
            size: if tab.keeps_size() { self.size.clone() } else { None },
        }
    }
}

impl fmt::Display for DimensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.style)?;
        if let Some(color) = &self.color {
            write!(f, "/{}", color)?;
        }
        if let Some(size) = &self.size {
            write!(f, "/{}", size)?;
        }
        Ok(())
    }
}

// ==========================================
// 库存事实 / 销售事实
// ==========================================

/// 月末库存事实：每个维度键 × 门店 × 月一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryFact {
    pub dimension_key: DimensionKey,
    pub period: Period,
    pub shop_id: String,
    /// 中分类（Shoes/Headwear/Bag/Acc_etc，仓库可能出现其他值）
    pub category: String,
    /// 当期季度槽位生效的运营规则（None 表示缺失）
    pub rule_code: Option<String>,
    /// 商品季节代码（如 "25SS"）
    pub season_code: Option<String>,
    pub stock_qty: i64,
    pub stock_amt: f64,
}

/// 销售事实：每个维度键 × 门店 × 月 × 渠道一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesFact {
    pub dimension_key: DimensionKey,
    pub period: Period,
    pub shop_id: String,
    pub channel: Channel,
    pub sales_amt: f64,
}

// ==========================================
// 运营规则版本 (RuleVersion / RuleTimeline)
// ==========================================

/// 单个季度槽位的运营规则
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleVersion {
    /// 季度槽位（从 1 开始）
    pub epoch: u32,
    pub rule_code: String,
}

/// 单个 SKU 的运营规则时间线
///
/// 稀疏、有序（按 epoch 升序），同一 epoch 只保留最后写入的规则；
/// 槽位数量不设上限。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleTimeline {
    versions: Vec<RuleVersion>,
}

impl RuleTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由任意顺序的版本构建（空白规则视为缺失，不入表）
    pub fn from_versions(versions: impl IntoIterator<Item = RuleVersion>) -> Self {
        let mut timeline = Self::new();
        for v in versions {
            timeline.insert(v.epoch, &v.rule_code);
        }
        timeline
    }

    /// 写入/覆盖某个槽位
    pub fn insert(&mut self, epoch: u32, rule_code: &str) {
        let code = rule_code.trim();
        if code.is_empty() || epoch == 0 {
            return;
        }
        match self.versions.binary_search_by_key(&epoch, |v| v.epoch) {
            Ok(idx) => self.versions[idx].rule_code = code.to_string(),
            Err(idx) => self.versions.insert(
                idx,
                RuleVersion {
                    epoch,
                    rule_code: code.to_string(),
                },
            ),
        }
    }

    /// 指定槽位生效的规则（精确匹配，缺槽返回 None）
    pub fn active_rule(&self, epoch: u32) -> Option<&str> {
        self.versions
            .binary_search_by_key(&epoch, |v| v.epoch)
            .ok()
            .map(|idx| self.versions[idx].rule_code.as_str())
    }

    pub fn versions(&self) -> &[RuleVersion] {
        &self.versions
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}
