// ==========================================
// 库存生命周期引擎 - 聚合对象
// ==========================================
// 职责: 分组规格、分组键、度量、同比行、未映射计数
// 红线: 汇总值只能由明细求和得到；0 除一律表示为 None/未定义
// ==========================================

use crate::domain::fact::DimensionKey;
use crate::domain::org::OrgEntity;
use crate::domain::record::ClassifiedRecord;
use crate::domain::types::{Channel, ChannelGroup, DimensionTab, SeasonBucket, Segment};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

// ==========================================
// OrgLevel - 组织层级
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgLevel {
    Shop,
    Dealer,
    Channel,
    ChannelGroup,
}

impl OrgLevel {
    /// 本层级的键能否推导出 parent 层级的键
    pub fn can_roll_up_to(&self, parent: OrgLevel) -> bool {
        match (self, parent) {
            (a, b) if *a == b => true,
            (OrgLevel::Shop, _) => true,
            (OrgLevel::Channel, OrgLevel::ChannelGroup) => true,
            _ => false,
        }
    }
}

/// 组织维度的分组键
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum OrgKey {
    /// 门店级保留完整归属，便于向上汇总
    Shop { entity: OrgEntity },
    /// 经销商（None = 无经销商的直营/总部门店）
    Dealer { dealer_id: Option<String> },
    Channel { channel: Channel },
    ChannelGroup { group: ChannelGroup },
}

impl OrgKey {
    pub fn from_entity(entity: &OrgEntity, level: OrgLevel) -> OrgKey {
        match level {
            OrgLevel::Shop => OrgKey::Shop {
                entity: entity.clone(),
            },
            OrgLevel::Dealer => OrgKey::Dealer {
                dealer_id: entity.dealer_id.clone(),
            },
            OrgLevel::Channel => OrgKey::Channel {
                channel: entity.channel,
            },
            OrgLevel::ChannelGroup => OrgKey::ChannelGroup {
                group: entity.channel.group(),
            },
        }
    }

    pub fn level(&self) -> OrgLevel {
        match self {
            OrgKey::Shop { .. } => OrgLevel::Shop,
            OrgKey::Dealer { .. } => OrgLevel::Dealer,
            OrgKey::Channel { .. } => OrgLevel::Channel,
            OrgKey::ChannelGroup { .. } => OrgLevel::ChannelGroup,
        }
    }

    /// 投影到更粗的层级（不可推导时返回 None）
    pub fn project(&self, level: OrgLevel) -> Option<OrgKey> {
        match (self, level) {
            (OrgKey::Shop { entity }, _) => Some(OrgKey::from_entity(entity, level)),
            (OrgKey::Channel { channel }, OrgLevel::ChannelGroup) => Some(OrgKey::ChannelGroup {
                group: channel.group(),
            }),
            (k, l) if k.level() == l => Some(k.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for OrgKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrgKey::Shop { entity } => write!(f, "shop:{}", entity.shop_id),
            OrgKey::Dealer { dealer_id } => {
                write!(f, "dealer:{}", dealer_id.as_deref().unwrap_or("-"))
            }
            OrgKey::Channel { channel } => write!(f, "channel:{}", channel),
            OrgKey::ChannelGroup { group } => write!(f, "channel_group:{}", group),
        }
    }
}

// ==========================================
// GroupingSpec - 分组规格
// ==========================================

/// 分组规格：各维度任意组合，未选维度表示"全部"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GroupingSpec {
    pub dimension: Option<DimensionTab>,
    pub org_level: Option<OrgLevel>,
    pub by_category: bool,
    pub by_segment: bool,
    pub by_season_bucket: bool,
}

impl GroupingSpec {
    /// 全量汇总（不分组）
    pub fn total() -> Self {
        Self::default()
    }

    pub fn with_dimension(mut self, tab: DimensionTab) -> Self {
        self.dimension = Some(tab);
        self
    }

    pub fn with_org(mut self, level: OrgLevel) -> Self {
        self.org_level = Some(level);
        self
    }

    pub fn with_category(mut self) -> Self {
        self.by_category = true;
        self
    }

    pub fn with_segment(mut self) -> Self {
        self.by_segment = true;
        self
    }

    pub fn with_season_bucket(mut self) -> Self {
        self.by_season_bucket = true;
        self
    }

    /// parent 是否可由本规格的分组结果求和得到
    pub fn can_roll_up_to(&self, parent: &GroupingSpec) -> bool {
        let dimension_ok = match (self.dimension, parent.dimension) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(child), Some(p)) => {
                (!p.keeps_color() || child.keeps_color()) && (!p.keeps_size() || child.keeps_size())
            }
        };
        let org_ok = match (self.org_level, parent.org_level) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(child), Some(p)) => child.can_roll_up_to(p),
        };

        dimension_ok
            && org_ok
            && (self.by_category || !parent.by_category)
            && (self.by_segment || !parent.by_segment)
            && (self.by_season_bucket || !parent.by_season_bucket)
    }

    /// 构建单条记录的分组键（需要组织维度但记录未映射时返回 None）
    pub fn key_for(&self, record: &ClassifiedRecord) -> Option<GroupKey> {
        let org = match self.org_level {
            Some(level) => Some(OrgKey::from_entity(record.org.as_ref()?, level)),
            None => None,
        };

        Some(GroupKey {
            dimension: self.dimension.map(|tab| record.dimension_key.project(tab)),
            org,
            category: self.by_category.then(|| record.category.clone()),
            segment: self.by_segment.then_some(record.segment),
            season_bucket: self.by_season_bucket.then_some(record.season_bucket),
        })
    }
}

// ==========================================
// GroupKey - 分组键
// ==========================================

/// 分组键（None 字段表示该维度未分组，即"全部"）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct GroupKey {
    pub dimension: Option<DimensionKey>,
    pub org: Option<OrgKey>,
    pub category: Option<String>,
    pub segment: Option<Segment>,
    pub season_bucket: Option<SeasonBucket>,
}

impl GroupKey {
    /// 投影到更粗的分组规格（调用方保证 can_roll_up_to）
    pub fn project(&self, parent: &GroupingSpec) -> Option<GroupKey> {
        let dimension = match parent.dimension {
            Some(tab) => Some(self.dimension.as_ref()?.project(tab)),
            None => None,
        };
        let org = match parent.org_level {
            Some(level) => Some(self.org.as_ref()?.project(level)?),
            None => None,
        };
        let category = match parent.by_category {
            true => Some(self.category.clone()?),
            false => None,
        };
        let segment = match parent.by_segment {
            true => Some(self.segment?),
            false => None,
        };
        let season_bucket = match parent.by_season_bucket {
            true => Some(self.season_bucket?),
            false => None,
        };

        Some(GroupKey {
            dimension,
            org,
            category,
            segment,
            season_bucket,
        })
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(d) = &self.dimension {
            parts.push(d.to_string());
        }
        if let Some(o) = &self.org {
            parts.push(o.to_string());
        }
        if let Some(c) = &self.category {
            parts.push(c.clone());
        }
        if let Some(s) = self.segment {
            parts.push(s.to_string());
        }
        if let Some(b) = self.season_bucket {
            parts.push(b.to_string());
        }
        if parts.is_empty() {
            write!(f, "ALL")
        } else {
            write!(f, "{}", parts.join("|"))
        }
    }
}

// ==========================================
// Measures - 度量
// ==========================================

/// 可加度量（合并满足交换律与结合律）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Measures {
    pub record_count: u64,
    pub stock_qty: i64,
    pub stock_amt: f64,
    pub sales_amt: f64,
    pub stagnant_stock_qty: i64,
    pub stagnant_stock_amt: f64,
}

impl Measures {
    pub fn add_record(&mut self, record: &ClassifiedRecord) {
        self.record_count += 1;
        self.stock_qty += record.stock_qty;
        self.stock_amt += record.stock_amt;
        self.sales_amt += record.sales_amt;
        if record.is_stagnant {
            self.stagnant_stock_qty += record.stock_qty;
            self.stagnant_stock_amt += record.stock_amt;
        }
    }

    pub fn merge(&mut self, other: &Measures) {
        self.record_count += other.record_count;
        self.stock_qty += other.stock_qty;
        self.stock_amt += other.stock_amt;
        self.sales_amt += other.sales_amt;
        self.stagnant_stock_qty += other.stagnant_stock_qty;
        self.stagnant_stock_amt += other.stagnant_stock_amt;
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

// ==========================================
// YoyRatio - 同比
// ==========================================

/// 同比比率（当期 / 去年同期 × 100）
///
/// 序列化: 数值 / "N/A" / null
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum YoyRatio {
    Ratio(f64),
    /// 去年为 0、今年 > 0
    NotApplicable,
    /// 两期均为 0（或无法计算）
    Undefined,
}

impl Serialize for YoyRatio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            YoyRatio::Ratio(v) => serializer.serialize_f64(*v),
            YoyRatio::NotApplicable => serializer.serialize_str("N/A"),
            YoyRatio::Undefined => serializer.serialize_none(),
        }
    }
}

// ==========================================
// AggregatedRow - 聚合输出行
// ==========================================

/// 当期 vs 去年同期的聚合行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow {
    pub key: GroupKey,
    pub current: Measures,
    pub prior: Measures,

    /// 当期库存周数（销售 ≤ 0 时为 None）
    pub current_stock_weeks: Option<f64>,
    /// 去年同期库存周数
    pub prior_stock_weeks: Option<f64>,
    /// 库存周数同比差（任一侧为 None 则为 None）
    pub stock_weeks_delta: Option<f64>,

    pub stock_amt_yoy: YoyRatio,
    pub sales_amt_yoy: YoyRatio,
    pub stagnant_stock_amt_yoy: YoyRatio,

    /// 滞销金额占比（库存金额为 0 时为 None）
    pub stagnant_share: Option<f64>,
}

// ==========================================
// UnmappedTally - 未映射门店计数
// ==========================================

/// 无组织映射的记录：计数 + 金额，单列上报
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnmappedTally {
    pub record_count: u64,
    pub stock_qty: i64,
    pub stock_amt: f64,
    pub sales_amt: f64,
    pub shop_ids: BTreeSet<String>,
}

impl UnmappedTally {
    pub fn add(&mut self, record: &ClassifiedRecord) {
        self.record_count += 1;
        self.stock_qty += record.stock_qty;
        self.stock_amt += record.stock_amt;
        self.sales_amt += record.sales_amt;
        self.shop_ids.insert(record.shop_id.clone());
    }

    pub fn merge(&mut self, other: &UnmappedTally) {
        self.record_count += other.record_count;
        self.stock_qty += other.stock_qty;
        self.stock_amt += other.stock_amt;
        self.sales_amt += other.sales_amt;
        self.shop_ids.extend(other.shop_ids.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}
