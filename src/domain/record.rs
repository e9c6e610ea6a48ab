// ==========================================
// 库存生命周期引擎 - 分类结果记录
// ==========================================
// 职责: 库存 ⋈ 销售（维度键 + 月 + 门店）后附加分群、季节桶、滞销标记
// ==========================================

use crate::domain::fact::DimensionKey;
use crate::domain::org::OrgEntity;
use crate::domain::period::Period;
use crate::domain::types::{LifecycleReason, SeasonBucket, Segment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 分类结果记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    pub dimension_key: DimensionKey,
    pub period: Period,
    pub shop_id: String,

    /// 门店组织归属（None = 未映射）
    pub org: Option<OrgEntity>,

    pub category: String,
    pub rule_code: Option<String>,
    pub season_code: Option<String>,

    pub stock_qty: i64,
    pub stock_amt: f64,
    /// 该门店当月各渠道销售额合计
    pub sales_amt: f64,

    pub segment: Segment,
    pub lifecycle_reason: LifecycleReason,
    pub season_bucket: SeasonBucket,
    pub is_stagnant: bool,

    /// 库存周数（销售额 ≤ 0 时为 None）
    pub stock_weeks: Option<f64>,
}

impl ClassifiedRecord {
    pub fn is_mapped(&self) -> bool {
        self.org.is_some()
    }
}

/// 无法关联到任何库存事实的销售（计数 + 金额，不静默丢弃）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrphanSalesTally {
    pub record_count: u64,
    pub sales_amt: f64,
    pub dimension_keys: BTreeSet<String>,
}

impl OrphanSalesTally {
    pub fn add(&mut self, key: &DimensionKey, sales_amt: f64) {
        self.record_count += 1;
        self.sales_amt += sales_amt;
        self.dimension_keys.insert(key.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

/// 一批事实的分类输出
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedBatch {
    pub records: Vec<ClassifiedRecord>,
    pub orphan_sales: OrphanSalesTally,
    /// 四个已知中分类之外的品类
    pub unexpected_categories: BTreeSet<String>,
}
