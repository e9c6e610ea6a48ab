// ==========================================
// 库存生命周期引擎 - 领域模型层
// ==========================================
// 职责: 定义事实、分类结果、聚合对象与受控词表
// 红线: 不含数据访问逻辑，不含引擎逻辑
// ==========================================

pub mod aggregate;
pub mod fact;
pub mod org;
pub mod period;
pub mod record;
pub mod types;

// 重导出核心类型
pub use aggregate::{
    AggregatedRow, GroupKey, GroupingSpec, Measures, OrgKey, OrgLevel, UnmappedTally, YoyRatio,
};
pub use fact::{DimensionKey, InventoryFact, RuleTimeline, RuleVersion, SalesFact};
pub use org::{OrgDirectory, OrgEntity};
pub use period::Period;
pub use record::{ClassifiedBatch, ClassifiedRecord, OrphanSalesTally};
pub use types::{
    brand_name, CategoryFilter, Channel, ChannelGroup, DimensionTab, ItemCategory,
    LifecycleReason, MinQtyPrecedence, SeasonBucket, Segment,
};
