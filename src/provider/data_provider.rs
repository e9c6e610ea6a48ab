// ==========================================
// 库存生命周期引擎 - 数据提供方接口
// ==========================================
// 职责: 定义引擎所需事实的读取接口（数仓/文件/内存均可实现）
// 红线: 只读；不含分类逻辑
// ==========================================

use crate::domain::fact::{DimensionKey, InventoryFact, RuleTimeline, SalesFact};
use crate::domain::org::OrgDirectory;
use crate::domain::period::Period;
use crate::provider::error::ProviderResult;
use async_trait::async_trait;
use std::collections::HashMap;

/// 数据提供方
///
/// 期间区间均为闭区间 [from, to]。
#[async_trait]
pub trait FactProvider: Send + Sync {
    /// 月末库存事实（rule_code 可为空，由引擎按季度槽位填充）
    async fn fetch_inventory(
        &self,
        brand: &str,
        from: Period,
        to: Period,
    ) -> ProviderResult<Vec<InventoryFact>>;

    /// 销售事实
    async fn fetch_sales(&self, brand: &str, from: Period, to: Period)
        -> ProviderResult<Vec<SalesFact>>;

    /// 运营规则时间线（款色码 → 时间线）
    async fn fetch_rule_timelines(&self, brand: &str)
        -> ProviderResult<HashMap<DimensionKey, RuleTimeline>>;

    /// 门店组织目录
    async fn fetch_org_directory(&self) -> ProviderResult<OrgDirectory>;

    /// 经销商名称（未知返回 None）
    async fn fetch_dealer_name(&self, dealer_id: &str) -> ProviderResult<Option<String>>;
}
