// ==========================================
// 内存数据提供方 - 用于集成测试
// ==========================================
// 记录取数调用次数，用于验证"校验失败不取数"
// ==========================================

use async_trait::async_trait;
use inventory_lifecycle::domain::{
    DimensionKey, InventoryFact, OrgDirectory, Period, RuleTimeline, SalesFact,
};
use inventory_lifecycle::provider::{FactProvider, ProviderResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct InMemoryFactProvider {
    pub inventory: Vec<InventoryFact>,
    pub sales: Vec<SalesFact>,
    pub timelines: HashMap<DimensionKey, RuleTimeline>,
    pub directory: OrgDirectory,
    pub dealer_names: HashMap<String, String>,
    fetch_calls: AtomicUsize,
}

impl InMemoryFactProvider {
    pub fn new(inventory: Vec<InventoryFact>, sales: Vec<SalesFact>) -> Self {
        Self {
            inventory,
            sales,
            ..Self::default()
        }
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FactProvider for InMemoryFactProvider {
    async fn fetch_inventory(
        &self,
        _brand: &str,
        from: Period,
        to: Period,
    ) -> ProviderResult<Vec<InventoryFact>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .inventory
            .iter()
            .filter(|f| f.period >= from && f.period <= to)
            .cloned()
            .collect())
    }

    async fn fetch_sales(
        &self,
        _brand: &str,
        from: Period,
        to: Period,
    ) -> ProviderResult<Vec<SalesFact>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .sales
            .iter()
            .filter(|f| f.period >= from && f.period <= to)
            .cloned()
            .collect())
    }

    async fn fetch_rule_timelines(
        &self,
        _brand: &str,
    ) -> ProviderResult<HashMap<DimensionKey, RuleTimeline>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.timelines.clone())
    }

    async fn fetch_org_directory(&self) -> ProviderResult<OrgDirectory> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.directory.clone())
    }

    async fn fetch_dealer_name(&self, dealer_id: &str) -> ProviderResult<Option<String>> {
        Ok(self.dealer_names.get(dealer_id).cloned())
    }
}
