// ==========================================
// 库存生命周期引擎 - 组织映射
// ==========================================
// 职责: 门店 → 渠道/经销商 的映射
// 说明: 无映射的门店不参与分组，由聚合器单独计数计额
// ==========================================

use crate::domain::types::Channel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 门店的组织归属
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrgEntity {
    pub shop_id: String,
    pub channel: Channel,
    /// 经销商（账户）ID，直营/总部仓可为空
    pub dealer_id: Option<String>,
}

/// 组织目录
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrgDirectory {
    entries: HashMap<String, OrgEntity>,
}

impl OrgDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: OrgEntity) {
        self.entries.insert(entity.shop_id.clone(), entity);
    }

    pub fn resolve(&self, shop_id: &str) -> Option<&OrgEntity> {
        self.entries.get(shop_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<OrgEntity> for OrgDirectory {
    fn from_iter<T: IntoIterator<Item = OrgEntity>>(iter: T) -> Self {
        let mut dir = OrgDirectory::new();
        for e in iter {
            dir.insert(e);
        }
        dir
    }
}
