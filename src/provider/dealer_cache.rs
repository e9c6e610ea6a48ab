// ==========================================
// 库存生命周期引擎 - 经销商名称缓存
// ==========================================
// 职责: 带 TTL 的经销商名称缓存，时钟由外部注入
// 说明: 缓存对象归数据提供层所有，引擎层不感知
// ==========================================

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 默认 TTL（秒）
pub const DEFAULT_DEALER_TTL_SECS: i64 = 3_600;

/// 时钟
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    /// None = 已确认不存在（负缓存）
    name: Option<String>,
    expires_at: DateTime<Utc>,
}

/// 经销商名称缓存
pub struct DealerNameCache {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl DealerNameCache {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// 系统时钟 + 默认 TTL
    pub fn with_system_clock() -> Self {
        Self::new(
            Arc::new(SystemClock),
            Duration::seconds(DEFAULT_DEALER_TTL_SECS),
        )
    }

    /// 查询缓存
    ///
    /// # 返回
    /// - None: 未命中或已过期
    /// - Some(None): 命中负缓存
    /// - Some(Some(name)): 命中
    pub fn get(&self, dealer_id: &str) -> Option<Option<String>> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().ok()?;
        match entries.get(dealer_id) {
            Some(entry) if entry.expires_at > now => Some(entry.name.clone()),
            Some(_) => {
                entries.remove(dealer_id);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, dealer_id: &str, name: Option<String>) {
        let expires_at = self.clock.now() + self.ttl;
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(dealer_id.to_string(), CacheEntry { name, expires_at });
        }
    }

    /// 清理过期条目，返回清理数量
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        match self.entries.lock() {
            Ok(mut entries) => {
                let before = entries.len();
                entries.retain(|_, e| e.expires_at > now);
                before - entries.len()
            }
            Err(_) => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
