// ==========================================
// 库存生命周期引擎 - 数据提供层
// ==========================================
// 职责: 事实读取接口、SQLite 实现、经销商名称缓存
// 红线: 只读数据访问，不含分类逻辑
// ==========================================

pub mod data_provider;
pub mod dealer_cache;
pub mod error;
pub mod sqlite_provider;

pub use data_provider::FactProvider;
pub use dealer_cache::{Clock, DealerNameCache, SystemClock, DEFAULT_DEALER_TTL_SECS};
pub use error::{ProviderError, ProviderResult};
pub use sqlite_provider::SqliteFactProvider;
