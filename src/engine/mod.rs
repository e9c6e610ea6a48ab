// ==========================================
// 库存生命周期引擎 - 引擎层
// ==========================================
// 职责: 分群、季节桶、滞销判定、库存周数、聚合
// 红线: 引擎不做 I/O；所有分群结论都必须带 reason
// ==========================================

pub mod aggregator;
pub mod epoch;
pub mod error;
pub mod lifecycle;
pub mod orchestrator;
pub mod season;
pub mod stagnation;
pub mod stock_cover;

// 重导出核心引擎
pub use aggregator::{yoy_ratio, AggregationAccumulator, AggregationTable, Aggregator, PeriodPair};
pub use epoch::{quarter_epoch, resolve_active_rules};
pub use error::{EngineError, EngineResult};
pub use lifecycle::LifecycleClassifier;
pub use orchestrator::{ClassificationOptions, LifecycleOrchestrator};
pub use season::{current_season_year, SeasonBucketer};
pub use stagnation::{StagnationDetector, StagnationInput, StagnationOutcome, StagnationParams};
pub use stock_cover::{stock_weeks, weeks_delta};
