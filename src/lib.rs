// ==========================================
// 库存生命周期引擎 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持（主力/奥莱分群、季节桶、滞销判定、库存周数、同比聚合）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 事实、分类结果、聚合对象
pub mod domain;

// 引擎层 - 纯计算，不做 I/O
pub mod engine;

// 数据提供层 - 事实读取
pub mod provider;

// 配置层 - 引擎配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 性能统计
pub mod perf;

// API 层 - 报表服务
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    CategoryFilter, Channel, ChannelGroup, DimensionTab, ItemCategory, LifecycleReason,
    MinQtyPrecedence, SeasonBucket, Segment,
};

// 领域实体
pub use domain::{
    AggregatedRow, ClassifiedBatch, ClassifiedRecord, DimensionKey, GroupKey, GroupingSpec,
    InventoryFact, OrgDirectory, OrgEntity, Period, RuleTimeline, SalesFact, UnmappedTally,
    YoyRatio,
};

// 引擎
pub use engine::{
    AggregationTable, Aggregator, EngineError, EngineResult, LifecycleClassifier,
    LifecycleOrchestrator, SeasonBucketer, StagnationDetector, StagnationParams,
};

// API
pub use api::{ApiError, ApiResult, InventoryReport, InventoryReportApi, ReportRequest};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "库存生命周期引擎";
