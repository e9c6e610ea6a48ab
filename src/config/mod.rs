// ==========================================
// 库存生命周期引擎 - 配置层
// ==========================================
// 职责: 引擎配置的定义、校验与读取
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod config_reader;
pub mod engine_config;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager, GLOBAL_SCOPE};
pub use config_reader::{ConfigError, EngineConfigReader};
pub use engine_config::{EngineConfig, ValidatedConfig, DEFAULT_BASE_MONTH};
