// ==========================================
// 库存生命周期引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (scope_id + key → value)
// 说明: 解析失败的数值配置回退到文档化兜底值并告警；
//       min_qty_precedence 不回退
// ==========================================

use crate::config::config_reader::{ConfigError, EngineConfigReader};
use crate::config::engine_config::DEFAULT_BASE_MONTH;
use crate::db::open_sqlite_connection;
use crate::engine::stagnation::{FALLBACK_MIN_CURRENT_QTY, FALLBACK_MIN_PRIOR_QTY, FALLBACK_THRESHOLD};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// 全局配置作用域
pub const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 按数据库文件路径创建
    pub fn new(db_path: &str) -> Result<Self, ConfigError> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（与数据提供方共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, ConfigError> {
        {
            let guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3",
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// 全部 global 配置的快照（报表元信息用）
    pub fn get_config_snapshot(&self) -> Result<BTreeMap<String, String>, ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        Ok(self
            .get_global_config_value(key)?
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    /// 读取数值配置；格式错误时告警并使用兜底值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        match self.get_global_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(
                        config_key = key,
                        raw_value = %raw,
                        fallback = %default,
                        "配置格式错误，使用兜底值"
                    );
                    Ok(default)
                }
            },
        }
    }
}

// ==========================================
// EngineConfigReader Trait 实现
// ==========================================
#[async_trait]
impl EngineConfigReader for ConfigManager {
    async fn get_threshold_percent(&self) -> Result<f64, ConfigError> {
        self.get_parsed_or_default(config_keys::THRESHOLD_PCT, FALLBACK_THRESHOLD * 100.0)
    }

    async fn get_min_qty(&self) -> Result<i64, ConfigError> {
        self.get_parsed_or_default(config_keys::MIN_QTY, FALLBACK_MIN_PRIOR_QTY)
    }

    async fn get_current_month_min_qty(&self) -> Result<i64, ConfigError> {
        self.get_parsed_or_default(config_keys::CURRENT_MONTH_MIN_QTY, FALLBACK_MIN_CURRENT_QTY)
    }

    async fn get_base_month(&self) -> Result<String, ConfigError> {
        self.get_config_or_default(config_keys::BASE_MONTH, DEFAULT_BASE_MONTH)
    }

    async fn get_dimension_tab(&self) -> Result<String, ConfigError> {
        self.get_config_or_default(config_keys::DIMENSION_TAB, "style")
    }

    async fn get_category_filter(&self) -> Result<String, ConfigError> {
        self.get_config_or_default(config_keys::CATEGORY_FILTER, "all")
    }

    async fn get_min_qty_precedence(&self) -> Result<Option<String>, ConfigError> {
        Ok(self
            .get_global_config_value(config_keys::MIN_QTY_PRECEDENCE)?
            .filter(|v| !v.trim().is_empty()))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 滞销判定
    pub const THRESHOLD_PCT: &str = "stagnant_threshold_pct";
    pub const MIN_QTY: &str = "stagnant_min_qty";
    pub const CURRENT_MONTH_MIN_QTY: &str = "stagnant_current_month_min_qty";
    pub const MIN_QTY_PRECEDENCE: &str = "stagnant_min_qty_precedence";

    // 规则槽位
    pub const BASE_MONTH: &str = "rule_base_month";

    // 报表口径
    pub const DIMENSION_TAB: &str = "dimension_tab";
    pub const CATEGORY_FILTER: &str = "category_filter";
}
