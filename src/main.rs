// ==========================================
// 库存生命周期引擎 - 命令行入口
// ==========================================
// 用法:
//   inventory-lifecycle [db_path] [brand] [reference_month] [min_qty_precedence]
// 说明:
//   - db_path 缺省为用户数据目录下的 warehouse.db
//   - reference_month 缺省为上个月
//   - min_qty_precedence 缺省读取 config_kv，两处都没有则报错
//   - 报表以 JSON 输出到 stdout，日志写 stderr
// ==========================================

use anyhow::{bail, Context};
use chrono::{Datelike, Utc};
use inventory_lifecycle::api::InventoryReportApi;
use inventory_lifecycle::config::{config_keys, ConfigManager, EngineConfigReader};
use inventory_lifecycle::domain::Period;
use inventory_lifecycle::provider::{DealerNameCache, SqliteFactProvider};
use inventory_lifecycle::{logging, ApiError, ReportRequest};
use std::path::PathBuf;
use std::sync::Arc;

fn default_db_path() -> PathBuf {
    let mut path = PathBuf::from("./warehouse.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("inventory-lifecycle");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("warehouse.db");
        }
    }

    path
}

fn default_reference_month() -> anyhow::Result<String> {
    let today = Utc::now().date_naive();
    let current = Period::new(today.year(), today.month())?;
    Ok(current.prev_month().as_yyyymm())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let db_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(default_db_path);
    let brand = args.next().unwrap_or_else(|| "M".to_string());
    let reference_month = match args.next() {
        Some(m) => m,
        None => default_reference_month()?,
    };
    let precedence_override = args.next().filter(|s| !s.trim().is_empty());

    if !db_path.exists() {
        bail!(
            "数据库文件不存在: {}（可先运行 seed_demo_warehouse 生成演示数据）",
            db_path.display()
        );
    }
    let db_path_str = db_path.to_string_lossy().to_string();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", inventory_lifecycle::APP_NAME, inventory_lifecycle::VERSION);
    tracing::info!(db = %db_path_str, brand = %brand, reference_month = %reference_month, "开始生成报表");
    tracing::info!("==================================================");

    let provider = SqliteFactProvider::new(&db_path_str)
        .context("无法打开数仓快照")?
        .with_dealer_cache(Arc::new(DealerNameCache::with_system_clock()));
    let config_manager = ConfigManager::from_connection(provider.connection())
        .map_err(|e| anyhow::anyhow!("配置初始化失败: {}", e))?;

    let mut config = config_manager
        .load_engine_config()
        .await
        .map_err(|e| anyhow::anyhow!("配置读取失败: {}", e))?;
    config.reference_month = Some(reference_month);
    if precedence_override.is_some() {
        config.min_qty_precedence = precedence_override;
    }
    if config.min_qty_precedence.is_none() {
        bail!(
            "未指定当月下限优先级: 请在 config_kv 中设置 {} 或通过第 4 个参数传入",
            config_keys::MIN_QTY_PRECEDENCE
        );
    }

    let api = InventoryReportApi::new(Arc::new(provider), Arc::new(config_manager));
    let request = ReportRequest {
        brand,
        config,
        groupings: vec![],
        include_dealer_names: true,
    };

    let report = match api.build_report(&request).await {
        Ok(report) => report,
        Err(e @ ApiError::InvalidInput(_)) => bail!("请求参数错误: {}", e),
        Err(e) => return Err(e).context("报表生成失败"),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
