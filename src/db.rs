// ==========================================
// 库存生命周期引擎 - SQLite 连接与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发读写时的偶发 busy 错误
// - 提供数仓快照文件的建表语句（本地演示/测试用）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
///
/// 表:
/// - inventory_fact: 月末库存（款/色/码 × 门店 × 月）
/// - sales_fact: 销售（款/色/码 × 门店 × 月 × 渠道）
/// - product_rule: 运营规则时间线（款色码 × 季度槽位）
/// - shop_map: 门店 → 渠道/经销商（同一门店多行时取最近开店日期）
/// - dealer: 经销商名称
/// - config_kv: 配置（scope_id + key）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS inventory_fact (
            brd_cd TEXT NOT NULL,
            prdt_cd TEXT NOT NULL,
            color_cd TEXT NOT NULL,
            size_cd TEXT NOT NULL,
            yyyymm TEXT NOT NULL,
            shop_id TEXT NOT NULL,
            item_category TEXT NOT NULL,
            season_cd TEXT,
            stock_qty INTEGER NOT NULL DEFAULT 0,
            stock_amt REAL NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_inventory_fact_brd_month
            ON inventory_fact (brd_cd, yyyymm);

        CREATE TABLE IF NOT EXISTS sales_fact (
            brd_cd TEXT NOT NULL,
            prdt_cd TEXT NOT NULL,
            color_cd TEXT NOT NULL,
            size_cd TEXT NOT NULL,
            yyyymm TEXT NOT NULL,
            shop_id TEXT NOT NULL,
            chnl_cd TEXT NOT NULL,
            sale_amt REAL NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_sales_fact_brd_month
            ON sales_fact (brd_cd, yyyymm);

        CREATE TABLE IF NOT EXISTS product_rule (
            brd_cd TEXT NOT NULL,
            prdt_cd TEXT NOT NULL,
            color_cd TEXT NOT NULL,
            size_cd TEXT NOT NULL,
            epoch INTEGER NOT NULL,
            rule_cd TEXT NOT NULL,
            PRIMARY KEY (brd_cd, prdt_cd, color_cd, size_cd, epoch)
        );

        CREATE TABLE IF NOT EXISTS shop_map (
            shop_id TEXT NOT NULL,
            chnl_cd TEXT NOT NULL,
            dealer_id TEXT,
            open_dt TEXT
        );

        CREATE TABLE IF NOT EXISTS dealer (
            dealer_id TEXT PRIMARY KEY,
            dealer_nm TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )?;

    if read_schema_version(conn)?.is_none() {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [CURRENT_SCHEMA_VERSION],
        )?;
    }
    Ok(())
}

/// 读取 schema_version（若表不存在或为空则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
