// ==========================================
// 库存生命周期引擎 - SQLite 数据提供方
// ==========================================
// 职责: 从数仓快照文件读取库存/销售/规则/门店映射
// 红线: 只做数据访问，不含分类逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::fact::{DimensionKey, InventoryFact, RuleTimeline, SalesFact};
use crate::domain::org::{OrgDirectory, OrgEntity};
use crate::domain::period::Period;
use crate::domain::types::Channel;
use crate::perf::install_sqlite_tracing;
use crate::provider::data_provider::FactProvider;
use crate::provider::dealer_cache::DealerNameCache;
use crate::provider::error::{ProviderError, ProviderResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, instrument, warn};

// ==========================================
// SqliteFactProvider
// ==========================================
pub struct SqliteFactProvider {
    conn: Arc<Mutex<Connection>>,
    dealer_cache: Option<Arc<DealerNameCache>>,
}

impl SqliteFactProvider {
    /// 打开数仓快照文件
    pub fn new(db_path: &str) -> ProviderResult<Self> {
        let mut conn = open_sqlite_connection(db_path)
            .map_err(|e| ProviderError::DatabaseConnectionError(e.to_string()))?;
        install_sqlite_tracing(&mut conn);
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接创建
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            dealer_cache: None,
        }
    }

    /// 注入经销商名称缓存
    pub fn with_dealer_cache(mut self, cache: Arc<DealerNameCache>) -> Self {
        self.dealer_cache = Some(cache);
        self
    }

    /// 共享连接（供 ConfigManager 复用）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    fn get_conn(&self) -> ProviderResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ProviderError::LockError(e.to_string()))
    }
}

fn parse_period(table: &str, raw: &str) -> ProviderResult<Period> {
    Period::parse(raw).map_err(|e| ProviderError::field_value(table, "yyyymm", e.to_string()))
}

/// 空白文本视为缺失
fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

struct InventoryRow {
    prdt_cd: String,
    color_cd: String,
    size_cd: String,
    yyyymm: String,
    shop_id: String,
    item_category: String,
    season_cd: Option<String>,
    stock_qty: i64,
    stock_amt: f64,
}

struct SalesRow {
    prdt_cd: String,
    color_cd: String,
    size_cd: String,
    yyyymm: String,
    shop_id: String,
    chnl_cd: String,
    sale_amt: f64,
}

#[async_trait]
impl FactProvider for SqliteFactProvider {
    #[instrument(skip(self))]
    async fn fetch_inventory(
        &self,
        brand: &str,
        from: Period,
        to: Period,
    ) -> ProviderResult<Vec<InventoryFact>> {
        let rows: Vec<InventoryRow> = {
            let conn = self.get_conn()?;
            let mut stmt = conn.prepare(
                r#"
                SELECT prdt_cd, color_cd, size_cd, yyyymm, shop_id,
                       item_category, season_cd, stock_qty, stock_amt
                FROM inventory_fact
                WHERE brd_cd = ?1 AND yyyymm BETWEEN ?2 AND ?3
                ORDER BY yyyymm, prdt_cd, color_cd, size_cd, shop_id
                "#,
            )?;
            let mapped = stmt.query_map(
                params![brand, from.as_yyyymm(), to.as_yyyymm()],
                |row| {
                    Ok(InventoryRow {
                        prdt_cd: row.get(0)?,
                        color_cd: row.get(1)?,
                        size_cd: row.get(2)?,
                        yyyymm: row.get(3)?,
                        shop_id: row.get(4)?,
                        item_category: row.get(5)?,
                        season_cd: row.get(6)?,
                        stock_qty: row.get(7)?,
                        stock_amt: row.get(8)?,
                    })
                },
            )?;
            mapped.collect::<Result<_, _>>()?
        };

        let facts = rows
            .into_iter()
            .map(|r| {
                Ok(InventoryFact {
                    dimension_key: DimensionKey::new(&r.prdt_cd, &r.color_cd, &r.size_cd),
                    period: parse_period("inventory_fact", &r.yyyymm)?,
                    shop_id: r.shop_id,
                    category: r.item_category.trim().to_string(),
                    rule_code: None,
                    season_code: non_blank(r.season_cd),
                    stock_qty: r.stock_qty,
                    stock_amt: r.stock_amt,
                })
            })
            .collect::<ProviderResult<Vec<_>>>()?;

        debug!(count = facts.len(), "库存事实读取完成");
        Ok(facts)
    }

    #[instrument(skip(self))]
    async fn fetch_sales(
        &self,
        brand: &str,
        from: Period,
        to: Period,
    ) -> ProviderResult<Vec<SalesFact>> {
        let rows: Vec<SalesRow> = {
            let conn = self.get_conn()?;
            let mut stmt = conn.prepare(
                r#"
                SELECT prdt_cd, color_cd, size_cd, yyyymm, shop_id, chnl_cd, sale_amt
                FROM sales_fact
                WHERE brd_cd = ?1 AND yyyymm BETWEEN ?2 AND ?3
                ORDER BY yyyymm, prdt_cd, color_cd, size_cd, shop_id, chnl_cd
                "#,
            )?;
            let mapped = stmt.query_map(
                params![brand, from.as_yyyymm(), to.as_yyyymm()],
                |row| {
                    Ok(SalesRow {
                        prdt_cd: row.get(0)?,
                        color_cd: row.get(1)?,
                        size_cd: row.get(2)?,
                        yyyymm: row.get(3)?,
                        shop_id: row.get(4)?,
                        chnl_cd: row.get(5)?,
                        sale_amt: row.get(6)?,
                    })
                },
            )?;
            mapped.collect::<Result<_, _>>()?
        };

        let facts = rows
            .into_iter()
            .map(|r| {
                let channel = Channel::parse(&r.chnl_cd).map_err(|e| {
                    ProviderError::field_value("sales_fact", "chnl_cd", e.to_string())
                })?;
                Ok(SalesFact {
                    dimension_key: DimensionKey::new(&r.prdt_cd, &r.color_cd, &r.size_cd),
                    period: parse_period("sales_fact", &r.yyyymm)?,
                    shop_id: r.shop_id,
                    channel,
                    sales_amt: r.sale_amt,
                })
            })
            .collect::<ProviderResult<Vec<_>>>()?;

        debug!(count = facts.len(), "销售事实读取完成");
        Ok(facts)
    }

    #[instrument(skip(self))]
    async fn fetch_rule_timelines(
        &self,
        brand: &str,
    ) -> ProviderResult<HashMap<DimensionKey, RuleTimeline>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT prdt_cd, color_cd, size_cd, epoch, rule_cd
            FROM product_rule
            WHERE brd_cd = ?1
            ORDER BY prdt_cd, color_cd, size_cd, epoch
            "#,
        )?;
        let rows = stmt.query_map(params![brand], |row| {
            Ok((
                DimensionKey::new(
                    &row.get::<_, String>(0)?,
                    &row.get::<_, String>(1)?,
                    &row.get::<_, String>(2)?,
                ),
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut timelines: HashMap<DimensionKey, RuleTimeline> = HashMap::new();
        for row in rows {
            let (key, epoch, rule_cd) = row?;
            let epoch = u32::try_from(epoch).map_err(|_| {
                ProviderError::field_value("product_rule", "epoch", format!("槽位越界: {}", epoch))
            })?;
            timelines.entry(key).or_default().insert(epoch, &rule_cd);
        }

        debug!(skus = timelines.len(), "运营规则读取完成");
        Ok(timelines)
    }

    /// 同一门店多行时取最近开店日期的一行
    #[instrument(skip(self))]
    async fn fetch_org_directory(&self) -> ProviderResult<OrgDirectory> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT shop_id, chnl_cd, dealer_id FROM (
                SELECT shop_id, chnl_cd, dealer_id,
                       ROW_NUMBER() OVER (PARTITION BY shop_id ORDER BY open_dt DESC) AS rn
                FROM shop_map
            ) WHERE rn = 1
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?;

        let mut directory = OrgDirectory::new();
        for row in rows {
            let (shop_id, chnl_cd, dealer_id) = row?;
            match Channel::parse(&chnl_cd) {
                Ok(channel) => directory.insert(OrgEntity {
                    shop_id,
                    channel,
                    dealer_id: non_blank(dealer_id),
                }),
                // 渠道无法识别的门店按未映射处理
                Err(e) => warn!(shop_id = %shop_id, error = %e, "门店渠道代码无法识别，按未映射处理"),
            }
        }

        debug!(shops = directory.len(), "门店映射读取完成");
        Ok(directory)
    }

    async fn fetch_dealer_name(&self, dealer_id: &str) -> ProviderResult<Option<String>> {
        if let Some(hit) = self.dealer_cache.as_ref().and_then(|c| c.get(dealer_id)) {
            return Ok(hit);
        }

        let name = {
            let conn = self.get_conn()?;
            conn.query_row(
                "SELECT dealer_nm FROM dealer WHERE dealer_id = ?1",
                params![dealer_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?
        };

        if let Some(cache) = &self.dealer_cache {
            let purged = cache.purge_expired();
            if purged > 0 {
                debug!(purged, "经销商名称缓存清理过期条目");
            }
            cache.insert(dealer_id, name.clone());
        }
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn provider() -> SqliteFactProvider {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO inventory_fact VALUES ('M', 'A1', 'BK', 'F', '202511', 'S1', 'Bag', '24FW', 12, 1200.0);
            INSERT INTO inventory_fact VALUES ('M', 'A1', 'BK', 'F', '202411', 'S1', 'Bag', ' ', 8, 800.0);
            INSERT INTO inventory_fact VALUES ('I', 'K1', 'WH', 'F', '202511', 'S1', 'Shoes', '25SS', 1, 10.0);
            INSERT INTO sales_fact VALUES ('M', 'A1', 'BK', 'F', '202511', 'S1', 'FR', 30.0);
            INSERT INTO product_rule VALUES ('M', 'A1', 'BK', 'F', 8, 'OUTLET');
            INSERT INTO product_rule VALUES ('M', 'A1', 'BK', 'F', 1, 'INTRO');
            INSERT INTO product_rule VALUES ('M', 'A1', 'WH', 'F', 8, 'FOCUS');
            INSERT INTO shop_map VALUES ('S1', 'OR', NULL, '2019-01-01');
            INSERT INTO shop_map VALUES ('S1', 'FR', 'D1', '2023-05-01');
            INSERT INTO shop_map VALUES ('S2', '??', NULL, '2023-05-01');
            INSERT INTO dealer VALUES ('D1', '강남상사');
            "#,
        )
        .unwrap();
        SqliteFactProvider::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn p(s: &str) -> Period {
        Period::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_inventory_by_brand_and_range() {
        let facts = provider()
            .fetch_inventory("M", p("202411"), p("202511"))
            .await
            .unwrap();
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].period, p("202411"));
        assert_eq!(facts[0].season_code, None);
        assert_eq!(facts[1].season_code.as_deref(), Some("24FW"));
    }

    #[tokio::test]
    async fn test_fetch_rule_timelines_sorted() {
        let timelines = provider().fetch_rule_timelines("M").await.unwrap();
        assert_eq!(timelines.len(), 2);
        let t = timelines.get(&DimensionKey::new("A1", "BK", "F")).unwrap();
        assert_eq!(t.active_rule(1), Some("INTRO"));
        assert_eq!(t.active_rule(8), Some("OUTLET"));
        assert_eq!(t.active_rule(2), None);

        // 同款不同颜色各有一条时间线
        let wh = timelines.get(&DimensionKey::new("A1", "WH", "F")).unwrap();
        assert_eq!(wh.active_rule(8), Some("FOCUS"));
        assert_eq!(wh.active_rule(1), None);
    }

    #[tokio::test]
    async fn test_org_directory_latest_open_date() {
        let dir = provider().fetch_org_directory().await.unwrap();
        let s1 = dir.resolve("S1").unwrap();
        assert_eq!(s1.channel, Channel::Fr);
        assert_eq!(s1.dealer_id.as_deref(), Some("D1"));
        assert!(dir.resolve("S2").is_none());
    }

    #[tokio::test]
    async fn test_dealer_name_uses_cache() {
        let cache = Arc::new(DealerNameCache::with_system_clock());
        let provider = provider().with_dealer_cache(cache.clone());

        assert_eq!(
            provider.fetch_dealer_name("D1").await.unwrap().as_deref(),
            Some("강남상사")
        );
        assert_eq!(provider.fetch_dealer_name("D9").await.unwrap(), None);
        assert_eq!(cache.len(), 2);

        // 缓存命中后不再查库
        provider
            .get_conn()
            .unwrap()
            .execute("DELETE FROM dealer", [])
            .unwrap();
        assert_eq!(
            provider.fetch_dealer_name("D1").await.unwrap().as_deref(),
            Some("강남상사")
        );
    }

    #[tokio::test]
    async fn test_unknown_channel_in_sales_is_error() {
        let provider = provider();
        provider
            .get_conn()
            .unwrap()
            .execute(
                "INSERT INTO sales_fact VALUES ('M', 'A1', 'BK', 'F', '202511', 'S1', 'ZZ', 1.0)",
                [],
            )
            .unwrap();
        let err = provider
            .fetch_sales("M", p("202511"), p("202511"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::FieldValueError { .. }));
    }
}
