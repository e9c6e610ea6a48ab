// ==========================================
// 库存生命周期引擎 - 报表服务
// ==========================================
// 流程:
//   1) 校验请求（失败即返回）
//   2) 按自然年分片并发取数（库存 + 销售），按到达顺序合并
//   3) 按季度槽位填充运营规则
//   4) 分类（分群/季节桶/滞销/库存周数）
//   5) 最细粒度聚合一次，其余分组全部由汇总得到
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{known_category_tabs, validate_request, ReportRequest, ValidatedRequest};
use crate::config::{EngineConfig, EngineConfigReader};
use crate::domain::aggregate::{AggregatedRow, GroupingSpec, OrgKey, OrgLevel, UnmappedTally};
use crate::domain::fact::{InventoryFact, SalesFact};
use crate::domain::period::Period;
use crate::domain::record::{ClassifiedBatch, OrphanSalesTally};
use crate::domain::types::{brand_name, DimensionTab};
use crate::engine::aggregator::{AggregationTable, Aggregator};
use crate::engine::epoch::resolve_active_rules;
use crate::engine::orchestrator::LifecycleOrchestrator;
use crate::engine::stock_cover::stock_weeks;
use crate::perf::PerfGuard;
use crate::provider::data_provider::FactProvider;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};

// ==========================================
// 报表输出
// ==========================================

/// 单个分组的输出
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub grouping: GroupingSpec,
    pub rows: Vec<AggregatedRow>,
}

/// 单月汇总（趋势）
///
/// 趋势从窗口第二个月开始：窗口首月只为上月数量下限取数，
/// 它自己的上月不在批次内，无法判定滞销。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub period: Period,
    pub days: u32,
    pub stock_qty: i64,
    pub stock_amt: f64,
    pub sales_amt: f64,
    pub stagnant_stock_amt: f64,
    pub stock_weeks: Option<f64>,
}

/// 库存生命周期报表
#[derive(Debug, Clone, Serialize)]
pub struct InventoryReport {
    pub report_id: String,
    pub generated_at: DateTime<Utc>,
    pub brand: String,
    pub brand_name: String,
    pub reference_month: Period,
    pub prior_month: Period,
    /// 月份 → 当月天数
    pub days_in_period: BTreeMap<String, u32>,
    pub config: EngineConfig,
    pub category_tabs: Vec<&'static str>,
    pub sections: Vec<ReportSection>,
    pub monthly: Vec<MonthlySummary>,
    pub unmapped: UnmappedTally,
    pub unmapped_prior: UnmappedTally,
    pub orphan_sales: OrphanSalesTally,
    pub unexpected_categories: BTreeSet<String>,
    /// 经销商 ID → 名称（请求时才填充）
    pub dealer_names: BTreeMap<String, String>,
    pub record_count: usize,
}

/// 按自然年切分闭区间
pub fn year_chunks(from: Period, to: Period) -> Vec<(Period, Period)> {
    let mut chunks = Vec::new();
    let mut start = from;
    while start <= to {
        let year_end = start.add_months(12 - start.month() as i32);
        let end = if year_end < to { year_end } else { to };
        chunks.push((start, end));
        start = end.add_months(1);
    }
    chunks
}

/// 最细粒度的聚合规格（其余分组都能由它汇总得到）
fn base_grouping() -> GroupingSpec {
    GroupingSpec::total()
        .with_dimension(DimensionTab::ColorSize)
        .with_org(OrgLevel::Shop)
        .with_category()
        .with_segment()
        .with_season_bucket()
}

// ==========================================
// InventoryReportApi - 报表服务
// ==========================================
pub struct InventoryReportApi<P, C>
where
    P: FactProvider,
    C: EngineConfigReader,
{
    provider: Arc<P>,
    config_reader: Arc<C>,
}

impl<P, C> InventoryReportApi<P, C>
where
    P: FactProvider,
    C: EngineConfigReader,
{
    pub fn new(provider: Arc<P>, config_reader: Arc<C>) -> Self {
        Self {
            provider,
            config_reader,
        }
    }

    /// 以 config_kv 中的配置为准生成报表
    pub async fn build_report_with_stored_config(
        &self,
        brand: &str,
        reference_month: &str,
        groupings: Vec<GroupingSpec>,
    ) -> ApiResult<InventoryReport> {
        let mut config = self.config_reader.load_engine_config().await?;
        config.reference_month = Some(reference_month.to_string());

        self.build_report(&ReportRequest {
            brand: brand.to_string(),
            config,
            groupings,
            include_dealer_names: true,
        })
        .await
    }

    /// 生成报表
    #[instrument(skip(self, request), fields(brand = %request.brand))]
    pub async fn build_report(&self, request: &ReportRequest) -> ApiResult<InventoryReport> {
        let mut perf = PerfGuard::new("build_report");

        // ==========================================
        // 步骤1: 校验
        // ==========================================
        let validated = validate_request(request)?;
        let current = validated.config.reference_month;
        let prior = validated.config.prior_month();

        // ==========================================
        // 步骤2-4: 取数 + 分类
        // ==========================================
        let batch = self.classify_window(&validated).await?;
        perf.set_records(batch.records.len());

        // ==========================================
        // 步骤5: 聚合
        // ==========================================
        let aggregator = Aggregator::new();
        let base = aggregator.aggregate(&batch.records, base_grouping(), current, prior);

        let sections = validated
            .groupings
            .iter()
            .map(|spec| {
                let table = base.rollup(*spec)?;
                Ok(ReportSection {
                    grouping: *spec,
                    rows: table.rows(),
                })
            })
            .collect::<ApiResult<Vec<_>>>()?;

        let monthly: Vec<MonthlySummary> = Period::range_inclusive(
            validated.trend_start(),
            validated.config.reference_month,
        )
            .into_iter()
            .map(|period| {
                let table = aggregator.aggregate(
                    &batch.records,
                    GroupingSpec::total(),
                    period,
                    period.prior_year(),
                );
                monthly_summary(period, &table)
            })
            .collect();

        let dealer_names = if validated.include_dealer_names {
            self.resolve_dealer_names(&sections).await?
        } else {
            BTreeMap::new()
        };

        let days_in_period: BTreeMap<String, u32> = [current, prior]
            .iter()
            .map(|p| (p.as_yyyymm(), p.days_in_month()))
            .collect();

        info!(
            records = batch.records.len(),
            sections = sections.len(),
            unmapped = base.unmapped_current().record_count,
            orphan_sales = batch.orphan_sales.record_count,
            "报表生成完成"
        );

        Ok(InventoryReport {
            report_id: uuid::Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            brand_name: brand_name(&validated.brand).to_string(),
            brand: validated.brand,
            reference_month: current,
            prior_month: prior,
            days_in_period,
            config: request.config.clone(),
            category_tabs: known_category_tabs(),
            sections,
            monthly,
            unmapped: base.unmapped_current().clone(),
            unmapped_prior: base.unmapped_prior().clone(),
            orphan_sales: batch.orphan_sales,
            unexpected_categories: batch.unexpected_categories,
            dealer_names,
            record_count: batch.records.len(),
        })
    }

    /// 取数窗口内的全部事实并分类
    async fn classify_window(&self, validated: &ValidatedRequest) -> ApiResult<ClassifiedBatch> {
        let brand = validated.brand.as_str();
        let (from, to) = validated.window;

        let provider = self.provider.as_ref();
        let chunk_futures = year_chunks(from, to).into_iter().map(|(start, end)| async move {
            let (inventory, sales) = futures::try_join!(
                provider.fetch_inventory(brand, start, end),
                provider.fetch_sales(brand, start, end),
            )?;
            Ok::<(Vec<InventoryFact>, Vec<SalesFact>), ApiError>((inventory, sales))
        });

        let (chunks, timelines, directory) = futures::try_join!(
            try_join_all(chunk_futures),
            async { provider.fetch_rule_timelines(brand).await.map_err(ApiError::from) },
            async { provider.fetch_org_directory().await.map_err(ApiError::from) },
        )?;

        let mut inventory = Vec::new();
        let mut sales = Vec::new();
        for (inv, sal) in chunks {
            inventory.extend(inv);
            sales.extend(sal);
        }

        resolve_active_rules(&mut inventory, &timelines, validated.config.base_month);

        let orchestrator = LifecycleOrchestrator::new(validated.config.classification_options());
        Ok(orchestrator.classify(&inventory, &sales, &directory))
    }

    /// 查询报表中出现的经销商名称
    async fn resolve_dealer_names(
        &self,
        sections: &[ReportSection],
    ) -> ApiResult<BTreeMap<String, String>> {
        let dealer_ids: BTreeSet<String> = sections
            .iter()
            .flat_map(|s| s.rows.iter())
            .filter_map(|row| match &row.key.org {
                Some(OrgKey::Dealer { dealer_id: Some(id) }) => Some(id.clone()),
                Some(OrgKey::Shop { entity }) => entity.dealer_id.clone(),
                _ => None,
            })
            .collect();

        let mut names = BTreeMap::new();
        for id in dealer_ids {
            match self.provider.fetch_dealer_name(&id).await? {
                Some(name) => {
                    names.insert(id, name);
                }
                None => warn!(dealer_id = %id, "经销商名称缺失"),
            }
        }
        Ok(names)
    }
}

fn monthly_summary(period: Period, table: &AggregationTable) -> MonthlySummary {
    let rows = table.rows();
    let current = rows.first().map(|r| r.current).unwrap_or_default();
    let days = period.days_in_month();

    MonthlySummary {
        period,
        days,
        stock_qty: current.stock_qty,
        stock_amt: current.stock_amt,
        sales_amt: current.sales_amt,
        stagnant_stock_amt: current.stagnant_stock_amt,
        stock_weeks: stock_weeks(current.stock_amt, current.sales_amt, days),
    }
}
