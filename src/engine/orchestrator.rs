// ==========================================
// 库存生命周期引擎 - 引擎编排器
// ==========================================
// 用途: 库存 ⋈ 销售 → 分群 → 季节桶 → 滞销判定 → 库存周数
// 连接键: (维度键, 月, 门店)；同一门店各渠道销售额合并
// 红线: 纯计算，不做 I/O；同一批输入永远得到同一输出
// ==========================================

use crate::domain::fact::{DimensionKey, InventoryFact, SalesFact};
use crate::domain::org::OrgDirectory;
use crate::domain::period::Period;
use crate::domain::record::{ClassifiedBatch, ClassifiedRecord, OrphanSalesTally};
use crate::domain::types::{CategoryFilter, DimensionTab, ItemCategory};
use crate::engine::lifecycle::LifecycleClassifier;
use crate::engine::season::SeasonBucketer;
use crate::engine::stagnation::{StagnationDetector, StagnationInput, StagnationParams};
use crate::engine::stock_cover::stock_weeks;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info, instrument, warn};

type JoinKey = (DimensionKey, Period, String);

/// 分类选项
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationOptions {
    /// 滞销判定粒度
    pub dimension_tab: DimensionTab,
    pub category_filter: CategoryFilter,
    pub stagnation: StagnationParams,
}

/// 滞销判定分组的合计
#[derive(Debug, Clone, Copy, Default)]
struct GroupTotals {
    stock_qty: i64,
    sales_amt: f64,
}

// ==========================================
// LifecycleOrchestrator - 引擎编排器
// ==========================================
pub struct LifecycleOrchestrator {
    options: ClassificationOptions,
    classifier: LifecycleClassifier,
    bucketer: SeasonBucketer,
    detector: StagnationDetector,
}

impl LifecycleOrchestrator {
    pub fn new(options: ClassificationOptions) -> Self {
        Self {
            classifier: LifecycleClassifier::new(),
            bucketer: SeasonBucketer::new(),
            detector: StagnationDetector::new(options.stagnation),
            options,
        }
    }

    pub fn options(&self) -> &ClassificationOptions {
        &self.options
    }

    /// 分类一批事实
    ///
    /// inventory 的 rule_code 需已按季度槽位填充（见 engine::epoch）。
    #[instrument(skip_all, fields(inventory = inventory.len(), sales = sales.len()))]
    pub fn classify(
        &self,
        inventory: &[InventoryFact],
        sales: &[SalesFact],
        directory: &OrgDirectory,
    ) -> ClassifiedBatch {
        // ==========================================
        // 步骤1: 意外品类 + 品类过滤
        // ==========================================
        let unexpected_categories: BTreeSet<String> = inventory
            .iter()
            .filter(|f| ItemCategory::from_code(&f.category).is_none())
            .map(|f| f.category.trim().to_string())
            .collect();
        if !unexpected_categories.is_empty() {
            warn!(categories = ?unexpected_categories, "出现四个中分类之外的品类");
        }

        let filter = self.options.category_filter;

        // ==========================================
        // 步骤2: 销售按 (维度键, 月, 门店) 合并各渠道
        // ==========================================
        let mut sales_index: BTreeMap<JoinKey, f64> = BTreeMap::new();
        for s in sales {
            *sales_index
                .entry((s.dimension_key.clone(), s.period, s.shop_id.clone()))
                .or_insert(0.0) += s.sales_amt;
        }

        // ==========================================
        // 步骤3: 库存 ⋈ 销售
        // ==========================================
        let mut records: Vec<ClassifiedRecord> = Vec::with_capacity(inventory.len());
        for fact in inventory.iter().filter(|f| filter.accepts(&f.category)) {
            let key = (fact.dimension_key.clone(), fact.period, fact.shop_id.clone());
            // 重复库存行只领取一次销售额
            let sales_amt = sales_index.remove(&key).unwrap_or(0.0);
            records.push(self.seed_record(fact, fact.stock_qty, fact.stock_amt, sales_amt));
        }

        // ==========================================
        // 步骤4: 仅有销售的行向同款同月库存借用属性
        // ==========================================
        let mut attribute_source: HashMap<(&DimensionKey, Period), &InventoryFact> = HashMap::new();
        for fact in inventory {
            attribute_source.entry((&fact.dimension_key, fact.period)).or_insert(fact);
        }

        let mut orphan_sales = OrphanSalesTally::default();
        for ((dimension_key, period, shop_id), sales_amt) in sales_index {
            match attribute_source.get(&(&dimension_key, period)) {
                Some(source) if filter.accepts(&source.category) => {
                    let mut record = self.seed_record(source, 0, 0.0, sales_amt);
                    record.shop_id = shop_id;
                    records.push(record);
                }
                Some(_) => {}
                None => orphan_sales.add(&dimension_key, sales_amt),
            }
        }
        if !orphan_sales.is_empty() {
            warn!(
                records = orphan_sales.record_count,
                sales_amt = orphan_sales.sales_amt,
                "存在无法关联库存的销售记录"
            );
        }

        // ==========================================
        // 步骤5: 滞销判定 + 库存周数 + 组织归属
        // ==========================================
        self.apply_stagnation(&mut records);

        for record in records.iter_mut() {
            record.stock_weeks = stock_weeks(
                record.stock_amt,
                record.sales_amt,
                record.period.days_in_month(),
            );
            record.org = directory.resolve(&record.shop_id).cloned();
        }

        records.sort_by(|a, b| {
            (a.period, &a.dimension_key, &a.shop_id).cmp(&(b.period, &b.dimension_key, &b.shop_id))
        });

        info!(
            records = records.len(),
            stagnant = records.iter().filter(|r| r.is_stagnant).count(),
            unmapped = records.iter().filter(|r| !r.is_mapped()).count(),
            "分类完成"
        );

        ClassifiedBatch {
            records,
            orphan_sales,
            unexpected_categories,
        }
    }

    /// 分群 + 季节桶（滞销字段待步骤5填充）
    fn seed_record(
        &self,
        fact: &InventoryFact,
        stock_qty: i64,
        stock_amt: f64,
        sales_amt: f64,
    ) -> ClassifiedRecord {
        let (segment, lifecycle_reason) = self.classifier.classify_fact(fact);
        let season_bucket = self.bucketer.bucket(fact.season_code.as_deref(), fact.period);

        ClassifiedRecord {
            dimension_key: fact.dimension_key.clone(),
            period: fact.period,
            shop_id: fact.shop_id.clone(),
            org: None,
            category: fact.category.trim().to_string(),
            rule_code: fact.rule_code.clone(),
            season_code: fact.season_code.clone(),
            stock_qty,
            stock_amt,
            sales_amt,
            segment,
            lifecycle_reason,
            season_bucket,
            is_stagnant: false,
            stock_weeks: None,
        }
    }

    /// 按 (投影维度键, 月) 判定滞销，结果写回该组全部门店记录
    fn apply_stagnation(&self, records: &mut [ClassifiedRecord]) {
        let tab = self.options.dimension_tab;

        let mut group_totals: HashMap<(DimensionKey, Period), GroupTotals> = HashMap::new();
        let mut category_stock: HashMap<(String, Period), f64> = HashMap::new();

        for r in records.iter() {
            let totals = group_totals
                .entry((r.dimension_key.project(tab), r.period))
                .or_default();
            totals.stock_qty += r.stock_qty;
            totals.sales_amt += r.sales_amt;

            *category_stock
                .entry((r.category.clone(), r.period))
                .or_insert(0.0) += r.stock_amt;
        }

        let mut stagnant_groups = 0usize;
        for r in records.iter_mut() {
            let projected = r.dimension_key.project(tab);
            let totals = group_totals
                .get(&(projected.clone(), r.period))
                .copied()
                .unwrap_or_default();
            // 上月不在批次内按 0
            let prior_qty = group_totals
                .get(&(projected, r.period.prev_month()))
                .map(|t| t.stock_qty)
                .unwrap_or(0);

            let outcome = self.detector.evaluate(&StagnationInput {
                bucket: r.season_bucket,
                current_qty: totals.stock_qty,
                prior_qty,
                sku_sales_amt: totals.sales_amt,
                category_stock_amt: category_stock
                    .get(&(r.category.clone(), r.period))
                    .copied()
                    .unwrap_or(0.0),
            });

            r.season_bucket = outcome.bucket;
            r.is_stagnant = outcome.is_stagnant;
            if outcome.is_stagnant {
                stagnant_groups += 1;
            }
        }

        debug!(groups = group_totals.len(), stagnant_records = stagnant_groups, "滞销判定完成");
    }
}
