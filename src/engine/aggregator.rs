// ==========================================
// 库存生命周期引擎 - 聚合器
// ==========================================
// 职责: 按分组规格汇总当期/去年同期度量，派生库存周数与同比
// 红线:
//   - 累加器合并满足交换律与结合律（年度分片可按任意到达顺序合并）
//   - 汇总行只能由子行投影求和得到，不重新扫描明细
//   - 未映射组织的记录不参与分组，单独计数计额
// ==========================================

use crate::domain::aggregate::{
    AggregatedRow, GroupKey, GroupingSpec, Measures, UnmappedTally, YoyRatio,
};
use crate::domain::period::Period;
use crate::domain::record::ClassifiedRecord;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::stock_cover::{stock_weeks, weeks_delta};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{instrument, warn};

/// 同比比率: 当期 / 去年 × 100
///
/// - 去年 = 0 且当期 > 0 → N/A
/// - 两期均为 0 → 未定义
pub fn yoy_ratio(current: f64, prior: f64) -> YoyRatio {
    if !current.is_finite() || !prior.is_finite() {
        return YoyRatio::Undefined;
    }
    if prior == 0.0 {
        return if current > 0.0 {
            YoyRatio::NotApplicable
        } else {
            YoyRatio::Undefined
        };
    }
    let ratio = current / prior * 100.0;
    if ratio.is_finite() {
        YoyRatio::Ratio(ratio)
    } else {
        YoyRatio::Undefined
    }
}

/// 单组的当期/去年同期度量
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PeriodPair {
    pub current: Measures,
    pub prior: Measures,
}

impl PeriodPair {
    fn merge(&mut self, other: &PeriodPair) {
        self.current.merge(&other.current);
        self.prior.merge(&other.prior);
    }
}

// ==========================================
// AggregationAccumulator - 可合并累加器
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationAccumulator {
    spec: GroupingSpec,
    current_period: Period,
    prior_period: Period,
    groups: BTreeMap<GroupKey, PeriodPair>,
    unmapped_current: UnmappedTally,
    unmapped_prior: UnmappedTally,
}

impl AggregationAccumulator {
    pub fn new(spec: GroupingSpec, current_period: Period, prior_period: Period) -> Self {
        Self {
            spec,
            current_period,
            prior_period,
            groups: BTreeMap::new(),
            unmapped_current: UnmappedTally::default(),
            unmapped_prior: UnmappedTally::default(),
        }
    }

    /// 累加单条记录（不在两期之内的记录忽略，返回 false）
    pub fn add(&mut self, record: &ClassifiedRecord) -> bool {
        let is_current = record.period == self.current_period;
        let is_prior = record.period == self.prior_period;
        if !is_current && !is_prior {
            return false;
        }

        if !record.is_mapped() {
            if is_current {
                self.unmapped_current.add(record);
            } else {
                self.unmapped_prior.add(record);
            }
            return true;
        }

        let Some(key) = self.spec.key_for(record) else {
            return false;
        };
        let pair = self.groups.entry(key).or_default();
        if is_current {
            pair.current.add_record(record);
        } else {
            pair.prior.add_record(record);
        }
        true
    }

    pub fn extend<'a>(&mut self, records: impl IntoIterator<Item = &'a ClassifiedRecord>) {
        for r in records {
            self.add(r);
        }
    }

    /// 合并另一累加器（分组规格与两期必须一致）
    pub fn merge(&mut self, other: &AggregationAccumulator) -> EngineResult<()> {
        if self.spec != other.spec
            || self.current_period != other.current_period
            || self.prior_period != other.prior_period
        {
            return Err(EngineError::invalid_parameter(
                "accumulator",
                "分组规格或对比月份不一致，无法合并",
            ));
        }

        for (key, pair) in &other.groups {
            self.groups.entry(key.clone()).or_default().merge(pair);
        }
        self.unmapped_current.merge(&other.unmapped_current);
        self.unmapped_prior.merge(&other.unmapped_prior);
        Ok(())
    }

    pub fn finish(self) -> AggregationTable {
        if !self.unmapped_current.is_empty() {
            warn!(
                records = self.unmapped_current.record_count,
                stock_amt = self.unmapped_current.stock_amt,
                shops = self.unmapped_current.shop_ids.len(),
                "存在未映射组织的门店记录，已单独计数"
            );
        }

        AggregationTable {
            spec: self.spec,
            current_period: self.current_period,
            prior_period: self.prior_period,
            groups: self.groups,
            unmapped_current: self.unmapped_current,
            unmapped_prior: self.unmapped_prior,
        }
    }
}

// ==========================================
// AggregationTable - 聚合结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationTable {
    spec: GroupingSpec,
    current_period: Period,
    prior_period: Period,
    groups: BTreeMap<GroupKey, PeriodPair>,
    unmapped_current: UnmappedTally,
    unmapped_prior: UnmappedTally,
}

impl AggregationTable {
    pub fn spec(&self) -> &GroupingSpec {
        &self.spec
    }

    pub fn current_period(&self) -> Period {
        self.current_period
    }

    pub fn prior_period(&self) -> Period {
        self.prior_period
    }

    pub fn unmapped_current(&self) -> &UnmappedTally {
        &self.unmapped_current
    }

    pub fn unmapped_prior(&self) -> &UnmappedTally {
        &self.unmapped_prior
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, key: &GroupKey) -> Option<&PeriodPair> {
        self.groups.get(key)
    }

    /// 输出行（按键排序）
    pub fn rows(&self) -> Vec<AggregatedRow> {
        let current_days = self.current_period.days_in_month();
        let prior_days = self.prior_period.days_in_month();

        self.groups
            .iter()
            .map(|(key, pair)| derive_row(key, pair, current_days, prior_days))
            .collect()
    }

    /// 汇总到更粗的分组规格（子行投影求和）
    pub fn rollup(&self, parent: GroupingSpec) -> EngineResult<AggregationTable> {
        if !self.spec.can_roll_up_to(&parent) {
            return Err(EngineError::invalid_parameter(
                "rollup",
                format!("分组规格 {:?} 无法汇总到 {:?}", self.spec, parent),
            ));
        }

        let mut groups: BTreeMap<GroupKey, PeriodPair> = BTreeMap::new();
        for (key, pair) in &self.groups {
            let parent_key = key.project(&parent).ok_or_else(|| {
                EngineError::invalid_parameter("rollup", format!("分组键无法投影: {}", key))
            })?;
            groups.entry(parent_key).or_default().merge(pair);
        }

        Ok(AggregationTable {
            spec: parent,
            current_period: self.current_period,
            prior_period: self.prior_period,
            groups,
            unmapped_current: self.unmapped_current.clone(),
            unmapped_prior: self.unmapped_prior.clone(),
        })
    }

    /// 校验 parent 的每一行 == 本表子行求和
    pub fn verify_rollup(&self, parent: &AggregationTable) -> EngineResult<()> {
        let expected = self.rollup(parent.spec)?;
        let empty = PeriodPair::default();

        for key in parent.groups.keys().chain(expected.groups.keys()) {
            let actual = parent.groups.get(key).unwrap_or(&empty);
            let sum = expected.groups.get(key).unwrap_or(&empty);
            check_measures(key, "current", &actual.current, &sum.current)?;
            check_measures(key, "prior", &actual.prior, &sum.prior)?;
        }
        Ok(())
    }
}

fn derive_row(key: &GroupKey, pair: &PeriodPair, current_days: u32, prior_days: u32) -> AggregatedRow {
    let current = pair.current;
    let prior = pair.prior;

    let current_stock_weeks = stock_weeks(current.stock_amt, current.sales_amt, current_days);
    let prior_stock_weeks = stock_weeks(prior.stock_amt, prior.sales_amt, prior_days);

    let stagnant_share = (current.stock_amt > 0.0)
        .then(|| current.stagnant_stock_amt / current.stock_amt)
        .filter(|v| v.is_finite());

    AggregatedRow {
        key: key.clone(),
        current,
        prior,
        current_stock_weeks,
        prior_stock_weeks,
        stock_weeks_delta: weeks_delta(current_stock_weeks, prior_stock_weeks),
        stock_amt_yoy: yoy_ratio(current.stock_amt, prior.stock_amt),
        sales_amt_yoy: yoy_ratio(current.sales_amt, prior.sales_amt),
        stagnant_stock_amt_yoy: yoy_ratio(current.stagnant_stock_amt, prior.stagnant_stock_amt),
        stagnant_share,
    }
}

fn amounts_match(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

fn check_measures(key: &GroupKey, side: &str, actual: &Measures, sum: &Measures) -> EngineResult<()> {
    let fields = [
        ("record_count", actual.record_count as f64, sum.record_count as f64),
        ("stock_qty", actual.stock_qty as f64, sum.stock_qty as f64),
        ("stock_amt", actual.stock_amt, sum.stock_amt),
        ("sales_amt", actual.sales_amt, sum.sales_amt),
        ("stagnant_stock_qty", actual.stagnant_stock_qty as f64, sum.stagnant_stock_qty as f64),
        ("stagnant_stock_amt", actual.stagnant_stock_amt, sum.stagnant_stock_amt),
    ];

    for (field, parent, children_sum) in fields {
        if !amounts_match(parent, children_sum) {
            return Err(EngineError::AggregationInvariantViolation {
                key: key.to_string(),
                field: format!("{}.{}", side, field),
                parent,
                children_sum,
            });
        }
    }
    Ok(())
}

// ==========================================
// Aggregator - 聚合引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    /// 对一批分类记录按分组规格聚合
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub fn aggregate(
        &self,
        records: &[ClassifiedRecord],
        spec: GroupingSpec,
        current_period: Period,
        prior_period: Period,
    ) -> AggregationTable {
        let mut acc = AggregationAccumulator::new(spec, current_period, prior_period);
        acc.extend(records);
        acc.finish()
    }
}
