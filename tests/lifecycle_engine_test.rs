// ==========================================
// 分群 + 滞销判定集成测试
// ==========================================
// 测试范围:
// 1. 分群规则（规则代码/季节代码/评估年）
// 2. 单款 12 个月滞销序列（逐月手算）
// 3. 当月下限优先级三种口径
// 4. 按季度槽位填充运营规则后的分群
// ==========================================

mod helpers;

use helpers::fact_builder::{period, InventoryBuilder, SalesBuilder};
use inventory_lifecycle::domain::{ClassifiedRecord, DimensionKey, OrgDirectory, RuleTimeline};
use inventory_lifecycle::engine::{
    quarter_epoch, resolve_active_rules, ClassificationOptions, LifecycleClassifier,
    LifecycleOrchestrator, StagnationParams,
};
use inventory_lifecycle::{
    CategoryFilter, DimensionTab, LifecycleReason, MinQtyPrecedence, SeasonBucket, Segment,
};
use std::collections::HashMap;

fn orchestrator(precedence: MinQtyPrecedence) -> LifecycleOrchestrator {
    LifecycleOrchestrator::new(ClassificationOptions {
        dimension_tab: DimensionTab::Style,
        category_filter: CategoryFilter::All,
        stagnation: StagnationParams::fallback(precedence),
    })
}

fn record_of<'a>(records: &'a [ClassifiedRecord], style: &str, yyyymm: &str) -> &'a ClassifiedRecord {
    records
        .iter()
        .find(|r| r.dimension_key.style == style && r.period == period(yyyymm))
        .unwrap_or_else(|| panic!("缺少记录 {} {}", style, yyyymm))
}

// ==========================================
// 分群规则
// ==========================================

#[test]
fn test_focus_rule_is_core_regardless_of_year() {
    let classifier = LifecycleClassifier::new();
    assert_eq!(
        classifier.classify(Some("FOCUS"), Some("23SS"), 25),
        (Segment::Core, LifecycleReason::FocusIntro)
    );
    assert_eq!(
        classifier.classify(Some("intro"), None, 30),
        (Segment::Core, LifecycleReason::FocusIntro)
    );
}

#[test]
fn test_outlet_vocabulary_beats_season() {
    let classifier = LifecycleClassifier::new();
    for code in ["OUTLET", "CARE", "DONE"] {
        assert_eq!(
            classifier.classify(Some(code), Some("26SS"), 25),
            (Segment::Outlet, LifecycleReason::OutletVocab),
            "{}",
            code
        );
    }
}

#[test]
fn test_missing_rule_falls_back_to_season_year() {
    let classifier = LifecycleClassifier::new();
    assert_eq!(
        classifier.classify(None, Some("26SS"), 25),
        (Segment::Core, LifecycleReason::SeasonYear)
    );
    assert_eq!(
        classifier.classify(None, Some("24FW"), 25),
        (Segment::Outlet, LifecycleReason::Fallback)
    );
    // 空白规则等同缺失
    assert_eq!(
        classifier.classify(Some("  "), Some("25FW"), 25),
        (Segment::Core, LifecycleReason::SeasonYear)
    );
}

#[test]
fn test_rule_year_compared_with_evaluation_year() {
    let classifier = LifecycleClassifier::new();
    assert_eq!(
        classifier.classify(Some("25SS"), Some("22SS"), 25),
        (Segment::Core, LifecycleReason::RuleYear)
    );
    // 规则存在时不再看季节
    assert_eq!(
        classifier.classify(Some("23FW"), Some("26SS"), 25),
        (Segment::Outlet, LifecycleReason::Fallback)
    );
}

// ==========================================
// 单款 12 个月滞销序列
// ==========================================
// P1: 22SS 过季款，单门店；Q1: 同品类的新款，只贡献品类库存额
// 品类库存额每月 = 100_000 + 1_000_000 = 1_100_000
// 阈值 0.01% → 销售额 < 110 判滞销
//
// 月份 | 数量 | 销售 | 上月数量 | 结论
// 01   | 20   | 0    | 0(批次外) | 上月不足，不滞销
// 02   | 20   | 50   | 20       | 滞销
// 03   | 20   | 500  | 20       | 不滞销
// 04   | 20   | 0    | 20       | 滞销
// 05   | 5    | 0    | 20       | 当月不足 → BelowMinQty
// 06   | 20   | 0    | 5        | 上月不足，不滞销
// 07   | 20   | 109  | 20       | 滞销
// 08   | 20   | 200  | 20       | 不滞销
// 09   | 20   | 0    | 20       | 滞销
// 10   | 20   | 30   | 20       | 滞销
// 11   | 20   | 1000 | 20       | 不滞销
// 12   | 20   | 0    | 20       | 滞销

const MONTHS: [(&str, i64, f64); 12] = [
    ("202501", 20, 0.0),
    ("202502", 20, 50.0),
    ("202503", 20, 500.0),
    ("202504", 20, 0.0),
    ("202505", 5, 0.0),
    ("202506", 20, 0.0),
    ("202507", 20, 109.0),
    ("202508", 20, 200.0),
    ("202509", 20, 0.0),
    ("202510", 20, 30.0),
    ("202511", 20, 1000.0),
    ("202512", 20, 0.0),
];

fn twelve_month_batch() -> (Vec<inventory_lifecycle::InventoryFact>, Vec<inventory_lifecycle::SalesFact>) {
    let mut inventory = Vec::new();
    let mut sales = Vec::new();
    for (month, qty, sold) in MONTHS {
        inventory.push(
            InventoryBuilder::new("P1", month)
                .season("22SS")
                .stock(qty, 100_000.0)
                .build(),
        );
        inventory.push(
            InventoryBuilder::new("Q1", month)
                .season("25SS")
                .stock(50, 1_000_000.0)
                .build(),
        );
        if sold > 0.0 {
            sales.push(SalesBuilder::new("P1", month, sold).build());
        }
    }
    (inventory, sales)
}

#[test]
fn test_twelve_month_stagnation_sequence() {
    let (inventory, sales) = twelve_month_batch();
    let batch = orchestrator(MinQtyPrecedence::BucketBeforeFloor).classify(
        &inventory,
        &sales,
        &OrgDirectory::new(),
    );

    let stagnant: Vec<String> = batch
        .records
        .iter()
        .filter(|r| r.dimension_key.style == "P1" && r.is_stagnant)
        .map(|r| r.period.as_yyyymm())
        .collect();
    assert_eq!(
        stagnant,
        vec!["202502", "202504", "202507", "202509", "202510", "202512"]
    );

    assert_eq!(
        record_of(&batch.records, "P1", "202505").season_bucket,
        SeasonBucket::BelowMinQty
    );
    assert_eq!(record_of(&batch.records, "P1", "202506").season_bucket, SeasonBucket::Past);

    // 新款永不滞销
    assert!(batch
        .records
        .iter()
        .filter(|r| r.dimension_key.style == "Q1")
        .all(|r| !r.is_stagnant));
    // 一、二月 25SS 为下季，三月起为当季
    assert_eq!(record_of(&batch.records, "Q1", "202502").season_bucket, SeasonBucket::Next);
    assert_eq!(record_of(&batch.records, "Q1", "202503").season_bucket, SeasonBucket::Current);
}

#[test]
fn test_classification_is_idempotent() {
    let (inventory, sales) = twelve_month_batch();
    let orchestrator = orchestrator(MinQtyPrecedence::FloorBeforeBucket);
    let directory = OrgDirectory::new();

    let first = orchestrator.classify(&inventory, &sales, &directory);
    let second = orchestrator.classify(&inventory, &sales, &directory);
    assert_eq!(first.records, second.records);
}

#[test]
fn test_stagnation_only_in_past_bucket() {
    let (inventory, sales) = twelve_month_batch();
    for precedence in [
        MinQtyPrecedence::FloorBeforeBucket,
        MinQtyPrecedence::BucketBeforeFloor,
        MinQtyPrecedence::IgnoreFloor,
    ] {
        let batch = orchestrator(precedence).classify(&inventory, &sales, &OrgDirectory::new());
        for r in batch.records.iter().filter(|r| r.is_stagnant) {
            assert_eq!(r.season_bucket, SeasonBucket::Past, "{:?}", precedence);
        }
    }
}

// ==========================================
// 当月下限优先级
// ==========================================

#[test]
fn test_min_qty_precedence_variants() {
    let inventory = vec![
        // 当季款，当月数量不足
        InventoryBuilder::new("C1", "202506")
            .season("25SS")
            .stock(5, 5_000.0)
            .build(),
        InventoryBuilder::new("C1", "202505")
            .season("25SS")
            .stock(30, 30_000.0)
            .build(),
        // 过季款，当月数量不足
        InventoryBuilder::new("O1", "202506")
            .season("21FW")
            .stock(3, 3_000.0)
            .build(),
        InventoryBuilder::new("O1", "202505")
            .season("21FW")
            .stock(30, 30_000.0)
            .build(),
    ];
    let directory = OrgDirectory::new();

    let floor_first = orchestrator(MinQtyPrecedence::FloorBeforeBucket).classify(&inventory, &[], &directory);
    assert_eq!(record_of(&floor_first.records, "C1", "202506").season_bucket, SeasonBucket::BelowMinQty);
    assert_eq!(record_of(&floor_first.records, "O1", "202506").season_bucket, SeasonBucket::BelowMinQty);

    let bucket_first = orchestrator(MinQtyPrecedence::BucketBeforeFloor).classify(&inventory, &[], &directory);
    assert_eq!(record_of(&bucket_first.records, "C1", "202506").season_bucket, SeasonBucket::Current);
    assert_eq!(record_of(&bucket_first.records, "O1", "202506").season_bucket, SeasonBucket::BelowMinQty);

    let ignore = orchestrator(MinQtyPrecedence::IgnoreFloor).classify(&inventory, &[], &directory);
    assert_eq!(record_of(&ignore.records, "C1", "202506").season_bucket, SeasonBucket::Current);
    let o1 = record_of(&ignore.records, "O1", "202506");
    assert_eq!(o1.season_bucket, SeasonBucket::Past);
    // 无销售且上月数量达标 → 滞销
    assert!(o1.is_stagnant);
}

// ==========================================
// 季度槽位 → 运营规则 → 分群
// ==========================================

#[test]
fn test_rules_resolved_per_quarter_epoch() {
    let base = period("202312");
    assert_eq!(quarter_epoch(base, period("202312")), Some(1));
    assert_eq!(quarter_epoch(base, period("202403")), Some(2));
    assert_eq!(quarter_epoch(base, period("202511")), Some(8));
    assert_eq!(quarter_epoch(base, period("202311")), None);

    let mut timelines = HashMap::new();
    let mut timeline = RuleTimeline::new();
    timeline.insert(1, "FOCUS");
    timeline.insert(8, "OUTLET");
    timelines.insert(DimensionKey::new("R1", "BK", "F"), timeline);

    let mut facts = vec![
        InventoryBuilder::new("R1", "202401").season("26SS").build(),
        InventoryBuilder::new("R1", "202511").season("26SS").build(),
        // 槽位缺失：不沿用其他槽位的规则
        InventoryBuilder::new("R1", "202406").season("26SS").build(),
    ];
    let filled = resolve_active_rules(&mut facts, &timelines, base);
    assert_eq!(filled, 2);
    assert_eq!(facts[0].rule_code.as_deref(), Some("FOCUS"));
    assert_eq!(facts[1].rule_code.as_deref(), Some("OUTLET"));
    assert_eq!(facts[2].rule_code, None);

    let classifier = LifecycleClassifier::new();
    let segments = classifier.classify_batch(&facts);
    assert_eq!(segments[0], (Segment::Core, LifecycleReason::FocusIntro));
    assert_eq!(segments[1], (Segment::Outlet, LifecycleReason::OutletVocab));
    assert_eq!(segments[2], (Segment::Core, LifecycleReason::SeasonYear));
}
