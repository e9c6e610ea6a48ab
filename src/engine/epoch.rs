// ==========================================
// 库存生命周期引擎 - 季度槽位 (Quarter Epoch)
// ==========================================
// 职责: 月份 → 季度槽位；按槽位为库存事实选定生效的运营规则
// 公式: epoch = ⌊months_since(base, period) / 3⌋ + 1
// 红线: base 之前的月份没有槽位，也就没有规则
// ==========================================

use crate::domain::fact::{DimensionKey, InventoryFact, RuleTimeline};
use crate::domain::period::Period;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// 计算季度槽位（从 1 开始；period 早于 base 时返回 None）
pub fn quarter_epoch(base: Period, period: Period) -> Option<u32> {
    let months = period.months_since(base);
    if months < 0 {
        return None;
    }
    Some((months / 3) as u32 + 1)
}

/// 为库存事实填充当期槽位的运营规则
///
/// timelines 以完整的款色码为键；事实已有 rule_code 的保持不变。
/// 返回本次填充的条数。
#[instrument(skip(facts, timelines), fields(count = facts.len()))]
pub fn resolve_active_rules(
    facts: &mut [InventoryFact],
    timelines: &HashMap<DimensionKey, RuleTimeline>,
    base: Period,
) -> usize {
    let mut resolved = 0;

    for fact in facts.iter_mut() {
        if fact
            .rule_code
            .as_deref()
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false)
        {
            continue;
        }

        let rule = quarter_epoch(base, fact.period).and_then(|epoch| {
            timelines
                .get(&fact.dimension_key)
                .and_then(|t| t.active_rule(epoch))
        });

        if let Some(code) = rule {
            fact.rule_code = Some(code.to_string());
            resolved += 1;
        }
    }

    debug!(resolved, "运营规则填充完成");
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fact::RuleVersion;

    fn p(s: &str) -> Period {
        Period::parse(s).unwrap()
    }

    #[test]
    fn test_quarter_epoch_formula() {
        let base = p("202312");
        assert_eq!(quarter_epoch(base, p("202312")), Some(1));
        assert_eq!(quarter_epoch(base, p("202402")), Some(1));
        assert_eq!(quarter_epoch(base, p("202403")), Some(2));
        assert_eq!(quarter_epoch(base, p("202511")), Some(8));
        assert_eq!(quarter_epoch(base, p("202311")), None);
    }

    #[test]
    fn test_quarter_epoch_beyond_fifteen() {
        // 第 16 个槽位不受旧的固定字段数量限制
        assert_eq!(quarter_epoch(p("202312"), p("202709")), Some(16));
    }

    #[test]
    fn test_resolve_active_rules() {
        let base = p("202312");
        let mut timelines = HashMap::new();
        timelines.insert(
            DimensionKey::new("STYLE1", "BK", "F"),
            RuleTimeline::from_versions(vec![
                RuleVersion { epoch: 1, rule_code: "INTRO".to_string() },
                RuleVersion { epoch: 2, rule_code: "24SS".to_string() },
            ]),
        );

        let fact = |period: &str, rule: Option<&str>| InventoryFact {
            dimension_key: DimensionKey::new("STYLE1", "BK", "F"),
            period: p(period),
            shop_id: "S1".to_string(),
            category: "Bag".to_string(),
            rule_code: rule.map(|r| r.to_string()),
            season_code: Some("24SS".to_string()),
            stock_qty: 10,
            stock_amt: 100.0,
        };

        let mut facts = vec![
            fact("202401", None),
            fact("202404", Some(" ")),
            fact("202407", None),
            fact("202404", Some("FOCUS")),
        ];

        let resolved = resolve_active_rules(&mut facts, &timelines, base);
        assert_eq!(resolved, 2);
        assert_eq!(facts[0].rule_code.as_deref(), Some("INTRO"));
        assert_eq!(facts[1].rule_code.as_deref(), Some("24SS"));
        assert_eq!(facts[2].rule_code, None);
        assert_eq!(facts[3].rule_code.as_deref(), Some("FOCUS"));
    }

    #[test]
    fn test_colors_of_one_style_resolve_independently() {
        let base = p("202312");
        let mut timelines = HashMap::new();
        timelines.insert(
            DimensionKey::new("STYLE1", "BK", "F"),
            RuleTimeline::from_versions(vec![RuleVersion { epoch: 8, rule_code: "FOCUS".to_string() }]),
        );
        timelines.insert(
            DimensionKey::new("STYLE1", "WH", "F"),
            RuleTimeline::from_versions(vec![RuleVersion { epoch: 8, rule_code: "OUTLET".to_string() }]),
        );

        let fact = |color: &str, size: &str| InventoryFact {
            dimension_key: DimensionKey::new("STYLE1", color, size),
            period: p("202511"),
            shop_id: "S1".to_string(),
            category: "Bag".to_string(),
            rule_code: None,
            season_code: Some("24SS".to_string()),
            stock_qty: 10,
            stock_amt: 100.0,
        };

        let mut facts = vec![fact("BK", "F"), fact("WH", "F"), fact("NY", "F")];
        let resolved = resolve_active_rules(&mut facts, &timelines, base);
        assert_eq!(resolved, 2);
        assert_eq!(facts[0].rule_code.as_deref(), Some("FOCUS"));
        assert_eq!(facts[1].rule_code.as_deref(), Some("OUTLET"));
        // 没有自身时间线的颜色不借用同款其他颜色的规则
        assert_eq!(facts[2].rule_code, None);
    }
}
