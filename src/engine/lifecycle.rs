// ==========================================
// 库存生命周期引擎 - 主力/奥莱分群
// ==========================================
// 规则（顺序执行，命中即返回）:
//   1) rule_code ∈ {FOCUS, INTRO}               → core
//   1b) rule_code ∈ {OUTLET, CARE, DONE}        → outlet
//   2) rule_code 前两位为数字 Y 且 Y ≥ 评估年   → core
//   3) rule_code 缺失，season_code 同样判定通过 → core
//   4) 其他                                      → outlet
// 红线: 输出只有 core/outlet；畸形代码走规则 4，永不 panic
// ==========================================

use crate::domain::fact::InventoryFact;
use crate::domain::types::{LifecycleReason, Segment};
use tracing::instrument;

const CORE_VOCAB: [&str; 2] = ["FOCUS", "INTRO"];
const OUTLET_VOCAB: [&str; 3] = ["OUTLET", "CARE", "DONE"];

/// 读取代码前两位的两位数年份（前两位必须都是 ASCII 数字）
pub fn leading_year(code: &str) -> Option<u32> {
    let bytes = code.trim().as_bytes();
    match bytes {
        [a, b, ..] if a.is_ascii_digit() && b.is_ascii_digit() => {
            Some(((a - b'0') * 10 + (b - b'0')) as u32)
        }
        _ => None,
    }
}

fn in_vocab(code: &str, vocab: &[&str]) -> bool {
    vocab.iter().any(|v| v.eq_ignore_ascii_case(code))
}

// ==========================================
// LifecycleClassifier - 分群引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleClassifier;

impl LifecycleClassifier {
    pub fn new() -> Self {
        Self
    }

    /// 单条分群
    ///
    /// evaluation_year 为两位年份（记录自身月份的年份后两位）。
    /// 空白 rule_code 视为缺失。
    pub fn classify(
        &self,
        rule_code: Option<&str>,
        season_code: Option<&str>,
        evaluation_year: u32,
    ) -> (Segment, LifecycleReason) {
        let rule = rule_code.map(str::trim).filter(|c| !c.is_empty());

        if let Some(code) = rule {
            if in_vocab(code, &CORE_VOCAB) {
                return (Segment::Core, LifecycleReason::FocusIntro);
            }
            if in_vocab(code, &OUTLET_VOCAB) {
                return (Segment::Outlet, LifecycleReason::OutletVocab);
            }
            if matches!(leading_year(code), Some(y) if y >= evaluation_year) {
                return (Segment::Core, LifecycleReason::RuleYear);
            }
            return (Segment::Outlet, LifecycleReason::Fallback);
        }

        match season_code.and_then(leading_year) {
            Some(y) if y >= evaluation_year => (Segment::Core, LifecycleReason::SeasonYear),
            _ => (Segment::Outlet, LifecycleReason::Fallback),
        }
    }

    /// 按事实分群（评估年取事实自身月份）
    pub fn classify_fact(&self, fact: &InventoryFact) -> (Segment, LifecycleReason) {
        self.classify(
            fact.rule_code.as_deref(),
            fact.season_code.as_deref(),
            fact.period.yy(),
        )
    }

    /// 批量分群
    #[instrument(skip(self, facts), fields(count = facts.len()))]
    pub fn classify_batch(&self, facts: &[InventoryFact]) -> Vec<(Segment, LifecycleReason)> {
        facts.iter().map(|f| self.classify_fact(f)).collect()
    }
}
