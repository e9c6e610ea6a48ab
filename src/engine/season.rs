// ==========================================
// 库存生命周期引擎 - 季节桶
// ==========================================
// 当季年份: 评估年后两位；评估月 < 3 时取上一年（每年三月切换）
// 季节代码前两位 == 当季 → current；== 当季+1 → next；其余 → past
// 红线: 必须在滞销判定之前执行；只有 past 参与滞销
// ==========================================

use crate::domain::period::Period;
use crate::domain::types::SeasonBucket;
use crate::engine::lifecycle::leading_year;

/// 当季年份（两位）
pub fn current_season_year(evaluation: Period) -> u32 {
    let year = if evaluation.month() < 3 {
        evaluation.year() - 1
    } else {
        evaluation.year()
    };
    year.rem_euclid(100) as u32
}

// ==========================================
// SeasonBucketer - 季节分桶
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct SeasonBucketer;

impl SeasonBucketer {
    pub fn new() -> Self {
        Self
    }

    /// 按评估月分桶（不含下限判定，永不返回 BelowMinQty）
    pub fn bucket(&self, season_code: Option<&str>, evaluation: Period) -> SeasonBucket {
        let current = current_season_year(evaluation);
        match season_code.and_then(leading_year) {
            Some(y) if y == current => SeasonBucket::Current,
            Some(y) if y == (current + 1) % 100 => SeasonBucket::Next,
            _ => SeasonBucket::Past,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Period {
        Period::parse(s).unwrap()
    }

    #[test]
    fn test_march_rollover() {
        assert_eq!(current_season_year(p("2025.02")), 24);
        assert_eq!(current_season_year(p("202501")), 24);
        assert_eq!(current_season_year(p("202503")), 25);
        assert_eq!(current_season_year(p("202512")), 25);
    }

    #[test]
    fn test_february_keeps_prior_year_current() {
        let bucketer = SeasonBucketer::new();
        assert_eq!(bucketer.bucket(Some("24SS"), p("2025.02")), SeasonBucket::Current);
        assert_eq!(bucketer.bucket(Some("25SS"), p("2025.02")), SeasonBucket::Next);
        assert_eq!(bucketer.bucket(Some("24SS"), p("2025.03")), SeasonBucket::Past);
    }

    #[test]
    fn test_non_numeric_is_past() {
        let bucketer = SeasonBucketer::new();
        assert_eq!(bucketer.bucket(Some("SS25"), p("202506")), SeasonBucket::Past);
        assert_eq!(bucketer.bucket(None, p("202506")), SeasonBucket::Past);
        assert_eq!(bucketer.bucket(Some(""), p("202506")), SeasonBucket::Past);
    }

    #[test]
    fn test_century_wrap() {
        let bucketer = SeasonBucketer::new();
        assert_eq!(bucketer.bucket(Some("00SS"), p("209906")), SeasonBucket::Next);
    }
}
