// ==========================================
// 库存生命周期引擎 - 月份 (Period)
// ==========================================
// 职责: 自然月的解析、比较、偏移与天数计算
// 文本格式: YYYYMM / YYYY.MM / YYYY-MM，序列化为 YYYYMM
// ==========================================

use crate::engine::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 自然月
///
/// 排序: 先年后月，可直接用于区间比较
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// 创建月份（校验 1900..=9999 年，1..=12 月）
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if !(1900..=9999).contains(&year) || !(1..=12).contains(&month) {
            return Err(EngineError::InvalidPeriod {
                value: format!("{:04}{:02}", year, month),
            });
        }
        Ok(Self { year, month })
    }

    /// 解析月份字符串
    ///
    /// 支持: "202511" / "2025.11" / "2025-11"（两端空白忽略）
    pub fn parse(raw: &str) -> EngineResult<Self> {
        let invalid = || EngineError::InvalidPeriod {
            value: raw.to_string(),
        };

        let s = raw.trim();
        if !s.is_ascii() {
            return Err(invalid());
        }
        let (year_part, month_part) = match s.len() {
            6 => (&s[..4], &s[4..]),
            7 if matches!(s.as_bytes()[4], b'.' | b'-') => (&s[..4], &s[5..]),
            _ => return Err(invalid()),
        };

        if !year_part.bytes().all(|b| b.is_ascii_digit())
            || !month_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year = year_part.parse::<i32>().map_err(|_| invalid())?;
        let month = month_part.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// 年份后两位 (2025 → 25)
    pub fn yy(&self) -> u32 {
        self.year.rem_euclid(100) as u32
    }

    /// 自 base 起经过的月数（base 之前为负数）
    pub fn months_since(&self, base: Period) -> i32 {
        (self.year - base.year) * 12 + self.month as i32 - base.month as i32
    }

    /// 偏移 n 个月（n 可为负）
    pub fn add_months(&self, n: i32) -> Period {
        let index = self.year * 12 + (self.month as i32 - 1) + n;
        Period {
            year: index.div_euclid(12),
            month: (index.rem_euclid(12) + 1) as u32,
        }
    }

    /// 上月
    pub fn prev_month(&self) -> Period {
        self.add_months(-1)
    }

    /// 去年同月
    pub fn prior_year(&self) -> Period {
        self.add_months(-12)
    }

    /// 当月天数
    pub fn days_in_month(&self) -> u32 {
        let next = self.add_months(1);
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1);
        let next_first = NaiveDate::from_ymd_opt(next.year, next.month, 1);
        match (first, next_first) {
            (Some(a), Some(b)) => (b - a).num_days() as u32,
            _ => 0,
        }
    }

    /// 闭区间内的全部月份（from > to 时为空）
    pub fn range_inclusive(from: Period, to: Period) -> Vec<Period> {
        let span = to.months_since(from);
        (0..=span.max(-1)).map(|i| from.add_months(i)).collect()
    }

    /// "YYYYMM"
    pub fn as_yyyymm(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::parse(s)
    }
}

impl TryFrom<String> for Period {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Period::parse(&value)
    }
}

impl From<Period> for String {
    fn from(p: Period) -> Self {
        p.as_yyyymm()
    }
}
