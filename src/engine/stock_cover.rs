// ==========================================
// 库存生命周期引擎 - 库存周数
// ==========================================
// weekly_rate = sales_amt / days × 7
// weekly_rate ≤ 0 → None（与 0 周区分）；否则 stock_amt / weekly_rate，不取整
// ==========================================

/// 库存周数（销售为 0、天数为 0 或输入非有限数时返回 None）
pub fn stock_weeks(stock_amt: f64, sales_amt: f64, days_in_period: u32) -> Option<f64> {
    if days_in_period == 0 || !stock_amt.is_finite() || !sales_amt.is_finite() {
        return None;
    }

    let weekly_rate = sales_amt / days_in_period as f64 * 7.0;
    if weekly_rate <= 0.0 {
        return None;
    }

    let weeks = stock_amt / weekly_rate;
    weeks.is_finite().then_some(weeks)
}

/// 两期库存周数之差（任一侧为 None 则为 None）
pub fn weeks_delta(current: Option<f64>, prior: Option<f64>) -> Option<f64> {
    Some(current? - prior?)
}
