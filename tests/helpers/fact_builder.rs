// ==========================================
// 事实构建器 - 用于集成测试
// ==========================================

use inventory_lifecycle::domain::{DimensionKey, InventoryFact, Period, SalesFact};
use inventory_lifecycle::Channel;

pub fn period(raw: &str) -> Period {
    Period::parse(raw).expect("测试月份格式错误")
}

// ==========================================
// InventoryFact 构建器
// ==========================================

pub struct InventoryBuilder {
    style: String,
    color: String,
    size: String,
    period: Period,
    shop_id: String,
    category: String,
    rule_code: Option<String>,
    season_code: Option<String>,
    stock_qty: i64,
    stock_amt: f64,
}

impl InventoryBuilder {
    pub fn new(style: &str, yyyymm: &str) -> Self {
        Self {
            style: style.to_string(),
            color: "BK".to_string(),
            size: "F".to_string(),
            period: period(yyyymm),
            shop_id: "S1".to_string(),
            category: "Bag".to_string(),
            rule_code: None,
            season_code: None,
            stock_qty: 0,
            stock_amt: 0.0,
        }
    }

    pub fn color_size(mut self, color: &str, size: &str) -> Self {
        self.color = color.to_string();
        self.size = size.to_string();
        self
    }

    pub fn shop(mut self, shop_id: &str) -> Self {
        self.shop_id = shop_id.to_string();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn rule(mut self, rule: &str) -> Self {
        self.rule_code = Some(rule.to_string());
        self
    }

    pub fn season(mut self, season: &str) -> Self {
        self.season_code = Some(season.to_string());
        self
    }

    pub fn stock(mut self, qty: i64, amt: f64) -> Self {
        self.stock_qty = qty;
        self.stock_amt = amt;
        self
    }

    pub fn build(self) -> InventoryFact {
        InventoryFact {
            dimension_key: DimensionKey::new(&self.style, &self.color, &self.size),
            period: self.period,
            shop_id: self.shop_id,
            category: self.category,
            rule_code: self.rule_code,
            season_code: self.season_code,
            stock_qty: self.stock_qty,
            stock_amt: self.stock_amt,
        }
    }
}

// ==========================================
// SalesFact 构建器
// ==========================================

pub struct SalesBuilder {
    style: String,
    color: String,
    size: String,
    period: Period,
    shop_id: String,
    channel: Channel,
    sales_amt: f64,
}

impl SalesBuilder {
    pub fn new(style: &str, yyyymm: &str, sales_amt: f64) -> Self {
        Self {
            style: style.to_string(),
            color: "BK".to_string(),
            size: "F".to_string(),
            period: period(yyyymm),
            shop_id: "S1".to_string(),
            channel: Channel::Fr,
            sales_amt,
        }
    }

    pub fn color_size(mut self, color: &str, size: &str) -> Self {
        self.color = color.to_string();
        self.size = size.to_string();
        self
    }

    pub fn shop(mut self, shop_id: &str) -> Self {
        self.shop_id = shop_id.to_string();
        self
    }

    pub fn channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    pub fn build(self) -> SalesFact {
        SalesFact {
            dimension_key: DimensionKey::new(&self.style, &self.color, &self.size),
            period: self.period,
            shop_id: self.shop_id,
            channel: self.channel,
            sales_amt: self.sales_amt,
        }
    }
}
