// Small dev utility: create a demo warehouse snapshot for the report CLI.
//
// Usage:
//   cargo run --bin seed_demo_warehouse -- [db_path]
//
// Existing fact rows in the file are replaced; config_kv keys are upserted.

use inventory_lifecycle::config::{config_keys, GLOBAL_SCOPE};
use inventory_lifecycle::db::{init_schema, open_sqlite_connection};
use inventory_lifecycle::domain::Period;
use inventory_lifecycle::engine::quarter_epoch;
use rusqlite::params;

const BRAND: &str = "M";

/// (款号, 中分类, 季节, 基准单价)
const STYLES: [(&str, &str, &str, f64); 6] = [
    ("3ACP7701N", "Headwear", "25SS", 39_000.0),
    ("3ACP0102N", "Headwear", "23FW", 35_000.0),
    ("3ABQS0143", "Bag", "24FW", 89_000.0),
    ("3ASXCA12N", "Shoes", "25FW", 129_000.0),
    ("3ASXB334N", "Shoes", "22SS", 99_000.0),
    ("3AACL0125", "Acc_etc", "24SS", 25_000.0),
];

const COLORS: [&str; 2] = ["50BKS", "43NYS"];
const SIZES: [&str; 2] = ["F", "260"];

/// (门店, 渠道, 经销商, 开店日期)
const SHOPS: [(&str, &str, Option<&str>, &str); 4] = [
    ("HQ01", "HQ", None, "2015-01-01"),
    ("OR11", "OR", None, "2018-03-15"),
    ("FR21", "FR", Some("D100"), "2020-07-01"),
    ("FR22", "FR", Some("D200"), "2021-09-01"),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "warehouse.db".to_string());

    let mut conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    let base = Period::parse("202312")?;
    let from = Period::parse("202401")?;
    let to = Period::parse("202511")?;

    let tx = conn.transaction()?;
    tx.execute("DELETE FROM inventory_fact WHERE brd_cd = ?1", params![BRAND])?;
    tx.execute("DELETE FROM sales_fact WHERE brd_cd = ?1", params![BRAND])?;
    tx.execute("DELETE FROM product_rule WHERE brd_cd = ?1", params![BRAND])?;
    tx.execute("DELETE FROM shop_map", [])?;
    tx.execute("DELETE FROM dealer", [])?;

    for (shop_id, chnl, dealer, open_dt) in SHOPS {
        tx.execute(
            "INSERT INTO shop_map (shop_id, chnl_cd, dealer_id, open_dt) VALUES (?1, ?2, ?3, ?4)",
            params![shop_id, chnl, dealer, open_dt],
        )?;
    }
    // 门店改制: 旧记录应被最近开店日期的一行覆盖
    tx.execute(
        "INSERT INTO shop_map (shop_id, chnl_cd, dealer_id, open_dt) VALUES ('FR22', 'OR', NULL, '2016-01-01')",
        [],
    )?;
    tx.execute("INSERT INTO dealer VALUES ('D100', '서울상사')", [])?;
    tx.execute("INSERT INTO dealer VALUES ('D200', '부산유통')", [])?;

    let mut inventory_rows = 0usize;
    let mut sales_rows = 0usize;

    for (style_idx, (style, category, season, price)) in STYLES.iter().enumerate() {
        // 运营规则: 每个款色码每个季度槽位一条，旧款后期转 OUTLET（仅第二个颜色提前清货）
        if let Some(last_epoch) = quarter_epoch(base, to) {
            for (color_idx, color) in COLORS.iter().enumerate() {
                for size in SIZES {
                    for epoch in 1..=last_epoch {
                        let rule = match (style_idx, color_idx, epoch) {
                            (0, _, _) => "FOCUS",
                            (1, _, e) if e >= 4 => "OUTLET",
                            (4, 1, e) if e >= 6 => "OUTLET",
                            (3, _, e) if e <= 2 => "INTRO",
                            _ => *season,
                        };
                        tx.execute(
                            "INSERT INTO product_rule (brd_cd, prdt_cd, color_cd, size_cd, epoch, rule_cd) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                            params![BRAND, style, color, size, epoch, rule],
                        )?;
                    }
                }
            }
        }

        for (month_idx, period) in Period::range_inclusive(from, to).into_iter().enumerate() {
            for (color_idx, color) in COLORS.iter().enumerate() {
                for (size_idx, size) in SIZES.iter().enumerate() {
                    for (shop_idx, (shop_id, chnl, _, _)) in SHOPS.iter().enumerate() {
                        let seed = style_idx * 7 + color_idx * 5 + size_idx * 3 + shop_idx * 11;
                        let qty = ((seed * 13 + month_idx * 17) % 40) as i64;
                        tx.execute(
                            "INSERT INTO inventory_fact VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                            params![
                                BRAND,
                                style,
                                color,
                                size,
                                period.as_yyyymm(),
                                shop_id,
                                category,
                                season,
                                qty,
                                qty as f64 * price,
                            ],
                        )?;
                        inventory_rows += 1;

                        // 过季老款在部分月份零销售，便于观察滞销
                        let sold = (seed + month_idx) % 9;
                        if sold == 0 || (style_idx == 4 && month_idx % 3 != 0) {
                            continue;
                        }
                        tx.execute(
                            "INSERT INTO sales_fact VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                            params![
                                BRAND,
                                style,
                                color,
                                size,
                                period.as_yyyymm(),
                                shop_id,
                                chnl,
                                sold as f64 * price * 0.6,
                            ],
                        )?;
                        sales_rows += 1;
                    }
                }
            }
        }
    }

    let defaults = [
        (config_keys::THRESHOLD_PCT, "0.01"),
        (config_keys::MIN_QTY, "10"),
        (config_keys::CURRENT_MONTH_MIN_QTY, "10"),
        (config_keys::BASE_MONTH, "202312"),
        (config_keys::DIMENSION_TAB, "style"),
        (config_keys::CATEGORY_FILTER, "all"),
        (config_keys::MIN_QTY_PRECEDENCE, "BUCKET_BEFORE_FLOOR"),
    ];
    for (key, value) in defaults {
        tx.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3",
            params![GLOBAL_SCOPE, key, value],
        )?;
    }

    tx.commit()?;

    println!(
        "seeded {}: inventory_rows={}, sales_rows={}",
        db_path, inventory_rows, sales_rows
    );
    Ok(())
}
