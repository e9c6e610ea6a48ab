// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证 config_kv 读取、兜底值与校验
// ==========================================


use inventory_lifecycle::config::{config_keys, ConfigManager, EngineConfigReader};
use inventory_lifecycle::MinQtyPrecedence;
use test_helpers::{create_test_db, insert_config, open};

#[tokio::test]
async fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    let config_manager = ConfigManager::new(&db_path);
    assert!(
        config_manager.is_ok(),
        "ConfigManager should be created successfully"
    );
}

#[tokio::test]
async fn test_fallbacks_on_empty_table() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();

    let config = manager.load_engine_config().await.unwrap();
    assert!((config.threshold - 0.01).abs() < 1e-12);
    assert_eq!(config.min_qty, 10);
    assert_eq!(config.current_month_min_qty, 10);
    assert_eq!(config.base_month, "202312");
    assert_eq!(config.dimension_tab, "style");
    assert_eq!(config.category_filter, "all");
    assert_eq!(config.min_qty_precedence, None);

    // 未给出优先级 → 校验失败
    let mut with_month = config.clone();
    with_month.reference_month = Some("202511".to_string());
    assert!(with_month.validate().is_err());
}

#[tokio::test]
async fn test_stored_values_flow_into_validated_config() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    {
        let conn = open(&db_path);
        insert_config(&conn, config_keys::THRESHOLD_PCT, "0.05");
        insert_config(&conn, config_keys::MIN_QTY, "3");
        insert_config(&conn, config_keys::CURRENT_MONTH_MIN_QTY, "4");
        insert_config(&conn, config_keys::BASE_MONTH, "2024.03");
        insert_config(&conn, config_keys::DIMENSION_TAB, "color&size");
        insert_config(&conn, config_keys::CATEGORY_FILTER, "Shoes");
        insert_config(&conn, config_keys::MIN_QTY_PRECEDENCE, "ignore-floor");
    }

    let manager = ConfigManager::new(&db_path).unwrap();
    let mut config = manager.load_engine_config().await.unwrap();
    config.reference_month = Some("202511".to_string());

    let validated = config.validate().unwrap();
    assert!((validated.stagnation.threshold - 0.0005).abs() < 1e-12);
    assert_eq!(validated.stagnation.min_prior_qty, 3);
    assert_eq!(validated.stagnation.min_current_qty, 4);
    assert_eq!(validated.stagnation.precedence, MinQtyPrecedence::IgnoreFloor);
    assert_eq!(validated.base_month.as_yyyymm(), "202403");
    assert_eq!(validated.dimension_tab.as_str(), "color&size");
    assert_eq!(validated.category_filter.as_str(), "Shoes");
}

#[tokio::test]
async fn test_malformed_numbers_use_fallback() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    {
        let conn = open(&db_path);
        insert_config(&conn, config_keys::THRESHOLD_PCT, "abc");
        insert_config(&conn, config_keys::MIN_QTY, "1.5");
    }

    let manager = ConfigManager::new(&db_path).unwrap();
    assert!((manager.get_threshold_percent().await.unwrap() - 0.01).abs() < 1e-12);
    assert_eq!(manager.get_min_qty().await.unwrap(), 10);
}

#[tokio::test]
async fn test_set_and_snapshot() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();

    manager
        .set_global_config_value(config_keys::MIN_QTY_PRECEDENCE, "FLOOR_BEFORE_BUCKET")
        .unwrap();
    manager
        .set_global_config_value(config_keys::MIN_QTY_PRECEDENCE, "BUCKET_BEFORE_FLOOR")
        .unwrap();

    assert_eq!(
        manager.get_min_qty_precedence().await.unwrap().as_deref(),
        Some("BUCKET_BEFORE_FLOOR")
    );
    let snapshot = manager.get_config_snapshot().unwrap();
    assert_eq!(snapshot.len(), 1);
}

#[tokio::test]
async fn test_unknown_values_rejected_at_validation() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    {
        let conn = open(&db_path);
        insert_config(&conn, config_keys::DIMENSION_TAB, "sku");
        insert_config(&conn, config_keys::MIN_QTY_PRECEDENCE, "FLOOR_BEFORE_BUCKET");
    }

    let manager = ConfigManager::new(&db_path).unwrap();
    let mut config = manager.load_engine_config().await.unwrap();
    config.reference_month = Some("202511".to_string());
    assert!(config.validate().is_err());
}
