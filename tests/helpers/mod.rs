// ==========================================
// 集成测试辅助模块
// ==========================================

#![allow(dead_code)]

pub mod fact_builder;
pub mod mock_config;
pub mod mock_provider;
