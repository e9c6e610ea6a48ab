// ==========================================
// 库存生命周期引擎 - API 层
// ==========================================
// 职责: 请求校验 + 报表服务，供 CLI 或上层服务调用
// ==========================================

pub mod error;
pub mod report_api;
pub mod validator;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use report_api::{
    year_chunks, InventoryReport, InventoryReportApi, MonthlySummary, ReportSection,
};
pub use validator::{default_groupings, validate_request, ReportRequest, ValidatedRequest};
