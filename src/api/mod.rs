// ==========================================
// 海运ERP装箱单系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供传输层（HTTP 等）调用
// ==========================================

pub mod error;
pub mod packing_list_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use packing_list_api::{
    ExportedWorkbook, PackingListApi, PrintViewResponse, SheetImportReport, WorkbookImportResponse,
};
