// ==========================================
// 海运ERP装箱单系统 - 导出层
// ==========================================
// 职责: 规范化聚合 → 工作簿字节流 / 打印分组视图
// ==========================================

pub mod print_grouping;
pub mod workbook_writer;

// 重导出核心类型
pub use print_grouping::{group_by_box, BoxGroup, PrintEntry};
pub use workbook_writer::{export_batch, export_single, ExportError, ExportResult};
