// ==========================================
// 海运ERP装箱单系统 - 导入层
// ==========================================
// 职责: 半结构化装箱单表格 → 规范化领域聚合
// 输入: 已解码的工作簿字节流（传输层负责临时文件生命周期）
// ==========================================

// 模块声明
pub mod assembler;
pub mod box_reader;
pub mod error;
pub mod grid;
pub mod header;
pub mod item_reader;
pub mod layout;
pub mod provisioner;
pub mod store_name;
pub mod validator;

// 重导出核心类型
pub use assembler::{SheetImport, WorkbookImporter};
pub use box_reader::read_box_specifications;
pub use error::{ImportError, ImportResult, TypeMismatchEntry};
pub use grid::{CellValue, SheetGrid};
pub use header::{read_header, DeclaredHeader};
pub use item_reader::read_line_items;
pub use provisioner::{ProductProvisioner, ProvisionOutcome};
pub use store_name::extract_store_name;
